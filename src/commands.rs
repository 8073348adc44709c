//! Terminal front-ends for the reader and the paginator.

use anyhow::Context as _;

use crate::catalog::{Catalog, MangaDexClient, PageQuality, fetch_all_chapters};
use crate::cli::{ChaptersArgs, PagesArgs, ReadArgs};
use crate::config::Config;
use crate::paginator::{MAX_OFFSET, PageWindow, resolve_offset, total_pages};
use crate::reader::{LoadTicket, LoadedChapter, Navigation, Reader, load_chapter};
use crate::sequencer::{Chapter, available_languages, build_language_group, preferred_language};

fn catalog_client(catalog_url: Option<&str>) -> anyhow::Result<MangaDexClient> {
    let config = Config::from_env()?.with_catalog_url(catalog_url)?;
    MangaDexClient::new(&config.catalog)
}

fn chapter_line(chapter: &Chapter) -> String {
    let mut line = format!(
        "{}\tch. {}\t{}",
        chapter.id,
        chapter.chapter.as_deref().unwrap_or("?"),
        chapter.translated_language
    );
    if let Some(title) = &chapter.title {
        line.push('\t');
        line.push_str(title);
    }
    line
}

async fn run_load(
    reader: &mut Reader,
    catalog: &dyn Catalog,
    ticket: LoadTicket,
    quality: PageQuality,
) -> anyhow::Result<LoadedChapter> {
    let result = load_chapter(catalog, &ticket.chapter_id, quality).await;
    reader.finish_load(&ticket, result);
    if let Some(message) = reader.error() {
        anyhow::bail!("{message}");
    }
    reader
        .current()
        .cloned()
        .context("reader finished without a chapter")
}

fn print_loaded(loaded: &LoadedChapter) {
    if let Some(manga) = &loaded.manga {
        println!("{}", manga.title);
    }
    println!("{}", chapter_line(&loaded.chapter));
    for url in &loaded.pages {
        println!("  {url}");
    }
}

pub async fn read(args: ReadArgs) -> anyhow::Result<()> {
    let client = catalog_client(args.catalog_url.as_deref())?;
    let quality = if args.data_saver {
        PageQuality::DataSaver
    } else {
        PageQuality::Data
    };

    let mut reader = Reader::new();
    let ticket = reader.begin_load(args.chapter.trim());
    let loaded = run_load(&mut reader, &client, ticket, quality).await?;
    print_loaded(&loaded);

    for _ in 0..args.steps {
        let ticket = match reader.navigate(args.direction) {
            Navigation::Unavailable => {
                println!("no {:?} chapter", args.direction);
                break;
            }
            Navigation::NeedsConfirmation(pending) => {
                let from = pending.from.as_deref().unwrap_or("?");
                let to = pending.to.as_deref().unwrap_or("?");
                if !args.confirm_gaps {
                    reader.cancel();
                    println!("gap between chapter {from} and {to}; pass --confirm-gaps to continue");
                    break;
                }
                tracing::info!(from, to, "crossing chapter gap");
                reader
                    .confirm()
                    .context("confirming a pending navigation")?
            }
            Navigation::Load(ticket) => ticket,
        };
        let loaded = run_load(&mut reader, &client, ticket, quality).await?;
        print_loaded(&loaded);
    }
    Ok(())
}

pub async fn chapters(args: ChaptersArgs) -> anyhow::Result<()> {
    let client = catalog_client(args.catalog_url.as_deref())?;
    let manga = client
        .manga(args.manga.trim())
        .await
        .with_context(|| format!("fetch manga {}", args.manga))?;
    let feed = fetch_all_chapters(&client, &manga.id, &[])
        .await
        .context("fetch chapter feed")?;
    let feed: Vec<Chapter> = feed.iter().map(Chapter::from).collect();

    let languages = available_languages(&feed);
    let Some(language) = args
        .lang
        .as_deref()
        .or_else(|| preferred_language(&languages))
    else {
        println!("{} has no chapters", manga.display_title());
        return Ok(());
    };

    let group = build_language_group(&feed, language);
    println!(
        "{} [{}] {} chapters (available: {})",
        manga.display_title(),
        language,
        group.len(),
        languages.join(", ")
    );
    for chapter in group.chapters() {
        println!("{}", chapter_line(chapter));
    }
    Ok(())
}

pub fn render_window(window: &PageWindow) -> String {
    if window.pages.is_empty() {
        return "(no pages)".to_owned();
    }
    let mut parts: Vec<String> = window
        .pages
        .iter()
        .map(|&page| {
            if page == window.current {
                format!("[{page}]")
            } else {
                page.to_string()
            }
        })
        .collect();
    if let Some(jump) = window.jump {
        parts.push("...".to_owned());
        parts.push(jump.to_string());
    }
    parts.join(" ")
}

pub fn pages(args: PagesArgs) -> anyhow::Result<()> {
    if args.page == 0 {
        anyhow::bail!("--page is 1-based");
    }
    let total = total_pages(args.total_items, args.page_size);
    let window = PageWindow::with(args.page, total, args.radius, args.stride);

    println!("window: {}", render_window(&window));
    println!("total pages: {total}");
    println!(
        "offset: {}",
        resolve_offset(args.page, args.page_size, MAX_OFFSET)
    );
    Ok(())
}
