//! Chapter reader: loading a chapter with its language group, and the
//! navigation state machine that walks between chapters.

use serde::Serialize;

use crate::catalog::{Catalog, CatalogError, MangaSummary, PageQuality, fetch_all_chapters};
use crate::sequencer::{Chapter, Direction, LanguageGroup, build_language_group, has_gap};

/// Everything the reader needs once a chapter has been fetched.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedChapter {
    pub chapter: Chapter,
    pub manga: Option<MangaSummary>,
    pub pages: Vec<String>,
    pub group: LanguageGroup,
    pub cursor: Option<usize>,
}

impl LoadedChapter {
    pub fn neighbour(&self, direction: Direction) -> Option<&Chapter> {
        self.group.adjacent(self.cursor, direction)
    }

    /// The chapter `direction` leads to, and whether getting there skips
    /// published chapters.
    pub fn navigation(&self, direction: Direction) -> Option<(&Chapter, bool)> {
        let target = self.neighbour(direction)?;
        Some((target, has_gap(&self.chapter, target)))
    }
}

/// Fetches a chapter, its pages, its manga and the manga's chapter feed, in
/// that order. Each request depends on the one before it.
pub async fn load_chapter(
    catalog: &dyn Catalog,
    chapter_id: &str,
    quality: PageQuality,
) -> Result<LoadedChapter, CatalogError> {
    let data = catalog.chapter(chapter_id).await?;
    let chapter = Chapter::from(&data);

    let server = catalog.at_home(&data.id).await?;
    let pages = server.page_urls(quality);

    let (manga, feed) = match data.manga_id() {
        Some(manga_id) => {
            let manga = catalog.manga(manga_id).await?;
            let feed = fetch_all_chapters(catalog, manga_id, &[]).await?;
            let feed: Vec<Chapter> = feed.iter().map(Chapter::from).collect();
            (Some(MangaSummary::from(&manga)), feed)
        }
        None => {
            tracing::warn!(chapter_id = %data.id, "chapter has no manga relationship");
            (None, vec![chapter.clone()])
        }
    };

    let group = build_language_group(&feed, &chapter.translated_language);
    let cursor = group.locate(&chapter.id);
    if cursor.is_none() {
        tracing::warn!(
            chapter_id = %chapter.id,
            language = %chapter.translated_language,
            "chapter missing from its own language group; navigation disabled"
        );
    }
    tracing::debug!(chapter_id = %chapter.id, group_len = group.len(), ?cursor, "chapter loaded");

    Ok(LoadedChapter {
        chapter,
        manga,
        pages,
        group,
        cursor,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReaderPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
    AwaitingConfirmation,
}

/// Identifies one load request. Only the most recently issued ticket may
/// complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub chapter_id: String,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingNavigation {
    pub direction: Direction,
    pub from: Option<String>,
    pub to: Option<String>,
    pub chapter_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// No chapter in that direction (or not in a state to move).
    Unavailable,
    /// The move skips chapters; wait for `confirm` or `cancel`.
    NeedsConfirmation(PendingNavigation),
    /// Start loading the target.
    Load(LoadTicket),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer request was issued after this one; the result was dropped.
    Stale,
}

#[derive(Debug, Default)]
pub struct Reader {
    phase: ReaderPhase,
    generation: u64,
    requested: Option<String>,
    loaded: Option<LoadedChapter>,
    error: Option<String>,
    pending: Option<PendingNavigation>,
}

impl Reader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ReaderPhase {
        self.phase
    }

    pub fn current(&self) -> Option<&LoadedChapter> {
        self.loaded.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pending(&self) -> Option<&PendingNavigation> {
        self.pending.as_ref()
    }

    pub fn requested(&self) -> Option<&str> {
        self.requested.as_deref()
    }

    /// Enters `Loading` for `chapter_id`; any earlier in-flight load becomes
    /// stale.
    pub fn begin_load(&mut self, chapter_id: impl Into<String>) -> LoadTicket {
        self.generation += 1;
        let chapter_id = chapter_id.into();
        self.requested = Some(chapter_id.clone());
        self.pending = None;
        self.error = None;
        self.phase = ReaderPhase::Loading;
        LoadTicket {
            chapter_id,
            generation: self.generation,
        }
    }

    pub fn finish_load<E: std::fmt::Display>(
        &mut self,
        ticket: &LoadTicket,
        result: Result<LoadedChapter, E>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                chapter_id = %ticket.chapter_id,
                active = ?self.requested,
                "discarding superseded chapter load"
            );
            return LoadOutcome::Stale;
        }

        match result {
            Ok(loaded) => {
                self.loaded = Some(loaded);
                self.phase = ReaderPhase::Ready;
            }
            Err(err) => {
                self.error = Some(format!("failed to load chapter: {err}"));
                self.phase = ReaderPhase::Failed;
            }
        }
        LoadOutcome::Applied
    }

    pub fn can_navigate(&self, direction: Direction) -> bool {
        self.phase() == ReaderPhase::Ready
            && self
                .loaded
                .as_ref()
                .is_some_and(|loaded| loaded.neighbour(direction).is_some())
    }

    pub fn navigate(&mut self, direction: Direction) -> Navigation {
        if self.phase() != ReaderPhase::Ready {
            return Navigation::Unavailable;
        }
        let Some(loaded) = self.loaded.as_ref() else {
            return Navigation::Unavailable;
        };
        let Some((target, gap)) = loaded.navigation(direction) else {
            return Navigation::Unavailable;
        };

        if gap {
            let pending = PendingNavigation {
                direction,
                from: loaded.chapter.chapter.clone(),
                to: target.chapter.clone(),
                chapter_id: target.id.clone(),
            };
            self.pending = Some(pending.clone());
            self.phase = ReaderPhase::AwaitingConfirmation;
            return Navigation::NeedsConfirmation(pending);
        }

        let target_id = target.id.clone();
        Navigation::Load(self.begin_load(target_id))
    }

    pub fn confirm(&mut self) -> Option<LoadTicket> {
        if self.phase() != ReaderPhase::AwaitingConfirmation {
            return None;
        }
        let pending = self.pending.take()?;
        Some(self.begin_load(pending.chapter_id))
    }

    pub fn cancel(&mut self) {
        if self.phase() == ReaderPhase::AwaitingConfirmation {
            self.pending = None;
            self.phase = ReaderPhase::Ready;
        }
    }
}
