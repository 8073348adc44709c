use axum::Json;
use axum::extract::{Path, Query, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, catalog_error};
use crate::catalog::{MangaQuery, MangaSummary, PageQuality, fetch_all_chapters};
use crate::paginator::{MAX_OFFSET, PageWindow, total_pages};
use crate::reader::{LoadedChapter, Navigation, Reader, load_chapter};
use crate::sequencer::{
    Chapter, Direction, LanguageGroup, available_languages, build_language_group,
    preferred_language,
};

const ENDPOINTS: &[&str] = &[
    "GET /api/manga",
    "GET /api/manga/:id",
    "GET /api/tags",
    "GET /api/read/:chapter_id",
    "GET /api/read/:chapter_id/navigate",
    "GET /api/mangadex-proxy/*path",
    "GET /api/rankings",
    "GET /api/recommendations",
    "GET|POST /api/library/:user_id",
    "DELETE /api/library/:user_id/:manga_id",
    "GET /api/admin/stats",
    "GET|POST /api/admin/admins",
    "DELETE /api/admin/admins/:id",
    "GET|POST /api/admin/users",
    "DELETE /api/admin/users/:id",
    "POST /api/admin/users/:id/toggle",
    "PUT /api/admin/users/:id/role",
    "GET|POST /api/admin/rankings",
    "DELETE /api/admin/rankings/:id",
    "POST /api/admin/rankings/:id/move",
    "GET|POST /api/admin/recommendations",
    "DELETE /api/admin/recommendations/:id",
    "GET /api/admin/bookmarks",
    "GET /healthz",
];

pub(super) async fn index() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "mangashelf",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "endpoints": ENDPOINTS,
    }))
}

/// Homepage tabs filter by original language.
fn tab_language(tab: &str) -> Option<&'static str> {
    match tab.trim().to_ascii_lowercase().as_str() {
        "manga" => Some("ja"),
        "manhwa" => Some("ko"),
        "manhua" => Some("zh"),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ListQuery {
    page: Option<u32>,
    title: Option<String>,
    /// Comma-separated tag ids.
    tags: Option<String>,
    tab: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct MangaPage {
    data: Vec<MangaSummary>,
    total: u64,
    window: PageWindow,
}

pub(super) async fn list_manga(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<MangaPage>, ApiError> {
    let page_size = state.config.page_size;
    let page = q.page.unwrap_or(1).max(1);

    let mut query = MangaQuery::page(page, page_size);
    query.title = q.title;
    query.included_tags = q
        .tags
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect();
    if let Some(lang) = q.tab.as_deref().and_then(tab_language) {
        query.original_languages.push(lang.to_owned());
    }

    let list = state
        .catalog
        .manga_list(&query)
        .await
        .map_err(catalog_error)?;

    // The catalog refuses windows ending past the offset ceiling, so later
    // pages are not offered. A page beyond that was served as the last one.
    let last_page = total_pages(list.total.min(MAX_OFFSET), page_size);
    let window = PageWindow::new(page.min(last_page.max(1)), last_page);
    Ok(Json(MangaPage {
        data: list.data.iter().map(MangaSummary::from).collect(),
        total: list.total,
        window,
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct DetailQuery {
    lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct MangaDetail {
    manga: MangaSummary,
    languages: Vec<String>,
    language: Option<String>,
    chapters: LanguageGroup,
}

pub(super) async fn manga_detail(
    State(state): State<AppState>,
    Path(manga_id): Path<String>,
    Query(q): Query<DetailQuery>,
) -> Result<Json<MangaDetail>, ApiError> {
    let catalog = state.catalog.as_ref();
    let manga = catalog.manga(&manga_id).await.map_err(catalog_error)?;
    let feed = fetch_all_chapters(catalog, &manga.id, &[])
        .await
        .map_err(catalog_error)?;
    let feed: Vec<Chapter> = feed.iter().map(Chapter::from).collect();

    let languages = available_languages(&feed);
    let language = q
        .lang
        .map(|l| l.trim().to_owned())
        .filter(|l| !l.is_empty())
        .or_else(|| preferred_language(&languages).map(str::to_owned));
    let chapters = language
        .as_deref()
        .map(|lang| build_language_group(&feed, lang))
        .unwrap_or_default();

    Ok(Json(MangaDetail {
        manga: MangaSummary::from(&manga),
        languages,
        language,
        chapters,
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct TagView {
    id: String,
    name: String,
    group: Option<String>,
}

pub(super) async fn tags(State(state): State<AppState>) -> Json<Vec<TagView>> {
    let tags = match state.catalog.tags().await {
        Ok(tags) => tags,
        Err(err) => {
            tracing::warn!(error = %err, "tags unavailable");
            Vec::new()
        }
    };
    Json(
        tags.iter()
            .map(|tag| TagView {
                id: tag.id.clone(),
                name: tag.display_name(),
                group: tag.attributes.group.clone(),
            })
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
pub(super) struct ReadQuery {
    quality: Option<String>,
    direction: Option<String>,
}

impl ReadQuery {
    fn quality(&self) -> PageQuality {
        match self.quality.as_deref().map(str::trim) {
            Some("data-saver" | "data_saver" | "saver") => PageQuality::DataSaver,
            _ => PageQuality::Data,
        }
    }
}

#[derive(Debug, Serialize)]
struct NeighbourView {
    chapter: Chapter,
    gap: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct ReaderView {
    #[serde(flatten)]
    loaded: LoadedChapter,
    next: Option<NeighbourView>,
    previous: Option<NeighbourView>,
}

impl From<LoadedChapter> for ReaderView {
    fn from(loaded: LoadedChapter) -> Self {
        let view = |direction| {
            loaded
                .navigation(direction)
                .map(|(chapter, gap)| NeighbourView {
                    chapter: chapter.clone(),
                    gap,
                })
        };
        let next = view(Direction::Next);
        let previous = view(Direction::Previous);
        Self {
            loaded,
            next,
            previous,
        }
    }
}

/// Loads through a fresh reader so failures surface the way the reader
/// reports them.
async fn open_reader(
    state: &AppState,
    chapter_id: &str,
    quality: PageQuality,
) -> Result<Reader, ApiError> {
    let mut reader = Reader::new();
    let ticket = reader.begin_load(chapter_id);
    let result = load_chapter(state.catalog.as_ref(), chapter_id, quality).await;
    if let Err(err) = &result {
        tracing::warn!(chapter_id, error = %err, "chapter load failed");
    }
    reader.finish_load(&ticket, result);

    if let Some(message) = reader.error() {
        return Err((StatusCode::BAD_GATEWAY, message.to_owned()));
    }
    Ok(reader)
}

pub(super) async fn read_chapter(
    State(state): State<AppState>,
    Path(chapter_id): Path<String>,
    Query(q): Query<ReadQuery>,
) -> Result<Json<ReaderView>, ApiError> {
    let reader = open_reader(&state, &chapter_id, q.quality()).await?;
    let loaded = reader.current().cloned().ok_or((
        StatusCode::INTERNAL_SERVER_ERROR,
        "reader finished without a chapter".to_owned(),
    ))?;
    Ok(Json(ReaderView::from(loaded)))
}

#[derive(Debug, Serialize)]
pub(super) struct NavigateView {
    direction: Direction,
    from: String,
    target: Option<Chapter>,
    gap: bool,
}

pub(super) async fn navigate(
    State(state): State<AppState>,
    Path(chapter_id): Path<String>,
    Query(q): Query<ReadQuery>,
) -> Result<Json<NavigateView>, ApiError> {
    let direction: Direction = q
        .direction
        .as_deref()
        .unwrap_or("next")
        .parse()
        .map_err(|err: anyhow::Error| (StatusCode::BAD_REQUEST, err.to_string()))?;

    let mut reader = open_reader(&state, &chapter_id, q.quality()).await?;
    let target = reader
        .current()
        .and_then(|loaded| loaded.neighbour(direction))
        .cloned();
    let gap = match reader.navigate(direction) {
        Navigation::NeedsConfirmation(_) => true,
        Navigation::Load(_) | Navigation::Unavailable => false,
    };

    Ok(Json(NavigateView {
        direction,
        from: chapter_id,
        target,
        gap,
    }))
}

/// Forwards a GET to the catalog. Successful bodies pass through untouched;
/// upstream errors keep their status and are wrapped as
/// `{"error": "Proxy failed", "detail": <upstream body>}`.
pub(super) async fn proxy(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    match state.catalog.raw_get(&path, query.as_deref()).await {
        Ok((status, body)) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            if status.is_success() {
                return (status, Json(body)).into_response();
            }
            tracing::debug!(%path, %status, "catalog refused proxied request");
            (
                status,
                Json(serde_json::json!({
                    "error": "Proxy failed",
                    "detail": body,
                })),
            )
                .into_response()
        }
        Err(err) => {
            tracing::warn!(%path, error = %err, "proxy request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "Proxy failed",
                    "detail": err.to_string(),
                })),
            )
                .into_response()
        }
    }
}
