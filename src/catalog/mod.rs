#[cfg(test)]
pub(crate) mod fake;
pub mod mangadex;
pub mod model;

use async_trait::async_trait;

use crate::paginator::{MAX_OFFSET, resolve_offset};

pub use mangadex::MangaDexClient;
pub use model::{
    AtHomeServer, ChapterData, Collection, MangaData, MangaSummary, TagData,
};

pub const DEFAULT_BASE_URL: &str = "https://api.mangadex.org";
pub const COVERS_BASE_URL: &str = "https://uploads.mangadex.org/covers";
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

const MAX_LIST_LIMIT: u32 = 100;
const MAX_FEED_LIMIT: u32 = 500;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0} id is required")]
    MissingId(&'static str),
    #[error("request timeout - server is taking too long to respond")]
    Timeout,
    #[error("too many requests - please wait a moment")]
    RateLimited,
    #[error("server error - please try again later ({0})")]
    Upstream(u16),
    #[error("catalog returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response from catalog")]
    Decode(#[source] serde_json::Error),
    #[error(transparent)]
    Http(reqwest::Error),
}

impl CatalogError {
    /// Status the app answers with when this error reaches a handler.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::MissingId(_) => 400,
            Self::Timeout => 504,
            Self::RateLimited => 429,
            Self::Status { status, .. } => *status,
            Self::Upstream(_) | Self::Decode(_) | Self::Http(_) => 502,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// Source of manga, chapter and tag metadata.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn manga_list(&self, query: &MangaQuery) -> Result<Collection<MangaData>, CatalogError>;
    async fn manga(&self, manga_id: &str) -> Result<MangaData, CatalogError>;
    async fn chapter(&self, chapter_id: &str) -> Result<ChapterData, CatalogError>;
    async fn chapters(
        &self,
        query: &ChapterFeedQuery,
    ) -> Result<Collection<ChapterData>, CatalogError>;
    async fn at_home(&self, chapter_id: &str) -> Result<AtHomeServer, CatalogError>;
    async fn tags(&self) -> Result<Vec<TagData>, CatalogError>;
    /// Unmodified GET passthrough: upstream status and JSON body.
    async fn raw_get(
        &self,
        path: &str,
        query: Option<&str>,
    ) -> Result<(u16, serde_json::Value), CatalogError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MangaQuery {
    pub limit: u32,
    pub offset: u64,
    pub title: Option<String>,
    pub included_tags: Vec<String>,
    pub original_languages: Vec<String>,
}

impl MangaQuery {
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            limit: page_size,
            offset: resolve_offset(page, page_size, MAX_OFFSET),
            ..Self::default()
        }
    }

    /// The offset is pulled back so `offset + limit` never passes
    /// [`MAX_OFFSET`].
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let limit = self.limit.min(MAX_LIST_LIMIT);
        let offset = self
            .offset
            .min(MAX_OFFSET.saturating_sub(u64::from(limit)));
        let mut params = vec![
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
            ("order[followedCount]", "desc".to_owned()),
            ("contentRating[]", "safe".to_owned()),
            ("contentRating[]", "suggestive".to_owned()),
            ("includes[]", "cover_art".to_owned()),
            ("includes[]", "author".to_owned()),
            ("includes[]", "artist".to_owned()),
        ];
        if let Some(title) = self.title.as_deref().map(str::trim)
            && !title.is_empty()
        {
            params.push(("title", title.to_owned()));
        }
        for tag in &self.included_tags {
            params.push(("includedTags[]", tag.clone()));
        }
        for lang in &self.original_languages {
            params.push(("originalLanguage[]", lang.clone()));
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterFeedQuery {
    pub manga_id: String,
    pub limit: u32,
    pub offset: u64,
    pub translated_languages: Vec<String>,
}

impl ChapterFeedQuery {
    pub fn new(manga_id: impl Into<String>) -> Self {
        Self {
            manga_id: manga_id.into(),
            limit: MAX_FEED_LIMIT,
            offset: 0,
            translated_languages: Vec::new(),
        }
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("manga", self.manga_id.clone()),
            ("limit", self.limit.min(MAX_FEED_LIMIT).to_string()),
            ("offset", self.offset.to_string()),
            ("order[chapter]", "desc".to_owned()),
            ("includes[]", "scanlation_group".to_owned()),
            ("includes[]", "user".to_owned()),
        ];
        for lang in &self.translated_languages {
            params.push(("translatedLanguage[]", lang.clone()));
        }
        params
    }
}

/// Every chapter of a manga, following the feed's pages in order.
///
/// Stops at the reported total, on an empty page, or at the catalog's offset
/// ceiling. No request asks for a window ending past [`MAX_OFFSET`].
pub async fn fetch_all_chapters(
    catalog: &dyn Catalog,
    manga_id: &str,
    translated_languages: &[String],
) -> Result<Vec<ChapterData>, CatalogError> {
    let mut query = ChapterFeedQuery::new(manga_id);
    query.translated_languages = translated_languages.to_vec();

    let mut chapters = Vec::new();
    loop {
        let page = catalog.chapters(&query).await?;
        let fetched = page.data.len() as u64;
        chapters.extend(page.data);

        let next_offset = query.offset + fetched;
        if fetched == 0 || next_offset >= page.total {
            break;
        }
        let remaining = MAX_OFFSET.saturating_sub(next_offset);
        if remaining == 0 {
            tracing::warn!(
                manga_id,
                total = page.total,
                fetched = chapters.len(),
                "chapter feed exceeds the catalog offset ceiling; truncating"
            );
            break;
        }
        query.offset = next_offset;
        query.limit = query
            .limit
            .min(u32::try_from(remaining).unwrap_or(MAX_FEED_LIMIT));
    }

    tracing::debug!(manga_id, chapters = chapters.len(), "fetched chapter feed");
    Ok(chapters)
}

pub fn cover_url(manga_id: &str, file_name: Option<&str>, size: Option<u32>) -> String {
    let Some(file_name) = file_name.filter(|f| !f.is_empty()) else {
        return PLACEHOLDER_IMAGE.to_owned();
    };
    if manga_id.is_empty() {
        return PLACEHOLDER_IMAGE.to_owned();
    }
    match size {
        Some(size) => format!("{COVERS_BASE_URL}/{manga_id}/{file_name}.{size}.jpg"),
        None => format!("{COVERS_BASE_URL}/{manga_id}/{file_name}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageQuality {
    #[default]
    Data,
    DataSaver,
}

impl PageQuality {
    fn segment(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::DataSaver => "data-saver",
        }
    }
}

pub fn page_url(base_url: &str, hash: &str, file_name: &str, quality: PageQuality) -> String {
    if base_url.is_empty() || hash.is_empty() || file_name.is_empty() {
        return PLACEHOLDER_IMAGE.to_owned();
    }
    let base_url = base_url.trim_end_matches('/');
    format!("{base_url}/{}/{hash}/{file_name}", quality.segment())
}

impl AtHomeServer {
    pub fn page_urls(&self, quality: PageQuality) -> Vec<String> {
        let files = match quality {
            PageQuality::Data => &self.chapter.data,
            PageQuality::DataSaver => &self.chapter.data_saver,
        };
        files
            .iter()
            .map(|file| page_url(&self.base_url, &self.chapter.hash, file, quality))
            .collect()
    }
}
