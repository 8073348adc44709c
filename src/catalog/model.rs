use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sequencer::Chapter;

pub type LocalizedString = BTreeMap<String, String>;

/// A paged listing envelope (`/manga`, `/chapter`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub total: u64,
}

/// A single-entity envelope (`/manga/{id}`, `/chapter/{id}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity<T> {
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MangaData {
    pub id: String,
    pub attributes: MangaAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaAttributes {
    #[serde(default)]
    pub title: LocalizedString,
    #[serde(default)]
    pub alt_titles: Vec<LocalizedString>,
    #[serde(default)]
    pub description: LocalizedString,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub content_rating: Option<String>,
    #[serde(default)]
    pub tags: Vec<TagData>,
    #[serde(default)]
    pub available_translated_languages: Vec<Option<String>>,
}

impl MangaData {
    /// English title, then Japanese, then whatever comes first.
    pub fn display_title(&self) -> String {
        let title = &self.attributes.title;
        title
            .get("en")
            .or_else(|| title.get("ja"))
            .or_else(|| title.values().next())
            .cloned()
            .unwrap_or_else(|| "Unknown Manga".to_owned())
    }

    pub fn description(&self) -> Option<&str> {
        self.attributes.description.get("en").map(String::as_str)
    }

    pub fn cover_file_name(&self) -> Option<&str> {
        self.relationship("cover_art")?
            .attributes
            .as_ref()?
            .get("fileName")?
            .as_str()
    }

    pub fn author_name(&self) -> Option<&str> {
        self.relationship("author")?
            .attributes
            .as_ref()?
            .get("name")?
            .as_str()
    }

    fn relationship(&self, kind: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|rel| rel.kind == kind)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterData {
    pub id: String,
    pub attributes: ChapterAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterAttributes {
    #[serde(default)]
    pub chapter: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub translated_language: String,
    #[serde(default)]
    pub publish_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pages: u32,
}

impl ChapterData {
    pub fn manga_id(&self) -> Option<&str> {
        self.relationships
            .iter()
            .find(|rel| rel.kind == "manga")
            .map(|rel| rel.id.as_str())
    }
}

impl From<&ChapterData> for Chapter {
    fn from(data: &ChapterData) -> Self {
        let attrs = &data.attributes;
        Chapter {
            id: data.id.clone(),
            chapter: attrs.chapter.clone(),
            volume: attrs.volume.clone(),
            title: attrs.title.clone().filter(|t| !t.trim().is_empty()),
            translated_language: attrs.translated_language.clone(),
            published_at: attrs.publish_at,
            pages: attrs.pages,
        }
    }
}

/// Response of `/at-home/server/{chapter}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtHomeServer {
    pub base_url: String,
    pub chapter: AtHomeChapter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtHomeChapter {
    pub hash: String,
    #[serde(default)]
    pub data: Vec<String>,
    #[serde(default)]
    pub data_saver: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagData {
    pub id: String,
    pub attributes: TagAttributes,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagAttributes {
    #[serde(default)]
    pub name: LocalizedString,
    #[serde(default)]
    pub group: Option<String>,
}

impl TagData {
    pub fn display_name(&self) -> String {
        self.attributes
            .name
            .get("en")
            .or_else(|| self.attributes.name.values().next())
            .cloned()
            .unwrap_or_else(|| self.id.clone())
    }
}

/// The flattened manga shape handed to listings, bookmarks and admin lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MangaSummary {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub status: Option<String>,
    pub year: Option<i32>,
    pub cover_file_name: Option<String>,
    pub cover_url: String,
    pub tags: Vec<String>,
}

impl From<&MangaData> for MangaSummary {
    fn from(manga: &MangaData) -> Self {
        let cover_file_name = manga.cover_file_name().map(str::to_owned);
        Self {
            id: manga.id.clone(),
            title: manga.display_title(),
            description: manga.description().map(str::to_owned),
            author: manga.author_name().map(str::to_owned),
            status: manga.attributes.status.clone(),
            year: manga.attributes.year,
            cover_url: super::cover_url(&manga.id, cover_file_name.as_deref(), Some(256)),
            cover_file_name,
            tags: manga
                .attributes
                .tags
                .iter()
                .map(TagData::display_name)
                .collect(),
        }
    }
}
