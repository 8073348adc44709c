//! In-memory catalog for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::catalog::model::{AtHomeChapter, ChapterAttributes, MangaAttributes, Relationship};
use crate::catalog::{
    AtHomeServer, Catalog, CatalogError, ChapterData, ChapterFeedQuery, Collection, MangaData,
    MangaQuery, TagData,
};

#[derive(Default)]
pub struct FakeCatalog {
    pub manga: HashMap<String, MangaData>,
    pub chapters: Vec<ChapterData>,
    pub manga_total: u64,
    pub unavailable: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn with_manga(mut self, id: &str, title: &str) -> Self {
        let mut attributes = MangaAttributes::default();
        attributes.title.insert("en".to_owned(), title.to_owned());
        self.manga.insert(
            id.to_owned(),
            MangaData {
                id: id.to_owned(),
                attributes,
                relationships: Vec::new(),
            },
        );
        self
    }

    pub fn with_chapter(mut self, id: &str, manga_id: Option<&str>, number: &str, lang: &str) -> Self {
        self.chapters.push(ChapterData {
            id: id.to_owned(),
            attributes: ChapterAttributes {
                chapter: Some(number.to_owned()),
                translated_language: lang.to_owned(),
                pages: 2,
                ..ChapterAttributes::default()
            },
            relationships: manga_id
                .map(|m| Relationship {
                    id: m.to_owned(),
                    kind: "manga".to_owned(),
                    attributes: None,
                })
                .into_iter()
                .collect(),
        });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), CatalogError> {
        self.calls.lock().unwrap().push(call);
        if self.unavailable {
            return Err(CatalogError::Upstream(503));
        }
        Ok(())
    }

    fn not_found(what: &str) -> CatalogError {
        CatalogError::Status {
            status: 404,
            message: format!("{what} could not be found"),
        }
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn manga_list(&self, query: &MangaQuery) -> Result<Collection<MangaData>, CatalogError> {
        self.record(format!("manga_list:{}", query.offset))?;
        Ok(Collection {
            data: self.manga.values().cloned().collect(),
            limit: query.limit,
            offset: query.offset,
            total: self.manga_total,
        })
    }

    async fn manga(&self, manga_id: &str) -> Result<MangaData, CatalogError> {
        self.record(format!("manga:{manga_id}"))?;
        self.manga
            .get(manga_id)
            .cloned()
            .ok_or_else(|| Self::not_found("Manga"))
    }

    async fn chapter(&self, chapter_id: &str) -> Result<ChapterData, CatalogError> {
        self.record(format!("chapter:{chapter_id}"))?;
        self.chapters
            .iter()
            .find(|c| c.id == chapter_id)
            .cloned()
            .ok_or_else(|| Self::not_found("Chapter"))
    }

    async fn chapters(
        &self,
        query: &ChapterFeedQuery,
    ) -> Result<Collection<ChapterData>, CatalogError> {
        self.record(format!("feed:{}:{}", query.manga_id, query.offset))?;
        let data: Vec<ChapterData> = self
            .chapters
            .iter()
            .filter(|c| c.manga_id() == Some(query.manga_id.as_str()))
            .cloned()
            .collect();
        let total = data.len() as u64;
        Ok(Collection {
            data: data.into_iter().skip(query.offset as usize).collect(),
            limit: query.limit,
            offset: query.offset,
            total,
        })
    }

    async fn at_home(&self, chapter_id: &str) -> Result<AtHomeServer, CatalogError> {
        self.record(format!("at_home:{chapter_id}"))?;
        Ok(AtHomeServer {
            base_url: "https://node.example".to_owned(),
            chapter: AtHomeChapter {
                hash: format!("hash-{chapter_id}"),
                data: vec!["1.png".to_owned(), "2.png".to_owned()],
                data_saver: vec!["1.jpg".to_owned(), "2.jpg".to_owned()],
            },
        })
    }

    async fn tags(&self) -> Result<Vec<TagData>, CatalogError> {
        self.record("tags".to_owned())?;
        Ok(Vec::new())
    }

    async fn raw_get(
        &self,
        path: &str,
        _query: Option<&str>,
    ) -> Result<(u16, serde_json::Value), CatalogError> {
        self.record(format!("raw:{path}"))?;
        Ok((200, serde_json::json!({"result": "ok"})))
    }
}
