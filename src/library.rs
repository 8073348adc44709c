//! Per-user bookmark lists.

use std::sync::Arc;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::store::{CollectionStore, load_list, save_list, validate_name};

const BOOKMARKS_PREFIX: &str = "bookmarks_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub manga_id: String,
    pub title: String,
    #[serde(default)]
    pub cover_file_name: Option<String>,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBookmark {
    pub manga_id: String,
    pub title: String,
    #[serde(default)]
    pub cover_file_name: Option<String>,
}

pub fn collection_name(user_id: &str) -> anyhow::Result<String> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        anyhow::bail!("user id is required");
    }
    let name = format!("{BOOKMARKS_PREFIX}{user_id}");
    validate_name(&name).with_context(|| format!("invalid user id: {user_id:?}"))?;
    Ok(name)
}

/// Inverse of [`collection_name`]: the user id behind a bookmarks collection.
pub fn user_id_of(collection: &str) -> Option<&str> {
    collection
        .strip_prefix(BOOKMARKS_PREFIX)
        .filter(|id| !id.is_empty())
}

pub struct Library {
    store: Arc<dyn CollectionStore>,
    write_lock: Mutex<()>,
}

impl Library {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn list(&self, user_id: &str) -> anyhow::Result<Vec<Bookmark>> {
        load_list(self.store.as_ref(), &collection_name(user_id)?).await
    }

    /// Returns `false` when the manga was already bookmarked.
    pub async fn add(&self, user_id: &str, new: NewBookmark) -> anyhow::Result<bool> {
        let manga_id = new.manga_id.trim();
        if manga_id.is_empty() {
            anyhow::bail!("manga id is required");
        }
        let name = collection_name(user_id)?;

        let _guard = self.write_lock.lock().await;
        let mut bookmarks: Vec<Bookmark> = load_list(self.store.as_ref(), &name).await?;
        if bookmarks.iter().any(|b| b.manga_id == manga_id) {
            return Ok(false);
        }
        bookmarks.push(Bookmark {
            manga_id: manga_id.to_owned(),
            title: new.title,
            cover_file_name: new.cover_file_name.filter(|f| !f.is_empty()),
            added_at: Utc::now(),
        });
        save_list(self.store.as_ref(), &name, &bookmarks).await?;
        tracing::info!(user_id, manga_id, "bookmark added");
        Ok(true)
    }

    /// Returns whether a bookmark was removed.
    pub async fn remove(&self, user_id: &str, manga_id: &str) -> anyhow::Result<bool> {
        let manga_id = manga_id.trim();
        let name = collection_name(user_id)?;

        let _guard = self.write_lock.lock().await;
        let mut bookmarks: Vec<Bookmark> = load_list(self.store.as_ref(), &name).await?;
        let before = bookmarks.len();
        bookmarks.retain(|b| b.manga_id != manga_id);
        if bookmarks.len() == before {
            return Ok(false);
        }
        save_list(self.store.as_ref(), &name, &bookmarks).await?;
        tracing::info!(user_id, manga_id, "bookmark removed");
        Ok(true)
    }

    pub async fn is_bookmarked(&self, user_id: &str, manga_id: &str) -> anyhow::Result<bool> {
        let manga_id = manga_id.trim();
        Ok(self
            .list(user_id)
            .await?
            .iter()
            .any(|b| b.manga_id == manga_id))
    }

    pub async fn clear(&self, user_id: &str) -> anyhow::Result<()> {
        let name = collection_name(user_id)?;
        let _guard = self.write_lock.lock().await;
        self.store.delete(&name).await?;
        Ok(())
    }

    /// Every stored bookmark list, keyed by user id.
    pub async fn all(&self) -> anyhow::Result<Vec<(String, Vec<Bookmark>)>> {
        let mut out = Vec::new();
        for name in self.store.names().await? {
            let Some(user_id) = user_id_of(&name) else {
                continue;
            };
            let bookmarks = load_list(self.store.as_ref(), &name).await?;
            out.push((user_id.to_owned(), bookmarks));
        }
        Ok(out)
    }
}
