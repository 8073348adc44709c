use std::path::{Path, PathBuf};

use anyhow::Context as _;
use async_trait::async_trait;
use tokio::fs;

use crate::store::{CollectionStore, validate_name};

/// One pretty-printed JSON file per collection under `<base>/collections/`.
#[derive(Debug, Clone)]
pub struct LocalFsStore {
    base_dir: PathBuf,
}

impl LocalFsStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn collections_dir(&self) -> PathBuf {
        self.base_dir.join("collections")
    }

    fn collection_path(&self, name: &str) -> anyhow::Result<PathBuf> {
        validate_name(name)?;
        Ok(self.collections_dir().join(format!("{name}.json")))
    }
}

#[async_trait]
impl CollectionStore for LocalFsStore {
    async fn get(&self, name: &str) -> anyhow::Result<Option<serde_json::Value>> {
        let path = self.collection_path(name)?;
        read_json(&path)
            .await
            .with_context(|| format!("read: {}", path.display()))
    }

    async fn put(&self, name: &str, value: &serde_json::Value) -> anyhow::Result<()> {
        let path = self.collection_path(name)?;
        write_json_atomic(&path, value)
            .await
            .with_context(|| format!("write collection {name}"))
    }

    async fn delete(&self, name: &str) -> anyhow::Result<bool> {
        let path = self.collection_path(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err).with_context(|| format!("remove: {}", path.display())),
        }
    }

    async fn names(&self) -> anyhow::Result<Vec<String>> {
        let dir = self.collections_dir();
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err).with_context(|| format!("list: {}", dir.display())),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && validate_name(stem).is_ok()
            {
                names.push(stem.to_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

async fn read_json(path: &Path) -> anyhow::Result<Option<serde_json::Value>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let value = serde_json::from_slice(&bytes).context("parse json")?;
    Ok(Some(value))
}

async fn write_json_atomic(path: &Path, value: &serde_json::Value) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("path has no parent: {}", path.display()))?;
    fs::create_dir_all(parent)
        .await
        .with_context(|| format!("create parent dir: {}", parent.display()))?;

    // Temp name must not end in `.json` or `names()` would pick it up.
    let tmp_path = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
    let data = serde_json::to_vec_pretty(value).context("serialize json")?;
    fs::write(&tmp_path, &data)
        .await
        .with_context(|| format!("write tmp: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("rename tmp to final: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete_round_trip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = LocalFsStore::new(dir.path());

        assert!(store.get("admins").await?.is_none());
        store
            .put("admins", &serde_json::json!([{"email": "a@example.com"}]))
            .await?;
        let value = store.get("admins").await?.expect("stored");
        assert_eq!(value[0]["email"], "a@example.com");
        assert!(dir.path().join("collections/admins.json").is_file());

        assert!(store.delete("admins").await?);
        assert!(!store.delete("admins").await?);
        assert!(store.get("admins").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn names_lists_only_collections() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = LocalFsStore::new(dir.path());
        assert!(store.names().await?.is_empty());

        store.put("users", &serde_json::json!([])).await?;
        store.put("bookmarks_u1", &serde_json::json!([])).await?;
        std::fs::write(dir.path().join("collections/notes.txt"), "x")?;

        assert_eq!(store.names().await?, vec!["bookmarks_u1", "users"]);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsStore::new(dir.path());
        assert!(store.put("../escape", &serde_json::json!(1)).await.is_err());
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = LocalFsStore::new(dir.path());
        std::fs::create_dir_all(dir.path().join("collections"))?;
        std::fs::write(dir.path().join("collections/users.json"), "{not json")?;

        let err = store.get("users").await.unwrap_err();
        assert!(format!("{err:#}").contains("parse json"));
        Ok(())
    }
}
