//! Named JSON collections: bookmarks per user, admin accounts, curated lists.

pub mod fs;
pub mod memory;

use anyhow::Context as _;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use fs::LocalFsStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn get(&self, name: &str) -> anyhow::Result<Option<serde_json::Value>>;
    async fn put(&self, name: &str, value: &serde_json::Value) -> anyhow::Result<()>;
    /// Returns whether the collection existed.
    async fn delete(&self, name: &str) -> anyhow::Result<bool>;
    async fn names(&self) -> anyhow::Result<Vec<String>>;
}

/// Collection names become file names, so they are kept to a safe alphabet.
pub fn validate_name(name: &str) -> anyhow::Result<()> {
    if name.is_empty() || name.len() > 128 {
        anyhow::bail!("invalid collection name: {name:?}");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        || name.starts_with('.')
    {
        anyhow::bail!("invalid collection name: {name:?}");
    }
    Ok(())
}

/// Reads a collection holding a JSON array; absent means empty.
pub async fn load_list<T: DeserializeOwned>(
    store: &dyn CollectionStore,
    name: &str,
) -> anyhow::Result<Vec<T>> {
    match store.get(name).await? {
        Some(value) => {
            serde_json::from_value(value).with_context(|| format!("decode collection {name}"))
        }
        None => Ok(Vec::new()),
    }
}

pub async fn save_list<T: Serialize>(
    store: &dyn CollectionStore,
    name: &str,
    items: &[T],
) -> anyhow::Result<()> {
    let value = serde_json::to_value(items).with_context(|| format!("encode collection {name}"))?;
    store.put(name, &value).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_restricted() {
        assert!(validate_name("bookmarks_user-1").is_ok());
        assert!(validate_name("rankingList").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("../etc").is_err());
        assert!(validate_name(".hidden").is_err());
        assert!(validate_name("a/b").is_err());
    }

    #[tokio::test]
    async fn missing_list_is_empty() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let items: Vec<String> = load_list(&store, "users").await?;
        assert!(items.is_empty());

        save_list(&store, "users", &["a".to_owned(), "b".to_owned()]).await?;
        let items: Vec<String> = load_list(&store, "users").await?;
        assert_eq!(items, vec!["a", "b"]);
        Ok(())
    }

    #[tokio::test]
    async fn wrong_shape_is_an_error() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.put("users", &serde_json::json!({"not": "a list"})).await?;
        let err = load_list::<String>(&store, "users").await.unwrap_err();
        assert!(format!("{err:#}").contains("decode collection users"));
        Ok(())
    }
}
