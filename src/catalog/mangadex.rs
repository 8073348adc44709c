use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;

use crate::catalog::model::{AtHomeServer, ChapterData, Collection, Entity, MangaData, TagData};
use crate::catalog::{Catalog, CatalogError, ChapterFeedQuery, MangaQuery};
use crate::config::CatalogConfig;

const MANGA_INCLUDES: [(&str, &str); 3] = [
    ("includes[]", "cover_art"),
    ("includes[]", "author"),
    ("includes[]", "artist"),
];
const NO_QUERY: [(&str, &str); 0] = [];

/// HTTP client for the MangaDex REST API.
#[derive(Debug, Clone)]
pub struct MangaDexClient {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl MangaDexClient {
    pub fn new(config: &CatalogConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("build catalog http client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            user_agent: config.user_agent.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T, CatalogError>
    where
        T: DeserializeOwned,
        Q: serde::Serialize + std::fmt::Debug + ?Sized,
    {
        let url = self.endpoint(path);
        tracing::debug!(%url, ?query, "catalog request");

        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let raw = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "catalog request failed");
            return Err(status_error(status.as_u16(), &raw));
        }
        tracing::debug!(%url, status = status.as_u16(), "catalog response ok");

        serde_json::from_str(&raw).map_err(|err| {
            tracing::warn!(%url, error = %err, "catalog response did not decode");
            CatalogError::Decode(err)
        })
    }
}

#[async_trait]
impl Catalog for MangaDexClient {
    async fn manga_list(&self, query: &MangaQuery) -> Result<Collection<MangaData>, CatalogError> {
        self.get_json("/manga", &query.to_params()).await
    }

    async fn manga(&self, manga_id: &str) -> Result<MangaData, CatalogError> {
        let manga_id = require_id(manga_id, "manga")?;
        let entity: Entity<MangaData> = self
            .get_json(&format!("/manga/{manga_id}"), &MANGA_INCLUDES[..])
            .await?;
        Ok(entity.data)
    }

    async fn chapter(&self, chapter_id: &str) -> Result<ChapterData, CatalogError> {
        let chapter_id = require_id(chapter_id, "chapter")?;
        let entity: Entity<ChapterData> = self
            .get_json(&format!("/chapter/{chapter_id}"), &[("includes[]", "manga")][..])
            .await?;
        Ok(entity.data)
    }

    async fn chapters(
        &self,
        query: &ChapterFeedQuery,
    ) -> Result<Collection<ChapterData>, CatalogError> {
        require_id(&query.manga_id, "manga")?;
        self.get_json("/chapter", &query.to_params()).await
    }

    async fn at_home(&self, chapter_id: &str) -> Result<AtHomeServer, CatalogError> {
        let chapter_id = require_id(chapter_id, "chapter")?;
        self.get_json(&format!("/at-home/server/{chapter_id}"), &NO_QUERY[..])
            .await
    }

    async fn tags(&self) -> Result<Vec<TagData>, CatalogError> {
        let list: Collection<TagData> = self.get_json("/manga/tag", &NO_QUERY[..]).await?;
        Ok(list.data)
    }

    async fn raw_get(
        &self,
        path: &str,
        query: Option<&str>,
    ) -> Result<(u16, serde_json::Value), CatalogError> {
        let mut url = self.endpoint(path);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        tracing::debug!(%url, "catalog passthrough");

        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status().as_u16();
        let raw = response.text().await.map_err(transport_error)?;
        let body = serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw));
        Ok((status, body))
    }
}

fn require_id<'a>(id: &'a str, what: &'static str) -> Result<&'a str, CatalogError> {
    let id = id.trim();
    if id.is_empty() || id.contains('/') {
        return Err(CatalogError::MissingId(what));
    }
    Ok(id)
}

fn transport_error(err: reqwest::Error) -> CatalogError {
    if err.is_timeout() {
        CatalogError::Timeout
    } else {
        CatalogError::Http(err)
    }
}

fn status_error(status: u16, raw: &str) -> CatalogError {
    match status {
        429 => CatalogError::RateLimited,
        500..=599 => CatalogError::Upstream(status),
        _ => CatalogError::Status {
            status,
            message: parse_error_message(raw).unwrap_or_else(|| raw.trim().to_owned()),
        },
    }
}

/// First `errors[].detail` (or `title`) of a MangaDex error body.
fn parse_error_message(raw_json: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw_json).ok()?;
    let first = value.get("errors")?.as_array()?.first()?;
    let message = first
        .get("detail")
        .and_then(|v| v.as_str())
        .or_else(|| first.get("title").and_then(|v| v.as_str()))?;
    Some(message.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_detail_is_extracted() {
        let raw = r#"{"result":"error","errors":[{"status":404,"title":"not_found_http_exception","detail":"Chapter could not be found"}]}"#;
        let err = status_error(404, raw);
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "catalog returned 404: Chapter could not be found"
        );
    }

    #[test]
    fn status_classes_map_to_variants() {
        assert!(matches!(status_error(429, ""), CatalogError::RateLimited));
        assert!(matches!(status_error(503, ""), CatalogError::Upstream(503)));
        assert!(matches!(
            status_error(400, "plain text"),
            CatalogError::Status { status: 400, ref message } if message == "plain text"
        ));
    }

    #[test]
    fn ids_are_validated_before_requests() {
        assert!(matches!(
            require_id("  ", "manga"),
            Err(CatalogError::MissingId("manga"))
        ));
        assert!(require_id("../x", "chapter").is_err());
        assert_eq!(require_id(" abc ", "chapter").unwrap(), "abc");
    }

    #[test]
    fn endpoint_joins_without_double_slashes() -> anyhow::Result<()> {
        let client = MangaDexClient::new(&CatalogConfig {
            base_url: "http://127.0.0.1:9/".to_owned(),
            ..CatalogConfig::default()
        })?;
        assert_eq!(client.endpoint("/manga/tag"), "http://127.0.0.1:9/manga/tag");
        assert_eq!(client.endpoint("chapter"), "http://127.0.0.1:9/chapter");
        Ok(())
    }
}
