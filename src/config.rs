use std::time::Duration;

use anyhow::Context as _;

use crate::catalog::DEFAULT_BASE_URL;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone)]
pub struct Config {
    pub catalog: CatalogConfig,
    /// Items per listing page.
    pub page_size: u32,
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads `MANGASHELF_*` settings through `lookup`. Out-of-range numbers
    /// fall back to their defaults; a malformed catalog URL is an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_url = match var("MANGASHELF_CATALOG_URL") {
            Some(raw) => validate_base_url(&raw)
                .with_context(|| format!("invalid MANGASHELF_CATALOG_URL={raw:?}"))?,
            None => DEFAULT_BASE_URL.to_owned(),
        };
        let timeout_secs = var("MANGASHELF_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| (1..=300).contains(v))
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let user_agent = var("MANGASHELF_USER_AGENT").unwrap_or_else(default_user_agent);
        let page_size = var("MANGASHELF_PAGE_SIZE")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|v| (1..=100).contains(v))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Ok(Self {
            catalog: CatalogConfig {
                base_url,
                request_timeout: Duration::from_secs(timeout_secs),
                user_agent,
            },
            page_size,
        })
    }

    pub fn with_catalog_url(mut self, raw: Option<&str>) -> anyhow::Result<Self> {
        if let Some(raw) = raw {
            self.catalog.base_url =
                validate_base_url(raw).with_context(|| format!("invalid --catalog-url {raw:?}"))?;
        }
        Ok(self)
    }
}

fn validate_base_url(raw: &str) -> anyhow::Result<String> {
    let url = url::Url::parse(raw.trim()).context("parse url")?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("catalog url must be http/https");
    }
    Ok(url.as_str().trim_end_matches('/').to_owned())
}

fn default_user_agent() -> String {
    format!("mangashelf/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() -> anyhow::Result<()> {
        let config = Config::from_lookup(lookup(&[]))?;
        assert_eq!(config.catalog.base_url, "https://api.mangadex.org");
        assert_eq!(config.catalog.request_timeout, Duration::from_secs(20));
        assert!(config.catalog.user_agent.starts_with("mangashelf/"));
        assert_eq!(config.page_size, 20);
        Ok(())
    }

    #[test]
    fn env_overrides_and_range_fallbacks() -> anyhow::Result<()> {
        let config = Config::from_lookup(lookup(&[
            ("MANGASHELF_CATALOG_URL", " http://127.0.0.1:9000/ "),
            ("MANGASHELF_REQUEST_TIMEOUT_SECS", "0"),
            ("MANGASHELF_USER_AGENT", "reader-test"),
            ("MANGASHELF_PAGE_SIZE", "40"),
        ]))?;
        assert_eq!(config.catalog.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.catalog.request_timeout, Duration::from_secs(20));
        assert_eq!(config.catalog.user_agent, "reader-test");
        assert_eq!(config.page_size, 40);
        Ok(())
    }

    #[test]
    fn rejects_non_http_catalog_url() {
        let err = Config::from_lookup(lookup(&[("MANGASHELF_CATALOG_URL", "ftp://example.com")]))
            .unwrap_err();
        assert!(format!("{err:#}").contains("must be http/https"));
    }

    #[test]
    fn cli_flag_overrides_env() -> anyhow::Result<()> {
        let config = Config::default().with_catalog_url(Some("http://localhost:1234"))?;
        assert_eq!(config.catalog.base_url, "http://localhost:1234");
        Ok(())
    }
}
