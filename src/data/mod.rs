//! Provider adapters.
//!
//! Defines the `IndicatorSource` and `NewsProviderAdapter` traits and the
//! concrete adapters for each external source. Adapters convert a
//! provider's raw response into the internal record shape and report the
//! outcome as a `ProviderResult`; nothing fails past this boundary.

pub mod fallback;
pub mod gnews;
pub mod mediastack;
pub mod news;
pub mod newsapi;
pub mod worldbank;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::{NewsProviderConfig, NewsProviderKind};
use crate::types::{FetchError, NewsArticle, ProviderResult, RawPoint};

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("ECONPULSE/", env!("CARGO_PKG_VERSION"));

/// Source of indicator time series.
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    /// Fetch up to `lookback_periods` observations for `code`, newest first,
    /// with absent values already filtered out.
    async fn fetch_indicator(&self, code: &str, lookback_periods: u32) -> ProviderResult<RawPoint>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// One news provider in the fallback chain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsProviderAdapter: Send + Sync {
    /// Stable provider id, e.g. `"gnews"`.
    fn id(&self) -> &'static str;

    /// Whether the provider's config is enabled. Disabled providers are
    /// skipped by the resolver without a request.
    fn is_enabled(&self) -> bool;

    /// Fetch and map one batch of articles.
    async fn fetch(&self) -> ProviderResult<NewsArticle>;
}

/// Build the shared HTTP client. The timeout applies to every request.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

/// Issue a GET and return the body of a 2xx response.
///
/// Transport failures (DNS, connect, timeout, body read) map to
/// `FetchError::Network`; non-2xx statuses to `FetchError::Http`.
pub async fn get_text(http: &Client, url: &str) -> Result<String, FetchError> {
    let resp = http
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Network(e.without_url().to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        debug!(status = %status, "Non-success HTTP status");
        return Err(FetchError::Http(status.as_u16()));
    }

    resp.text()
        .await
        .map_err(|e| FetchError::Network(e.without_url().to_string()))
}

/// Build the ordered news adapter chain from configuration.
pub fn build_news_chain(
    configs: &[NewsProviderConfig],
    http: &Client,
) -> Vec<Arc<dyn NewsProviderAdapter>> {
    configs
        .iter()
        .map(|cfg| -> Arc<dyn NewsProviderAdapter> {
            match cfg.kind {
                NewsProviderKind::Gnews => Arc::new(gnews::GNewsAdapter::new(cfg, http.clone())),
                NewsProviderKind::Newsapi => Arc::new(newsapi::NewsApiAdapter::new(cfg, http.clone())),
                NewsProviderKind::Mediastack => {
                    Arc::new(mediastack::MediaStackAdapter::new(cfg, http.clone()))
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_news_chain_preserves_order() {
        let http = build_client(Duration::from_secs(5)).unwrap();
        let configs = vec![
            NewsProviderConfig::disabled(NewsProviderKind::Mediastack),
            NewsProviderConfig::disabled(NewsProviderKind::Gnews),
            NewsProviderConfig::disabled(NewsProviderKind::Newsapi),
        ];
        let chain = build_news_chain(&configs, &http);
        let ids: Vec<&str> = chain.iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec!["mediastack", "gnews", "newsapi"]);
        assert!(chain.iter().all(|a| !a.is_enabled()));
    }

    #[test]
    fn test_user_agent() {
        assert!(USER_AGENT.starts_with("ECONPULSE/"));
    }
}
