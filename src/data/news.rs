//! Shared plumbing for news provider adapters.
//!
//! Each provider has its own endpoint, query parameters and response
//! shape, but they all share the same configuration surface (enabled
//! flag, credential, query phrases) and the same rules for turning a
//! provider item into a `NewsArticle`.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::config::NewsProviderConfig;
use crate::types::{FetchError, NewsArticle};

/// Source name used when a provider item carries none.
pub const UNKNOWN_SOURCE: &str = "Unknown source";

/// Resolved settings for one news adapter.
pub struct NewsSourceSettings {
    pub enabled: bool,
    pub api_key: Option<SecretString>,
    pub endpoint: String,
    pub query_phrases: Vec<String>,
    pub language: String,
    pub country: String,
    pub page_size: u32,
}

impl NewsSourceSettings {
    /// Merge a config entry over provider defaults.
    pub fn from_config(
        cfg: &NewsProviderConfig,
        default_endpoint: &str,
        default_phrase: &str,
    ) -> Self {
        let query_phrases = if cfg.query_phrases.is_empty() {
            vec![default_phrase.to_string()]
        } else {
            cfg.query_phrases.clone()
        };
        Self {
            enabled: cfg.enabled,
            api_key: cfg.resolve_api_key(),
            endpoint: cfg
                .endpoint
                .clone()
                .unwrap_or_else(|| default_endpoint.to_string()),
            query_phrases,
            language: cfg.language.clone().unwrap_or_else(|| "en".into()),
            country: cfg.country.clone().unwrap_or_else(|| "ng".into()),
            page_size: cfg.page_size.unwrap_or(10),
        }
    }

    /// Whether the adapter may issue a request at all: enabled and holding
    /// a real (non-placeholder) credential.
    pub fn is_usable(&self) -> bool {
        self.enabled && self.usable_key().is_some()
    }

    /// The credential, unless it is missing or a placeholder.
    pub fn usable_key(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret().as_str())
            .filter(|k| !is_placeholder_credential(k))
    }

    /// Pick the search phrase for this poll. With several phrases configured
    /// the choice is pseudorandom so consecutive polls see varied results.
    pub fn pick_phrase(&self) -> &str {
        self.query_phrases
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or("economy")
    }
}

/// Known placeholder sentinels: empty, or the `YOUR_..._HERE` form shipped
/// in sample configs.
pub fn is_placeholder_credential(key: &str) -> bool {
    let key = key.trim();
    key.is_empty() || (key.starts_with("YOUR_") && key.ends_with("_HERE"))
}

/// Decode a provider response body.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))
}

/// Parse an RFC 3339 timestamp; unparseable values are dropped.
pub fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Provider-agnostic intermediate form. Adapters fill one of these per item
/// from their own response shape.
#[derive(Debug, Default)]
pub struct ArticleFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub source_name: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
}

impl ArticleFields {
    /// Map into the common shape. Items without a usable title are dropped;
    /// a missing source name falls back to [`UNKNOWN_SOURCE`].
    pub fn into_article(self, provider: &str) -> Option<NewsArticle> {
        let title = non_blank(self.title)?;
        if title == "[Removed]" {
            return None;
        }
        Some(NewsArticle {
            title,
            description: non_blank(self.description),
            source_name: non_blank(self.source_name).unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            url: non_blank(self.url),
            published_at: parse_timestamp(self.published_at.as_deref()),
            time_hint: None,
            image: non_blank(self.image),
            category: non_blank(self.category),
            provider: provider.to_string(),
        })
    }
}
