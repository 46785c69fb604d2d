//! MediaStack provider.
//!
//! API: `http://api.mediastack.com/v1/news`
//! Auth: API key via `access_key` query param.
//!
//! Articles live under `data` rather than `articles`, the source is a
//! plain string, and errors come back as `{"error": {...}}` bodies.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::news::{decode, ArticleFields, NewsSourceSettings};
use super::{get_text, NewsProviderAdapter};
use crate::config::NewsProviderConfig;
use crate::types::{FetchError, NewsArticle, ProviderResult};

pub const PROVIDER_ID: &str = "mediastack";
const DEFAULT_ENDPOINT: &str = "http://api.mediastack.com/v1/news";
const DEFAULT_PHRASE: &str = "economy";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MediaStackResponse {
    #[serde(default)]
    data: Option<Vec<MediaStackArticle>>,
    #[serde(default)]
    error: Option<MediaStackError>,
}

#[derive(Debug, Deserialize)]
struct MediaStackError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaStackArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

impl From<MediaStackArticle> for ArticleFields {
    fn from(a: MediaStackArticle) -> Self {
        ArticleFields {
            title: a.title,
            description: a.description,
            source_name: a.source,
            url: a.url,
            published_at: a.published_at,
            image: a.image,
            category: a.category,
        }
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct MediaStackAdapter {
    http: Client,
    settings: NewsSourceSettings,
}

impl MediaStackAdapter {
    pub fn new(cfg: &NewsProviderConfig, http: Client) -> Self {
        Self {
            http,
            settings: NewsSourceSettings::from_config(cfg, DEFAULT_ENDPOINT, DEFAULT_PHRASE),
        }
    }

    fn search_url(&self, query: &str, key: &str) -> String {
        format!(
            "{}?access_key={}&countries={}&languages={}&keywords={}&limit={}",
            self.settings.endpoint,
            urlencoding::encode(key),
            urlencoding::encode(&self.settings.country),
            urlencoding::encode(&self.settings.language),
            urlencoding::encode(query),
            self.settings.page_size
        )
    }
}

#[async_trait]
impl NewsProviderAdapter for MediaStackAdapter {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn is_enabled(&self) -> bool {
        self.settings.is_usable()
    }

    #[instrument(name = "MediaStackFetch", skip(self))]
    async fn fetch(&self) -> ProviderResult<NewsArticle> {
        let key = match self.settings.usable_key() {
            Some(key) if self.settings.enabled => key,
            _ => {
                debug!("MediaStack disabled or missing credential, skipping");
                return ProviderResult::Empty;
            }
        };

        let query = self.settings.pick_phrase();
        debug!(query, "Requesting MediaStack articles");

        let body = match get_text(&self.http, &self.search_url(query, key)).await {
            Ok(body) => body,
            Err(e) => return ProviderResult::Error(e),
        };
        let data: MediaStackResponse = match decode(&body) {
            Ok(data) => data,
            Err(e) => return ProviderResult::Error(e),
        };

        if let Some(err) = data.error {
            let message = format!(
                "{}: {}",
                err.code.unwrap_or_else(|| "error".into()),
                err.message.unwrap_or_default()
            );
            return ProviderResult::Error(FetchError::Parse(message));
        }

        let articles = data
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| ArticleFields::from(a).into_article(PROVIDER_ID))
            .collect();
        ProviderResult::from_items(articles)
    }
}
