//! GNews provider.
//!
//! API: `https://gnews.io/api/v4/search`
//! Auth: API key via `apikey` query param. Free tier: 100 req/day.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::news::{decode, ArticleFields, NewsSourceSettings};
use super::{get_text, NewsProviderAdapter};
use crate::config::NewsProviderConfig;
use crate::types::{NewsArticle, ProviderResult};

pub const PROVIDER_ID: &str = "gnews";
const DEFAULT_ENDPOINT: &str = "https://gnews.io/api/v4/search";
const DEFAULT_PHRASE: &str = "Nigeria economy";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GNewsResponse {
    #[serde(default)]
    articles: Option<Vec<GNewsArticle>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GNewsArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    source: Option<GNewsSource>,
}

#[derive(Debug, Deserialize)]
struct GNewsSource {
    #[serde(default)]
    name: Option<String>,
}

impl From<GNewsArticle> for ArticleFields {
    fn from(a: GNewsArticle) -> Self {
        ArticleFields {
            title: a.title,
            description: a.description,
            source_name: a.source.and_then(|s| s.name),
            url: a.url,
            published_at: a.published_at,
            image: a.image,
            category: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct GNewsAdapter {
    http: Client,
    settings: NewsSourceSettings,
}

impl GNewsAdapter {
    pub fn new(cfg: &NewsProviderConfig, http: Client) -> Self {
        Self {
            http,
            settings: NewsSourceSettings::from_config(cfg, DEFAULT_ENDPOINT, DEFAULT_PHRASE),
        }
    }

    fn search_url(&self, query: &str, key: &str) -> String {
        format!(
            "{}?q={}&lang={}&country={}&max={}&apikey={}",
            self.settings.endpoint,
            urlencoding::encode(query),
            urlencoding::encode(&self.settings.language),
            urlencoding::encode(&self.settings.country),
            self.settings.page_size,
            urlencoding::encode(key)
        )
    }
}

#[async_trait]
impl NewsProviderAdapter for GNewsAdapter {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn is_enabled(&self) -> bool {
        self.settings.is_usable()
    }

    #[instrument(name = "GNewsFetch", skip(self))]
    async fn fetch(&self) -> ProviderResult<NewsArticle> {
        let key = match self.settings.usable_key() {
            Some(key) if self.settings.enabled => key,
            _ => {
                debug!("GNews disabled or missing credential, skipping");
                return ProviderResult::Empty;
            }
        };

        let query = self.settings.pick_phrase();
        debug!(query, "Requesting GNews articles");

        let body = match get_text(&self.http, &self.search_url(query, key)).await {
            Ok(body) => body,
            Err(e) => return ProviderResult::Error(e),
        };
        let data: GNewsResponse = match decode(&body) {
            Ok(data) => data,
            Err(e) => return ProviderResult::Error(e),
        };

        let articles = data
            .articles
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| ArticleFields::from(a).into_article(PROVIDER_ID))
            .collect();
        ProviderResult::from_items(articles)
    }
}
