//! NewsAPI provider.
//!
//! API: `https://newsapi.org/v2/everything`
//! Auth: API key via `apiKey` query param. Free tier: 100 req/day.
//!
//! Error responses may arrive with a 2xx status and `"status": "error"`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::news::{decode, ArticleFields, NewsSourceSettings};
use super::{get_text, NewsProviderAdapter};
use crate::config::NewsProviderConfig;
use crate::types::{FetchError, NewsArticle, ProviderResult};

pub const PROVIDER_ID: &str = "newsapi";
const DEFAULT_ENDPOINT: &str = "https://newsapi.org/v2/everything";
const DEFAULT_PHRASE: &str = "Nigeria economy";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    url_to_image: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    source: Option<NewsApiSource>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    #[serde(default)]
    name: Option<String>,
}

impl From<NewsApiArticle> for ArticleFields {
    fn from(a: NewsApiArticle) -> Self {
        ArticleFields {
            title: a.title,
            description: a.description,
            source_name: a.source.and_then(|s| s.name),
            url: a.url,
            published_at: a.published_at,
            image: a.url_to_image,
            category: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct NewsApiAdapter {
    http: Client,
    settings: NewsSourceSettings,
}

impl NewsApiAdapter {
    pub fn new(cfg: &NewsProviderConfig, http: Client) -> Self {
        Self {
            http,
            settings: NewsSourceSettings::from_config(cfg, DEFAULT_ENDPOINT, DEFAULT_PHRASE),
        }
    }

    fn search_url(&self, query: &str, key: &str) -> String {
        format!(
            "{}?q={}&sortBy=publishedAt&language={}&pageSize={}&apiKey={}",
            self.settings.endpoint,
            urlencoding::encode(query),
            urlencoding::encode(&self.settings.language),
            self.settings.page_size,
            urlencoding::encode(key)
        )
    }
}

#[async_trait]
impl NewsProviderAdapter for NewsApiAdapter {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn is_enabled(&self) -> bool {
        self.settings.is_usable()
    }

    #[instrument(name = "NewsApiFetch", skip(self))]
    async fn fetch(&self) -> ProviderResult<NewsArticle> {
        let key = match self.settings.usable_key() {
            Some(key) if self.settings.enabled => key,
            _ => {
                debug!("NewsAPI disabled or missing credential, skipping");
                return ProviderResult::Empty;
            }
        };

        let query = self.settings.pick_phrase();
        debug!(query, "Requesting NewsAPI articles");

        let body = match get_text(&self.http, &self.search_url(query, key)).await {
            Ok(body) => body,
            Err(e) => return ProviderResult::Error(e),
        };
        let data: NewsApiResponse = match decode(&body) {
            Ok(data) => data,
            Err(e) => return ProviderResult::Error(e),
        };

        if data.status == "error" {
            let message = data.message.unwrap_or_else(|| "unspecified NewsAPI error".into());
            return ProviderResult::Error(FetchError::Parse(message));
        }

        let articles = data
            .articles
            .into_iter()
            .filter_map(|a| ArticleFields::from(a).into_article(PROVIDER_ID))
            .collect();
        ProviderResult::from_items(articles)
    }
}
