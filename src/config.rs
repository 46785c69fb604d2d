//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! News provider credentials may be given inline or referenced by env-var
//! name; the env var wins when set. Credentials are wrapped in
//! `SecretString` as soon as they are resolved.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::time::Duration;

use crate::registry::{IndicatorDef, IndicatorRegistry, GDP_CODE};

/// Default World Bank endpoint (Nigeria).
pub const DEFAULT_INDICATOR_BASE_URL: &str = "https://api.worldbank.org/v2/country/NGA/indicator";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub indicator_source: IndicatorSourceConfig,
    /// Optional registry override; the built-in six are used when empty.
    #[serde(default)]
    pub indicators: Vec<IndicatorDef>,
    /// News providers in fallback order.
    #[serde(default = "default_news_providers")]
    pub news_providers: Vec<NewsProviderConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    #[serde(default = "default_interval_secs")]
    pub indicator_interval_secs: u64,
    #[serde(default = "default_interval_secs")]
    pub news_interval_secs: u64,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_secs")]
    pub retry_backoff_secs: u64,
    #[serde(default = "default_lookback_periods")]
    pub lookback_periods: u32,
    #[serde(default = "default_indicator")]
    pub default_indicator: String,
}

fn default_interval_secs() -> u64 {
    300
}

fn default_http_timeout_secs() -> u64 {
    15
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_secs() -> u64 {
    10
}

fn default_lookback_periods() -> u32 {
    15
}

fn default_indicator() -> String {
    GDP_CODE.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            indicator_interval_secs: default_interval_secs(),
            news_interval_secs: default_interval_secs(),
            http_timeout_secs: default_http_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_secs: default_retry_backoff_secs(),
            lookback_periods: default_lookback_periods(),
            default_indicator: default_indicator(),
        }
    }
}

impl EngineConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndicatorSourceConfig {
    #[serde(default = "default_indicator_base_url")]
    pub base_url: String,
}

fn default_indicator_base_url() -> String {
    DEFAULT_INDICATOR_BASE_URL.to_string()
}

impl Default for IndicatorSourceConfig {
    fn default() -> Self {
        Self { base_url: default_indicator_base_url() }
    }
}

/// Which adapter implementation a news provider entry maps to.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NewsProviderKind {
    Gnews,
    Newsapi,
    Mediastack,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewsProviderConfig {
    pub kind: NewsProviderKind,
    #[serde(default)]
    pub enabled: bool,
    /// Inline credential. May be a `YOUR_..._HERE` placeholder.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Env var holding the credential; takes precedence over `api_key`.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Endpoint override (tests point this at a local mock server).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Search phrases; one is picked per poll.
    #[serde(default)]
    pub query_phrases: Vec<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl NewsProviderConfig {
    /// A disabled entry with no credential, used for the default chain.
    pub fn disabled(kind: NewsProviderKind) -> Self {
        let env = match kind {
            NewsProviderKind::Gnews => "GNEWS_API_KEY",
            NewsProviderKind::Newsapi => "NEWSAPI_KEY",
            NewsProviderKind::Mediastack => "MEDIASTACK_KEY",
        };
        Self {
            kind,
            enabled: false,
            api_key: None,
            api_key_env: Some(env.to_string()),
            endpoint: None,
            query_phrases: Vec::new(),
            language: None,
            country: None,
            page_size: None,
        }
    }

    /// Resolve the credential: env var first, then the inline value.
    pub fn resolve_api_key(&self) -> Option<SecretString> {
        self.api_key_env
            .as_deref()
            .and_then(|env| std::env::var(env).ok())
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_key.clone())
            .map(SecretString::new)
    }
}

fn default_news_providers() -> Vec<NewsProviderConfig> {
    vec![
        NewsProviderConfig::disabled(NewsProviderKind::Gnews),
        NewsProviderConfig::disabled(NewsProviderKind::Newsapi),
        NewsProviderConfig::disabled(NewsProviderKind::Mediastack),
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            indicator_source: IndicatorSourceConfig::default(),
            indicators: Vec::new(),
            news_providers: default_news_providers(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents).context("Invalid configuration TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// The indicator registry this configuration selects.
    pub fn registry(&self) -> Result<IndicatorRegistry> {
        if self.indicators.is_empty() {
            return Ok(IndicatorRegistry::built_in());
        }
        IndicatorRegistry::new(self.indicators.clone()).context("Invalid indicator registry")
    }

    fn validate(&self) -> Result<()> {
        if self.engine.indicator_interval_secs == 0 || self.engine.news_interval_secs == 0 {
            anyhow::bail!("refresh intervals must be greater than zero");
        }
        if self.engine.lookback_periods == 0 {
            anyhow::bail!("lookback_periods must be a positive integer");
        }
        if self.engine.http_timeout_secs == 0 {
            anyhow::bail!("http_timeout_secs must be greater than zero");
        }
        let registry = self.registry()?;
        if !registry.contains(&self.engine.default_indicator) {
            anyhow::bail!(
                "default_indicator {} is not in the indicator registry",
                self.engine.default_indicator
            );
        }
        Ok(())
    }
}
