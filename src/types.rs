//! Shared types for the ECONPULSE engine.
//!
//! These types form the data model used across all modules: adapters
//! produce them, the engine normalises and caches them, and display
//! collaborators read them back out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// Unit of an indicator's raw values. Drives formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Unit {
    Percent,
    CurrencyBillions,
    CurrencyRaw,
    Count,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Percent => write!(f, "percent"),
            Unit::CurrencyBillions => write!(f, "currency-billions"),
            Unit::CurrencyRaw => write!(f, "currency-raw"),
            Unit::Count => write!(f, "count"),
        }
    }
}

/// One observation as returned by the indicator source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    /// Period label, a year string such as `"2022"`.
    pub period: String,
    pub value: Option<f64>,
}

/// A named economic time series, ordered oldest → newest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub code: String,
    pub name: String,
    pub unit: Unit,
    pub points: Vec<RawPoint>,
}

impl IndicatorSeries {
    /// Build a series from points delivered newest-first (the indicator
    /// source's native order).
    pub fn from_newest_first(
        code: impl Into<String>,
        name: impl Into<String>,
        unit: Unit,
        mut points: Vec<RawPoint>,
    ) -> Self {
        points.reverse();
        Self {
            code: code.into(),
            name: name.into(),
            unit,
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent point, if any.
    pub fn latest(&self) -> Option<&RawPoint> {
        self.points.last()
    }

    /// The last `n` points (fewer if the series is shorter), still oldest first.
    pub fn tail(&self, n: usize) -> &[RawPoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }
}

impl fmt::Display for IndicatorSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => format!("{}–{}", first.period, last.period),
            _ => "no data".to_string(),
        };
        write!(f, "{} [{}] {} points ({})", self.name, self.code, self.points.len(), span)
    }
}

/// Semantic reading of a change, after polarity is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Favorable,
    Unfavorable,
    Neutral,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Favorable => write!(f, "favorable"),
            Direction::Unfavorable => write!(f, "unfavorable"),
            Direction::Neutral => write!(f, "neutral"),
        }
    }
}

/// Derived view of the two most recent points of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub code: String,
    /// Period label of the latest point.
    pub period: String,
    pub latest_value: f64,
    pub previous_value: Option<f64>,
    /// `None` when no change is computable (single point, missing or zero values).
    pub percent_change: Option<f64>,
    pub direction: Direction,
}

impl fmt::Display for MetricSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.percent_change {
            Some(change) => write!(
                f,
                "{} {}: {} ({:+.2}%, {})",
                self.code, self.period, self.latest_value, change, self.direction
            ),
            None => write!(f, "{} {}: {} (n/a)", self.code, self.period, self.latest_value),
        }
    }
}

// ---------------------------------------------------------------------------
// News
// ---------------------------------------------------------------------------

/// A news article in the common shape every provider is mapped into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: Option<String>,
    pub source_name: String,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    /// Pre-rendered relative time ("2 hours ago") for articles without a timestamp.
    pub time_hint: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    /// Id of the provider the article came from.
    pub provider: String,
}

impl fmt::Display for NewsArticle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.source_name, self.title, self.provider)
    }
}

/// Where the cached news batch came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewsOrigin {
    /// A live provider, identified by its id.
    Provider(String),
    /// Every provider failed; built-in static content is being served.
    BuiltInFallback,
}

impl fmt::Display for NewsOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewsOrigin::Provider(id) => write!(f, "{id}"),
            NewsOrigin::BuiltInFallback => write!(f, "built-in fallback"),
        }
    }
}

/// The articles of one news cycle and their origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsBatch {
    pub articles: Vec<NewsArticle>,
    pub origin: NewsOrigin,
    pub fetched_at: DateTime<Utc>,
}

impl NewsBatch {
    pub fn is_degraded(&self) -> bool {
        self.origin == NewsOrigin::BuiltInFallback
    }

    /// Provider id that produced the batch, `None` in degraded mode.
    pub fn provider_id(&self) -> Option<&str> {
        match &self.origin {
            NewsOrigin::Provider(id) => Some(id),
            NewsOrigin::BuiltInFallback => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Provider outcomes
// ---------------------------------------------------------------------------

/// Tagged outcome of a single adapter call. Adapters never return
/// `Err` past their boundary; every failure is folded into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResult<T> {
    Ok(Vec<T>),
    Empty,
    Error(FetchError),
}

impl<T> ProviderResult<T> {
    /// Wrap a list, collapsing zero-length lists into `Empty`.
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            ProviderResult::Empty
        } else {
            ProviderResult::Ok(items)
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ProviderResult::Ok(_))
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderResult::Ok(_) => "ok",
            ProviderResult::Empty => "empty",
            ProviderResult::Error(_) => "error",
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failure of a single HTTP round trip, as seen by an adapter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: status {0}")]
    Http(u16),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Engine-level conditions.
#[derive(Debug, thiserror::Error)]
pub enum PulseError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("No usable records for {0}")]
    EmptyResult(String),

    #[error("All news sources exhausted (tried: {})", .tried.join(", "))]
    AllSourcesExhausted { tried: Vec<String> },

    #[error("Unknown indicator: {0}")]
    UnknownIndicator(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
