//! Dashboard state and fetch pipelines.
//!
//! `Dashboard` owns all mutable dashboard state: the
//! fetch cache, the sticky news resolver and the selected indicator. It
//! runs the two pipelines (indicators: fetch → series → cache; news:
//! resolve → batch → cache) and exposes pull-based accessors for
//! display collaborators, plus a broadcast channel announcing each
//! completed cycle.
//!
//! Access rules: only the pipelines write the cache; each domain's cycle
//! is serialised by its own async mutex, so a manual refresh waits for a
//! scheduled one instead of overlapping it.

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::{Arc, RwLock};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::cache::FetchCache;
use super::normalizer::normalize;
use super::resolver::FallbackResolver;
use crate::config::AppConfig;
use crate::data::fallback::fallback_articles;
use crate::data::worldbank::WorldBankSource;
use crate::data::{build_client, build_news_chain, IndicatorSource, NewsProviderAdapter};
use crate::registry::{IndicatorRegistry, PolarityTable};
use crate::types::{
    IndicatorSeries, MetricSnapshot, NewsBatch, NewsOrigin, ProviderResult, PulseError,
};

/// Capacity of the refresh event channel. Slow subscribers lag rather than
/// block the pipelines.
const EVENT_CHANNEL_CAPACITY: usize = 32;

// ---------------------------------------------------------------------------
// Cycle reports
// ---------------------------------------------------------------------------

/// An indicator that produced no usable series in a cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFailure {
    pub code: String,
    pub reason: String,
}

/// Result of one indicator refresh cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorCycleReport {
    pub cycle_id: Uuid,
    pub updated: Vec<String>,
    pub failed: Vec<IndicatorFailure>,
}

impl IndicatorCycleReport {
    pub fn is_degraded(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn failed_codes(&self) -> Vec<String> {
        self.failed.iter().map(|f| f.code.clone()).collect()
    }
}

/// Result of one news refresh cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsCycleReport {
    pub cycle_id: Uuid,
    pub origin: NewsOrigin,
    pub article_count: usize,
}

impl NewsCycleReport {
    pub fn is_degraded(&self) -> bool {
        self.origin == NewsOrigin::BuiltInFallback
    }
}

/// Notification sent to subscribers after state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshEvent {
    Indicators(IndicatorCycleReport),
    News(NewsCycleReport),
    SelectionChanged(String),
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

pub struct Dashboard {
    indicator_source: Arc<dyn IndicatorSource>,
    registry: IndicatorRegistry,
    polarity: PolarityTable,
    lookback_periods: u32,
    /// Doubles as the news cycle guard.
    resolver: Mutex<FallbackResolver>,
    indicator_cycle: Mutex<()>,
    cache: FetchCache,
    selected: RwLock<String>,
    events: broadcast::Sender<RefreshEvent>,
}

impl Dashboard {
    /// Assemble a dashboard from explicit collaborators.
    ///
    /// `default_indicator` must be in `registry`.
    pub fn new(
        indicator_source: Arc<dyn IndicatorSource>,
        news_chain: Vec<Arc<dyn NewsProviderAdapter>>,
        registry: IndicatorRegistry,
        lookback_periods: u32,
        default_indicator: &str,
    ) -> Result<Self, PulseError> {
        if lookback_periods == 0 {
            return Err(PulseError::Config("lookback_periods must be positive".into()));
        }
        if !registry.contains(default_indicator) {
            return Err(PulseError::UnknownIndicator(default_indicator.to_string()));
        }
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            indicator_source,
            polarity: registry.polarity_table(),
            registry,
            lookback_periods,
            resolver: Mutex::new(FallbackResolver::new(news_chain)),
            indicator_cycle: Mutex::new(()),
            cache: FetchCache::new(),
            selected: RwLock::new(default_indicator.to_string()),
            events,
        })
    }

    /// Build the production wiring (World Bank + configured news chain).
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = build_client(config.engine.http_timeout())?;
        let source = Arc::new(WorldBankSource::new(&config.indicator_source.base_url, http.clone()));
        let chain = build_news_chain(&config.news_providers, &http);
        info!(
            providers = ?chain.iter().map(|a| a.id()).collect::<Vec<_>>(),
            enabled = chain.iter().filter(|a| a.is_enabled()).count(),
            "News fallback chain built"
        );
        Self::new(
            source,
            chain,
            config.registry()?,
            config.engine.lookback_periods,
            &config.engine.default_indicator,
        )
        .context("Failed to assemble dashboard")
    }

    // -- Pipelines --------------------------------------------------------

    /// Refresh every registered indicator, in registry order, one request
    /// at a time.
    pub async fn refresh_indicators(&self) -> IndicatorCycleReport {
        let codes = self.registry.codes();
        self.refresh_indicator_codes(&codes).await
    }

    /// Refresh a subset of indicators. Used by the scheduler to retry only
    /// the codes that failed.
    pub async fn refresh_indicator_codes(&self, codes: &[String]) -> IndicatorCycleReport {
        let _guard = self.indicator_cycle.lock().await;
        let cycle_id = Uuid::new_v4();
        let span = info_span!("indicator_cycle", cycle = %cycle_id, codes = codes.len());

        let report = async {
            let mut updated = Vec::new();
            let mut failed = Vec::new();

            for code in codes {
                match self.refresh_one(code).await {
                    Ok(()) => updated.push(code.clone()),
                    Err(e) => {
                        warn!(code = %code, error = %e, "No data for indicator");
                        failed.push(IndicatorFailure {
                            code: code.clone(),
                            reason: e.to_string(),
                        });
                    }
                }
            }

            info!(updated = updated.len(), failed = failed.len(), "Indicator cycle complete");
            IndicatorCycleReport { cycle_id, updated, failed }
        }
        .instrument(span)
        .await;

        let _ = self.events.send(RefreshEvent::Indicators(report.clone()));
        report
    }

    async fn refresh_one(&self, code: &str) -> Result<(), PulseError> {
        let def = self
            .registry
            .get(code)
            .ok_or_else(|| PulseError::UnknownIndicator(code.to_string()))?;

        let result = self
            .indicator_source
            .fetch_indicator(code, self.lookback_periods)
            .await;
        debug!(
            source = self.indicator_source.name(),
            code,
            outcome = result.label(),
            "Indicator fetch finished"
        );

        match result {
            ProviderResult::Ok(points) => {
                let series =
                    IndicatorSeries::from_newest_first(&def.code, &def.name, def.unit, points);
                debug!(series = %series, "Indicator series fetched");
                self.cache.put(code, series);
                Ok(())
            }
            ProviderResult::Empty => Err(PulseError::EmptyResult(code.to_string())),
            ProviderResult::Error(e) => Err(e.into()),
        }
    }

    /// Resolve news through the fallback chain. When every provider is
    /// exhausted the built-in articles are cached instead, marked degraded.
    pub async fn refresh_news(&self) -> NewsCycleReport {
        let mut resolver = self.resolver.lock().await;
        let cycle_id = Uuid::new_v4();
        let span = info_span!("news_cycle", cycle = %cycle_id);

        let batch = async {
            match resolver.resolve().await {
                Ok(resolution) => NewsBatch {
                    articles: resolution.articles,
                    origin: NewsOrigin::Provider(resolution.source),
                    fetched_at: Utc::now(),
                },
                Err(e) => {
                    warn!(error = %e, "Serving built-in fallback news");
                    NewsBatch {
                        articles: fallback_articles(),
                        origin: NewsOrigin::BuiltInFallback,
                        fetched_at: Utc::now(),
                    }
                }
            }
        }
        .instrument(span)
        .await;
        drop(resolver);

        let report = NewsCycleReport {
            cycle_id,
            origin: batch.origin.clone(),
            article_count: batch.articles.len(),
        };
        self.cache.put_news(batch);
        let _ = self.events.send(RefreshEvent::News(report.clone()));
        report
    }

    // -- Accessors --------------------------------------------------------

    /// Cached series for chart population.
    pub fn get_indicator_series(&self, code: &str) -> Option<IndicatorSeries> {
        self.cache.get(code)
    }

    /// Summary-card view of the cached series.
    pub fn get_metric_snapshot(&self, code: &str) -> Option<MetricSnapshot> {
        self.cache.get(code).and_then(|s| normalize(&s, &self.polarity))
    }

    /// Latest news batch (live or built-in fallback). `None` until the
    /// first news cycle has run.
    pub fn get_latest_news(&self) -> Option<NewsBatch> {
        self.cache.latest_news()
    }

    pub fn latest_news_source_used(&self) -> Option<String> {
        self.cache.latest_news_source_used()
    }

    /// Index of the provider the next news cycle will try first.
    pub async fn preferred_news_index(&self) -> usize {
        self.resolver.lock().await.preferred_index()
    }

    pub fn registry(&self) -> &IndicatorRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &FetchCache {
        &self.cache
    }

    pub fn selected_indicator(&self) -> String {
        self.selected
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Change the indicator shown in the main chart.
    pub fn select_indicator(&self, code: &str) -> Result<(), PulseError> {
        if !self.registry.contains(code) {
            return Err(PulseError::UnknownIndicator(code.to_string()));
        }
        *self.selected.write().unwrap_or_else(|e| e.into_inner()) = code.to_string();
        let _ = self.events.send(RefreshEvent::SelectionChanged(code.to_string()));
        Ok(())
    }

    /// Subscribe to refresh notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.events.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
