//! Process-wide fetch cache.
//!
//! Holds the latest series per indicator code and the latest news batch.
//! Written only by the fetch pipelines, read by display collaborators.
//! Each successful fetch replaces the entry for its key; nothing is
//! merged and nothing is persisted.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::types::{IndicatorSeries, NewsBatch};

#[derive(Default)]
struct CacheState {
    series: HashMap<String, IndicatorSeries>,
    news: Option<NewsBatch>,
    indicators_updated_at: Option<DateTime<Utc>>,
}

/// Shared cache. Cheap to read concurrently; writers take the lock only
/// for the duration of a map insert.
#[derive(Default)]
pub struct FetchCache {
    inner: RwLock<CacheState>,
}

impl FetchCache {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking writer cannot leave a half-written entry behind, so a
    // poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the series stored under `code`.
    pub fn put(&self, code: &str, series: IndicatorSeries) {
        debug!(code, points = series.len(), "Cache PUT series");
        let mut state = self.write();
        state.series.insert(code.to_string(), series);
        state.indicators_updated_at = Some(Utc::now());
    }

    pub fn get(&self, code: &str) -> Option<IndicatorSeries> {
        self.read().series.get(code).cloned()
    }

    /// Codes that currently have a cached series.
    pub fn codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.read().series.keys().cloned().collect();
        codes.sort();
        codes
    }

    /// Replace the cached news batch.
    pub fn put_news(&self, batch: NewsBatch) {
        debug!(origin = %batch.origin, count = batch.articles.len(), "Cache PUT news");
        self.write().news = Some(batch);
    }

    pub fn latest_news(&self) -> Option<NewsBatch> {
        self.read().news.clone()
    }

    /// Provider that produced the current news batch. `None` before the
    /// first news cycle and while built-in fallback content is served.
    pub fn latest_news_source_used(&self) -> Option<String> {
        self.read()
            .news
            .as_ref()
            .and_then(|b| b.provider_id().map(String::from))
    }

    pub fn indicators_updated_at(&self) -> Option<DateTime<Utc>> {
        self.read().indicators_updated_at
    }

    pub fn news_updated_at(&self) -> Option<DateTime<Utc>> {
        self.read().news.as_ref().map(|b| b.fetched_at)
    }
}
