//! Stub sources for integration testing.
//!
//! Deterministic `IndicatorSource` and `NewsProviderAdapter`
//! implementations whose responses are fully controllable from test code.
//! Every call is counted.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use econpulse::data::{IndicatorSource, NewsProviderAdapter};
use econpulse::types::{FetchError, NewsArticle, ProviderResult, RawPoint};

/// Indicator source backed by a per-code response table.
#[derive(Default)]
pub struct StubIndicatorSource {
    responses: Mutex<HashMap<String, ProviderResult<RawPoint>>>,
    calls: AtomicUsize,
}

impl StubIndicatorSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest-first points, as the upstream API delivers them.
    pub fn set_points(&self, code: &str, points: &[(&str, Option<f64>)]) {
        let points = points
            .iter()
            .map(|(period, value)| RawPoint { period: period.to_string(), value: *value })
            .collect();
        self.set(code, ProviderResult::Ok(points));
    }

    pub fn set_error(&self, code: &str, error: FetchError) {
        self.set(code, ProviderResult::Error(error));
    }

    pub fn set(&self, code: &str, result: ProviderResult<RawPoint>) {
        self.responses.lock().unwrap().insert(code.to_string(), result);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IndicatorSource for StubIndicatorSource {
    async fn fetch_indicator(&self, code: &str, _lookback_periods: u32) -> ProviderResult<RawPoint> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .get(code)
            .cloned()
            .unwrap_or(ProviderResult::Empty)
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// News provider whose next result can be swapped at any time.
pub struct StubNewsSource {
    id: &'static str,
    enabled: bool,
    result: Mutex<ProviderResult<NewsArticle>>,
    calls: AtomicUsize,
}

impl StubNewsSource {
    pub fn new(id: &'static str, enabled: bool) -> Arc<Self> {
        Arc::new(Self {
            id,
            enabled,
            result: Mutex::new(ProviderResult::Empty),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn succeed_with(&self, titles: &[&str]) {
        let articles = titles.iter().map(|t| article(t, self.id)).collect();
        *self.result.lock().unwrap() = ProviderResult::Ok(articles);
    }

    pub fn fail_with(&self, error: FetchError) {
        *self.result.lock().unwrap() = ProviderResult::Error(error);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NewsProviderAdapter for StubNewsSource {
    fn id(&self) -> &'static str {
        self.id
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn fetch(&self) -> ProviderResult<NewsArticle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.lock().unwrap().clone()
    }
}

pub fn article(title: &str, provider: &str) -> NewsArticle {
    NewsArticle {
        title: title.to_string(),
        description: Some(format!("{title} in detail")),
        source_name: "Stub Wire".to_string(),
        url: Some(format!("https://news.example/{}", title.replace(' ', "-"))),
        published_at: None,
        time_hint: None,
        image: None,
        category: None,
        provider: provider.to_string(),
    }
}

/// Upcast helper for building chains.
pub fn chain(sources: &[&Arc<StubNewsSource>]) -> Vec<Arc<dyn NewsProviderAdapter>> {
    sources
        .iter()
        .map(|s| -> Arc<dyn NewsProviderAdapter> { (*s).clone() })
        .collect()
}
