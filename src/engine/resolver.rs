//! News fallback resolver.
//!
//! Walks an ordered chain of news adapters until one yields a non-empty
//! batch. First success wins; results from different providers are never
//! merged. The resolver remembers which provider last succeeded and tries
//! it first on the next call, so repeated polls stop hammering a source
//! that is known to be failing.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::data::NewsProviderAdapter;
use crate::types::{NewsArticle, ProviderResult, PulseError};

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub articles: Vec<NewsArticle>,
    /// Id of the provider that produced `articles`.
    pub source: String,
    /// Index of that provider in the chain.
    pub index: usize,
}

/// Order in which the chain is tried: `preferred` first, then the rest in
/// their chain order. An out-of-range preference is ignored.
fn attempt_order(len: usize, preferred: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(len);
    if preferred < len {
        order.push(preferred);
    }
    order.extend((0..len).filter(|&i| i != preferred));
    order
}

/// Try `adapters` starting at `preferred_index`; stop at the first
/// non-empty `Ok`. Disabled adapters are skipped without a request.
pub async fn resolve_news(
    adapters: &[Arc<dyn NewsProviderAdapter>],
    preferred_index: usize,
) -> Result<Resolution, PulseError> {
    let mut tried = Vec::new();

    for index in attempt_order(adapters.len(), preferred_index) {
        let adapter = &adapters[index];
        if !adapter.is_enabled() {
            debug!(provider = adapter.id(), "Provider disabled, skipping");
            continue;
        }

        tried.push(adapter.id().to_string());
        match adapter.fetch().await {
            ProviderResult::Ok(articles) if !articles.is_empty() => {
                info!(provider = adapter.id(), count = articles.len(), "News resolved");
                return Ok(Resolution {
                    articles,
                    source: adapter.id().to_string(),
                    index,
                });
            }
            ProviderResult::Ok(_) | ProviderResult::Empty => {
                debug!(provider = adapter.id(), "Provider returned no articles");
            }
            ProviderResult::Error(e) => {
                warn!(provider = adapter.id(), error = %e, "Provider failed, trying next");
            }
        }
    }

    Err(PulseError::AllSourcesExhausted { tried })
}

/// Stateful resolver with sticky preference for the last working source.
pub struct FallbackResolver {
    adapters: Vec<Arc<dyn NewsProviderAdapter>>,
    preferred: usize,
}

impl FallbackResolver {
    pub fn new(adapters: Vec<Arc<dyn NewsProviderAdapter>>) -> Self {
        Self { adapters, preferred: 0 }
    }

    /// Start with a specific preference instead of the head of the chain.
    pub fn with_preferred(mut self, index: usize) -> Self {
        self.preferred = index;
        self
    }

    pub fn preferred_index(&self) -> usize {
        self.preferred
    }

    /// Resolve once. On success the winning index becomes the preference
    /// for the next call; on exhaustion the preference is left unchanged.
    pub async fn resolve(&mut self) -> Result<Resolution, PulseError> {
        let resolution = resolve_news(&self.adapters, self.preferred).await?;
        if resolution.index != self.preferred {
            info!(
                from = self.preferred,
                to = resolution.index,
                provider = %resolution.source,
                "Sticky news preference moved"
            );
        }
        self.preferred = resolution.index;
        Ok(resolution)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
