//! Periodic refresh scheduler.
//!
//! Runs the indicator and news pipelines on two independent intervals.
//! Both loops tick once immediately, skip ticks missed while a cycle was
//! still running, and stop when the shutdown channel flips. A degraded
//! cycle is retried a bounded number of times with exponential backoff;
//! indicator retries only re-fetch the codes that failed.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::dashboard::Dashboard;
use crate::config::EngineConfig;

/// Timing knobs for the two loops.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub indicator_interval: Duration,
    pub news_interval: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl From<&EngineConfig> for SchedulerConfig {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            indicator_interval: Duration::from_secs(cfg.indicator_interval_secs),
            news_interval: Duration::from_secs(cfg.news_interval_secs),
            max_retries: cfg.max_retries,
            retry_backoff: Duration::from_secs(cfg.retry_backoff_secs),
        }
    }
}

/// Delay before retry number `attempt` (0-based): `base * 2^attempt`.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1u32 << attempt.min(16))
}

/// Sleep for `delay` unless shutdown is requested first. Returns `false`
/// on shutdown.
async fn sleep_or_shutdown(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = shutdown.changed() => false,
    }
}

fn shutdown_requested(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow()
}

/// Handles to the two running loops.
pub struct SchedulerHandle {
    indicators: JoinHandle<()>,
    news: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Wait for both loops to finish.
    pub async fn join(self) {
        let (a, b) = futures::future::join(self.indicators, self.news).await;
        for result in [a, b] {
            if let Err(e) = result {
                warn!(error = %e, "Scheduler loop panicked");
            }
        }
    }
}

pub struct Scheduler {
    dashboard: Arc<Dashboard>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(dashboard: Arc<Dashboard>, config: SchedulerConfig) -> Self {
        Self { dashboard, config }
    }

    /// Spawn both loops. They run until `shutdown` becomes `true` or its
    /// sender is dropped.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> SchedulerHandle {
        let indicators = tokio::spawn(run_indicator_loop(
            self.dashboard.clone(),
            self.config.clone(),
            shutdown.clone(),
        ));
        let news = tokio::spawn(run_news_loop(self.dashboard, self.config, shutdown));
        SchedulerHandle { indicators, news }
    }
}

async fn run_indicator_loop(
    dashboard: Arc<Dashboard>,
    config: SchedulerConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(config.indicator_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(interval = ?config.indicator_interval, "Indicator loop started");

    while !shutdown_requested(&shutdown) {
        tokio::select! {
            _ = interval.tick() => {
                let report = dashboard.refresh_indicators().await;
                let mut failed = report.failed_codes();
                let mut attempt = 0;
                while !failed.is_empty() && attempt < config.max_retries {
                    let delay = backoff_delay(config.retry_backoff, attempt);
                    warn!(failed = failed.len(), attempt = attempt + 1, delay = ?delay, "Retrying indicators");
                    if !sleep_or_shutdown(delay, &mut shutdown).await {
                        break;
                    }
                    attempt += 1;
                    failed = dashboard.refresh_indicator_codes(&failed).await.failed_codes();
                }
            }
            _ = shutdown.changed() => break,
        }
    }

    info!("Indicator loop stopped");
}

async fn run_news_loop(
    dashboard: Arc<Dashboard>,
    config: SchedulerConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(config.news_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(interval = ?config.news_interval, "News loop started");

    while !shutdown_requested(&shutdown) {
        tokio::select! {
            _ = interval.tick() => {
                let mut report = dashboard.refresh_news().await;
                let mut attempt = 0;
                while report.is_degraded() && attempt < config.max_retries {
                    let delay = backoff_delay(config.retry_backoff, attempt);
                    warn!(attempt = attempt + 1, delay = ?delay, "Retrying news");
                    if !sleep_or_shutdown(delay, &mut shutdown).await {
                        break;
                    }
                    attempt += 1;
                    report = dashboard.refresh_news().await;
                }
            }
            _ = shutdown.changed() => break,
        }
    }

    info!("News loop stopped");
}
