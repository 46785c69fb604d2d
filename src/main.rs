//! ECONPULSE: economic indicator and news aggregation engine
//!
//! Entry point. Loads configuration, initialises structured logging,
//! starts the indicator and news refresh loops, and renders the dashboard
//! to the console whenever a cycle completes. Ctrl+C stops both loops.

use anyhow::Result;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use econpulse::config::AppConfig;
use econpulse::display::{self, MetricCard, NewsPanel};
use econpulse::engine::{Dashboard, RefreshEvent, Scheduler, SchedulerConfig};

const BANNER: &str = r#"
 _____ ____ ___  _   _ ____  _   _ _     ____  _____
| ____/ ___/ _ \| \ | |  _ \| | | | |   / ___|| ____|
|  _|| |  | | | |  \| | |_) | | | | |   \___ \|  _|
| |__| |__| |_| | |\  |  __/| |_| | |___ ___) | |___
|_____\____\___/|_| \_|_|    \___/|_____|____/|_____|

  Economic indicators + news, refreshed on a schedule
"#;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path =
        std::env::var("ECONPULSE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = if Path::new(&config_path).exists() {
        AppConfig::load(&config_path)?
    } else {
        warn!(path = %config_path, "Config file not found, using defaults");
        AppConfig::default()
    };

    println!("{BANNER}");
    info!(
        indicator_interval_secs = cfg.engine.indicator_interval_secs,
        news_interval_secs = cfg.engine.news_interval_secs,
        lookback = cfg.engine.lookback_periods,
        source = %cfg.indicator_source.base_url,
        "ECONPULSE starting up"
    );

    // -- Initialise components -------------------------------------------

    let dashboard = Arc::new(Dashboard::from_config(&cfg)?);
    let events = dashboard.subscribe();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = Scheduler::new(dashboard.clone(), SchedulerConfig::from(&cfg.engine));
    let handle = scheduler.spawn(shutdown_rx.clone());

    let console = tokio::spawn(run_console(dashboard.clone(), events, shutdown_rx));

    info!("Refresh loops running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received.");

    let _ = shutdown_tx.send(true);
    handle.join().await;
    let _ = console.await;

    info!(
        cached_indicators = dashboard.cache().codes().len(),
        news_source = ?dashboard.latest_news_source_used(),
        "ECONPULSE shut down cleanly."
    );
    Ok(())
}

/// Console rendering collaborator: redraws on every refresh event.
async fn run_console(
    dashboard: Arc<Dashboard>,
    mut events: broadcast::Receiver<RefreshEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(RefreshEvent::Indicators(report)) => {
                    if report.is_degraded() {
                        warn!(failed = ?report.failed_codes(), "Some indicators have no data");
                    }
                    print_cards(&display::metric_cards(&dashboard));
                    if let Some(chart) = display::main_chart(&dashboard) {
                        let latest = chart.points.last().map(|p| chart.tick_label(p.value));
                        println!("  Chart: {} ({} points, latest {})",
                            chart.title, chart.points.len(), latest.unwrap_or_default());
                    }
                }
                Ok(RefreshEvent::News(_)) => {
                    if let Some(batch) = dashboard.get_latest_news() {
                        print_news(&display::news_panel(&batch, Utc::now()));
                    }
                }
                Ok(RefreshEvent::SelectionChanged(code)) => {
                    info!(code = %code, "Selected indicator changed");
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "Console fell behind refresh events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = shutdown.changed() => break,
        }
    }
}

fn print_cards(cards: &[MetricCard]) {
    println!("\n== Indicators ==");
    for card in cards {
        println!(
            "  {:<18} {:>12}  {:<8} [{}]  {}",
            card.name, card.value_label, card.change_label, card.direction, card.period_label
        );
    }
}

fn print_news(panel: &NewsPanel) {
    match &panel.source_used {
        Some(source) => println!("\n== News (via {source}) =="),
        None => println!("\n== News (offline) =="),
    }
    for item in &panel.items {
        println!("  {} | {}", item.source, item.title);
        println!("    {}", item.meta);
        println!("    {}", item.description);
        if let Some(link) = &item.link {
            println!("    {link}");
        }
    }
    if panel.degraded {
        let links: Vec<String> = panel
            .signup_links
            .iter()
            .map(|(name, url)| format!("{name} ({url})"))
            .collect();
        println!("  Get live news with a free API key from: {}", links.join(" • "));
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("econpulse=info"));

    let json_logging = std::env::var("ECONPULSE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
