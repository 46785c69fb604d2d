//! Dashboard pipelines driven by stub sources.

use chrono::Utc;
use std::sync::Arc;

use econpulse::display;
use econpulse::engine::{Dashboard, RefreshEvent};
use econpulse::registry::{IndicatorRegistry, GDP_CODE};
use econpulse::types::{Direction, FetchError, NewsOrigin};

use crate::stub_sources::{chain, StubIndicatorSource, StubNewsSource};

const INFLATION: &str = "FP.CPI.TOTL.ZG";

fn dashboard(
    source: &Arc<StubIndicatorSource>,
    news: &[&Arc<StubNewsSource>],
) -> Dashboard {
    Dashboard::new(source.clone(), chain(news), IndicatorRegistry::built_in(), 15, GDP_CODE)
        .unwrap()
}

#[tokio::test]
async fn indicator_cycle_feeds_cards_and_charts() {
    let source = Arc::new(StubIndicatorSource::new());
    source.set_points(
        GDP_CODE,
        &[
            ("2022", Some(4.77e11)),
            ("2021", Some(4.40e11)),
            ("2020", Some(4.32e11)),
            ("2019", Some(4.48e11)),
            ("2018", Some(4.21e11)),
            ("2017", Some(3.75e11)),
        ],
    );
    source.set_points(INFLATION, &[("2022", Some(18.8)), ("2021", Some(17.0))]);
    let d = dashboard(&source, &[]);

    let report = d.refresh_indicators().await;
    assert_eq!(source.calls(), 6);
    assert_eq!(report.updated, vec![GDP_CODE.to_string(), INFLATION.to_string()]);
    assert!(report.is_degraded());

    let cards = display::metric_cards(&d);
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].name, "GDP");
    assert_eq!(cards[0].value_label, "$477.00B");
    assert_eq!(cards[0].direction, Direction::Favorable);
    assert_eq!(cards[1].name, "Inflation Rate");
    assert_eq!(cards[1].direction, Direction::Unfavorable);
    assert_eq!(cards[1].change_label, "↑ 10.6%");
    assert_eq!(cards[1].period_label, "Year: 2022");

    let main = display::main_chart(&d).unwrap();
    assert_eq!(main.points.len(), 6);
    assert_eq!(main.points[0].label, "2017");
    assert_eq!(main.tick_label(main.points[5].value), "$477.0B");

    let comparison = display::comparison_chart(&d).unwrap();
    let labels: Vec<&str> = comparison.points.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["2018", "2019", "2020", "2021", "2022"]);
    assert_eq!(comparison.points[4].value, 477.0);
    assert_eq!(comparison.tick_label(comparison.points[4].value), "$477B");
    assert_eq!(comparison.tooltip_label(comparison.points[4].value), "GDP: $477.00B");
}

#[tokio::test]
async fn comparison_chart_needs_five_periods() {
    let source = Arc::new(StubIndicatorSource::new());
    source.set_points(GDP_CODE, &[("2022", Some(4.0e11)), ("2021", Some(3.8e11))]);
    let d = dashboard(&source, &[]);
    d.refresh_indicators().await;

    assert!(display::main_chart(&d).is_some());
    assert!(display::comparison_chart(&d).is_none());
}

#[tokio::test]
async fn failed_refresh_keeps_last_good_series() {
    let source = Arc::new(StubIndicatorSource::new());
    source.set_points(INFLATION, &[("2022", Some(18.8)), ("2021", Some(17.0))]);
    let d = dashboard(&source, &[]);
    d.refresh_indicators().await;

    source.set_error(INFLATION, FetchError::Http(502));
    let report = d.refresh_indicators().await;
    assert!(report.failed_codes().contains(&INFLATION.to_string()));

    let series = d.get_indicator_series(INFLATION).unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(d.get_metric_snapshot(INFLATION).unwrap().latest_value, 18.8);
}

#[tokio::test]
async fn selection_drives_main_chart() {
    let source = Arc::new(StubIndicatorSource::new());
    source.set_points(GDP_CODE, &[("2022", Some(4.0e11))]);
    source.set_points(INFLATION, &[("2022", Some(18.8)), ("2021", Some(17.0))]);
    let d = dashboard(&source, &[]);
    d.refresh_indicators().await;

    assert_eq!(display::main_chart(&d).unwrap().code, GDP_CODE);
    d.select_indicator(INFLATION).unwrap();
    let chart = display::main_chart(&d).unwrap();
    assert_eq!(chart.code, INFLATION);
    assert_eq!(chart.tick_label(18.8), "18.8%");

    assert!(d.select_indicator("XX.UNKNOWN").is_err());
    assert_eq!(d.selected_indicator(), INFLATION);
}

#[tokio::test]
async fn news_falls_through_chain_and_sticks() {
    let source = Arc::new(StubIndicatorSource::new());
    let a = StubNewsSource::new("a", true);
    let b = StubNewsSource::new("b", true);
    let c = StubNewsSource::new("c", true);
    a.fail_with(FetchError::Network("connection refused".into()));
    b.succeed_with(&["Naira steadies", "CBN holds rate"]);
    c.succeed_with(&["Never shown"]);
    let d = dashboard(&source, &[&a, &b, &c]);

    let report = d.refresh_news().await;
    assert_eq!(report.origin, NewsOrigin::Provider("b".into()));
    assert_eq!(report.article_count, 2);
    assert_eq!((a.calls(), b.calls(), c.calls()), (1, 1, 0));

    // Next poll goes straight to "b".
    d.refresh_news().await;
    assert_eq!((a.calls(), b.calls(), c.calls()), (1, 2, 0));

    // "b" breaks: the rest are tried in chain order.
    b.fail_with(FetchError::Http(429));
    a.succeed_with(&["Back online"]);
    d.refresh_news().await;
    assert_eq!(d.latest_news_source_used().as_deref(), Some("a"));
    assert_eq!(d.preferred_news_index().await, 0);
}

#[tokio::test]
async fn exhausted_chain_serves_fallback_then_recovers() {
    let source = Arc::new(StubIndicatorSource::new());
    let a = StubNewsSource::new("a", true);
    let disabled = StubNewsSource::new("off", false);
    a.fail_with(FetchError::Parse("not json".into()));
    let d = dashboard(&source, &[&disabled, &a]);
    let mut events = d.subscribe();

    let report = d.refresh_news().await;
    assert!(report.is_degraded());
    assert_eq!(disabled.calls(), 0);
    match events.recv().await.unwrap() {
        RefreshEvent::News(r) => assert_eq!(r.origin, NewsOrigin::BuiltInFallback),
        other => panic!("unexpected event {other:?}"),
    }

    let panel = display::news_panel(&d.get_latest_news().unwrap(), Utc::now());
    assert!(panel.degraded);
    assert_eq!(panel.items.len(), 6);
    assert_eq!(panel.signup_links.len(), 3);

    a.succeed_with(&["Live again"]);
    let report = d.refresh_news().await;
    assert!(!report.is_degraded());
    let panel = display::news_panel(&d.get_latest_news().unwrap(), Utc::now());
    assert!(!panel.degraded);
    assert_eq!(panel.items[0].title, "Live again");
    assert_eq!(panel.items[0].meta, "Recently");
}
