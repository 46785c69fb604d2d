//! End-to-end runs through the real adapters against a wiremock server.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use econpulse::config::AppConfig;
use econpulse::engine::{Dashboard, Scheduler, SchedulerConfig};
use econpulse::registry::GDP_CODE;
use econpulse::types::{Direction, NewsOrigin};

const INDICATOR_PATH: &str = "/v2/country/NGA/indicator";

fn config_for(server: &MockServer, news_enabled: bool) -> AppConfig {
    let uri = server.uri();
    AppConfig::from_toml(&format!(
        r#"
        [engine]
        http_timeout_secs = 5
        lookback_periods = 15

        [indicator_source]
        base_url = "{uri}{INDICATOR_PATH}"

        [[news_providers]]
        kind = "gnews"
        enabled = {news_enabled}
        api_key = "gnews-test-key"
        endpoint = "{uri}/gnews/search"

        [[news_providers]]
        kind = "newsapi"
        enabled = {news_enabled}
        api_key = "newsapi-test-key"
        endpoint = "{uri}/newsapi/everything"

        [[news_providers]]
        kind = "mediastack"
        enabled = true
        api_key = "YOUR_MEDIASTACK_KEY_HERE"
        endpoint = "{uri}/mediastack/news"
        "#
    ))
    .unwrap()
}

async fn mount_gdp(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("{INDICATOR_PATH}/{GDP_CODE}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"page": 1, "pages": 1, "per_page": 15, "total": 3},
            [
                {"indicator": {"id": GDP_CODE, "value": "GDP (current US$)"}, "date": "2023", "value": null},
                {"indicator": {"id": GDP_CODE, "value": "GDP (current US$)"}, "date": "2022", "value": 4.0e11},
                {"indicator": {"id": GDP_CODE, "value": "GDP (current US$)"}, "date": "2021", "value": 3.8e11}
            ]
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn gdp_series_flows_from_http_to_snapshot() {
    let server = MockServer::start().await;
    mount_gdp(&server).await;
    let d = Dashboard::from_config(&config_for(&server, false)).unwrap();

    let report = d.refresh_indicators().await;
    assert_eq!(report.updated, vec![GDP_CODE.to_string()]);
    // The other five codes hit unmatched routes and 404.
    assert_eq!(report.failed.len(), 5);

    let series = d.get_indicator_series(GDP_CODE).unwrap();
    let periods: Vec<&str> = series.points.iter().map(|p| p.period.as_str()).collect();
    assert_eq!(periods, vec!["2021", "2022"]);

    let snap = d.get_metric_snapshot(GDP_CODE).unwrap();
    assert_eq!(snap.period, "2022");
    assert_eq!(snap.latest_value, 4.0e11);
    assert_eq!(snap.previous_value, Some(3.8e11));
    assert!((snap.percent_change.unwrap() - 5.263157894736842).abs() < 1e-9);
    assert_eq!(snap.direction, Direction::Favorable);
}

#[tokio::test]
async fn keyless_news_chain_is_degraded() {
    let server = MockServer::start().await;
    let d = Dashboard::from_config(&config_for(&server, false)).unwrap();

    let report = d.refresh_news().await;
    assert_eq!(report.origin, NewsOrigin::BuiltInFallback);
    assert_eq!(report.article_count, 6);
    // Disabled and placeholder-keyed providers never hit the network.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn news_failover_is_sticky_across_polls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gnews/search"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/newsapi/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "totalResults": 1,
            "articles": [{
                "source": {"id": null, "name": "Premium Times"},
                "title": "Naira gains at official window",
                "description": null,
                "url": "https://news.example/naira",
                "urlToImage": null,
                "publishedAt": "2024-03-10T09:00:00Z"
            }]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let d = Dashboard::from_config(&config_for(&server, true)).unwrap();

    d.refresh_news().await;
    assert_eq!(d.latest_news_source_used().as_deref(), Some("newsapi"));
    d.refresh_news().await;
    assert_eq!(d.latest_news_source_used().as_deref(), Some("newsapi"));

    let batch = d.get_latest_news().unwrap();
    assert_eq!(batch.articles.len(), 1);
    assert_eq!(batch.articles[0].source_name, "Premium Times");
    assert!(batch.articles[0].published_at.is_some());
}

#[tokio::test]
async fn scheduler_populates_both_domains() {
    let server = MockServer::start().await;
    mount_gdp(&server).await;
    let cfg = config_for(&server, false);
    let d = Arc::new(Dashboard::from_config(&cfg).unwrap());

    let (tx, rx) = watch::channel(false);
    let timing = SchedulerConfig {
        indicator_interval: Duration::from_secs(60),
        news_interval: Duration::from_secs(60),
        max_retries: 0,
        retry_backoff: Duration::from_millis(10),
    };
    let mut events = d.subscribe();
    let handle = Scheduler::new(d.clone(), timing).spawn(rx);

    for _ in 0..2 {
        tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .unwrap()
            .unwrap();
    }
    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle.join()).await.unwrap();

    assert!(d.get_indicator_series(GDP_CODE).is_some());
    assert!(d.get_latest_news().unwrap().is_degraded());
    assert!(d.cache().indicators_updated_at().is_some());
    assert!(d.cache().news_updated_at().is_some());
}
