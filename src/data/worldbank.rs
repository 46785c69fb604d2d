//! World Bank indicator source.
//!
//! Fetches annual observations for a single indicator code. No credential
//! is required.
//!
//! API: `{base}/{indicatorCode}?format=json&per_page={N}`
//! Response: a two-element array `[metadata, dataPoints]`, newest first.
//! `dataPoints` is `null` when the indicator has no data for the country.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{get_text, IndicatorSource};
use crate::types::{FetchError, ProviderResult, RawPoint};

const SOURCE_NAME: &str = "worldbank";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WorldBankPoint {
    date: String,
    #[serde(default)]
    value: Option<f64>,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct WorldBankSource {
    http: Client,
    base_url: String,
}

impl WorldBankSource {
    pub fn new(base_url: &str, http: Client) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn series_url(&self, code: &str, lookback_periods: u32) -> String {
        format!(
            "{}/{}?format=json&per_page={}",
            self.base_url,
            urlencoding::encode(code),
            lookback_periods
        )
    }
}

/// Extract the data points from a decoded response body.
///
/// Null-valued points are dropped; the remaining order (newest first) is
/// preserved.
fn parse_points(body: &serde_json::Value) -> Result<Vec<RawPoint>, FetchError> {
    let top = body
        .as_array()
        .ok_or_else(|| FetchError::Parse("expected a top-level array".into()))?;

    let data = match top.get(1) {
        Some(serde_json::Value::Null) => return Ok(Vec::new()),
        Some(data) => data,
        None => {
            let message = top
                .first()
                .and_then(|meta| meta.get("message"))
                .map(|m| m.to_string())
                .unwrap_or_else(|| "missing data element".into());
            return Err(FetchError::Parse(message));
        }
    };

    let points: Vec<WorldBankPoint> = serde_json::from_value(data.clone())
        .map_err(|e| FetchError::Parse(format!("unexpected data point shape: {e}")))?;

    Ok(points
        .into_iter()
        .filter(|p| p.value.is_some())
        .map(|p| RawPoint { period: p.date, value: p.value })
        .collect())
}

#[async_trait]
impl IndicatorSource for WorldBankSource {
    #[instrument(name = "WorldBankFetch", skip(self), fields(code = %code))]
    async fn fetch_indicator(&self, code: &str, lookback_periods: u32) -> ProviderResult<RawPoint> {
        let url = self.series_url(code, lookback_periods);
        debug!(url = %url, "Requesting indicator series");

        let text = match get_text(&self.http, &url).await {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "Indicator request failed");
                return ProviderResult::Error(e);
            }
        };

        // A body that is not JSON at all is treated as a transport-level failure.
        let body: serde_json::Value = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) => {
                debug!(error = %e, "Indicator response is not JSON");
                return ProviderResult::Error(FetchError::Network(format!("non-JSON body: {e}")));
            }
        };

        match parse_points(&body) {
            Ok(points) => {
                debug!(count = points.len(), "Indicator points parsed");
                ProviderResult::from_items(points)
            }
            Err(e) => {
                debug!(error = %e, "Unexpected indicator response shape");
                ProviderResult::Error(e)
            }
        }
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(base: &str) -> WorldBankSource {
        let http = super::super::build_client(Duration::from_secs(5)).unwrap();
        WorldBankSource::new(base, http)
    }

    #[test]
    fn test_parse_points_drops_nulls() {
        let body = json!([
            {"page": 1, "pages": 1},
            [
                {"date": "2023", "value": null},
                {"date": "2022", "value": 4.0e11},
                {"date": "2021", "value": 3.8e11}
            ]
        ]);
        let points = parse_points(&body).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].period, "2022");
        assert_eq!(points[1].value, Some(3.8e11));
    }

    #[test]
    fn test_parse_points_null_data_is_empty() {
        let body = json!([{"page": 0}, null]);
        assert!(parse_points(&body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_points_error_message_shape() {
        let body = json!([{"message": [{"id": "120", "value": "Invalid value"}]}]);
        assert!(matches!(parse_points(&body), Err(FetchError::Parse(_))));
    }

    #[test]
    fn test_parse_points_not_an_array() {
        let body = json!({"error": "nope"});
        assert!(matches!(parse_points(&body), Err(FetchError::Parse(_))));
    }

    #[test]
    fn test_series_url() {
        let s = source("https://api.worldbank.org/v2/country/NGA/indicator/");
        assert_eq!(
            s.series_url("NY.GDP.MKTP.CD", 15),
            "https://api.worldbank.org/v2/country/NGA/indicator/NY.GDP.MKTP.CD?format=json&per_page=15"
        );
    }

    #[tokio::test]
    async fn test_fetch_indicator_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/NY.GDP.MKTP.CD"))
            .and(query_param("format", "json"))
            .and(query_param("per_page", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"page": 1},
                [{"date": "2022", "value": 4.0e11}, {"date": "2021", "value": null}]
            ])))
            .mount(&server)
            .await;

        let result = source(&server.uri()).fetch_indicator("NY.GDP.MKTP.CD", 3).await;
        match result {
            ProviderResult::Ok(points) => {
                assert_eq!(points.len(), 1);
                assert_eq!(points[0].period, "2022");
            }
            other => panic!("expected ok, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_indicator_all_null_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"page": 1},
                [{"date": "2023", "value": null}]
            ])))
            .mount(&server)
            .await;

        let result = source(&server.uri()).fetch_indicator("SL.UEM.TOTL.ZS", 15).await;
        assert_eq!(result, ProviderResult::Empty);
    }

    #[tokio::test]
    async fn test_fetch_indicator_non_json_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let result = source(&server.uri()).fetch_indicator("FP.CPI.TOTL.ZG", 15).await;
        assert!(matches!(result, ProviderResult::Error(FetchError::Network(_))));
    }

    #[tokio::test]
    async fn test_fetch_indicator_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = source(&server.uri()).fetch_indicator("FP.CPI.TOTL.ZG", 15).await;
        assert_eq!(result, ProviderResult::Error(FetchError::Http(503)));
    }

    #[tokio::test]
    async fn test_fetch_indicator_connection_refused() {
        // Nothing listens on port 9 locally.
        let result = source("http://127.0.0.1:9").fetch_indicator("X", 1).await;
        assert!(matches!(result, ProviderResult::Error(FetchError::Network(_))));
    }
}
