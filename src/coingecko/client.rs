// =============================================================================
// CoinGecko REST API Client — public market-data endpoints
// =============================================================================
//
// Only two unauthenticated endpoints are used:
//   GET /coins/{id}/market_chart  — daily price history
//   GET /coins/markets            — current snapshot with % changes
//
// Any non-2xx response aborts the run; there is no retry.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use crate::types::{MarketSummary, PricePoint, PriceSeries};

/// Public CoinGecko API root.
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// CoinGecko REST API client.
#[derive(Clone)]
pub struct CoinGeckoClient {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a new `CoinGeckoClient` against `base_url` (no trailing slash
    /// required).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %base_url, "CoinGeckoClient initialised");

        Ok(Self { base_url, client })
    }

    // -------------------------------------------------------------------------
    // Endpoints
    // -------------------------------------------------------------------------

    /// GET /coins/{coin}/market_chart with daily granularity.
    #[instrument(skip(self), name = "coingecko::get_market_chart")]
    pub async fn get_market_chart(
        &self,
        coin: &str,
        vs_currency: &str,
        days: u32,
    ) -> Result<PriceSeries> {
        let url = format!("{}/coins/{}/market_chart", self.base_url, coin);
        let days = days.to_string();
        let query = [
            ("vs_currency", vs_currency),
            ("days", days.as_str()),
            ("interval", "daily"),
        ];

        let body = self.get_json(&url, &query).await?;
        let series = parse_market_chart(&body)?;

        debug!(coin, count = series.len(), "market chart fetched");
        Ok(series)
    }

    /// GET /coins/markets filtered to a single coin id.
    #[instrument(skip(self), name = "coingecko::get_market_summary")]
    pub async fn get_market_summary(&self, coin: &str, vs_currency: &str) -> Result<MarketSummary> {
        let url = format!("{}/coins/markets", self.base_url);
        let query = [
            ("vs_currency", vs_currency),
            ("ids", coin),
            ("price_change_percentage", "24h,7d,30d"),
        ];

        let body = self.get_json(&url, &query).await?;
        let summary = parse_market_summary(&body)
            .with_context(|| format!("no market data for coin '{coin}'"))?;

        debug!(coin, "market summary fetched");
        Ok(summary)
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    /// Issue a GET and decode the body as JSON, failing on non-2xx status.
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<serde_json::Value> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {url} request failed"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .with_context(|| format!("failed to read response body from {url}"))?;

        if !status.is_success() {
            anyhow::bail!("CoinGecko GET {} returned {}: {}", url, status, text);
        }

        serde_json::from_str(&text).with_context(|| format!("failed to parse JSON from {url}"))
    }
}

impl std::fmt::Debug for CoinGeckoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinGeckoClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

// =============================================================================
// Response parsing
// =============================================================================

/// Parse a `market_chart` response into a [`PriceSeries`].
///
/// The `prices` field is an array of `[unix_ms, price]` pairs.  Malformed
/// entries and entries that do not strictly advance the timestamp are
/// skipped with a warning.
pub fn parse_market_chart(body: &serde_json::Value) -> Result<PriceSeries> {
    let raw = body["prices"]
        .as_array()
        .context("market_chart response missing 'prices' array")?;

    let mut points: Vec<PricePoint> = Vec::with_capacity(raw.len());

    for entry in raw {
        let Some(point) = parse_price_entry(entry) else {
            warn!(entry = %entry, "skipping malformed price entry");
            continue;
        };

        if let Some(prev) = points.last() {
            if point.timestamp <= prev.timestamp {
                warn!(
                    timestamp = %point.timestamp,
                    previous = %prev.timestamp,
                    "skipping out-of-order price entry"
                );
                continue;
            }
        }

        points.push(point);
    }

    Ok(PriceSeries::new(points))
}

/// Parse a `/coins/markets` response, returning its first element.
pub fn parse_market_summary(body: &serde_json::Value) -> Result<MarketSummary> {
    let first = body
        .as_array()
        .context("markets response is not an array")?
        .first()
        .context("markets response is empty")?;

    serde_json::from_value(first.clone()).context("failed to decode market summary")
}

fn parse_price_entry(entry: &serde_json::Value) -> Option<PricePoint> {
    let pair = entry.as_array()?;
    if pair.len() < 2 {
        return None;
    }

    let ms = pair[0].as_i64().or_else(|| pair[0].as_f64().map(|f| f as i64))?;
    let price = pair[1].as_f64()?;
    let timestamp = DateTime::<Utc>::from_timestamp_millis(ms)?;

    Some(PricePoint { timestamp, price })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn market_chart_parses_prices() {
        let body = json!({
            "prices": [
                [1704067200000_i64, 42280.23],
                [1704153600000_i64, 44187.14],
                [1704240000000_i64, 44961.6]
            ],
            "market_caps": [],
            "total_volumes": []
        });
        let series = parse_market_chart(&body).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.first().unwrap().timestamp.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert!((series.last().unwrap().price - 44961.6).abs() < 1e-10);
    }

    #[test]
    fn market_chart_accepts_float_timestamps() {
        let body = json!({ "prices": [[1704067200000.0, 1.5], [1704153600000.0, 2.5]] });
        let series = parse_market_chart(&body).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn market_chart_skips_malformed_and_out_of_order() {
        let body = json!({
            "prices": [
                [1704067200000_i64, 1.0],
                [1704153600000_i64],
                ["oops", 2.0],
                [1704153600000_i64, 2.0],
                [1704067200000_i64, 9.9],
                [1704153600000_i64, 3.0],
                [1704240000000_i64, null],
                [1704240000000_i64, 4.0]
            ]
        });
        let series = parse_market_chart(&body).unwrap();
        assert_eq!(series.prices(), vec![1.0, 2.0, 4.0]);
    }

    #[test]
    fn market_chart_missing_prices_is_error() {
        assert!(parse_market_chart(&json!({ "error": "coin not found" })).is_err());
    }

    #[test]
    fn market_summary_takes_first_entry() {
        let body = json!([{
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "current_price": 67123.45,
            "market_cap": 1321000000000.0,
            "total_volume": 28000000000.0,
            "price_change_percentage_24h_in_currency": -1.234,
            "price_change_percentage_7d_in_currency": 3.5,
            "price_change_percentage_30d_in_currency": null
        }]);
        let summary = parse_market_summary(&body).unwrap();
        assert_eq!(summary.id, "bitcoin");
        assert_eq!(summary.symbol, "btc");
        assert_eq!(summary.current_price, Some(67123.45));
        assert_eq!(summary.price_change_percentage_7d_in_currency, Some(3.5));
        assert_eq!(summary.price_change_percentage_30d_in_currency, None);
    }

    #[test]
    fn market_summary_tolerates_missing_fields() {
        let summary = parse_market_summary(&json!([{ "id": "dogecoin" }])).unwrap();
        assert_eq!(summary.id, "dogecoin");
        assert!(summary.market_cap.is_none());
    }

    #[test]
    fn market_summary_empty_is_error() {
        assert!(parse_market_summary(&json!([])).is_err());
        assert!(parse_market_summary(&json!({ "status": "bad" })).is_err());
    }

    #[tokio::test]
    async fn non_success_status_carries_status_and_body() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;

            let body = r#"{"error":"coin not found"}"#;
            let resp = format!(
                "HTTP/1.1 404 Not Found\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(resp.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        let client = CoinGeckoClient::new(format!("http://{addr}"), Duration::from_secs(5)).unwrap();
        let err = client.get_market_summary("no-such-coin", "usd").await.unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("404"), "unexpected error: {msg}");
        assert!(msg.contains("coin not found"), "unexpected error: {msg}");
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = CoinGeckoClient::new("http://localhost:1/api/v3/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://localhost:1/api/v3");
    }
}
