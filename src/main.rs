// =============================================================================
// Coin Indicators — Main Entry Point
// =============================================================================
//
// One linear run: fetch price history and market summary, compute moving
// averages and RSI, render the chart, print the summary, save the CSV.
// Any error aborts the run.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod coingecko;
mod indicators;
mod report;
mod runtime_config;
mod types;

use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::coingecko::CoinGeckoClient;
use crate::runtime_config::RunConfig;

const DEFAULT_CONFIG_PATH: &str = "coin_indicators.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("COIN_INDICATORS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());

    let mut config = if Path::new(&config_path).exists() {
        RunConfig::load(&config_path)?
    } else {
        warn!(path = %config_path, "config file not found, using defaults");
        RunConfig::default()
    };
    config.apply_env()?;
    config.validate()?;

    info!(
        coin = %config.coin,
        vs_currency = %config.vs_currency,
        days = config.days,
        fast_window = config.fast_window,
        slow_window = config.slow_window,
        rsi_window = config.rsi_window,
        "run configured"
    );

    // ── 2. Fetch ─────────────────────────────────────────────────────────
    let client = CoinGeckoClient::new(
        config.api_base_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;

    let series = client
        .get_market_chart(&config.coin, &config.vs_currency, config.days)
        .await?;
    let summary = client
        .get_market_summary(&config.coin, &config.vs_currency)
        .await?;

    if series.is_empty() {
        anyhow::bail!("no price history returned for '{}'", config.coin);
    }
    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        info!(
            points = series.len(),
            from = %first.timestamp,
            to = %last.timestamp,
            "price history received"
        );
    }
    if series.len() < config.slow_window {
        warn!(
            points = series.len(),
            slow_window = config.slow_window,
            "history shorter than slow MA window; MA will be undefined"
        );
    }

    // ── 3. Transform ─────────────────────────────────────────────────────
    let frame = indicators::compute_indicators(series, config.indicator_params());

    // ── 4. Plot ──────────────────────────────────────────────────────────
    let symbol = if summary.symbol.is_empty() {
        config.coin.to_uppercase()
    } else {
        summary.symbol.to_uppercase()
    };
    report::save_chart(&config.chart_path(), &frame, &symbol)?;

    // ── 5. Print ─────────────────────────────────────────────────────────
    print!("{}", report::render_summary(&summary, &frame, &config.vs_currency));

    // ── 6. Save ──────────────────────────────────────────────────────────
    let csv_path = config.csv_path();
    report::save_csv(&csv_path, &frame)?;
    println!("✅ Saved {}", csv_path.display());

    Ok(())
}
