// =============================================================================
// Runtime Configuration — JSON file + environment overrides
// =============================================================================
//
// Every tunable parameter of a run lives here.  The JSON file is optional;
// all fields carry `#[serde(default)]` so a partial (or empty) file is valid.
// Environment variables (optionally from `.env`) are applied on top.
//
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::coingecko::DEFAULT_BASE_URL;
use crate::indicators::IndicatorParams;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_coin() -> String {
    "bitcoin".to_string()
}

fn default_vs_currency() -> String {
    "usd".to_string()
}

fn default_days() -> u32 {
    90
}

fn default_fast_window() -> usize {
    20
}

fn default_slow_window() -> usize {
    50
}

fn default_rsi_window() -> usize {
    14
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

// =============================================================================
// RunConfig
// =============================================================================

/// Configuration for a single fetch → compute → report run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    // --- Market selection ----------------------------------------------------

    /// CoinGecko coin id, e.g. "bitcoin".
    #[serde(default = "default_coin")]
    pub coin: String,

    /// Quote currency, e.g. "usd".
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,

    /// Days of daily history to request.
    #[serde(default = "default_days")]
    pub days: u32,

    // --- Indicator windows ---------------------------------------------------

    /// Window of the fast simple moving average.
    #[serde(default = "default_fast_window")]
    pub fast_window: usize,

    /// Window of the slow simple moving average.
    #[serde(default = "default_slow_window")]
    pub slow_window: usize,

    /// RSI look-back window.
    #[serde(default = "default_rsi_window")]
    pub rsi_window: usize,

    // --- Transport -----------------------------------------------------------

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    // --- Outputs -------------------------------------------------------------

    /// Chart destination; derived from `coin` when unset.
    #[serde(default)]
    pub chart_path: Option<PathBuf>,

    /// CSV destination; derived from `coin` when unset.
    #[serde(default)]
    pub csv_path: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            coin: default_coin(),
            vs_currency: default_vs_currency(),
            days: default_days(),
            fast_window: default_fast_window(),
            slow_window: default_slow_window(),
            rsi_window: default_rsi_window(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            chart_path: None,
            csv_path: None,
        }
    }
}

impl RunConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(path = %path.display(), coin = %config.coin, "config loaded");

        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.  Blank values are
    /// ignored; numeric values that fail to parse are errors.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get("COIN_ID") {
            self.coin = v.to_lowercase();
        }
        if let Some(v) = get("VS_CURRENCY") {
            self.vs_currency = v.to_lowercase();
        }
        if let Some(v) = get("HISTORY_DAYS") {
            self.days = parse_env("HISTORY_DAYS", &v)?;
        }
        if let Some(v) = get("MA_FAST_WINDOW") {
            self.fast_window = parse_env("MA_FAST_WINDOW", &v)?;
        }
        if let Some(v) = get("MA_SLOW_WINDOW") {
            self.slow_window = parse_env("MA_SLOW_WINDOW", &v)?;
        }
        if let Some(v) = get("RSI_WINDOW") {
            self.rsi_window = parse_env("RSI_WINDOW", &v)?;
        }
        if let Some(v) = get("COINGECKO_BASE_URL") {
            self.api_base_url = v;
        }

        Ok(())
    }

    /// Reject configurations that cannot produce a meaningful report.
    pub fn validate(&self) -> Result<()> {
        if self.coin.trim().is_empty() {
            anyhow::bail!("coin id must not be empty");
        }
        if self.days == 0 {
            anyhow::bail!("days must be at least 1");
        }
        if self.fast_window == 0 || self.slow_window == 0 || self.rsi_window == 0 {
            anyhow::bail!(
                "indicator windows must be positive (fast={}, slow={}, rsi={})",
                self.fast_window,
                self.slow_window,
                self.rsi_window
            );
        }
        if self.fast_window >= self.slow_window {
            anyhow::bail!(
                "fast_window ({}) must be smaller than slow_window ({})",
                self.fast_window,
                self.slow_window
            );
        }
        Ok(())
    }

    pub fn indicator_params(&self) -> IndicatorParams {
        IndicatorParams {
            fast_window: self.fast_window,
            slow_window: self.slow_window,
            rsi_window: self.rsi_window,
        }
    }

    pub fn chart_path(&self) -> PathBuf {
        self.chart_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}_indicators.svg", self.coin)))
    }

    pub fn csv_path(&self) -> PathBuf {
        self.csv_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}_priceindicators.csv", self.coin)))
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("invalid value for {key}: '{value}'"))
}
