// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators rendered by the
// report.  Every series is aligned index-for-index with its input and uses
// `Option<f64>` for entries that lack sufficient history, so callers are
// forced to handle the warm-up region explicitly.

pub mod rolling;
pub mod rsi;
pub mod sma;

use crate::types::PriceSeries;

/// Look-back windows for one indicator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub fast_window: usize,
    pub slow_window: usize,
    pub rsi_window: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            fast_window: 20,
            slow_window: 50,
            rsi_window: 14,
        }
    }
}

/// A price series together with its derived indicator series.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    pub series: PriceSeries,
    pub params: IndicatorParams,
    pub ma_fast: Vec<Option<f64>>,
    pub ma_slow: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.series.len()
    }
}

/// Compute both moving averages and the RSI for `series`.
pub fn compute_indicators(series: PriceSeries, params: IndicatorParams) -> IndicatorFrame {
    let prices = series.prices();

    let ma_fast = sma::calculate_sma(&prices, params.fast_window);
    let ma_slow = sma::calculate_sma(&prices, params.slow_window);
    let rsi = rsi::calculate_rsi(&prices, params.rsi_window);

    IndicatorFrame {
        series,
        params,
        ma_fast,
        ma_slow,
        rsi,
    }
}
