// =============================================================================
// Relative Strength Index (RSI) — Simple Rolling Average
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive prices.
// Step 2 — Split each delta into a gain (positive part) and a loss (magnitude
//          of the negative part).
// Step 3 — avg_gain / avg_loss = plain rolling mean of the trailing `window`
//          gains / losses (no Wilder smoothing).
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Thresholds:  RSI >= 70 => OVERBOUGHT,  RSI <= 30 => OVERSOLD.
// =============================================================================

use std::fmt;

use super::rolling::RollingMean;

/// RSI level at or above which the market is considered overbought.
pub const OVERBOUGHT: f64 = 70.0;
/// RSI level at or below which the market is considered oversold.
pub const OVERSOLD: f64 = 30.0;

/// Compute the RSI series for `prices` over the trailing `window`.
///
/// The output is aligned with the input.  Index `i` is defined once `window`
/// deltas exist, i.e. for `i >= window`.
///
/// # Edge cases
/// - `window == 0` => every entry is `None`
/// - `prices.len() <= window` => every entry is `None`
/// - Average loss of zero with positive average gain => 100.0
/// - Perfectly flat window (no gains, no losses) => `None`
pub fn calculate_rsi(prices: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(prices.len());
    if prices.is_empty() {
        return result;
    }

    // Index 0 has no delta.
    result.push(None);

    let mut gains = RollingMean::new(window);
    let mut losses = RollingMean::new(window);

    for pair in prices.windows(2) {
        let delta = pair[1] - pair[0];
        // A NaN delta is neither a gain nor a loss; feed it through so the
        // affected windows come out undefined.
        let (gain, loss) = if delta.is_nan() {
            (f64::NAN, f64::NAN)
        } else if delta > 0.0 {
            (delta, 0.0)
        } else {
            (0.0, -delta.min(0.0))
        };

        let avg_gain = gains.push(gain);
        let avg_loss = losses.push(loss);

        let rsi = match (avg_gain, avg_loss) {
            (Some(g), Some(l)) => rsi_from_averages(g, l),
            _ => None,
        };
        result.push(rsi);
    }

    result
}

/// Qualitative reading of an RSI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiZone {
    pub fn classify(rsi: f64) -> Self {
        if rsi >= OVERBOUGHT {
            Self::Overbought
        } else if rsi <= OVERSOLD {
            Self::Oversold
        } else {
            Self::Neutral
        }
    }
}

impl fmt::Display for RsiZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overbought => write!(f, "OVERBOUGHT"),
            Self::Oversold => write!(f, "OVERSOLD"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Return the most recent defined RSI value together with its zone.
///
/// Returns `None` when no entry of `series` is defined.
pub fn latest_rsi(series: &[Option<f64>]) -> Option<(f64, RsiZone)> {
    let value = series.iter().rev().find_map(|v| *v)?;
    Some((value, RsiZone::classify(value)))
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// - If both averages are zero the ratio is 0/0 and RSI is undefined.
/// - If average loss is zero (only gains), RS is infinite and RSI is 100.0.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        return None;
    }
    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    let rsi = 100.0 - 100.0 / (1.0 + rs);
    rsi.is_finite().then_some(rsi)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn defined(series: &[Option<f64>]) -> Vec<f64> {
        series.iter().filter_map(|v| *v).collect()
    }

    // ---- calculate_rsi ---------------------------------------------------

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_window_zero() {
        assert_eq!(calculate_rsi(&[1.0, 2.0, 3.0], 0), vec![None, None, None]);
    }

    #[test]
    fn rsi_insufficient_data() {
        // 14 prices => 13 deltas < 14.
        let prices: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        let series = calculate_rsi(&prices, 14);
        assert_eq!(series.len(), 14);
        assert!(series.iter().all(Option::is_none));
    }

    #[test]
    fn rsi_defined_from_index_window() {
        let prices: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let series = calculate_rsi(&prices, 14);
        assert_eq!(series.len(), 30);
        assert!(series[..14].iter().all(Option::is_none));
        assert!(series[14..].iter().all(Option::is_some));
    }

    #[test]
    fn rsi_all_gains() {
        let prices: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let values = defined(&calculate_rsi(&prices, 14));
        assert!(!values.is_empty());
        for v in values {
            assert!((v - 100.0).abs() < 1e-10, "expected 100.0, got {v}");
        }
    }

    #[test]
    fn rsi_all_losses() {
        let prices: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let values = defined(&calculate_rsi(&prices, 14));
        assert!(!values.is_empty());
        for v in values {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_alternating_settles_at_fifty() {
        let prices: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 100.0 } else { 101.0 }).collect();
        let values = defined(&calculate_rsi(&prices, 14));
        assert!(!values.is_empty());
        for v in values {
            assert!((v - 50.0).abs() < 1e-10, "expected 50.0, got {v}");
        }
    }

    #[test]
    fn rsi_flat_market_is_undefined() {
        let series = calculate_rsi(&[100.0; 30], 14);
        assert!(series.iter().all(Option::is_none));
    }

    #[test]
    fn rsi_recovers_to_hundred_after_losses_leave_window() {
        // Mixed moves followed by a long run of gains: once the last loss has
        // slid out, average loss must be exactly zero.
        let mut prices = vec![10.0, 9.7, 10.1, 9.9, 10.3];
        let mut p = 10.3;
        for _ in 0..20 {
            p += 0.1;
            prices.push(p);
        }
        let series = calculate_rsi(&prices, 5);
        assert_eq!(series.last().copied().flatten(), Some(100.0));
    }

    #[test]
    fn rsi_range_check() {
        let prices = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        for v in defined(&calculate_rsi(&prices, 14)) {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn rsi_known_value() {
        // Deltas: +2, -1, +1 over window 3 => avg_gain 1.0, avg_loss 1/3,
        // RS 3, RSI 75.
        let series = calculate_rsi(&[10.0, 12.0, 11.0, 12.0], 3);
        assert!((series[3].unwrap() - 75.0).abs() < 1e-10);
    }

    // ---- latest_rsi ------------------------------------------------------

    #[test]
    fn latest_rsi_overbought() {
        let prices: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let (val, zone) = latest_rsi(&calculate_rsi(&prices, 14)).unwrap();
        assert!((val - 100.0).abs() < 1e-10);
        assert_eq!(zone, RsiZone::Overbought);
    }

    #[test]
    fn latest_rsi_oversold() {
        let prices: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let (_, zone) = latest_rsi(&calculate_rsi(&prices, 14)).unwrap();
        assert_eq!(zone, RsiZone::Oversold);
    }

    #[test]
    fn latest_rsi_skips_trailing_undefined() {
        let (val, zone) = latest_rsi(&[None, Some(55.0), None]).unwrap();
        assert!((val - 55.0).abs() < 1e-10);
        assert_eq!(zone, RsiZone::Neutral);
    }

    #[test]
    fn latest_rsi_none_when_nothing_defined() {
        assert!(latest_rsi(&[None, None]).is_none());
        assert!(latest_rsi(&[]).is_none());
    }
}
