// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// SMA_i = mean(price[i - window + 1 ..= i])   for i >= window - 1
//       = undefined                            for i <  window - 1
//
// Output is aligned index-for-index with the input.
// =============================================================================

use super::rolling::rolling_mean;

/// Compute the SMA series for `prices` over the trailing `window`.
///
/// # Edge cases
/// - `window == 0` => every entry is `None`
/// - `prices.len() < window` => every entry is `None`
pub fn calculate_sma(prices: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling_mean(prices, window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_empty_input() {
        assert!(calculate_sma(&[], 5).is_empty());
    }

    #[test]
    fn sma_constant_series() {
        let prices = vec![42.0; 25];
        let sma = calculate_sma(&prices, 10);
        for &v in sma.iter().skip(9) {
            assert!((v.unwrap() - 42.0).abs() < 1e-10);
        }
    }

    #[test]
    fn sma_defined_from_window_minus_one() {
        let prices: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let sma = calculate_sma(&prices, 7);
        assert_eq!(sma.len(), prices.len());
        assert!(sma[..6].iter().all(Option::is_none));
        assert!(sma[6..].iter().all(Option::is_some));
    }

    #[test]
    fn sma_fourteen_over_one_to_sixteen() {
        let prices: Vec<f64> = (1..=16).map(|x| x as f64).collect();
        let sma = calculate_sma(&prices, 14);
        assert_eq!(sma[12], None);
        // mean(1..=14) = 7.5, then the window slides by one each step.
        assert!((sma[13].unwrap() - 7.5).abs() < 1e-10);
        assert!((sma[14].unwrap() - 8.5).abs() < 1e-10);
        assert!((sma[15].unwrap() - 9.5).abs() < 1e-10);
    }

    #[test]
    fn sma_insufficient_data() {
        let sma = calculate_sma(&[1.0, 2.0], 5);
        assert_eq!(sma, vec![None, None]);
    }
}
