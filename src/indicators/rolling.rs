// =============================================================================
// Rolling Mean — fixed-size trailing window accumulator
// =============================================================================
//
// Shared building block for every windowed statistic in this crate.  Values
// are pushed one at a time; once `window` values have been seen each push
// yields the arithmetic mean of the trailing `window` values.
//
// The running sum is maintained incrementally (O(1) per push) with Neumaier
// compensation, so a small value survives the eviction of a much larger one.
// Two counters ride alongside it:
//   - `non_finite` — number of NaN / ±inf values in the window.  Any such
//     value makes the mean undefined until it slides out.
//   - `non_zero`   — number of non-zero values in the window.  When it drops
//     to zero the sum is reset to exactly 0.0 so that add/subtract residue
//     never masquerades as a tiny positive average.
// =============================================================================

use std::collections::VecDeque;

/// Sliding-window arithmetic mean.
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: usize,
    values: VecDeque<f64>,
    sum: f64,
    compensation: f64,
    non_finite: usize,
    non_zero: usize,
}

impl RollingMean {
    /// Create an accumulator over the trailing `window` values.
    ///
    /// A `window` of zero is accepted; such an accumulator never yields a
    /// value.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            values: VecDeque::with_capacity(window),
            sum: 0.0,
            compensation: 0.0,
            non_finite: 0,
            non_zero: 0,
        }
    }

    /// Push the next value and return the mean of the trailing window, or
    /// `None` while fewer than `window` values have been seen or while the
    /// window contains a non-finite value.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        if self.window == 0 {
            return None;
        }

        if self.values.len() == self.window {
            if let Some(old) = self.values.pop_front() {
                self.evict(old);
            }
        }
        self.admit(value);
        self.values.push_back(value);

        self.mean()
    }

    /// Mean of the current window, if the window is full and finite.
    pub fn mean(&self) -> Option<f64> {
        if self.window == 0 || self.values.len() < self.window || self.non_finite > 0 {
            return None;
        }
        if self.non_zero == 0 {
            return Some(0.0);
        }
        Some((self.sum + self.compensation) / self.window as f64)
    }

    fn admit(&mut self, value: f64) {
        if !value.is_finite() {
            self.non_finite += 1;
            return;
        }
        if value != 0.0 {
            self.non_zero += 1;
        }
        self.accumulate(value);
    }

    fn evict(&mut self, value: f64) {
        if !value.is_finite() {
            self.non_finite -= 1;
            return;
        }
        if value != 0.0 {
            self.non_zero -= 1;
        }
        self.accumulate(-value);
        if self.non_zero == 0 {
            self.sum = 0.0;
            self.compensation = 0.0;
        }
    }

    /// Neumaier summation step.
    fn accumulate(&mut self, value: f64) {
        let t = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - t) + value;
        } else {
            self.compensation += (value - t) + self.sum;
        }
        self.sum = t;
    }
}

/// Apply a [`RollingMean`] over `values`, returning one output per input.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut acc = RollingMean::new(window);
    values.iter().map(|&v| acc.push(v)).collect()
}
