//! Rolling price history for charting
//!
//! Samples are indexed by a logical clock that advances by one per accepted
//! trade, so the window is measured in samples rather than wall time.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of retained samples (~5 minutes at one update per second)
pub const DEFAULT_WINDOW_SIZE: usize = 300;

/// One accepted price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Logical sequence index, strictly increasing
    pub index: u64,
    pub price: f64,
}

/// Bounded buffer of the most recent samples, oldest first
#[derive(Debug, Clone)]
pub struct RollingHistory {
    samples: VecDeque<PriceSample>,
    window_size: usize,
    next_index: u64,
}

impl RollingHistory {
    /// Create an empty history keeping at most `window_size` samples
    pub fn new(window_size: usize) -> Result<Self, ConfigError> {
        if window_size == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        Ok(Self {
            samples: VecDeque::with_capacity(window_size),
            window_size,
            next_index: 0,
        })
    }

    /// Append a price under the next index, evicting samples outside the window
    pub fn append(&mut self, price: f64) -> PriceSample {
        let sample = PriceSample {
            index: self.next_index,
            price,
        };
        self.next_index += 1;
        self.samples.push_back(sample);

        // keep indices >= newest - window_size + 1
        let window = self.window_size as u64;
        while let Some(oldest) = self.samples.front() {
            if oldest.index + window > sample.index {
                break;
            }
            self.samples.pop_front();
        }

        sample
    }

    /// Copy of the retained samples in index order
    pub fn snapshot(&self) -> Vec<PriceSample> {
        self.samples.iter().copied().collect()
    }

    /// Drop all samples and restart indexing at zero
    pub fn reset(&mut self) {
        self.samples.clear();
        self.next_index = 0;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn latest(&self) -> Option<PriceSample> {
        self.samples.back().copied()
    }

    pub fn oldest_index(&self) -> Option<u64> {
        self.samples.front().map(|s| s.index)
    }

    /// Lowest and highest retained price, for axis scaling
    pub fn price_range(&self) -> Option<(f64, f64)> {
        price_range(&self.samples)
    }
}

/// Lowest and highest price among `samples`
pub fn price_range<'a>(samples: impl IntoIterator<Item = &'a PriceSample>) -> Option<(f64, f64)> {
    let mut prices = samples.into_iter().map(|s| s.price);
    let first = prices.next()?;
    Some(prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
}

impl Default for RollingHistory {
    fn default() -> Self {
        Self {
            samples: VecDeque::with_capacity(DEFAULT_WINDOW_SIZE),
            window_size: DEFAULT_WINDOW_SIZE,
            next_index: 0,
        }
    }
}
