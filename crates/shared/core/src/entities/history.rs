use crate::values::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A single point on a token's price chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp: Timestamp,
    pub price: f64,
}

impl PriceSample {
    pub fn new(timestamp: Timestamp, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Bounded, chronologically ordered price samples
///
/// Behaves as a ring buffer: recording past capacity drops the oldest samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceHistory {
    samples: VecDeque<PriceSample>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// History seeded with a single genesis sample
    pub fn genesis(sample: PriceSample) -> Self {
        let mut samples = VecDeque::with_capacity(1);
        samples.push_back(sample);
        Self { samples }
    }

    /// Append one sample and trim from the front down to `capacity`
    ///
    /// A history that is already oversized (e.g. capacity lowered between
    /// runs) is trimmed here as well.
    pub fn record(&mut self, sample: PriceSample, capacity: usize) {
        self.samples.push_back(sample);
        while self.samples.len() > capacity {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&PriceSample> {
        self.samples.back()
    }

    pub fn oldest(&self) -> Option<&PriceSample> {
        self.samples.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceSample> {
        self.samples.iter()
    }
}

impl FromIterator<PriceSample> for PriceHistory {
    fn from_iter<I: IntoIterator<Item = PriceSample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}
