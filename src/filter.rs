//! Sample acceptance: decides which position fixes deserve to be logged.
//!
//! Logs should capture meaningful movement and the moment of stopping,
//! without accumulating near duplicate stationary fixes.
use crate::{config::FilterConfig, sample::PositionSample};

/// Minimal displacement (in meters) for a sample to be accepted on its own
pub const DEFAULT_MIN_DISTANCE: f64 = 5.0;

/// Returns true if `sample` should be accepted, given the previously
/// accepted sample, using the [DEFAULT_MIN_DISTANCE] threshold.
pub fn should_accept(sample: &PositionSample, previous: Option<&PositionSample>) -> bool {
    accepts(DEFAULT_MIN_DISTANCE, sample, previous)
}

fn accepts(min_distance: f64, sample: &PositionSample, previous: Option<&PositionSample>) -> bool {
    let previous = match previous {
        Some(previous) => previous,
        None => return true,
    };
    if let Some(distance) = sample.distance(previous) {
        if distance >= min_distance {
            return true;
        }
    }
    let speed = match sample.speed {
        Some(speed) => speed,
        None => return false,
    };
    let prev_speed = match previous.speed {
        Some(speed) => speed,
        None => return true,
    };
    // a stop is always logged
    prev_speed > 0.0 && speed == 0.0
}

/// [SampleFilter] applies the acceptance rules to a stream of batches,
/// remembering the last accepted sample.
#[derive(Debug, Clone)]
pub struct SampleFilter {
    min_distance: f64,
    previous: Option<PositionSample>,
}

impl Default for SampleFilter {
    fn default() -> Self {
        Self::new(&FilterConfig::default())
    }
}

impl SampleFilter {
    pub fn new(cfg: &FilterConfig) -> Self {
        Self {
            min_distance: cfg.min_distance,
            previous: None,
        }
    }
    /// Last accepted sample
    pub fn previous(&self) -> Option<&PositionSample> {
        self.previous.as_ref()
    }
    /// Returns true if given sample would be accepted right now.
    pub fn accepts(&self, sample: &PositionSample) -> bool {
        accepts(self.min_distance, sample, self.previous.as_ref())
    }
    /// Filters one batch, in arrival order. The reference sample advances
    /// within the batch, so in-batch duplicates are dropped too.
    pub fn filter<I: IntoIterator<Item = PositionSample>>(&mut self, batch: I) -> Vec<PositionSample> {
        let mut accepted = Vec::new();
        for sample in batch {
            if self.accepts(&sample) {
                self.previous = Some(sample);
                accepted.push(sample);
            }
        }
        accepted
    }
    /// Forgets the last accepted sample: next sample is always accepted.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
