use std::time::Duration;

use tokio::time::Instant;

use crate::config::ThrottleConfig;

/// [Throttle] enforces a cooldown between two successful queries.
/// One instance per fetcher.
#[derive(Debug, Clone)]
pub struct Throttle {
    cooldown: Duration,
    last_fetch: Option<Instant>,
}

impl Throttle {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_fetch: None,
        }
    }
    pub fn from_config(cfg: &ThrottleConfig) -> Self {
        Self::new(cfg.cooldown())
    }
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
    /// Completion time of the last successful query
    pub fn last_fetch(&self) -> Option<Instant> {
        self.last_fetch
    }
    /// Time left before the cooldown expires, zero when it has
    pub fn remaining(&self) -> Duration {
        match self.last_fetch {
            Some(last) => (last + self.cooldown).saturating_duration_since(Instant::now()),
            None => Duration::ZERO,
        }
    }
    pub fn is_ready(&self) -> bool {
        self.remaining().is_zero()
    }
    /// Restarts the cooldown, now
    pub fn record(&mut self) {
        self.last_fetch = Some(Instant::now());
    }
}
