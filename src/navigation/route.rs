use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;

#[cfg(feature = "log")]
use log::debug;

use crate::{
    config::ThrottleConfig,
    error::{Error, ServiceError},
    navigation::{flight::SingleFlight, lock, throttle::Throttle},
    sample::Coordinates,
};

/// Directions capability, provided by the application shell
#[async_trait]
pub trait Directions: Send + Sync {
    /// Returns one or more [Route]s from `source` to `destination`
    async fn route(
        &self,
        source: Coordinates,
        destination: Coordinates,
    ) -> Result<Vec<Route>, ServiceError>;
}

/// One proposed itinerary
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub polyline: Vec<Coordinates>,
    /// Length, in meters
    pub distance: f64,
    pub expected_travel_time: Duration,
}

/// Routes obtained for one (source, destination) query
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    pub source: Coordinates,
    pub destination: Coordinates,
    /// Never empty: first one is the recommended route
    pub routes: Vec<Route>,
}

impl RouteResult {
    /// Recommended [Route]
    pub fn primary(&self) -> Option<&Route> {
        self.routes.first()
    }
    /// Length of the recommended route, in meters
    pub fn distance(&self) -> Option<f64> {
        self.primary().map(|r| r.distance)
    }
    /// Travel time of the recommended route
    pub fn expected_travel_time(&self) -> Option<Duration> {
        self.primary().map(|r| r.expected_travel_time)
    }
}

/// [RouteFetcher] queries [Directions], single flight and throttled.
pub struct RouteFetcher {
    directions: Arc<dyn Directions>,
    config: ThrottleConfig,
    throttle: Mutex<Throttle>,
    flights: SingleFlight,
}

impl std::fmt::Debug for RouteFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("RouteFetcher")
            .field("config", &self.config)
            .field("throttle", &self.throttle)
            .finish()
    }
}

impl RouteFetcher {
    pub fn new(directions: Arc<dyn Directions>, config: ThrottleConfig) -> Self {
        Self {
            directions,
            throttle: Mutex::new(Throttle::from_config(&config)),
            config,
            flights: SingleFlight::default(),
        }
    }
    /// Time left in the cooldown window
    pub fn remaining(&self) -> Duration {
        lock(&self.throttle).remaining()
    }
    /// True when no fetch is running, the cooldown expired, and the query
    /// differs enough from `previous`: source moved by the configured
    /// distance, or any change of destination.
    pub fn can_fetch(
        &self,
        from: Coordinates,
        to: Coordinates,
        previous: Option<&RouteResult>,
    ) -> bool {
        if self.flights.is_busy() || !lock(&self.throttle).is_ready() {
            return false;
        }
        match previous {
            None => true,
            Some(previous) => {
                previous.destination != to
                    || previous.source.distance(&from) >= self.config.min_distance
            },
        }
    }
    /// Cancels the pending fetch, if any
    pub fn cancel(&self) {
        self.flights.cancel();
    }
    /// Fetches routes from `from` to `to`, superseding any pending fetch.
    /// Inside the cooldown window, a forced fetch waits for it to expire,
    /// otherwise [Error::Throttled] is returned.
    /// A superseded fetch returns [Error::Cancelled].
    pub async fn fetch(
        &self,
        from: Coordinates,
        to: Coordinates,
        by_force: bool,
    ) -> Result<RouteResult, Error> {
        let flight = self.flights.begin();
        let token = flight.token();

        let remaining = self.remaining();
        if !remaining.is_zero() {
            if !by_force {
                return Err(Error::Throttled(remaining));
            }
            #[cfg(feature = "log")]
            debug!("route fetch delayed by {:?}", remaining);
            tokio::select! {
                _ = token.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(remaining) => {},
            }
        }

        let routes = tokio::select! {
            _ = token.cancelled() => return Err(Error::Cancelled),
            routes = self.directions.route(from, to) => routes?,
        };
        if routes.is_empty() {
            return Err(ServiceError::NoResult.into());
        }

        lock(&self.throttle).record();
        #[cfg(feature = "log")]
        debug!("{} route(s) {} -> {}", routes.len(), from, to);

        Ok(RouteResult {
            source: from,
            destination: to,
            routes,
        })
    }
}
