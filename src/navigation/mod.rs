//! Navigation towards the targeted destination.
//!
//! [NavigationContext] follows the user position and the target,
//! keeps route and address results up to date, and tells the
//! application shell what to display through [NavigationEvent]s.
use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

#[cfg(feature = "log")]
use log::{debug, warn};

use crate::{
    config::Config,
    destination::{Destination, DestinationId},
    sample::{Coordinates, PositionSample},
    units::{CompassReference, Preferences},
    Error,
};

mod address;
mod flight;
mod route;
mod throttle;
mod viewport;

pub use address::{AddressResolver, AddressResult, Geocoder, Placemark};
pub use route::{Directions, Route, RouteFetcher, RouteResult};
pub use throttle::Throttle;
pub use viewport::{ViewportCommand, ViewportPolicy};

/// Locks a state mutex. The guarded state is consistent after every
/// statement, so a poisoned lock is still usable.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What the display needs to update
#[derive(Debug, Clone)]
pub enum NavigationEvent {
    /// A new target marker (or none)
    TargetChanged(Option<Destination>),
    /// Distance from the user to the target, in meters
    DistanceChanged(Option<f64>),
    /// Routes to display
    RouteUpdated(RouteResult),
    /// Displayed routes should be removed
    RoutesCleared,
    /// The user to target connector line is stale
    ConnectorInvalidated,
    /// Address to display
    AddressUpdated(AddressResult),
    /// Displayed address should be removed
    AddressCleared,
    /// The following viewport should move
    Viewport(ViewportCommand),
}

/// Compass reading
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Heading {
    /// Degrees clockwise from true north, when available
    pub true_heading: Option<f64>,
    /// Degrees clockwise from magnetic north
    pub magnetic_heading: f64,
}

impl Heading {
    /// Heading in the preferred reference. True heading falls back
    /// to the magnetic one when not available.
    pub fn degrees(&self, reference: CompassReference) -> f64 {
        match reference {
            CompassReference::True => self.true_heading.unwrap_or(self.magnetic_heading),
            CompassReference::Magnetic => self.magnetic_heading,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    location: Option<Coordinates>,
    heading: Option<Heading>,
    following: bool,
    origin_only: bool,
    target: Option<Destination>,
    distance: Option<f64>,
    route: Option<RouteResult>,
    address: Option<AddressResult>,
    show_routes: bool,
    show_address: bool,
    viewport: ViewportPolicy,
}

impl State {
    fn target_id(&self) -> Option<DestinationId> {
        self.target.as_ref().map(|t| t.id())
    }
    fn target_coordinates(&self) -> Option<Coordinates> {
        self.target.as_ref().map(|t| t.coordinates())
    }
}

#[derive(Debug)]
struct Inner {
    state: Mutex<State>,
    routes: RouteFetcher,
    addresses: AddressResolver,
    preferences: Preferences,
    events: mpsc::UnboundedSender<NavigationEvent>,
}

/// [NavigationContext] is a cloneable handle: every clone drives the
/// same navigation state. Methods that need an external query spawn
/// it on the current tokio runtime.
#[derive(Debug, Clone)]
pub struct NavigationContext {
    inner: Arc<Inner>,
}

impl NavigationContext {
    /// Builds a [NavigationContext], returning the [NavigationEvent]
    /// stream the display should drain.
    pub fn new(
        directions: Arc<dyn Directions>,
        geocoder: Arc<dyn Geocoder>,
        config: &Config,
    ) -> (Self, mpsc::UnboundedReceiver<NavigationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = State {
            viewport: ViewportPolicy::new(config.viewport),
            ..Default::default()
        };
        let inner = Inner {
            state: Mutex::new(state),
            routes: RouteFetcher::new(directions, config.route),
            addresses: AddressResolver::new(geocoder, config.address),
            preferences: config.preferences,
            events: tx,
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            rx,
        )
    }
    fn notify(&self, event: NavigationEvent) {
        // nobody listening is not an error
        let _ = self.inner.events.send(event);
    }
    fn state(&self) -> MutexGuard<'_, State> {
        lock(&self.inner.state)
    }
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(task);
            },
            Err(_) => {
                #[cfg(feature = "log")]
                warn!("no async runtime: query not issued");
            },
        }
    }
    fn spawn_route_refresh(&self, by_force: bool) {
        let ctx = self.clone();
        self.spawn(async move {
            if let Err(_e) = ctx.refresh_route(by_force).await {
                #[cfg(feature = "log")]
                debug!("route refresh: {}", _e);
            }
        });
    }
    fn spawn_address_refresh(&self) {
        let ctx = self.clone();
        self.spawn(async move {
            if let Err(_e) = ctx.refresh_address().await {
                #[cfg(feature = "log")]
                debug!("address refresh: {}", _e);
            }
        });
    }
    /// Updates distance and viewport after a move of user or target
    fn update_geometry(&self, state: &mut State) {
        let distance = match (state.location, state.target_coordinates()) {
            (Some(user), Some(target)) => Some(user.distance(&target)),
            _ => None,
        };
        if distance != state.distance {
            state.distance = distance;
            self.notify(NavigationEvent::DistanceChanged(distance));
        }
        let target = state.target_coordinates();
        let (following, origin_only, location) =
            (state.following, state.origin_only, state.location);
        if let Some(cmd) = state
            .viewport
            .update(following, origin_only, location, target)
        {
            self.notify(NavigationEvent::Viewport(cmd));
        }
    }
    /// New user position. Route and address are refreshed when
    /// displayed and the position moved enough since their last query.
    pub fn update_location(&self, position: Coordinates) {
        let (fetch_route, fetch_address) = {
            let mut state = self.state();
            state.location = Some(position);
            self.update_geometry(&mut state);
            let fetch_route = state.show_routes
                && state.target_coordinates().map_or(false, |target| {
                    self.inner
                        .routes
                        .can_fetch(position, target, state.route.as_ref())
                });
            let fetch_address = state.show_address
                && self
                    .inner
                    .addresses
                    .can_fetch(position, state.address.as_ref());
            (fetch_route, fetch_address)
        };
        if fetch_route {
            self.spawn_route_refresh(false);
        }
        if fetch_address {
            self.spawn_address_refresh();
        }
    }
    /// Same as [Self::update_location], samples without valid
    /// coordinates are ignored
    pub fn update_sample(&self, sample: &PositionSample) {
        if let Some(position) = sample.coordinates {
            self.update_location(position);
        }
    }
    /// New target. The cached route is discarded, and a fresh one
    /// is fetched when routes are displayed. The same destination at
    /// the same place (a retitle) keeps the route.
    pub fn set_target(&self, target: Option<Destination>) {
        let show_routes = {
            let mut state = self.state();
            let unmoved = match (&state.target, &target) {
                (Some(current), Some(new)) => {
                    current.id() == new.id() && current.coordinates() == new.coordinates()
                },
                _ => false,
            };
            if unmoved {
                state.target = target.clone();
                self.notify(NavigationEvent::TargetChanged(target));
                return;
            }
            state.target = target.clone();
            state.route = None;
            self.notify(NavigationEvent::TargetChanged(target));
            self.notify(NavigationEvent::ConnectorInvalidated);
            self.notify(NavigationEvent::RoutesCleared);
            self.update_geometry(&mut state);
            state.show_routes && state.target.is_some()
        };
        if show_routes {
            self.spawn_route_refresh(true);
        }
    }
    /// Follows a target stream, typically [crate::destination::DestinationStore::subscribe_target].
    /// The current target is applied first. Must be called within a tokio runtime.
    pub fn track_target(&self, mut targets: watch::Receiver<Option<Destination>>) -> JoinHandle<()> {
        let ctx = self.clone();
        tokio::spawn(async move {
            while targets.changed().await.is_ok() {
                let target = targets.borrow_and_update().clone();
                ctx.set_target(target);
            }
        })
    }
    /// Routes display toggle: showing forces a fetch, hiding keeps the cache
    pub fn set_show_routes(&self, show: bool) {
        self.state().show_routes = show;
        if show {
            self.spawn_route_refresh(true);
        } else {
            self.notify(NavigationEvent::RoutesCleared);
        }
    }
    /// Address display toggle
    pub fn set_show_address(&self, show: bool) {
        self.state().show_address = show;
        if show {
            self.spawn_address_refresh();
        } else {
            self.notify(NavigationEvent::AddressCleared);
        }
    }
    pub fn set_heading(&self, heading: Heading) {
        self.state().heading = Some(heading);
    }
    pub fn set_following(&self, following: bool) {
        let mut state = self.state();
        state.following = following;
        state.viewport.reset();
        self.update_geometry(&mut state);
    }
    pub fn set_origin_only(&self, origin_only: bool) {
        let mut state = self.state();
        state.origin_only = origin_only;
        state.viewport.reset();
        self.update_geometry(&mut state);
    }
    /// Queries routes from the user position to the target.
    /// The result is cached only if the target did not change meanwhile.
    /// [Error::Throttled] is returned to the caller, external failures
    /// are logged and leave the cache untouched.
    pub async fn refresh_route(&self, by_force: bool) -> Result<(), Error> {
        let (from, to, target_id) = {
            let state = self.state();
            match (state.location, state.target_coordinates()) {
                (Some(from), Some(to)) => (from, to, state.target_id()),
                _ => return Ok(()),
            }
        };
        match self.inner.routes.fetch(from, to, by_force).await {
            Ok(result) => {
                let mut state = self.state();
                if state.target_id() != target_id {
                    #[cfg(feature = "log")]
                    debug!("route for a previous target discarded");
                    return Ok(());
                }
                state.route = Some(result.clone());
                if state.show_routes {
                    self.notify(NavigationEvent::RouteUpdated(result));
                }
                Ok(())
            },
            Err(Error::Throttled(remaining)) => Err(Error::Throttled(remaining)),
            Err(Error::Cancelled) => Ok(()),
            Err(_e) => {
                #[cfg(feature = "log")]
                debug!("route query failed: {}", _e);
                Ok(())
            },
        }
    }
    /// Resolves the user position. Declines silently inside the cooldown.
    /// External failures are logged and leave the cache untouched.
    pub async fn refresh_address(&self) -> Result<(), Error> {
        let position = match self.location() {
            Some(position) => position,
            None => return Ok(()),
        };
        match self.inner.addresses.fetch(position).await {
            Ok(Some(result)) => {
                let mut state = self.state();
                state.address = Some(result.clone());
                if state.show_address {
                    self.notify(NavigationEvent::AddressUpdated(result));
                }
                Ok(())
            },
            Ok(None) | Err(Error::Cancelled) => Ok(()),
            Err(_e) => {
                #[cfg(feature = "log")]
                debug!("address query failed: {}", _e);
                Ok(())
            },
        }
    }
    pub fn location(&self) -> Option<Coordinates> {
        self.state().location
    }
    pub fn target(&self) -> Option<Destination> {
        self.state().target.clone()
    }
    /// Distance from user to target, in meters
    pub fn distance(&self) -> Option<f64> {
        self.state().distance
    }
    /// Distance from user to target, formatted in preferred units
    pub fn distance_text(&self) -> Option<String> {
        self.distance()
            .map(|d| self.inner.preferences.units.format_distance(d))
    }
    pub fn route(&self) -> Option<RouteResult> {
        self.state().route.clone()
    }
    pub fn address(&self) -> Option<AddressResult> {
        self.state().address.clone()
    }
    pub fn show_routes(&self) -> bool {
        self.state().show_routes
    }
    pub fn show_address(&self) -> bool {
        self.state().show_address
    }
    pub fn following(&self) -> bool {
        self.state().following
    }
    pub fn origin_only(&self) -> bool {
        self.state().origin_only
    }
    /// Heading in the preferred compass reference
    pub fn heading(&self) -> Option<f64> {
        let compass = self.inner.preferences.compass;
        self.state().heading.map(|h| h.degrees(compass))
    }
    /// Target bearing relative to the heading, in degrees within [0, 360).
    /// Relative to north when the heading is unknown.
    pub fn bearing_to_target(&self) -> Option<f64> {
        let compass = self.inner.preferences.compass;
        let state = self.state();
        let bearing = state.location?.bearing(&state.target_coordinates()?);
        let heading = state.heading.map_or(0.0, |h| h.degrees(compass));
        Some((bearing - heading).rem_euclid(360.0))
    }
}
