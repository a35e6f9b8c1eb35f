//! Destinations, destination sets and their catalog.
//!
//! A [Destination] is identified by an opaque [DestinationId] when it comes
//! to selection ("is this still the same destination after a mutation?"),
//! while [Destination::same_value] compares its content (title and
//! coordinates), which is what persistence round trips care about.
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::sample::Coordinates;

mod catalog;
mod set;
mod store;

pub use catalog::Catalog;
pub use set::{DestinationSet, Mutation, SetEvent, SetId, ROUTE_SEPARATOR};
pub use store::DestinationStore;

static NEXT_DESTINATION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque [Destination] handle, unique within the process
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DestinationId(u64);

impl DestinationId {
    fn next() -> Self {
        Self(NEXT_DESTINATION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Persisted form of a [Destination]
#[derive(Serialize, Deserialize)]
struct DestinationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    latitude: f64,
    longitude: f64,
}

/// [Destination] is a place the user wants to go to.
/// It does not implement [PartialEq] on purpose: use [Destination::id]
/// for identity and [Destination::same_value] for content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "DestinationRecord", into = "DestinationRecord")]
pub struct Destination {
    id: DestinationId,
    title: Option<String>,
    coordinates: Coordinates,
}

impl From<DestinationRecord> for Destination {
    fn from(record: DestinationRecord) -> Self {
        Self::new(
            record.title,
            Coordinates::new(record.latitude, record.longitude),
        )
    }
}

impl From<Destination> for DestinationRecord {
    fn from(d: Destination) -> Self {
        Self {
            title: d.title,
            latitude: d.coordinates.latitude,
            longitude: d.coordinates.longitude,
        }
    }
}

fn normalize(title: Option<String>) -> Option<String> {
    title.filter(|t| !t.is_empty())
}

impl Destination {
    /// Builds a new [Destination], with a new identity.
    /// Empty titles are normalized to None.
    pub fn new(title: Option<String>, coordinates: Coordinates) -> Self {
        Self {
            id: DestinationId::next(),
            title: normalize(title),
            coordinates,
        }
    }
    /// Builds an untitled [Destination]
    pub fn at(coordinates: Coordinates) -> Self {
        Self::new(None, coordinates)
    }
    /// Builds a titled [Destination]
    pub fn titled(title: &str, coordinates: Coordinates) -> Self {
        Self::new(Some(title.to_string()), coordinates)
    }
    pub fn id(&self) -> DestinationId {
        self.id
    }
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }
    /// Copies and returns Self with a new title, same identity
    pub fn with_title(&self, title: Option<String>) -> Self {
        Self {
            id: self.id,
            title: normalize(title),
            coordinates: self.coordinates,
        }
    }
    /// Structural equality: same title and same coordinates
    pub fn same_value(&self, rhs: &Self) -> bool {
        self.title == rhs.title && self.coordinates == rhs.coordinates
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.title {
            Some(title) => write!(f, "{} {}", title, self.coordinates),
            None => write!(f, "{}", self.coordinates),
        }
    }
}
