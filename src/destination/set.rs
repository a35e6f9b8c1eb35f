use std::sync::atomic::{AtomicU64, Ordering};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    destination::{Destination, DestinationId},
    Error,
};

/// Separator used in [DestinationSet::route_summary]
pub const ROUTE_SEPARATOR: &str = " ← ";

static NEXT_SET_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque [DestinationSet] handle, unique within the process
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SetId(u64);

impl SetId {
    fn next() -> Self {
        Self(NEXT_SET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One change applied to a [DestinationSet]
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Appends a destination
    Append(Destination),
    /// Inserts a destination at given position (may equal length)
    Insert(usize, Destination),
    /// Removes the destination at given position
    Remove(usize),
    /// Moves a destination to a new position
    Move { from: usize, to: usize },
    /// Replaces the whole sequence
    Replace(Vec<Destination>),
    /// Updates the title of the destination at given position
    Retitle(usize, Option<String>),
    /// Removes all destinations
    Clear,
    /// Points the cursor to given position
    SetTarget(usize),
    /// Moves the cursor circularly, by given (signed) amount
    Step(isize),
}

/// What changed in a [DestinationSet], after one [Mutation]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SetEvent {
    /// Sequence content changed
    DestinationsChanged,
    /// Raw cursor changed
    TargetIndexChanged(Option<usize>),
    /// Targeted destination is a different one, whether the raw cursor
    /// changed or not
    TargetChanged(Option<DestinationId>),
}

/// Persisted form of a [DestinationSet]
#[derive(Serialize, Deserialize)]
struct SetRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    #[serde(default)]
    destinations: Vec<Destination>,
}

/// [DestinationSet] is an ordered sequence of [Destination]s with a target
/// cursor. The cursor is None if and only if the sequence is empty,
/// otherwise it always points to an existing destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "SetRecord", into = "SetRecord")]
pub struct DestinationSet {
    id: SetId,
    name: Option<String>,
    note: Option<String>,
    destinations: Vec<Destination>,
    target_index: Option<usize>,
}

impl Default for DestinationSet {
    fn default() -> Self {
        Self::new(None)
    }
}

impl From<SetRecord> for DestinationSet {
    fn from(record: SetRecord) -> Self {
        let mut set = Self::from_destinations(record.destinations);
        set.name = record.name.filter(|s| !s.is_empty());
        set.note = record.note.filter(|s| !s.is_empty());
        set
    }
}

impl From<DestinationSet> for SetRecord {
    fn from(set: DestinationSet) -> Self {
        Self {
            name: set.name,
            note: set.note,
            destinations: set.destinations,
        }
    }
}

/// Cursor after a sequence mutation: keep pointing at the same destination
/// if it survived, otherwise clamp the previous position.
fn reclamp(
    previous: &[Destination],
    previous_index: Option<usize>,
    destinations: &[Destination],
) -> Option<usize> {
    if destinations.is_empty() {
        return None;
    }
    let previous_target = previous_index
        .and_then(|i| previous.get(i))
        .map(|d| d.id());
    if let Some(id) = previous_target {
        if let Some(index) = destinations.iter().position(|d| d.id() == id) {
            return Some(index);
        }
    }
    Some(previous_index.unwrap_or(0).min(destinations.len() - 1))
}

impl DestinationSet {
    /// Builds an empty [DestinationSet]
    pub fn new(name: Option<String>) -> Self {
        Self {
            id: SetId::next(),
            name,
            note: None,
            destinations: Vec::new(),
            target_index: None,
        }
    }
    /// Builds a [DestinationSet] targeting the first destination
    pub fn from_destinations(destinations: Vec<Destination>) -> Self {
        let target_index = if destinations.is_empty() { None } else { Some(0) };
        Self {
            id: SetId::next(),
            name: None,
            note: None,
            destinations,
            target_index,
        }
    }
    pub fn id(&self) -> SetId {
        self.id
    }
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name.filter(|s| !s.is_empty());
    }
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
    pub fn set_note(&mut self, note: Option<String>) {
        self.note = note.filter(|s| !s.is_empty());
    }
    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }
    pub fn len(&self) -> usize {
        self.destinations.len()
    }
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
    /// Raw target cursor
    pub fn target_index(&self) -> Option<usize> {
        self.target_index
    }
    /// Targeted [Destination]
    pub fn target(&self) -> Option<&Destination> {
        self.target_index.and_then(|i| self.destinations.get(i))
    }
    /// Targeted [DestinationId]
    pub fn target_id(&self) -> Option<DestinationId> {
        self.target().map(|d| d.id())
    }
    /// Position of given destination in this set
    pub fn position(&self, id: DestinationId) -> Option<usize> {
        self.destinations.iter().position(|d| d.id() == id)
    }
    /// Computes the state that results from `mutation`, along with
    /// the events describing what changed. Self is not modified:
    /// the caller commits the new state, then publishes the events.
    pub fn apply(&self, mutation: Mutation) -> Result<(Self, Vec<SetEvent>), Error> {
        let mut destinations = self.destinations.clone();
        let mut cursor: Option<usize> = None;
        let mut content_changed = true;
        let len = destinations.len();
        match mutation {
            Mutation::Append(d) => destinations.push(d),
            Mutation::Insert(index, d) => {
                if index > len {
                    return Err(Error::InvalidIndex(index));
                }
                destinations.insert(index, d);
            },
            Mutation::Remove(index) => {
                if index >= len {
                    return Err(Error::InvalidIndex(index));
                }
                destinations.remove(index);
            },
            Mutation::Move { from, to } => {
                if from >= len {
                    return Err(Error::InvalidIndex(from));
                }
                if to >= len {
                    return Err(Error::InvalidIndex(to));
                }
                let d = destinations.remove(from);
                destinations.insert(to, d);
            },
            Mutation::Replace(replacement) => destinations = replacement,
            Mutation::Retitle(index, title) => {
                let d = destinations
                    .get_mut(index)
                    .ok_or(Error::InvalidIndex(index))?;
                *d = d.with_title(title);
            },
            Mutation::Clear => destinations.clear(),
            Mutation::SetTarget(index) => {
                if index >= len {
                    return Err(Error::InvalidIndex(index));
                }
                cursor = Some(index);
                content_changed = false;
            },
            Mutation::Step(delta) => {
                if let Some(index) = self.target_index {
                    let n = len as isize;
                    cursor = Some((index as isize + delta).rem_euclid(n) as usize);
                }
                content_changed = false;
            },
        }

        let target_index = match cursor {
            Some(index) => Some(index),
            None => reclamp(&self.destinations, self.target_index, &destinations),
        };

        let next = Self {
            id: self.id,
            name: self.name.clone(),
            note: self.note.clone(),
            destinations,
            target_index,
        };

        let mut events = Vec::with_capacity(3);
        if content_changed {
            events.push(SetEvent::DestinationsChanged);
        }
        if next.target_index != self.target_index {
            events.push(SetEvent::TargetIndexChanged(next.target_index));
        }
        if next.target_id() != self.target_id() {
            events.push(SetEvent::TargetChanged(next.target_id()));
        }
        Ok((next, events))
    }
    /// Titles, most recent first, joined with [ROUTE_SEPARATOR].
    /// Untitled destinations are skipped. None when nothing is titled.
    pub fn route_summary(&self) -> Option<String> {
        let summary = self
            .destinations
            .iter()
            .rev()
            .filter_map(|d| d.title())
            .join(ROUTE_SEPARATOR);
        if summary.is_empty() {
            None
        } else {
            Some(summary)
        }
    }
    /// Structural equality: same name, note and destinations (by value)
    pub fn same_value(&self, rhs: &Self) -> bool {
        self.name == rhs.name
            && self.note == rhs.note
            && self.destinations.len() == rhs.destinations.len()
            && self
                .destinations
                .iter()
                .zip(rhs.destinations.iter())
                .all(|(a, b)| a.same_value(b))
    }
}
