use std::path::{Path, PathBuf};

use tokio::sync::watch;

#[cfg(feature = "log")]
use log::{debug, error};

use crate::{
    destination::{Catalog, Destination, DestinationSet, Mutation, SetEvent, SetId},
    Error,
};

/// [DestinationStore] owns the [Catalog] and is the only way to mutate it.
/// The current set is published on three watch streams: the destination
/// sequence, the raw cursor and the resolved target. Subscribers always
/// observe the current value first.
/// When opened on a file, the catalog is saved after every mutation.
#[derive(Debug)]
pub struct DestinationStore {
    catalog: Catalog,
    storage: Option<PathBuf>,
    destinations: watch::Sender<Vec<Destination>>,
    target_index: watch::Sender<Option<usize>>,
    target: watch::Sender<Option<Destination>>,
}

fn same_target(a: &Option<Destination>, b: Option<&Destination>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.id() == b.id() && a.same_value(b),
        (None, None) => true,
        _ => false,
    }
}

impl Default for DestinationStore {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

impl DestinationStore {
    /// Builds a memory only [DestinationStore]
    pub fn new(catalog: Catalog) -> Self {
        let current = catalog.current();
        let (destinations, _) = watch::channel(current.destinations().to_vec());
        let (target_index, _) = watch::channel(current.target_index());
        let (target, _) = watch::channel(current.target().cloned());
        Self {
            catalog,
            storage: None,
            destinations,
            target_index,
            target,
        }
    }
    /// Opens a [DestinationStore] backed by given file, loading its content.
    /// A missing file is an empty catalog.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let catalog = Catalog::load(&path)?;
        let mut store = Self::new(catalog);
        store.storage = Some(path);
        Ok(store)
    }
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
    /// Current [DestinationSet]
    pub fn current(&self) -> &DestinationSet {
        self.catalog.current()
    }
    /// Targeted destination, in current set
    pub fn target(&self) -> Option<&Destination> {
        self.current().target()
    }
    /// See [DestinationSet::route_summary]
    pub fn route_summary(&self) -> Option<String> {
        self.current().route_summary()
    }
    /// Destination sequence stream
    pub fn subscribe_destinations(&self) -> watch::Receiver<Vec<Destination>> {
        let mut rx = self.destinations.subscribe();
        rx.mark_changed();
        rx
    }
    /// Raw cursor stream
    pub fn subscribe_target_index(&self) -> watch::Receiver<Option<usize>> {
        let mut rx = self.target_index.subscribe();
        rx.mark_changed();
        rx
    }
    /// Resolved target stream
    pub fn subscribe_target(&self) -> watch::Receiver<Option<Destination>> {
        let mut rx = self.target.subscribe();
        rx.mark_changed();
        rx
    }
    /// Applies one [Mutation] to the current set: the new state is
    /// committed, then published, then persisted.
    pub fn apply(&mut self, mutation: Mutation) -> Result<Vec<SetEvent>, Error> {
        let (next, events) = self.current().apply(mutation)?;
        *self.catalog.current_mut() = next;
        self.publish(&events);
        self.persist()?;
        Ok(events)
    }
    pub fn append(&mut self, destination: Destination) -> Result<Vec<SetEvent>, Error> {
        self.apply(Mutation::Append(destination))
    }
    pub fn insert(&mut self, index: usize, destination: Destination) -> Result<Vec<SetEvent>, Error> {
        self.apply(Mutation::Insert(index, destination))
    }
    pub fn remove(&mut self, index: usize) -> Result<Vec<SetEvent>, Error> {
        self.apply(Mutation::Remove(index))
    }
    pub fn move_destination(&mut self, from: usize, to: usize) -> Result<Vec<SetEvent>, Error> {
        self.apply(Mutation::Move { from, to })
    }
    pub fn replace(&mut self, destinations: Vec<Destination>) -> Result<Vec<SetEvent>, Error> {
        self.apply(Mutation::Replace(destinations))
    }
    pub fn retitle(&mut self, index: usize, title: Option<String>) -> Result<Vec<SetEvent>, Error> {
        self.apply(Mutation::Retitle(index, title))
    }
    pub fn clear(&mut self) -> Result<Vec<SetEvent>, Error> {
        self.apply(Mutation::Clear)
    }
    pub fn set_target_index(&mut self, index: usize) -> Result<Vec<SetEvent>, Error> {
        self.apply(Mutation::SetTarget(index))
    }
    /// Targets next destination, wrapping around
    pub fn go_forward(&mut self) -> Result<Vec<SetEvent>, Error> {
        self.apply(Mutation::Step(1))
    }
    /// Targets previous destination, wrapping around
    pub fn go_backward(&mut self) -> Result<Vec<SetEvent>, Error> {
        self.apply(Mutation::Step(-1))
    }
    /// Renames current set
    pub fn rename(&mut self, name: Option<String>) -> Result<(), Error> {
        self.catalog.current_mut().set_name(name);
        self.persist()
    }
    /// Annotates current set
    pub fn set_note(&mut self, note: Option<String>) -> Result<(), Error> {
        self.catalog.current_mut().set_note(note);
        self.persist()
    }
    /// Switches current set, see [Catalog::select]
    pub fn select(&mut self, id: SetId) -> Result<(), Error> {
        self.catalog.select(id)?;
        self.publish_all();
        self.persist()
    }
    /// Switches current set, see [Catalog::select_index]
    pub fn select_index(&mut self, index: usize) -> Result<(), Error> {
        self.catalog.select_index(index)?;
        self.publish_all();
        self.persist()
    }
    /// Adds a set to the others
    pub fn add_set(&mut self, set: DestinationSet) -> Result<SetId, Error> {
        let id = self.catalog.add_set(set);
        self.persist()?;
        Ok(id)
    }
    /// Starts a new empty current set
    pub fn start_new_set(&mut self, name: Option<String>) -> Result<SetId, Error> {
        let id = self.catalog.start_new_set(name);
        self.publish_all();
        self.persist()?;
        Ok(id)
    }
    /// Removes a set (current or not)
    pub fn remove_set(&mut self, id: SetId) -> Result<DestinationSet, Error> {
        let removed = self.catalog.remove_set(id)?;
        self.publish_all();
        self.persist()?;
        Ok(removed)
    }
    /// Saves the catalog to its backing file, if any
    pub fn save_all(&self) -> Result<(), Error> {
        match &self.storage {
            Some(path) => self.catalog.save(path),
            None => Ok(()),
        }
    }
    /// Reloads the catalog from its backing file, if any
    pub fn load_all(&mut self) -> Result<(), Error> {
        if let Some(path) = &self.storage {
            self.catalog = Catalog::load(path)?;
            #[cfg(feature = "log")]
            debug!(
                "catalog loaded: {} set(s)",
                self.catalog.sets().count()
            );
            self.publish_all();
        }
        Ok(())
    }
    fn persist(&self) -> Result<(), Error> {
        let saved = self.save_all();
        #[cfg(feature = "log")]
        if let Err(e) = &saved {
            error!("failed to save catalog: {}", e);
        }
        saved
    }
    fn publish_target(&self) {
        let target = self.current().target();
        self.target.send_if_modified(|current| {
            if same_target(current, target) {
                false
            } else {
                *current = target.cloned();
                true
            }
        });
    }
    fn publish(&self, events: &[SetEvent]) {
        let current = self.current();
        if events.contains(&SetEvent::DestinationsChanged) {
            self.destinations.send_replace(current.destinations().to_vec());
        }
        for event in events {
            if let SetEvent::TargetIndexChanged(index) = event {
                self.target_index.send_replace(*index);
            }
        }
        self.publish_target();
    }
    fn publish_all(&self) {
        let current = self.current();
        self.destinations.send_replace(current.destinations().to_vec());
        self.target_index.send_if_modified(|index| {
            if *index == current.target_index() {
                false
            } else {
                *index = current.target_index();
                true
            }
        });
        self.publish_target();
    }
}
