use std::{
    io::{ErrorKind, Write},
    path::Path,
};

#[cfg(feature = "log")]
use log::debug;

use crate::{
    destination::{DestinationSet, SetId},
    Error,
};

/// [Catalog] is the "current" [DestinationSet] and the other sets,
/// most recently demoted first.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    current: DestinationSet,
    others: Vec<DestinationSet>,
}

impl Catalog {
    pub fn new(current: DestinationSet, others: Vec<DestinationSet>) -> Self {
        Self { current, others }
    }
    /// Current set
    pub fn current(&self) -> &DestinationSet {
        &self.current
    }
    pub(crate) fn current_mut(&mut self) -> &mut DestinationSet {
        &mut self.current
    }
    /// Other sets
    pub fn others(&self) -> &[DestinationSet] {
        &self.others
    }
    /// All sets: current first
    pub fn sets(&self) -> impl Iterator<Item = &DestinationSet> + '_ {
        std::iter::once(&self.current).chain(self.others.iter())
    }
    /// Promotes `others[index]` to current. Prior current is demoted
    /// to the front of the others, unless it was empty (dropped).
    pub fn select_index(&mut self, index: usize) -> Result<(), Error> {
        if index >= self.others.len() {
            return Err(Error::InvalidIndex(index));
        }
        let chosen = self.others.remove(index);
        let prior = std::mem::replace(&mut self.current, chosen);
        if !prior.is_empty() {
            self.others.insert(0, prior);
        }
        Ok(())
    }
    /// Promotes given set to current. Selecting the current set is a no-op.
    pub fn select(&mut self, id: SetId) -> Result<(), Error> {
        if self.current.id() == id {
            return Ok(());
        }
        let index = self
            .others
            .iter()
            .position(|set| set.id() == id)
            .ok_or(Error::UnknownSet)?;
        self.select_index(index)
    }
    /// Adds a set to the others
    pub fn add_set(&mut self, set: DestinationSet) -> SetId {
        let id = set.id();
        self.others.push(set);
        id
    }
    /// Makes a new empty set current, demoting the prior one
    /// (dropped if it was empty)
    pub fn start_new_set(&mut self, name: Option<String>) -> SetId {
        let set = DestinationSet::new(name);
        let id = set.id();
        let prior = std::mem::replace(&mut self.current, set);
        if !prior.is_empty() {
            self.others.insert(0, prior);
        }
        id
    }
    /// Removes given set. When it is the current one, the first other
    /// set (or a new empty one) becomes current.
    pub fn remove_set(&mut self, id: SetId) -> Result<DestinationSet, Error> {
        if self.current.id() == id {
            let next = if self.others.is_empty() {
                DestinationSet::default()
            } else {
                self.others.remove(0)
            };
            return Ok(std::mem::replace(&mut self.current, next));
        }
        let index = self
            .others
            .iter()
            .position(|set| set.id() == id)
            .ok_or(Error::UnknownSet)?;
        Ok(self.others.remove(index))
    }
    /// Encodes `[current, ...others]` as one JSON array
    pub fn to_json(&self) -> Result<String, Error> {
        let sets: Vec<&DestinationSet> = self.sets().collect();
        Ok(serde_json::to_string_pretty(&sets)?)
    }
    /// Decodes a JSON array: first element becomes current.
    /// An empty array is an empty catalog.
    pub fn from_json(content: &str) -> Result<Self, Error> {
        let mut sets: Vec<DestinationSet> = serde_json::from_str(content)?;
        if sets.is_empty() {
            return Ok(Self::default());
        }
        let current = sets.remove(0);
        Ok(Self::new(current, sets))
    }
    /// Writes the catalog to given file. Content is encoded first, then
    /// written to a temporary file which replaces the target: on any
    /// failure the previous file is left untouched.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let content = self.to_json()?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = std::path::PathBuf::from(tmp);
        let written = std::fs::File::create(&tmp).and_then(|mut fd| {
            fd.write_all(content.as_bytes())?;
            fd.sync_all()
        });
        if let Err(e) = written.and_then(|_| std::fs::rename(&tmp, path)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        #[cfg(feature = "log")]
        debug!("catalog saved to \"{}\"", path.display());
        Ok(())
    }
    /// Reads the catalog from given file. A missing file is an empty catalog.
    pub fn load(path: &Path) -> Result<Self, Error> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_json(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
    /// Structural equality: same sets (by value), same partition
    pub fn same_value(&self, rhs: &Self) -> bool {
        self.current.same_value(&rhs.current)
            && self.others.len() == rhs.others.len()
            && self
                .others
                .iter()
                .zip(rhs.others.iter())
                .all(|(a, b)| a.same_value(b))
    }
}
