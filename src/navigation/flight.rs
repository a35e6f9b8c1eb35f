use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex,
};

use tokio_util::sync::CancellationToken;

use crate::navigation::lock;

/// [SingleFlight] tracks the one query a fetcher may have running.
/// Starting a new [Flight] cancels the running one.
#[derive(Debug, Default)]
pub(crate) struct SingleFlight {
    slot: Mutex<Option<(u64, CancellationToken)>>,
    next: AtomicU64,
}

impl SingleFlight {
    /// Starts a new [Flight], cancelling the running one
    pub fn begin(&self) -> Flight<'_> {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let prior = lock(&self.slot).replace((id, token.clone()));
        if let Some((_, prior)) = prior {
            prior.cancel();
        }
        Flight {
            owner: self,
            id,
            token,
        }
    }
    /// True while a query is running
    pub fn is_busy(&self) -> bool {
        lock(&self.slot).is_some()
    }
    /// Cancels the running query, if any
    pub fn cancel(&self) {
        if let Some((_, token)) = lock(&self.slot).take() {
            token.cancel();
        }
    }
}

/// One running query. Releases its [SingleFlight] slot when dropped,
/// unless a newer one took it.
#[derive(Debug)]
pub(crate) struct Flight<'a> {
    owner: &'a SingleFlight,
    id: u64,
    token: CancellationToken,
}

impl Flight<'_> {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        let mut slot = lock(&self.owner.slot);
        if matches!(*slot, Some((id, _)) if id == self.id) {
            *slot = None;
        }
    }
}
