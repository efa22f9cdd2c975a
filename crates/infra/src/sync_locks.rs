use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};
use subtrack_domain::ID;

/// Subscriptions that currently have a reminder sync in flight
#[derive(Clone, Default)]
pub struct SyncLocks {
    in_flight: Arc<Mutex<HashSet<ID>>>,
}

/// Releases the lock of its subscription when dropped
pub struct SyncGuard {
    subscription_id: ID,
    in_flight: Arc<Mutex<HashSet<ID>>>,
}

impl SyncLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` if a sync for this subscription is already running
    pub fn try_acquire(&self, subscription_id: &ID) -> Option<SyncGuard> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !in_flight.insert(*subscription_id) {
            return None;
        }
        Some(SyncGuard {
            subscription_id: *subscription_id,
            in_flight: self.in_flight.clone(),
        })
    }

    pub fn is_locked(&self, subscription_id: &ID) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(subscription_id)
    }
}

impl Drop for SyncGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.subscription_id);
    }
}
