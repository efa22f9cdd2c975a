mod config;
mod repos;
mod sync_locks;
mod system;

use chrono::NaiveDate;
pub use config::Config;
pub use repos::{DeleteResult, IReminderRepo, ISubscriptionRepo, Repos};
use std::sync::Arc;
pub use sync_locks::{SyncGuard, SyncLocks};
pub use system::{ISys, RealSys, StaticTimeSys};

#[derive(Clone)]
pub struct SubtrackContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub sync_locks: SyncLocks,
}

impl SubtrackContext {
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            sync_locks: SyncLocks::new(),
        }
    }

    /// The calendar day it is in the configured timezone
    pub fn today(&self) -> NaiveDate {
        self.sys.today(&self.config.timezone)
    }
}

/// Will setup the infrastructure context given the environment
pub fn setup_context() -> SubtrackContext {
    SubtrackContext::create_inmemory()
}
