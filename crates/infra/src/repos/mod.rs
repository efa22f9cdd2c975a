mod reminder;
mod shared;
mod subscription;

pub use reminder::IReminderRepo;
use reminder::InMemoryReminderRepo;
pub use shared::repo::DeleteResult;
use std::sync::Arc;
pub use subscription::ISubscriptionRepo;
use subscription::InMemorySubscriptionRepo;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub subscriptions: Arc<dyn ISubscriptionRepo>,
    pub reminders: Arc<dyn IReminderRepo>,
}

impl Repos {
    pub fn create_inmemory() -> Self {
        info!("Using inmemory repositories");
        Self {
            subscriptions: Arc::new(InMemorySubscriptionRepo::new()),
            reminders: Arc::new(InMemoryReminderRepo::new()),
        }
    }
}
