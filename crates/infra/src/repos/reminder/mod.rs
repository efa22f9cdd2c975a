mod inmemory;

use crate::repos::shared::repo::DeleteResult;
pub use inmemory::InMemoryReminderRepo;
use subtrack_domain::{PersistedReminder, ID};

#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    async fn bulk_insert(&self, reminders: &[PersistedReminder]) -> anyhow::Result<()>;
    async fn save(&self, reminder: &PersistedReminder) -> anyhow::Result<()>;
    async fn find_by_subscription(&self, subscription_id: &ID) -> Vec<PersistedReminder>;
    async fn delete_many(&self, reminder_ids: &[ID]) -> anyhow::Result<DeleteResult>;
}
