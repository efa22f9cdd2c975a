use super::IReminderRepo;
use crate::repos::shared::{inmemory_repo::*, repo::DeleteResult};
use subtrack_domain::{PersistedReminder, ID};

pub struct InMemoryReminderRepo {
    reminders: std::sync::Mutex<Vec<PersistedReminder>>,
}

impl InMemoryReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IReminderRepo for InMemoryReminderRepo {
    async fn bulk_insert(&self, reminders: &[PersistedReminder]) -> anyhow::Result<()> {
        insert_many(reminders, &self.reminders);
        Ok(())
    }

    async fn save(&self, reminder: &PersistedReminder) -> anyhow::Result<()> {
        if save(reminder, &self.reminders) {
            Ok(())
        } else {
            Err(anyhow::Error::msg(format!(
                "Reminder: {} does not exist",
                reminder.id
            )))
        }
    }

    async fn find_by_subscription(&self, subscription_id: &ID) -> Vec<PersistedReminder> {
        find_by(&self.reminders, |r| r.subscription_id == *subscription_id)
    }

    async fn delete_many(&self, reminder_ids: &[ID]) -> anyhow::Result<DeleteResult> {
        Ok(delete_by(&self.reminders, |r| reminder_ids.contains(&r.id)))
    }
}
