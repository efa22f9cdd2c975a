mod get_subscription_reminders;
mod sync_subscription_reminders;

pub use get_subscription_reminders::GetSubscriptionRemindersUseCase;
pub use sync_subscription_reminders::SyncSubscriptionRemindersUseCase;
