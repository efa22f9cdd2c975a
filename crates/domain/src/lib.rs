mod billing;
pub mod date;
mod month_view;
mod reminder;
mod reminder_catalog;
mod reminder_session;
mod reminder_sync;
mod shared;
mod subscription;

pub use billing::{
    resolve_next_billing, resolve_next_billing_from_str, upcoming_billings, BillingResult,
    BillingStatus, UpcomingBilling,
};
pub use month_view::{
    group_subscriptions_by_month, is_active_in_month, month_matrix, month_total, DayBuckets, Week,
};
pub use reminder::{
    decode, encode, lookup_preset_key, AppliesTo, Channels, CustomReminder, NewReminder,
    NotificationChannel, PersistedReminder, PresetReminder, ReminderDuration, ReminderSpec,
    ReminderTokenError, TimeUnit, PRESET_CHANNEL,
};
pub use reminder_catalog::{ReminderCatalog, ReminderOption};
pub use reminder_session::{
    validate_custom, EditState, ReminderEditError, ReminderEditSession, MIN_REMINDER_MINUTES,
};
pub use reminder_sync::{plan_sync, ReminderKey, SyncKind, SyncPlan};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use subscription::{RecurrenceType, Subscription};
