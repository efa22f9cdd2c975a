mod billing;
mod error;
mod reminder;
mod shared;

pub use billing::{
    GetBillingStatusUseCase, GetMonthlyCalendarUseCase, GetUpcomingBillingsUseCase,
    MonthlyCalendar,
};
pub use error::SubtrackError;
pub use reminder::{GetSubscriptionRemindersUseCase, SyncSubscriptionRemindersUseCase};
pub use shared::usecase::{execute, UseCase};
