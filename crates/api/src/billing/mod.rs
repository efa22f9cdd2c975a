mod get_billing_status;
mod get_monthly_calendar;
mod get_upcoming_billings;

pub use get_billing_status::GetBillingStatusUseCase;
pub use get_monthly_calendar::{GetMonthlyCalendarUseCase, MonthlyCalendar};
pub use get_upcoming_billings::GetUpcomingBillingsUseCase;
