use chrono::NaiveDate;
use std::sync::Arc;
use subtrack_domain::Subscription;
use subtrack_infra::{setup_context, StaticTimeSys, SubtrackContext};

pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// In memory context where today is `today` and the given subscriptions are stored
pub async fn spawn_ctx(today: NaiveDate, subscriptions: &[Subscription]) -> SubtrackContext {
    let mut ctx = setup_context();
    ctx.sys = Arc::new(StaticTimeSys::at_date(today));
    ctx.config.timezone = chrono_tz::Tz::UTC;
    ctx.config.upcoming_window_days = 7;
    ctx.repos
        .subscriptions
        .bulk_insert(subscriptions)
        .await
        .expect("To store subscriptions");
    ctx
}
