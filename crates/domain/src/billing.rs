use crate::{date::parse_date, subscription::RecurrenceType, Subscription};
use chrono::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingStatus {
    Active,
    DueToday,
    Expired,
}

/// Where a subscription is in its billing cycle relative to some day.
///
/// Can only be built through its constructors, which guarantees that an
/// expired result carries neither an occurrence nor a day count and that a
/// result due today is zero days away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingResult {
    occurrence_date: Option<NaiveDate>,
    status: BillingStatus,
    days_remaining: Option<i64>,
}

impl BillingResult {
    pub fn active(occurrence: NaiveDate, today: &NaiveDate) -> Self {
        if occurrence == *today {
            return Self::due_today(occurrence);
        }
        Self {
            occurrence_date: Some(occurrence),
            status: BillingStatus::Active,
            days_remaining: Some((occurrence - *today).num_days()),
        }
    }

    pub fn due_today(occurrence: NaiveDate) -> Self {
        Self {
            occurrence_date: Some(occurrence),
            status: BillingStatus::DueToday,
            days_remaining: Some(0),
        }
    }

    pub fn expired() -> Self {
        Self {
            occurrence_date: None,
            status: BillingStatus::Expired,
            days_remaining: None,
        }
    }

    pub fn occurrence_date(&self) -> Option<NaiveDate> {
        self.occurrence_date
    }

    pub fn status(&self) -> BillingStatus {
        self.status
    }

    pub fn days_remaining(&self) -> Option<i64> {
        self.days_remaining
    }

    pub fn is_expired(&self) -> bool {
        self.status == BillingStatus::Expired
    }
}

/// Finds the next billing occurrence on or after `today`.
///
/// An open ended subscription (`end_date` of `None`) never expires. Records
/// where the end date lies before the start date are reported as expired
/// instead of failing.
pub fn resolve_next_billing(
    start_date: &NaiveDate,
    end_date: Option<&NaiveDate>,
    recurrence: RecurrenceType,
    today: &NaiveDate,
) -> BillingResult {
    let end_date = end_date.copied().unwrap_or(NaiveDate::MAX);
    if *today > end_date || *start_date > end_date {
        return BillingResult::expired();
    }

    let mut cycle = recurrence.cycles_before(start_date, today);
    let mut previous = None;
    loop {
        let occurrence = recurrence.occurrence(start_date, cycle);
        // A repeated occurrence means the walk hit the end of the calendar
        if occurrence > end_date || previous == Some(occurrence) {
            return BillingResult::expired();
        }
        if occurrence >= *today {
            return BillingResult::active(occurrence, today);
        }
        previous = Some(occurrence);
        cycle = cycle.saturating_add(1);
    }
}

/// Same as `resolve_next_billing` for hosts that only have the raw date
/// strings. Unparsable dates resolve to an expired result.
pub fn resolve_next_billing_from_str(
    start_date: &str,
    end_date: Option<&str>,
    recurrence: RecurrenceType,
    today: &NaiveDate,
) -> BillingResult {
    let start_date = match parse_date(start_date) {
        Ok(date) => date,
        Err(_) => return BillingResult::expired(),
    };
    let end_date = match end_date.map(parse_date).transpose() {
        Ok(date) => date,
        Err(_) => return BillingResult::expired(),
    };
    resolve_next_billing(&start_date, end_date.as_ref(), recurrence, today)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingBilling {
    pub subscription: Subscription,
    pub billing: BillingResult,
}

/// Subscriptions that will be charged within `within_days` days of `today`,
/// soonest first.
pub fn upcoming_billings(
    subscriptions: &[Subscription],
    today: &NaiveDate,
    within_days: i64,
) -> Vec<UpcomingBilling> {
    let mut upcoming = subscriptions
        .iter()
        .map(|subscription| UpcomingBilling {
            billing: subscription.billing(today),
            subscription: subscription.clone(),
        })
        .filter(|upcoming| match upcoming.billing.days_remaining() {
            Some(days) => days <= within_days,
            None => false,
        })
        .collect::<Vec<_>>();

    upcoming.sort_by(|u1, u2| {
        u1.billing
            .days_remaining()
            .cmp(&u2.billing.days_remaining())
            .then_with(|| u1.subscription.name.cmp(&u2.subscription.name))
    });
    upcoming
}
