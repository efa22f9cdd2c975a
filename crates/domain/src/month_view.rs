use crate::{
    date::{first_day_of_month, get_month_length, month_index},
    Subscription,
};
use chrono::prelude::*;
use std::collections::BTreeMap;

/// One calendar row, Monday first. `None` cells pad the first and last week.
pub type Week = [Option<u32>; 7];

/// Subscriptions active in a month keyed by the day of month they started on
pub type DayBuckets = BTreeMap<u32, Vec<Subscription>>;

/// Lays out the month that `date` is in as Monday first weeks.
pub fn month_matrix(date: &NaiveDate) -> Vec<Week> {
    let first = first_day_of_month(date);
    let days_in_month = get_month_length(first.year(), first.month());
    // Sunday first index remapped so that Monday is column 0
    let offset = (first.weekday().num_days_from_sunday() + 6) % 7;

    let mut weeks = Vec::new();
    let mut week: Week = [None; 7];
    let mut column = offset as usize;
    for day in 1..=days_in_month {
        week[column] = Some(day);
        column += 1;
        if column == 7 {
            weeks.push(week);
            week = [None; 7];
            column = 0;
        }
    }
    if column > 0 {
        weeks.push(week);
    }
    weeks
}

/// Whether the subscription runs during the month that `date` is in.
/// Compared on (year, month) only, the days within the months are ignored.
pub fn is_active_in_month(subscription: &Subscription, date: &NaiveDate) -> bool {
    let month = month_index(date);
    if month < month_index(&subscription.start_date) {
        return false;
    }
    match subscription.effective_end_date() {
        Some(end) => month <= month_index(&end),
        None => true,
    }
}

/// Buckets every subscription active in the month of `target` under the day
/// of month of its start date. Input order is kept within a bucket.
///
/// The start day is used for every month, even where a monthly plan started
/// on the 31st is actually charged earlier in a shorter month.
pub fn group_subscriptions_by_month(subscriptions: &[Subscription], target: &NaiveDate) -> DayBuckets {
    let mut buckets = DayBuckets::new();
    for subscription in subscriptions
        .iter()
        .filter(|subscription| is_active_in_month(subscription, target))
    {
        buckets
            .entry(subscription.start_date.day())
            .or_insert_with(Vec::new)
            .push(subscription.clone());
    }
    buckets
}

/// Sum of the prices of every bucketed subscription
pub fn month_total(buckets: &DayBuckets) -> f64 {
    buckets
        .values()
        .flatten()
        .map(|subscription| subscription.price)
        .sum()
}
