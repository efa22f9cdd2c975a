use crate::{
    billing::{resolve_next_billing, BillingResult},
    date::{add_months_safe, add_years_safe, month_index},
    shared::entity::{Entity, ID},
};
use chrono::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecurrenceType {
    Monthly,
    Yearly,
}

impl RecurrenceType {
    /// The date of billing cycle number `cycle` for a subscription starting
    /// at `start`. Always computed from the start date so that an anchor on
    /// the 31st does not drift after passing through a short month.
    pub fn occurrence(&self, start: &NaiveDate, cycle: i32) -> NaiveDate {
        match self {
            Self::Monthly => add_months_safe(start, cycle),
            Self::Yearly => add_years_safe(start, cycle),
        }
    }

    /// Number of whole cycles from `start` that are guaranteed to land
    /// strictly before `today`'s month (or year)
    pub(crate) fn cycles_before(&self, start: &NaiveDate, today: &NaiveDate) -> i32 {
        let cycles = match self {
            Self::Monthly => month_index(today) - month_index(start),
            Self::Yearly => today.year() as i64 - start.year() as i64,
        };
        cycles.max(0).min(i32::MAX as i64) as i32
    }
}

fn default_recurring() -> bool {
    true
}

/// A tracked subscription as stored by the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: ID,
    #[serde(default)]
    pub name: String,
    pub recurrence_type: RecurrenceType,
    pub price: f64,
    pub start_date: NaiveDate,
    /// `None` for subscriptions without a planned end
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_recurring")]
    pub recurring: bool,
}

impl Subscription {
    pub fn new(
        name: &str,
        recurrence_type: RecurrenceType,
        price: f64,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Default::default(),
            name: name.to_string(),
            recurrence_type,
            price,
            start_date,
            end_date: None,
            recurring: true,
        }
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// A one-off purchase is only ever charged on its start date.
    pub fn effective_end_date(&self) -> Option<NaiveDate> {
        if self.recurring {
            self.end_date
        } else {
            Some(match self.end_date {
                Some(end) if end < self.start_date => end,
                _ => self.start_date,
            })
        }
    }

    pub fn billing(&self, today: &NaiveDate) -> BillingResult {
        resolve_next_billing(
            &self.start_date,
            self.effective_end_date().as_ref(),
            self.recurrence_type,
            today,
        )
    }
}

impl Entity for Subscription {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::BillingStatus;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn deserializes_host_representation() {
        let json = r#"{
            "id": "7d3c1f4e-4c7a-4a5e-9a51-0b8c2f0a6e11",
            "name": "Music",
            "recurrenceType": "MONTHLY",
            "price": 9.99,
            "startDate": "2024-01-31",
            "endDate": null
        }"#;
        let sub: Subscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.recurrence_type, RecurrenceType::Monthly);
        assert_eq!(sub.start_date, ymd(2024, 1, 31));
        assert_eq!(sub.end_date, None);
        assert!(sub.recurring);
    }

    #[test]
    fn occurrences_do_not_drift() {
        let start = ymd(2024, 1, 31);
        let occurrences = (0..4)
            .map(|cycle| RecurrenceType::Monthly.occurrence(&start, cycle))
            .collect::<Vec<_>>();
        assert_eq!(
            occurrences,
            vec![
                ymd(2024, 1, 31),
                ymd(2024, 2, 29),
                ymd(2024, 3, 31),
                ymd(2024, 4, 30)
            ]
        );
        assert_eq!(
            RecurrenceType::Yearly.occurrence(&ymd(2024, 2, 29), 1),
            ymd(2025, 2, 28)
        );
    }

    #[test]
    fn one_off_subscription_is_only_billed_on_start() {
        let mut sub = Subscription::new("Course", RecurrenceType::Monthly, 120.0, ymd(2024, 3, 10));
        sub.recurring = false;

        assert_eq!(sub.effective_end_date(), Some(ymd(2024, 3, 10)));
        assert_eq!(sub.billing(&ymd(2024, 3, 10)).status(), BillingStatus::DueToday);
        assert_eq!(sub.billing(&ymd(2024, 3, 1)).days_remaining(), Some(9));
        assert_eq!(sub.billing(&ymd(2024, 3, 11)).status(), BillingStatus::Expired);
    }
}
