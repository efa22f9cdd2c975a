use crate::{error::SubtrackError, shared::usecase::UseCase};
use chrono::prelude::*;
use serde::Serialize;
use subtrack_domain::{group_subscriptions_by_month, month_matrix, month_total, DayBuckets, Week};
use subtrack_infra::SubtrackContext;

/// Calendar grid of a month together with the subscriptions charged in it
#[derive(Debug)]
pub struct GetMonthlyCalendarUseCase {
    /// Any day in the month, today when not given
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCalendar {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Week>,
    pub buckets: DayBuckets,
    pub total: f64,
}

#[derive(Debug)]
pub enum UseCaseError {}

impl From<UseCaseError> for SubtrackError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetMonthlyCalendarUseCase {
    type Response = MonthlyCalendar;

    type Error = UseCaseError;

    const NAME: &'static str = "GetMonthlyCalendar";

    async fn execute(&mut self, ctx: &SubtrackContext) -> Result<Self::Response, Self::Error> {
        let date = self.date.unwrap_or_else(|| ctx.today());
        let subscriptions = ctx.repos.subscriptions.find_all().await;
        let buckets = group_subscriptions_by_month(&subscriptions, &date);

        Ok(MonthlyCalendar {
            year: date.year(),
            month: date.month(),
            weeks: month_matrix(&date),
            total: month_total(&buckets),
            buckets,
        })
    }
}
