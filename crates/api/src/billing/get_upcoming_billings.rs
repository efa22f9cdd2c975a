use crate::{error::SubtrackError, shared::usecase::UseCase};
use subtrack_domain::{upcoming_billings, UpcomingBilling};
use subtrack_infra::SubtrackContext;

/// Subscriptions that are charged within the next few days, soonest first
#[derive(Debug, Default)]
pub struct GetUpcomingBillingsUseCase {
    /// Falls back to the configured window when not given
    pub within_days: Option<i64>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    InvalidWindow(i64),
}

impl From<UseCaseError> for SubtrackError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidWindow(days) => Self::BadClientData(format!(
                "The upcoming window must be zero or more days, got: {}",
                days
            )),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetUpcomingBillingsUseCase {
    type Response = Vec<UpcomingBilling>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetUpcomingBillings";

    async fn execute(&mut self, ctx: &SubtrackContext) -> Result<Self::Response, Self::Error> {
        let within_days = self
            .within_days
            .unwrap_or(ctx.config.upcoming_window_days);
        if within_days < 0 {
            return Err(UseCaseError::InvalidWindow(within_days));
        }

        let subscriptions = ctx.repos.subscriptions.find_all().await;
        Ok(upcoming_billings(&subscriptions, &ctx.today(), within_days))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use subtrack_domain::{RecurrenceType, Subscription};
    use subtrack_infra::{setup_context, StaticTimeSys};

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[tokio::test]
    async fn lists_billings_inside_window() {
        let mut ctx = setup_context();
        ctx.config.upcoming_window_days = 7;
        ctx.sys = Arc::new(StaticTimeSys::at_date(ymd(2024, 3, 10)));

        let soon = Subscription::new("Soon", RecurrenceType::Monthly, 5.0, ymd(2024, 1, 15));
        let today = Subscription::new("Today", RecurrenceType::Yearly, 50.0, ymd(2020, 3, 10));
        let later = Subscription::new("Later", RecurrenceType::Monthly, 5.0, ymd(2024, 1, 25));
        let ended = Subscription::new("Ended", RecurrenceType::Monthly, 5.0, ymd(2023, 1, 12))
            .with_end_date(ymd(2024, 2, 1));
        ctx.repos
            .subscriptions
            .bulk_insert(&[soon.clone(), today.clone(), later.clone(), ended])
            .await
            .unwrap();

        let mut usecase = GetUpcomingBillingsUseCase::default();
        let res = usecase.execute(&ctx).await.unwrap();
        let names = res
            .iter()
            .map(|u| u.subscription.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Today", "Soon"]);

        let mut usecase = GetUpcomingBillingsUseCase {
            within_days: Some(30),
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res.len(), 3);
        assert_eq!(res[2].subscription, later);
    }

    #[tokio::test]
    async fn rejects_negative_window() {
        let ctx = setup_context();
        let mut usecase = GetUpcomingBillingsUseCase {
            within_days: Some(-1),
        };
        assert_eq!(
            usecase.execute(&ctx).await.unwrap_err(),
            UseCaseError::InvalidWindow(-1)
        );
    }
}
