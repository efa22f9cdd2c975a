use crate::{error::SubtrackError, shared::usecase::UseCase};
use subtrack_domain::{BillingResult, Subscription, ID};
use subtrack_infra::SubtrackContext;

/// Resolves where a `Subscription` is in its billing cycle today
#[derive(Debug)]
pub struct GetBillingStatusUseCase {
    pub subscription_id: ID,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
}

impl From<UseCaseError> for SubtrackError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(subscription_id) => Self::NotFound(format!(
                "The subscription with id: {}, was not found.",
                subscription_id
            )),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetBillingStatusUseCase {
    type Response = (Subscription, BillingResult);

    type Error = UseCaseError;

    const NAME: &'static str = "GetBillingStatus";

    async fn execute(&mut self, ctx: &SubtrackContext) -> Result<Self::Response, Self::Error> {
        let subscription = ctx
            .repos
            .subscriptions
            .find(&self.subscription_id)
            .await
            .ok_or(UseCaseError::NotFound(self.subscription_id))?;

        let billing = subscription.billing(&ctx.today());
        Ok((subscription, billing))
    }
}
