use crate::{error::SubtrackError, shared::usecase::UseCase};
use subtrack_domain::{ReminderSpec, ID};
use subtrack_infra::SubtrackContext;
use tracing::warn;

/// The stored reminders of a `Subscription`, in storage order
#[derive(Debug)]
pub struct GetSubscriptionRemindersUseCase {
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
impl UseCase for GetSubscriptionRemindersUseCase {
    type Response = Vec<ReminderSpec>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetSubscriptionReminders";

    async fn execute(&mut self, ctx: &SubtrackContext) -> Result<Self::Response, Self::Error> {
        if ctx
            .repos
            .subscriptions
            .find(&self.subscription_id)
            .await
            .is_none()
        {
            return Err(UseCaseError::NotFound(self.subscription_id));
        }

        let reminders = ctx
            .repos
            .reminders
            .find_by_subscription(&self.subscription_id)
            .await
            .iter()
            .filter_map(|reminder| match ReminderSpec::from_persisted(reminder) {
                Ok(spec) => Some(spec),
                Err(e) => {
                    warn!("Skipping stored reminder: {}. Error: {}", reminder.id, e);
                    None
                }
            })
            .collect();
        Ok(reminders)
    }
}
