use crate::{error::SubtrackError, shared::usecase::UseCase};
use itertools::Itertools;
use subtrack_domain::{
    plan_sync, validate_custom, ReminderEditError, ReminderSpec, Subscription, SyncPlan, ID,
};
use subtrack_infra::SubtrackContext;
use tracing::{error, info, warn};

/// Makes the stored reminders of a `Subscription` match the reminders the
/// user ended up with after editing them
#[derive(Debug)]
pub struct SyncSubscriptionRemindersUseCase {
    pub subscription_id: ID,
    pub reminders: Vec<ReminderSpec>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    InvalidReminder(ReminderEditError),
    SyncInProgress(ID),
    StorageError,
}

impl From<UseCaseError> for SubtrackError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(subscription_id) => Self::NotFound(format!(
                "The subscription with id: {}, was not found.",
                subscription_id
            )),
            UseCaseError::InvalidReminder(e) => Self::BadClientData(e.to_string()),
            UseCaseError::SyncInProgress(subscription_id) => Self::Conflict(format!(
                "The reminders of subscription: {} are already being synchronized",
                subscription_id
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

fn validate(subscription: &Subscription, spec: &ReminderSpec) -> Result<(), ReminderEditError> {
    if !spec.applies_to().includes(subscription.recurrence_type) {
        return Err(ReminderEditError::NotApplicable(
            spec.token(),
            subscription.recurrence_type,
        ));
    }
    if let ReminderSpec::Custom(custom) = spec {
        let duration = custom.duration();
        validate_custom(
            Some(duration.amount),
            Some(duration.unit),
            custom.channels().iter().copied(),
        )?;
    }
    Ok(())
}

#[async_trait::async_trait(?Send)]
impl UseCase for SyncSubscriptionRemindersUseCase {
    type Response = SyncPlan;

    type Error = UseCaseError;

    const NAME: &'static str = "SyncSubscriptionReminders";

    async fn execute(&mut self, ctx: &SubtrackContext) -> Result<Self::Response, Self::Error> {
        let subscription = ctx
            .repos
            .subscriptions
            .find(&self.subscription_id)
            .await
            .ok_or(UseCaseError::NotFound(self.subscription_id))?;

        for spec in &self.reminders {
            validate(&subscription, spec).map_err(UseCaseError::InvalidReminder)?;
        }

        let _guard = ctx
            .sync_locks
            .try_acquire(&subscription.id)
            .ok_or(UseCaseError::SyncInProgress(subscription.id))?;

        let persisted = ctx
            .repos
            .reminders
            .find_by_subscription(&subscription.id)
            .await;
        for (duration, rows) in &persisted
            .iter()
            .sorted_by_key(|reminder| reminder.duration())
            .group_by(|reminder| reminder.duration())
        {
            let count = rows.count();
            if count > 1 {
                warn!(
                    "Subscription: {} has {} stored reminders {} {} before billing",
                    subscription.id, count, duration.amount, duration.unit
                );
            }
        }

        let plan = plan_sync(&subscription.id, &self.reminders, &persisted);
        info!(
            "Synchronizing reminders of subscription: {} as {:?}",
            subscription.id,
            plan.kind()
        );

        if !plan.to_delete.is_empty() {
            let ids = plan.to_delete.iter().map(|r| r.id).collect::<Vec<_>>();
            ctx.repos.reminders.delete_many(&ids).await.map_err(|e| {
                error!(
                    "Unable to delete reminders of subscription: {}. Err: {:?}",
                    subscription.id, e
                );
                UseCaseError::StorageError
            })?;
        }

        for reminder in &plan.to_update {
            ctx.repos.reminders.save(reminder).await.map_err(|e| {
                error!("Unable to update reminder: {}. Err: {:?}", reminder.id, e);
                UseCaseError::StorageError
            })?;
        }

        if !plan.to_create.is_empty() {
            let reminders = plan
                .to_create
                .iter()
                .cloned()
                .map(|reminder| reminder.persist(ID::new()))
                .collect::<Vec<_>>();
            ctx.repos.reminders.bulk_insert(&reminders).await.map_err(|e| {
                error!(
                    "Unable to store reminders of subscription: {}. Err: {:?}",
                    subscription.id, e
                );
                UseCaseError::StorageError
            })?;
        }

        Ok(plan)
    }
}
