use crate::{
    reminder::{
        CustomReminder, NotificationChannel, PersistedReminder, PresetReminder, ReminderSpec,
        ReminderTokenError, TimeUnit,
    },
    reminder_catalog::{ReminderCatalog, ReminderOption},
    reminder_sync::{plan_sync, SyncKind, SyncPlan},
    shared::entity::ID,
    RecurrenceType,
};
use serde::Serialize;
use thiserror::Error;

/// Reminders can not fire closer to a billing than this
pub const MIN_REMINDER_MINUTES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditState {
    Empty,
    Editing,
    /// Waiting for new reminders to be stored
    Saving,
    /// Waiting for a mixed reconciliation to be applied
    Syncing,
    /// Waiting for all stored reminders to be removed
    Clearing,
}

impl EditState {
    fn is_busy(&self) -> bool {
        matches!(self, Self::Saving | Self::Syncing | Self::Clearing)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ReminderEditError {
    #[error("A custom reminder needs both an amount and a unit")]
    MissingAmountOrUnit,
    #[error("The reminder amount must be a positive number")]
    ZeroAmount,
    #[error("A custom reminder needs at least one notification channel")]
    MissingChannels,
    #[error("Reminders can not be set less than 30 minutes before a billing, got: {0} minutes")]
    TooCloseToBilling(u32),
    #[error("The reminder `{0}` is not available for {1:?} subscriptions")]
    NotApplicable(String, RecurrenceType),
    #[error("There is no reminder at position {0}")]
    NoSuchRow(usize),
    #[error("Reminders can not be changed while the previous changes are being saved")]
    Busy,
    #[error(transparent)]
    Token(#[from] ReminderTokenError),
}

/// Builds a custom reminder from what the user filled in
pub fn validate_custom(
    amount: Option<u32>,
    unit: Option<TimeUnit>,
    channels: impl IntoIterator<Item = NotificationChannel>,
) -> Result<CustomReminder, ReminderEditError> {
    let (amount, unit) = match (amount, unit) {
        (Some(amount), Some(unit)) => (amount, unit),
        _ => return Err(ReminderEditError::MissingAmountOrUnit),
    };
    if amount == 0 {
        return Err(ReminderEditError::ZeroAmount);
    }
    if unit == TimeUnit::Minutes && amount < MIN_REMINDER_MINUTES {
        return Err(ReminderEditError::TooCloseToBilling(amount));
    }
    CustomReminder::new(amount, unit, channels).ok_or(ReminderEditError::MissingChannels)
}

/// The reminders of one subscription while the user is editing them.
///
/// Every session owns its own `ReminderCatalog`, so custom reminders
/// created in one session never show up in another.
#[derive(Debug, Clone)]
pub struct ReminderEditSession {
    subscription_id: ID,
    recurrence: RecurrenceType,
    catalog: ReminderCatalog,
    rows: Vec<ReminderSpec>,
    state: EditState,
}

impl ReminderEditSession {
    pub fn new(subscription_id: ID, recurrence: RecurrenceType, catalog: ReminderCatalog) -> Self {
        Self {
            subscription_id,
            recurrence,
            catalog,
            rows: Vec::new(),
            state: EditState::Empty,
        }
    }

    /// Starts a session from the stored reminders of the subscription.
    /// Fails if a stored reminder can not be mapped back to a spec.
    pub fn open(
        subscription_id: ID,
        recurrence: RecurrenceType,
        catalog: ReminderCatalog,
        persisted: &[PersistedReminder],
    ) -> Result<Self, ReminderTokenError> {
        let mut session = Self::new(subscription_id, recurrence, catalog);
        for reminder in persisted
            .iter()
            .filter(|reminder| reminder.subscription_id == subscription_id)
        {
            let spec = ReminderSpec::from_persisted(reminder)?;
            if spec.is_custom() {
                session.catalog.register(&spec);
            }
            session.rows.push(spec);
        }
        if !session.rows.is_empty() {
            session.state = EditState::Editing;
        }
        Ok(session)
    }

    pub fn subscription_id(&self) -> &ID {
        &self.subscription_id
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn rows(&self) -> &[ReminderSpec] {
        &self.rows
    }

    pub fn catalog(&self) -> &ReminderCatalog {
        &self.catalog
    }

    /// Options that can be picked for this subscription
    pub fn options(&self) -> Vec<&ReminderOption> {
        self.catalog.options_for(self.recurrence)
    }

    fn start_edit(&mut self) -> Result<(), ReminderEditError> {
        if self.state.is_busy() {
            return Err(ReminderEditError::Busy);
        }
        self.state = EditState::Editing;
        Ok(())
    }

    fn check_applicable(&self, spec: &ReminderSpec) -> Result<(), ReminderEditError> {
        if spec.applies_to().includes(self.recurrence) {
            Ok(())
        } else {
            Err(ReminderEditError::NotApplicable(spec.token(), self.recurrence))
        }
    }

    pub fn add_preset(&mut self, preset: PresetReminder) -> Result<(), ReminderEditError> {
        let spec = ReminderSpec::Preset(preset);
        self.check_applicable(&spec)?;
        self.start_edit()?;
        self.rows.push(spec);
        Ok(())
    }

    /// Validates and adds a custom reminder, registering it as an option of
    /// this session
    pub fn add_custom(
        &mut self,
        amount: Option<u32>,
        unit: Option<TimeUnit>,
        channels: impl IntoIterator<Item = NotificationChannel>,
    ) -> Result<ReminderSpec, ReminderEditError> {
        let spec = ReminderSpec::Custom(validate_custom(amount, unit, channels)?);
        self.start_edit()?;
        self.catalog.register(&spec);
        self.rows.push(spec.clone());
        Ok(spec)
    }

    /// Adds the reminder behind a token picked from the options
    pub fn select(&mut self, token: &str) -> Result<ReminderSpec, ReminderEditError> {
        let spec = token.parse::<ReminderSpec>()?;
        self.check_applicable(&spec)?;
        self.start_edit()?;
        if spec.is_custom() {
            self.catalog.register(&spec);
        }
        self.rows.push(spec.clone());
        Ok(spec)
    }

    pub fn replace(&mut self, index: usize, spec: ReminderSpec) -> Result<ReminderSpec, ReminderEditError> {
        if index >= self.rows.len() {
            return Err(ReminderEditError::NoSuchRow(index));
        }
        self.check_applicable(&spec)?;
        self.start_edit()?;
        if spec.is_custom() {
            self.catalog.register(&spec);
        }
        Ok(std::mem::replace(&mut self.rows[index], spec))
    }

    pub fn remove(&mut self, index: usize) -> Result<ReminderSpec, ReminderEditError> {
        if index >= self.rows.len() {
            return Err(ReminderEditError::NoSuchRow(index));
        }
        self.start_edit()?;
        Ok(self.rows.remove(index))
    }

    /// Plans the storage operations for the current rows and waits for the
    /// caller to apply them. Editing is blocked until `finish` is called.
    pub fn commit(&mut self, persisted: &[PersistedReminder]) -> Result<SyncPlan, ReminderEditError> {
        if self.state.is_busy() {
            return Err(ReminderEditError::Busy);
        }
        let plan = plan_sync(&self.subscription_id, &self.rows, persisted);
        self.state = match plan.kind() {
            SyncKind::CreateOnly => EditState::Saving,
            SyncKind::Reconcile => EditState::Syncing,
            SyncKind::ClearAll => EditState::Clearing,
            SyncKind::Noop => self.idle_state(),
        };
        Ok(plan)
    }

    /// Called once the operations of the last plan are applied
    pub fn finish(&mut self) {
        self.state = self.idle_state();
    }

    fn idle_state(&self) -> EditState {
        if self.rows.is_empty() {
            EditState::Empty
        } else {
            EditState::Editing
        }
    }

    /// Ends the session and hands back its catalog
    pub fn close(self) -> ReminderCatalog {
        self.catalog
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use NotificationChannel::*;

    fn session(recurrence: RecurrenceType) -> ReminderEditSession {
        ReminderEditSession::new(ID::new(), recurrence, ReminderCatalog::new())
    }

    #[test]
    fn validates_custom_reminders() {
        assert_eq!(
            validate_custom(None, Some(TimeUnit::Days), vec![Email]),
            Err(ReminderEditError::MissingAmountOrUnit)
        );
        assert_eq!(
            validate_custom(Some(3), None, vec![Email]),
            Err(ReminderEditError::MissingAmountOrUnit)
        );
        assert_eq!(
            validate_custom(Some(0), Some(TimeUnit::Days), vec![Email]),
            Err(ReminderEditError::ZeroAmount)
        );
        assert_eq!(
            validate_custom(Some(29), Some(TimeUnit::Minutes), vec![Email]),
            Err(ReminderEditError::TooCloseToBilling(29))
        );
        assert_eq!(
            validate_custom(Some(2), Some(TimeUnit::Hours), vec![]),
            Err(ReminderEditError::MissingChannels)
        );
        assert!(validate_custom(Some(30), Some(TimeUnit::Minutes), vec![Sms]).is_ok());
        assert!(validate_custom(Some(1), Some(TimeUnit::Hours), vec![Sms]).is_ok());
    }

    #[test]
    fn create_only_flow() {
        let mut session = session(RecurrenceType::Monthly);
        assert_eq!(session.state(), EditState::Empty);

        session.add_preset(PresetReminder::Day1).unwrap();
        let custom = session
            .add_custom(Some(45), Some(TimeUnit::Minutes), vec![Sms, Email])
            .unwrap();
        assert_eq!(session.state(), EditState::Editing);
        assert_eq!(custom.token(), "CUSTOM_45_minutes_EMAIL_SMS");
        assert!(session.options().iter().any(|o| o.token == custom.token()));

        let plan = session.commit(&[]).unwrap();
        assert_eq!(plan.kind(), SyncKind::CreateOnly);
        assert_eq!(session.state(), EditState::Saving);
        assert_eq!(
            session.add_preset(PresetReminder::Hour1),
            Err(ReminderEditError::Busy)
        );
        assert_eq!(session.commit(&[]).unwrap_err(), ReminderEditError::Busy);

        session.finish();
        assert_eq!(session.state(), EditState::Editing);
    }

    #[test]
    fn reconcile_and_clear_flows() {
        let subscription_id = ID::new();
        let stored = PersistedReminder {
            id: ID::new(),
            subscription_id,
            amount: 2,
            unit: TimeUnit::Days,
            channels: vec![System].into_iter().collect(),
            is_custom: false,
        };
        let persisted = vec![stored];

        let mut session = ReminderEditSession::open(
            subscription_id,
            RecurrenceType::Yearly,
            ReminderCatalog::new(),
            &persisted,
        )
        .unwrap();
        assert_eq!(session.state(), EditState::Editing);
        assert_eq!(session.rows(), &[ReminderSpec::Preset(PresetReminder::Days2)]);

        session
            .replace(0, PresetReminder::Month1.into())
            .unwrap();
        let plan = session.commit(&persisted).unwrap();
        assert_eq!(plan.kind(), SyncKind::Reconcile);
        assert_eq!(session.state(), EditState::Syncing);
        session.finish();

        session.remove(0).unwrap();
        let plan = session.commit(&persisted).unwrap();
        assert_eq!(plan.kind(), SyncKind::ClearAll);
        assert_eq!(session.state(), EditState::Clearing);
        session.finish();
        assert_eq!(session.state(), EditState::Empty);
    }

    #[test]
    fn rejects_yearly_only_presets_for_monthly_subscriptions() {
        let mut session = session(RecurrenceType::Monthly);
        assert_eq!(
            session.add_preset(PresetReminder::Months2),
            Err(ReminderEditError::NotApplicable(
                "2_MONTHS_BEFORE".into(),
                RecurrenceType::Monthly
            ))
        );
        assert!(session.select("1_MONTH_BEFORE").is_err());
        assert_eq!(session.state(), EditState::Empty);
        assert!(session
            .options()
            .iter()
            .all(|o| o.token != "1_MONTH_BEFORE"));
    }

    #[test]
    fn select_decodes_tokens() {
        let mut session = session(RecurrenceType::Yearly);
        session.select("CUSTOM_3_weeks_WHATSAPP").unwrap();
        session.select("1_MONTH_BEFORE").unwrap();
        assert_eq!(session.rows().len(), 2);
        assert!(matches!(
            session.select("CUSTOM_3_weeks"),
            Err(ReminderEditError::Token(ReminderTokenError::MissingChannels(_)))
        ));
        assert_eq!(session.remove(5), Err(ReminderEditError::NoSuchRow(5)));

        let catalog = session.close();
        assert!(catalog.find("CUSTOM_3_weeks_WHATSAPP").is_some());
    }

    #[test]
    fn open_fails_on_corrupt_rows() {
        let subscription_id = ID::new();
        let corrupt = PersistedReminder {
            id: ID::new(),
            subscription_id,
            amount: 17,
            unit: TimeUnit::Hours,
            channels: vec![System].into_iter().collect(),
            is_custom: false,
        };
        assert!(ReminderEditSession::open(
            subscription_id,
            RecurrenceType::Monthly,
            ReminderCatalog::new(),
            &[corrupt]
        )
        .is_err());
    }
}
