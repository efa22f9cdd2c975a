use crate::{
    reminder::{AppliesTo, PresetReminder, ReminderSpec},
    RecurrenceType,
};
use serde::Serialize;

/// An entry the user can pick from when adding a reminder
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderOption {
    pub token: String,
    pub spec: ReminderSpec,
    pub applies_to: AppliesTo,
}

impl ReminderOption {
    pub fn new(spec: ReminderSpec) -> Self {
        Self {
            token: spec.token(),
            applies_to: spec.applies_to(),
            spec,
        }
    }
}

/// The reminder options known to one editing session. Starts out with the
/// presets and grows as custom reminders are created; nothing is ever
/// removed from it.
#[derive(Debug, Clone)]
pub struct ReminderCatalog {
    options: Vec<ReminderOption>,
}

impl ReminderCatalog {
    pub fn new() -> Self {
        Self {
            options: PresetReminder::all()
                .map(|preset| ReminderOption::new(preset.into()))
                .collect(),
        }
    }

    /// Adds `spec` unless an option with the same token is already there
    pub fn register(&mut self, spec: &ReminderSpec) -> &ReminderOption {
        let token = spec.token();
        let index = match self.options.iter().position(|o| o.token == token) {
            Some(index) => index,
            None => {
                self.options.push(ReminderOption::new(spec.clone()));
                self.options.len() - 1
            }
        };
        &self.options[index]
    }

    pub fn find(&self, token: &str) -> Option<&ReminderOption> {
        self.options.iter().find(|o| o.token == token)
    }

    pub fn options(&self) -> &[ReminderOption] {
        &self.options
    }

    pub fn options_for(&self, recurrence: RecurrenceType) -> Vec<&ReminderOption> {
        self.options
            .iter()
            .filter(|o| o.applies_to.includes(recurrence))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl Default for ReminderCatalog {
    fn default() -> Self {
        Self::new()
    }
}
