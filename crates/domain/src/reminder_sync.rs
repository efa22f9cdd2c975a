use crate::{
    reminder::{NewReminder, PersistedReminder, ReminderDuration, ReminderSpec},
    shared::entity::ID,
};
use itertools::Itertools;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Identifies "the same reminder" across the working set and storage.
/// Channels are deliberately not part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReminderKey {
    pub subscription_id: ID,
    pub duration: ReminderDuration,
}

impl NewReminder {
    pub fn key(&self) -> ReminderKey {
        ReminderKey {
            subscription_id: self.subscription_id,
            duration: ReminderDuration::new(self.amount, self.unit),
        }
    }
}

impl PersistedReminder {
    pub fn key(&self) -> ReminderKey {
        ReminderKey {
            subscription_id: self.subscription_id,
            duration: self.duration(),
        }
    }
}

/// Which batch operation the caller should issue for a `SyncPlan`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncKind {
    /// Nothing changed
    Noop,
    /// Only new reminders have to be stored
    CreateOnly,
    /// Any mix of creates, updates and deletes
    Reconcile,
    /// The working set was emptied, every stored reminder goes
    ClearAll,
}

/// The storage operations needed to turn the persisted reminders of a
/// subscription into the working set. A key is in at most one of the lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPlan {
    pub to_create: Vec<NewReminder>,
    pub to_update: Vec<PersistedReminder>,
    pub to_delete: Vec<PersistedReminder>,
    #[serde(skip)]
    clears_all: bool,
}

impl SyncPlan {
    pub fn kind(&self) -> SyncKind {
        if self.clears_all {
            SyncKind::ClearAll
        } else if self.is_empty() {
            SyncKind::Noop
        } else if self.to_update.is_empty() && self.to_delete.is_empty() {
            SyncKind::CreateOnly
        } else {
            SyncKind::Reconcile
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// Diffs the reminders the user is editing for `subscription_id` against
/// the ones that are stored. A matched reminder is updated when its channels
/// or its preset/custom kind changed.
///
/// Stored reminders of other subscriptions are ignored. If several stored
/// reminders share a key the first one is matched against the working set
/// and the others are only removed when the key is gone from the working set.
pub fn plan_sync(
    subscription_id: &ID,
    working: &[ReminderSpec],
    persisted: &[PersistedReminder],
) -> SyncPlan {
    let persisted = persisted
        .iter()
        .filter(|reminder| reminder.subscription_id == *subscription_id)
        .collect::<Vec<_>>();

    let mut counterparts: HashMap<ReminderDuration, &PersistedReminder> = HashMap::new();
    for reminder in &persisted {
        counterparts.entry(reminder.duration()).or_insert(reminder);
    }
    let working_keys = working
        .iter()
        .map(|spec| spec.duration())
        .collect::<HashSet<_>>();

    let mut plan = SyncPlan::default();

    // Rows that encode to the same reminder are only acted on once
    for spec in working.iter().unique_by(|spec| spec.duration()) {
        match counterparts.get(&spec.duration()) {
            None => plan
                .to_create
                .push(NewReminder::from_spec(subscription_id, spec)),
            Some(stored) => {
                let channels = spec.channels();
                if stored.channels != channels || stored.is_custom != spec.is_custom() {
                    let mut updated = (*stored).clone();
                    updated.channels = channels;
                    updated.is_custom = spec.is_custom();
                    plan.to_update.push(updated);
                }
            }
        }
    }

    plan.to_delete = persisted
        .into_iter()
        .filter(|reminder| !working_keys.contains(&reminder.duration()))
        .cloned()
        .collect();
    plan.clears_all = working.is_empty() && !plan.to_delete.is_empty();

    plan
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        reminder::{Channels, CustomReminder, NotificationChannel, PresetReminder, TimeUnit},
        NotificationChannel::*,
    };

    fn channels(channels: &[NotificationChannel]) -> Channels {
        channels.iter().copied().collect()
    }

    fn stored(subscription_id: &ID, amount: u32, unit: TimeUnit, chans: &[NotificationChannel]) -> PersistedReminder {
        PersistedReminder {
            id: ID::new(),
            subscription_id: *subscription_id,
            amount,
            unit,
            channels: channels(chans),
            is_custom: true,
        }
    }

    fn custom(amount: u32, unit: TimeUnit, chans: &[NotificationChannel]) -> ReminderSpec {
        CustomReminder::new(amount, unit, chans.iter().copied())
            .unwrap()
            .into()
    }

    #[test]
    fn creates_everything_when_nothing_is_stored() {
        let sub = ID::new();
        let working = vec![
            PresetReminder::Day1.into(),
            custom(45, TimeUnit::Minutes, &[Email]),
        ];
        let plan = plan_sync(&sub, &working, &[]);

        assert_eq!(plan.kind(), SyncKind::CreateOnly);
        assert_eq!(plan.to_create.len(), 2);
        assert_eq!(plan.to_create[0].channels, channels(&[System]));
        assert!(!plan.to_create[0].is_custom);
        assert!(plan.to_create[1].is_custom);
    }

    #[test]
    fn deduplicates_rows_with_same_key() {
        let sub = ID::new();
        let working = vec![
            custom(2, TimeUnit::Days, &[Email]),
            custom(2, TimeUnit::Days, &[Sms]),
            PresetReminder::Days2.into(),
        ];
        let plan = plan_sync(&sub, &working, &[]);
        assert_eq!(plan.to_create.len(), 1);
        assert_eq!(plan.to_create[0].channels, channels(&[Email]));
    }

    #[test]
    fn updates_when_only_channels_differ() {
        let sub = ID::new();
        let existing = stored(&sub, 3, TimeUnit::Hours, &[Email]);
        let unchanged = stored(&sub, 1, TimeUnit::Weeks, &[Sms]);
        let working = vec![
            custom(3, TimeUnit::Hours, &[Email, Whatsapp]),
            custom(1, TimeUnit::Weeks, &[Sms]),
        ];
        let plan = plan_sync(&sub, &working, &[existing.clone(), unchanged]);

        assert_eq!(plan.kind(), SyncKind::Reconcile);
        assert!(plan.to_create.is_empty());
        assert!(plan.to_delete.is_empty());
        assert_eq!(plan.to_update.len(), 1);
        assert_eq!(plan.to_update[0].id, existing.id);
        assert_eq!(plan.to_update[0].channels, channels(&[Email, Whatsapp]));
    }

    #[test]
    fn updates_when_only_custom_flag_differs() {
        let sub = ID::new();
        let mut preset_row = stored(&sub, 1, TimeUnit::Days, &[System]);
        preset_row.is_custom = false;
        let working = vec![custom(1, TimeUnit::Days, &[System])];
        let plan = plan_sync(&sub, &working, &[preset_row.clone()]);

        assert_eq!(plan.kind(), SyncKind::Reconcile);
        assert_eq!(plan.to_update.len(), 1);
        assert_eq!(plan.to_update[0].id, preset_row.id);
        assert!(plan.to_update[0].is_custom);
        assert_eq!(
            ReminderSpec::from_persisted(&plan.to_update[0]),
            Ok(working[0].clone())
        );

        // And back to the preset
        let custom_row = plan.to_update[0].clone();
        let plan = plan_sync(&sub, &[PresetReminder::Day1.into()], &[custom_row]);
        assert_eq!(plan.to_update.len(), 1);
        assert!(!plan.to_update[0].is_custom);
    }

    #[test]
    fn swapping_reminders_of_same_count_is_reconciled() {
        let sub = ID::new();
        let old = stored(&sub, 5, TimeUnit::Days, &[Email]);
        let working = vec![custom(6, TimeUnit::Days, &[Email])];
        let plan = plan_sync(&sub, &working, &[old.clone()]);

        assert_eq!(plan.kind(), SyncKind::Reconcile);
        assert_eq!(plan.to_create.len(), 1);
        assert_eq!(plan.to_delete, vec![old]);
    }

    #[test]
    fn clears_all_when_working_set_is_empty() {
        let sub = ID::new();
        let persisted = vec![
            stored(&sub, 5, TimeUnit::Days, &[Email]),
            stored(&sub, 1, TimeUnit::Hours, &[System]),
        ];
        let plan = plan_sync(&sub, &[], &persisted);
        assert_eq!(plan.kind(), SyncKind::ClearAll);
        assert_eq!(plan.to_delete, persisted);

        assert_eq!(plan_sync(&sub, &[], &[]).kind(), SyncKind::Noop);
    }

    #[test]
    fn ignores_other_subscriptions() {
        let sub = ID::new();
        let other = stored(&ID::new(), 5, TimeUnit::Days, &[Email]);
        let plan = plan_sync(&sub, &[custom(5, TimeUnit::Days, &[Email])], &[other]);
        assert_eq!(plan.to_create.len(), 1);
        assert!(plan.to_delete.is_empty());
        assert_eq!(plan.to_create[0].subscription_id, sub);
    }

    #[test]
    fn duplicate_stored_rows_of_matched_key_are_left_alone() {
        let sub = ID::new();
        let first = stored(&sub, 5, TimeUnit::Days, &[Email]);
        let second = stored(&sub, 5, TimeUnit::Days, &[Sms]);
        let plan = plan_sync(&sub, &[custom(5, TimeUnit::Days, &[Sms])], &[first.clone(), second.clone()]);
        assert_eq!(plan.to_update.len(), 1);
        assert_eq!(plan.to_update[0].id, first.id);
        assert!(plan.to_delete.is_empty());

        let plan = plan_sync(&sub, &[custom(1, TimeUnit::Days, &[Sms])], &[first, second]);
        assert_eq!(plan.to_delete.len(), 2);
    }

    #[test]
    fn every_key_is_in_at_most_one_list() {
        let sub = ID::new();
        let units = [TimeUnit::Hours, TimeUnit::Days];
        let channel_sets: [&[NotificationChannel]; 2] = [&[Email], &[Email, Sms]];

        let mut candidates = Vec::new();
        for unit in units.iter() {
            for amount in 1..=3 {
                for chans in channel_sets.iter() {
                    candidates.push((amount, *unit, *chans));
                }
            }
        }

        // Walk a spread of working and stored sets built from the candidates
        for mask in 0u32..(1 << 6) {
            for shift in 0..candidates.len() {
                let working = candidates
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << (i % 6)) != 0)
                    .map(|(_, (a, u, c))| custom(*a, *u, c))
                    .collect::<Vec<_>>();
                let persisted = candidates
                    .iter()
                    .skip(shift)
                    .step_by(3)
                    .map(|(a, u, c)| stored(&sub, *a, *u, c))
                    .collect::<Vec<_>>();

                let plan = plan_sync(&sub, &working, &persisted);

                let created = plan.to_create.iter().map(|r| r.key()).collect::<HashSet<_>>();
                let updated = plan.to_update.iter().map(|r| r.key()).collect::<HashSet<_>>();
                let deleted = plan.to_delete.iter().map(|r| r.key()).collect::<HashSet<_>>();

                assert_eq!(created.len(), plan.to_create.len());
                assert!(created.is_disjoint(&updated));
                assert!(created.is_disjoint(&deleted));
                assert!(updated.is_disjoint(&deleted));
            }
        }
    }
}
