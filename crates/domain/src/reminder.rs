use crate::{
    date::add_months_safe,
    shared::entity::{Entity, ID},
    RecurrenceType,
};
use chrono::{prelude::*, Duration};
use serde::{de::Visitor, Deserialize, Serialize};
use std::{collections::BTreeSet, fmt::Display, str::FromStr};
use thiserror::Error;

const CUSTOM_TOKEN_PREFIX: &str = "CUSTOM_";
const TOKEN_SEPARATOR: char = '_';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
}

impl TimeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
        }
    }
}

impl Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = ReminderTokenError;

    fn from_str(unit: &str) -> Result<Self, Self::Err> {
        match unit {
            "minutes" => Ok(Self::Minutes),
            "hours" => Ok(Self::Hours),
            "days" => Ok(Self::Days),
            "weeks" => Ok(Self::Weeks),
            "months" => Ok(Self::Months),
            _ => Err(ReminderTokenError::UnknownUnit(unit.to_string())),
        }
    }
}

/// Where a reminder is delivered. The declaration order is the canonical
/// order channels are written in inside a custom reminder token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationChannel {
    System,
    Email,
    Sms,
    Whatsapp,
}

impl NotificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "SYSTEM",
            Self::Email => "EMAIL",
            Self::Sms => "SMS",
            Self::Whatsapp => "WHATSAPP",
        }
    }
}

impl FromStr for NotificationChannel {
    type Err = ReminderTokenError;

    fn from_str(channel: &str) -> Result<Self, Self::Err> {
        match channel {
            "SYSTEM" => Ok(Self::System),
            "EMAIL" => Ok(Self::Email),
            "SMS" => Ok(Self::Sms),
            "WHATSAPP" => Ok(Self::Whatsapp),
            _ => Err(ReminderTokenError::UnknownChannel(channel.to_string())),
        }
    }
}

/// Ordered and free of duplicates, which keeps custom tokens stable
pub type Channels = BTreeSet<NotificationChannel>;

/// Channel used by the preset reminders
pub const PRESET_CHANNEL: NotificationChannel = NotificationChannel::System;

#[derive(Error, Debug, PartialEq)]
pub enum ReminderTokenError {
    #[error("Reminder token: `{0}` is neither a preset nor a custom reminder")]
    UnknownToken(String),
    #[error("Reminder amount: `{0}` is not a positive integer")]
    MalformedAmount(String),
    #[error("Reminder unit: `{0}` is not supported")]
    UnknownUnit(String),
    #[error("Notification channel: `{0}` is not supported")]
    UnknownChannel(String),
    #[error("Reminder token: `{0}` does not list any notification channels")]
    MissingChannels(String),
    #[error("There is no preset reminder for {0} {1}")]
    UnknownPreset(u32, TimeUnit),
    #[error("Preset reminder: `{0}` can only be delivered through SYSTEM")]
    PresetChannels(String),
}

/// How long before a billing occurrence a reminder fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReminderDuration {
    pub amount: u32,
    pub unit: TimeUnit,
}

impl ReminderDuration {
    pub fn new(amount: u32, unit: TimeUnit) -> Self {
        Self { amount, unit }
    }

    /// The point in time `self` before `at`
    pub fn before(&self, at: NaiveDateTime) -> NaiveDateTime {
        let amount = self.amount as i64;
        let delta = match self.unit {
            TimeUnit::Minutes => Duration::minutes(amount),
            TimeUnit::Hours => Duration::hours(amount),
            TimeUnit::Days => Duration::days(amount),
            TimeUnit::Weeks => Duration::weeks(amount),
            TimeUnit::Months => {
                let months = -(self.amount.min(i32::MAX as u32) as i32);
                return add_months_safe(&at.date(), months).and_time(at.time());
            }
        };
        at.checked_sub_signed(delta).unwrap_or(NaiveDateTime::MIN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppliesTo {
    Both,
    YearlyOnly,
}

impl AppliesTo {
    pub fn includes(&self, recurrence: RecurrenceType) -> bool {
        match self {
            Self::Both => true,
            Self::YearlyOnly => recurrence == RecurrenceType::Yearly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetReminder {
    Minutes30,
    Hour1,
    Hours2,
    Hours6,
    Hours12,
    Day1,
    Days2,
    Days3,
    Days5,
    Week1,
    Weeks2,
    Weeks3,
    Month1,
    Months2,
    Months3,
}

struct PresetEntry {
    preset: PresetReminder,
    token: &'static str,
    amount: u32,
    unit: TimeUnit,
    applies_to: AppliesTo,
}

const fn preset(
    preset: PresetReminder,
    token: &'static str,
    amount: u32,
    unit: TimeUnit,
    applies_to: AppliesTo,
) -> PresetEntry {
    PresetEntry {
        preset,
        token,
        amount,
        unit,
        applies_to,
    }
}

/// Lookups in both directions go through this table
static PRESET_TABLE: [PresetEntry; 15] = [
    preset(PresetReminder::Minutes30, "30_MINUTES_BEFORE", 30, TimeUnit::Minutes, AppliesTo::Both),
    preset(PresetReminder::Hour1, "1_HOUR_BEFORE", 1, TimeUnit::Hours, AppliesTo::Both),
    preset(PresetReminder::Hours2, "2_HOURS_BEFORE", 2, TimeUnit::Hours, AppliesTo::Both),
    preset(PresetReminder::Hours6, "6_HOURS_BEFORE", 6, TimeUnit::Hours, AppliesTo::Both),
    preset(PresetReminder::Hours12, "12_HOURS_BEFORE", 12, TimeUnit::Hours, AppliesTo::Both),
    preset(PresetReminder::Day1, "1_DAY_BEFORE", 1, TimeUnit::Days, AppliesTo::Both),
    preset(PresetReminder::Days2, "2_DAYS_BEFORE", 2, TimeUnit::Days, AppliesTo::Both),
    preset(PresetReminder::Days3, "3_DAYS_BEFORE", 3, TimeUnit::Days, AppliesTo::Both),
    preset(PresetReminder::Days5, "5_DAYS_BEFORE", 5, TimeUnit::Days, AppliesTo::Both),
    preset(PresetReminder::Week1, "1_WEEK_BEFORE", 1, TimeUnit::Weeks, AppliesTo::Both),
    preset(PresetReminder::Weeks2, "2_WEEKS_BEFORE", 2, TimeUnit::Weeks, AppliesTo::Both),
    preset(PresetReminder::Weeks3, "3_WEEKS_BEFORE", 3, TimeUnit::Weeks, AppliesTo::Both),
    preset(PresetReminder::Month1, "1_MONTH_BEFORE", 1, TimeUnit::Months, AppliesTo::YearlyOnly),
    preset(PresetReminder::Months2, "2_MONTHS_BEFORE", 2, TimeUnit::Months, AppliesTo::YearlyOnly),
    preset(PresetReminder::Months3, "3_MONTHS_BEFORE", 3, TimeUnit::Months, AppliesTo::YearlyOnly),
];

impl PresetReminder {
    fn entry(&self) -> &'static PresetEntry {
        // Every variant has exactly one row in the table
        match PRESET_TABLE.iter().find(|entry| entry.preset == *self) {
            Some(entry) => entry,
            None => unreachable!("preset {:?} is missing from the preset table", self),
        }
    }

    pub fn all() -> impl Iterator<Item = PresetReminder> {
        PRESET_TABLE.iter().map(|entry| entry.preset)
    }

    pub fn token(&self) -> &'static str {
        self.entry().token
    }

    pub fn duration(&self) -> ReminderDuration {
        let entry = self.entry();
        ReminderDuration::new(entry.amount, entry.unit)
    }

    pub fn applies_to(&self) -> AppliesTo {
        self.entry().applies_to
    }

    pub fn from_token(token: &str) -> Option<Self> {
        PRESET_TABLE
            .iter()
            .find(|entry| entry.token == token)
            .map(|entry| entry.preset)
    }

    pub fn from_duration(amount: u32, unit: TimeUnit) -> Option<Self> {
        PRESET_TABLE
            .iter()
            .find(|entry| entry.amount == amount && entry.unit == unit)
            .map(|entry| entry.preset)
    }
}

/// A user defined reminder that did not match any preset
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomReminder {
    duration: ReminderDuration,
    channels: Channels,
}

impl CustomReminder {
    /// `None` unless the amount is positive and there is at least one channel
    pub fn new(
        amount: u32,
        unit: TimeUnit,
        channels: impl IntoIterator<Item = NotificationChannel>,
    ) -> Option<Self> {
        let channels = channels.into_iter().collect::<Channels>();
        if amount == 0 || channels.is_empty() {
            return None;
        }
        Some(Self {
            duration: ReminderDuration::new(amount, unit),
            channels,
        })
    }

    pub fn duration(&self) -> ReminderDuration {
        self.duration
    }

    pub fn channels(&self) -> &Channels {
        &self.channels
    }

    pub fn token(&self) -> String {
        encode(self.duration.amount, self.duration.unit, self.channels.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReminderSpec {
    Preset(PresetReminder),
    Custom(CustomReminder),
}

impl ReminderSpec {
    pub fn token(&self) -> String {
        match self {
            Self::Preset(preset) => preset.token().to_string(),
            Self::Custom(custom) => custom.token(),
        }
    }

    pub fn duration(&self) -> ReminderDuration {
        match self {
            Self::Preset(preset) => preset.duration(),
            Self::Custom(custom) => custom.duration(),
        }
    }

    pub fn channels(&self) -> Channels {
        match self {
            Self::Preset(_) => vec![PRESET_CHANNEL].into_iter().collect(),
            Self::Custom(custom) => custom.channels().clone(),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    pub fn applies_to(&self) -> AppliesTo {
        match self {
            Self::Preset(preset) => preset.applies_to(),
            Self::Custom(_) => AppliesTo::Both,
        }
    }

    /// When this reminder fires for a charge on `occurrence`, counted back
    /// from the start of that day
    pub fn remind_at(&self, occurrence: &NaiveDate) -> NaiveDateTime {
        self.duration().before(occurrence.and_time(NaiveTime::MIN))
    }

    /// Maps a stored reminder back to its spec. A row that claims to be a
    /// preset but matches none is corrupt.
    pub fn from_persisted(reminder: &PersistedReminder) -> Result<Self, ReminderTokenError> {
        if reminder.is_custom {
            return CustomReminder::new(
                reminder.amount,
                reminder.unit,
                reminder.channels.iter().copied(),
            )
            .map(Self::Custom)
            .ok_or_else(|| {
                ReminderTokenError::MissingChannels(format!(
                    "{}{}{}{}",
                    CUSTOM_TOKEN_PREFIX, reminder.amount, TOKEN_SEPARATOR, reminder.unit
                ))
            });
        }
        let preset = lookup_preset_key(reminder.amount, reminder.unit)
            .and_then(PresetReminder::from_token)
            .ok_or(ReminderTokenError::UnknownPreset(reminder.amount, reminder.unit))?;
        if reminder.channels.len() != 1 || !reminder.channels.contains(&PRESET_CHANNEL) {
            return Err(ReminderTokenError::PresetChannels(preset.token().to_string()));
        }
        Ok(Self::Preset(preset))
    }
}

impl From<PresetReminder> for ReminderSpec {
    fn from(preset: PresetReminder) -> Self {
        Self::Preset(preset)
    }
}

impl From<CustomReminder> for ReminderSpec {
    fn from(custom: CustomReminder) -> Self {
        Self::Custom(custom)
    }
}

impl Display for ReminderSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for ReminderSpec {
    type Err = ReminderTokenError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        decode(token)
    }
}

/// The token of the preset reminder for the given duration, if any
pub fn lookup_preset_key(amount: u32, unit: TimeUnit) -> Option<&'static str> {
    PresetReminder::from_duration(amount, unit).map(|preset| preset.token())
}

/// Encodes a custom reminder as `CUSTOM_<amount>_<unit>_<channel>...` with
/// the channels in canonical order, so equal reminders give equal tokens.
pub fn encode(
    amount: u32,
    unit: TimeUnit,
    channels: impl IntoIterator<Item = NotificationChannel>,
) -> String {
    let channels = channels.into_iter().collect::<Channels>();
    let mut token = format!("{}{}{}{}", CUSTOM_TOKEN_PREFIX, amount, TOKEN_SEPARATOR, unit);
    for channel in channels {
        token.push(TOKEN_SEPARATOR);
        token.push_str(channel.as_str());
    }
    token
}

pub fn decode(token: &str) -> Result<ReminderSpec, ReminderTokenError> {
    if let Some(preset) = PresetReminder::from_token(token) {
        return Ok(ReminderSpec::Preset(preset));
    }

    let body = match token.strip_prefix(CUSTOM_TOKEN_PREFIX) {
        Some(body) => body,
        None => return Err(ReminderTokenError::UnknownToken(token.to_string())),
    };
    let mut segments = body.split(TOKEN_SEPARATOR);

    let amount = segments.next().unwrap_or_default();
    if amount.is_empty() || !amount.chars().all(|c| c.is_ascii_digit()) {
        return Err(ReminderTokenError::MalformedAmount(amount.to_string()));
    }
    let amount = match amount.parse::<u32>() {
        Ok(amount) if amount > 0 => amount,
        _ => return Err(ReminderTokenError::MalformedAmount(amount.to_string())),
    };

    let unit = segments.next().unwrap_or_default().parse::<TimeUnit>()?;

    let channels = segments
        .map(|channel| channel.parse::<NotificationChannel>())
        .collect::<Result<Channels, _>>()?;

    CustomReminder::new(amount, unit, channels)
        .map(ReminderSpec::Custom)
        .ok_or_else(|| ReminderTokenError::MissingChannels(token.to_string()))
}

impl Serialize for ReminderSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.token())
    }
}

impl<'de> Deserialize<'de> for ReminderSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct ReminderSpecVisitor;

        impl<'de> Visitor<'de> for ReminderSpecVisitor {
            type Value = ReminderSpec;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("A preset or custom reminder token")
            }

            fn visit_str<E>(self, value: &str) -> Result<ReminderSpec, E>
            where
                E: serde::de::Error,
            {
                decode(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(ReminderSpecVisitor)
    }
}

/// A reminder as stored for a `Subscription`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedReminder {
    pub id: ID,
    pub subscription_id: ID,
    pub amount: u32,
    pub unit: TimeUnit,
    pub channels: Channels,
    pub is_custom: bool,
}

impl PersistedReminder {
    pub fn duration(&self) -> ReminderDuration {
        ReminderDuration::new(self.amount, self.unit)
    }
}

impl Entity for PersistedReminder {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// A reminder that is about to be stored and has no id yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReminder {
    pub subscription_id: ID,
    pub amount: u32,
    pub unit: TimeUnit,
    pub channels: Channels,
    pub is_custom: bool,
}

impl NewReminder {
    pub fn from_spec(subscription_id: &ID, spec: &ReminderSpec) -> Self {
        let duration = spec.duration();
        Self {
            subscription_id: *subscription_id,
            amount: duration.amount,
            unit: duration.unit,
            channels: spec.channels(),
            is_custom: spec.is_custom(),
        }
    }

    pub fn persist(self, id: ID) -> PersistedReminder {
        PersistedReminder {
            id,
            subscription_id: self.subscription_id,
            amount: self.amount,
            unit: self.unit,
            channels: self.channels,
            is_custom: self.is_custom,
        }
    }
}
