use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// A notification channel a reminder can be delivered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Chat message (WhatsApp).
    Whatsapp,
    Email,
    Sms,
}

impl Channel {
    /// Return the stored string form of the channel.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Whatsapp => "whatsapp",
            Self::Email => "email",
            Self::Sms => "sms",
        }
    }

    /// Whether the destination for this channel is a phone number.
    pub fn uses_phone(self) -> bool {
        matches!(self, Self::Whatsapp | Self::Sms)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whatsapp" => Ok(Self::Whatsapp),
            "email" => Ok(Self::Email),
            "sms" => Ok(Self::Sms),
            other => Err(CoreError::unknown("channel", other)),
        }
    }
}

/// How far ahead of expiry a user wants to start receiving reminders.
///
/// Each frequency implies a fixed set of day-thresholds; see
/// [`Frequency::thresholds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Frequency {
    #[default]
    #[serde(rename = "30_days")]
    ThirtyDays,
    #[serde(rename = "14_days")]
    FourteenDays,
    #[serde(rename = "7_days")]
    SevenDays,
    #[serde(rename = "3_days")]
    ThreeDays,
    #[serde(rename = "1_day")]
    OneDay,
}

impl Frequency {
    /// Return the stored string form of the frequency.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThirtyDays => "30_days",
            Self::FourteenDays => "14_days",
            Self::SevenDays => "7_days",
            Self::ThreeDays => "3_days",
            Self::OneDay => "1_day",
        }
    }

    /// Days-before-expiry on which a reminder fires.
    pub fn thresholds(self) -> &'static [i64] {
        match self {
            Self::ThirtyDays => &[30, 14, 7, 3, 1, 0],
            Self::FourteenDays => &[14, 7, 3, 1, 0],
            Self::SevenDays => &[7, 3, 1, 0],
            Self::ThreeDays => &[3, 1, 0],
            Self::OneDay => &[1, 0],
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "30_days" => Ok(Self::ThirtyDays),
            "14_days" => Ok(Self::FourteenDays),
            "7_days" => Ok(Self::SevenDays),
            "3_days" => Ok(Self::ThreeDays),
            "1_day" => Ok(Self::OneDay),
            other => Err(CoreError::unknown("frequency", other)),
        }
    }
}

/// Per-user notification preferences.
///
/// Profiles are created lazily; [`UserProfile::new`] yields the values a
/// reader sees when no row exists yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default = "default_channel")]
    pub preferred_reminder_channel: Channel,
    #[serde(default)]
    pub reminder_frequency: Frequency,
    #[serde(default = "default_reminder_time")]
    pub reminder_time: NaiveTime,
    #[serde(default)]
    pub two_factor_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

fn default_channel() -> Channel {
    Channel::Whatsapp
}

fn default_reminder_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

impl UserProfile {
    /// A profile with the read defaults (`whatsapp`, `30_days`).
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            phone_number: None,
            business_name: None,
            role: None,
            preferred_reminder_channel: default_channel(),
            reminder_frequency: Frequency::default(),
            reminder_time: default_reminder_time(),
            two_factor_enabled: false,
            updated_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = Some(phone.into());
        self
    }

    #[must_use]
    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.preferred_reminder_channel = channel;
        self
    }

    #[must_use]
    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.reminder_frequency = frequency;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_serde_uses_stored_names() {
        let json = serde_json::to_string(&Frequency::OneDay).unwrap();
        assert_eq!(json, "\"1_day\"");
        let back: Frequency = serde_json::from_str("\"14_days\"").unwrap();
        assert_eq!(back, Frequency::FourteenDays);
    }

    #[test]
    fn frequency_thresholds_are_nested() {
        let all = [
            Frequency::ThirtyDays,
            Frequency::FourteenDays,
            Frequency::SevenDays,
            Frequency::ThreeDays,
            Frequency::OneDay,
        ];
        for pair in all.windows(2) {
            for day in pair[1].thresholds() {
                assert!(pair[0].thresholds().contains(day));
            }
        }
        assert_eq!(Frequency::default(), Frequency::ThirtyDays);
    }

    #[test]
    fn channel_round_trips_through_str() {
        for channel in [Channel::Whatsapp, Channel::Email, Channel::Sms] {
            assert_eq!(channel.as_str().parse::<Channel>().unwrap(), channel);
        }
        assert!("pigeon".parse::<Channel>().is_err());
        assert!(Channel::Sms.uses_phone());
        assert!(!Channel::Email.uses_phone());
    }

    #[test]
    fn new_profile_has_read_defaults() {
        let profile = UserProfile::new(Uuid::new_v4());
        assert_eq!(profile.preferred_reminder_channel, Channel::Whatsapp);
        assert_eq!(profile.reminder_frequency, Frequency::ThirtyDays);
        assert!(profile.phone_number.is_none());
    }

    #[test]
    fn profile_deserializes_with_missing_preferences() {
        let json = serde_json::json!({
            "user_id": Uuid::nil(),
            "updated_at": "2026-01-01T00:00:00Z"
        });
        let profile: UserProfile = serde_json::from_value(json).unwrap();
        assert_eq!(profile.preferred_reminder_channel, Channel::Whatsapp);
        assert_eq!(profile.reminder_frequency, Frequency::ThirtyDays);
    }
}
