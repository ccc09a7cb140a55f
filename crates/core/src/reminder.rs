use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Urgency classification derived from days-until-expiry.
///
/// Stored as the reminder's `reminder_type` and used by transports to pick
/// message styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderTier {
    Expired,
    ExpiresToday,
    ExpiresSoon,
    ExpiresWeek,
    ExpiresTwoWeeks,
    ExpiresMonth,
}

impl ReminderTier {
    /// Return the stored string form of the tier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::ExpiresToday => "expires_today",
            Self::ExpiresSoon => "expires_soon",
            Self::ExpiresWeek => "expires_week",
            Self::ExpiresTwoWeeks => "expires_two_weeks",
            Self::ExpiresMonth => "expires_month",
        }
    }

    /// Whether the tier warrants urgent styling.
    pub fn is_urgent(self) -> bool {
        matches!(
            self,
            Self::Expired | Self::ExpiresToday | Self::ExpiresSoon
        )
    }
}

impl fmt::Display for ReminderTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderTier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expired" => Ok(Self::Expired),
            "expires_today" => Ok(Self::ExpiresToday),
            "expires_soon" => Ok(Self::ExpiresSoon),
            "expires_week" => Ok(Self::ExpiresWeek),
            "expires_two_weeks" => Ok(Self::ExpiresTwoWeeks),
            "expires_month" => Ok(Self::ExpiresMonth),
            other => Err(CoreError::unknown("reminder tier", other)),
        }
    }
}

/// Fields needed to create a pending reminder row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReminder {
    pub document_id: Uuid,
    pub user_id: Uuid,
    /// The calendar day the reminder was evaluated for.
    pub reminder_date: NaiveDate,
    pub reminder_type: ReminderTier,
}

/// One attempted or delivered notification for one document on one day.
///
/// At most one row per `(document_id, reminder_date)` may have `sent = true`.
/// Unsent rows may repeat; they are left behind by failed attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub document_id: Uuid,
    pub user_id: Uuid,
    pub reminder_date: NaiveDate,
    pub reminder_type: ReminderTier,
    pub sent: bool,
    #[serde(default)]
    pub provider_message_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reminder {
    /// Materialize an unsent reminder row from its creation fields.
    pub fn pending(new: &NewReminder) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            document_id: new.document_id,
            user_id: new.user_id,
            reminder_date: new.reminder_date,
            reminder_type: new.reminder_type,
            sent: false,
            provider_message_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_round_trips_through_str() {
        for tier in [
            ReminderTier::Expired,
            ReminderTier::ExpiresToday,
            ReminderTier::ExpiresSoon,
            ReminderTier::ExpiresWeek,
            ReminderTier::ExpiresTwoWeeks,
            ReminderTier::ExpiresMonth,
        ] {
            assert_eq!(tier.as_str().parse::<ReminderTier>().unwrap(), tier);
            let json = serde_json::to_string(&tier).unwrap();
            assert_eq!(json, format!("\"{}\"", tier.as_str()));
        }
    }

    #[test]
    fn urgent_tiers() {
        assert!(ReminderTier::Expired.is_urgent());
        assert!(ReminderTier::ExpiresSoon.is_urgent());
        assert!(!ReminderTier::ExpiresWeek.is_urgent());
        assert!(!ReminderTier::ExpiresMonth.is_urgent());
    }

    #[test]
    fn pending_reminder_is_unsent() {
        let new = NewReminder {
            document_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            reminder_date: NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
            reminder_type: ReminderTier::ExpiresWeek,
        };
        let row = Reminder::pending(&new);
        assert!(!row.sent);
        assert!(row.provider_message_id.is_none());
        assert_eq!(row.document_id, new.document_id);
        assert_eq!(row.reminder_type, ReminderTier::ExpiresWeek);
    }
}
