use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::{Channel, Frequency};

/// A document joined with its owner's contact details and preferences.
///
/// Profile-derived fields are optional because the profile row is created
/// lazily; consumers apply their own defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCandidate {
    pub document_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub expiration_date: NaiveDate,
    pub is_critical: bool,
    /// Owner's account email.
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub preferred_channel: Option<Channel>,
    pub frequency: Option<Frequency>,
}

impl DocumentCandidate {
    /// Frequency to evaluate with, falling back to the default set.
    pub fn effective_frequency(&self) -> Frequency {
        self.frequency.unwrap_or_default()
    }

    /// Owner email, treating blank values as absent.
    pub fn email_address(&self) -> Option<&str> {
        non_blank(self.email.as_deref())
    }

    /// Owner phone, treating blank values as absent.
    pub fn phone(&self) -> Option<&str> {
        non_blank(self.phone_number.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> DocumentCandidate {
        DocumentCandidate {
            document_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Visa".into(),
            expiration_date: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
            is_critical: false,
            email: Some("  ".into()),
            phone_number: Some(" 8851670050 ".into()),
            preferred_channel: None,
            frequency: None,
        }
    }

    #[test]
    fn blank_contact_fields_are_absent() {
        let c = candidate();
        assert!(c.email_address().is_none());
        assert_eq!(c.phone(), Some("8851670050"));
    }

    #[test]
    fn missing_frequency_defaults_to_thirty_days() {
        assert_eq!(candidate().effective_frequency(), Frequency::ThirtyDays);
    }
}
