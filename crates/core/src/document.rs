use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Lifecycle status of a tracked document.
///
/// Only [`DocumentStatus::Active`] documents are considered for reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Active,
    Expired,
    Renewed,
    Cancelled,
}

impl DocumentStatus {
    /// Return the stored string form of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Renewed => "renewed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "renewed" => Ok(Self::Renewed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(CoreError::unknown("document status", other)),
        }
    }
}

/// A trackable item with an expiry date.
///
/// `expiration_date` is a calendar date so that every comparison made by the
/// reminder policy happens at day granularity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    /// The user that owns the document.
    pub user_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form type tag (e.g. `"passport"`, `"insurance"`).
    #[serde(default)]
    pub document_type: Option<String>,
    pub expiration_date: NaiveDate,
    /// Length of one renewal period, in days.
    #[serde(default)]
    pub renewal_period_days: Option<i32>,
    #[serde(default)]
    pub is_critical: bool,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub last_renewed_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create a new active document owned by `user_id`.
    pub fn new(user_id: Uuid, title: impl Into<String>, expiration_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            description: None,
            document_type: None,
            expiration_date,
            renewal_period_days: None,
            is_critical: false,
            status: DocumentStatus::Active,
            last_renewed_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the document as critical.
    #[must_use]
    pub fn with_critical(mut self, critical: bool) -> Self {
        self.is_critical = critical;
        self
    }

    /// Set the lifecycle status.
    #[must_use]
    pub fn with_status(mut self, status: DocumentStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the free-form type tag.
    #[must_use]
    pub fn with_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = Some(document_type.into());
        self
    }

    /// Record a renewal on `date` and move the document to `renewed`.
    pub fn mark_renewed(&mut self, date: NaiveDate) {
        self.status = DocumentStatus::Renewed;
        self.last_renewed_date = Some(date);
        self.updated_at = Utc::now();
    }

    /// Returns `true` if the reminder engine should consider this document.
    pub fn is_active(&self) -> bool {
        self.status == DocumentStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_document_is_active() {
        let doc = Document::new(Uuid::new_v4(), "Passport", date(2030, 1, 1));
        assert!(doc.is_active());
        assert!(!doc.is_critical);
        assert!(doc.last_renewed_date.is_none());
    }

    #[test]
    fn mark_renewed_sets_status_and_date() {
        let mut doc = Document::new(Uuid::new_v4(), "Lease", date(2026, 3, 1));
        doc.mark_renewed(date(2026, 2, 20));
        assert_eq!(doc.status, DocumentStatus::Renewed);
        assert_eq!(doc.last_renewed_date, Some(date(2026, 2, 20)));
        assert!(!doc.is_active());
    }

    #[test]
    fn status_parses_stored_values() {
        for status in [
            DocumentStatus::Active,
            DocumentStatus::Expired,
            DocumentStatus::Renewed,
            DocumentStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<DocumentStatus>().unwrap(), status);
        }
        assert!("archived".parse::<DocumentStatus>().is_err());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&DocumentStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }
}
