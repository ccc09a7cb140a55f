use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Kinds of events recorded in the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    DocumentCreated,
    DocumentUpdated,
    DocumentRenewed,
    DocumentDeleted,
    ReminderSent,
    ProfileUpdated,
    FeedbackSubmitted,
}

impl ActivityAction {
    /// Return the stored string form of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DocumentCreated => "document_created",
            Self::DocumentUpdated => "document_updated",
            Self::DocumentRenewed => "document_renewed",
            Self::DocumentDeleted => "document_deleted",
            Self::ReminderSent => "reminder_sent",
            Self::ProfileUpdated => "profile_updated",
            Self::FeedbackSubmitted => "feedback_submitted",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document_created" => Ok(Self::DocumentCreated),
            "document_updated" => Ok(Self::DocumentUpdated),
            "document_renewed" => Ok(Self::DocumentRenewed),
            "document_deleted" => Ok(Self::DocumentDeleted),
            "reminder_sent" => Ok(Self::ReminderSent),
            "profile_updated" => Ok(Self::ProfileUpdated),
            "feedback_submitted" => Ok(Self::FeedbackSubmitted),
            other => Err(CoreError::unknown("activity action", other)),
        }
    }
}

/// A single append-only audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action_type: ActivityAction,
    pub description: String,
    #[serde(default)]
    pub related_document_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(user_id: Uuid, action_type: ActivityAction, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            action_type,
            description: description.into(),
            related_document_id: None,
            created_at: Utc::now(),
        }
    }

    /// Attach the document the entry refers to.
    #[must_use]
    pub fn for_document(mut self, document_id: Uuid) -> Self {
        self.related_document_id = Some(document_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_links_document() {
        let doc = Uuid::new_v4();
        let entry = ActivityEntry::new(Uuid::new_v4(), ActivityAction::ReminderSent, "sent")
            .for_document(doc);
        assert_eq!(entry.related_document_id, Some(doc));
        assert_eq!(entry.action_type.as_str(), "reminder_sent");
    }

    #[test]
    fn action_parses_stored_name() {
        assert_eq!(
            "document_renewed".parse::<ActivityAction>().unwrap(),
            ActivityAction::DocumentRenewed
        );
        assert!("document_shredded".parse::<ActivityAction>().is_err());
    }
}
