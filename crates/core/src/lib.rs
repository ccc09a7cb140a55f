pub mod activity;
pub mod candidate;
pub mod document;
pub mod error;
pub mod policy;
pub mod profile;
pub mod reminder;

pub use activity::{ActivityAction, ActivityEntry};
pub use candidate::DocumentCandidate;
pub use document::{Document, DocumentStatus};
pub use error::CoreError;
pub use policy::{classify_urgency, days_until_expiry, is_reminder_due};
pub use profile::{Channel, Frequency, UserProfile};
pub use reminder::{NewReminder, Reminder, ReminderTier};
