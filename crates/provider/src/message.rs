//! Message context shared by every channel, and the literal bodies for the
//! chat and SMS channels.
//!
//! All channels key their copy off the same four cases (see [`MessageKey`]),
//! so a document reads the same whichever route it is delivered through.

use chrono::NaiveDate;
use docwatch_core::{ReminderTier, classify_urgency, days_until_expiry};
use serde::Serialize;

/// Call to action appended to chat messages.
const CHAT_CALL_TO_ACTION: &str = "Open DocWatch to review the document and mark it renewed.";

/// Display format for expiry dates, e.g. `07 Mar 2027`.
const DATE_FORMAT: &str = "%d %b %Y";

/// The four narrative cases every template is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    /// Expired; carries how many days ago.
    Expired(i64),
    Today,
    Tomorrow,
    /// Expires in more than one day.
    InDays(i64),
}

impl MessageKey {
    pub fn from_days(days_until_expiry: i64) -> Self {
        match days_until_expiry {
            d if d < 0 => Self::Expired(-d),
            0 => Self::Today,
            1 => Self::Tomorrow,
            d => Self::InDays(d),
        }
    }
}

/// Everything a channel needs to render one reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderMessage {
    pub title: String,
    pub expiration_date: NaiveDate,
    pub days_until_expiry: i64,
    pub is_critical: bool,
}

impl ReminderMessage {
    /// Build a message for a document evaluated on `today`.
    pub fn new(title: impl Into<String>, expiration_date: NaiveDate, today: NaiveDate) -> Self {
        Self {
            title: title.into(),
            expiration_date,
            days_until_expiry: days_until_expiry(today, expiration_date),
            is_critical: false,
        }
    }

    #[must_use]
    pub fn critical(mut self, is_critical: bool) -> Self {
        self.is_critical = is_critical;
        self
    }

    pub fn key(&self) -> MessageKey {
        MessageKey::from_days(self.days_until_expiry)
    }

    pub fn tier(&self) -> ReminderTier {
        classify_urgency(self.days_until_expiry)
    }

    pub fn formatted_expiry(&self) -> String {
        self.expiration_date.format(DATE_FORMAT).to_string()
    }

    /// One-line summary used in email subjects and headings.
    pub fn headline(&self) -> String {
        let title = &self.title;
        match self.key() {
            MessageKey::Expired(_) => format!("{title} has expired"),
            MessageKey::Today => format!("{title} expires today"),
            MessageKey::Tomorrow => format!("{title} expires tomorrow"),
            MessageKey::InDays(n) => format!("{title} expires in {n} days"),
        }
    }

    /// Full sentence describing the situation, shared by the email bodies.
    pub fn narrative(&self) -> String {
        let title = &self.title;
        let date = self.formatted_expiry();
        match self.key() {
            MessageKey::Expired(n) => format!(
                "Your document \"{title}\" expired on {date} ({n} {} ago). Renew it as soon as possible to stay compliant.",
                plural_days(n)
            ),
            MessageKey::Today => format!(
                "Your document \"{title}\" expires today ({date}). Renew it today to avoid a lapse."
            ),
            MessageKey::Tomorrow => format!(
                "Your document \"{title}\" expires tomorrow ({date}). Make sure the renewal is under way."
            ),
            MessageKey::InDays(n) => format!(
                "Your document \"{title}\" expires in {n} days, on {date}. Plan the renewal ahead of time."
            ),
        }
    }

    /// Chat-message body.
    pub fn chat_body(&self) -> String {
        let title = &self.title;
        let date = self.formatted_expiry();
        let body = match self.key() {
            MessageKey::Expired(_) => format!(
                "*Document expired*\n\nYour document \"{title}\" expired on {date}. Please renew it as soon as possible."
            ),
            MessageKey::Today => format!(
                "*Expires today*\n\nYour document \"{title}\" expires today, {date}. Renew it today to avoid a lapse."
            ),
            MessageKey::Tomorrow => format!(
                "*Expires tomorrow*\n\nYour document \"{title}\" expires tomorrow, {date}."
            ),
            MessageKey::InDays(n) => format!(
                "*Renewal reminder*\n\nYour document \"{title}\" expires in {n} days, on {date}."
            ),
        };
        let flag = if self.is_critical { "[CRITICAL] " } else { "" };
        format!("{flag}{body}\n\n{CHAT_CALL_TO_ACTION}")
    }

    /// Short plain-text SMS body.
    pub fn sms_body(&self) -> String {
        let title = &self.title;
        let date = self.formatted_expiry();
        match self.key() {
            MessageKey::Expired(_) => {
                format!("DocWatch: \"{title}\" expired on {date}. Renew now.")
            }
            MessageKey::Today => format!("DocWatch: \"{title}\" expires TODAY ({date})."),
            MessageKey::Tomorrow => format!("DocWatch: \"{title}\" expires tomorrow ({date})."),
            MessageKey::InDays(n) => {
                format!("DocWatch: \"{title}\" expires in {n} days ({date}).")
            }
        }
    }

    /// Email subject, prefixed with `[CRITICAL]` for critical documents.
    pub fn email_subject(&self) -> String {
        let prefix = if self.is_critical { "[CRITICAL] " } else { "" };
        format!("{prefix}Reminder: {}", self.headline())
    }

    /// Plain-text email body, sent alongside the HTML part.
    pub fn email_text(&self) -> String {
        format!(
            "{}\n\n{}\n\nExpiry date: {}\n\n{CHAT_CALL_TO_ACTION}",
            self.headline(),
            self.narrative(),
            self.formatted_expiry()
        )
    }
}

fn plural_days(n: i64) -> &'static str {
    if n == 1 { "day" } else { "days" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    fn message(days: i64) -> ReminderMessage {
        let expiry = today() + chrono::Duration::days(days);
        ReminderMessage::new("Trade Licence", expiry, today())
    }

    #[test]
    fn key_from_days() {
        assert_eq!(MessageKey::from_days(-3), MessageKey::Expired(3));
        assert_eq!(MessageKey::from_days(0), MessageKey::Today);
        assert_eq!(MessageKey::from_days(1), MessageKey::Tomorrow);
        assert_eq!(MessageKey::from_days(7), MessageKey::InDays(7));
    }

    #[test]
    fn message_carries_days_and_tier() {
        let msg = message(7);
        assert_eq!(msg.days_until_expiry, 7);
        assert_eq!(msg.tier(), ReminderTier::ExpiresWeek);
        assert_eq!(msg.formatted_expiry(), "22 Oct 2026");
    }

    #[test]
    fn chat_body_includes_title_date_and_call_to_action() {
        let body = message(-2).chat_body();
        assert!(body.contains("Document expired"));
        assert!(body.contains("\"Trade Licence\""));
        assert!(body.contains("13 Oct 2026"));
        assert!(body.ends_with(CHAT_CALL_TO_ACTION));
        assert!(!body.starts_with("[CRITICAL]"));
    }

    #[test]
    fn sms_bodies_by_key() {
        assert!(message(0).sms_body().contains("expires TODAY"));
        assert!(message(1).sms_body().contains("expires tomorrow"));
        assert!(message(14).sms_body().contains("expires in 14 days"));
        assert!(message(-1).sms_body().contains("Renew now"));
    }

    #[test]
    fn email_subject_flags_critical_documents() {
        assert_eq!(
            message(3).email_subject(),
            "Reminder: Trade Licence expires in 3 days"
        );
        assert_eq!(
            message(0).critical(true).email_subject(),
            "[CRITICAL] Reminder: Trade Licence expires today"
        );
    }

    #[test]
    fn narrative_pluralizes_expired_days() {
        assert!(message(-1).narrative().contains("(1 day ago)"));
        assert!(message(-4).narrative().contains("(4 days ago)"));
    }
}
