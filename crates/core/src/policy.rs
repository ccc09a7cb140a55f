//! Reminder policy: decides whether a document is due for a reminder today
//! and how urgent that reminder is.
//!
//! Everything here is pure. Dates are calendar days (`NaiveDate`), so there
//! is no time-of-day component that could shift the result by one across a
//! timezone or DST boundary.

use chrono::NaiveDate;

use crate::profile::Frequency;
use crate::reminder::ReminderTier;

/// Whole calendar days from `today` until `expiration_date`.
///
/// Negative once the document has expired.
pub fn days_until_expiry(today: NaiveDate, expiration_date: NaiveDate) -> i64 {
    (expiration_date - today).num_days()
}

/// Returns `true` if a reminder should be sent for this document today.
///
/// Expired documents are always due, so they fire once per day until the
/// owner renews or cancels them. Otherwise the day count must hit one of the
/// thresholds for `frequency`; `None` uses the 30-day set.
pub fn is_reminder_due(
    today: NaiveDate,
    expiration_date: NaiveDate,
    frequency: Option<Frequency>,
) -> bool {
    is_due_in(days_until_expiry(today, expiration_date), frequency)
}

/// [`is_reminder_due`] for an already computed day count.
pub fn is_due_in(days_until_expiry: i64, frequency: Option<Frequency>) -> bool {
    if days_until_expiry < 0 {
        return true;
    }
    frequency
        .unwrap_or_default()
        .thresholds()
        .contains(&days_until_expiry)
}

/// Classify the urgency tier for a day count.
pub fn classify_urgency(days_until_expiry: i64) -> ReminderTier {
    match days_until_expiry {
        d if d < 0 => ReminderTier::Expired,
        0 => ReminderTier::ExpiresToday,
        1..=3 => ReminderTier::ExpiresSoon,
        4..=7 => ReminderTier::ExpiresWeek,
        8..=14 => ReminderTier::ExpiresTwoWeeks,
        _ => ReminderTier::ExpiresMonth,
    }
}
