//! Destination phone normalization for the chat and SMS channels.
//!
//! Numbers are reduced to digits-only international form. A bare 10-digit
//! number is assumed to be a national number and gets the configured
//! default country code; this is a deployment policy, not a numbering rule.

use crate::error::ProviderError;

pub const DEFAULT_COUNTRY_CODE: &str = "91";

const MIN_DIGITS: usize = 10;
const MAX_DIGITS: usize = 15;

/// Normalizes raw user-entered phone numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNormalizer {
    default_country_code: String,
}

impl PhoneNormalizer {
    pub fn new(default_country_code: impl Into<String>) -> Self {
        let code: String = default_country_code
            .into()
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        Self {
            default_country_code: code,
        }
    }

    pub fn default_country_code(&self) -> &str {
        &self.default_country_code
    }

    /// Normalize `raw`, returning `None` if the result is not a plausible
    /// international number.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let mut digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if let Some(rest) = digits.strip_prefix("00") {
            digits = rest.to_owned();
        }
        if digits.len() == MIN_DIGITS {
            digits.insert_str(0, &self.default_country_code);
        }
        (MIN_DIGITS..=MAX_DIGITS)
            .contains(&digits.len())
            .then_some(digits)
    }

    /// Like [`normalize`](Self::normalize) but maps rejection to
    /// [`ProviderError::InvalidDestination`].
    pub fn require(&self, raw: &str) -> Result<String, ProviderError> {
        self.normalize(raw)
            .ok_or_else(|| ProviderError::InvalidDestination(format!("unusable phone number: {raw:?}")))
    }
}

impl Default for PhoneNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRY_CODE)
    }
}
