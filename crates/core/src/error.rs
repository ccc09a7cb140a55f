use thiserror::Error;

/// Errors raised while interpreting domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A stored or configured value is not a known variant of the named enum.
    #[error("unknown {kind}: {value}")]
    UnknownVariant {
        /// The enum being parsed (e.g. `"channel"`).
        kind: &'static str,
        /// The rejected raw value.
        value: String,
    },
}

impl CoreError {
    pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CoreError::unknown("channel", "fax");
        assert_eq!(err.to_string(), "unknown channel: fax");
    }
}
