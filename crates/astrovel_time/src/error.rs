//! Error type for time parsing and time-scale conversion.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum TimeError {
    /// Text could not be read as a calendar instant.
    #[error("invalid time {text:?}: {reason}")]
    InvalidTime { text: String, reason: String },
    /// Unknown time-scale label.
    #[error("unknown time scale {0:?} (expected utc, tai, tt or tdb)")]
    UnknownScale(String),
    /// Numeric input was NaN or infinite.
    #[error("time value is not finite")]
    NonFinite,
    /// Leapseconds kernel text was malformed.
    #[error("LSK parse error: {0}")]
    LskParse(String),
    #[error("I/O error: {0}")]
    Io(String),
    /// UTC before 1972-Jan-01 has no integral-second TAI offset.
    #[error("UTC before 1972-01-01 is not supported")]
    Pre1972Utc,
}

impl TimeError {
    pub(crate) fn invalid(text: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTime {
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for TimeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
