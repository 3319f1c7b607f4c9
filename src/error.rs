use std::fmt::{Display, Formatter};

use crate::date_key::DateKey;

pub const NO_DATA_NOTICE: &str = "No data found for the selected date.";

#[derive(Debug, Clone, PartialEq)]
pub enum ActivityError {
    NoDataForDate(DateKey),
    InvalidKeyFormat {
        key: String,
    },
    MalformedRecord {
        key: String,
        index: Option<usize>,
        reason: String,
    },
}

/// A day with no records was selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoDataForDate(pub DateKey);

impl From<NoDataForDate> for ActivityError {
    fn from(NoDataForDate(key): NoDataForDate) -> Self {
        ActivityError::NoDataForDate(key)
    }
}

impl ActivityError {
    pub fn malformed_day(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ActivityError::MalformedRecord {
            key: key.into(),
            index: None,
            reason: reason.into(),
        }
    }

    pub fn malformed_record(key: impl Into<String>, index: usize, reason: impl Into<String>) -> Self {
        ActivityError::MalformedRecord {
            key: key.into(),
            index: Some(index),
            reason: reason.into(),
        }
    }
}

impl Display for ActivityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityError::NoDataForDate(_) => write!(f, "{NO_DATA_NOTICE}"),
            ActivityError::InvalidKeyFormat { key } => {
                write!(f, "invalid date key '{key}', expected DD-MM-YYYY")
            }
            ActivityError::MalformedRecord {
                key,
                index: Some(index),
                reason,
            } => write!(f, "malformed record #{index} for {key}: {reason}"),
            ActivityError::MalformedRecord {
                key,
                index: None,
                reason,
            } => write!(f, "malformed entry for {key}: {reason}"),
        }
    }
}

impl std::error::Error for ActivityError {}
