use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::date_key::DateKey;
use crate::domain::{ActivityDataset, Record};
use crate::error::ActivityError;

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    JsonDecode(serde_json::Error),
    NotAnObject,
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::JsonDecode(err) => write!(f, "failed to parse activity JSON: {err}"),
            StorageError::NotAnObject => {
                write!(f, "activity file must be a JSON object keyed by DD-MM-YYYY dates")
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// A dataset plus every entry that was skipped while reading it.
#[derive(Debug, Clone, Default)]
pub struct LoadedDataset {
    pub dataset: ActivityDataset,
    pub issues: Vec<ActivityError>,
}

pub fn load_dataset(path: &Path) -> Result<LoadedDataset, StorageError> {
    let raw = fs::read_to_string(path).map_err(StorageError::Io)?;
    let loaded = parse_dataset(&raw)?;
    info!(
        path = %path.display(),
        days = loaded.dataset.len(),
        skipped = loaded.issues.len(),
        "loaded activity dataset"
    );
    Ok(loaded)
}

pub fn parse_dataset(raw: &str) -> Result<LoadedDataset, StorageError> {
    let root: Value = serde_json::from_str(raw).map_err(StorageError::JsonDecode)?;
    let Value::Object(days) = root else {
        return Err(StorageError::NotAnObject);
    };

    let mut loaded = LoadedDataset::default();
    for (raw_key, value) in days {
        let key = match raw_key.parse::<DateKey>() {
            Ok(key) => key,
            Err(err) => {
                warn!("skipping day: {err}");
                loaded.issues.push(err);
                continue;
            }
        };

        let Value::Array(entries) = value else {
            let err = ActivityError::malformed_day(key.as_str(), "expected an array of records");
            warn!("skipping day: {err}");
            loaded.issues.push(err);
            continue;
        };

        let mut records = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match parse_record(&key, index, entry) {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!("skipping record: {err}");
                    loaded.issues.push(err);
                }
            }
        }
        loaded.dataset.insert_day(key, records);
    }

    Ok(loaded)
}

fn parse_record(key: &DateKey, index: usize, entry: Value) -> Result<Record, ActivityError> {
    let malformed = |reason: &str| ActivityError::malformed_record(key.as_str(), index, reason);

    let Value::Object(fields) = entry else {
        return Err(malformed("expected an object with one label"));
    };
    let (label, value) = single_entry(fields).ok_or_else(|| malformed("expected exactly one label"))?;

    let value = value
        .as_f64()
        .ok_or_else(|| malformed(&format!("value for '{label}' is not a number")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(malformed(&format!("value for '{label}' must be a non-negative number")));
    }

    Ok(Record::new(label, value))
}

fn single_entry(fields: Map<String, Value>) -> Option<(String, Value)> {
    if fields.len() != 1 {
        return None;
    }
    fields.into_iter().next()
}
