use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::date_key::{DateKey, encode};

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub label: String,
    pub value: f64,
}

impl Record {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Validated per-day activity records, read-only after load.
#[derive(Debug, Clone, Default)]
pub struct ActivityDataset {
    days: BTreeMap<DateKey, Vec<Record>>,
}

impl ActivityDataset {
    pub fn insert_day(&mut self, key: DateKey, records: Vec<Record>) {
        self.days.insert(key, records);
    }

    pub fn records(&self, key: &str) -> Option<&[Record]> {
        self.days.get(key).map(Vec::as_slice)
    }

    pub fn records_for_date(&self, date: NaiveDate) -> Option<&[Record]> {
        self.records(encode(date).as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &DateKey> {
        self.days.keys()
    }

    pub fn days(&self) -> impl Iterator<Item = (&DateKey, &[Record])> {
        self.days.iter().map(|(key, records)| (key, records.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Formats a value the way the dataset wrote it: `4`, not `4.0`.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::date_key::encode;

    use super::{ActivityDataset, Record, format_value};

    #[test]
    fn formats_integral_values_without_fraction() {
        assert_eq!(format_value(4.0), "4");
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(2.5), "2.5");
        assert_eq!(format_value(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn looks_up_records_by_key_and_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let mut dataset = ActivityDataset::default();
        dataset.insert_day(encode(date), vec![Record::new("Reading", 3.0)]);

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records("05-03-2024").map(<[Record]>::len), Some(1));
        assert_eq!(
            dataset.records_for_date(date),
            Some(&[Record::new("Reading", 3.0)][..])
        );
        assert!(dataset.records("06-03-2024").is_none());
    }
}
