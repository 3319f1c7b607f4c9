use std::collections::HashSet;

use crate::date_key::DateKey;
use crate::domain::{ActivityDataset, Record};

#[derive(Debug, Clone, PartialEq)]
pub struct ChartDatum {
    pub name: String,
    pub value: f64,
}

pub fn valid_keys(dataset: &ActivityDataset) -> HashSet<DateKey> {
    dataset.keys().cloned().collect()
}

pub fn daily_total(records: &[Record]) -> f64 {
    records.iter().map(|record| record.value).sum()
}

pub fn breakdown(records: &[Record]) -> Vec<ChartDatum> {
    records
        .iter()
        .map(|record| ChartDatum {
            name: record.label.clone(),
            value: record.value,
        })
        .collect()
}
