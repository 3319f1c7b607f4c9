use std::borrow::Borrow;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::ActivityError;

pub const DATE_KEY_FORMAT: &str = "%d-%m-%Y";

/// Canonical `DD-MM-YYYY` key of a calendar day.
///
/// Only produced by [`encode`] or by parsing a string that survives a
/// decode/encode round trip, so every key maps back to exactly one date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey(String);

impl DateKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn date(&self) -> NaiveDate {
        NaiveDate::parse_from_str(&self.0, DATE_KEY_FORMAT).expect("date keys are always well formed")
    }
}

impl Display for DateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for DateKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for DateKey {
    type Err = ActivityError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        decode(raw).map(encode)
    }
}

pub fn encode(date: NaiveDate) -> DateKey {
    DateKey(date.format(DATE_KEY_FORMAT).to_string())
}

pub fn decode(key: &str) -> Result<NaiveDate, ActivityError> {
    let invalid = || ActivityError::InvalidKeyFormat {
        key: key.to_string(),
    };
    let date = NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).map_err(|_| invalid())?;
    // chrono accepts unpadded fields; those keys would never match a clicked day.
    if encode(date).as_str() != key {
        return Err(invalid());
    }
    Ok(date)
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Duration, NaiveDate};

    use crate::error::ActivityError;

    use super::{DateKey, decode, encode};

    #[test]
    fn encodes_zero_padded_day_month_year() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(encode(date).as_str(), "05-03-2024");
    }

    #[test]
    fn round_trips_every_day_of_a_leap_year() {
        let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        while date.year() == 2024 {
            let key = encode(date);
            assert_eq!(decode(key.as_str()).expect("key should decode"), date);
            assert_eq!(encode(decode(key.as_str()).unwrap()), key);
            date += Duration::days(1);
        }
    }

    #[test]
    fn rejects_keys_that_do_not_match_the_pattern() {
        for raw in ["2024-03-05", "05/03/2024", "31-02-2024", "", "05-03-2024 "] {
            assert_eq!(
                decode(raw),
                Err(ActivityError::InvalidKeyFormat {
                    key: raw.to_string()
                }),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_unpadded_keys_that_would_not_round_trip() {
        assert!(decode("5-3-2024").is_err());
        assert!("5-03-2024".parse::<DateKey>().is_err());
    }

    #[test]
    fn parses_into_key_and_exposes_its_date() {
        let key: DateKey = "29-02-2024".parse().expect("leap day should parse");
        assert_eq!(key.date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(key.to_string(), "29-02-2024");
    }
}
