use chrono::NaiveDate;

use crate::aggregate::daily_total;
use crate::date_key::DateKey;
use crate::domain::{ActivityDataset, format_value};

/// All-day calendar entry carrying a day's total.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub key: DateKey,
}

impl CalendarEvent {
    fn for_day(key: &DateKey, total: f64) -> Self {
        let date = key.date();
        Self {
            title: format!("Total: {}", format_value(total)),
            start: date,
            end: date,
            key: key.clone(),
        }
    }
}

pub fn build_events(dataset: &ActivityDataset) -> Vec<CalendarEvent> {
    let mut events = dataset
        .days()
        .map(|(key, records)| CalendarEvent::for_day(key, daily_total(records)))
        .collect::<Vec<_>>();
    events.sort_by(|left, right| left.start.cmp(&right.start));
    events
}

pub fn events_in_range(events: &[CalendarEvent], from: NaiveDate, to: NaiveDate) -> Vec<&CalendarEvent> {
    events
        .iter()
        .filter(|event| event.start <= to && event.end >= from)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::date_key::encode;
    use crate::domain::{ActivityDataset, Record};

    use super::{build_events, events_in_range};

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    #[test]
    fn builds_one_all_day_event_per_day() {
        let mut dataset = ActivityDataset::default();
        dataset.insert_day(
            encode(date(3, 5)),
            vec![Record::new("Reading", 3.0), Record::new("Exercise", 1.0)],
        );

        let events = build_events(&dataset);
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.title, "Total: 4");
        assert_eq!(event.start, date(3, 5));
        assert_eq!(event.end, date(3, 5));
        assert_eq!(event.key.as_str(), "05-03-2024");
    }

    #[test]
    fn keeps_events_for_zero_totals_and_sorts_by_date() {
        let mut dataset = ActivityDataset::default();
        dataset.insert_day(encode(date(4, 1)), vec![Record::new("Reading", 2.5)]);
        dataset.insert_day(encode(date(3, 31)), Vec::new());
        dataset.insert_day(encode(date(3, 5)), vec![Record::new("Reading", 0.0)]);

        let events = build_events(&dataset);
        let titles = events
            .iter()
            .map(|event| (event.start, event.title.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            titles,
            [
                (date(3, 5), "Total: 0"),
                (date(3, 31), "Total: 0"),
                (date(4, 1), "Total: 2.5"),
            ]
        );
    }

    #[test]
    fn filters_events_by_inclusive_range() {
        let mut dataset = ActivityDataset::default();
        for (month, day) in [(3, 1), (3, 10), (3, 17), (4, 2)] {
            dataset.insert_day(encode(date(month, day)), vec![Record::new("Reading", 1.0)]);
        }
        let events = build_events(&dataset);

        let week = events_in_range(&events, date(3, 10), date(3, 17));
        assert_eq!(week.len(), 2);
        assert_eq!(week[0].start, date(3, 10));
        assert_eq!(week[1].start, date(3, 17));
    }
}
