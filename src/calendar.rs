use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarView {
    #[default]
    Month,
    Week,
    Day,
}

impl CalendarView {
    pub const ALL: [CalendarView; 3] = [CalendarView::Month, CalendarView::Week, CalendarView::Day];

    pub fn label(self) -> &'static str {
        match self {
            CalendarView::Month => "Month",
            CalendarView::Week => "Week",
            CalendarView::Day => "Day",
        }
    }

    pub fn index(self) -> usize {
        match self {
            CalendarView::Month => 0,
            CalendarView::Week => 1,
            CalendarView::Day => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }

    pub fn header(self) -> [&'static str; 7] {
        match self {
            WeekStart::Sunday => ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"],
            WeekStart::Monday => ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"],
        }
    }
}

/// Inclusive span of dates drawn by a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl VisibleRange {
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.first.iter_days().take_while({
            let last = self.last;
            move |day| *day <= last
        })
    }
}

pub fn visible_range(view: CalendarView, cursor: NaiveDate, week_start: WeekStart) -> VisibleRange {
    match view {
        CalendarView::Month => {
            let first = start_of_week(first_day_of_month(cursor), week_start);
            VisibleRange {
                first,
                last: first.checked_add_signed(Duration::days(6 * 7 - 1)).unwrap_or(NaiveDate::MAX),
            }
        }
        CalendarView::Week => {
            let first = start_of_week(cursor, week_start);
            VisibleRange {
                first,
                last: first.checked_add_signed(Duration::days(6)).unwrap_or(NaiveDate::MAX),
            }
        }
        CalendarView::Day => VisibleRange {
            first: cursor,
            last: cursor,
        },
    }
}

pub fn shift_period(view: CalendarView, cursor: NaiveDate, delta: i32) -> NaiveDate {
    match view {
        CalendarView::Month => shift_month(cursor, delta),
        CalendarView::Week => offset_days(cursor, i64::from(delta) * 7),
        CalendarView::Day => offset_days(cursor, delta.into()),
    }
}

pub fn period_label(view: CalendarView, cursor: NaiveDate, week_start: WeekStart) -> String {
    match view {
        CalendarView::Month => cursor.format("%B %Y").to_string(),
        CalendarView::Week => {
            let range = visible_range(view, cursor, week_start);
            format!(
                "{} - {}",
                range.first.format("%d %b"),
                range.last.format("%d %b %Y")
            )
        }
        CalendarView::Day => cursor.format("%A, %d %B %Y").to_string(),
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|date| date.pred_opt())
        .map(|date| date.day())
        .unwrap_or(31)
}

pub fn first_day_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

pub fn start_of_week(day: NaiveDate, week_start: WeekStart) -> NaiveDate {
    let offset = (7 + day.weekday().num_days_from_monday() - week_start.weekday().num_days_from_monday()) % 7;
    offset_days(day, -i64::from(offset))
}

/// Moves `day` by `days`, staying put when the result would leave chrono's date range.
pub fn offset_days(day: NaiveDate, days: i64) -> NaiveDate {
    day.checked_add_signed(Duration::days(days)).unwrap_or(day)
}

fn shift_month(day: NaiveDate, delta: i32) -> NaiveDate {
    let mut year = day.year();
    let mut month = day.month() as i32 + delta;
    while month > 12 {
        year += 1;
        month -= 12;
    }
    while month < 1 {
        year -= 1;
        month += 12;
    }
    let month = month as u32;
    let target_day = day.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, target_day).unwrap_or(day)
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate, Weekday};

    use super::{
        CalendarView, WeekStart, days_in_month, offset_days, period_label, shift_period, start_of_week, visible_range,
    };

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn month_grid_starts_on_configured_week_start() {
        // 1 March 2024 is a Friday.
        let sunday_grid = visible_range(CalendarView::Month, date(2024, 3, 15), WeekStart::Sunday);
        assert_eq!(sunday_grid.first, date(2024, 2, 25));
        assert_eq!(sunday_grid.first.weekday(), Weekday::Sun);
        assert_eq!(sunday_grid.days().count(), 42);

        let monday_grid = visible_range(CalendarView::Month, date(2024, 3, 15), WeekStart::Monday);
        assert_eq!(monday_grid.first, date(2024, 2, 26));
        assert_eq!(monday_grid.last, date(2024, 4, 7));
    }

    #[test]
    fn week_and_day_ranges_follow_the_cursor() {
        let week = visible_range(CalendarView::Week, date(2024, 3, 5), WeekStart::Sunday);
        assert_eq!((week.first, week.last), (date(2024, 3, 3), date(2024, 3, 9)));

        let day = visible_range(CalendarView::Day, date(2024, 3, 5), WeekStart::Sunday);
        assert_eq!(day.days().collect::<Vec<_>>(), [date(2024, 3, 5)]);
    }

    #[test]
    fn start_of_week_is_identity_on_the_start_day() {
        assert_eq!(start_of_week(date(2024, 3, 3), WeekStart::Sunday), date(2024, 3, 3));
        assert_eq!(start_of_week(date(2024, 3, 3), WeekStart::Monday), date(2024, 2, 26));
    }

    #[test]
    fn shifting_months_clamps_to_month_length() {
        assert_eq!(shift_period(CalendarView::Month, date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(shift_period(CalendarView::Month, date(2024, 1, 15), -1), date(2023, 12, 15));
        assert_eq!(shift_period(CalendarView::Week, date(2024, 3, 5), 1), date(2024, 3, 12));
        assert_eq!(shift_period(CalendarView::Day, date(2024, 3, 1), -1), date(2024, 2, 29));
    }

    #[test]
    fn counts_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
    }

    #[test]
    fn stops_at_the_edges_of_the_date_range() {
        assert_eq!(offset_days(date(2024, 3, 5), -4), date(2024, 3, 1));
        assert_eq!(offset_days(NaiveDate::MAX, 1), NaiveDate::MAX);
        assert_eq!(offset_days(NaiveDate::MIN, -1), NaiveDate::MIN);
        assert_eq!(shift_period(CalendarView::Week, NaiveDate::MAX, 1), NaiveDate::MAX);
        assert_eq!(shift_period(CalendarView::Day, NaiveDate::MIN, -1), NaiveDate::MIN);
        assert_eq!(visible_range(CalendarView::Week, NaiveDate::MAX, WeekStart::Sunday).last, NaiveDate::MAX);
    }

    #[test]
    fn labels_each_period() {
        assert_eq!(period_label(CalendarView::Month, date(2024, 3, 5), WeekStart::Sunday), "March 2024");
        assert_eq!(
            period_label(CalendarView::Week, date(2024, 3, 5), WeekStart::Sunday),
            "03 Mar - 09 Mar 2024"
        );
        assert_eq!(
            period_label(CalendarView::Day, date(2024, 3, 5), WeekStart::Sunday),
            "Tuesday, 05 March 2024"
        );
    }
}
