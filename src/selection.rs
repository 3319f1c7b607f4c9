use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::calendar::CalendarView;
use crate::date_key::{DateKey, encode};
use crate::error::NoDataForDate;

/// Which day is selected. The detail popup is open exactly while a day is selected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Selected(DateKey),
}

impl SelectionState {
    pub fn selected_key(&self) -> Option<&DateKey> {
        match self {
            SelectionState::Idle => None,
            SelectionState::Selected(key) => Some(key),
        }
    }

    pub fn detail_open(&self) -> bool {
        matches!(self, SelectionState::Selected(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellDecoration {
    pub has_data: bool,
    pub is_selected: bool,
}

pub fn decorate(date: NaiveDate, state: &SelectionState, valid_keys: &HashSet<DateKey>) -> CellDecoration {
    let key = encode(date);
    CellDecoration {
        has_data: valid_keys.contains(&key),
        is_selected: state.selected_key() == Some(&key),
    }
}

#[derive(Debug, Clone)]
pub struct SelectionController {
    valid_keys: HashSet<DateKey>,
    state: SelectionState,
}

impl SelectionController {
    pub fn new(valid_keys: HashSet<DateKey>) -> Self {
        Self {
            valid_keys,
            state: SelectionState::Idle,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn on_day_selected(&mut self, date: NaiveDate) -> Result<DateKey, NoDataForDate> {
        let key = encode(date);
        if !self.valid_keys.contains(&key) {
            debug!(key = %key, "selected day has no data");
            return Err(NoDataForDate(key));
        }

        debug!(key = %key, "day selected");
        self.state = SelectionState::Selected(key.clone());
        Ok(key)
    }

    pub fn on_view_changed(&mut self, view: CalendarView) {
        debug!(view = view.label(), "view changed, clearing selection");
        self.state = SelectionState::Idle;
    }

    pub fn on_detail_closed(&mut self) {
        if let SelectionState::Selected(key) = &self.state {
            debug!(key = %key, "detail closed");
        }
        self.state = SelectionState::Idle;
    }

    pub fn decorate(&self, date: NaiveDate) -> CellDecoration {
        decorate(date, &self.state, &self.valid_keys)
    }
}
