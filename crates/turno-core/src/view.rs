use chrono::Weekday;
use serde::Serialize;
use tracing::debug;

use crate::calendar::{YearMonth, leading_blanks};
use crate::rotation::{Assignment, month_offset};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayAssignment {
    pub day: u32,
    #[serde(flatten)]
    pub assignment: Assignment,
}

/// Everything needed to lay out one month as a 7-column grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthView {
    pub month: YearMonth,
    pub week_start: Weekday,
    pub first_weekday: Weekday,
    pub leading_blanks: u32,
    pub days_in_month: u32,
    pub days: Vec<DayAssignment>,
}

impl MonthView {
    #[tracing::instrument(skip(week_start))]
    pub fn build(month: YearMonth, week_start: Weekday) -> Self {
        let base = month_offset(month);
        let first_weekday = month.first_weekday();
        debug!(%month, base, ?first_weekday, "building month view");

        let days = month
            .days()
            .zip(1u32..)
            .map(|(date, day)| DayAssignment {
                day,
                assignment: Assignment::new(date, base + i64::from(day) - 1),
            })
            .collect();

        Self {
            month,
            week_start,
            first_weekday,
            leading_blanks: leading_blanks(first_weekday, week_start),
            days_in_month: month.days_in_month(),
            days,
        }
    }

    pub fn day(&self, day: u32) -> Option<&DayAssignment> {
        self.days.get(day.checked_sub(1)? as usize)
    }

    /// Grid rows of seven cells, `None` for padding before day 1 and after
    /// the last day.
    pub fn weeks(&self) -> Vec<[Option<&DayAssignment>; 7]> {
        let mut cells: Vec<Option<&DayAssignment>> = Vec::new();
        cells.resize(self.leading_blanks as usize, None);
        cells.extend(self.days.iter().map(Some));
        while cells.len() % 7 != 0 {
            cells.push(None);
        }

        cells
            .chunks(7)
            .map(|chunk| {
                let mut row = [None; 7];
                row.copy_from_slice(chunk);
                row
            })
            .collect()
    }
}
