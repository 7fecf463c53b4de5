use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::calendar::YearMonth;

/// Consecutive days each participant holds before the next one takes over.
pub const BLOCK_DAYS: i64 = 3;

/// Full rotation period in days.
pub const CYCLE_DAYS: i64 = BLOCK_DAYS * Participant::ALL.len() as i64;

/// Month whose first day is cycle day 0.
pub const EPOCH: YearMonth = match NaiveDate::from_ymd_opt(2025, 3, 1) {
    Some(first) => YearMonth::from_first_day(first),
    None => panic!("epoch month must be a valid date"),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Green,
    Yellow,
    Blue,
}

impl Color {
    pub fn name(self) -> &'static str {
        match self {
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Blue => "blue",
        }
    }

    pub fn ansi_code(self) -> &'static str {
        match self {
            Color::Green => "32",
            Color::Yellow => "33",
            Color::Blue => "34",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Participant {
    Alexis,
    Alexandra,
    Robinson,
}

impl Participant {
    /// Rotation order.
    pub const ALL: [Participant; 3] = [
        Participant::Alexis,
        Participant::Alexandra,
        Participant::Robinson,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Participant::Alexis => "Alexis",
            Participant::Alexandra => "Alexandra",
            Participant::Robinson => "Robinson",
        }
    }

    /// Label for narrow grids. "Alexandra" keeps four letters so it does not
    /// collide with "Alexis".
    pub fn short_label(self) -> &'static str {
        match self {
            Participant::Alexis => "Ale",
            Participant::Alexandra => "Alex",
            Participant::Robinson => "Rob",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Participant::Alexis => Color::Green,
            Participant::Alexandra => Color::Yellow,
            Participant::Robinson => Color::Blue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub date: NaiveDate,
    pub cycle_day: i64,
    pub participant: Participant,
    pub color: Color,
}

impl Assignment {
    pub fn new(date: NaiveDate, cycle_day: i64) -> Self {
        let participant = assignment_of(cycle_day);
        Self {
            date,
            cycle_day,
            participant,
            color: participant.color(),
        }
    }
}

/// Participant on duty for a cycle day. Days before the epoch wrap with
/// Euclidean remainder, so the rotation extends backwards unchanged.
pub fn assignment_of(cycle_day: i64) -> Participant {
    match cycle_day.rem_euclid(CYCLE_DAYS) / BLOCK_DAYS {
        0 => Participant::Alexis,
        1 => Participant::Alexandra,
        _ => Participant::Robinson,
    }
}

/// Cycle day of the first day of `month`, summing whole month lengths
/// between the epoch month and `month`. Negative before the epoch.
pub fn month_offset(month: YearMonth) -> i64 {
    let span = EPOCH.months_until(month);
    if span >= 0 {
        sum_month_lengths(EPOCH, span)
    } else {
        -sum_month_lengths(month, -span)
    }
}

fn sum_month_lengths(from: YearMonth, count: i64) -> i64 {
    std::iter::successors(Some(from), |m| m.next().ok())
        .take(usize::try_from(count).unwrap_or(0))
        .map(|m| i64::from(m.days_in_month()))
        .sum()
}

pub fn cycle_day_of(date: NaiveDate) -> i64 {
    month_offset(YearMonth::of(date)) + i64::from(date.day()) - 1
}

pub fn assignment_for_date(date: NaiveDate) -> Assignment {
    Assignment::new(date, cycle_day_of(date))
}
