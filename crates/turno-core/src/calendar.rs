use std::fmt;

use anyhow::anyhow;
use chrono::{
  Datelike,
  Duration,
  NaiveDate,
  Weekday
};
use serde::{
  Serialize,
  Serializer
};

/// A Gregorian month, always in
/// `1..=12`, with a year chrono can
/// represent. Held as its first day so
/// every accessor is total.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub struct YearMonth {
  first: NaiveDate
}

impl YearMonth {
  pub fn new(
    year: i32,
    month: u32
  ) -> anyhow::Result<Self> {
    if !(1..=12).contains(&month) {
      return Err(anyhow!(
        "month out of range: {month}"
      ));
    }
    let first = NaiveDate::from_ymd_opt(
      year, month, 1
    )
    .ok_or_else(|| {
      anyhow!(
        "year out of range: {year}"
      )
    })?;
    Ok(Self { first })
  }

  pub(crate) const fn from_first_day(
    first: NaiveDate
  ) -> Self {
    Self { first }
  }

  #[must_use]
  pub fn of(date: NaiveDate) -> Self {
    Self {
      first: date
        - Duration::days(i64::from(
          date.day0()
        ))
    }
  }

  #[must_use]
  pub fn year(self) -> i32 {
    self.first.year()
  }

  #[must_use]
  pub fn month(self) -> u32 {
    self.first.month()
  }

  #[must_use]
  pub fn first_day(self) -> NaiveDate {
    self.first
  }

  #[must_use]
  pub fn days_in_month(self) -> u32 {
    days_in_month(
      self.year(),
      self.month()
    )
  }

  #[must_use]
  pub fn first_weekday(self) -> Weekday {
    self.first.weekday()
  }

  /// Applies a signed month offset,
  /// rolling over into adjacent years.
  /// Fails when the result leaves the
  /// representable date range.
  pub fn checked_shift(
    self,
    offset: i32
  ) -> anyhow::Result<Self> {
    let index = self.index()
      + i64::from(offset);
    let year = i32::try_from(
      index.div_euclid(12)
    )
    .map_err(|_| {
      anyhow!(
        "month offset {offset} from \
         {self} is out of range"
      )
    })?;
    let month =
      index.rem_euclid(12) as u32 + 1;
    Self::new(year, month).map_err(
      |_| {
        anyhow!(
          "month offset {offset} from \
           {self} is out of range"
        )
      }
    )
  }

  pub fn next(
    self
  ) -> anyhow::Result<Self> {
    self.checked_shift(1)
  }

  pub fn prev(
    self
  ) -> anyhow::Result<Self> {
    self.checked_shift(-1)
  }

  /// Signed number of month steps from
  /// `self` to `other`.
  #[must_use]
  pub fn months_until(
    self,
    other: YearMonth
  ) -> i64 {
    other.index() - self.index()
  }

  pub fn days(
    self
  ) -> impl Iterator<Item = NaiveDate>
  {
    std::iter::successors(
      Some(self.first),
      NaiveDate::succ_opt
    )
    .take(self.days_in_month() as usize)
  }

  fn index(self) -> i64 {
    i64::from(self.year()) * 12
      + i64::from(self.month())
      - 1
  }
}

impl fmt::Display for YearMonth {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "{:04}-{:02}",
      self.year(),
      self.month()
    )
  }
}

impl Serialize for YearMonth {
  fn serialize<S>(
    &self,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    serializer.collect_str(self)
  }
}

#[must_use]
pub fn is_leap_year(year: i32) -> bool {
  (year % 4 == 0 && year % 100 != 0)
    || year % 400 == 0
}

#[must_use]
pub fn days_in_month(
  year: i32,
  month: u32
) -> u32 {
  match month {
    | 1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
    | 4 | 6 | 9 | 11 => 30,
    | 2 if is_leap_year(year) => 29,
    | 2 => 28,
    | _ => 0
  }
}

/// Empty grid cells before day 1 when
/// the week starts on `week_start`.
#[must_use]
pub fn leading_blanks(
  first: Weekday,
  week_start: Weekday
) -> u32 {
  let first_idx =
    first.num_days_from_monday();
  let start_idx =
    week_start.num_days_from_monday();
  (7 + first_idx - start_idx) % 7
}

/// Grid column order starting at
/// `week_start`.
#[must_use]
pub fn week_columns(
  week_start: Weekday
) -> [Weekday; 7] {
  let mut columns = [week_start; 7];
  let mut day = week_start;
  for column in columns.iter_mut() {
    *column = day;
    day = day.succ();
  }
  columns
}

pub fn parse_week_start(
  raw: &str
) -> anyhow::Result<Weekday> {
  match raw
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "sunday" | "sun" | "domingo" => {
      Ok(Weekday::Sun)
    }
    | "monday" | "mon" | "lunes" => {
      Ok(Weekday::Mon)
    }
    | other => Err(anyhow!(
      "invalid week.start: {other} \
       (expected sunday or monday)"
    ))
  }
}

pub fn add_days(
  date: NaiveDate,
  days: i64
) -> anyhow::Result<NaiveDate> {
  date
    .checked_add_signed(Duration::days(
      days
    ))
    .ok_or_else(|| {
      anyhow!(
        "date out of range: {date} \
         {days:+} days"
      )
    })
}
