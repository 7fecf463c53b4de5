use std::sync::OnceLock;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Datelike,
  Local,
  NaiveDate
};
use regex::Regex;

use crate::calendar::{
  YearMonth,
  add_days
};

#[must_use]
pub fn today() -> NaiveDate {
  Local::now().date_naive()
}

fn cached_regex(
  cell: &'static OnceLock<
    Option<Regex>
  >,
  pattern: &str
) -> anyhow::Result<&'static Regex> {
  cell
    .get_or_init(|| {
      Regex::new(pattern).ok()
    })
    .as_ref()
    .ok_or_else(|| {
      anyhow!(
        "invalid regex: {pattern}"
      )
    })
}

fn numeric_month_re()
-> anyhow::Result<&'static Regex> {
  static RE: OnceLock<Option<Regex>> =
    OnceLock::new();
  cached_regex(
    &RE,
    r"^(?P<year>\d{4})[-/](?P<month>\d{1,2})$"
  )
}

fn month_offset_re()
-> anyhow::Result<&'static Regex> {
  static RE: OnceLock<Option<Regex>> =
    OnceLock::new();
  cached_regex(&RE, r"^[+-]\d{1,6}$")
}

fn relative_days_re()
-> anyhow::Result<&'static Regex> {
  static RE: OnceLock<Option<Regex>> =
    OnceLock::new();
  cached_regex(
    &RE,
    r"^(?P<sign>[+-])(?P<days>\d{1,6})d$"
  )
}

#[tracing::instrument]
pub fn parse_month_expr(
  raw: &str,
  today: NaiveDate
) -> anyhow::Result<YearMonth> {
  let expr =
    raw.trim().to_lowercase();
  let current = YearMonth::of(today);

  match expr.as_str() {
    | "today" | "now" | "current"
    | "hoy" => return Ok(current),
    | _ => {}
  }

  if let Some(caps) =
    numeric_month_re()?.captures(&expr)
  {
    let year = caps["year"]
      .parse::<i32>()
      .context("invalid year")?;
    let month = caps["month"]
      .parse::<u32>()
      .context("invalid month")?;
    return YearMonth::new(year, month);
  }

  if month_offset_re()?.is_match(&expr) {
    let offset = expr
      .trim_start_matches('+')
      .parse::<i32>()
      .with_context(|| {
        format!(
          "invalid month offset: \
           {expr}"
        )
      })?;
    return current.checked_shift(offset);
  }

  let mut tokens =
    expr.split_whitespace();
  if let Some(first) = tokens.next()
    && let Some(month) =
      parse_month_name(first)
  {
    let year = match tokens.next() {
      | Some(token) => {
        token.parse::<i32>().with_context(
          || {
            format!(
              "invalid year: {token}"
            )
          }
        )?
      }
      | None => today.year()
    };
    if let Some(extra) = tokens.next() {
      return Err(anyhow!(
        "unexpected trailing token \
         in month expression: {extra}"
      ));
    }
    return YearMonth::new(year, month);
  }

  Err(anyhow!(
    "unrecognized month expression: \
     {raw}. Supported: today, \
     YYYY-MM, YYYY/MM, month names \
     (e.g. march 2025, marzo), \
     +N/-N months"
  ))
}

#[tracing::instrument]
pub fn parse_date_expr(
  raw: &str,
  today: NaiveDate
) -> anyhow::Result<NaiveDate> {
  let expr =
    raw.trim().to_lowercase();

  match expr.as_str() {
    | "today" | "now" | "hoy" => {
      return Ok(today);
    }
    | "tomorrow" | "mañana" => {
      return add_days(today, 1);
    }
    | "yesterday" | "ayer" => {
      return add_days(today, -1);
    }
    | _ => {}
  }

  if let Some(caps) =
    relative_days_re()?.captures(&expr)
  {
    let days = caps["days"]
      .parse::<i64>()
      .context("invalid day count")?;
    let days = if &caps["sign"] == "-" {
      -days
    } else {
      days
    };
    return add_days(today, days);
  }

  if let Ok(date) =
    NaiveDate::parse_from_str(
      &expr, "%Y-%m-%d"
    )
  {
    return Ok(date);
  }

  Err(anyhow!(
    "unrecognized date expression: \
     {raw}. Supported: today, \
     tomorrow, yesterday, +Nd/-Nd, \
     YYYY-MM-DD"
  ))
}

fn parse_month_name(
  token: &str
) -> Option<u32> {
  match token.trim() {
    | "january" | "jan" | "enero"
    | "ene" => Some(1),
    | "february" | "feb"
    | "febrero" => Some(2),
    | "march" | "mar" | "marzo" => {
      Some(3)
    }
    | "april" | "apr" | "abril"
    | "abr" => Some(4),
    | "may" | "mayo" => Some(5),
    | "june" | "jun" | "junio" => {
      Some(6)
    }
    | "july" | "jul" | "julio" => {
      Some(7)
    }
    | "august" | "aug" | "agosto"
    | "ago" => Some(8),
    | "september" | "sep" | "sept"
    | "septiembre" | "setiembre" => {
      Some(9)
    }
    | "october" | "oct" | "octubre" => {
      Some(10)
    }
    | "november" | "nov"
    | "noviembre" => Some(11),
    | "december" | "dec"
    | "diciembre" | "dic" => Some(12),
    | _ => None
  }
}
