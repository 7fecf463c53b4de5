use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::calendar::{YearMonth, add_days};
use crate::cli::Invocation;
use crate::config::Config;
use crate::datetime::{parse_date_expr, parse_month_expr};
use crate::render::Renderer;
use crate::rotation::{Assignment, assignment_for_date};
use crate::view::MonthView;

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "month",
        "next",
        "prev",
        "day",
        "agenda",
        "legend",
        "export",
        "help",
        "version",
        "_commands",
        "_show",
    ]
}

pub fn expand_command_abbrev<'a>(token: &str, known: &[&'a str]) -> Option<&'a str> {
    if let Some(exact) = known.iter().copied().find(|name| *name == token) {
        return Some(exact);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[instrument(skip(cfg, renderer, inv))]
pub fn dispatch(
    cfg: &Config,
    renderer: &Renderer,
    inv: Invocation,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let command = inv.command.as_str();
    debug!(command, args = ?inv.command_args, "dispatching command");

    match command {
        "month" => cmd_month(cfg, renderer, &inv.command_args, today),
        "next" => cmd_navigate(cfg, renderer, &inv.command_args, today, 1),
        "prev" => cmd_navigate(cfg, renderer, &inv.command_args, today, -1),
        "day" => cmd_day(renderer, &inv.command_args, today),
        "agenda" => cmd_agenda(cfg, renderer, &inv.command_args, today),
        "legend" => renderer.print_legend(),
        "export" => cmd_export(cfg, &inv.command_args, today),
        "help" => cmd_help(),
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "_commands" => cmd_commands(),
        "_show" => cmd_show(cfg),
        other => Err(anyhow!("unknown command: {other}")),
    }
}

/// Month shown when no explicit month is requested.
pub fn display_month(cfg: &Config, today: NaiveDate) -> anyhow::Result<YearMonth> {
    let expr = cfg
        .get("display.month")
        .unwrap_or_else(|| "today".to_string());
    parse_month_expr(&expr, today).context("invalid display.month")
}

/// Month selected by `month [EXPR]`; extra tokens form a single expression
/// such as `marzo 2025`.
pub fn requested_month(cfg: &Config, args: &[String], today: NaiveDate) -> anyhow::Result<YearMonth> {
    if args.is_empty() {
        return display_month(cfg, today);
    }
    parse_month_expr(&args.join(" "), today)
}

/// Applies a navigation step of `count * direction` months to the display
/// month.
pub fn navigated_month(
    cfg: &Config,
    args: &[String],
    today: NaiveDate,
    direction: i32,
) -> anyhow::Result<YearMonth> {
    let count = match args {
        [] => 1,
        [raw] => raw
            .trim_start_matches('+')
            .parse::<i32>()
            .with_context(|| format!("invalid month count: {raw}"))?,
        [_, extra, ..] => return Err(anyhow!("unexpected argument: {extra}")),
    };
    let offset = count
        .checked_mul(direction)
        .ok_or_else(|| anyhow!("month count out of range: {count}"))?;
    let base = display_month(cfg, today)?;
    debug!(%base, offset, "navigating display month");
    base.checked_shift(offset)
}

/// Assignments for `days` consecutive days from `start`. Fails instead of
/// repeating dates when the range runs past the last representable date.
pub fn agenda(start: NaiveDate, days: u32) -> anyhow::Result<Vec<Assignment>> {
    (0..i64::from(days))
        .map(|offset| add_days(start, offset).map(assignment_for_date))
        .collect()
}

fn cmd_month(cfg: &Config, renderer: &Renderer, args: &[String], today: NaiveDate) -> anyhow::Result<()> {
    let month = requested_month(cfg, args, today)?;
    show_month(cfg, renderer, month)
}

fn cmd_navigate(
    cfg: &Config,
    renderer: &Renderer,
    args: &[String],
    today: NaiveDate,
    direction: i32,
) -> anyhow::Result<()> {
    let month = navigated_month(cfg, args, today, direction)?;
    show_month(cfg, renderer, month)
}

fn show_month(cfg: &Config, renderer: &Renderer, month: YearMonth) -> anyhow::Result<()> {
    let view = MonthView::build(month, cfg.week_start()?);
    info!(%month, days = view.days_in_month, "rendering month");
    renderer.print_month(&view)?;
    println!();
    renderer.print_legend()
}

fn cmd_day(renderer: &Renderer, args: &[String], today: NaiveDate) -> anyhow::Result<()> {
    let date = match args.first() {
        Some(raw) => parse_date_expr(raw, today)?,
        None => today,
    };
    renderer.print_day(&assignment_for_date(date))
}

fn cmd_agenda(cfg: &Config, renderer: &Renderer, args: &[String], today: NaiveDate) -> anyhow::Result<()> {
    let days = match args.first() {
        Some(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("invalid agenda length: {raw}"))?,
        None => cfg.agenda_days()?,
    };
    if days == 0 {
        return Err(anyhow!("agenda length must be at least 1"));
    }
    renderer.print_agenda(&agenda(today, days)?)
}

fn cmd_export(cfg: &Config, args: &[String], today: NaiveDate) -> anyhow::Result<()> {
    let month = requested_month(cfg, args, today)?;
    let view = MonthView::build(month, cfg.week_start()?);
    let json = serde_json::to_string_pretty(&view).context("failed to serialize month view")?;
    println!("{json}");
    Ok(())
}

fn cmd_help() -> anyhow::Result<()> {
    println!("usage: turno [options] [rc.KEY=VALUE ...] [command] [args]");
    println!();
    println!("commands:");
    println!("  month [MONTH]     show the rotation grid (default: display.month)");
    println!("  next [N]          show the grid N months after display.month");
    println!("  prev [N]          show the grid N months before display.month");
    println!("  day [DATE]        who is assigned on DATE (default: today)");
    println!("  agenda [N]        assignments for the next N days");
    println!("  legend            participant colors");
    println!("  export [MONTH]    month view as JSON");
    println!("  help | version");
    println!();
    println!("MONTH: today, YYYY-MM, YYYY/MM, march 2025, marzo, +N, -N");
    println!("DATE:  today, tomorrow, yesterday, +Nd, -Nd, YYYY-MM-DD");
    Ok(())
}

fn cmd_commands() -> anyhow::Result<()> {
    for name in known_command_names() {
        println!("{name}");
    }
    Ok(())
}

fn cmd_show(cfg: &Config) -> anyhow::Result<()> {
    for (key, value) in cfg.iter() {
        println!("{key}={value}");
    }
    Ok(())
}
