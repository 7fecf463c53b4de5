use std::io::{self, IsTerminal, Write};

use chrono::Datelike;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::locale::Locale;
use crate::rotation::{Assignment, Participant};
use crate::view::{DayAssignment, MonthView};

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    short: bool,
    locale: Locale,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color = cfg.flag("color", true)?;

        Ok(Self {
            color: color && io::stdout().is_terminal(),
            short: cfg.flag("grid.short", false)?,
            locale: cfg.locale()?,
        })
    }

    #[tracing::instrument(skip(self, view), fields(month = %view.month))]
    pub fn print_month(&self, view: &MonthView) -> anyhow::Result<()> {
        self.write_month(io::stdout().lock(), view)
    }

    pub fn print_legend(&self) -> anyhow::Result<()> {
        self.write_legend(io::stdout().lock())
    }

    pub fn print_day(&self, assignment: &Assignment) -> anyhow::Result<()> {
        self.write_day(io::stdout().lock(), assignment)
    }

    #[tracing::instrument(skip(self, assignments), fields(count = assignments.len()))]
    pub fn print_agenda(&self, assignments: &[Assignment]) -> anyhow::Result<()> {
        self.write_agenda(io::stdout().lock(), assignments)
    }

    pub fn write_month<W: Write>(&self, mut writer: W, view: &MonthView) -> anyhow::Result<()> {
        writeln!(
            writer,
            "{} {}",
            self.locale.month_name(view.month.month()),
            view.month.year()
        )?;

        let headers = self
            .locale
            .weekday_headers(view.week_start, self.short)
            .into_iter()
            .map(str::to_string)
            .collect();

        let rows = view
            .weeks()
            .into_iter()
            .map(|week| week.iter().map(|cell| self.grid_cell(*cell)).collect())
            .collect();

        write_table(&mut writer, headers, rows)
    }

    pub fn write_legend<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        for participant in Participant::ALL {
            let swatch = self.paint("■", participant.color().ansi_code());
            writeln!(writer, "{swatch} {}", participant.name())?;
        }
        Ok(())
    }

    pub fn write_day<W: Write>(&self, mut writer: W, assignment: &Assignment) -> anyhow::Result<()> {
        let participant = assignment.participant;
        writeln!(writer, "date      {}", assignment.date.format("%Y-%m-%d"))?;
        writeln!(
            writer,
            "weekday   {}",
            self.locale.weekday_name(assignment.date.weekday())
        )?;
        writeln!(writer, "cycle     {}", assignment.cycle_day)?;
        writeln!(
            writer,
            "assigned  {}",
            self.paint(participant.name(), participant.color().ansi_code())
        )?;
        writeln!(writer, "color     {}", assignment.color.name())?;
        Ok(())
    }

    pub fn write_agenda<W: Write>(&self, writer: W, assignments: &[Assignment]) -> anyhow::Result<()> {
        let headers = vec![
            "Date".to_string(),
            "Weekday".to_string(),
            "Cycle".to_string(),
            "Assigned".to_string(),
        ];

        let rows = assignments
            .iter()
            .map(|assignment| {
                let participant = assignment.participant;
                vec![
                    assignment.date.format("%Y-%m-%d").to_string(),
                    self.locale.weekday_name(assignment.date.weekday()).to_string(),
                    assignment.cycle_day.to_string(),
                    self.paint(participant.name(), participant.color().ansi_code()),
                ]
            })
            .collect();

        write_table(writer, headers, rows)
    }

    fn grid_cell(&self, cell: Option<&DayAssignment>) -> String {
        let Some(day) = cell else {
            return String::new();
        };
        let participant = day.assignment.participant;
        let label = if self.short {
            participant.short_label()
        } else {
            participant.name()
        };
        format!(
            "{:>2} {}",
            day.day,
            self.paint(label, participant.color().ansi_code())
        )
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    let mut header_line = String::new();
    for (idx, header) in headers.iter().enumerate() {
        let padding = widths[idx].saturating_sub(UnicodeWidthStr::width(header.as_str()));
        header_line.push_str(header);
        header_line.push_str(&" ".repeat(padding + 1));
    }
    writeln!(writer, "{}", header_line.trim_end())?;

    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    writeln!(writer, "{}", rule.join(" "))?;

    for row in rows {
        let mut line = String::new();
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            line.push_str(cell);
            line.push_str(&" ".repeat(padding + 1));
        }
        writeln!(writer, "{}", line.trim_end())?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
