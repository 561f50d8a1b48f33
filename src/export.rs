use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use crate::jalali::{self, JalaliDate};
use crate::models::{FinanceCategory, WeekData};
use crate::planner::{remaining_days, remaining_label};
use crate::week::{Week, DAYS_PER_WEEK};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to serialize week: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error("Failed to write {path}: {message}")]
    WriteError { path: String, message: String },
}

/// `<dir>/planner-<weekKey>.json`
pub fn default_export_path(dir: &Path, week_key: &str) -> PathBuf {
    dir.join(format!("planner-{}.json", week_key))
}

/// Write the week as pretty-printed JSON, creating parent directories as needed
pub fn export_json(data: &WeekData, path: &Path) -> Result<(), ExportError> {
    let write_error = |e: std::io::Error| ExportError::WriteError {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let json = serde_json::to_string_pretty(data)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
    }
    fs::write(path, json).map_err(write_error)?;
    tracing::info!(path = %path.display(), "week exported");
    Ok(())
}

fn money(amount: f64) -> String {
    format!("{:.0}", amount)
}

/// Plain-text rendering of a week for printing
pub fn render_print_view(data: &WeekData, week: &Week, today: NaiveDate) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_print_view(&mut out, data, week, today);
    out
}

fn write_print_view(out: &mut String, data: &WeekData, week: &Week, today: NaiveDate) -> std::fmt::Result {
    writeln!(out, "Week {}", week.label())?;
    writeln!(out, "\"{}\"", data.quote)?;
    writeln!(out)?;

    for index in 0..DAYS_PER_WEEK {
        let date = JalaliDate::from_gregorian(data.day_date(index, week));
        let marker = if week.index_of(today) == Some(index) { " (today)" } else { "" };
        writeln!(out, "== {} {}{}", jalali::WEEKDAY_NAMES_LATIN[index], date, marker)?;

        let Some(day) = data.day(index) else {
            writeln!(out, "   -")?;
            continue;
        };
        for (slot, priority) in day.priorities.iter().enumerate() {
            if !priority.trim().is_empty() {
                writeln!(out, "   {}. {}", slot + 1, priority)?;
            }
        }
        for event in &day.events {
            writeln!(out, "   {} {}", event.time, event.text)?;
        }
        for task in &day.tasks {
            writeln!(out, "   [{}] {}", if task.completed { "x" } else { " " }, task.text)?;
        }
        if !day.tasks.is_empty() {
            writeln!(out, "   progress {}%", day.progress())?;
        }
    }

    if !data.reminders.is_empty() {
        writeln!(out)?;
        writeln!(out, "Reminders")?;
        for reminder in &data.reminders {
            writeln!(out, "   [{}] {}", if reminder.completed { "x" } else { " " }, reminder.text)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Habits ({}%)", data.habit_progress())?;
    for habit in &data.habits {
        let checks: String = (0..DAYS_PER_WEEK)
            .map(|d| if habit.is_checked(d) { '#' } else { '.' })
            .collect();
        writeln!(out, "   {} {}", checks, habit.name)?;
    }

    if !data.assignments.is_empty() {
        let stats = data.assignment_stats();
        writeln!(out)?;
        writeln!(
            out,
            "Assignments ({}/{} submitted, {} high priority pending)",
            stats.completed, stats.total, stats.high_priority
        )?;
        for a in &data.assignments {
            writeln!(
                out,
                "   {} {} [{}] {} {} ({}) {}",
                a.due_date,
                a.deadline_time,
                a.kind.label(),
                a.class_name,
                a.title,
                remaining_label(remaining_days(&a.due_date, today)),
                a.status.label()
            )?;
        }
    }

    let summary = data.finance.summary();
    writeln!(out)?;
    writeln!(out, "Finance")?;
    for category in FinanceCategory::ALL {
        let totals = summary.totals(category);
        writeln!(
            out,
            "   {:<9} budget {:>10}  actual {:>10}",
            category.label(),
            money(totals.budget),
            money(totals.actual)
        )?;
    }
    writeln!(out, "   daily ledger {}", money(summary.daily_total))?;
    writeln!(out, "   remaining to spend {}", money(summary.remaining_to_spend()))?;
    Ok(())
}
