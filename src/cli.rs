use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::calendar::{MonthGrid, MonthView};
use crate::config::Config;
use crate::database::{Database, DatabaseError};
use crate::export::{self, ExportError};
use crate::jalali::{self, PERSIAN_HOLIDAYS};
use crate::models::{
    AssignmentPriority, AssignmentStatus, AssignmentType, FinanceCategory, WeekData, DEFAULT_EVENT_TIME,
    DEFAULT_HABIT_NAME,
};
use crate::planner::{remaining_days, remaining_label, NewAssignment, PlannerError};
use crate::quote::{self, GeminiClient, QuoteSource};
use crate::store::{KeyValueStore, PlannerStore, StoreError};
use crate::utils::{parse_date, parse_time};
use crate::week::{day_key, Week, DAYS_PER_WEEK};

#[derive(Parser)]
#[command(name = "jplan")]
#[command(about = "Weekly planner on the Persian (Jalali) calendar")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long, global = true)]
    pub dev: bool,

    /// Week to work on, relative to the current one (-1 is last week)
    #[arg(short, long, global = true, default_value_t = 0, allow_negative_numbers = true)]
    pub week: i64,

    /// Do not ask before destructive actions
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// List stored weeks
    Weeks,
    #[command(flatten)]
    Planner(PlannerCommand),
}

/// Commands that read or change a single week
#[derive(Subcommand)]
pub enum PlannerCommand {
    /// Show today's Persian date
    Today,
    /// Print a month of the Persian calendar
    Calendar {
        /// Persian year (defaults to the current one)
        #[arg(long)]
        year: Option<i32>,
        /// Persian month 1-12 (defaults to the current one)
        #[arg(long)]
        month: Option<u32>,
    },
    /// Print the week
    Show {
        /// Also list entry ids
        #[arg(long)]
        ids: bool,
    },
    /// Export the week as JSON
    Export {
        /// Output file (defaults to planner-<week>.json in the export directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Reset the week to the default record
    Reset,
    /// Weekly quote
    #[command(subcommand)]
    Quote(QuoteCommand),
    /// Daily tasks
    #[command(subcommand)]
    Task(TaskCommand),
    /// Daily schedule entries
    #[command(subcommand)]
    Event(EventCommand),
    /// Daily top priorities
    #[command(subcommand)]
    Priority(PriorityCommand),
    /// Weekly reminders
    #[command(subcommand)]
    Reminder(ReminderCommand),
    /// Habit tracker
    #[command(subcommand)]
    Habit(HabitCommand),
    /// Academic assignments
    #[command(subcommand)]
    Assignment(AssignmentCommand),
    /// Budget and daily ledger
    #[command(subcommand)]
    Finance(FinanceCommand),
}

#[derive(Subcommand)]
pub enum QuoteCommand {
    /// Replace the quote
    Set { text: String },
    /// Ask the text-generation service for a quote based on this week's tasks
    Generate,
}

#[derive(Subcommand)]
pub enum TaskCommand {
    Add {
        /// Day: 0-6 (0 = Saturday) or a name like "sat"
        #[arg(value_parser = parse_day)]
        day: usize,
        text: String,
    },
    Toggle {
        #[arg(value_parser = parse_day)]
        day: usize,
        /// Task id or unique prefix
        id: String,
    },
    Edit {
        #[arg(value_parser = parse_day)]
        day: usize,
        id: String,
        text: String,
    },
    Remove {
        #[arg(value_parser = parse_day)]
        day: usize,
        id: String,
    },
}

#[derive(Subcommand)]
pub enum EventCommand {
    Add {
        #[arg(value_parser = parse_day)]
        day: usize,
        text: String,
        /// Time as HH:MM
        #[arg(long, default_value = DEFAULT_EVENT_TIME)]
        time: String,
    },
    Edit {
        #[arg(value_parser = parse_day)]
        day: usize,
        id: String,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        text: Option<String>,
    },
    Remove {
        #[arg(value_parser = parse_day)]
        day: usize,
        id: String,
    },
}

#[derive(Subcommand)]
pub enum PriorityCommand {
    /// Set priority slot 1-5 of a day; an empty text clears it
    Set {
        #[arg(value_parser = parse_day)]
        day: usize,
        slot: usize,
        #[arg(default_value = "")]
        text: String,
    },
}

#[derive(Subcommand)]
pub enum ReminderCommand {
    Add { text: String },
    Toggle { id: String },
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum HabitCommand {
    Add { name: Option<String> },
    Rename { id: String, name: String },
    /// Tick or untick a habit on one day
    Toggle {
        id: String,
        #[arg(value_parser = parse_day)]
        day: usize,
    },
    Remove { id: String },
}

#[derive(Subcommand)]
pub enum AssignmentCommand {
    Add {
        title: String,
        #[arg(long = "class")]
        class_name: Option<String>,
        #[arg(long = "type", value_enum)]
        kind: Option<AssignmentType>,
        #[arg(long, value_enum)]
        priority: Option<AssignmentPriority>,
        /// Due date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        due: Option<String>,
        /// Deadline time (HH:MM)
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long = "class")]
        class_name: Option<String>,
        #[arg(long = "type", value_enum)]
        kind: Option<AssignmentType>,
        #[arg(long, value_enum)]
        priority: Option<AssignmentPriority>,
        #[arg(long, value_enum)]
        status: Option<AssignmentStatus>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        grade: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Remove { id: String },
    List {
        #[arg(long = "type", value_enum)]
        kind: Option<AssignmentType>,
    },
}

#[derive(Subcommand)]
pub enum FinanceCommand {
    AddItem {
        #[arg(value_enum)]
        category: FinanceCategory,
        label: String,
        #[arg(long, default_value_t = 0.0)]
        budget: f64,
        #[arg(long, default_value_t = 0.0)]
        actual: f64,
    },
    UpdateItem {
        #[arg(value_enum)]
        category: FinanceCategory,
        id: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long)]
        actual: Option<f64>,
    },
    RemoveItem {
        #[arg(value_enum)]
        category: FinanceCategory,
        id: String,
    },
    /// Record a daily expense
    AddTx {
        #[arg(value_parser = parse_day)]
        day: usize,
        label: String,
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },
    RemoveTx { id: String },
    Summary,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error("Storage error: {0}")]
    StoreError(#[from] StoreError),
    #[error("{0}")]
    PlannerError(#[from] PlannerError),
    #[error("Export failed: {0}")]
    ExportError(#[from] ExportError),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Id '{0}' matches more than one entry")]
    AmbiguousId(String),
}

/// Parse a day of the week: 0-6 (0 = Saturday) or an English name such as "sat"
pub fn parse_day(s: &str) -> Result<usize, String> {
    if let Ok(index) = s.parse::<usize>() {
        return if index < DAYS_PER_WEEK {
            Ok(index)
        } else {
            Err(format!("day must be 0-6, got {}", index))
        };
    }
    let lower = s.trim().to_lowercase();
    if lower.len() >= 2 {
        if let Some(index) = jalali::WEEKDAY_NAMES_LATIN
            .iter()
            .position(|name| name.to_lowercase().starts_with(&lower))
        {
            return Ok(index);
        }
    }
    Err(format!("unknown day '{}'", s))
}

/// Expand an id prefix to the one full id it matches
///
/// Unmatched ids are passed through so the lookup reports them as not found.
pub fn resolve_id<'a>(ids: impl IntoIterator<Item = &'a str>, given: &str) -> Result<String, CliError> {
    let mut found = Vec::new();
    for id in ids {
        if id == given {
            return Ok(id.to_string());
        }
        if id.starts_with(given) {
            found.push(id);
        }
    }
    match found.as_slice() {
        [] => Ok(given.to_string()),
        [one] => Ok(one.to_string()),
        _ => Err(CliError::AmbiguousId(given.to_string())),
    }
}

/// First eight characters of an id, for listings
pub fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(i, _)| &id[..i])
}

fn invalid(message: String) -> CliError {
    CliError::InvalidArgument(message)
}

fn parse_due(due: &str) -> Result<NaiveDate, CliError> {
    parse_date(due).map_err(|e| invalid(format!("Invalid date format '{}': {}", due, e)))
}

fn parse_clock(time: &str) -> Result<String, CliError> {
    parse_time(time).map_err(|e| invalid(format!("Invalid time '{}': {}", time, e)))
}

/// Ask a yes/no question on stdin; anything but "y"/"yes" means no
pub fn prompt_confirm(question: &str) -> bool {
    print!("{} [y/N] ", question);
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

const ABORTED: &str = "Aborted";

/// Store, config and the week a command works on
pub struct CliContext<S: KeyValueStore> {
    pub store: PlannerStore<S>,
    pub config: Config,
    pub week: Week,
    pub today: NaiveDate,
}

impl<S: KeyValueStore> CliContext<S> {
    /// Fails when `week_offset` points outside the supported date range
    pub fn new(store: S, config: Config, today: NaiveDate, week_offset: i64) -> Result<Self, CliError> {
        let week = Week::from_offset(today, week_offset)
            .ok_or_else(|| invalid(format!("Week offset {} is out of range", week_offset)))?;
        Ok(Self {
            store: PlannerStore::new(store),
            config,
            week,
            today,
        })
    }

    pub fn load(&self) -> WeekData {
        self.store.load(&self.week.key())
    }

    /// Load the week, apply `f` and save it back; nothing is saved when `f` fails
    fn mutate<T>(&mut self, f: impl FnOnce(&mut WeekData, &Week) -> Result<T, CliError>) -> Result<T, CliError> {
        let key = self.week.key();
        let mut data = self.store.load(&key);
        let result = f(&mut data, &self.week)?;
        self.store.save(&key, &data)?;
        Ok(result)
    }
}

/// Run one planner command and return what should be printed
pub fn run<S: KeyValueStore>(
    command: PlannerCommand,
    ctx: &mut CliContext<S>,
    confirm: &mut dyn FnMut(&str) -> bool,
) -> Result<String, CliError> {
    match command {
        PlannerCommand::Today => Ok(handle_today(ctx.today)),
        PlannerCommand::Calendar { year, month } => handle_calendar(&ctx.config, ctx.today, year, month),
        PlannerCommand::Show { ids } => {
            let data = ctx.load();
            let mut out = export::render_print_view(&data, &ctx.week, ctx.today);
            if ids {
                out.push('\n');
                out.push_str(&render_ids(&data));
            }
            Ok(out)
        }
        PlannerCommand::Export { out } => {
            let path = out.unwrap_or_else(|| export::default_export_path(&ctx.config.get_export_dir(), &ctx.week.key()));
            export::export_json(&ctx.load(), &path)?;
            Ok(format!("Exported to {}", path.display()))
        }
        PlannerCommand::Reset => {
            if !confirm(&format!("Reset week {} to defaults?", ctx.week.label())) {
                return Ok(ABORTED.to_string());
            }
            ctx.store.reset(&ctx.week.key())?;
            Ok("Week reset".to_string())
        }
        PlannerCommand::Quote(cmd) => match cmd {
            QuoteCommand::Set { text } => {
                ctx.mutate(|data, _| {
                    data.set_quote(text);
                    Ok(())
                })?;
                Ok("Quote updated".to_string())
            }
            QuoteCommand::Generate => match GeminiClient::from_config(&ctx.config.quote) {
                Ok(client) => generate_quote(ctx, &client),
                Err(e) => {
                    tracing::warn!(error = %e, "quote generation unavailable");
                    Ok(format!("Quote unchanged: {}", e))
                }
            },
        },
        PlannerCommand::Task(cmd) => handle_task(cmd, ctx, confirm),
        PlannerCommand::Event(cmd) => handle_event(cmd, ctx, confirm),
        PlannerCommand::Priority(PriorityCommand::Set { day, slot, text }) => {
            let index = slot.checked_sub(1).ok_or(PlannerError::PrioritySlotOutOfRange(slot))?;
            ctx.mutate(|data, week| Ok(data.day_mut(day, week)?.set_priority(index, text)?))?;
            Ok(format!("Priority {} set", slot))
        }
        PlannerCommand::Reminder(cmd) => handle_reminder(cmd, ctx, confirm),
        PlannerCommand::Habit(cmd) => handle_habit(cmd, ctx, confirm),
        PlannerCommand::Assignment(cmd) => handle_assignment(cmd, ctx, confirm),
        PlannerCommand::Finance(cmd) => handle_finance(cmd, ctx, confirm),
    }
}

/// Handle the weeks command
pub fn handle_weeks(db: &Database) -> Result<String, CliError> {
    let weeks = db.weeks()?;
    if weeks.is_empty() {
        return Ok("No weeks stored yet".to_string());
    }
    let mut out = String::new();
    for week in weeks {
        let _ = writeln!(out, "{}  (updated {})", week.key, week.updated_at);
    }
    Ok(out)
}

fn handle_today(today: NaiveDate) -> String {
    let date = jalali::today_from(today);
    let weekday = jalali::saturday_based_weekday(today) as usize;
    let mut out = format!(
        "{} {} {} {}\n{} {} ({})",
        jalali::WEEKDAY_NAMES[weekday],
        date.day,
        date.month_name(),
        date.year,
        jalali::WEEKDAY_NAMES_LATIN[weekday],
        date,
        today.format("%Y-%m-%d")
    );
    if let Some(holiday) = PERSIAN_HOLIDAYS
        .iter()
        .find(|h| h.month == date.month && h.day == date.day)
    {
        let _ = write!(out, "\nHoliday: {}", holiday.title);
    }
    out
}

fn handle_calendar(config: &Config, today: NaiveDate, year: Option<i32>, month: Option<u32>) -> Result<String, CliError> {
    let current = jalali::today_from(today);
    let view = MonthView::new(year.unwrap_or(current.year), month.unwrap_or(current.month));
    if !(1..=12).contains(&view.month) {
        return Err(invalid(format!("month must be 1-12, got {}", view.month)));
    }
    let first_weekday = config.calendar.first_weekday.first_weekday(view.year, view.month, today);
    let holidays = if config.calendar.show_holidays { PERSIAN_HOLIDAYS } else { &[] };
    Ok(MonthGrid::build(view, first_weekday, holidays, current).render_text())
}

/// Refresh the week's quote from `source`, keeping the old one on failure
pub fn generate_quote<S: KeyValueStore>(ctx: &mut CliContext<S>, source: &dyn QuoteSource) -> Result<String, CliError> {
    let updated = ctx.mutate(|data, _| Ok(quote::refresh_quote(data, source).then(|| data.quote.clone())))?;
    Ok(match updated {
        Some(quote) => format!("New quote: {}", quote),
        None => "Quote unchanged: generation failed (see log)".to_string(),
    })
}

fn handle_task<S: KeyValueStore>(
    cmd: TaskCommand,
    ctx: &mut CliContext<S>,
    confirm: &mut dyn FnMut(&str) -> bool,
) -> Result<String, CliError> {
    match cmd {
        TaskCommand::Add { day, text } => {
            let id = ctx.mutate(|data, week| Ok(data.day_mut(day, week)?.add_task(text).id.clone()))?;
            Ok(format!("Task added (ID: {})", short_id(&id)))
        }
        TaskCommand::Toggle { day, id } => {
            let done = ctx.mutate(|data, week| {
                let day = data.day_mut(day, week)?;
                let id = resolve_id(day.tasks.iter().map(|t| t.id.as_str()), &id)?;
                day.toggle_task(&id)?;
                Ok(day.tasks.iter().any(|t| t.id == id && t.completed))
            })?;
            Ok(if done { "Task completed" } else { "Task reopened" }.to_string())
        }
        TaskCommand::Edit { day, id, text } => {
            ctx.mutate(|data, week| {
                let day = data.day_mut(day, week)?;
                let id = resolve_id(day.tasks.iter().map(|t| t.id.as_str()), &id)?;
                Ok(day.update_task(&id, |t| t.text = text)?)
            })?;
            Ok("Task updated".to_string())
        }
        TaskCommand::Remove { day, id } => {
            if !confirm(&format!("Remove task {}?", id)) {
                return Ok(ABORTED.to_string());
            }
            ctx.mutate(|data, week| {
                let day = data.day_mut(day, week)?;
                let id = resolve_id(day.tasks.iter().map(|t| t.id.as_str()), &id)?;
                Ok(day.remove_task(&id)?)
            })?;
            Ok("Task removed".to_string())
        }
    }
}

fn handle_event<S: KeyValueStore>(
    cmd: EventCommand,
    ctx: &mut CliContext<S>,
    confirm: &mut dyn FnMut(&str) -> bool,
) -> Result<String, CliError> {
    match cmd {
        EventCommand::Add { day, text, time } => {
            let time = parse_clock(&time)?;
            let id = ctx.mutate(|data, week| Ok(data.day_mut(day, week)?.add_event(time, text).id.clone()))?;
            Ok(format!("Event added (ID: {})", short_id(&id)))
        }
        EventCommand::Edit { day, id, time, text } => {
            let time = time.as_deref().map(parse_clock).transpose()?;
            ctx.mutate(|data, week| {
                let day = data.day_mut(day, week)?;
                let id = resolve_id(day.events.iter().map(|e| e.id.as_str()), &id)?;
                Ok(day.update_event(&id, |e| {
                    if let Some(time) = time {
                        e.time = time;
                    }
                    if let Some(text) = text {
                        e.text = text;
                    }
                })?)
            })?;
            Ok("Event updated".to_string())
        }
        EventCommand::Remove { day, id } => {
            if !confirm(&format!("Remove event {}?", id)) {
                return Ok(ABORTED.to_string());
            }
            ctx.mutate(|data, week| {
                let day = data.day_mut(day, week)?;
                let id = resolve_id(day.events.iter().map(|e| e.id.as_str()), &id)?;
                Ok(day.remove_event(&id)?)
            })?;
            Ok("Event removed".to_string())
        }
    }
}

fn handle_reminder<S: KeyValueStore>(
    cmd: ReminderCommand,
    ctx: &mut CliContext<S>,
    confirm: &mut dyn FnMut(&str) -> bool,
) -> Result<String, CliError> {
    match cmd {
        ReminderCommand::Add { text } => {
            let id = ctx.mutate(|data, _| Ok(data.add_reminder(text).id.clone()))?;
            Ok(format!("Reminder added (ID: {})", short_id(&id)))
        }
        ReminderCommand::Toggle { id } => {
            ctx.mutate(|data, _| {
                let id = resolve_id(data.reminders.iter().map(|r| r.id.as_str()), &id)?;
                Ok(data.toggle_reminder(&id)?)
            })?;
            Ok("Reminder toggled".to_string())
        }
        ReminderCommand::Remove { id } => {
            if !confirm(&format!("Remove reminder {}?", id)) {
                return Ok(ABORTED.to_string());
            }
            ctx.mutate(|data, _| {
                let id = resolve_id(data.reminders.iter().map(|r| r.id.as_str()), &id)?;
                Ok(data.remove_reminder(&id)?)
            })?;
            Ok("Reminder removed".to_string())
        }
    }
}

fn handle_habit<S: KeyValueStore>(
    cmd: HabitCommand,
    ctx: &mut CliContext<S>,
    confirm: &mut dyn FnMut(&str) -> bool,
) -> Result<String, CliError> {
    match cmd {
        HabitCommand::Add { name } => {
            let name = name.unwrap_or_else(|| DEFAULT_HABIT_NAME.to_string());
            let id = ctx.mutate(|data, _| Ok(data.add_habit(name).id.clone()))?;
            Ok(format!("Habit added (ID: {})", short_id(&id)))
        }
        HabitCommand::Rename { id, name } => {
            ctx.mutate(|data, _| {
                let id = resolve_id(data.habits.iter().map(|h| h.id.as_str()), &id)?;
                Ok(data.rename_habit(&id, name)?)
            })?;
            Ok("Habit renamed".to_string())
        }
        HabitCommand::Toggle { id, day } => {
            ctx.mutate(|data, _| {
                let id = resolve_id(data.habits.iter().map(|h| h.id.as_str()), &id)?;
                Ok(data.toggle_habit(&id, day)?)
            })?;
            Ok("Habit toggled".to_string())
        }
        HabitCommand::Remove { id } => {
            if !confirm(&format!("Remove habit {}?", id)) {
                return Ok(ABORTED.to_string());
            }
            ctx.mutate(|data, _| {
                let id = resolve_id(data.habits.iter().map(|h| h.id.as_str()), &id)?;
                Ok(data.remove_habit(&id)?)
            })?;
            Ok("Habit removed".to_string())
        }
    }
}

fn handle_assignment<S: KeyValueStore>(
    cmd: AssignmentCommand,
    ctx: &mut CliContext<S>,
    confirm: &mut dyn FnMut(&str) -> bool,
) -> Result<String, CliError> {
    match cmd {
        AssignmentCommand::Add { title, class_name, kind, priority, due, time, description } => {
            let new = NewAssignment {
                class_name: class_name.unwrap_or_default(),
                title,
                kind,
                description: description.unwrap_or_default(),
                priority,
                due_date: due.as_deref().map(parse_due).transpose()?,
                deadline_time: time.as_deref().map(parse_clock).transpose()?,
            };
            let today = ctx.today;
            let id = ctx.mutate(|data, _| Ok(data.add_assignment(new, today).id.clone()))?;
            Ok(format!("Assignment added (ID: {})", short_id(&id)))
        }
        AssignmentCommand::Update { id, title, class_name, kind, priority, status, due, time, grade, description } => {
            let due = due.as_deref().map(parse_due).transpose()?;
            let time = time.as_deref().map(parse_clock).transpose()?;
            ctx.mutate(|data, _| {
                let id = resolve_id(data.assignments.iter().map(|a| a.id.as_str()), &id)?;
                Ok(data.update_assignment(&id, |a| {
                    if let Some(title) = title {
                        a.title = title;
                    }
                    if let Some(class_name) = class_name {
                        a.class_name = class_name;
                    }
                    if let Some(kind) = kind {
                        a.kind = kind;
                    }
                    if let Some(priority) = priority {
                        a.priority = priority;
                    }
                    if let Some(status) = status {
                        a.status = status;
                    }
                    if let Some(due) = due {
                        a.due_date = due.format("%Y-%m-%d").to_string();
                    }
                    if let Some(time) = time {
                        a.deadline_time = time;
                    }
                    if let Some(grade) = grade {
                        a.grade = grade;
                    }
                    if let Some(description) = description {
                        a.description = description;
                    }
                })?)
            })?;
            Ok("Assignment updated".to_string())
        }
        AssignmentCommand::Remove { id } => {
            if !confirm(&format!("Remove assignment {}?", id)) {
                return Ok(ABORTED.to_string());
            }
            ctx.mutate(|data, _| {
                let id = resolve_id(data.assignments.iter().map(|a| a.id.as_str()), &id)?;
                Ok(data.remove_assignment(&id)?)
            })?;
            Ok("Assignment removed".to_string())
        }
        AssignmentCommand::List { kind } => {
            let data = ctx.load();
            let stats = data.assignment_stats();
            let mut out = format!(
                "{} assignments, {} submitted, {} pending, {} high priority ({}% done)\n",
                stats.total,
                stats.completed,
                stats.pending,
                stats.high_priority,
                stats.completion_rate()
            );
            for a in data.assignments_of_type(kind) {
                let _ = writeln!(
                    out,
                    "{:<8} {} {} [{}] {} {} ({}) {} / {}",
                    short_id(&a.id),
                    a.due_date,
                    a.deadline_time,
                    a.kind.label(),
                    a.class_name,
                    a.title,
                    remaining_label(remaining_days(&a.due_date, ctx.today)),
                    a.status.label(),
                    a.priority.label()
                );
            }
            Ok(out)
        }
    }
}

fn handle_finance<S: KeyValueStore>(
    cmd: FinanceCommand,
    ctx: &mut CliContext<S>,
    confirm: &mut dyn FnMut(&str) -> bool,
) -> Result<String, CliError> {
    match cmd {
        FinanceCommand::AddItem { category, label, budget, actual } => {
            let id = ctx.mutate(|data, _| Ok(data.finance.add_item(category, label, budget, actual).id.clone()))?;
            Ok(format!("{} item added (ID: {})", category.label(), short_id(&id)))
        }
        FinanceCommand::UpdateItem { category, id, label, budget, actual } => {
            ctx.mutate(|data, _| {
                let id = resolve_id(data.finance.items(category).iter().map(|i| i.id.as_str()), &id)?;
                Ok(data.finance.update_item(category, &id, |item| {
                    if let Some(label) = label {
                        item.label = label;
                    }
                    if let Some(budget) = budget {
                        item.budget = budget;
                    }
                    if let Some(actual) = actual {
                        item.actual = actual;
                    }
                })?)
            })?;
            Ok(format!("{} item updated", category.label()))
        }
        FinanceCommand::RemoveItem { category, id } => {
            if !confirm(&format!("Remove {} item {}?", category.label(), id)) {
                return Ok(ABORTED.to_string());
            }
            ctx.mutate(|data, _| {
                let id = resolve_id(data.finance.items(category).iter().map(|i| i.id.as_str()), &id)?;
                Ok(data.finance.remove_item(category, &id)?)
            })?;
            Ok(format!("{} item removed", category.label()))
        }
        FinanceCommand::AddTx { day, label, amount } => {
            let id = ctx.mutate(|data, _| Ok(data.finance.add_transaction(day, label, amount)?.id.clone()))?;
            Ok(format!("Transaction added (ID: {})", short_id(&id)))
        }
        FinanceCommand::RemoveTx { id } => {
            if !confirm(&format!("Remove transaction {}?", id)) {
                return Ok(ABORTED.to_string());
            }
            ctx.mutate(|data, _| {
                let id = resolve_id(data.finance.daily_transactions.iter().map(|t| t.id.as_str()), &id)?;
                Ok(data.finance.remove_transaction(&id)?)
            })?;
            Ok("Transaction removed".to_string())
        }
        FinanceCommand::Summary => Ok(render_finance_summary(&ctx.load())),
    }
}

fn render_finance_summary(data: &WeekData) -> String {
    let summary = data.finance.summary();
    let mut out = String::new();
    for category in FinanceCategory::ALL {
        let totals = summary.totals(category);
        let _ = writeln!(out, "{:<9} budget {:>10.0}  actual {:>10.0}", category.label(), totals.budget, totals.actual);
        for item in data.finance.items(category) {
            let _ = writeln!(
                out,
                "  {:<8} {} {:.0}/{:.0} ({:.0}% left)",
                short_id(&item.id),
                item.label,
                item.actual,
                item.budget,
                item.remaining_percent()
            );
        }
    }
    let _ = writeln!(out, "Daily ledger {:.0}", summary.daily_total);
    for tx in &data.finance.daily_transactions {
        let _ = writeln!(
            out,
            "  {:<8} {} {} {:.0}",
            short_id(&tx.id),
            jalali::WEEKDAY_NAMES_LATIN.get(tx.day_index as usize).unwrap_or(&"?"),
            tx.label,
            tx.amount
        );
    }
    let _ = writeln!(out, "Current spending {:.0}", summary.current_spending());
    let _ = writeln!(out, "Remaining to spend {:.0}", summary.remaining_to_spend());
    out
}

/// Entry ids for use with the edit/toggle/remove commands
fn render_ids(data: &WeekData) -> String {
    let mut out = String::from("Ids\n");
    for index in 0..DAYS_PER_WEEK {
        let Some(day) = data.days.get(&day_key(index)) else {
            continue;
        };
        let name = jalali::WEEKDAY_NAMES_LATIN[index];
        for task in &day.tasks {
            let _ = writeln!(out, "  {:<8} {} task  {}", short_id(&task.id), name, task.text);
        }
        for event in &day.events {
            let _ = writeln!(out, "  {:<8} {} event {} {}", short_id(&event.id), name, event.time, event.text);
        }
    }
    for reminder in &data.reminders {
        let _ = writeln!(out, "  {:<8} reminder {}", short_id(&reminder.id), reminder.text);
    }
    for habit in &data.habits {
        let _ = writeln!(out, "  {:<8} habit {}", short_id(&habit.id), habit.name);
    }
    for a in &data.assignments {
        let _ = writeln!(out, "  {:<8} assignment {}", short_id(&a.id), a.title);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::QuoteError;
    use crate::store::MemoryStore;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn context() -> CliContext<MemoryStore> {
        CliContext::new(MemoryStore::new(), Config::default(), ymd(2024, 3, 20), 0).unwrap()
    }

    fn yes(_: &str) -> bool {
        true
    }

    fn no(_: &str) -> bool {
        false
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("0"), Ok(0));
        assert_eq!(parse_day("6"), Ok(6));
        assert_eq!(parse_day("sat"), Ok(0));
        assert_eq!(parse_day("Friday"), Ok(6));
        assert_eq!(parse_day("th"), Ok(5));
        assert_eq!(parse_day("tu"), Ok(3));
        assert!(parse_day("7").is_err());
        assert!(parse_day("s").is_err());
        assert!(parse_day("someday").is_err());
    }

    #[test]
    fn test_resolve_id() {
        let ids = ["abc123", "abd456", "1"];
        assert_eq!(resolve_id(ids, "abc").unwrap(), "abc123");
        assert_eq!(resolve_id(ids, "1").unwrap(), "1");
        assert_eq!(resolve_id(ids, "zzz").unwrap(), "zzz");
        assert!(matches!(resolve_id(ids, "ab"), Err(CliError::AmbiguousId(_))));
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("1"), "1");
    }

    #[test]
    fn test_task_lifecycle() {
        let mut ctx = context();
        run(PlannerCommand::Task(TaskCommand::Add { day: 4, text: "write essay".to_string() }), &mut ctx, &mut yes).unwrap();
        let id = ctx.load().day(4).unwrap().tasks[0].id.clone();

        let out = run(
            PlannerCommand::Task(TaskCommand::Toggle { day: 4, id: id[..6].to_string() }),
            &mut ctx,
            &mut yes,
        )
        .unwrap();
        assert_eq!(out, "Task completed");
        let day = ctx.load().day(4).cloned().unwrap();
        assert!(day.tasks[0].completed);
        assert_eq!(day.date, Some(ymd(2024, 3, 20)));

        run(PlannerCommand::Task(TaskCommand::Edit { day: 4, id: id.clone(), text: "essay".to_string() }), &mut ctx, &mut yes).unwrap();
        assert_eq!(ctx.load().day(4).unwrap().tasks[0].text, "essay");

        let out = run(PlannerCommand::Task(TaskCommand::Remove { day: 4, id: id.clone() }), &mut ctx, &mut no).unwrap();
        assert_eq!(out, ABORTED);
        assert_eq!(ctx.load().day(4).unwrap().tasks.len(), 1);

        run(PlannerCommand::Task(TaskCommand::Remove { day: 4, id }), &mut ctx, &mut yes).unwrap();
        assert!(ctx.load().day(4).unwrap().tasks.is_empty());
    }

    #[test]
    fn test_failed_mutation_is_not_saved() {
        let mut ctx = context();
        let err = run(
            PlannerCommand::Task(TaskCommand::Toggle { day: 2, id: "missing".to_string() }),
            &mut ctx,
            &mut yes,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::PlannerError(PlannerError::NotFound { .. })));
        // The day record created while looking up the task was discarded
        assert!(ctx.load().day(2).is_none());
    }

    #[test]
    fn test_event_time_is_validated() {
        let mut ctx = context();
        let cmd = EventCommand::Add { day: 1, text: "class".to_string(), time: "8:30".to_string() };
        run(PlannerCommand::Event(cmd), &mut ctx, &mut yes).unwrap();
        assert_eq!(ctx.load().day(1).unwrap().events[0].time, "08:30");

        let bad = EventCommand::Add { day: 1, text: "x".to_string(), time: "late".to_string() };
        assert!(matches!(run(PlannerCommand::Event(bad), &mut ctx, &mut yes), Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn test_priority_slots_are_one_based() {
        let mut ctx = context();
        let set = |slot| PlannerCommand::Priority(PriorityCommand::Set { day: 0, slot, text: "focus".to_string() });
        run(set(5), &mut ctx, &mut yes).unwrap();
        assert_eq!(ctx.load().day(0).unwrap().priorities[4], "focus");
        assert!(run(set(0), &mut ctx, &mut yes).is_err());
        assert!(run(set(6), &mut ctx, &mut yes).is_err());
    }

    #[test]
    fn test_assignments_are_prepended_and_filtered() {
        let mut ctx = context();
        let add = |title: &str, kind| {
            PlannerCommand::Assignment(AssignmentCommand::Add {
                title: title.to_string(),
                class_name: Some("Physics".to_string()),
                kind,
                priority: None,
                due: Some("2024-03-22".to_string()),
                time: None,
                description: None,
            })
        };
        run(add("lab report", None), &mut ctx, &mut yes).unwrap();
        run(add("midterm", Some(AssignmentType::Exam)), &mut ctx, &mut yes).unwrap();

        let data = ctx.load();
        assert_eq!(data.assignments[0].title, "midterm");
        assert_eq!(data.assignments[1].kind, AssignmentType::Homework);
        assert_eq!(data.assignments[1].deadline_time, "23:59");

        let id = data.assignments[0].id.clone();
        let update = AssignmentCommand::Update {
            id,
            title: None,
            class_name: None,
            kind: None,
            priority: None,
            status: Some(AssignmentStatus::Submitted),
            due: None,
            time: None,
            grade: Some("18".to_string()),
            description: None,
        };
        run(PlannerCommand::Assignment(update), &mut ctx, &mut yes).unwrap();

        let list = run(
            PlannerCommand::Assignment(AssignmentCommand::List { kind: Some(AssignmentType::Exam) }),
            &mut ctx,
            &mut yes,
        )
        .unwrap();
        assert!(list.starts_with("2 assignments, 1 submitted, 1 pending"));
        assert!(list.contains("midterm (2 days)"));
        assert!(!list.contains("lab report"));
    }

    #[test]
    fn test_invalid_due_date() {
        let mut ctx = context();
        let cmd = AssignmentCommand::Add {
            title: "x".to_string(),
            class_name: None,
            kind: None,
            priority: None,
            due: Some("22/03/2024".to_string()),
            time: None,
            description: None,
        };
        assert!(matches!(run(PlannerCommand::Assignment(cmd), &mut ctx, &mut yes), Err(CliError::InvalidArgument(_))));
        assert!(ctx.load().assignments.is_empty());
    }

    #[test]
    fn test_finance_summary() {
        let mut ctx = context();
        let income = ctx.load().finance.income[0].id.clone();
        run(
            PlannerCommand::Finance(FinanceCommand::UpdateItem {
                category: FinanceCategory::Income,
                id: income,
                label: None,
                budget: Some(1000.0),
                actual: Some(900.0),
            }),
            &mut ctx,
            &mut yes,
        )
        .unwrap();
        run(
            PlannerCommand::Finance(FinanceCommand::AddItem {
                category: FinanceCategory::Bills,
                label: "power".to_string(),
                budget: 100.0,
                actual: 80.0,
            }),
            &mut ctx,
            &mut yes,
        )
        .unwrap();
        run(PlannerCommand::Finance(FinanceCommand::AddTx { day: 0, label: "bread".to_string(), amount: 20.0 }), &mut ctx, &mut yes).unwrap();
        run(PlannerCommand::Finance(FinanceCommand::AddTx { day: 1, label: "bus".to_string(), amount: 5.0 }), &mut ctx, &mut yes).unwrap();

        let data = ctx.load();
        assert_eq!(data.finance.daily_transactions[0].label, "bus");

        let out = run(PlannerCommand::Finance(FinanceCommand::Summary), &mut ctx, &mut yes).unwrap();
        assert!(out.contains("Daily ledger 25"));
        assert!(out.contains("Current spending 25"));
        assert!(out.contains("Remaining to spend 795"));
        assert!(out.contains("power 80/100 (20% left)"));
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let mut ctx = context();
        run(PlannerCommand::Quote(QuoteCommand::Set { text: "mine".to_string() }), &mut ctx, &mut yes).unwrap();

        assert_eq!(run(PlannerCommand::Reset, &mut ctx, &mut no).unwrap(), ABORTED);
        assert_eq!(ctx.load().quote, "mine");

        run(PlannerCommand::Reset, &mut ctx, &mut yes).unwrap();
        assert_eq!(ctx.load(), WeekData::default());
    }

    #[test]
    fn test_week_offset_selects_another_record() {
        let mut store = MemoryStore::new();
        {
            let mut ctx = CliContext::new(store.clone(), Config::default(), ymd(2024, 3, 20), -1).unwrap();
            run(PlannerCommand::Reminder(ReminderCommand::Add { text: "old".to_string() }), &mut ctx, &mut yes).unwrap();
            assert_eq!(ctx.week.key(), "jalali_1402-12-19");
            store = ctx.store.inner().clone();
        }
        let ctx = CliContext::new(store, Config::default(), ymd(2024, 3, 20), 0).unwrap();
        assert!(ctx.load().reminders.is_empty());
    }

    struct Fixed(Result<&'static str, ()>);

    impl QuoteSource for Fixed {
        fn generate(&self, _tasks: &[String]) -> Result<String, QuoteError> {
            self.0.map(str::to_string).map_err(|_| QuoteError::Empty)
        }
    }

    #[test]
    fn test_generate_quote() {
        let mut ctx = context();
        let out = generate_quote(&mut ctx, &Fixed(Ok("onward"))).unwrap();
        assert_eq!(out, "New quote: onward");
        assert_eq!(ctx.load().quote, "onward");

        let out = generate_quote(&mut ctx, &Fixed(Err(()))).unwrap();
        assert!(out.starts_with("Quote unchanged"));
        assert_eq!(ctx.load().quote, "onward");
    }

    #[test]
    fn test_calendar_and_today() {
        let mut ctx = context();
        let out = run(PlannerCommand::Calendar { year: None, month: None }, &mut ctx, &mut yes).unwrap();
        assert!(out.contains("Farvardin 1403"));
        assert!(out.contains("  1*"));

        let err = run(PlannerCommand::Calendar { year: Some(1403), month: Some(13) }, &mut ctx, &mut yes);
        assert!(matches!(err, Err(CliError::InvalidArgument(_))));

        let today = run(PlannerCommand::Today, &mut ctx, &mut yes).unwrap();
        assert!(today.contains("Wednesday 1403/01/01 (2024-03-20)"));
        assert!(today.contains("Holiday: نوروز"));
    }

    #[test]
    fn test_show_with_ids() {
        let mut ctx = context();
        run(PlannerCommand::Habit(HabitCommand::Add { name: None }), &mut ctx, &mut yes).unwrap();
        let out = run(PlannerCommand::Show { ids: true }, &mut ctx, &mut yes).unwrap();
        assert!(out.contains("Habits (0%)"));
        assert!(out.contains(&format!("habit {}", DEFAULT_HABIT_NAME)));
        assert!(out.contains("1        habit ورزش روزانه"));
    }
}
