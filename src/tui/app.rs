use std::path::PathBuf;
use std::time::Instant;

use chrono::NaiveDate;

use crate::calendar::{MonthGrid, MonthView};
use crate::jalali::{self, JalaliDate, PERSIAN_HOLIDAYS};
use crate::models::{Assignment, AssignmentType, Task, WeekData};
use crate::quote::{self, GeminiClient, QuoteSource};
use crate::store::PlannerStore;
use crate::tui::error::TuiError;
use crate::utils::{parse_key_binding, ParsedKeyBinding};
use crate::week::{Week, DAYS_PER_WEEK};
use crate::{export, Config, Database};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Planner,
    Assignments,
    Finance,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Planner, Tab::Assignments, Tab::Finance];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Planner => "Planner",
            Tab::Assignments => "Assignments",
            Tab::Finance => "Finance",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Planner => 0,
            Tab::Assignments => 1,
            Tab::Finance => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Help,
    /// Reset modal; the flag is true while "Reset" (not "Cancel") is selected
    ConfirmReset { reset_selected: bool },
}

/// Something a configured key binding can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Help,
    Save,
    Reset,
    Export,
    GenerateQuote,
    PrevWeek,
    NextWeek,
    CurrentWeek,
    PrevMonth,
    NextMonth,
    NextTab,
    GoToTab(Tab),
    DayLeft,
    DayRight,
    ListUp,
    ListDown,
    Toggle,
    CycleFilter,
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub current_tab: Tab,
    pub mode: Mode,
    pub month_view: MonthView,
    /// Day of the week shown in the planner, 0 = Saturday
    pub focused_day: usize,
    pub task_index: usize,
    pub assignment_index: usize,
    pub assignment_filter: Option<AssignmentType>,
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
    pub last_saved: Option<String>,
    /// The week has edits that are not in the store yet
    pub dirty: bool,
}

pub struct App {
    pub config: Config,
    pub store: PlannerStore<Database>,
    pub today: NaiveDate,
    pub week: Week,
    pub data: WeekData,
    pub ui: UiState,
    pub status: StatusState,
    key_map: Vec<(ParsedKeyBinding, Action)>,
}

impl App {
    pub fn new(config: Config, database: Database, week_offset: i64) -> Result<Self, TuiError> {
        let today = chrono::Local::now().date_naive();
        Self::with_today(config, database, today, week_offset)
    }

    /// Build the app as if the current date were `today`
    pub fn with_today(config: Config, database: Database, today: NaiveDate, week_offset: i64) -> Result<Self, TuiError> {
        let key_map = build_key_map(&config)?;
        let store = PlannerStore::new(database);
        let week = Week::from_offset(today, week_offset).ok_or(TuiError::WeekOutOfRange(week_offset))?;
        let data = store.load(&week.key());

        Ok(Self {
            config,
            store,
            today,
            week,
            data,
            ui: UiState {
                current_tab: Tab::Planner,
                mode: Mode::View,
                month_view: MonthView::containing(jalali::today_from(today)),
                focused_day: week.index_of(today).unwrap_or(0),
                task_index: 0,
                assignment_index: 0,
                assignment_filter: None,
            },
            status: StatusState::default(),
            key_map,
        })
    }

    /// Action bound to `event`, if any
    pub fn action_for(&self, event: &crossterm::event::KeyEvent) -> Option<Action> {
        self.key_map
            .iter()
            .find(|(binding, _)| binding.matches(event))
            .map(|(_, action)| *action)
    }

    /// Apply an action; returns true when the app should quit
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => {
                if self.status.dirty {
                    tracing::info!(week = %self.week.key(), "quitting with unsaved changes");
                }
                return true;
            }
            Action::Help => self.ui.mode = Mode::Help,
            Action::Save => {
                if self.save() {
                    let saved = self.status.last_saved.clone().unwrap_or_default();
                    self.set_status_message(format!("Saved at {}", saved));
                }
            }
            Action::Reset => self.ui.mode = Mode::ConfirmReset { reset_selected: false },
            Action::Export => self.export(),
            Action::GenerateQuote => self.generate_quote_from_config(),
            Action::PrevWeek => self.change_week(self.week.offset - 1),
            Action::NextWeek => self.change_week(self.week.offset + 1),
            Action::CurrentWeek => self.change_week(0),
            Action::PrevMonth => self.ui.month_view = self.ui.month_view.prev(),
            Action::NextMonth => self.ui.month_view = self.ui.month_view.next(),
            Action::NextTab => self.switch_tab(self.ui.current_tab.next()),
            Action::GoToTab(tab) => self.switch_tab(tab),
            Action::DayLeft => self.move_day(-1),
            Action::DayRight => self.move_day(1),
            Action::ListUp => self.move_selection(-1),
            Action::ListDown => self.move_selection(1),
            Action::Toggle => self.toggle_selected(),
            Action::CycleFilter => self.cycle_assignment_filter(),
        }
        false
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.ui.current_tab = tab;
    }

    /// Load the week at `offset`; unsaved edits of the current week are dropped
    pub fn change_week(&mut self, offset: i64) {
        if offset == self.week.offset {
            return;
        }
        let Some(week) = Week::from_offset(self.today, offset) else {
            self.set_status_message(format!("Week offset {} is out of range", offset));
            return;
        };
        if self.status.dirty {
            self.set_status_message(format!("Unsaved changes to {} discarded", self.week.label()));
        }
        self.week = week;
        self.data = self.store.load(&self.week.key());
        self.status.dirty = false;
        self.ui.focused_day = self.week.index_of(self.today).unwrap_or(0);
        self.ui.task_index = 0;
        self.ui.assignment_index = 0;
        self.ui.month_view = MonthView::containing(self.week.start_jalali());
    }

    pub fn move_day(&mut self, delta: i64) {
        let day = (self.ui.focused_day as i64 + delta).clamp(0, DAYS_PER_WEEK as i64 - 1);
        if day as usize != self.ui.focused_day {
            self.ui.focused_day = day as usize;
            self.ui.task_index = 0;
        }
    }

    pub fn focused_tasks(&self) -> &[Task] {
        self.data
            .day(self.ui.focused_day)
            .map(|d| d.tasks.as_slice())
            .unwrap_or(&[])
    }

    pub fn focused_date(&self) -> JalaliDate {
        JalaliDate::from_gregorian(self.data.day_date(self.ui.focused_day, &self.week))
    }

    pub fn visible_assignments(&self) -> Vec<&Assignment> {
        self.data.assignments_of_type(self.ui.assignment_filter)
    }

    pub fn move_selection(&mut self, delta: i64) {
        let (index, len) = match self.ui.current_tab {
            Tab::Planner => (&mut self.ui.task_index, self.data.day(self.ui.focused_day).map_or(0, |d| d.tasks.len())),
            Tab::Assignments => (
                &mut self.ui.assignment_index,
                self.data.assignments_of_type(self.ui.assignment_filter).len(),
            ),
            Tab::Finance => return,
        };
        if len == 0 {
            *index = 0;
            return;
        }
        *index = (*index as i64 + delta).clamp(0, len as i64 - 1) as usize;
    }

    /// Toggle the selected task, or cycle the selected assignment's status
    pub fn toggle_selected(&mut self) {
        match self.ui.current_tab {
            Tab::Planner => {
                let Some(id) = self.focused_tasks().get(self.ui.task_index).map(|t| t.id.clone()) else {
                    return;
                };
                let result = self
                    .data
                    .day_mut(self.ui.focused_day, &self.week)
                    .and_then(|day| day.toggle_task(&id));
                match result {
                    Ok(()) => self.status.dirty = true,
                    Err(e) => self.set_status_message(format!("Failed to toggle task: {}", e)),
                }
            }
            Tab::Assignments => {
                let Some(id) = self.visible_assignments().get(self.ui.assignment_index).map(|a| a.id.clone()) else {
                    return;
                };
                let mut label = "";
                let result = self.data.update_assignment(&id, |a| {
                    a.status = a.status.cycle();
                    label = a.status.label();
                });
                match result {
                    Ok(()) => {
                        self.status.dirty = true;
                        self.set_status_message(format!("Status: {}", label));
                    }
                    Err(e) => self.set_status_message(format!("Failed to update assignment: {}", e)),
                }
            }
            Tab::Finance => {}
        }
    }

    /// All types, then each type in turn
    pub fn cycle_assignment_filter(&mut self) {
        if self.ui.current_tab != Tab::Assignments {
            return;
        }
        self.ui.assignment_filter = match self.ui.assignment_filter {
            None => Some(AssignmentType::ALL[0]),
            Some(current) => AssignmentType::ALL
                .iter()
                .position(|t| *t == current)
                .and_then(|i| AssignmentType::ALL.get(i + 1))
                .copied(),
        };
        self.ui.assignment_index = 0;
    }

    pub fn month_grid(&self) -> MonthGrid {
        let view = self.ui.month_view;
        let first_weekday = self
            .config
            .calendar
            .first_weekday
            .first_weekday(view.year, view.month, self.today);
        let holidays = if self.config.calendar.show_holidays { PERSIAN_HOLIDAYS } else { &[] };
        MonthGrid::build(view, first_weekday, holidays, jalali::today_from(self.today))
    }

    /// Persist the current week, the only path that writes edits; failures go to the status bar
    pub fn save(&mut self) -> bool {
        match self.store.save(&self.week.key(), &self.data) {
            Ok(()) => {
                self.status.last_saved = Some(chrono::Local::now().format("%H:%M").to_string());
                self.status.dirty = false;
                true
            }
            Err(e) => {
                tracing::error!(week = %self.week.key(), error = %e, "failed to save week");
                self.set_status_message(format!("Failed to save: {}", e));
                false
            }
        }
    }

    pub fn export_path(&self) -> PathBuf {
        export::default_export_path(&self.config.get_export_dir(), &self.week.key())
    }

    pub fn export(&mut self) {
        let path = self.export_path();
        match export::export_json(&self.data, &path) {
            Ok(()) => self.set_status_message(format!("Exported to {}", path.display())),
            Err(e) => self.set_status_message(format!("Export failed: {}", e)),
        }
    }

    fn generate_quote_from_config(&mut self) {
        match GeminiClient::from_config(&self.config.quote) {
            Ok(client) => self.generate_quote(&client),
            Err(e) => self.set_status_message(format!("Quote unchanged: {}", e)),
        }
    }

    pub fn generate_quote(&mut self, source: &dyn QuoteSource) {
        if quote::refresh_quote(&mut self.data, source) {
            self.status.dirty = true;
            self.set_status_message("New quote generated".to_string());
        } else {
            self.set_status_message("Quote unchanged: generation failed".to_string());
        }
    }

    pub fn confirm_reset(&mut self) {
        self.ui.mode = Mode::View;
        match self.store.reset(&self.week.key()) {
            Ok(data) => {
                self.data = data;
                self.status.dirty = false;
                self.ui.task_index = 0;
                self.ui.assignment_index = 0;
                self.set_status_message("Week reset".to_string());
            }
            Err(e) => self.set_status_message(format!("Failed to reset week: {}", e)),
        }
    }

    pub fn cancel_modal(&mut self) {
        self.ui.mode = Mode::View;
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    /// Check if status message should be auto-cleared (after 3 seconds)
    pub fn check_status_message_timeout(&mut self) {
        const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 3;
        if let Some(time) = self.status.message_time {
            if time.elapsed().as_secs() >= STATUS_MESSAGE_TIMEOUT_SECS {
                self.clear_status_message();
            }
        }
    }
}

fn build_key_map(config: &Config) -> Result<Vec<(ParsedKeyBinding, Action)>, TuiError> {
    let kb = &config.key_bindings;
    let pairs = [
        (&kb.quit, Action::Quit),
        (&kb.help, Action::Help),
        (&kb.save, Action::Save),
        (&kb.reset, Action::Reset),
        (&kb.export, Action::Export),
        (&kb.generate_quote, Action::GenerateQuote),
        (&kb.prev_week, Action::PrevWeek),
        (&kb.next_week, Action::NextWeek),
        (&kb.current_week, Action::CurrentWeek),
        (&kb.prev_month, Action::PrevMonth),
        (&kb.next_month, Action::NextMonth),
        (&kb.next_tab, Action::NextTab),
        (&kb.tab_1, Action::GoToTab(Tab::Planner)),
        (&kb.tab_2, Action::GoToTab(Tab::Assignments)),
        (&kb.tab_3, Action::GoToTab(Tab::Finance)),
        (&kb.day_left, Action::DayLeft),
        (&kb.day_right, Action::DayRight),
        (&kb.list_up, Action::ListUp),
        (&kb.list_down, Action::ListDown),
        (&kb.toggle, Action::Toggle),
        (&kb.cycle_filter, Action::CycleFilter),
    ];
    pairs
        .into_iter()
        .map(|(binding, action)| {
            parse_key_binding(binding)
                .map(|parsed| (parsed, action))
                .map_err(TuiError::KeyBindingError)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayData;
    use crate::planner::NewAssignment;
    use crate::quote::QuoteError;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn app() -> App {
        App::with_today(Config::default(), Database::in_memory().unwrap(), ymd(2024, 3, 20), 0).unwrap()
    }

    fn app_with_tasks() -> App {
        let mut app = app();
        let mut day = DayData::for_date(ymd(2024, 3, 20));
        day.add_task("one".to_string());
        day.add_task("two".to_string());
        app.data.days.insert("day_4".to_string(), day);
        app
    }

    #[test]
    fn test_starts_on_today() {
        let app = app();
        assert_eq!(app.ui.focused_day, 4);
        assert_eq!(app.ui.month_view, MonthView::new(1403, 1));
        assert_eq!(app.week.key(), "jalali_1402-12-26");
    }

    #[test]
    fn test_default_bindings_resolve() {
        let app = app();
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(app.action_for(&key(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(app.action_for(&key(KeyCode::Char('2'))), Some(Action::GoToTab(Tab::Assignments)));
        assert_eq!(app.action_for(&key(KeyCode::Char(' '))), Some(Action::Toggle));
        assert_eq!(app.action_for(&KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)), Some(Action::Save));
        assert_eq!(app.action_for(&key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn test_bad_binding_is_rejected() {
        let mut config = Config::default();
        config.key_bindings.quit = "NotAKey".to_string();
        let result = App::with_today(config, Database::in_memory().unwrap(), ymd(2024, 3, 20), 0);
        assert!(matches!(result, Err(TuiError::KeyBindingError(_))));
    }

    #[test]
    fn test_toggle_task_persists_only_on_save() {
        let mut app = app_with_tasks();
        app.apply(Action::ListDown);
        app.apply(Action::ListDown);
        assert_eq!(app.ui.task_index, 1);
        app.apply(Action::Toggle);
        assert!(app.focused_tasks()[1].completed);
        assert!(app.status.dirty);
        assert!(app.store.load(&app.week.key()).day(4).is_none());

        app.apply(Action::Save);
        assert!(!app.status.dirty);
        assert!(app.status.last_saved.is_some());
        let stored = app.store.load(&app.week.key());
        assert!(stored.day(4).unwrap().tasks[1].completed);
    }

    #[test]
    fn test_day_navigation_is_clamped() {
        let mut app = app_with_tasks();
        app.apply(Action::ListDown);
        app.apply(Action::DayRight);
        assert_eq!(app.ui.focused_day, 5);
        assert_eq!(app.ui.task_index, 0);
        app.apply(Action::DayRight);
        app.apply(Action::DayRight);
        assert_eq!(app.ui.focused_day, 6);
        for _ in 0..10 {
            app.apply(Action::DayLeft);
        }
        assert_eq!(app.ui.focused_day, 0);
        assert!(app.focused_tasks().is_empty());
        assert_eq!(app.focused_date(), JalaliDate::new(1402, 12, 26).unwrap());
    }

    #[test]
    fn test_week_navigation_discards_unsaved_edits() {
        let mut app = app();
        let this_week = app.week.key();
        app.data.set_quote("unsaved edit".to_string());
        app.status.dirty = true;
        app.apply(Action::NextWeek);
        assert_eq!(app.week.key(), "jalali_1403-01-04");
        assert_eq!(app.data.quote, crate::models::DEFAULT_QUOTE);
        assert_eq!(app.ui.focused_day, 0);
        assert!(!app.status.dirty);
        assert!(app.status.message.as_deref().unwrap().contains("discarded"));
        assert_eq!(app.store.load(&this_week).quote, crate::models::DEFAULT_QUOTE);

        app.apply(Action::PrevWeek);
        assert_eq!(app.data.quote, crate::models::DEFAULT_QUOTE);
        assert_eq!(app.ui.focused_day, 4);

        app.data.set_quote("saved edit".to_string());
        app.apply(Action::Save);
        app.apply(Action::NextWeek);
        app.apply(Action::PrevWeek);
        assert_eq!(app.data.quote, "saved edit");

        app.apply(Action::NextWeek);
        app.apply(Action::NextWeek);
        app.apply(Action::CurrentWeek);
        assert_eq!(app.week.offset, 0);
    }

    #[test]
    fn test_month_navigation() {
        let mut app = app();
        app.apply(Action::PrevMonth);
        assert_eq!(app.ui.month_view, MonthView::new(1402, 12));
        let grid = app.month_grid();
        assert_eq!(grid.view, MonthView::new(1402, 12));
        assert!(grid.today_cell().is_none());
        app.apply(Action::NextMonth);
        assert!(app.month_grid().today_cell().is_some());
    }

    #[test]
    fn test_assignment_status_cycles_and_filter() {
        let mut app = app();
        let today = app.today;
        app.data.add_assignment(NewAssignment { title: "hw".to_string(), ..Default::default() }, today);
        app.data.add_assignment(
            NewAssignment { title: "final".to_string(), kind: Some(AssignmentType::Exam), ..Default::default() },
            today,
        );
        app.apply(Action::GoToTab(Tab::Assignments));
        app.apply(Action::Toggle);
        assert_eq!(app.data.assignments[0].status, crate::models::AssignmentStatus::InProgress);

        app.apply(Action::CycleFilter);
        assert_eq!(app.ui.assignment_filter, Some(AssignmentType::Homework));
        assert_eq!(app.visible_assignments().len(), 1);
        assert_eq!(app.visible_assignments()[0].title, "hw");
        for _ in 0..AssignmentType::ALL.len() {
            app.apply(Action::CycleFilter);
        }
        assert_eq!(app.ui.assignment_filter, None);
        assert_eq!(app.visible_assignments().len(), 2);
    }

    #[test]
    fn test_reset_goes_through_modal() {
        let mut app = app();
        app.data.set_quote("custom".to_string());
        app.save();
        app.apply(Action::Reset);
        assert_eq!(app.ui.mode, Mode::ConfirmReset { reset_selected: false });
        app.cancel_modal();
        assert_eq!(app.data.quote, "custom");

        app.apply(Action::Reset);
        app.confirm_reset();
        assert_eq!(app.ui.mode, Mode::View);
        assert_eq!(app.data, WeekData::default());
        assert_eq!(app.store.load(&app.week.key()), WeekData::default());
    }

    struct Failing;

    impl QuoteSource for Failing {
        fn generate(&self, _tasks: &[String]) -> Result<String, QuoteError> {
            Err(QuoteError::Empty)
        }
    }

    #[test]
    fn test_failed_quote_keeps_quote() {
        let mut app = app();
        app.generate_quote(&Failing);
        assert_eq!(app.data.quote, crate::models::DEFAULT_QUOTE);
        assert!(app.status.message.as_deref().unwrap().starts_with("Quote unchanged"));
    }

    #[test]
    fn test_quit_does_not_save() {
        let mut app = app_with_tasks();
        app.status.dirty = true;
        assert!(app.apply(Action::Quit));
        assert!(app.store.load(&app.week.key()).day(4).is_none());
    }

    #[test]
    fn test_out_of_range_week() {
        let result = App::with_today(Config::default(), Database::in_memory().unwrap(), ymd(2024, 3, 20), i64::MAX);
        assert!(matches!(result, Err(TuiError::WeekOutOfRange(i64::MAX))));

        let mut app = app();
        app.change_week(i64::MAX / 2);
        assert_eq!(app.week.offset, 0);
        assert!(app.status.message.as_deref().unwrap().contains("out of range"));
    }
}
