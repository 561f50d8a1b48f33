use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{
    Assignment, AssignmentPriority, AssignmentStatus, AssignmentType, DayData, Event, FinanceCategory,
    FinanceData, FinanceItem, Habit, Task, Transaction, WeekData, HABIT_DAYS, PRIORITY_SLOTS,
};
use crate::utils::parse_date;
use crate::week::{day_key, Week, DAYS_PER_WEEK};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlannerError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("Day index {0} is out of range (0-6, Saturday to Friday)")]
    DayOutOfRange(usize),
    #[error("Priority slot {0} is out of range (0-4)")]
    PrioritySlotOutOfRange(usize),
}

fn not_found(kind: &'static str, id: &str) -> PlannerError {
    PlannerError::NotFound { kind, id: id.to_string() }
}

fn check_day(index: usize) -> Result<(), PlannerError> {
    if index < DAYS_PER_WEEK {
        Ok(())
    } else {
        Err(PlannerError::DayOutOfRange(index))
    }
}

/// Apply `f` to the entry with `id`
fn update_by_id<T>(
    items: &mut [T],
    id: &str,
    kind: &'static str,
    key: impl Fn(&T) -> &str,
    f: impl FnOnce(&mut T),
) -> Result<(), PlannerError> {
    let item = items
        .iter_mut()
        .find(|item| key(item) == id)
        .ok_or_else(|| not_found(kind, id))?;
    f(item);
    Ok(())
}

/// Drop the entry with `id`, keeping the others in order
fn remove_by_id<T>(items: &mut Vec<T>, id: &str, kind: &'static str, key: impl Fn(&T) -> &str) -> Result<(), PlannerError> {
    let before = items.len();
    items.retain(|item| key(item) != id);
    if items.len() == before {
        Err(not_found(kind, id))
    } else {
        Ok(())
    }
}

/// Rounded percentage, 0 when there is nothing to count
pub fn percent(done: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        ((done as f64 / total as f64) * 100.0).round() as u32
    }
}

impl DayData {
    /// Set priority `slot`, padding the list back to five entries
    pub fn set_priority(&mut self, slot: usize, text: String) -> Result<(), PlannerError> {
        if slot >= PRIORITY_SLOTS {
            return Err(PlannerError::PrioritySlotOutOfRange(slot));
        }
        if self.priorities.len() < PRIORITY_SLOTS {
            self.priorities.resize(PRIORITY_SLOTS, String::new());
        }
        self.priorities[slot] = text;
        Ok(())
    }

    pub fn priority(&self, slot: usize) -> &str {
        self.priorities.get(slot).map(String::as_str).unwrap_or("")
    }

    pub fn add_task(&mut self, text: String) -> &Task {
        self.tasks.push(Task::new(text));
        &self.tasks[self.tasks.len() - 1]
    }

    pub fn update_task(&mut self, id: &str, f: impl FnOnce(&mut Task)) -> Result<(), PlannerError> {
        update_by_id(&mut self.tasks, id, "Task", |t| t.id.as_str(), f)
    }

    pub fn toggle_task(&mut self, id: &str) -> Result<(), PlannerError> {
        self.update_task(id, |t| t.completed = !t.completed)
    }

    pub fn remove_task(&mut self, id: &str) -> Result<(), PlannerError> {
        remove_by_id(&mut self.tasks, id, "Task", |t| t.id.as_str())
    }

    pub fn add_event(&mut self, time: String, text: String) -> &Event {
        self.events.push(Event::new(time, text));
        &self.events[self.events.len() - 1]
    }

    pub fn update_event(&mut self, id: &str, f: impl FnOnce(&mut Event)) -> Result<(), PlannerError> {
        update_by_id(&mut self.events, id, "Event", |e| e.id.as_str(), f)
    }

    pub fn remove_event(&mut self, id: &str) -> Result<(), PlannerError> {
        remove_by_id(&mut self.events, id, "Event", |e| e.id.as_str())
    }

    pub fn completed_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Percentage of completed tasks
    pub fn progress(&self) -> u32 {
        percent(self.completed_tasks(), self.tasks.len())
    }
}

impl Habit {
    /// Flip the check for `day`, padding checks back to seven days
    pub fn toggle(&mut self, day: usize) -> Result<(), PlannerError> {
        check_day(day)?;
        if self.checks.len() < HABIT_DAYS {
            self.checks.resize(HABIT_DAYS, false);
        }
        self.checks[day] = !self.checks[day];
        Ok(())
    }

    pub fn is_checked(&self, day: usize) -> bool {
        self.checks.get(day).copied().unwrap_or(false)
    }

    pub fn checked_days(&self) -> usize {
        self.checks.iter().filter(|c| **c).count()
    }
}

impl FinanceItem {
    /// Share of the budget left, as a percentage floored at 0
    pub fn remaining_percent(&self) -> f64 {
        if self.budget > 0.0 {
            ((self.budget - self.actual) / self.budget * 100.0).max(0.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub budget: f64,
    pub actual: f64,
}

impl Totals {
    pub fn of(items: &[FinanceItem]) -> Self {
        items.iter().fold(Self::default(), |acc, item| Self {
            budget: acc.budget + item.budget,
            actual: acc.actual + item.actual,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FinanceSummary {
    pub income: Totals,
    pub expenses: Totals,
    pub bills: Totals,
    pub debt: Totals,
    pub savings: Totals,
    pub daily_total: f64,
}

impl FinanceSummary {
    pub fn totals(&self, category: FinanceCategory) -> Totals {
        match category {
            FinanceCategory::Income => self.income,
            FinanceCategory::Expenses => self.expenses,
            FinanceCategory::Bills => self.bills,
            FinanceCategory::Debt => self.debt,
            FinanceCategory::Savings => self.savings,
        }
    }

    /// Fixed expenses plus the daily ledger
    pub fn current_spending(&self) -> f64 {
        self.expenses.actual + self.daily_total
    }

    pub fn remaining_to_spend(&self) -> f64 {
        self.income.actual
            - self.expenses.actual
            - self.bills.actual
            - self.debt.actual
            - self.savings.actual
            - self.daily_total
    }
}

impl FinanceData {
    pub fn summary(&self) -> FinanceSummary {
        FinanceSummary {
            income: Totals::of(&self.income),
            expenses: Totals::of(&self.expenses),
            bills: Totals::of(&self.bills),
            debt: Totals::of(&self.debt),
            savings: Totals::of(&self.savings),
            daily_total: self.daily_transactions.iter().map(|t| t.amount).sum(),
        }
    }

    pub fn add_item(&mut self, category: FinanceCategory, label: String, budget: f64, actual: f64) -> &FinanceItem {
        let items = self.items_mut(category);
        items.push(FinanceItem::new(label, budget, actual));
        &items[items.len() - 1]
    }

    pub fn update_item(
        &mut self,
        category: FinanceCategory,
        id: &str,
        f: impl FnOnce(&mut FinanceItem),
    ) -> Result<(), PlannerError> {
        update_by_id(self.items_mut(category), id, "Finance item", |i| i.id.as_str(), f)
    }

    pub fn remove_item(&mut self, category: FinanceCategory, id: &str) -> Result<(), PlannerError> {
        remove_by_id(self.items_mut(category), id, "Finance item", |i| i.id.as_str())
    }

    /// Newest transactions go first
    pub fn add_transaction(&mut self, day_index: usize, label: String, amount: f64) -> Result<&Transaction, PlannerError> {
        check_day(day_index)?;
        self.daily_transactions
            .insert(0, Transaction::new(day_index as u8, label, amount));
        Ok(&self.daily_transactions[0])
    }

    pub fn update_transaction(&mut self, id: &str, f: impl FnOnce(&mut Transaction)) -> Result<(), PlannerError> {
        update_by_id(&mut self.daily_transactions, id, "Transaction", |t| t.id.as_str(), f)
    }

    pub fn remove_transaction(&mut self, id: &str) -> Result<(), PlannerError> {
        remove_by_id(&mut self.daily_transactions, id, "Transaction", |t| t.id.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignmentStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub high_priority: usize,
}

impl AssignmentStats {
    pub fn completion_rate(&self) -> u32 {
        percent(self.completed, self.total)
    }
}

/// Whole days from `today` until `due_date`; 0 when the date is missing or unparseable
pub fn remaining_days(due_date: &str, today: NaiveDate) -> i64 {
    if due_date.is_empty() {
        return 0;
    }
    match parse_date(due_date) {
        Ok(due) => (due - today).num_days(),
        Err(_) => 0,
    }
}

pub fn remaining_label(days: i64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        d if d < 0 => "overdue".to_string(),
        d => format!("{} days", d),
    }
}

/// Fields for a new assignment; unset fields take the dashboard defaults
#[derive(Debug, Clone, Default)]
pub struct NewAssignment {
    pub class_name: String,
    pub title: String,
    pub kind: Option<AssignmentType>,
    pub description: String,
    pub priority: Option<AssignmentPriority>,
    pub due_date: Option<NaiveDate>,
    pub deadline_time: Option<String>,
}

impl WeekData {
    pub fn day(&self, index: usize) -> Option<&DayData> {
        self.days.get(&day_key(index))
    }

    /// Day record at `index`, created (and dated) on first access
    pub fn day_mut(&mut self, index: usize, week: &Week) -> Result<&mut DayData, PlannerError> {
        check_day(index)?;
        Ok(self
            .days
            .entry(day_key(index))
            .or_insert_with(|| DayData::for_date(week.day_date(index))))
    }

    /// Calendar date of day `index`, preferring the date stored with the record
    pub fn day_date(&self, index: usize, week: &Week) -> NaiveDate {
        self.day(index)
            .and_then(|d| d.date)
            .unwrap_or_else(|| week.day_date(index))
    }

    /// Non-empty task texts across the week, in day order
    pub fn task_texts(&self) -> Vec<String> {
        self.days
            .values()
            .flat_map(|d| d.tasks.iter())
            .filter(|t| !t.text.is_empty())
            .map(|t| t.text.clone())
            .collect()
    }

    pub fn set_quote(&mut self, quote: String) {
        self.quote = quote;
    }

    pub fn add_reminder(&mut self, text: String) -> &Task {
        self.reminders.push(Task::new(text));
        &self.reminders[self.reminders.len() - 1]
    }

    pub fn toggle_reminder(&mut self, id: &str) -> Result<(), PlannerError> {
        update_by_id(&mut self.reminders, id, "Reminder", |t| t.id.as_str(), |t| t.completed = !t.completed)
    }

    pub fn remove_reminder(&mut self, id: &str) -> Result<(), PlannerError> {
        remove_by_id(&mut self.reminders, id, "Reminder", |t| t.id.as_str())
    }

    pub fn add_habit(&mut self, name: String) -> &Habit {
        self.habits.push(Habit::new(name));
        &self.habits[self.habits.len() - 1]
    }

    pub fn rename_habit(&mut self, id: &str, name: String) -> Result<(), PlannerError> {
        update_by_id(&mut self.habits, id, "Habit", |h| h.id.as_str(), |h| h.name = name)
    }

    pub fn toggle_habit(&mut self, id: &str, day: usize) -> Result<(), PlannerError> {
        check_day(day)?;
        let habit = self
            .habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| not_found("Habit", id))?;
        habit.toggle(day)
    }

    pub fn remove_habit(&mut self, id: &str) -> Result<(), PlannerError> {
        remove_by_id(&mut self.habits, id, "Habit", |h| h.id.as_str())
    }

    /// Percentage of habit checks ticked this week
    pub fn habit_progress(&self) -> u32 {
        let checked: usize = self.habits.iter().map(Habit::checked_days).sum();
        percent(checked, self.habits.len() * HABIT_DAYS)
    }

    /// Newest assignments go first
    pub fn add_assignment(&mut self, new: NewAssignment, today: NaiveDate) -> &Assignment {
        let mut assignment = Assignment::new(new.due_date.unwrap_or(today));
        assignment.class_name = new.class_name;
        assignment.title = new.title;
        assignment.description = new.description;
        if let Some(kind) = new.kind {
            assignment.kind = kind;
        }
        if let Some(priority) = new.priority {
            assignment.priority = priority;
        }
        if let Some(time) = new.deadline_time {
            assignment.deadline_time = time;
        }
        self.assignments.insert(0, assignment);
        &self.assignments[0]
    }

    pub fn update_assignment(&mut self, id: &str, f: impl FnOnce(&mut Assignment)) -> Result<(), PlannerError> {
        update_by_id(&mut self.assignments, id, "Assignment", |a| a.id.as_str(), f)
    }

    pub fn remove_assignment(&mut self, id: &str) -> Result<(), PlannerError> {
        remove_by_id(&mut self.assignments, id, "Assignment", |a| a.id.as_str())
    }

    pub fn assignment_stats(&self) -> AssignmentStats {
        let submitted = |a: &&Assignment| a.status == AssignmentStatus::Submitted;
        AssignmentStats {
            total: self.assignments.len(),
            completed: self.assignments.iter().filter(submitted).count(),
            pending: self.assignments.iter().filter(|a| !submitted(a)).count(),
            high_priority: self
                .assignments
                .iter()
                .filter(|a| a.priority == AssignmentPriority::High && !submitted(a))
                .count(),
        }
    }

    /// Assignments of one type, or all of them when `kind` is None
    pub fn assignments_of_type(&self, kind: Option<AssignmentType>) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| kind.is_none_or(|k| a.kind == k))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn week() -> Week {
        Week::from_offset(ymd(2024, 3, 20), 0).unwrap()
    }

    #[test]
    fn test_day_mut_creates_dated_record() {
        let mut data = WeekData::default();
        let week = week();
        let day = data.day_mut(2, &week).unwrap();
        assert_eq!(day.date, Some(ymd(2024, 3, 18)));
        assert_eq!(day.priorities.len(), PRIORITY_SLOTS);
        assert!(data.days.contains_key("day_2"));
        assert_eq!(data.day_mut(7, &week).unwrap_err(), PlannerError::DayOutOfRange(7));
    }

    #[test]
    fn test_day_date_prefers_stored_date() {
        let mut data = WeekData::default();
        let week = week();
        data.days.insert(day_key(1), DayData::for_date(ymd(2020, 1, 1)));
        assert_eq!(data.day_date(1, &week), ymd(2020, 1, 1));
        assert_eq!(data.day_date(3, &week), ymd(2024, 3, 19));
    }

    #[test]
    fn test_priority_slots_pad_short_lists() {
        let mut day = DayData { priorities: vec!["a".to_string()], ..DayData::default() };
        day.set_priority(3, "d".to_string()).unwrap();
        assert_eq!(day.priorities, vec!["a", "", "", "d", ""]);
        assert_eq!(day.set_priority(5, String::new()), Err(PlannerError::PrioritySlotOutOfRange(5)));
    }

    #[test]
    fn test_task_crud_and_progress() {
        let mut day = DayData::default();
        let first = day.add_task("read".to_string()).id.clone();
        let second = day.add_task("write".to_string()).id.clone();
        day.add_task("rest".to_string());
        assert_eq!(day.tasks[0].id, first);
        assert_eq!(day.progress(), 0);

        day.toggle_task(&second).unwrap();
        assert_eq!(day.progress(), 33);
        day.update_task(&first, |t| t.text = "read more".to_string()).unwrap();
        assert_eq!(day.tasks[0].text, "read more");

        day.remove_task(&second).unwrap();
        assert_eq!(day.tasks.len(), 2);
        assert_eq!(day.tasks[0].id, first);
        assert!(matches!(day.remove_task(&second), Err(PlannerError::NotFound { .. })));
    }

    #[test]
    fn test_events_append() {
        let mut day = DayData::default();
        day.add_event("09:00".to_string(), "standup".to_string());
        let id = day.add_event("14:30".to_string(), "class".to_string()).id.clone();
        assert_eq!(day.events[1].id, id);
        day.update_event(&id, |e| e.time = "15:00".to_string()).unwrap();
        assert_eq!(day.events[1].time, "15:00");
        day.remove_event(&id).unwrap();
        assert_eq!(day.events.len(), 1);
    }

    #[test]
    fn test_habit_toggle_pads_checks() {
        let mut data = WeekData::default();
        data.habits[0].checks = vec![true];
        data.toggle_habit("1", 6).unwrap();
        assert_eq!(data.habits[0].checks, vec![true, false, false, false, false, false, true]);
        assert_eq!(data.toggle_habit("1", 7), Err(PlannerError::DayOutOfRange(7)));
        assert!(data.toggle_habit("missing", 0).is_err());
    }

    #[test]
    fn test_habit_progress() {
        let mut data = WeekData::default();
        assert_eq!(data.habit_progress(), 0);
        for day in 0..7 {
            data.toggle_habit("1", day).unwrap();
        }
        assert_eq!(data.habit_progress(), 33);
        let id = data.add_habit("meditate".to_string()).id.clone();
        assert_eq!(data.habits.last().map(|h| h.id.clone()), Some(id.clone()));
        data.rename_habit(&id, "stretch".to_string()).unwrap();
        assert_eq!(data.habits[3].name, "stretch");
        data.remove_habit("2").unwrap();
        assert_eq!(data.habits.len(), 3);
    }

    #[test]
    fn test_assignments_prepend_and_stats() {
        let mut data = WeekData::default();
        let today = ymd(2024, 3, 20);
        let older = data.add_assignment(NewAssignment { title: "essay".to_string(), ..Default::default() }, today).id.clone();
        let newer = data
            .add_assignment(
                NewAssignment {
                    title: "exam".to_string(),
                    kind: Some(AssignmentType::Exam),
                    priority: Some(AssignmentPriority::High),
                    ..Default::default()
                },
                today,
            )
            .id
            .clone();
        assert_eq!(data.assignments[0].id, newer);
        assert_eq!(data.assignments[1].id, older);
        assert_eq!(data.assignments[1].due_date, "2024-03-20");
        assert_eq!(data.assignments[1].grade, "NA");

        let stats = data.assignment_stats();
        assert_eq!(stats, AssignmentStats { total: 2, completed: 0, pending: 2, high_priority: 1 });

        data.update_assignment(&newer, |a| a.status = AssignmentStatus::Submitted).unwrap();
        let stats = data.assignment_stats();
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.high_priority, 0);
        assert_eq!(stats.completion_rate(), 50);

        assert_eq!(data.assignments_of_type(Some(AssignmentType::Exam)).len(), 1);
        assert_eq!(data.assignments_of_type(None).len(), 2);
        data.remove_assignment(&older).unwrap();
        assert_eq!(data.assignments.len(), 1);
    }

    #[test]
    fn test_remaining_days() {
        let today = ymd(2024, 3, 20);
        assert_eq!(remaining_days("2024-03-20", today), 0);
        assert_eq!(remaining_days("2024-03-21", today), 1);
        assert_eq!(remaining_days("2024-03-18", today), -2);
        assert_eq!(remaining_days("", today), 0);
        assert_eq!(remaining_days("soon", today), 0);
        assert_eq!(remaining_label(0), "today");
        assert_eq!(remaining_label(1), "tomorrow");
        assert_eq!(remaining_label(-3), "overdue");
        assert_eq!(remaining_label(5), "5 days");
    }

    #[test]
    fn test_transactions_prepend() {
        let mut finance = FinanceData::default();
        let first = finance.add_transaction(0, "bread".to_string(), 2.0).unwrap().id.clone();
        let second = finance.add_transaction(1, "bus".to_string(), 1.5).unwrap().id.clone();
        let third = finance.add_transaction(2, "coffee".to_string(), 3.0).unwrap().id.clone();
        let ids: Vec<_> = finance.daily_transactions.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec![third, second, first]);
        assert!(finance.add_transaction(7, String::new(), 0.0).is_err());
    }

    #[test]
    fn test_update_transaction() {
        let mut finance = FinanceData::default();
        let id = finance.add_transaction(3, "taxi".to_string(), 120.0).unwrap().id.clone();
        finance.update_transaction(&id, |t| t.amount = 150.0).unwrap();
        assert_eq!(finance.summary().daily_total, 150.0);
        assert!(matches!(
            finance.update_transaction("missing", |t| t.amount = 0.0),
            Err(PlannerError::NotFound { .. })
        ));
    }

    #[test]
    fn test_finance_summary() {
        let mut finance = FinanceData::default();
        let income_id = finance.income[0].id.clone();
        finance.update_item(FinanceCategory::Income, &income_id, |i| { i.budget = 1000.0; i.actual = 900.0; }).unwrap();
        finance.add_item(FinanceCategory::Bills, "power".to_string(), 100.0, 80.0);
        finance.add_item(FinanceCategory::Savings, "fund".to_string(), 200.0, 200.0);
        finance.add_item(FinanceCategory::Expenses, "rent".to_string(), 300.0, 300.0);
        finance.add_transaction(0, "food".to_string(), 20.0).unwrap();
        finance.add_transaction(1, "taxi".to_string(), 5.0).unwrap();

        let summary = finance.summary();
        assert_eq!(summary.income, Totals { budget: 1000.0, actual: 900.0 });
        assert_eq!(summary.daily_total, 25.0);
        assert_eq!(summary.current_spending(), 325.0);
        assert_eq!(summary.remaining_to_spend(), 900.0 - 300.0 - 80.0 - 200.0 - 25.0);
        assert_eq!(finance.expenses.len(), 2);
        assert_eq!(finance.expenses[1].label, "rent");
    }

    #[test]
    fn test_remaining_percent() {
        let item = FinanceItem::new("x".to_string(), 200.0, 50.0);
        assert_eq!(item.remaining_percent(), 75.0);
        let over = FinanceItem::new("x".to_string(), 100.0, 150.0);
        assert_eq!(over.remaining_percent(), 0.0);
        let unbudgeted = FinanceItem::new("x".to_string(), 0.0, 10.0);
        assert_eq!(unbudgeted.remaining_percent(), 0.0);
    }

    #[test]
    fn test_task_texts_skip_blank() {
        let mut data = WeekData::default();
        let week = week();
        data.day_mut(0, &week).unwrap().add_task("plan".to_string());
        data.day_mut(0, &week).unwrap().add_task(String::new());
        data.day_mut(4, &week).unwrap().add_task(" ship ".to_string());
        assert_eq!(data.task_texts(), vec!["plan", " ship "]);
    }

    #[test]
    fn test_reminders() {
        let mut data = WeekData::default();
        let id = data.add_reminder("call mom".to_string()).id.clone();
        data.toggle_reminder(&id).unwrap();
        assert!(data.reminders[0].completed);
        data.remove_reminder(&id).unwrap();
        assert!(data.reminders.is_empty());
    }
}
