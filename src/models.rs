use std::collections::BTreeMap;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const PRIORITY_SLOTS: usize = 5;
pub const HABIT_DAYS: usize = 7;

pub const DEFAULT_QUOTE: &str = "تلاش امروز، آرامش فرداست.";
pub const DEFAULT_HABIT_NAME: &str = "عادت جدید";
pub const DEFAULT_EVENT_TIME: &str = "09:00";
pub const DEFAULT_DEADLINE_TIME: &str = "23:59";
pub const DEFAULT_GRADE: &str = "NA";
pub const DEFAULT_TRANSACTION_CATEGORY: &str = "متفرقه";

/// Fresh identifier for a new entry
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(text: String) -> Self {
        Self {
            id: new_id(),
            text,
            completed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(default)]
    pub time: String, // HH:MM
    #[serde(default)]
    pub text: String,
}

impl Event {
    pub fn new(time: String, text: String) -> Self {
        Self {
            id: new_id(),
            time,
            text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayData {
    #[serde(default = "default_priorities")]
    pub priorities: Vec<String>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Calendar date the record was created for; absent on records from older versions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl Default for DayData {
    fn default() -> Self {
        Self {
            priorities: default_priorities(),
            events: Vec::new(),
            tasks: Vec::new(),
            date: None,
        }
    }
}

impl DayData {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }
}

fn default_priorities() -> Vec<String> {
    vec![String::new(); PRIORITY_SLOTS]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_checks")]
    pub checks: Vec<bool>, // Saturday to Friday
}

impl Habit {
    pub fn new(name: String) -> Self {
        Self {
            id: new_id(),
            name,
            checks: default_checks(),
        }
    }

    fn with_id(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            checks: default_checks(),
        }
    }
}

fn default_checks() -> Vec<bool> {
    vec![false; HABIT_DAYS]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum AssignmentType {
    #[serde(rename = "کوییز")]
    Quiz,
    #[default]
    #[serde(rename = "تکلیف")]
    Homework,
    #[serde(rename = "امتحان")]
    Exam,
    #[serde(rename = "خواندن")]
    Reading,
    #[serde(rename = "پروژه")]
    Project,
    #[serde(rename = "کنفرانس")]
    Presentation,
}

impl AssignmentType {
    /// Order used by the dashboard filter
    pub const ALL: [AssignmentType; 6] = [
        AssignmentType::Homework,
        AssignmentType::Quiz,
        AssignmentType::Exam,
        AssignmentType::Project,
        AssignmentType::Presentation,
        AssignmentType::Reading,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AssignmentType::Quiz => "کوییز",
            AssignmentType::Homework => "تکلیف",
            AssignmentType::Exam => "امتحان",
            AssignmentType::Reading => "خواندن",
            AssignmentType::Project => "پروژه",
            AssignmentType::Presentation => "کنفرانس",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum AssignmentPriority {
    #[serde(rename = "کم")]
    Low,
    #[default]
    #[serde(rename = "متوسط")]
    Medium,
    #[serde(rename = "زیاد")]
    High,
}

impl AssignmentPriority {
    pub fn label(self) -> &'static str {
        match self {
            AssignmentPriority::Low => "کم",
            AssignmentPriority::Medium => "متوسط",
            AssignmentPriority::High => "زیاد",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum AssignmentStatus {
    #[default]
    #[serde(rename = "شروع نشده")]
    NotStarted,
    #[serde(rename = "در حال انجام")]
    InProgress,
    #[serde(rename = "ارسال شده")]
    Submitted,
    #[serde(rename = "تعویق شده")]
    Postponed,
}

impl AssignmentStatus {
    pub const ALL: [AssignmentStatus; 4] = [
        AssignmentStatus::NotStarted,
        AssignmentStatus::InProgress,
        AssignmentStatus::Submitted,
        AssignmentStatus::Postponed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AssignmentStatus::NotStarted => "شروع نشده",
            AssignmentStatus::InProgress => "در حال انجام",
            AssignmentStatus::Submitted => "ارسال شده",
            AssignmentStatus::Postponed => "تعویق شده",
        }
    }

    /// Next status in display order, wrapping around
    pub fn cycle(self) -> Self {
        let index = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "type")]
    pub kind: AssignmentType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: AssignmentPriority,
    #[serde(default)]
    pub status: AssignmentStatus,
    #[serde(default)]
    pub due_date: String, // YYYY-MM-DD
    #[serde(default)]
    pub deadline_time: String, // HH:MM
    #[serde(default)]
    pub grade: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_sent: Option<bool>,
}

impl Assignment {
    /// New assignment with the dashboard defaults, due on `due_date`
    pub fn new(due_date: NaiveDate) -> Self {
        Self {
            id: new_id(),
            class_name: String::new(),
            title: String::new(),
            kind: AssignmentType::default(),
            description: String::new(),
            priority: AssignmentPriority::default(),
            status: AssignmentStatus::default(),
            due_date: due_date.format("%Y-%m-%d").to_string(),
            deadline_time: DEFAULT_DEADLINE_TIME.to_string(),
            grade: DEFAULT_GRADE.to_string(),
            reminder_sent: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceItem {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub actual: f64,
}

impl FinanceItem {
    pub fn new(label: String, budget: f64, actual: f64) -> Self {
        Self {
            id: new_id(),
            label,
            budget,
            actual,
        }
    }

    fn with_id(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            budget: 0.0,
            actual: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(default)]
    pub day_index: u8, // 0-6 (Saturday-Friday)
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub category: String,
}

impl Transaction {
    pub fn new(day_index: u8, label: String, amount: f64) -> Self {
        Self {
            id: new_id(),
            day_index,
            label,
            amount,
            category: DEFAULT_TRANSACTION_CATEGORY.to_string(),
        }
    }
}

/// Budget tables addressable by category
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FinanceCategory {
    Income,
    Expenses,
    Bills,
    Debt,
    Savings,
}

impl FinanceCategory {
    pub const ALL: [FinanceCategory; 5] = [
        FinanceCategory::Income,
        FinanceCategory::Expenses,
        FinanceCategory::Bills,
        FinanceCategory::Debt,
        FinanceCategory::Savings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FinanceCategory::Income => "Income",
            FinanceCategory::Expenses => "Expenses",
            FinanceCategory::Bills => "Bills",
            FinanceCategory::Debt => "Debt",
            FinanceCategory::Savings => "Savings",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceData {
    #[serde(default = "default_income")]
    pub income: Vec<FinanceItem>,
    #[serde(default = "default_expenses")]
    pub expenses: Vec<FinanceItem>,
    #[serde(default)]
    pub bills: Vec<FinanceItem>,
    #[serde(default)]
    pub debt: Vec<FinanceItem>,
    #[serde(default)]
    pub savings: Vec<FinanceItem>,
    #[serde(default)]
    pub daily_transactions: Vec<Transaction>,
}

impl Default for FinanceData {
    fn default() -> Self {
        Self {
            income: default_income(),
            expenses: default_expenses(),
            bills: Vec::new(),
            debt: Vec::new(),
            savings: Vec::new(),
            daily_transactions: Vec::new(),
        }
    }
}

impl FinanceData {
    pub fn items(&self, category: FinanceCategory) -> &Vec<FinanceItem> {
        match category {
            FinanceCategory::Income => &self.income,
            FinanceCategory::Expenses => &self.expenses,
            FinanceCategory::Bills => &self.bills,
            FinanceCategory::Debt => &self.debt,
            FinanceCategory::Savings => &self.savings,
        }
    }

    pub fn items_mut(&mut self, category: FinanceCategory) -> &mut Vec<FinanceItem> {
        match category {
            FinanceCategory::Income => &mut self.income,
            FinanceCategory::Expenses => &mut self.expenses,
            FinanceCategory::Bills => &mut self.bills,
            FinanceCategory::Debt => &mut self.debt,
            FinanceCategory::Savings => &mut self.savings,
        }
    }
}

fn default_income() -> Vec<FinanceItem> {
    vec![FinanceItem::with_id("1", "حقوق/درآمد")]
}

fn default_expenses() -> Vec<FinanceItem> {
    vec![FinanceItem::with_id("1", "اجاره/هزینه ثابت")]
}

/// Everything stored for one week
///
/// Each field has its own serde default, so a partially stored record is
/// completed field by field on load rather than replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekData {
    #[serde(default = "default_quote")]
    pub quote: String,
    #[serde(default)]
    pub reminders: Vec<Task>,
    #[serde(default = "default_habits")]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub finance: FinanceData,
    #[serde(default)]
    pub days: BTreeMap<String, DayData>,
}

impl Default for WeekData {
    fn default() -> Self {
        Self {
            quote: default_quote(),
            reminders: Vec::new(),
            habits: default_habits(),
            assignments: Vec::new(),
            finance: FinanceData::default(),
            days: BTreeMap::new(),
        }
    }
}

fn default_quote() -> String {
    DEFAULT_QUOTE.to_string()
}

fn default_habits() -> Vec<Habit> {
    vec![
        Habit::with_id("1", "ورزش روزانه"),
        Habit::with_id("2", "مطالعه کتاب"),
        Habit::with_id("3", "نوشیدن آب کافی"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_week_skeleton() {
        let week = WeekData::default();
        assert_eq!(week.quote, DEFAULT_QUOTE);
        assert_eq!(week.habits.len(), 3);
        assert!(week.habits.iter().all(|h| h.checks == vec![false; 7]));
        assert_eq!(week.finance.income.len(), 1);
        assert_eq!(week.finance.income[0].budget, 0.0);
        assert_eq!(week.finance.income[0].actual, 0.0);
        assert_eq!(week.finance.expenses.len(), 1);
        assert!(week.finance.bills.is_empty());
        assert!(week.days.is_empty());
        assert!(week.assignments.is_empty());
    }

    #[test]
    fn test_serializes_camel_case_and_persian_enums() {
        let mut assignment = Assignment::new(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
        assignment.kind = AssignmentType::Exam;
        let json = serde_json::to_value(&assignment).unwrap();
        assert_eq!(json["type"], "امتحان");
        assert_eq!(json["status"], "شروع نشده");
        assert_eq!(json["dueDate"], "2024-03-20");
        assert_eq!(json["deadlineTime"], "23:59");
        assert!(json.get("reminderSent").is_none());

        let tx = Transaction::new(3, "lunch".to_string(), 12.5);
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["dayIndex"], 3);
        assert_eq!(json["category"], DEFAULT_TRANSACTION_CATEGORY);
    }

    #[test]
    fn test_day_without_date_omits_field() {
        let json = serde_json::to_value(DayData::default()).unwrap();
        assert!(json.get("date").is_none());
        assert_eq!(json["priorities"].as_array().map(|a| a.len()), Some(PRIORITY_SLOTS));

        let dated = DayData::for_date(NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
        let json = serde_json::to_value(dated).unwrap();
        assert_eq!(json["date"], "2024-03-16");
    }

    #[test]
    fn test_status_cycle_wraps() {
        assert_eq!(AssignmentStatus::NotStarted.cycle(), AssignmentStatus::InProgress);
        assert_eq!(AssignmentStatus::Postponed.cycle(), AssignmentStatus::NotStarted);
    }

    #[test]
    fn test_new_ids_are_distinct() {
        let a = Task::new(String::new());
        let b = Task::new(String::new());
        assert_ne!(a.id, b.id);
    }
}
