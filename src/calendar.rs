use crate::jalali::{self, Holiday, JalaliDate};

/// The month currently shown by a calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
}

impl MonthView {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn containing(date: JalaliDate) -> Self {
        Self { year: date.year, month: date.month }
    }

    /// Previous month, wrapping Farvardin to Esfand of the prior year
    pub fn prev(self) -> Self {
        if self.month <= 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { month: self.month - 1, ..self }
        }
    }

    /// Next month, wrapping Esfand to Farvardin of the next year
    pub fn next(self) -> Self {
        if self.month >= 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { month: self.month + 1, ..self }
        }
    }

    pub fn title(&self) -> String {
        format!("{} {}", jalali::month_name(self.month), self.year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub day: u32,
    pub is_today: bool,
    pub holiday: Option<Holiday>,
    pub is_friday: bool,
}

impl DayCell {
    /// Holidays and Fridays are drawn as days off
    pub fn is_day_off(&self) -> bool {
        self.holiday.is_some() || self.is_friday
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridCell {
    Blank,
    Day(DayCell),
}

/// A month laid out in Saturday-first rows of seven cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub view: MonthView,
    pub leading_blanks: u32,
    pub cells: Vec<GridCell>,
    holidays: Vec<Holiday>,
}

impl MonthGrid {
    /// Lay out `view` starting on weekday `first_weekday` (0 = Saturday)
    pub fn build(view: MonthView, first_weekday: u32, holidays: &[Holiday], today: JalaliDate) -> Self {
        let leading_blanks = first_weekday.min(6);
        let days = jalali::days_in_month(view.year, view.month);
        let month_holidays: Vec<Holiday> = holidays
            .iter()
            .filter(|h| h.month == view.month)
            .copied()
            .collect();

        let mut cells = Vec::with_capacity((leading_blanks + days) as usize);
        cells.extend((0..leading_blanks).map(|_| GridCell::Blank));
        for index in 0..days {
            let day = index + 1;
            cells.push(GridCell::Day(DayCell {
                day,
                is_today: today.year == view.year && today.month == view.month && today.day == day,
                holiday: month_holidays.iter().find(|h| h.day == day).copied(),
                is_friday: (leading_blanks + index) % 7 == 6,
            }));
        }

        Self {
            view,
            leading_blanks,
            cells,
            holidays: month_holidays,
        }
    }

    /// Holidays falling in the viewed month, in table order
    pub fn month_holidays(&self) -> &[Holiday] {
        &self.holidays
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(7)
    }

    pub fn today_cell(&self) -> Option<&DayCell> {
        self.cells.iter().find_map(|cell| match cell {
            GridCell::Day(day) if day.is_today => Some(day),
            _ => None,
        })
    }

    /// Plain-text rendering for the terminal, `*` marks today and `!` a day off
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{} ({} {})\n",
            self.view.title(),
            jalali::MONTH_NAMES_LATIN[(self.view.month - 1) as usize],
            self.view.year
        ));
        let header: Vec<String> = jalali::WEEKDAY_NAMES_LATIN
            .iter()
            .map(|name| format!("{:>4}", &name[..2]))
            .collect();
        out.push_str(&header.join(""));
        out.push('\n');

        for week in self.weeks() {
            for cell in week {
                match cell {
                    GridCell::Blank => out.push_str("    "),
                    GridCell::Day(day) => {
                        let marker = if day.is_today {
                            '*'
                        } else if day.is_day_off() {
                            '!'
                        } else {
                            ' '
                        };
                        out.push_str(&format!("{:>3}{}", day.day, marker));
                    }
                }
            }
            out.push('\n');
        }

        if !self.holidays.is_empty() {
            out.push('\n');
            for holiday in &self.holidays {
                out.push_str(&format!("  {:>2} {}: {}\n", holiday.day, jalali::month_name(holiday.month), holiday.title));
            }
        }
        out
    }
}
