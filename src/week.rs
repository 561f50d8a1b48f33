use chrono::{NaiveDate, TimeDelta};

use crate::jalali::{self, JalaliDate};

/// Prefix of every persisted week key
pub const WEEK_KEY_PREFIX: &str = "jalali_";

pub const DAYS_PER_WEEK: usize = 7;

/// A Saturday-to-Friday planner week
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Week {
    pub start: NaiveDate,
    pub offset: i64,
}

impl Week {
    /// The week containing `today`, shifted by `offset` weeks
    ///
    /// None when any day of the shifted week falls outside the representable date range.
    pub fn from_offset(today: NaiveDate, offset: i64) -> Option<Self> {
        let since_saturday = i64::from(jalali::saturday_based_weekday(today));
        let start = today
            .checked_sub_signed(TimeDelta::days(since_saturday))?
            .checked_add_signed(TimeDelta::try_weeks(offset)?)?;
        // day_date relies on the whole week being representable
        start.checked_add_signed(TimeDelta::days(DAYS_PER_WEEK as i64 - 1))?;
        Some(Self { start, offset })
    }

    /// Storage key, e.g. `jalali_1403-01-04` for the week starting Saturday 1403/01/04
    pub fn key(&self) -> String {
        let start = self.start_jalali();
        format!("{}{:04}-{:02}-{:02}", WEEK_KEY_PREFIX, start.year, start.month, start.day)
    }

    pub fn start_jalali(&self) -> JalaliDate {
        JalaliDate::from_gregorian(self.start)
    }

    pub fn end(&self) -> NaiveDate {
        self.day_date(DAYS_PER_WEEK - 1)
    }

    /// Gregorian date of day `index` (0 = Saturday)
    pub fn day_date(&self, index: usize) -> NaiveDate {
        self.start + TimeDelta::days(index as i64)
    }

    /// Day index of `date` within this week, if it falls inside
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let diff = (date - self.start).num_days();
        (0..DAYS_PER_WEEK as i64).contains(&diff).then_some(diff as usize)
    }

    /// Human readable range like `1403/01/04 - 1403/01/10`
    pub fn label(&self) -> String {
        format!("{} - {}", self.start_jalali(), JalaliDate::from_gregorian(self.end()))
    }
}

/// Storage key of the day record at `index`
pub fn day_key(index: usize) -> String {
    format!("day_{}", index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Weekday};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_starts_on_saturday() {
        // 2024-03-20 is a Wednesday
        let week = Week::from_offset(ymd(2024, 3, 20), 0).unwrap();
        assert_eq!(week.start, ymd(2024, 3, 16));
        assert_eq!(week.start.weekday(), Weekday::Sat);
        assert_eq!(week.end(), ymd(2024, 3, 22));

        let saturday = Week::from_offset(ymd(2024, 3, 16), 0).unwrap();
        assert_eq!(saturday.start, ymd(2024, 3, 16));
        let friday = Week::from_offset(ymd(2024, 3, 22), 0).unwrap();
        assert_eq!(friday.start, ymd(2024, 3, 16));
    }

    #[test]
    fn test_offset_shifts_by_whole_weeks() {
        let today = ymd(2024, 3, 20);
        assert_eq!(Week::from_offset(today, 1).unwrap().start, ymd(2024, 3, 23));
        assert_eq!(Week::from_offset(today, -2).unwrap().start, ymd(2024, 3, 2));
    }

    #[test]
    fn test_out_of_range_offset_is_rejected() {
        let today = ymd(2024, 3, 20);
        assert!(Week::from_offset(today, 9_000_000_000_000).is_none());
        assert!(Week::from_offset(today, i64::MIN).is_none());
        assert!(Week::from_offset(today, 10_000).is_some());
    }

    #[test]
    fn test_key_is_stable_within_a_week() {
        let keys: Vec<String> = (16..=22)
            .map(|d| Week::from_offset(ymd(2024, 3, d), 0).unwrap().key())
            .collect();
        assert!(keys.iter().all(|k| k == &keys[0]));
        assert_eq!(keys[0], "jalali_1402-12-26");
        assert_ne!(Week::from_offset(ymd(2024, 3, 23), 0).unwrap().key(), keys[0]);
    }

    #[test]
    fn test_index_of() {
        let week = Week::from_offset(ymd(2024, 3, 20), 0).unwrap();
        assert_eq!(week.index_of(ymd(2024, 3, 16)), Some(0));
        assert_eq!(week.index_of(ymd(2024, 3, 22)), Some(6));
        assert_eq!(week.index_of(ymd(2024, 3, 23)), None);
        assert_eq!(week.index_of(ymd(2024, 3, 15)), None);
    }

    #[test]
    fn test_day_key_format() {
        assert_eq!(day_key(0), "day_0");
        assert_eq!(day_key(6), "day_6");
    }
}
