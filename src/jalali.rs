use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days from CE (chrono's `num_days_from_ce`) of 1 Farvardin 1, i.e. 622-03-22 proleptic Gregorian
pub const PERSIAN_EPOCH_DAYS_FROM_CE: i64 = 226_895;

/// Date returned by `today()` when the host date cannot be converted
pub const FALLBACK_TODAY: JalaliDate = JalaliDate { year: 1403, month: 1, day: 1 };

/// Residues of `year mod 33` that are leap years in the 33-year cycle
pub const LEAP_RESIDUES: [i64; 8] = [1, 5, 9, 13, 17, 22, 26, 30];

/// Days before the first of each month (0-based month index)
const CUMULATIVE_DAYS: [i64; 12] = [0, 31, 62, 93, 124, 155, 186, 216, 246, 276, 306, 336];

/// Half-width of the window scanned by the anchored first-weekday search
pub const ANCHORED_SEARCH_DAYS: i64 = 60;

pub const MONTH_NAMES: [&str; 12] = [
    "فروردین", "اردیبهشت", "خرداد", "تیر", "مرداد", "شهریور",
    "مهر", "آبان", "آذر", "دی", "بهمن", "اسفند",
];

pub const MONTH_NAMES_LATIN: [&str; 12] = [
    "Farvardin", "Ordibehesht", "Khordad", "Tir", "Mordad", "Shahrivar",
    "Mehr", "Aban", "Azar", "Dey", "Bahman", "Esfand",
];

/// Saturday-first weekday names
pub const WEEKDAY_NAMES: [&str; 7] = [
    "شنبه", "یکشنبه", "دوشنبه", "سه‌شنبه", "چهارشنبه", "پنجشنبه", "جمعه",
];

pub const WEEKDAY_NAMES_LATIN: [&str; 7] = [
    "Saturday", "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday",
];

/// A date in the Persian solar calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JalaliDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl JalaliDate {
    /// Build a date, returning None if month or day is out of range for that year
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(Self { year, month, day })
    }

    /// Convert a Gregorian date using day-count arithmetic from the Jalali epoch
    pub fn from_gregorian(date: NaiveDate) -> Self {
        let days = i64::from(date.num_days_from_ce()) - PERSIAN_EPOCH_DAYS_FROM_CE;
        let year = 1 + (33 * days + 3).div_euclid(12_053);
        let day_of_year = days - farvardin_first(year);
        let month_index = if day_of_year < 216 {
            day_of_year / 31
        } else {
            (day_of_year - 6) / 30
        };
        let day = day_of_year - CUMULATIVE_DAYS[month_index as usize] + 1;

        Self {
            year: year as i32,
            month: month_index as u32 + 1,
            day: day as u32,
        }
    }

    /// Convert back to the Gregorian calendar
    /// Returns None for invalid dates or dates outside chrono's range
    pub fn to_gregorian(&self) -> Option<NaiveDate> {
        Self::new(self.year, self.month, self.day)?;
        let days = PERSIAN_EPOCH_DAYS_FROM_CE
            + farvardin_first(i64::from(self.year))
            + CUMULATIVE_DAYS[(self.month - 1) as usize]
            + i64::from(self.day)
            - 1;
        let days = i32::try_from(days).ok()?;
        NaiveDate::from_num_days_from_ce_opt(days)
    }

    /// Saturday-based weekday (0 = Saturday .. 6 = Friday)
    pub fn weekday(&self) -> Option<u32> {
        self.to_gregorian().map(saturday_based_weekday)
    }

    pub fn month_name(&self) -> &'static str {
        month_name(self.month)
    }

    /// Format as `YYYY/MM/DD`
    pub fn format(&self) -> String {
        format!("{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

impl std::fmt::Display for JalaliDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format())
    }
}

/// Days from the epoch to 1 Farvardin of `year`
fn farvardin_first(year: i64) -> i64 {
    365 * (year - 1) + (8 * year + 21).div_euclid(33)
}

/// Saturday-based weekday index of a Gregorian date
pub fn saturday_based_weekday(date: NaiveDate) -> u32 {
    (date.weekday().num_days_from_sunday() + 1) % 7
}

/// Current Persian date from the host's local clock
pub fn today() -> JalaliDate {
    today_from(Local::now().date_naive())
}

/// Persian date for a given host date, with the fixed fallback if conversion fails
pub fn today_from(date: NaiveDate) -> JalaliDate {
    let converted = JalaliDate::from_gregorian(date);
    if converted.to_gregorian() == Some(date) {
        converted
    } else {
        tracing::warn!(%date, "Jalali conversion failed, using fallback date");
        FALLBACK_TODAY
    }
}

/// 33-year cycle leap rule
pub fn is_leap_year(year: i32) -> bool {
    LEAP_RESIDUES.contains(&i64::from(year).rem_euclid(33))
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    if month <= 6 {
        31
    } else if month <= 11 {
        30
    } else if is_leap_year(year) {
        30
    } else {
        29
    }
}

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get((month as usize).wrapping_sub(1))
        .copied()
        .unwrap_or("")
}

/// Weekday (0 = Saturday) of the first day of a month, computed from the epoch
pub fn first_weekday_of_month(year: i32, month: u32) -> u32 {
    JalaliDate::new(year, month, 1)
        .and_then(|d| d.weekday())
        .unwrap_or(0)
}

/// Weekday of the first day of a month, found by scanning ±60 days around `anchor`
///
/// Months whose first day falls outside the window are reported as Saturday (0).
pub fn first_weekday_of_month_anchored(year: i32, month: u32, anchor: NaiveDate) -> u32 {
    for offset in -ANCHORED_SEARCH_DAYS..ANCHORED_SEARCH_DAYS {
        let Some(candidate) = anchor.checked_add_signed(Duration::days(offset)) else {
            continue;
        };
        let jalali = JalaliDate::from_gregorian(candidate);
        if jalali.year == year && jalali.month == month && jalali.day == 1 {
            return saturday_based_weekday(candidate);
        }
    }
    0
}

/// How the calendar finds the weekday a month starts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekdayStrategy {
    /// Direct arithmetic from the Jalali epoch
    #[default]
    Epoch,
    /// Bounded search around the current date
    Anchored,
}

impl WeekdayStrategy {
    pub fn first_weekday(self, year: i32, month: u32, anchor: NaiveDate) -> u32 {
        match self {
            WeekdayStrategy::Epoch => first_weekday_of_month(year, month),
            WeekdayStrategy::Anchored => first_weekday_of_month_anchored(year, month, anchor),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holiday {
    pub month: u32,
    pub day: u32,
    pub title: &'static str,
    pub is_religious: bool,
}

const fn holiday(month: u32, day: u32, title: &'static str) -> Holiday {
    Holiday { month, day, title, is_religious: false }
}

/// Fixed solar-calendar holidays of the current era
pub const PERSIAN_HOLIDAYS: &[Holiday] = &[
    holiday(1, 1, "نوروز"),
    holiday(1, 2, "نوروز"),
    holiday(1, 3, "نوروز"),
    holiday(1, 4, "نوروز"),
    holiday(1, 12, "روز جمهوری اسلامی"),
    holiday(1, 13, "روز طبیعت (سیزده‌بدر)"),
    holiday(3, 14, "رحلت امام خمینی"),
    holiday(3, 15, "قیام ۱۵ خرداد"),
    holiday(11, 22, "پیروزی انقلاب اسلامی"),
    holiday(12, 29, "ملی شدن صنعت نفت"),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_leap_rule_is_periodic() {
        for year in -100..1600 {
            assert_eq!(is_leap_year(year), is_leap_year(year + 33), "year {}", year);
        }
    }

    #[test]
    fn test_known_leap_years() {
        assert!(is_leap_year(1399));
        assert!(is_leap_year(1403));
        assert!(!is_leap_year(1402));
        assert!(!is_leap_year(1404));
    }

    #[test]
    fn test_days_in_month() {
        for year in 1380..1420 {
            for month in 1..=12 {
                let days = days_in_month(year, month);
                assert!((29..=31).contains(&days));
            }
            assert_eq!(days_in_month(year, 1), 31);
            assert_eq!(days_in_month(year, 7), 30);
            assert_eq!(days_in_month(year, 12), if is_leap_year(year) { 30 } else { 29 });
        }
        assert_eq!(days_in_month(1403, 12), 30);
        assert_eq!(days_in_month(1402, 12), 29);
    }

    #[test]
    fn test_known_nowruz_dates() {
        assert_eq!(JalaliDate::from_gregorian(ymd(2024, 3, 20)), JalaliDate { year: 1403, month: 1, day: 1 });
        assert_eq!(JalaliDate::from_gregorian(ymd(2025, 3, 21)), JalaliDate { year: 1404, month: 1, day: 1 });
        assert_eq!(JalaliDate::from_gregorian(ymd(2024, 3, 19)), JalaliDate { year: 1402, month: 12, day: 29 });
        assert_eq!(JalaliDate::from_gregorian(ymd(2025, 3, 20)), JalaliDate { year: 1403, month: 12, day: 30 });
        assert_eq!(JalaliDate::from_gregorian(ymd(2026, 10, 15)), JalaliDate { year: 1405, month: 7, day: 23 });
    }

    #[test]
    fn test_gregorian_roundtrip_over_consecutive_days() {
        let mut date = ymd(2019, 1, 1);
        let mut previous = JalaliDate::from_gregorian(date);
        for _ in 0..4000 {
            date = date.succ_opt().unwrap();
            let current = JalaliDate::from_gregorian(date);
            assert_eq!(current.to_gregorian(), Some(date));

            let expected_next = if previous.day < days_in_month(previous.year, previous.month) {
                JalaliDate { day: previous.day + 1, ..previous }
            } else if previous.month < 12 {
                JalaliDate { month: previous.month + 1, day: 1, ..previous }
            } else {
                JalaliDate { year: previous.year + 1, month: 1, day: 1 }
            };
            assert_eq!(current, expected_next);
            previous = current;
        }
    }

    #[test]
    fn test_new_rejects_invalid_dates() {
        assert!(JalaliDate::new(1402, 12, 30).is_none());
        assert!(JalaliDate::new(1403, 12, 30).is_some());
        assert!(JalaliDate::new(1403, 13, 1).is_none());
        assert!(JalaliDate::new(1403, 7, 31).is_none());
        assert!(JalaliDate::new(1403, 1, 0).is_none());
    }

    #[test]
    fn test_first_weekday_matches_conversion() {
        // 1403/01/01 was a Wednesday
        assert_eq!(first_weekday_of_month(1403, 1), 4);
        // 1404/01/01 was a Friday
        assert_eq!(first_weekday_of_month(1404, 1), 6);
        for year in 1390..1410 {
            for month in 1..=12 {
                let weekday = first_weekday_of_month(year, month);
                assert!(weekday <= 6);
                let gregorian = JalaliDate::new(year, month, 1).unwrap().to_gregorian().unwrap();
                assert_eq!(weekday, saturday_based_weekday(gregorian));
            }
        }
    }

    #[test]
    fn test_anchored_search_inside_and_outside_window() {
        let anchor = ymd(2024, 3, 25);
        assert_eq!(first_weekday_of_month_anchored(1403, 1, anchor), 4);
        assert_eq!(first_weekday_of_month_anchored(1403, 2, anchor), first_weekday_of_month(1403, 2));
        // Far from the anchor the search gives up and reports Saturday
        assert_eq!(first_weekday_of_month_anchored(1403, 9, anchor), 0);
        assert_ne!(first_weekday_of_month(1403, 9), 0);
    }

    #[test]
    fn test_weekday_strategy_dispatch() {
        let anchor = ymd(2024, 3, 25);
        assert_eq!(WeekdayStrategy::Epoch.first_weekday(1403, 9, anchor), first_weekday_of_month(1403, 9));
        assert_eq!(WeekdayStrategy::Anchored.first_weekday(1403, 9, anchor), 0);
    }

    #[test]
    fn test_today_from_converts_host_date() {
        assert_eq!(today_from(ymd(2024, 3, 20)), JalaliDate { year: 1403, month: 1, day: 1 });
    }

    #[test]
    fn test_month_name_bounds() {
        assert_eq!(month_name(1), "فروردین");
        assert_eq!(month_name(12), "اسفند");
        assert_eq!(month_name(0), "");
        assert_eq!(month_name(13), "");
    }
}
