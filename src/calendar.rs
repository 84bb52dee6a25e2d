use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("calendar requires at least one working day")]
    NoWorkingDays,
}

/// Working-day calendar used to turn weekly FTE figures into FTE-days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCalendar {
    holidays: HashSet<NaiveDate>,
    non_working_days: HashSet<Weekday>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCalendarConfig {
    working_days: Vec<Weekday>,
    #[serde(default)]
    holidays: Vec<NaiveDate>,
}

/// A column header for one reporting week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekHeader {
    pub week: u32,
    pub date: NaiveDate,
    pub label: String,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self::with_year_range(2025, 2025)
    }
}

impl WorkCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Mon-Fri with US federal holidays for every year in the range.
    pub fn with_year_range(start_year: i32, end_year: i32) -> Self {
        let (start, end) = if start_year <= end_year {
            (start_year, end_year)
        } else {
            (end_year, start_year)
        };

        let mut calendar = Self {
            holidays: HashSet::new(),
            non_working_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
        };
        for year in start..=end {
            calendar.add_us_holidays(year);
        }
        calendar
    }

    /// Default calendar covering the years touched by `[start, end]`.
    pub fn for_window(start: NaiveDate, end: NaiveDate) -> Self {
        Self::with_year_range(start.year(), end.year())
    }

    pub fn from_config(config: &WorkCalendarConfig) -> Result<Self, CalendarError> {
        let working_set: HashSet<Weekday> = config.working_days.iter().copied().collect();
        if working_set.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        let non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !working_set.contains(day))
            .collect();

        Ok(Self {
            holidays: config.holidays.iter().copied().collect(),
            non_working_days,
        })
    }

    pub fn to_config(&self) -> WorkCalendarConfig {
        WorkCalendarConfig::from(self)
    }

    fn add_us_holidays(&mut self, year: i32) {
        let fixed = [(1, 1), (7, 4), (11, 11), (12, 25)];
        for (month, day) in fixed {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                self.holidays.insert(date);
            }
        }

        // MLK, Presidents', Labor, Columbus, Thanksgiving
        let floating = [
            (1, Weekday::Mon, 3),
            (2, Weekday::Mon, 3),
            (9, Weekday::Mon, 1),
            (10, Weekday::Mon, 2),
            (11, Weekday::Thu, 4),
        ];
        for (month, weekday, n) in floating {
            if let Some(date) = Self::nth_weekday(year, month, weekday, n) {
                self.holidays.insert(date);
            }
        }

        // Memorial Day
        if let Some(date) = Self::last_weekday(year, 5, Weekday::Mon) {
            self.holidays.insert(date);
        }
    }

    fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> Option<NaiveDate> {
        NaiveDate::from_weekday_of_month_opt(year, month, weekday, n as u8)
    }

    fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
        let first_of_next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        let mut date = first_of_next - Duration::days(1);
        while date.weekday() != weekday {
            date -= Duration::days(1);
        }
        Some(date)
    }

    pub fn set_working_days(&mut self, days: &[Weekday]) -> Result<(), CalendarError> {
        if days.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        self.non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !days.contains(day))
            .collect();
        Ok(())
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.holidays.contains(&date) && !self.non_working_days.contains(&date.weekday())
    }

    /// Count working days in `[start, end]`, both inclusive.
    pub fn count_working_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        start
            .iter_days()
            .take_while(|day| *day <= end)
            .filter(|day| self.is_working_day(*day))
            .count() as i64
    }

    /// Working days in the seven-day week beginning at `week_start`.
    pub fn working_days_in_week(&self, week_start: NaiveDate) -> i64 {
        self.count_working_days(week_start, week_start + Duration::days(6))
    }
}

/// Whole weeks from `start` to `end`, truncated toward zero.
pub fn weeks_between(end: NaiveDate, start: NaiveDate) -> i64 {
    (end - start).num_days() / 7
}

pub fn add_weeks(date: NaiveDate, weeks: i64) -> NaiveDate {
    date + Duration::weeks(weeks)
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Short label such as `"Jan 1"`.
pub fn week_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

pub fn week_headers(start: NaiveDate, num_weeks: u32) -> Vec<WeekHeader> {
    let aligned = week_start(start);
    (0..num_weeks)
        .map(|week| {
            let date = add_weeks(aligned, week as i64);
            WeekHeader {
                week,
                date,
                label: week_label(date),
            }
        })
        .collect()
}

impl WorkCalendarConfig {
    pub fn new<I, J>(working_days: I, holidays: J) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let mut working: Vec<Weekday> = working_days.into_iter().collect();
        if working.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        working.sort_by_key(|wd| wd.num_days_from_monday());
        working.dedup();

        let mut holidays: Vec<NaiveDate> = holidays.into_iter().collect();
        holidays.sort();
        holidays.dedup();

        Ok(Self {
            working_days: working,
            holidays,
        })
    }

    pub fn working_days(&self) -> &[Weekday] {
        &self.working_days
    }

    pub fn holidays(&self) -> &[NaiveDate] {
        &self.holidays
    }
}

impl From<&WorkCalendar> for WorkCalendarConfig {
    fn from(calendar: &WorkCalendar) -> Self {
        let working_days = WorkCalendar::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !calendar.non_working_days.contains(day))
            .collect();

        let mut holidays: Vec<NaiveDate> = calendar.holidays.iter().copied().collect();
        holidays.sort();

        Self {
            working_days,
            holidays,
        }
    }
}
