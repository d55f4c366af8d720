//! Evaluation period and holiday models.
//!
//! This module contains the [`Period`] (one calendar month), [`Holiday`] and
//! [`HolidayCalendar`] types that define which days count as business days.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// One calendar month, the unit every work rate is computed over.
///
/// A `Period` can only be built for a month that exists, so its accessors
/// never fail.
///
/// # Example
///
/// ```
/// use evaluation_engine::models::Period;
/// use chrono::NaiveDate;
///
/// let period = Period::new(2024, 2).unwrap();
/// assert_eq!(period.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// assert_eq!(period.to_string(), "2024-02");
/// assert!(Period::new(2024, 13).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "PeriodParts", into = "PeriodParts")]
pub struct Period {
    first_day: NaiveDate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PeriodParts {
    year: i32,
    month: u32,
}

impl TryFrom<PeriodParts> for Period {
    type Error = EngineError;

    fn try_from(parts: PeriodParts) -> Result<Self, Self::Error> {
        Period::new(parts.year, parts.month)
    }
}

impl From<Period> for PeriodParts {
    fn from(period: Period) -> Self {
        PeriodParts {
            year: period.year(),
            month: period.month(),
        }
    }
}

impl Period {
    /// Creates the period for the given year and month (1-12).
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Period { first_day })
            .ok_or(EngineError::InvalidPeriod { year, month })
    }

    /// Returns the period that contains `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Period {
            first_day: date - Days::new(u64::from(date.day0())),
        }
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// The calendar month (1-12).
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// The first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// The last day of the month.
    pub fn last_day(&self) -> NaiveDate {
        self.days().last().unwrap_or(self.first_day)
    }

    /// Iterates every calendar day of the month in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let month = self.month();
        self.first_day
            .iter_days()
            .take_while(move |d| d.month() == month)
    }

    /// Returns the following month, if it is representable.
    pub fn next(&self) -> Option<Period> {
        self.first_day
            .checked_add_months(Months::new(1))
            .map(|first_day| Period { first_day })
    }

    /// Checks if a date falls within this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        Period::containing(date) == *self
    }

    /// Clips the inclusive range `[start, end]` to this month.
    ///
    /// Returns `None` when the range does not touch the month.
    pub fn clip(&self, start: NaiveDate, end: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let clipped_start = start.max(self.first_day);
        let clipped_end = end.min(self.last_day());
        (clipped_start <= clipped_end).then_some((clipped_start, clipped_end))
    }

    /// Returns true if the inclusive range `[start, end]` touches this month.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.clip(start, end).is_some()
    }

    /// Returns every month touched by the inclusive range `[start, end]`.
    pub fn spanning(start: NaiveDate, end: NaiveDate) -> Vec<Period> {
        let mut periods = Vec::new();
        if end < start {
            return periods;
        }
        let last = Period::containing(end);
        let mut current = Some(Period::containing(start));
        while let Some(period) = current {
            periods.push(period);
            if period >= last {
                break;
            }
            current = period.next();
        }
        periods
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// A public holiday, excluded from business-day counting regardless of weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// The date of the holiday.
    pub date: NaiveDate,
    /// The name of the holiday (e.g., "신정").
    pub name: String,
}

/// The set of holiday dates used by the business calendar.
///
/// Duplicate dates collapse; a holiday falling on a weekend has no effect
/// on the business-day count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    dates: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    /// Builds a calendar from a list of holidays.
    pub fn from_holidays<'a, I>(holidays: I) -> Self
    where
        I: IntoIterator<Item = &'a Holiday>,
    {
        Self {
            dates: holidays.into_iter().map(|h| h.date).collect(),
        }
    }

    /// Adds a single holiday date.
    pub fn insert(&mut self, date: NaiveDate) {
        self.dates.insert(date);
    }

    /// Returns true if `date` is a declared holiday.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// Returns the holiday dates that fall within `period`.
    pub fn in_period(&self, period: Period) -> Vec<NaiveDate> {
        self.dates
            .range(period.first_day()..=period.last_day())
            .copied()
            .collect()
    }

    /// The number of distinct holiday dates.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns true if no holidays are declared.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl FromIterator<NaiveDate> for HolidayCalendar {
    fn from_iter<T: IntoIterator<Item = NaiveDate>>(iter: T) -> Self {
        Self {
            dates: iter.into_iter().collect(),
        }
    }
}
