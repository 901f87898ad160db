use chrono::{DateTime, Days, FixedOffset, NaiveDate, Offset, Utc};

use crate::core::{AppError, Result};

/// Brazil (Brasília time) has been a fixed UTC-3 since 2019
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = -3;

/// Decides what "today" is for due-date comparisons.
///
/// Timestamps are stored as UTC; only calendar dates are interpreted in the
/// business offset. A clock can be pinned to a date so date-driven rules are
/// reproducible.
#[derive(Debug, Clone, Copy)]
pub struct BusinessClock {
    offset: FixedOffset,
    pinned: Option<NaiveDate>,
}

impl BusinessClock {
    pub fn new(utc_offset_hours: i32) -> Result<Self> {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600).ok_or_else(|| {
            AppError::Configuration(format!("Invalid UTC offset: {}", utc_offset_hours))
        })?;
        Ok(Self {
            offset,
            pinned: None,
        })
    }

    /// A clock whose `today()` is always `date`
    pub fn pinned(date: NaiveDate) -> Self {
        Self {
            offset: Utc.fix(),
            pinned: Some(date),
        }
    }

    pub fn today(&self) -> NaiveDate {
        match self.pinned {
            Some(date) => date,
            None => Utc::now().with_timezone(&self.offset).date_naive(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl Default for BusinessClock {
    fn default() -> Self {
        Self {
            offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_HOURS * 3600)
                .unwrap_or_else(|| Utc.fix()),
            pinned: None,
        }
    }
}

/// `date + days`, failing instead of overflowing the calendar
pub fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| AppError::validation("Failed to calculate due date"))
}

/// Signed number of days from `today` until `due` (negative when overdue)
pub fn days_until(due: NaiveDate, today: NaiveDate) -> i64 {
    (due - today).num_days()
}
