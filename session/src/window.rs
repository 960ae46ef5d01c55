use chrono::{Days, FixedOffset, NaiveDate, TimeZone};

use crate::error::SessionError;

/// Build a fixed UTC offset from whole hours (`-23..=23`).
pub fn fixed_offset_hours(hours: i32) -> Result<FixedOffset, SessionError> {
    if !(-23..=23).contains(&hours) {
        return Err(SessionError::InvalidOffset(hours));
    }
    FixedOffset::east_opt(hours * 3600).ok_or(SessionError::InvalidOffset(hours))
}

/// An inclusive range of local calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Create a window. Fails if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, SessionError> {
        if start > end {
            return Err(SessionError::InvalidWindow(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// A window covering one date.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// The `days` dates before `end`, plus `end` itself.
    pub fn last_days(end: NaiveDate, days: u64) -> Self {
        let start = end.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    /// Parse `YYYY-MM-DD` bounds.
    pub fn parse(start: &str, end: &str) -> Result<Self, SessionError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Report whether `date` lies inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Inclusive Unix-second bounds of the window at the given offset.
    pub fn unix_bounds(&self, tz: &FixedOffset) -> Result<(i64, i64), SessionError> {
        let since = local_midnight(self.start, tz)?;
        let until = match self.end.succ_opt() {
            Some(next) => local_midnight(next, tz)? - 1,
            None => i64::MAX,
        };
        Ok((since, until))
    }
}

/// Parse a `YYYY-MM-DD` date.
pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, SessionError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| SessionError::InvalidDate(s.into()))
}

fn local_midnight(date: NaiveDate, tz: &FixedOffset) -> Result<i64, SessionError> {
    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| SessionError::InvalidDate(date.to_string()))?;
    tz.from_local_datetime(&naive)
        .single()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| SessionError::InvalidDate(date.to_string()))
}
