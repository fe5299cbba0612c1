//! Calendar instants tagged with a time scale.

use std::fmt;

use crate::LeapSecondKernel;
use crate::error::TimeError;
use crate::julian::{
    J2000_JD, SECONDS_PER_DAY, calendar_to_jd, days_in_month, j2000_seconds_to_jd, jd_to_calendar,
};
use crate::scales::{self, TimeScale};

/// Years accepted by calendar parsing.
pub const MIN_YEAR: i32 = -9999;
pub const MAX_YEAR: i32 = 9999;

/// Broken-down calendar date and time of day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: f64,
}

impl CalendarTime {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: f64) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    fn validate(&self, text: &str) -> Result<(), TimeError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(TimeError::invalid(
                text,
                format!("year {} outside {MIN_YEAR}..={MAX_YEAR}", self.year),
            ));
        }
        let max_day = days_in_month(self.year, self.month)
            .ok_or_else(|| TimeError::invalid(text, format!("month {} out of range", self.month)))?;
        if self.day == 0 || self.day > max_day {
            return Err(TimeError::invalid(
                text,
                format!("day {} out of range for {:04}-{:02}", self.day, self.year, self.month),
            ));
        }
        if self.hour > 23 {
            return Err(TimeError::invalid(text, format!("hour {} out of range", self.hour)));
        }
        if self.minute > 59 {
            return Err(TimeError::invalid(text, format!("minute {} out of range", self.minute)));
        }
        if !(0.0..60.0).contains(&self.second) {
            return Err(TimeError::invalid(text, format!("second {} out of range", self.second)));
        }
        Ok(())
    }
}

impl fmt::Display for CalendarTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:",
            self.year, self.month, self.day, self.hour, self.minute
        )?;
        let whole = self.second.trunc();
        if (self.second - whole).abs() < 1e-9 {
            write!(f, "{:02}", whole as u32)
        } else {
            write!(f, "{:09.6}", self.second)
        }
    }
}

/// A point in time: seconds past J2000.0 (`2000-01-01T12:00:00`) on `scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instant {
    seconds: f64,
    scale: TimeScale,
}

impl Instant {
    pub fn from_j2000_seconds(seconds: f64, scale: TimeScale) -> Result<Self, TimeError> {
        if !seconds.is_finite() {
            return Err(TimeError::NonFinite);
        }
        Ok(Self { seconds, scale })
    }

    /// J2000.0 on the given scale.
    pub fn j2000(scale: TimeScale) -> Self {
        Self { seconds: 0.0, scale }
    }

    /// Instant for a validated calendar date and time.
    pub fn from_calendar(cal: CalendarTime, scale: TimeScale) -> Result<Self, TimeError> {
        if !cal.second.is_finite() {
            return Err(TimeError::NonFinite);
        }
        cal.validate(&cal.to_string())?;
        // Midnight JDs are exact half-integers, so whole days stay exact.
        let midnight = calendar_to_jd(cal.year, cal.month, f64::from(cal.day));
        let seconds = (midnight - J2000_JD) * SECONDS_PER_DAY
            + f64::from(cal.hour) * 3600.0
            + f64::from(cal.minute) * 60.0
            + cal.second;
        Ok(Self { seconds, scale })
    }

    /// Parse `YYYY-MM-DD`, `YYYY-MM-DDThh:mm[:ss[.fff]]` or the same with a
    /// space in place of `T`. A trailing `Z` is accepted for UTC only.
    pub fn parse(text: &str, scale: TimeScale) -> Result<Self, TimeError> {
        let trimmed = text.trim();
        let body = match trimmed.strip_suffix(['Z', 'z']) {
            Some(rest) if scale == TimeScale::Utc => rest,
            Some(_) => {
                return Err(TimeError::invalid(
                    text,
                    format!("'Z' suffix denotes UTC, not {scale}"),
                ));
            }
            None => trimmed,
        };

        let (date, time) = match body.split_once(['T', ' ']) {
            Some((d, t)) => (d, Some(t.trim())),
            None => (body, None),
        };

        let mut date_parts = date.split('-');
        let year = parse_field::<i32>(text, date_parts.next(), "year", 4)?;
        let month = parse_field::<u32>(text, date_parts.next(), "month", 2)?;
        let day = parse_field::<u32>(text, date_parts.next(), "day", 2)?;
        if date_parts.next().is_some() {
            return Err(TimeError::invalid(text, "date has more than three fields"));
        }

        let (hour, minute, second) = match time {
            None => (0, 0, 0.0),
            Some(t) => {
                let mut parts = t.split(':');
                let hour = parse_field::<u32>(text, parts.next(), "hour", 2)?;
                let minute = parse_field::<u32>(text, parts.next(), "minute", 2)?;
                let second = match parts.next() {
                    None => 0.0,
                    Some(s) => parse_seconds(text, s)?,
                };
                if parts.next().is_some() {
                    return Err(TimeError::invalid(text, "time has more than three fields"));
                }
                (hour, minute, second)
            }
        };

        let cal = CalendarTime::new(year, month, day, hour, minute, second);
        cal.validate(text)?;
        Self::from_calendar(cal, scale)
    }

    pub fn scale(&self) -> TimeScale {
        self.scale
    }

    pub fn seconds_past_j2000(&self) -> f64 {
        self.seconds
    }

    pub fn jd(&self) -> f64 {
        j2000_seconds_to_jd(self.seconds)
    }

    /// Calendar reading on this instant's own scale, rounded to microseconds.
    pub fn calendar(&self) -> CalendarTime {
        let from_midnight = self.seconds + SECONDS_PER_DAY / 2.0;
        let mut day_index = (from_midnight / SECONDS_PER_DAY).floor();
        let mut sod = ((from_midnight - day_index * SECONDS_PER_DAY) * 1e6).round() / 1e6;
        if sod >= SECONDS_PER_DAY {
            day_index += 1.0;
            sod -= SECONDS_PER_DAY;
        }
        let (year, month, day) = jd_to_calendar(J2000_JD - 0.5 + day_index);
        let hour = (sod / 3600.0).floor();
        let minute = ((sod - hour * 3600.0) / 60.0).floor();
        CalendarTime {
            year,
            month,
            day: day.round() as u32,
            hour: hour as u32,
            minute: minute as u32,
            second: sod - hour * 3600.0 - minute * 60.0,
        }
    }

    /// The same instant expressed on another scale.
    pub fn to_scale(&self, target: TimeScale, lsk: &LeapSecondKernel) -> Result<Self, TimeError> {
        let seconds = scales::convert(self.seconds, self.scale, target, lsk.data())?;
        Ok(Self {
            seconds,
            scale: target,
        })
    }

    /// TDB seconds past J2000, the argument of ephemeris lookups.
    pub fn to_tdb_seconds(&self, lsk: &LeapSecondKernel) -> Result<f64, TimeError> {
        Ok(self.to_scale(TimeScale::Tdb, lsk)?.seconds)
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.calendar().fmt(f)
    }
}

fn parse_field<T: std::str::FromStr>(
    text: &str,
    field: Option<&str>,
    name: &str,
    min_digits: usize,
) -> Result<T, TimeError> {
    let field = field.ok_or_else(|| TimeError::invalid(text, format!("missing {name}")))?;
    let digits = field.strip_prefix(['-', '+']).unwrap_or(field);
    if digits.len() < min_digits || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeError::invalid(text, format!("bad {name} {field:?}")));
    }
    field
        .parse()
        .map_err(|_| TimeError::invalid(text, format!("bad {name} {field:?}")))
}

fn parse_seconds(text: &str, field: &str) -> Result<f64, TimeError> {
    let (whole, frac) = field.split_once('.').unwrap_or((field, ""));
    let digits_ok = whole.len() == 2
        && whole.bytes().all(|b| b.is_ascii_digit())
        && frac.bytes().all(|b| b.is_ascii_digit());
    if !digits_ok {
        return Err(TimeError::invalid(text, format!("bad second {field:?}")));
    }
    field
        .parse()
        .map_err(|_| TimeError::invalid(text, format!("bad second {field:?}")))
}
