//! Conversions between UTC, TAI, TT and TDB.
//!
//! All values are seconds past J2000.0 on their own scale.
//!
//! ```text
//! UTC --(+DELTA_AT)--> TAI --(+32.184 s)--> TT --(+K sin E)--> TDB
//! ```
//!
//! TDB - TT follows the single-term NAIF model
//! `K sin(E)`, `E = M + EB sin(M)`, `M = M0 + M1 t`, good to about 30 us.

use std::fmt;
use std::str::FromStr;

use crate::error::TimeError;
use crate::lsk::LskData;

/// A time scale in which an instant may be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeScale {
    Utc,
    Tai,
    Tt,
    Tdb,
}

impl TimeScale {
    pub const ALL: [TimeScale; 4] = [Self::Utc, Self::Tai, Self::Tt, Self::Tdb];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Utc => "UTC",
            Self::Tai => "TAI",
            Self::Tt => "TT",
            Self::Tdb => "TDB",
        }
    }
}

impl fmt::Display for TimeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeScale {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scale| scale.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TimeError::UnknownScale(s.to_string()))
    }
}

/// TAI - UTC in effect at `utc_s`.
pub fn delta_at(utc_s: f64, lsk: &LskData) -> Result<f64, TimeError> {
    lsk.leap_seconds
        .iter()
        .rev()
        .find(|&&(_, epoch)| utc_s >= epoch)
        .map(|&(delta, _)| delta)
        .ok_or(TimeError::Pre1972Utc)
}

pub fn utc_to_tai(utc_s: f64, lsk: &LskData) -> Result<f64, TimeError> {
    Ok(utc_s + delta_at(utc_s, lsk)?)
}

/// Inverse of [`utc_to_tai`]. TAI inside an inserted leap second maps to
/// the start of the following UTC day.
pub fn tai_to_utc(tai_s: f64, lsk: &LskData) -> Result<f64, TimeError> {
    lsk.leap_seconds
        .iter()
        .rev()
        .find(|&&(delta, epoch)| tai_s - delta >= epoch)
        .map(|&(delta, _)| tai_s - delta)
        .ok_or(TimeError::Pre1972Utc)
}

pub fn tai_to_tt(tai_s: f64, lsk: &LskData) -> f64 {
    tai_s + lsk.delta_t_a
}

pub fn tt_to_tai(tt_s: f64, lsk: &LskData) -> f64 {
    tt_s - lsk.delta_t_a
}

/// TDB - TT in seconds at `t` seconds past J2000.
pub fn tdb_minus_tt(t: f64, lsk: &LskData) -> f64 {
    let m = lsk.m0 + lsk.m1 * t;
    let e = m + lsk.eb * m.sin();
    lsk.k * e.sin()
}

pub fn tt_to_tdb(tt_s: f64, lsk: &LskData) -> f64 {
    tt_s + tdb_minus_tt(tt_s, lsk)
}

/// Fixed-point inverse of [`tt_to_tdb`]; three passes reach f64 precision.
pub fn tdb_to_tt(tdb_s: f64, lsk: &LskData) -> f64 {
    let mut tt = tdb_s;
    for _ in 0..3 {
        tt = tdb_s - tdb_minus_tt(tt, lsk);
    }
    tt
}

/// Convert seconds past J2000 from one scale to another.
pub fn convert(seconds: f64, from: TimeScale, to: TimeScale, lsk: &LskData) -> Result<f64, TimeError> {
    if from == to {
        return Ok(seconds);
    }
    let tai = match from {
        TimeScale::Utc => utc_to_tai(seconds, lsk)?,
        TimeScale::Tai => seconds,
        TimeScale::Tt => tt_to_tai(seconds, lsk),
        TimeScale::Tdb => tt_to_tai(tdb_to_tt(seconds, lsk), lsk),
    };
    match to {
        TimeScale::Utc => tai_to_utc(tai, lsk),
        TimeScale::Tai => Ok(tai),
        TimeScale::Tt => Ok(tai_to_tt(tai, lsk)),
        TimeScale::Tdb => Ok(tt_to_tdb(tai_to_tt(tai, lsk), lsk)),
    }
}
