//! Time scales for ephemeris lookups.
//!
//! - Julian Date and Gregorian calendar arithmetic ([`julian`])
//! - NAIF leapseconds kernel parsing with a built-in fallback table ([`lsk`])
//! - UTC, TAI, TT and TDB conversions ([`scales`])
//! - [`Instant`]: ISO text parsed on an explicit [`TimeScale`]

pub mod error;
pub mod instant;
pub mod julian;
pub mod lsk;
pub mod scales;

use std::path::Path;

pub use error::TimeError;
pub use instant::{CalendarTime, Instant};
pub use julian::{J2000_JD, SECONDS_PER_DAY, calendar_to_jd, jd_to_calendar};
pub use lsk::LskData;
pub use scales::TimeScale;

/// Leap-second table and TDB model used by time-scale conversions.
#[derive(Debug, Clone, PartialEq)]
pub struct LeapSecondKernel {
    data: LskData,
}

impl LeapSecondKernel {
    /// Load an LSK text file (e.g. `naif0012.tls`).
    pub fn load(path: &Path) -> Result<Self, TimeError> {
        let content = std::fs::read_to_string(path)?;
        let kernel = Self::parse(&content)?;
        log::debug!(
            "loaded LSK {} ({} leap-second entries)",
            path.display(),
            kernel.data.leap_seconds.len()
        );
        Ok(kernel)
    }

    /// Parse LSK text.
    pub fn parse(content: &str) -> Result<Self, TimeError> {
        Ok(Self {
            data: lsk::parse_lsk(content)?,
        })
    }

    /// Built-in table, current through the 2017-01-01 leap second.
    pub fn builtin() -> Self {
        Self {
            data: LskData::builtin(),
        }
    }

    pub fn data(&self) -> &LskData {
        &self.data
    }

    /// UTC seconds past J2000 to TDB seconds past J2000.
    pub fn utc_to_tdb(&self, utc_s: f64) -> Result<f64, TimeError> {
        scales::convert(utc_s, TimeScale::Utc, TimeScale::Tdb, &self.data)
    }

    /// TDB seconds past J2000 to UTC seconds past J2000.
    pub fn tdb_to_utc(&self, tdb_s: f64) -> Result<f64, TimeError> {
        scales::convert(tdb_s, TimeScale::Tdb, TimeScale::Utc, &self.data)
    }
}

impl Default for LeapSecondKernel {
    fn default() -> Self {
        Self::builtin()
    }
}
