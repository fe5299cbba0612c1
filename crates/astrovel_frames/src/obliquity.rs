//! Mean obliquity of the ecliptic at J2000.0.
//!
//! IAU 1976 value, 84381.448 arcseconds, as used by the NAIF
//! `ECLIPJ2000` frame.

pub const OBLIQUITY_J2000_ARCSEC: f64 = 84_381.448;

pub const OBLIQUITY_J2000_DEG: f64 = OBLIQUITY_J2000_ARCSEC / 3600.0;

pub const OBLIQUITY_J2000_RAD: f64 = OBLIQUITY_J2000_DEG * std::f64::consts::PI / 180.0;
