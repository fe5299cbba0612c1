//! Solar-system bodies addressable in an SPK kernel.

use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// Bodies with NAIF codes in the JPL planetary ephemerides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Body {
    Sun,
    Mercury,
    Venus,
    Earth,
    Moon,
    EarthMoonBarycenter,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl Body {
    pub const ALL: [Body; 12] = [
        Self::Sun,
        Self::Mercury,
        Self::Venus,
        Self::Earth,
        Self::Moon,
        Self::EarthMoonBarycenter,
        Self::Mars,
        Self::Jupiter,
        Self::Saturn,
        Self::Uranus,
        Self::Neptune,
        Self::Pluto,
    ];

    /// NAIF body code.
    pub const fn code(self) -> i32 {
        match self {
            Self::Sun => 10,
            Self::Mercury => 199,
            Self::Venus => 299,
            Self::Earth => 399,
            Self::Moon => 301,
            Self::EarthMoonBarycenter => 3,
            Self::Mars => 499,
            Self::Jupiter => 599,
            Self::Saturn => 699,
            Self::Uranus => 799,
            Self::Neptune => 899,
            Self::Pluto => 999,
        }
    }

    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            10 => Some(Self::Sun),
            199 => Some(Self::Mercury),
            299 => Some(Self::Venus),
            399 => Some(Self::Earth),
            301 => Some(Self::Moon),
            3 => Some(Self::EarthMoonBarycenter),
            499 => Some(Self::Mars),
            599 => Some(Self::Jupiter),
            699 => Some(Self::Saturn),
            799 => Some(Self::Uranus),
            899 => Some(Self::Neptune),
            999 => Some(Self::Pluto),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sun => "sun",
            Self::Mercury => "mercury",
            Self::Venus => "venus",
            Self::Earth => "earth",
            Self::Moon => "moon",
            Self::EarthMoonBarycenter => "earth-moon-barycenter",
            Self::Mars => "mars",
            Self::Jupiter => "jupiter",
            Self::Saturn => "saturn",
            Self::Uranus => "uranus",
            Self::Neptune => "neptune",
            Self::Pluto => "pluto",
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Body {
    type Err = EngineError;

    /// Accepts names (any case, `-`/`_`/space interchangeable) or NAIF codes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let not_found = || EngineError::BodyNotFound(s.to_string());
        let key = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        if let Ok(code) = key.parse::<i32>() {
            return Body::from_code(code).ok_or_else(not_found);
        }
        match key.as_str() {
            "emb" | "earth-barycenter" => Ok(Self::EarthMoonBarycenter),
            "luna" => Ok(Self::Moon),
            _ => Self::ALL
                .into_iter()
                .find(|b| b.name() == key)
                .ok_or_else(not_found),
        }
    }
}

/// Origin a state vector is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Observer {
    SolarSystemBarycenter,
    Body(Body),
}

impl Observer {
    pub const fn code(self) -> i32 {
        match self {
            Self::SolarSystemBarycenter => 0,
            Self::Body(body) => body.code(),
        }
    }
}

impl From<Body> for Observer {
    fn from(body: Body) -> Self {
        Self::Body(body)
    }
}

impl fmt::Display for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SolarSystemBarycenter => f.write_str("solar-system-barycenter"),
            Self::Body(body) => body.fmt(f),
        }
    }
}
