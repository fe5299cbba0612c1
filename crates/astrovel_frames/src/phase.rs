//! Phase points: a position with attached time-derivatives.
//!
//! A derivative is stored under a [`DifferentialKey`] naming its time
//! base, so the same point may carry km/s, km/day or km/yr rates.
//! Readers check [`VELOCITY_KEYS`] in order and take the first present.

use std::fmt;

use nalgebra::Vector3;

use crate::error::FrameError;
use crate::frame::ReferenceFrame;
use crate::rotation::FrameTransform;

pub const SECONDS_PER_JULIAN_YEAR: f64 = 365.25 * 86_400.0;

/// Time base of a differential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DifferentialKey {
    PerSecond,
    PerDay,
    PerJulianYear,
}

/// Lookup order when reading a velocity back from a phase point.
pub const VELOCITY_KEYS: [DifferentialKey; 3] = [
    DifferentialKey::PerSecond,
    DifferentialKey::PerDay,
    DifferentialKey::PerJulianYear,
];

impl DifferentialKey {
    pub fn label(self) -> &'static str {
        match self {
            Self::PerSecond => "s",
            Self::PerDay => "d",
            Self::PerJulianYear => "yr",
        }
    }

    /// Length of the time unit in seconds.
    pub fn unit_seconds(self) -> f64 {
        match self {
            Self::PerSecond => 1.0,
            Self::PerDay => 86_400.0,
            Self::PerJulianYear => SECONDS_PER_JULIAN_YEAR,
        }
    }
}

impl fmt::Display for DifferentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Position (km) and its time-derivatives (km per key unit).
#[derive(Debug, Clone, PartialEq)]
pub struct PhasePoint {
    position_km: Vector3<f64>,
    differentials: Vec<(DifferentialKey, Vector3<f64>)>,
}

impl PhasePoint {
    pub fn new(position_km: [f64; 3]) -> Self {
        Self {
            position_km: Vector3::from(position_km),
            differentials: Vec::new(),
        }
    }

    /// Attach (or replace) the derivative stored under `key`.
    pub fn with_differential(mut self, key: DifferentialKey, rate: [f64; 3]) -> Self {
        let rate = Vector3::from(rate);
        match self.differentials.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = rate,
            None => self.differentials.push((key, rate)),
        }
        self
    }

    pub fn position_km(&self) -> [f64; 3] {
        self.position_km.into()
    }

    pub fn differential(&self, key: DifferentialKey) -> Option<[f64; 3]> {
        self.differentials
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, d)| (*d).into())
    }

    pub fn keys(&self) -> impl Iterator<Item = DifferentialKey> + '_ {
        self.differentials.iter().map(|(k, _)| *k)
    }

    /// Apply `transform` to the position and every differential.
    pub fn transformed(&self, transform: &FrameTransform) -> PhasePoint {
        let r = &self.position_km;
        PhasePoint {
            position_km: transform.apply_position(r),
            differentials: self
                .differentials
                .iter()
                .map(|(key, d)| (*key, transform.apply_derivative(r, d, key.unit_seconds())))
                .collect(),
        }
    }

    /// Velocity in km/s from the first differential found in [`VELOCITY_KEYS`].
    pub fn velocity_km_s(&self) -> Result<[f64; 3], FrameError> {
        VELOCITY_KEYS
            .iter()
            .find_map(|&key| {
                self.differential(key)
                    .map(|d| d.map(|x| x / key.unit_seconds()))
            })
            .ok_or_else(|| FrameError::MissingDerivative {
                searched: join_labels(VELOCITY_KEYS.iter().copied()),
                present: join_labels(self.keys()),
            })
    }
}

fn join_labels(keys: impl Iterator<Item = DifferentialKey>) -> String {
    keys.map(DifferentialKey::label).collect::<Vec<_>>().join(", ")
}

/// A phase point realized in a reference frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePoint {
    pub frame: ReferenceFrame,
    pub point: PhasePoint,
}

impl FramePoint {
    pub fn new(frame: ReferenceFrame, point: PhasePoint) -> Self {
        Self { frame, point }
    }

    /// The same phase point expressed in `target`.
    pub fn realize_in(&self, target: ReferenceFrame) -> FramePoint {
        let transform = self.frame.transform_to(target);
        FramePoint {
            frame: target,
            point: self.point.transformed(&transform),
        }
    }
}
