//! SPK segments and their evaluation.
//!
//! Supports the Chebyshev data types used by the JPL planetary
//! ephemerides: Type 2 (position only, velocity by differentiation) and
//! Type 3 (separate position and velocity series).

use crate::chebyshev::{clenshaw, clenshaw_with_derivative, normalise};
use crate::daf::{DafFile, DafSummary, whole_words};
use crate::error::KernelError;

/// SPK summaries carry 2 doubles and 6 integers.
const SPK_ND: usize = 2;
const SPK_NI: usize = 6;
/// INIT, INTLEN, RSIZE, N.
const TRAILER_WORDS: usize = 4;

/// Position (km) and velocity (km/s) of a target relative to its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpkEvaluation {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

/// Fixed-length record directory from the segment trailer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordLayout {
    pub init_tdb_s: f64,
    pub interval_s: f64,
    pub record_words: usize,
    pub record_count: usize,
    pub coeffs_per_component: usize,
}

/// Metadata for one SPK segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SpkSegment {
    pub name: String,
    pub start_tdb_s: f64,
    pub end_tdb_s: f64,
    pub target: i32,
    pub center: i32,
    /// NAIF frame id; 1 is J2000/ICRF.
    pub frame: i32,
    pub data_type: i32,
    pub start_address: usize,
    pub end_address: usize,
    /// `None` for data types this reader does not evaluate.
    pub layout: Option<RecordLayout>,
}

impl SpkSegment {
    pub(crate) fn from_summary(summary: &DafSummary, daf: &DafFile) -> Result<Self, KernelError> {
        if summary.doubles.len() < SPK_ND || summary.ints.len() < SPK_NI {
            return Err(KernelError::format(format!(
                "segment {:?} has a short summary",
                summary.name
            )));
        }
        let start_address = summary.ints[4];
        let end_address = summary.ints[5];
        if start_address <= 0 || end_address < start_address {
            return Err(KernelError::format(format!(
                "segment {:?} has bad address range {start_address}..{end_address}",
                summary.name
            )));
        }

        let mut segment = Self {
            name: summary.name.clone(),
            start_tdb_s: summary.doubles[0],
            end_tdb_s: summary.doubles[1],
            target: summary.ints[0],
            center: summary.ints[1],
            frame: summary.ints[2],
            data_type: summary.ints[3],
            start_address: start_address as usize,
            end_address: end_address as usize,
            layout: None,
        };

        if let Some(components) = components_for(segment.data_type) {
            segment.layout = Some(segment.read_layout(daf, components)?);
        }
        Ok(segment)
    }

    fn read_layout(&self, daf: &DafFile, components: usize) -> Result<RecordLayout, KernelError> {
        let array_words = self.end_address - self.start_address + 1;
        if array_words < TRAILER_WORDS {
            return Err(KernelError::format(format!(
                "segment {:?} holds {array_words} words, too few for a record trailer",
                self.name
            )));
        }
        let mut trailer = [0.0; TRAILER_WORDS];
        daf.read_words(self.end_address + 1 - TRAILER_WORDS, &mut trailer)?;
        let [init, interval, rsize, n] = trailer;

        let bad_trailer = || {
            KernelError::format(format!(
                "segment {:?} has bad trailer: init={init} intlen={interval} rsize={rsize} n={n}",
                self.name
            ))
        };
        let record_words = whole_words(rsize, array_words).ok_or_else(bad_trailer)?;
        let record_count = whole_words(n, array_words).ok_or_else(bad_trailer)?;
        if !init.is_finite()
            || !(interval.is_finite() && interval > 0.0)
            || record_words < 2 + components
            || record_count == 0
        {
            return Err(bad_trailer());
        }
        if (record_words - 2) % components != 0 {
            return Err(KernelError::format(format!(
                "segment {:?}: record size {record_words} does not fit {components} series",
                self.name
            )));
        }
        let filled = record_words
            .checked_mul(record_count)
            .and_then(|w| w.checked_add(TRAILER_WORDS));
        if filled != Some(array_words) {
            return Err(KernelError::format(format!(
                "segment {:?}: {record_count} records of {record_words} words do not fill {array_words} words",
                self.name
            )));
        }

        Ok(RecordLayout {
            init_tdb_s: init,
            interval_s: interval,
            record_words,
            record_count,
            coeffs_per_component: (record_words - 2) / components,
        })
    }

    /// Whether the segment's coverage includes `epoch_tdb_s`.
    pub fn covers(&self, epoch_tdb_s: f64) -> bool {
        epoch_tdb_s >= self.start_tdb_s && epoch_tdb_s <= self.end_tdb_s
    }

    /// Evaluate the segment at an epoch in TDB seconds past J2000.
    pub fn evaluate(&self, daf: &DafFile, epoch_tdb_s: f64) -> Result<SpkEvaluation, KernelError> {
        let layout = self.layout.ok_or(KernelError::UnsupportedDataType {
            target: self.target,
            data_type: self.data_type,
        })?;
        if !self.covers(epoch_tdb_s) {
            return Err(self.out_of_range(epoch_tdb_s));
        }

        let elapsed = epoch_tdb_s - layout.init_tdb_s;
        if elapsed < 0.0 {
            return Err(self.out_of_range(epoch_tdb_s));
        }
        let index = ((elapsed / layout.interval_s).floor() as usize).min(layout.record_count - 1);

        let mut record = vec![0.0; layout.record_words];
        daf.read_words(self.start_address + index * layout.record_words, &mut record)?;

        let (mid, radius) = (record[0], record[1]);
        let s = normalise(epoch_tdb_s, mid, radius);
        let n = layout.coeffs_per_component;
        let series = |k: usize| &record[2 + k * n..2 + (k + 1) * n];

        let mut out = SpkEvaluation {
            position_km: [0.0; 3],
            velocity_km_s: [0.0; 3],
        };
        match self.data_type {
            2 => {
                for axis in 0..3 {
                    let (value, slope) = clenshaw_with_derivative(series(axis), s);
                    out.position_km[axis] = value;
                    out.velocity_km_s[axis] = slope / radius;
                }
            }
            _ => {
                for axis in 0..3 {
                    out.position_km[axis] = clenshaw(series(axis), s);
                    out.velocity_km_s[axis] = clenshaw(series(axis + 3), s);
                }
            }
        }
        Ok(out)
    }

    fn out_of_range(&self, epoch_tdb_s: f64) -> KernelError {
        KernelError::EpochOutOfRange {
            target: self.target,
            center: self.center,
            epoch_tdb_s,
        }
    }
}

/// Number of Chebyshev series per record for the supported data types.
fn components_for(data_type: i32) -> Option<usize> {
    match data_type {
        2 => Some(3),
        3 => Some(6),
        _ => None,
    }
}
