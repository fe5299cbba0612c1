//! Engine error type.

use astrovel_frames::FrameError;
use astrovel_time::TimeError;
use jpl_kernel::KernelError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The ephemeris name is unknown, its kernel is missing, or the file
    /// is not an SPK.
    #[error("unsupported ephemeris {name:?}: {reason}")]
    UnsupportedEphemeris { name: String, reason: String },
    #[error("invalid time: {0}")]
    InvalidTime(#[from] TimeError),
    /// Unknown body name, or a body the selected kernel does not cover.
    #[error("body not found: {0}")]
    BodyNotFound(String),
    #[error("epoch {epoch_tdb_s} s TDB past J2000 is outside the coverage of {ephemeris}")]
    EpochOutOfRange { epoch_tdb_s: f64, ephemeris: String },
    #[error("kernel load error: {0}")]
    KernelLoad(String),
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error("invalid query: {0}")]
    InvalidQuery(&'static str),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),
}
