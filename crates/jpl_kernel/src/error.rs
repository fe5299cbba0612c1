//! Error types for kernel loading and evaluation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from DAF parsing or SPK segment evaluation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KernelError {
    #[error("cannot read kernel {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid kernel format: {0}")]
    InvalidFormat(String),

    #[error("segment for target {target} uses unsupported SPK data type {data_type}")]
    UnsupportedDataType { target: i32, data_type: i32 },

    #[error("no segment for target {target} relative to center {center}")]
    SegmentNotFound { target: i32, center: i32 },

    #[error("epoch {epoch_tdb_s} s TDB outside coverage of target {target} / center {center}")]
    EpochOutOfRange {
        target: i32,
        center: i32,
        epoch_tdb_s: f64,
    },
}

impl KernelError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }
}
