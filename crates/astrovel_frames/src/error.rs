//! Errors from frame parsing and velocity conversion.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FrameError {
    #[error(
        "unsupported frame {0:?} (expected one of: icrs, galactic, fk5, ecliptic, supergalactic)"
    )]
    UnsupportedFrame(String),
    /// The transformed phase point carries no time-derivative under any
    /// known key.
    #[error(
        "transformed phase point has no velocity differential under keys [{searched}]; \
         present keys: [{present}]; inspect the differential keys of the point"
    )]
    MissingDerivative { searched: String, present: String },
    #[error("{what} has a non-finite component")]
    NonFiniteInput { what: &'static str },
}
