//! Celestial reference frames and velocity conversion.
//!
//! Frames are related by rotations with an explicit time-derivative
//! ([`FrameTransform`]). Velocities are converted by transforming a full
//! phase point, `v' = R v + (dR/dt) r`, and reading the derivative back
//! through an ordered list of time bases ([`VELOCITY_KEYS`]).

pub mod convert;
pub mod error;
pub mod frame;
pub mod obliquity;
pub mod phase;
pub mod rotation;

pub use convert::{
    DEFAULT_ANCHOR_KM, PARSEC_KM, convert_velocity, convert_velocity_with_anchor, norm,
    transform_velocity,
};
pub use error::FrameError;
pub use frame::ReferenceFrame;
pub use obliquity::{OBLIQUITY_J2000_DEG, OBLIQUITY_J2000_RAD};
pub use phase::{DifferentialKey, FramePoint, PhasePoint, VELOCITY_KEYS};
pub use rotation::FrameTransform;
