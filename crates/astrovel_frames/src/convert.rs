//! Velocity conversion between reference frames.
//!
//! The velocity is attached to an anchor position and the whole phase
//! point is transformed, so a rotating transform contributes its
//! `(dR/dt) r` term. Between the built-in frames that term vanishes and
//! the result does not depend on the anchor.

use crate::error::FrameError;
use crate::frame::ReferenceFrame;
use crate::phase::{DifferentialKey, FramePoint, PhasePoint};
use crate::rotation::FrameTransform;

/// One parsec in km.
pub const PARSEC_KM: f64 = 3.085_677_581_491_367_3e13;

/// Anchor used when the caller gives none: 1 pc along each axis.
pub const DEFAULT_ANCHOR_KM: [f64; 3] = [PARSEC_KM; 3];

/// Re-express a velocity (km/s) given in `from` in the basis of `to`.
pub fn convert_velocity(
    velocity_km_s: [f64; 3],
    from: ReferenceFrame,
    to: ReferenceFrame,
) -> Result<[f64; 3], FrameError> {
    convert_velocity_with_anchor(velocity_km_s, DEFAULT_ANCHOR_KM, from, to)
}

/// As [`convert_velocity`], with an explicit anchor position in `from`.
pub fn convert_velocity_with_anchor(
    velocity_km_s: [f64; 3],
    anchor_km: [f64; 3],
    from: ReferenceFrame,
    to: ReferenceFrame,
) -> Result<[f64; 3], FrameError> {
    check_finite(&velocity_km_s, "velocity")?;
    check_finite(&anchor_km, "anchor position")?;

    let point = FramePoint::new(
        from,
        PhasePoint::new(anchor_km).with_differential(DifferentialKey::PerSecond, velocity_km_s),
    );
    let realized = point.realize_in(to);
    log::debug!("converted velocity {from} -> {to}");
    realized.point.velocity_km_s()
}

/// Transform a velocity through an arbitrary, possibly rotating, transform.
pub fn transform_velocity(
    velocity_km_s: [f64; 3],
    anchor_km: [f64; 3],
    transform: &FrameTransform,
) -> Result<[f64; 3], FrameError> {
    check_finite(&velocity_km_s, "velocity")?;
    check_finite(&anchor_km, "anchor position")?;
    PhasePoint::new(anchor_km)
        .with_differential(DifferentialKey::PerSecond, velocity_km_s)
        .transformed(transform)
        .velocity_km_s()
}

/// Euclidean norm of a 3-vector.
pub fn norm(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

fn check_finite(v: &[f64; 3], what: &'static str) -> Result<(), FrameError> {
    if v.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(FrameError::NonFiniteInput { what })
    }
}
