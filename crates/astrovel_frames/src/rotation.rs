//! Passive rotation matrices and time-dependent frame transforms.

use nalgebra::{Matrix3, Vector3};

/// Coordinate rotation about x by `angle` radians.
pub fn rot_x(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c)
}

/// Coordinate rotation about y by `angle` radians.
pub fn rot_y(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c)
}

/// Coordinate rotation about z by `angle` radians.
pub fn rot_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}

/// Rotation `R` between two frames together with its rate `dR/dt` (per second).
///
/// Positions map as `r' = R r` and velocities as `v' = R v + (dR/dt) r`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransform {
    rotation: Matrix3<f64>,
    rate: Matrix3<f64>,
}

impl FrameTransform {
    pub fn identity() -> Self {
        Self::fixed(Matrix3::identity())
    }

    /// A transform between mutually non-rotating frames.
    pub fn fixed(rotation: Matrix3<f64>) -> Self {
        Self {
            rotation,
            rate: Matrix3::zeros(),
        }
    }

    /// A transform whose rotation changes at `rate` per second.
    pub fn spinning(rotation: Matrix3<f64>, rate: Matrix3<f64>) -> Self {
        Self { rotation, rate }
    }

    /// Uniform spin about z: `R = Rz(angle)`, `dR/dt = omega * dRz/dangle`.
    pub fn spin_z(angle: f64, omega_rad_s: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let d = Matrix3::new(-s, c, 0.0, -c, -s, 0.0, 0.0, 0.0, 0.0);
        Self::spinning(rot_z(angle), d * omega_rad_s)
    }

    pub fn rotation(&self) -> &Matrix3<f64> {
        &self.rotation
    }

    pub fn rate(&self) -> &Matrix3<f64> {
        &self.rate
    }

    pub fn is_fixed(&self) -> bool {
        self.rate.iter().all(|&x| x == 0.0)
    }

    /// `self` followed by `next`, by the product rule.
    pub fn then(&self, next: &FrameTransform) -> FrameTransform {
        FrameTransform {
            rotation: next.rotation * self.rotation,
            rate: next.rate * self.rotation + next.rotation * self.rate,
        }
    }

    /// The reverse transform: `R^T` and `d(R^T)/dt = (dR/dt)^T`.
    pub fn inverse(&self) -> FrameTransform {
        FrameTransform {
            rotation: self.rotation.transpose(),
            rate: self.rate.transpose(),
        }
    }

    pub fn apply_position(&self, r: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * r
    }

    /// Transform a time-derivative `dr` expressed per `unit_seconds`.
    pub fn apply_derivative(
        &self,
        r: &Vector3<f64>,
        dr: &Vector3<f64>,
        unit_seconds: f64,
    ) -> Vector3<f64> {
        self.rotation * dr + self.rate * r * unit_seconds
    }
}

impl Default for FrameTransform {
    fn default() -> Self {
        Self::identity()
    }
}
