//! Supported celestial reference frames and their orientation relative to ICRS.
//!
//! All built-in frames are inertial and mutually non-rotating, so every
//! transform between them has `dR/dt = 0`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use nalgebra::Matrix3;

use crate::error::FrameError;
use crate::obliquity::OBLIQUITY_J2000_RAD;
use crate::rotation::{FrameTransform, rot_x, rot_y, rot_z};

/// FK5 (J2000) right ascension of the north galactic pole, degrees.
pub const GALACTIC_POLE_RA_DEG: f64 = 192.859_481_206_534_8;
/// FK5 (J2000) declination of the north galactic pole, degrees.
pub const GALACTIC_POLE_DEC_DEG: f64 = 27.128_251_180_856_22;
/// Galactic longitude of the north celestial pole, degrees.
pub const GALACTIC_NCP_LON_DEG: f64 = 122.931_918_568_002_6;
/// Galactic longitude of the north supergalactic pole, degrees.
pub const SUPERGALACTIC_POLE_L_DEG: f64 = 47.37;
/// Galactic latitude of the north supergalactic pole, degrees.
pub const SUPERGALACTIC_POLE_B_DEG: f64 = 6.32;

const MAS_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3_600_000.0);

/// ICRS to FK5 J2000 frame bias (Hipparcos values).
static ICRS_TO_FK5: LazyLock<Matrix3<f64>> = LazyLock::new(|| {
    let eta0 = -19.9 * MAS_TO_RAD;
    let xi0 = 9.1 * MAS_TO_RAD;
    let da0 = -22.9 * MAS_TO_RAD;
    rot_x(-eta0) * rot_y(xi0) * rot_z(da0)
});

static FK5_TO_GALACTIC: LazyLock<Matrix3<f64>> = LazyLock::new(|| {
    rot_z((180.0 - GALACTIC_NCP_LON_DEG).to_radians())
        * rot_y((90.0 - GALACTIC_POLE_DEC_DEG).to_radians())
        * rot_z(GALACTIC_POLE_RA_DEG.to_radians())
});

static GALACTIC_TO_SUPERGALACTIC: LazyLock<Matrix3<f64>> = LazyLock::new(|| {
    rot_z(90.0_f64.to_radians())
        * rot_y((90.0 - SUPERGALACTIC_POLE_B_DEG).to_radians())
        * rot_z(SUPERGALACTIC_POLE_L_DEG.to_radians())
});

/// A celestial reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceFrame {
    /// International Celestial Reference System.
    Icrs,
    /// IAU 1958 galactic coordinates.
    Galactic,
    /// FK5, mean equator and equinox of J2000.
    Fk5,
    /// Mean ecliptic and equinox of J2000.
    EclipticJ2000,
    /// De Vaucouleurs supergalactic coordinates.
    Supergalactic,
}

impl ReferenceFrame {
    pub const ALL: [ReferenceFrame; 5] = [
        Self::Icrs,
        Self::Galactic,
        Self::Fk5,
        Self::EclipticJ2000,
        Self::Supergalactic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Icrs => "icrs",
            Self::Galactic => "galactic",
            Self::Fk5 => "fk5",
            Self::EclipticJ2000 => "ecliptic",
            Self::Supergalactic => "supergalactic",
        }
    }

    /// Transform taking ICRS coordinates into this frame.
    pub fn from_icrs(self) -> FrameTransform {
        let m = match self {
            Self::Icrs => Matrix3::identity(),
            Self::Fk5 => *ICRS_TO_FK5,
            Self::Galactic => *FK5_TO_GALACTIC * *ICRS_TO_FK5,
            Self::EclipticJ2000 => rot_x(OBLIQUITY_J2000_RAD),
            Self::Supergalactic => *GALACTIC_TO_SUPERGALACTIC * *FK5_TO_GALACTIC * *ICRS_TO_FK5,
        };
        FrameTransform::fixed(m)
    }

    /// Transform taking this frame's coordinates into ICRS.
    pub fn to_icrs(self) -> FrameTransform {
        self.from_icrs().inverse()
    }

    /// Transform from this frame to `target`, composed through ICRS.
    pub fn transform_to(self, target: ReferenceFrame) -> FrameTransform {
        if self == target {
            return FrameTransform::identity();
        }
        log::trace!("composing {self} -> icrs -> {target}");
        self.to_icrs().then(&target.from_icrs())
    }
}

impl fmt::Display for ReferenceFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReferenceFrame {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "icrs" | "icrf" => Ok(Self::Icrs),
            "galactic" | "gal" => Ok(Self::Galactic),
            "fk5" | "fk5j2000" => Ok(Self::Fk5),
            "ecliptic" | "eclipticj2000" | "eclipj2000" => Ok(Self::EclipticJ2000),
            "supergalactic" => Ok(Self::Supergalactic),
            _ => Err(FrameError::UnsupportedFrame(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn ra_dec_deg(v: &Vector3<f64>) -> (f64, f64) {
        let ra = v[1].atan2(v[0]).to_degrees().rem_euclid(360.0);
        let dec = (v[2] / v.norm()).asin().to_degrees();
        (ra, dec)
    }

    #[test]
    fn parse_names() {
        assert_eq!("ICRS".parse::<ReferenceFrame>().unwrap(), ReferenceFrame::Icrs);
        assert_eq!(
            "Galactic".parse::<ReferenceFrame>().unwrap(),
            ReferenceFrame::Galactic
        );
        assert_eq!(
            "ecliptic_j2000".parse::<ReferenceFrame>().unwrap(),
            ReferenceFrame::EclipticJ2000
        );
        for frame in ReferenceFrame::ALL {
            assert_eq!(frame.name().parse::<ReferenceFrame>().unwrap(), frame);
        }
    }

    #[test]
    fn unknown_frame() {
        assert_eq!(
            "hcrs".parse::<ReferenceFrame>(),
            Err(FrameError::UnsupportedFrame("hcrs".into()))
        );
    }

    #[test]
    fn galactic_pole_in_icrs() {
        let pole = ReferenceFrame::Galactic
            .to_icrs()
            .apply_position(&Vector3::new(0.0, 0.0, 1.0));
        let (ra, dec) = ra_dec_deg(&pole);
        assert!((ra - 192.8595).abs() < 1e-3, "ra {ra}");
        assert!((dec - 27.1283).abs() < 1e-3, "dec {dec}");
    }

    #[test]
    fn galactic_center_in_icrs() {
        // l = 0, b = 0 lies near RA 266.405, Dec -28.936.
        let gc = ReferenceFrame::Galactic
            .to_icrs()
            .apply_position(&Vector3::new(1.0, 0.0, 0.0));
        let (ra, dec) = ra_dec_deg(&gc);
        assert!((ra - 266.405).abs() < 1e-2, "ra {ra}");
        assert!((dec + 28.936).abs() < 1e-2, "dec {dec}");
    }

    #[test]
    fn fk5_bias_is_milliarcseconds() {
        let m = *ReferenceFrame::Fk5.from_icrs().rotation();
        let off = (m - Matrix3::identity()).amax();
        assert!(off > 1e-8 && off < 2e-7, "bias {off}");
    }

    #[test]
    fn ecliptic_pole() {
        let pole = ReferenceFrame::EclipticJ2000
            .to_icrs()
            .apply_position(&Vector3::new(0.0, 0.0, 1.0));
        let (ra, dec) = ra_dec_deg(&pole);
        assert_relative_eq!(ra, 270.0, epsilon = 1e-9);
        assert_relative_eq!(dec, 90.0 - 23.439_291_111, epsilon = 1e-8);
    }

    #[test]
    fn supergalactic_pole_in_galactic() {
        let pole = ReferenceFrame::Galactic
            .transform_to(ReferenceFrame::Supergalactic)
            .inverse()
            .apply_position(&Vector3::new(0.0, 0.0, 1.0));
        let (l, b) = ra_dec_deg(&pole);
        assert_relative_eq!(l, 47.37, epsilon = 1e-9);
        assert_relative_eq!(b, 6.32, epsilon = 1e-9);
    }

    #[test]
    fn builtin_frames_do_not_rotate() {
        for from in ReferenceFrame::ALL {
            for to in ReferenceFrame::ALL {
                let t = from.transform_to(to);
                assert!(t.is_fixed(), "{from} -> {to}");
                let r = t.rotation();
                assert_relative_eq!(r * r.transpose(), Matrix3::identity(), epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn round_trip_between_frames() {
        let v = Vector3::new(-25.841, -244.657, 275.938);
        for from in ReferenceFrame::ALL {
            for to in ReferenceFrame::ALL {
                let there = from.transform_to(to).apply_position(&v);
                let back = to.transform_to(from).apply_position(&there);
                assert_relative_eq!(back, v, epsilon = 1e-10);
            }
        }
    }
}
