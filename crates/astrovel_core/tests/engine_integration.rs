//! Engine tests against synthetic SPK kernels written to a temp directory.

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use astrovel_core::*;
use astrovel_frames::{ReferenceFrame, convert_velocity, norm};
use astrovel_time::{Instant, TimeScale};
use jpl_kernel::testing::SyntheticSpk;

const EARTH_BARY_VEL: [f64; 3] = [-12.0, 26.0, 0.5];
const EARTH_OFFSET_VEL: [f64; 3] = [0.01, -0.002, 0.003];
const SUN_VEL: [f64; 3] = [0.004, -0.009, 0.0002];

/// Earth via the Earth-Moon barycenter, the Sun, and a Moon segment,
/// covering +/- 40 years around J2000.
fn write_kernel(dir: &std::path::Path, name: &str) {
    let span = 40.0 * 365.25 * 86_400.0;
    SyntheticSpk::new()
        .linear_segment(3, 0, -span, span, [1.0e8, 5.0e7, 2.0e7], EARTH_BARY_VEL)
        .linear_segment(399, 3, -span, span, [4000.0, 1000.0, 0.0], EARTH_OFFSET_VEL)
        .linear_segment(301, 3, -span, span, [-3.0e5, 0.0, 0.0], [0.0, -1.0, 0.0])
        .linear_segment_type3(10, 0, -span, span, [-5.0e5, 2.0e5, 0.0], SUN_VEL)
        .write_to(&dir.join(format!("{name}.bsp")))
        .unwrap();
}

fn engine() -> (tempfile::TempDir, Engine) {
    let dir = tempfile::tempdir().unwrap();
    write_kernel(dir.path(), "de900");
    let engine = Engine::new(EngineConfig::new(dir.path())).unwrap();
    (dir, engine)
}

fn tt(text: &str) -> Instant {
    Instant::parse(text, TimeScale::Tt).unwrap()
}

fn expected_earth_wrt_sun() -> [f64; 3] {
    std::array::from_fn(|i| EARTH_BARY_VEL[i] + EARTH_OFFSET_VEL[i] - SUN_VEL[i])
}

#[test]
fn earth_velocity_wrt_sun_matches_segments() {
    let (_dir, engine) = engine();
    let rel = engine
        .earth_velocity_wrt_sun(&tt("2025-08-09T00:00:00"), &EphemerisSelection::named("de900"))
        .unwrap();
    let expected = expected_earth_wrt_sun();
    for i in 0..3 {
        assert_abs_diff_eq!(rel.velocity_km_s[i], expected[i], epsilon = 1e-9);
    }
    assert_abs_diff_eq!(rel.speed_km_s, norm(&rel.velocity_km_s), epsilon = 1e-12);
}

#[test]
fn earth_velocity_is_deterministic() {
    let (_dir, engine) = engine();
    let ephem = EphemerisSelection::named("de900");
    let t = tt("2025-08-09T00:00:00");
    let a = engine.earth_velocity_wrt_sun(&t, &ephem).unwrap();
    let b = engine.earth_velocity_wrt_sun(&t, &ephem).unwrap();
    assert_eq!(a, b);
}

#[test]
fn barycentric_positions_follow_linear_motion() {
    let (_dir, engine) = engine();
    let ephem = EphemerisSelection::named("de900");
    let t0 = engine
        .body_barycentric_posvel(Body::Sun, &Instant::j2000(TimeScale::Tdb), &ephem)
        .unwrap();
    let t1 = engine
        .body_barycentric_posvel(
            Body::Sun,
            &Instant::from_j2000_seconds(86_400.0, TimeScale::Tdb).unwrap(),
            &ephem,
        )
        .unwrap();
    for i in 0..3 {
        assert_abs_diff_eq!(
            t1.position_km[i] - t0.position_km[i],
            SUN_VEL[i] * 86_400.0,
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(t1.velocity_km_s[i], SUN_VEL[i], epsilon = 1e-12);
    }
}

#[test]
fn relative_velocity_in_another_frame() {
    let (_dir, engine) = engine();
    let ephem = EphemerisSelection::named("de900");
    let t = tt("2010-01-01T00:00:00");
    let icrs = engine
        .relative_velocity(Body::Moon, Body::Earth, &t, &ephem, ReferenceFrame::Icrs)
        .unwrap();
    let gal = engine
        .relative_velocity(Body::Moon, Body::Earth, &t, &ephem, ReferenceFrame::Galactic)
        .unwrap();
    let converted =
        convert_velocity(icrs.velocity_km_s, ReferenceFrame::Icrs, ReferenceFrame::Galactic)
            .unwrap();
    for i in 0..3 {
        assert_abs_diff_eq!(gal.velocity_km_s[i], converted[i], epsilon = 1e-12);
    }
    assert_abs_diff_eq!(gal.speed_km_s, icrs.speed_km_s, epsilon = 1e-12);
}

#[test]
fn utc_and_tt_instants_agree() {
    let (_dir, engine) = engine();
    let ephem = EphemerisSelection::named("de900");
    let utc = Instant::parse("2025-08-08T23:58:50.816", TimeScale::Utc).unwrap();
    let a = engine.body_barycentric_posvel(Body::Earth, &utc, &ephem).unwrap();
    let b = engine
        .body_barycentric_posvel(Body::Earth, &tt("2025-08-09T00:00:00"), &ephem)
        .unwrap();
    for i in 0..3 {
        assert_abs_diff_eq!(a.position_km[i], b.position_km[i], epsilon = 1e-3);
    }
}

#[test]
fn unknown_model_is_unsupported_ephemeris() {
    let (_dir, engine) = engine();
    let err = engine
        .earth_velocity_wrt_sun(
            &tt("2025-08-09T00:00:00"),
            &EphemerisSelection::named("nonexistent-model"),
        )
        .unwrap_err();
    assert!(
        matches!(err, EngineError::UnsupportedEphemeris { .. }),
        "got {err:?}"
    );
}

#[test]
fn non_spk_file_is_unsupported_ephemeris() {
    let (dir, engine) = engine();
    let path = dir.path().join("de901.bsp");
    std::fs::write(&path, vec![0u8; 4096]).unwrap();
    let err = engine
        .earth_velocity_wrt_sun(&tt("2025-08-09T00:00:00"), &EphemerisSelection::file(&path))
        .unwrap_err();
    assert!(
        matches!(err, EngineError::UnsupportedEphemeris { .. }),
        "got {err:?}"
    );
}

#[test]
fn truncated_segment_is_unsupported_ephemeris() {
    let dir = tempfile::tempdir().unwrap();
    let mut bytes = SyntheticSpk::new()
        .linear_segment(3, 0, -1.0e9, 1.0e9, [0.0; 3], [0.0; 3])
        .to_bytes();
    // First summary: record 2, after 3 control words and 2 doubles;
    // the address pair is the last two of its six integers.
    let ints = 1024 + 24 + 16;
    bytes[ints + 16..ints + 20].copy_from_slice(&1i32.to_le_bytes());
    bytes[ints + 20..ints + 24].copy_from_slice(&2i32.to_le_bytes());
    let path = dir.path().join("broken.bsp");
    std::fs::write(&path, bytes).unwrap();

    let engine = Engine::new(EngineConfig::new(dir.path())).unwrap();
    let err = engine
        .earth_velocity_wrt_sun(&tt("2025-08-09T00:00:00"), &EphemerisSelection::file(&path))
        .unwrap_err();
    assert!(
        matches!(err, EngineError::UnsupportedEphemeris { .. }),
        "got {err:?}"
    );
}

#[test]
fn cyclic_segment_chain_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    SyntheticSpk::new()
        .linear_segment(399, 3, -1.0e9, 1.0e9, [0.0; 3], [0.0; 3])
        .linear_segment(3, 399, -1.0e9, 1.0e9, [0.0; 3], [0.0; 3])
        .linear_segment(10, 0, -1.0e9, 1.0e9, [0.0; 3], [0.0; 3])
        .write_to(&dir.path().join("de900.bsp"))
        .unwrap();
    let engine = Engine::new(EngineConfig::new(dir.path())).unwrap();
    let err = engine
        .earth_velocity_wrt_sun(&Instant::j2000(TimeScale::Tt), &EphemerisSelection::named("de900"))
        .unwrap_err();
    match err {
        EngineError::UnsupportedEphemeris { reason, .. } => assert!(reason.contains("loops"), "{reason}"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn body_missing_from_kernel() {
    let (_dir, engine) = engine();
    let err = engine
        .body_barycentric_posvel(
            Body::Jupiter,
            &tt("2025-08-09T00:00:00"),
            &EphemerisSelection::named("de900"),
        )
        .unwrap_err();
    match err {
        EngineError::BodyNotFound(msg) => assert!(msg.contains("jupiter"), "{msg}"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn epoch_outside_coverage() {
    let (_dir, engine) = engine();
    let err = engine
        .earth_velocity_wrt_sun(&tt("2150-01-01T00:00:00"), &EphemerisSelection::named("de900"))
        .unwrap_err();
    assert!(
        matches!(err, EngineError::EpochOutOfRange { ref ephemeris, .. } if ephemeris == "de900"),
        "got {err:?}"
    );
}

#[test]
fn pre_1972_utc_is_invalid_time() {
    let (_dir, engine) = engine();
    let utc = Instant::parse("1970-01-01T00:00:00", TimeScale::Utc).unwrap();
    let err = engine
        .earth_velocity_wrt_sun(&utc, &EphemerisSelection::named("de900"))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTime(_)), "got {err:?}");
}

#[test]
fn batch_shares_evaluations_at_one_epoch() {
    let (_dir, engine) = engine();
    let t = tt("2025-08-09T00:00:00");
    let query = |target, observer| Query {
        target,
        observer,
        frame: ReferenceFrame::Icrs,
        instant: t,
        ephemeris: EphemerisSelection::named("de900"),
    };
    let queries = [
        query(Body::Earth, Observer::Body(Body::Sun)),
        query(Body::Moon, Observer::Body(Body::Earth)),
        query(Body::Earth, Observer::SolarSystemBarycenter),
        query(Body::Jupiter, Observer::SolarSystemBarycenter),
    ];
    let (results, stats) = engine.query_batch_with_stats(&queries);
    assert_eq!(results.len(), 4);
    assert!(results[0].is_ok() && results[1].is_ok() && results[2].is_ok());
    assert!(matches!(results[3], Err(EngineError::BodyNotFound(_))));
    // 399->3, 3->0, 10->0, 301->3 evaluated once each.
    assert_eq!(stats.evaluations, 4);
    assert!(stats.cache_hits >= 4, "{stats:?}");

    let single = engine.query(&queries[0]).unwrap();
    assert_eq!(results[0].as_ref().unwrap(), &single);
}

#[test]
fn concurrent_queries_with_different_selections() {
    let dir = tempfile::tempdir().unwrap();
    write_kernel(dir.path(), "de900");
    SyntheticSpk::new()
        .linear_segment(3, 0, -1.0e9, 1.0e9, [0.0; 3], [1.0, 0.0, 0.0])
        .linear_segment(399, 3, -1.0e9, 1.0e9, [0.0; 3], [0.0; 3])
        .linear_segment(10, 0, -1.0e9, 1.0e9, [0.0; 3], [0.0; 3])
        .write_to(&dir.path().join("de901.bsp"))
        .unwrap();
    let engine = Arc::new(Engine::new(EngineConfig::new(dir.path())).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                let name = if i % 2 == 0 { "de900" } else { "de901" };
                let rel = engine
                    .earth_velocity_wrt_sun(
                        &Instant::j2000(TimeScale::Tt),
                        &EphemerisSelection::named(name),
                    )
                    .unwrap();
                (name, rel.velocity_km_s)
            })
        })
        .collect();

    let expected_900 = expected_earth_wrt_sun();
    for handle in handles {
        let (name, v) = handle.join().unwrap();
        let expected = if name == "de900" {
            expected_900
        } else {
            [1.0, 0.0, 0.0]
        };
        for i in 0..3 {
            assert_abs_diff_eq!(v[i], expected[i], epsilon = 1e-9);
        }
    }
    assert_eq!(engine.loaded_kernel_count(), 2);
}
