//! Integration tests for LSK loading and UTC/TDB conversion.
//!
//! Tests against `naif0012.tls` skip when the file is absent.

use std::path::Path;

use astrovel_time::julian::jd_to_j2000_seconds;
use astrovel_time::{Instant, LeapSecondKernel, TimeError, TimeScale, calendar_to_jd};

fn lsk_path() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../kernels/data/naif0012.tls")
}

fn load_lsk() -> Option<LeapSecondKernel> {
    let path = lsk_path();
    if !path.exists() {
        eprintln!("Skipping: LSK not found at {}", path.display());
        return None;
    }
    Some(LeapSecondKernel::load(&path).expect("should load naif0012.tls"))
}

#[test]
fn real_lsk_matches_builtin() {
    let lsk = match load_lsk() {
        Some(l) => l,
        None => return,
    };
    let builtin = LeapSecondKernel::builtin();
    assert_eq!(
        lsk.data().leap_seconds.len(),
        builtin.data().leap_seconds.len()
    );
    for (file, table) in lsk.data().leap_seconds.iter().zip(&builtin.data().leap_seconds) {
        assert_eq!(file.0, table.0);
        assert!((file.1 - table.1).abs() < 1e-6);
    }
    assert_eq!(lsk.data().k, builtin.data().k);
}

#[test]
fn utc_tdb_roundtrip() {
    let lsk = load_lsk().unwrap_or_default();
    let utc_s = jd_to_j2000_seconds(calendar_to_jd(2024, 6, 15.0));
    let tdb_s = lsk.utc_to_tdb(utc_s).unwrap();
    let recovered = lsk.tdb_to_utc(tdb_s).unwrap();
    assert!(
        (utc_s - recovered).abs() < 1e-6,
        "roundtrip error: {:.3e} s",
        (utc_s - recovered).abs()
    );
    approx::assert_abs_diff_eq!(tdb_s - utc_s, 69.184, epsilon = 2e-3);
}

#[test]
fn load_from_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mini.tls");
    std::fs::write(
        &path,
        "KPL/LSK\n\\begindata\nDELTET/DELTA_T_A = 32.184\nDELTET/K = 1.657D-3\n\
         DELTET/EB = 1.671D-2\nDELTET/M = ( 6.239996 1.99096871D-7 )\n\
         DELTET/DELTA_AT = ( 10, @1972-JAN-1 )\n\\begintext\n",
    )
    .unwrap();
    let lsk = LeapSecondKernel::load(&path).unwrap();

    // A table ending in 1972 keeps applying 10 s afterwards.
    let utc = Instant::parse("2025-08-09T00:00:00", TimeScale::Utc).unwrap();
    let tai = utc.to_scale(TimeScale::Tai, &lsk).unwrap();
    approx::assert_abs_diff_eq!(
        tai.seconds_past_j2000() - utc.seconds_past_j2000(),
        10.0,
        epsilon = 1e-6
    );
}

#[test]
fn missing_file_is_io_error() {
    let err = LeapSecondKernel::load(Path::new("/nonexistent/naif0012.tls")).unwrap_err();
    assert!(matches!(err, TimeError::Io(_)), "got {err:?}");
}

#[test]
fn pre_1972_utc_instant() {
    let lsk = LeapSecondKernel::builtin();
    let t = Instant::parse("1969-07-20T20:17:40", TimeScale::Utc).unwrap();
    assert_eq!(t.to_tdb_seconds(&lsk), Err(TimeError::Pre1972Utc));
    // TT needs no leap seconds.
    let tt = Instant::parse("1969-07-20T20:17:40", TimeScale::Tt).unwrap();
    assert!(tt.to_tdb_seconds(&lsk).is_ok());
}
