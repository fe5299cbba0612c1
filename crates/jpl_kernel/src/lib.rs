//! Reader for NAIF SPK planetary ephemeris kernels (e.g. JPL DE440).
//!
//! Loads a DAF/SPK file into memory, indexes its segments and evaluates
//! Chebyshev records to Cartesian position and velocity. Chains of
//! segments (Earth -> Earth-Moon barycenter -> solar-system barycenter)
//! are resolved with [`SpkKernel::resolve_to_ssb`].

pub mod chebyshev;
pub mod daf;
pub mod error;
pub mod spk;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

use std::path::{Path, PathBuf};

pub use daf::{DafFile, DafSummary, Endian};
pub use error::KernelError;
pub use spk::{RecordLayout, SpkEvaluation, SpkSegment};

/// NAIF code of the solar-system barycenter.
pub const SSB: i32 = 0;

/// Map a planet body code (e.g. 499 Mars) to its system barycenter (4).
///
/// Codes that are not of the `x99` form are returned unchanged.
pub const fn planet_body_to_barycenter(code: i32) -> i32 {
    if code > 100 && code < 1000 && code % 100 == 99 {
        code / 100
    } else {
        code
    }
}

/// A loaded SPK kernel.
pub struct SpkKernel {
    path: PathBuf,
    daf: DafFile,
    segments: Vec<SpkSegment>,
}

impl std::fmt::Debug for SpkKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpkKernel")
            .field("path", &self.path)
            .field("internal_name", &self.daf.internal_name)
            .field("segments", &self.segments.len())
            .finish()
    }
}

impl SpkKernel {
    /// Read and index an SPK file.
    pub fn load(path: &Path) -> Result<Self, KernelError> {
        let bytes = std::fs::read(path).map_err(|source| KernelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let kernel = Self::from_bytes(path.to_path_buf(), bytes)?;
        log::debug!(
            "loaded SPK {} ({} segments, {:?})",
            path.display(),
            kernel.segments.len(),
            kernel.daf.endian
        );
        Ok(kernel)
    }

    /// Index an SPK already held in memory. `path` is used for reporting only.
    pub fn from_bytes(path: PathBuf, bytes: Vec<u8>) -> Result<Self, KernelError> {
        let daf = DafFile::from_bytes(bytes)?;
        if daf.file_id != "DAF/SPK" && daf.file_id != "NAIF/DAF" {
            return Err(KernelError::InvalidFormat(format!(
                "{} is a {} file, not an SPK",
                path.display(),
                daf.file_id
            )));
        }
        if daf.nd != 2 || daf.ni != 6 {
            return Err(KernelError::InvalidFormat(format!(
                "SPK summaries must be ND=2 NI=6, found ND={} NI={}",
                daf.nd, daf.ni
            )));
        }

        let segments = daf
            .summaries()?
            .iter()
            .map(|s| SpkSegment::from_summary(s, &daf))
            .collect::<Result<Vec<_>, _>>()?;
        for seg in segments.iter().filter(|s| s.layout.is_none()) {
            log::debug!(
                "segment {:?} ({} wrt {}) has data type {}; it will not be evaluated",
                seg.name,
                seg.target,
                seg.center,
                seg.data_type
            );
        }

        Ok(Self {
            path,
            daf,
            segments,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn segments(&self) -> &[SpkSegment] {
        &self.segments
    }

    /// Internal file name from the DAF file record.
    pub fn internal_name(&self) -> &str {
        &self.daf.internal_name
    }

    /// Center body of the last-loaded segment for `target`.
    pub fn center_for(&self, target: i32) -> Option<i32> {
        self.segments
            .iter()
            .rev()
            .find(|s| s.target == target)
            .map(|s| s.center)
    }

    /// Evaluate `target` relative to `center` at TDB seconds past J2000.
    ///
    /// Later segments take precedence over earlier ones, as in SPICE.
    pub fn evaluate(
        &self,
        target: i32,
        center: i32,
        epoch_tdb_s: f64,
    ) -> Result<SpkEvaluation, KernelError> {
        let mut paired = self
            .segments
            .iter()
            .rev()
            .filter(|s| s.target == target && s.center == center)
            .peekable();
        if paired.peek().is_none() {
            return Err(KernelError::SegmentNotFound { target, center });
        }
        match paired.find(|s| s.covers(epoch_tdb_s)) {
            Some(seg) => seg.evaluate(&self.daf, epoch_tdb_s),
            None => Err(KernelError::EpochOutOfRange {
                target,
                center,
                epoch_tdb_s,
            }),
        }
    }

    /// State `[x, y, z, vx, vy, vz]` of `body` relative to the
    /// solar-system barycenter, summing segments along the chain.
    pub fn resolve_to_ssb(&self, body: i32, epoch_tdb_s: f64) -> Result<[f64; 6], KernelError> {
        self.resolve_to_ssb_with(body, |target, center| {
            self.evaluate(target, center, epoch_tdb_s)
        })
    }

    /// Walk the chain from `body` to the solar-system barycenter, taking
    /// each link from `evaluate(target, center)`. A planet with no segment
    /// of its own (`x99`) falls back to its system barycenter.
    ///
    /// A chain that revisits a body is reported as `InvalidFormat`.
    pub fn resolve_to_ssb_with<F>(&self, body: i32, mut evaluate: F) -> Result<[f64; 6], KernelError>
    where
        F: FnMut(i32, i32) -> Result<SpkEvaluation, KernelError>,
    {
        let mut state = [0.0; 6];
        let mut code = body;
        let mut visited: Vec<i32> = Vec::with_capacity(4);
        while code != SSB {
            if visited.contains(&code) {
                return Err(KernelError::format(format!(
                    "segment chain from {body} loops back to {code}"
                )));
            }
            visited.push(code);

            let center = match self.center_for(code) {
                Some(c) => c,
                None => {
                    let bary = planet_body_to_barycenter(code);
                    if bary == code {
                        return Err(KernelError::SegmentNotFound {
                            target: code,
                            center: SSB,
                        });
                    }
                    log::trace!("no segment for {code}; using barycenter {bary}");
                    code = bary;
                    continue;
                }
            };
            let eval = evaluate(code, center)?;
            for axis in 0..3 {
                state[axis] += eval.position_km[axis];
                state[axis + 3] += eval.velocity_km_s[axis];
            }
            code = center;
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SyntheticSpk;

    fn earth_sun_kernel() -> SpkKernel {
        let spk = SyntheticSpk::new()
            .linear_segment(3, 0, -1.0e6, 1.0e6, [1.0e8, 0.0, 0.0], [0.0, 29.0, 0.0])
            .linear_segment(399, 3, -1.0e6, 1.0e6, [4000.0, 0.0, 0.0], [0.0, 0.01, 0.0])
            .linear_segment(10, 0, -1.0e6, 1.0e6, [-5.0e5, 0.0, 0.0], [0.0, -0.009, 0.0]);
        SpkKernel::from_bytes(PathBuf::from("synthetic.bsp"), spk.to_bytes()).unwrap()
    }

    #[test]
    fn barycenter_mapping() {
        assert_eq!(planet_body_to_barycenter(499), 4);
        assert_eq!(planet_body_to_barycenter(999), 9);
        assert_eq!(planet_body_to_barycenter(399), 3);
        assert_eq!(planet_body_to_barycenter(301), 301);
        assert_eq!(planet_body_to_barycenter(10), 10);
    }

    #[test]
    fn indexes_segments() {
        let kernel = earth_sun_kernel();
        assert_eq!(kernel.segments().len(), 3);
        assert_eq!(kernel.center_for(399), Some(3));
        assert_eq!(kernel.center_for(301), None);
        assert_eq!(kernel.internal_name(), "SYNTHETIC TEST KERNEL");
    }

    #[test]
    fn chain_to_ssb_sums_segments() {
        let kernel = earth_sun_kernel();
        let state = kernel.resolve_to_ssb(399, 0.0).unwrap();
        assert!((state[4] - 29.01).abs() < 1e-12);
        assert!((state[0] - (1.0e8 + 4000.0)).abs() < 1e-6);
    }

    #[test]
    fn missing_pair_is_segment_not_found() {
        let kernel = earth_sun_kernel();
        assert!(matches!(
            kernel.evaluate(499, 4, 0.0),
            Err(KernelError::SegmentNotFound { target: 499, center: 4 })
        ));
        assert!(matches!(
            kernel.resolve_to_ssb(301, 0.0),
            Err(KernelError::SegmentNotFound { target: 301, .. })
        ));
    }

    #[test]
    fn planet_falls_back_to_barycenter() {
        let kernel = earth_sun_kernel();
        // No 999 segment: Pluto resolves through barycenter 9, which is absent too.
        assert!(matches!(
            kernel.resolve_to_ssb(999, 0.0),
            Err(KernelError::SegmentNotFound { target: 9, .. })
        ));
        let spk = SyntheticSpk::new()
            .linear_segment(4, 0, -1.0, 1.0, [2.0e8, 0.0, 0.0], [0.0, 24.0, 0.0]);
        let kernel = SpkKernel::from_bytes(PathBuf::from("mars.bsp"), spk.to_bytes()).unwrap();
        let state = kernel.resolve_to_ssb(499, 0.0).unwrap();
        assert!((state[4] - 24.0).abs() < 1e-12);
    }

    #[test]
    fn cyclic_chain_is_invalid_format() {
        let spk = SyntheticSpk::new()
            .linear_segment(399, 3, -1.0, 1.0, [0.0; 3], [0.0; 3])
            .linear_segment(3, 399, -1.0, 1.0, [0.0; 3], [0.0; 3]);
        let kernel = SpkKernel::from_bytes(PathBuf::from("loop.bsp"), spk.to_bytes()).unwrap();
        assert!(matches!(
            kernel.resolve_to_ssb(399, 0.0),
            Err(KernelError::InvalidFormat(_))
        ));
    }

    #[test]
    fn hook_sees_each_link_once() {
        let kernel = earth_sun_kernel();
        let mut links = Vec::new();
        kernel
            .resolve_to_ssb_with(399, |target, center| {
                links.push((target, center));
                kernel.evaluate(target, center, 0.0)
            })
            .unwrap();
        assert_eq!(links, [(399, 3), (3, 0)]);
    }

    #[test]
    fn big_endian_kernel_reads_identically() {
        let spk = SyntheticSpk::new()
            .big_endian()
            .linear_segment(10, 0, 0.0, 100.0, [1.0, 2.0, 3.0], [0.5, 0.0, 0.0]);
        let kernel = SpkKernel::from_bytes(PathBuf::from("be.bsp"), spk.to_bytes()).unwrap();
        let eval = kernel.evaluate(10, 0, 50.0).unwrap();
        assert!((eval.position_km[0] - 26.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_spk_daf() {
        let mut bytes = SyntheticSpk::new()
            .linear_segment(10, 0, 0.0, 100.0, [0.0; 3], [0.0; 3])
            .to_bytes();
        bytes[0..8].copy_from_slice(b"DAF/PCK ");
        assert!(matches!(
            SpkKernel::from_bytes(PathBuf::from("x.bpc"), bytes),
            Err(KernelError::InvalidFormat(_))
        ));
    }
}
