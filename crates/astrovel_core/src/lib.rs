//! Ephemeris query engine.
//!
//! [`Engine`] resolves an [`EphemerisSelection`] to an SPK kernel (loaded
//! lazily and cached), converts an [`Instant`] to TDB and walks the
//! kernel's segment chain to produce barycentric and relative states.
//! The selection is an argument of every call, so one engine serves
//! queries against different ephemerides concurrently.

pub mod body;
pub mod config;
pub mod ephemeris;
pub mod error;

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use astrovel_frames::{DifferentialKey, PhasePoint, ReferenceFrame};
use astrovel_time::{Instant, LeapSecondKernel};
use jpl_kernel::{KernelError, SpkEvaluation, SpkKernel};

pub use body::{Body, Observer};
pub use config::EngineConfig;
pub use ephemeris::EphemerisSelection;
pub use error::EngineError;

/// Cartesian state: position in km, velocity in km/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

impl StateVector {
    fn from_ssb(state: [f64; 6]) -> Self {
        Self {
            position_km: [state[0], state[1], state[2]],
            velocity_km_s: [state[3], state[4], state[5]],
        }
    }

    fn minus(&self, other: &StateVector) -> StateVector {
        StateVector {
            position_km: std::array::from_fn(|i| self.position_km[i] - other.position_km[i]),
            velocity_km_s: std::array::from_fn(|i| self.velocity_km_s[i] - other.velocity_km_s[i]),
        }
    }

    /// The same state with axes rotated from ICRS into `frame`.
    fn in_frame(&self, frame: ReferenceFrame) -> Result<StateVector, EngineError> {
        if frame == ReferenceFrame::Icrs {
            return Ok(*self);
        }
        let point = PhasePoint::new(self.position_km)
            .with_differential(DifferentialKey::PerSecond, self.velocity_km_s)
            .transformed(&ReferenceFrame::Icrs.transform_to(frame));
        Ok(StateVector {
            position_km: point.position_km(),
            velocity_km_s: point.velocity_km_s()?,
        })
    }
}

/// Velocity of one body relative to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeVelocity {
    pub velocity_km_s: [f64; 3],
    /// Euclidean norm of `velocity_km_s`.
    pub speed_km_s: f64,
}

impl RelativeVelocity {
    pub fn new(velocity_km_s: [f64; 3]) -> Self {
        Self {
            velocity_km_s,
            speed_km_s: astrovel_frames::norm(&velocity_km_s),
        }
    }
}

/// Single ephemeris request.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub target: Body,
    pub observer: Observer,
    pub frame: ReferenceFrame,
    pub instant: Instant,
    pub ephemeris: EphemerisSelection,
}

/// Telemetry from a query or batch of queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryStats {
    pub evaluations: u32,
    pub cache_hits: u32,
}

/// Per-request memoization of segment evaluations.
///
/// Keys use `epoch_tdb_s.to_bits()`: epochs within one request come from
/// the same conversion and are bit-identical.
struct ComputationContext {
    cache: HashMap<(i32, i32, u64), SpkEvaluation>,
    evaluations: u32,
    cache_hits: u32,
}

impl ComputationContext {
    fn new() -> Self {
        Self {
            cache: HashMap::with_capacity(8),
            evaluations: 0,
            cache_hits: 0,
        }
    }

    fn stats(&self) -> QueryStats {
        QueryStats {
            evaluations: self.evaluations,
            cache_hits: self.cache_hits,
        }
    }
}

/// Query engine.
///
/// `Engine` is [`Send`] + [`Sync`]; share it with `Arc<Engine>`. Loaded
/// kernels sit behind an `RwLock` and are read-only once loaded, so
/// concurrent queries only contend while a kernel is first inserted.
pub struct Engine {
    config: EngineConfig,
    lsk: LeapSecondKernel,
    kernels: RwLock<HashMap<PathBuf, Arc<SpkKernel>>>,
}

impl Debug for Engine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("loaded_kernels", &self.loaded_kernel_count())
            .finish()
    }
}

impl Engine {
    /// Create an engine. SPK kernels are loaded on first use; the LSK (if
    /// configured) is loaded now.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let lsk = match &config.lsk_path {
            Some(path) => LeapSecondKernel::load(path)
                .map_err(|e| EngineError::KernelLoad(format!("{}: {e}", path.display())))?,
            None => LeapSecondKernel::builtin(),
        };
        Ok(Self {
            config,
            lsk,
            kernels: RwLock::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn lsk(&self) -> &LeapSecondKernel {
        &self.lsk
    }

    /// Number of SPK kernels currently held in memory.
    pub fn loaded_kernel_count(&self) -> usize {
        self.kernels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// The kernel for `ephemeris`, loading it on first use.
    pub fn kernel(&self, ephemeris: &EphemerisSelection) -> Result<Arc<SpkKernel>, EngineError> {
        let path = ephemeris.resolve(&self.config.kernel_dir)?;
        if let Some(kernel) = self
            .kernels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&path)
        {
            return Ok(Arc::clone(kernel));
        }

        let kernel = SpkKernel::load(&path).map_err(|e| match e {
            KernelError::InvalidFormat(reason) => EngineError::UnsupportedEphemeris {
                name: ephemeris.label(),
                reason,
            },
            other => EngineError::KernelLoad(other.to_string()),
        })?;
        log::info!(
            "loaded ephemeris {} from {} ({} segments)",
            ephemeris,
            path.display(),
            kernel.segments().len()
        );

        let mut kernels = self.kernels.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = kernels.get(&path) {
            return Ok(Arc::clone(existing));
        }
        if kernels.len() >= self.config.cache_capacity {
            log::debug!(
                "kernel cache full ({} entries); clearing",
                kernels.len()
            );
            kernels.clear();
        }
        let kernel = Arc::new(kernel);
        kernels.insert(path, Arc::clone(&kernel));
        Ok(kernel)
    }

    /// Velocity of Earth relative to the Sun, from their barycentric states.
    pub fn earth_velocity_wrt_sun(
        &self,
        instant: &Instant,
        ephemeris: &EphemerisSelection,
    ) -> Result<RelativeVelocity, EngineError> {
        self.relative_velocity(Body::Earth, Body::Sun, instant, ephemeris, ReferenceFrame::Icrs)
    }

    /// Velocity of `target` relative to `observer`, expressed in `frame`.
    pub fn relative_velocity(
        &self,
        target: Body,
        observer: Body,
        instant: &Instant,
        ephemeris: &EphemerisSelection,
        frame: ReferenceFrame,
    ) -> Result<RelativeVelocity, EngineError> {
        let kernel = self.kernel(ephemeris)?;
        let epoch_tdb_s = instant.to_tdb_seconds(&self.lsk)?;
        let mut ctx = ComputationContext::new();

        let target_state = self.barycentric(&kernel, ephemeris, target, epoch_tdb_s, &mut ctx)?;
        let observer_state =
            self.barycentric(&kernel, ephemeris, observer, epoch_tdb_s, &mut ctx)?;
        let relative = target_state.minus(&observer_state).in_frame(frame)?;
        log::debug!(
            "{target} wrt {observer} at TDB {epoch_tdb_s} s: {:?} km/s",
            relative.velocity_km_s
        );
        Ok(RelativeVelocity::new(relative.velocity_km_s))
    }

    /// ICRS state of `body` relative to the solar-system barycenter.
    pub fn body_barycentric_posvel(
        &self,
        body: Body,
        instant: &Instant,
        ephemeris: &EphemerisSelection,
    ) -> Result<StateVector, EngineError> {
        let kernel = self.kernel(ephemeris)?;
        let epoch_tdb_s = instant.to_tdb_seconds(&self.lsk)?;
        self.barycentric(&kernel, ephemeris, body, epoch_tdb_s, &mut ComputationContext::new())
    }

    /// Evaluate a query.
    pub fn query(&self, query: &Query) -> Result<StateVector, EngineError> {
        self.query_with_stats(query).map(|(state, _)| state)
    }

    /// Evaluate a query and return telemetry alongside the result.
    pub fn query_with_stats(&self, query: &Query) -> Result<(StateVector, QueryStats), EngineError> {
        let kernel = self.kernel(&query.ephemeris)?;
        let epoch_tdb_s = query.instant.to_tdb_seconds(&self.lsk)?;
        let mut ctx = ComputationContext::new();
        let state = self.query_with_ctx(query, &kernel, epoch_tdb_s, &mut ctx)?;
        Ok((state, ctx.stats()))
    }

    /// Evaluate queries in input order. Queries against the same kernel at
    /// the same TDB epoch share segment evaluations.
    pub fn query_batch(&self, queries: &[Query]) -> Vec<Result<StateVector, EngineError>> {
        self.query_batch_with_stats(queries).0
    }

    pub fn query_batch_with_stats(
        &self,
        queries: &[Query],
    ) -> (Vec<Result<StateVector, EngineError>>, QueryStats) {
        let mut contexts: HashMap<(PathBuf, u64), ComputationContext> = HashMap::new();
        let results: Vec<Result<StateVector, EngineError>> = queries
            .iter()
            .map(|query| -> Result<StateVector, EngineError> {
                let kernel = self.kernel(&query.ephemeris)?;
                let epoch_tdb_s = query.instant.to_tdb_seconds(&self.lsk)?;
                let ctx = contexts
                    .entry((kernel.path().to_path_buf(), epoch_tdb_s.to_bits()))
                    .or_insert_with(ComputationContext::new);
                self.query_with_ctx(query, &kernel, epoch_tdb_s, ctx)
            })
            .collect();

        let stats = contexts.values().fold(QueryStats::default(), |acc, ctx| {
            let s = ctx.stats();
            QueryStats {
                evaluations: acc.evaluations + s.evaluations,
                cache_hits: acc.cache_hits + s.cache_hits,
            }
        });
        (results, stats)
    }

    fn query_with_ctx(
        &self,
        query: &Query,
        kernel: &SpkKernel,
        epoch_tdb_s: f64,
        ctx: &mut ComputationContext,
    ) -> Result<StateVector, EngineError> {
        if query.observer == Observer::Body(query.target) {
            return Err(EngineError::InvalidQuery(
                "target and observer body cannot be identical",
            ));
        }
        let ephemeris = &query.ephemeris;
        let target = self.barycentric(kernel, ephemeris, query.target, epoch_tdb_s, ctx)?;
        let state = match query.observer {
            Observer::SolarSystemBarycenter => target,
            Observer::Body(body) => {
                let observer = self.barycentric(kernel, ephemeris, body, epoch_tdb_s, ctx)?;
                target.minus(&observer)
            }
        };
        state.in_frame(query.frame)
    }

    fn barycentric(
        &self,
        kernel: &SpkKernel,
        ephemeris: &EphemerisSelection,
        body: Body,
        epoch_tdb_s: f64,
        ctx: &mut ComputationContext,
    ) -> Result<StateVector, EngineError> {
        kernel
            .resolve_to_ssb_with(body.code(), |target, center| {
                evaluate_cached(kernel, target, center, epoch_tdb_s, ctx)
            })
            .map(StateVector::from_ssb)
            .map_err(|e| match e {
                KernelError::SegmentNotFound { target, .. } => EngineError::BodyNotFound(format!(
                    "{body} (NAIF {target}) is not covered by ephemeris {ephemeris}"
                )),
                KernelError::EpochOutOfRange { epoch_tdb_s, .. } => EngineError::EpochOutOfRange {
                    epoch_tdb_s,
                    ephemeris: ephemeris.label(),
                },
                KernelError::InvalidFormat(reason) => EngineError::UnsupportedEphemeris {
                    name: ephemeris.label(),
                    reason,
                },
                other => EngineError::Kernel(other),
            })
    }
}

/// Evaluate `(target, center)` at an epoch, memoized in `ctx`.
fn evaluate_cached(
    kernel: &SpkKernel,
    target: i32,
    center: i32,
    epoch_tdb_s: f64,
    ctx: &mut ComputationContext,
) -> Result<SpkEvaluation, KernelError> {
    let key = (target, center, epoch_tdb_s.to_bits());
    if let Some(cached) = ctx.cache.get(&key) {
        ctx.cache_hits += 1;
        return Ok(*cached);
    }
    let eval = kernel.evaluate(target, center, epoch_tdb_s)?;
    ctx.evaluations += 1;
    ctx.cache.insert(key, eval);
    Ok(eval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jpl_kernel::testing::SyntheticSpk;

    fn synthetic_engine() -> (tempfile::TempDir, Engine) {
        let dir = tempfile::tempdir().unwrap();
        SyntheticSpk::new()
            .linear_segment(3, 0, -1.0e9, 1.0e9, [1.0e8, 0.0, 0.0], [0.0, 29.0, 1.0])
            .linear_segment(399, 3, -1.0e9, 1.0e9, [4000.0, 0.0, 0.0], [0.0, 0.01, 0.0])
            .linear_segment(10, 0, -1.0e9, 1.0e9, [-5.0e5, 0.0, 0.0], [0.0, -0.009, 0.0])
            .write_to(&dir.path().join("de900.bsp"))
            .unwrap();
        let engine = Engine::new(EngineConfig::new(dir.path())).unwrap();
        (dir, engine)
    }

    #[test]
    fn engine_rejects_invalid_config() {
        assert!(matches!(
            Engine::new(EngineConfig::default().with_cache_capacity(0)),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn missing_lsk_is_kernel_load_error() {
        let config = EngineConfig::default().with_lsk("/nonexistent/naif0012.tls");
        assert!(matches!(
            Engine::new(config),
            Err(EngineError::KernelLoad(_))
        ));
    }

    #[test]
    fn chain_memoization_counts() {
        let (_dir, engine) = synthetic_engine();
        let query = Query {
            target: Body::Earth,
            observer: Observer::Body(Body::Sun),
            frame: ReferenceFrame::Icrs,
            instant: Instant::j2000(astrovel_time::TimeScale::Tdb),
            ephemeris: EphemerisSelection::named("de900"),
        };
        let (state, stats) = engine.query_with_stats(&query).unwrap();
        assert_eq!(stats.evaluations, 3);
        assert_eq!(stats.cache_hits, 0);
        assert!((state.velocity_km_s[1] - 29.019).abs() < 1e-12);
    }

    #[test]
    fn identical_target_and_observer() {
        let (_dir, engine) = synthetic_engine();
        let query = Query {
            target: Body::Sun,
            observer: Observer::Body(Body::Sun),
            frame: ReferenceFrame::Icrs,
            instant: Instant::j2000(astrovel_time::TimeScale::Tdb),
            ephemeris: EphemerisSelection::named("de900"),
        };
        assert!(matches!(
            engine.query(&query),
            Err(EngineError::InvalidQuery(_))
        ));
    }

    #[test]
    fn kernel_cache_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["de901", "de902", "de903"] {
            SyntheticSpk::new()
                .linear_segment(10, 0, 0.0, 1.0, [0.0; 3], [0.0; 3])
                .write_to(&dir.path().join(format!("{name}.bsp")))
                .unwrap();
        }
        let engine =
            Engine::new(EngineConfig::new(dir.path()).with_cache_capacity(2)).unwrap();
        engine.kernel(&EphemerisSelection::named("de901")).unwrap();
        engine.kernel(&EphemerisSelection::named("de902")).unwrap();
        assert_eq!(engine.loaded_kernel_count(), 2);
        engine.kernel(&EphemerisSelection::named("de902")).unwrap();
        assert_eq!(engine.loaded_kernel_count(), 2);
        engine.kernel(&EphemerisSelection::named("de903")).unwrap();
        assert_eq!(engine.loaded_kernel_count(), 1);
    }

    #[test]
    fn repeated_selection_reuses_kernel() {
        let (_dir, engine) = synthetic_engine();
        let a = engine.kernel(&EphemerisSelection::named("de900")).unwrap();
        let b = engine.kernel(&EphemerisSelection::named("DE900")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    // Compile-time assertion: Engine must be Send + Sync.
    #[allow(dead_code)]
    const _: () = {
        fn assert_send_sync<T: Send + Sync>() {}
        fn check() {
            assert_send_sync::<Engine>();
        }
    };
}
