//! Engine configuration.

use std::path::PathBuf;

use crate::error::EngineError;

/// Default directory searched for `<name>.bsp` kernels.
pub const DEFAULT_KERNEL_DIR: &str = "kernels/data";

/// Default number of SPK kernels held in memory at once.
pub const DEFAULT_CACHE_CAPACITY: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Directory holding named kernels (`de440.bsp`, ...).
    pub kernel_dir: PathBuf,
    /// Leapseconds kernel; the built-in table is used when `None`.
    pub lsk_path: Option<PathBuf>,
    /// Maximum number of loaded SPK kernels.
    pub cache_capacity: usize,
}

impl EngineConfig {
    pub fn new(kernel_dir: impl Into<PathBuf>) -> Self {
        Self {
            kernel_dir: kernel_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_lsk(mut self, lsk_path: impl Into<PathBuf>) -> Self {
        self.lsk_path = Some(lsk_path.into());
        self
    }

    pub fn with_cache_capacity(mut self, cache_capacity: usize) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.kernel_dir.as_os_str().is_empty() {
            return Err(EngineError::InvalidConfig("kernel_dir must not be empty"));
        }
        if self
            .lsk_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(EngineError::InvalidConfig("lsk_path must not be empty"));
        }
        if self.cache_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "cache_capacity must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kernel_dir: PathBuf::from(DEFAULT_KERNEL_DIR),
            lsk_path: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}
