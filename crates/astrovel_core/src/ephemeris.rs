//! Ephemeris selection: which SPK kernel a query reads.
//!
//! A selection is passed explicitly to every engine call; nothing is
//! selected process-wide.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::EngineError;

/// Alias resolved before lookup, as `(alias, model)`.
const ALIASES: [(&str, &str); 1] = [("jpl", "de430")];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EphemerisSelection {
    /// A JPL development ephemeris (`de440`, `de440s`, ...), found as
    /// `<kernel_dir>/<name>.bsp`.
    Named(String),
    /// An explicit SPK file.
    File(PathBuf),
}

impl EphemerisSelection {
    /// Selection by model name; aliases are resolved and case is folded.
    pub fn named(name: &str) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        let model = ALIASES
            .iter()
            .find(|(alias, _)| *alias == lower)
            .map_or(lower.clone(), |(_, model)| (*model).to_string());
        Self::Named(model)
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Short label for messages.
    pub fn label(&self) -> String {
        match self {
            Self::Named(name) => name.clone(),
            Self::File(path) => path.display().to_string(),
        }
    }

    /// Path of the SPK file this selection reads.
    ///
    /// Fails with `UnsupportedEphemeris` for names that are not JPL DE
    /// model identifiers and for files that do not exist.
    pub fn resolve(&self, kernel_dir: &Path) -> Result<PathBuf, EngineError> {
        let path = match self {
            Self::Named(name) => {
                if !is_model_name(name) {
                    return Err(EngineError::UnsupportedEphemeris {
                        name: name.clone(),
                        reason: "not a JPL DE model name (expected e.g. de440, de440s, de430)"
                            .into(),
                    });
                }
                kernel_dir.join(format!("{name}.bsp"))
            }
            Self::File(path) => path.clone(),
        };
        if !path.is_file() {
            return Err(EngineError::UnsupportedEphemeris {
                name: self.label(),
                reason: format!("kernel file {} not found", path.display()),
            });
        }
        Ok(path)
    }
}

/// `de` followed by digits and an optional lowercase suffix (`de440s`, `de441`).
fn is_model_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix("de") else {
        return false;
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    digits >= 3 && rest[digits..].bytes().all(|b| b.is_ascii_lowercase()) && rest.len() - digits <= 2
}

impl FromStr for EphemerisSelection {
    type Err = std::convert::Infallible;

    /// Values ending in `.bsp` or containing a path separator select a file.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let is_path = trimmed.to_ascii_lowercase().ends_with(".bsp")
            || trimmed.contains(std::path::MAIN_SEPARATOR)
            || trimmed.contains('/');
        Ok(if is_path {
            Self::file(trimmed)
        } else {
            Self::named(trimmed)
        })
    }
}

impl fmt::Display for EphemerisSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
