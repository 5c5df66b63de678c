//! Environment-backed settings.
//!
//! Precedence: command-line flag, then environment (including `.env`), then
//! the built-in default.

use std::env;
use std::path::PathBuf;

pub const ENV_ROOT: &str = "AIPI_ROOT";
pub const ENV_BUILD_DIR: &str = "AIPI_BUILD_DIR";
pub const ENV_BIND: &str = "AIPI_BIND";
pub const ENV_LOG: &str = "AIPI_LOG";

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_LOG: &str = "info";

/// Values read from the environment; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub root: Option<PathBuf>,
    pub build_dir: Option<PathBuf>,
    pub bind: Option<String>,
    pub log: Option<String>,
}

impl Settings {
    /// Load `.env` (if present) and read the `AIPI_*` variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            root: get(ENV_ROOT).map(PathBuf::from),
            build_dir: get(ENV_BUILD_DIR).map(PathBuf::from),
            bind: get(ENV_BIND),
            log: get(ENV_LOG),
        }
    }

    pub fn resolve_root(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.root.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Build directory; defaults to `<root>/build`.
    pub fn resolve_build_dir(&self, flag: Option<PathBuf>, root: &std::path::Path) -> PathBuf {
        flag.or_else(|| self.build_dir.clone())
            .unwrap_or_else(|| root.join("build"))
    }

    pub fn resolve_bind(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.bind.clone())
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
    }

    pub fn resolve_log(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.log.clone())
            .unwrap_or_else(|| DEFAULT_LOG.to_string())
    }
}
