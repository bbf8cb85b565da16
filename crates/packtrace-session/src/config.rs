//! Session configuration.

use packtrace_types::{RegistryHive, RegistryTarget};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Static configuration for one observation session.
///
/// Supplied once at session start and read-only for the session's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Filesystem roots to watch recursively.
    pub roots: Vec<PathBuf>,
    /// Registry subtrees to poll.
    pub registry_targets: Vec<RegistryTarget>,
    /// Observation window in seconds.
    pub duration_secs: u64,
    /// Destination of the exported change report.
    pub report_path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            registry_targets: default_registry_targets(),
            duration_secs: 3600,
            report_path: PathBuf::from("packtrace_changes.json"),
        }
    }
}

impl SessionConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// The observation window as a duration.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

/// Installer-relevant roots on Windows; empty elsewhere, supplied by flags.
fn default_roots() -> Vec<PathBuf> {
    if !cfg!(windows) {
        return Vec::new();
    }
    let mut roots = vec![
        PathBuf::from(r"C:\Program Files"),
        PathBuf::from(r"C:\Program Files (x86)"),
    ];
    if let Some(home) = std::env::var_os("USERPROFILE") {
        let home = PathBuf::from(home);
        roots.push(home.join(r"AppData\Local"));
        roots.push(home.join(r"AppData\Roaming"));
    }
    roots
}

fn default_registry_targets() -> Vec<RegistryTarget> {
    if !cfg!(windows) {
        return Vec::new();
    }
    vec![
        RegistryTarget::new(RegistryHive::LocalMachine, "SOFTWARE"),
        RegistryTarget::new(RegistryHive::CurrentUser, "SOFTWARE"),
    ]
}

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    Read {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid config: {message}")]
    Parse { message: String },
}
