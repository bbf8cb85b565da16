//! Watch target configuration types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A Windows registry hive.
///
/// Hives are plain configuration data here; mapping to actual registry
/// handles happens in the registry watcher and only on Windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistryHive {
    #[serde(rename = "HKEY_CLASSES_ROOT", alias = "HKCR")]
    ClassesRoot,
    #[serde(rename = "HKEY_CURRENT_USER", alias = "HKCU")]
    CurrentUser,
    #[serde(rename = "HKEY_LOCAL_MACHINE", alias = "HKLM")]
    LocalMachine,
    #[serde(rename = "HKEY_USERS", alias = "HKU")]
    Users,
    #[serde(rename = "HKEY_CURRENT_CONFIG", alias = "HKCC")]
    CurrentConfig,
}

impl fmt::Display for RegistryHive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ClassesRoot => "HKEY_CLASSES_ROOT",
            Self::CurrentUser => "HKEY_CURRENT_USER",
            Self::LocalMachine => "HKEY_LOCAL_MACHINE",
            Self::Users => "HKEY_USERS",
            Self::CurrentConfig => "HKEY_CURRENT_CONFIG",
        };
        f.write_str(name)
    }
}

impl FromStr for RegistryHive {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HKEY_CLASSES_ROOT" | "HKCR" => Ok(Self::ClassesRoot),
            "HKEY_CURRENT_USER" | "HKCU" => Ok(Self::CurrentUser),
            "HKEY_LOCAL_MACHINE" | "HKLM" => Ok(Self::LocalMachine),
            "HKEY_USERS" | "HKU" => Ok(Self::Users),
            "HKEY_CURRENT_CONFIG" | "HKCC" => Ok(Self::CurrentConfig),
            _ => Err(TargetParseError::UnknownHive(s.to_string())),
        }
    }
}

/// A (hive, subtree) registry watch target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistryTarget {
    /// Root hive the subtree lives under.
    pub hive: RegistryHive,
    /// Subtree path relative to the hive, e.g. `SOFTWARE`.
    pub subtree: String,
}

impl RegistryTarget {
    /// Create a new target.
    pub fn new(hive: RegistryHive, subtree: impl Into<String>) -> Self {
        Self {
            hive,
            subtree: subtree.into(),
        }
    }
}

impl fmt::Display for RegistryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\\{}", self.hive, self.subtree)
    }
}

impl FromStr for RegistryTarget {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hive, subtree) = s
            .split_once('\\')
            .ok_or_else(|| TargetParseError::MissingSubtree(s.to_string()))?;
        if subtree.is_empty() {
            return Err(TargetParseError::MissingSubtree(s.to_string()));
        }
        Ok(Self {
            hive: hive.parse()?,
            subtree: subtree.to_string(),
        })
    }
}

/// Errors parsing textual registry targets.
#[derive(Debug, Error)]
pub enum TargetParseError {
    #[error("unknown registry hive: {0}")]
    UnknownHive(String),

    #[error("registry target has no subtree path: {0}")]
    MissingSubtree(String),
}
