use crate::core::config::data::Registry;
use directories::BaseDirs;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur when loading the server registry from disk.
#[derive(Debug)]
pub enum RegistryError {
    /// Failed to read the registry file from disk.
    Read {
        /// Path to the registry file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the registry file as valid JSON.
    Parse {
        /// Path to the registry file with invalid JSON.
        path: PathBuf,
        /// The JSON deserialization error.
        source: serde_json::Error,
    },

    /// No home directory could be determined for the default path.
    NoHomeDir,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Read { path, source } => {
                write!(f, "Failed to read registry at {}: {}", path.display(), source)
            }
            RegistryError::Parse { path, source } => {
                write!(
                    f,
                    "Failed to parse registry at {}: {}",
                    path.display(),
                    source
                )
            }
            RegistryError::NoHomeDir => {
                write!(f, "Could not determine a home directory for the default registry path")
            }
        }
    }
}

impl StdError for RegistryError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            RegistryError::Read { source, .. } => Some(source),
            RegistryError::Parse { source, .. } => Some(source),
            RegistryError::NoHomeDir => None,
        }
    }
}

/// Default registry location, shared with the wider MCP tooling.
pub fn default_registry_path() -> Result<PathBuf, RegistryError> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".cursor").join("mcp.json"))
        .ok_or(RegistryError::NoHomeDir)
}

pub fn load_registry(path: &Path) -> Result<Registry, RegistryError> {
    let contents = fs::read_to_string(path).map_err(|source| RegistryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| RegistryError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
