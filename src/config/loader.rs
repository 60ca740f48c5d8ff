use crate::config::schema::{RuleConfig, ValidationError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read rule config from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rule config TOML{}: {source}", located(.path))]
    Toml {
        path: Option<PathBuf>,
        #[source]
        source: toml_edit::de::Error,
    },

    #[error("invalid rule config{}: {source}", located(.path))]
    Validation {
        path: Option<PathBuf>,
        #[source]
        source: ValidationError,
    },

    #[error("failed to scan {} for rule files: {source}", .dir.display())]
    Discover {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// ` (path)` suffix for errors that may or may not know their file.
fn located(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" ({})", p.display()))
        .unwrap_or_default()
}

impl ConfigError {
    /// Attach the file a parse or validation error came from.
    fn at(self, file: &Path) -> Self {
        match self {
            ConfigError::Toml { path: None, source } => ConfigError::Toml {
                path: Some(file.to_path_buf()),
                source,
            },
            ConfigError::Validation { path: None, source } => ConfigError::Validation {
                path: Some(file.to_path_buf()),
                source,
            },
            other => other,
        }
    }
}

pub fn load_from_str(input: &str) -> Result<RuleConfig, ConfigError> {
    let config: RuleConfig = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    config
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<RuleConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.at(path))
}

/// `*.toml` files directly inside `dir`, sorted by path.
///
/// A missing directory yields an empty list.
pub fn discover_rule_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, ConfigError> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).max_depth(1) {
        let entry = entry.map_err(|source| ConfigError::Discover {
            dir: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("toml")
        {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}
