use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// The full text of the target file, read once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
    text: String,
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8: {source}")]
    Utf8 {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// xxh3 fingerprint of a buffer.
pub fn fingerprint(text: &str) -> u64 {
    xxh3_64(text.as_bytes())
}

impl Document {
    /// Read the whole file into memory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref().to_path_buf();
        let bytes = fs::read(&path).map_err(|source| DocumentError::Read {
            path: path.clone(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|source| DocumentError::Utf8 {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, text })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn fingerprint(&self) -> u64 {
        fingerprint(&self.text)
    }

    /// Overwrite the file this document was read from with `text`.
    ///
    /// No backup is kept. The write is atomic, so a failure leaves the
    /// previous contents in place.
    pub fn store(&self, text: &str) -> Result<(), DocumentError> {
        atomic_write(&self.path, text.as_bytes()).map_err(|source| DocumentError::Write {
            path: self.path.clone(),
            source,
        })?;

        // Bump mtime so file watchers (dev servers, bundlers) pick the change up
        let now = filetime::FileTime::now();
        filetime::set_file_mtime(&self.path, now).map_err(|source| DocumentError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Symlinks are followed, so the file a link points to is the one replaced and
/// the link itself survives. The original file's permissions are carried over.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

    // Same directory as the target, so the rename stays on one filesystem
    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;

    if let Ok(metadata) = fs::metadata(&target) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }

    temp.as_file().sync_all()?;
    temp.persist(&target).map_err(|e| e.error)?;

    Ok(())
}
