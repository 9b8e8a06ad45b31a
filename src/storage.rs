//! Durable storage for generated artifacts.
//!
//! A flat directory on local disk; uniqueness of names is the namer's job,
//! so no locking is needed here.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CoreError;

const DEFAULT_GENERATED_DIR: &str = "./generated";

#[derive(Debug, Clone)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn from_env() -> Self {
        let base = std::env::var("GENERATED_DIR").unwrap_or_else(|_| DEFAULT_GENERATED_DIR.to_string());
        Self::new(base)
    }

    pub fn path(&self, filename: &str) -> PathBuf {
        self.base.join(filename)
    }

    /// Write artifact bytes, creating the directory on first use.
    pub fn write(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, CoreError> {
        fs::create_dir_all(&self.base)?;
        let path = self.path(filename);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Best-effort removal, used to undo a file write whose ledger record
    /// did not commit.
    pub fn remove(&self, path: &Path) {
        if let Err(err) = fs::remove_file(path) {
            log::warn!("failed to remove orphaned artifact {}: {}", path.display(), err);
        }
    }
}
