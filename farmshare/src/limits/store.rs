//! Durable persistence of the allocation document.
//!
//! The store knows three locations: the live config file the scheduler
//! reads, a scratch path holding at most one staged document, and a backup
//! directory receiving a timestamped copy of the live file on every commit.
//! Commits write to a temp file beside the live one and rename into place so
//! readers never observe a half-written document.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;
use tracing::{debug, info};

use super::document::{AllocationDocument, DocumentError};

/// Name of the scratch file inside the temp directory. Process-wide shared
/// state with no locking; two simultaneous stages race, last write wins.
pub const STAGED_FILE_NAME: &str = "temp.config";

/// Persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File missing, unreadable, or unwritable.
    #[error("Config file I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Content is not a well-formed allocation document.
    #[error(transparent)]
    Format(#[from] DocumentError),
}

/// Load/save access to the live, staged, and backup locations.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    live_path: PathBuf,
    temp_dir: PathBuf,
    backup_dir: PathBuf,
}

impl ConfigStore {
    pub fn new(
        live_path: impl Into<PathBuf>,
        temp_dir: impl Into<PathBuf>,
        backup_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            live_path: live_path.into(),
            temp_dir: temp_dir.into(),
            backup_dir: backup_dir.into(),
        }
    }

    /// Path of the live config file.
    pub fn live_path(&self) -> &Path {
        &self.live_path
    }

    /// Path the staged document occupies when one exists.
    pub fn staged_path(&self) -> PathBuf {
        self.temp_dir.join(STAGED_FILE_NAME)
    }

    /// True when a staged document is present.
    pub fn has_staged(&self) -> bool {
        self.staged_path().exists()
    }

    /// Load the working document: the staged file when one exists, the live
    /// file otherwise.
    pub fn load(&self) -> Result<AllocationDocument, StoreError> {
        let staged = self.staged_path();
        let path = if staged.exists() {
            debug!(path = %staged.display(), "Loading staged document");
            staged
        } else {
            self.live_path.clone()
        };
        let text = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(AllocationDocument::from_json(&text)?)
    }

    /// Serialize `document` to the scratch path, replacing any prior staged
    /// document. Returns the staged path.
    pub fn stage(&self, document: &AllocationDocument) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.temp_dir).map_err(|source| StoreError::Io {
            path: self.temp_dir.clone(),
            source,
        })?;
        let path = self.staged_path();
        let text = document.to_json_pretty()?;
        fs::write(&path, text).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "Staged pending changes");
        Ok(path)
    }

    /// Delete the staged document. A missing file is not an error.
    pub fn discard_staged(&self) -> Result<(), StoreError> {
        let path = self.staged_path();
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), "Discarded staged changes");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Commit `document` as the new live file.
    ///
    /// The existing live file (if any) is renamed into the backup directory
    /// first, then the document is written to a temp path in the live
    /// directory and renamed into place. Finishes by removing any staged
    /// file. Callers must allow for the scheduler's own reload latency
    /// before trusting reads of the live path.
    pub fn commit(&self, document: &AllocationDocument) -> Result<(), StoreError> {
        let text = document.to_json_pretty()?;

        if self.live_path.exists() {
            fs::create_dir_all(&self.backup_dir).map_err(|source| StoreError::Io {
                path: self.backup_dir.clone(),
                source,
            })?;
            let backup_path = self.backup_dir.join(backup_file_name());
            fs::rename(&self.live_path, &backup_path).map_err(|source| StoreError::Io {
                path: backup_path.clone(),
                source,
            })?;
            info!(path = %backup_path.display(), "Backed up live config");
        }

        // Write-then-rename within the live directory keeps the swap atomic
        // on the same filesystem.
        let tmp_path = self.live_path.with_extension("config.tmp");
        fs::write(&tmp_path, text).map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.live_path).map_err(|source| StoreError::Io {
            path: self.live_path.clone(),
            source,
        })?;
        info!(path = %self.live_path.display(), "Committed live config");

        self.discard_staged()
    }
}

/// Timestamped backup name, colon-free for filesystem safety:
/// `D2026-08-23-T141503.config`.
fn backup_file_name() -> String {
    Local::now().format("D%Y-%m-%d-T%H%M%S.config").to_string()
}
