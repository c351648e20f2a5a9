//! Readiness marker file
//!
//! The pod's readiness/liveness probes check for this file. It is removed
//! at process start so a crash never leaves a stale ready signal, and
//! created once initial sync/discovery completes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Filesystem readiness marker.
pub struct ReadinessFile {
    path: PathBuf,
}

impl ReadinessFile {
    /// Create a marker handle for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Remove a stale marker left by a previous run.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Signal readiness by creating the marker.
    pub fn mark_ready(&self) -> io::Result<()> {
        fs::File::create(&self.path)?;
        tracing::info!(path = %self.path.display(), "Readiness marker created");
        Ok(())
    }

    /// The marker path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
