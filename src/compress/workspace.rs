//! Scoped temporary directory shared by all per-image tasks of one run.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tempfile::TempDir;
use tracing::warn;

/// One temp directory per orchestration run. Hands out uniquely numbered
/// file paths so concurrent tasks never collide; removed once, after the
/// whole batch has settled. Dropping the value removes it as a fallback.
#[derive(Debug)]
pub struct TempWorkspace {
    dir: TempDir,
    counter: AtomicU64,
}

impl TempWorkspace {
    pub fn create() -> std::io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("texpress-").tempdir()?;
        Ok(Self {
            dir,
            counter: AtomicU64::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Fresh path for encoder input bytes.
    pub fn input_path(&self, extension: &str) -> PathBuf {
        self.numbered("in", extension)
    }

    /// Fresh path the encoder is told to write its output to.
    pub fn output_path(&self, extension: &str) -> PathBuf {
        self.numbered("out", extension)
    }

    fn numbered(&self, role: &str, extension: &str) -> PathBuf {
        let id = self.counter.fetch_add(1, Ordering::Relaxed);
        self.dir.path().join(format!("tex-{id}-{role}.{extension}"))
    }

    /// Recursively remove the workspace. Cleanup is best-effort and never
    /// turns into a reported error.
    pub fn close(self) {
        if let Err(e) = self.dir.close() {
            warn!("failed to remove temp workspace: {e}");
        }
    }
}
