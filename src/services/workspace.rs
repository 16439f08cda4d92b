use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

const WORKSPACE_PREFIX: &str = "trusted-merge-";

/// Exclusively owned scratch directory for one request.
///
/// Removal is best-effort and happens exactly once: either through
/// [`Workspace::close`] or, on any other exit path, when the value drops.
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl Workspace {
    /// Create a uniquely named directory under `root`.
    pub fn open(root: &Path) -> AppResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(root)
            .map_err(|e| AppError::internal(format!("Failed to create workspace: {}", e)))?;
        let path = dir.path().to_path_buf();
        debug!(workspace = %path.display(), "Workspace opened");
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    /// Remove the directory on the blocking pool. Failures are logged,
    /// never returned.
    pub async fn close(mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        let path = self.path.clone();
        match tokio::task::spawn_blocking(move || dir.close()).await {
            Ok(result) => log_removal(&path, result),
            Err(e) => warn!(workspace = %path.display(), error = %e, "Workspace cleanup task failed"),
        }
    }
}

// Cancelled or failed requests end here; removal has to finish before the
// value is gone, so it runs inline.
impl Drop for Workspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            log_removal(&self.path, dir.close());
        }
    }
}

fn log_removal(path: &Path, result: std::io::Result<()>) {
    match result {
        Ok(()) => debug!(workspace = %path.display(), "Workspace removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(workspace = %path.display(), "Workspace already gone")
        }
        Err(e) => warn!(
            workspace = %path.display(),
            error = %e,
            "Failed to remove workspace"
        ),
    }
}
