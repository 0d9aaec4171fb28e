//! Scoped working directory of a single job

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::core::config;

/// Uniquely named directory owned by one job.
///
/// Removed recursively when dropped, whatever way the job ends.
#[derive(Debug)]
pub struct JobWorkspace {
    dir: TempDir,
}

impl JobWorkspace {
    /// Creates a workspace under `root`, creating `root` first if needed.
    pub fn create_in(root: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(root)?;
        let dir = tempfile::Builder::new()
            .prefix(config::media::WORKSPACE_PREFIX)
            .tempdir_in(root)?;
        log::debug!("Created workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    /// [`create_in`](Self::create_in) on the blocking thread pool, for async callers.
    pub async fn create(root: PathBuf) -> io::Result<Self> {
        tokio::task::spawn_blocking(move || Self::create_in(&root))
            .await
            .map_err(io::Error::other)?
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file inside the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// yt-dlp output template keyed by media id.
    pub fn output_template(&self) -> String {
        self.file("%(id)s.%(ext)s").to_string_lossy().into_owned()
    }

    /// Removes the directory now and reports failures instead of swallowing them.
    ///
    /// Runs on the blocking thread pool; a large video makes this a real delete.
    pub async fn close(self) -> io::Result<()> {
        let path = self.dir.path().to_path_buf();
        let dir = self.dir;
        tokio::task::spawn_blocking(move || dir.close())
            .await
            .map_err(io::Error::other)??;
        log::debug!("Removed workspace {}", path.display());
        Ok(())
    }
}
