use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{anyhow, Context, Result};
use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};

use crate::util::timestamp_now_ms;

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

pub struct FsGuard {
    path: PathBuf,
}

impl FsGuard {
    /// Creates a new dir that will be cleaned up when the guard is dropped
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.exists() {
            Err(anyhow!("Couldn't create new dir '{}': path exists", path))
        } else {
            std::fs::create_dir_all(&path)
                .with_context(|| format!("Couldn't create new dir '{}'", path))?;
            Ok(Self { path })
        }
    }

    /// Creates a uniquely named dir under the system temp dir.
    /// Names combine time, pid and an in-process counter, so concurrent runs never collide.
    pub fn temp(label: &str) -> Result<Self> {
        let temp_dir = PathBuf::from_path_buf(std::env::temp_dir())
            .map_err(|dir| anyhow!("Temp dir {} is not valid utf-8", dir.display()))?;
        let name = format!(
            "{}-{}-{}-{}",
            label,
            timestamp_now_ms(),
            std::process::id(),
            TEMP_SEQ.fetch_add(1, Ordering::Relaxed)
        );
        Self::new(temp_dir.join(name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FsGuard {
    fn drop(&mut self) {
        let result = std::fs::remove_dir_all(&self.path);
        if let Err(e) = result {
            tracing::warn!("Couldn't remove dir '{}' on cleanup: {}", self.path, e);
        }
    }
}
