use crate::error::{Result, ThemeError};
use crate::paths;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Advisory lock held for the duration of an apply or rollback.
///
/// The lock is a `.themekit/lock` file created exclusively; it is removed
/// when the guard drops. A stale file left by a crashed process must be
/// deleted by hand.
#[derive(Debug)]
pub struct ProjectLock {
    path: PathBuf,
}

impl ProjectLock {
    pub fn acquire(root: &Path) -> Result<Self> {
        let path = paths::lock_path(root);
        crate::io::ensure_dir(&paths::themekit_dir(root))?;

        let mut file = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(ThemeError::Locked(path));
            }
            Err(e) => return Err(e.into()),
        };
        writeln!(file, "pid={}", std::process::id())?;
        tracing::debug!(path = %path.display(), "lock acquired");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProjectLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release lock");
        }
    }
}
