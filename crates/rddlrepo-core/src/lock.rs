//! Cooperative lock around archive mutation.
//!
//! Rebuilds and registrations hold `<manifest>.lock` for their whole
//! duration. The lock file is created exclusively and removed on drop.

use crate::error::RepoError;
use chrono::Utc;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn archive_lock_path(manifest_path: &Path) -> PathBuf {
    let mut path: OsString = manifest_path.as_os_str().to_os_string();
    path.push(".lock");
    PathBuf::from(path)
}

pub(crate) struct ArchiveLockGuard {
    lock_path: PathBuf,
    _file: File,
}

impl ArchiveLockGuard {
    pub(crate) fn acquire(manifest_path: &Path) -> Result<Self, RepoError> {
        let lock_path = archive_lock_path(manifest_path);
        if let Some(parent) = lock_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| RepoError::io(lock_path.display(), e))?;
        }

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(mut file) => {
                let _ = writeln!(
                    file,
                    "pid={}\nutc={}",
                    std::process::id(),
                    Utc::now().to_rfc3339()
                );
                Ok(Self {
                    lock_path,
                    _file: file,
                })
            }
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(RepoError::LockBusy {
                    lock_path: lock_path.display().to_string(),
                })
            }
            Err(err) => Err(RepoError::io(lock_path.display(), err)),
        }
    }
}

impl Drop for ArchiveLockGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}
