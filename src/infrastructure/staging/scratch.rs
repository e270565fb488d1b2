//! Per-invocation scratch directories

use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::LoaderError;

const STAGING_PREFIX: &str = "s3fileloader-";

/// Root under which staging directories are created
#[derive(Debug, Clone)]
pub struct ScratchArea {
    root: PathBuf,
}

impl ScratchArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Scratch area under the OS temp directory
    pub fn system() -> Self {
        Self::new(std::env::temp_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a fresh directory and write `bytes` to `key_name` inside it.
    ///
    /// The returned guard owns the directory. If any step after the
    /// directory was created fails, the partially built directory is removed
    /// before the error is returned.
    pub async fn acquire(&self, bytes: &[u8], key_name: &str) -> Result<StagedFile, LoaderError> {
        let relative = relative_key_path(key_name)
            .map_err(|e| LoaderError::stage(key_name, &self.root, e))?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| LoaderError::stage(key_name, &self.root, e))?;

        let dir = self
            .root
            .join(format!("{}{}", STAGING_PREFIX, Uuid::new_v4()));

        // create_dir, not create_dir_all: an existing directory is a collision
        tokio::fs::create_dir(&dir)
            .await
            .map_err(|e| LoaderError::stage(key_name, &dir, e))?;

        let staged = StagedFile {
            path: dir.join(relative),
            dir,
            released: false,
        };

        if let Some(parent) = staged.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LoaderError::stage(key_name, parent, e))?;
        }

        tokio::fs::write(&staged.path, bytes)
            .await
            .map_err(|e| LoaderError::stage(key_name, &staged.path, e))?;

        debug!(
            path = %staged.path.display(),
            size = bytes.len(),
            "Object staged"
        );

        Ok(staged)
    }
}

impl Default for ScratchArea {
    fn default() -> Self {
        Self::system()
    }
}

/// A staged file and the directory that owns it.
///
/// The directory is removed exactly once: by [`StagedFile::release`], or on
/// drop if it was never released (error paths, cancellation).
#[derive(Debug)]
pub struct StagedFile {
    dir: PathBuf,
    path: PathBuf,
    released: bool,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Remove the owning directory now and report the outcome
    pub fn release(mut self) -> io::Result<()> {
        self.released = true;
        let result = remove_dir(&self.dir);

        match &result {
            Ok(()) => debug!(dir = %self.dir.display(), "Staging directory released"),
            Err(e) => warn!(
                dir = %self.dir.display(),
                error = %e,
                "Failed to release staging directory"
            ),
        }

        result
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        self.released = true;

        if let Err(e) = remove_dir(&self.dir) {
            warn!(
                dir = %self.dir.display(),
                error = %e,
                "Failed to clean up staging directory"
            );
        } else {
            debug!(dir = %self.dir.display(), "Staging directory cleaned up");
        }
    }
}

fn remove_dir(dir: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(dir) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Turn an object key into a path that stays inside the staging directory
fn relative_key_path(key_name: &str) -> io::Result<PathBuf> {
    let mut relative = PathBuf::new();

    for component in Path::new(key_name).components() {
        match component {
            Component::Normal(segment) => relative.push(segment),
            Component::CurDir => {}
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("object key '{}' escapes the staging directory", key_name),
                ));
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "object key has no file name",
        ));
    }

    Ok(relative)
}
