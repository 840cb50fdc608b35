//! # Clinic local mirror
//!
//! The local half of a sync run: one [`LocalDir`] per destination directory,
//! holding the files mirrored from the remote store.
//!
//! ## Features
//!
//! * **Atomic Writes**: content is written to a temporary file and renamed into
//!   place, so the site generator never reads a half-written manifest or image.
//! * **Staleness Rule**: [`LocalDir::is_stale`] is the single decision point for
//!   "download or skip".
//! * **Orphan Cleanup**: [`LocalDir::prune`] removes files no record references,
//!   sparing the `.gitkeep` sentinel.
//!
//! ## Usage
//!
//! ```no_run
//! use clinic_fs::LocalDir;
//!
//! let staff_images = LocalDir::new("./public/images/staff");
//! ```

mod announcements;

pub use announcements::{parse_announcement, read_announcements};

use bytes::Bytes;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

/// Files with this name are never pruned.
pub const KEEP_FILE: &str = ".gitkeep";

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Refusing unsafe file name: {0:?}")]
    InvalidName(String),
}

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> MirrorError {
    MirrorError::Io {
        path: path.into(),
        source,
    }
}

/// Hex SHA-256 of `data`, comparable with remote content hashes.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

pub async fn hash_file(path: &Path) -> Result<String, MirrorError> {
    let data = fs::read(path).await.map_err(|e| io_err(path, e))?;
    Ok(hash_bytes(&data))
}

/// The staleness rule: a download is needed when the local file is absent,
/// when the remote reports no hash, or when the local bytes hash differently.
pub async fn needs_download(local: &Path, remote_hash: Option<&str>) -> Result<bool, MirrorError> {
    if !fs::try_exists(local).await.map_err(|e| io_err(local, e))? {
        return Ok(true);
    }
    let Some(remote_hash) = remote_hash else {
        return Ok(true);
    };
    let local_hash = hash_file(local).await?;
    Ok(!local_hash.eq_ignore_ascii_case(remote_hash))
}

pub async fn atomic_write(path: &Path, data: &[u8]) -> Result<(), MirrorError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| io_err(parent, e))?;
    }

    let tmp_path = tmp_path_for(path);

    fs::write(&tmp_path, data)
        .await
        .map_err(|e| io_err(&tmp_path, e))?;
    fs::rename(&tmp_path, path)
        .await
        .map_err(|e| io_err(path, e))?;

    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serializes `value` as pretty JSON and replaces `path` atomically.
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), MirrorError> {
    let mut json = serde_json::to_vec_pretty(value)?;
    json.push(b'\n');
    atomic_write(path, &json).await
}

/// A destination directory holding mirrored files keyed by name.
#[derive(Debug, Clone)]
pub struct LocalDir {
    root: PathBuf,
}

impl LocalDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { root: path.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `name` inside the directory. Names that could escape it are
    /// rejected.
    pub fn path_of(&self, name: &str) -> Result<PathBuf, MirrorError> {
        let unsafe_name = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\'])
            || name.contains('\0');
        if unsafe_name {
            return Err(MirrorError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    pub async fn is_stale(&self, name: &str, remote_hash: Option<&str>) -> Result<bool, MirrorError> {
        needs_download(&self.path_of(name)?, remote_hash).await
    }

    pub async fn write(&self, name: &str, data: Bytes) -> Result<PathBuf, MirrorError> {
        let path = self.path_of(name)?;
        atomic_write(&path, &data).await?;
        Ok(path)
    }

    /// Names of the regular files in the directory. A missing directory is
    /// empty.
    pub async fn names(&self) -> Result<Vec<String>, MirrorError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err(&self.root, e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_err(&self.root, e))?
        {
            let file_type = entry.file_type().await.map_err(|e| io_err(entry.path(), e))?;
            if !file_type.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub async fn remove(&self, name: &str) -> Result<(), MirrorError> {
        let path = self.path_of(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(path, e)),
        }
    }

    /// Deletes every file whose name is not in `keep`, except [`KEEP_FILE`].
    /// Returns the deleted names.
    pub async fn prune(&self, keep: &HashSet<String>) -> Result<Vec<String>, MirrorError> {
        let mut removed = Vec::new();
        for name in self.names().await? {
            if name == KEEP_FILE || keep.contains(&name) {
                continue;
            }
            self.remove(&name).await?;
            info!(dir = %self.root.display(), file = %name, "Removed unreferenced file");
            removed.push(name);
        }
        if removed.is_empty() {
            debug!(dir = %self.root.display(), "Nothing to prune");
        }
        Ok(removed)
    }
}
