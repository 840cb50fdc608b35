//! The shared "download or skip" step used by every collection.

use crate::error::SyncError;
use crate::report::CollectionReport;
use clinic_core::prelude::*;
use clinic_fs::{LocalDir, atomic_write, needs_download};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Downloaded,
    Unchanged,
}

pub fn manifest_entry(dir: &LocalDir, remote: &RemoteFile) -> Result<ManifestEntry, SyncError> {
    Ok(ManifestEntry {
        remote_id: remote.id.clone(),
        remote_hash: remote.content_hash.clone(),
        local_path: dir.path_of(&remote.name)?,
    })
}

/// Downloads `remote` into `dir` when the staleness rule says so.
pub async fn mirror_file<S: RemoteStore>(
    store: &S,
    dir: &LocalDir,
    remote: &RemoteFile,
) -> Result<FileOutcome, SyncError> {
    let entry = manifest_entry(dir, remote)?;

    if !needs_download(&entry.local_path, entry.remote_hash.as_deref()).await? {
        debug!(file = %remote.name, "Up to date, skipping");
        return Ok(FileOutcome::Unchanged);
    }

    let data = store.get_file_bytes(&entry.remote_id).await?;
    atomic_write(&entry.local_path, &data).await?;
    info!(file = %remote.name, bytes = data.len(), "Downloaded");
    Ok(FileOutcome::Downloaded)
}

/// Resolves `name` in `folder_id` and mirrors it. Failures are logged and
/// recorded in the report instead of propagating, so one bad row cannot stop
/// the rest of the collection.
pub async fn mirror_optional_image<S: RemoteStore>(
    store: &S,
    folder_id: &str,
    dir: &LocalDir,
    name: &str,
    report: &mut CollectionReport,
) {
    let result = async {
        match store.find_file(folder_id, name).await? {
            Some(remote) => mirror_file(store, dir, &remote).await.map(Some),
            None => Ok::<_, SyncError>(None),
        }
    }
    .await;

    match result {
        Ok(Some(FileOutcome::Downloaded)) => report.downloaded.push(name.to_string()),
        Ok(Some(FileOutcome::Unchanged)) => report.unchanged.push(name.to_string()),
        Ok(None) => {
            warn!(collection = %report.name, file = %name, "Image not found in remote folder");
            report.failed.push(name.to_string());
        }
        Err(e) => {
            warn!(collection = %report.name, file = %name, "Image download failed: {e}");
            report.failed.push(name.to_string());
        }
    }
}
