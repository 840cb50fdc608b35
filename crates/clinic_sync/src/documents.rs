use crate::download::{FileOutcome, mirror_file};
use crate::error::SyncError;
use crate::report::CollectionReport;
use clinic_core::prelude::*;
use clinic_fs::LocalDir;
use futures::future::try_join_all;
use std::collections::HashSet;
use tracing::{info, instrument, warn};

const DOCUMENT_EXTENSION: &str = ".md";
const TMP_SUFFIX: &str = ".tmp";

fn is_document(name: &str) -> bool {
    name.ends_with(DOCUMENT_EXTENSION)
}

/// Local files the pruning pass leaves alone: anything that is neither a
/// document nor a leftover from an interrupted write.
fn is_foreign(name: &str) -> bool {
    !is_document(name) && !name.ends_with(TMP_SUFFIX)
}

/// Mirrors one folder of markdown documents one-to-one by file name.
///
/// Local documents missing remotely are deleted first, along with `.tmp`
/// leftovers; stale documents are then fetched concurrently. Other
/// non-document files in the destination are left alone.
#[instrument(skip(store, target), fields(collection = %target.name))]
pub async fn sync_document_collection<S: RemoteStore>(
    store: &S,
    target: &SyncTarget,
) -> Result<CollectionReport, SyncError> {
    let dir = LocalDir::new(&target.local_destination);
    let listing = store
        .list_files(&FileQuery::folder(&target.remote_folder_id))
        .await?;

    let mut seen = HashSet::new();
    let mut documents = Vec::new();
    for file in listing.into_iter().filter(|f| is_document(&f.name)) {
        if dir.path_of(&file.name).is_err() {
            warn!(file = %file.name, "Skipping document with unsafe name");
            continue;
        }
        if !seen.insert(file.name.clone()) {
            warn!(file = %file.name, "Duplicate document name in remote folder, keeping the first");
            continue;
        }
        documents.push(file);
    }

    if documents.is_empty() {
        warn!(folder = %target.remote_folder_id, "Remote folder has no documents");
    }

    let mut report = CollectionReport::new(target.name.clone());

    let mut keep = seen;
    keep.extend(dir.names().await?.into_iter().filter(|n| is_foreign(n)));
    report.deleted = dir.prune(&keep).await?;

    let outcomes = try_join_all(documents.iter().map(|doc| mirror_file(store, &dir, doc))).await?;
    for (doc, outcome) in documents.iter().zip(outcomes) {
        match outcome {
            FileOutcome::Downloaded => report.downloaded.push(doc.name.clone()),
            FileOutcome::Unchanged => report.unchanged.push(doc.name.clone()),
        }
    }

    report.records = documents.len();
    info!(
        documents = documents.len(),
        downloaded = report.downloaded.len(),
        deleted = report.deleted.len(),
        "Synced document collection"
    );
    Ok(report)
}
