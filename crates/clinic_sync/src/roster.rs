use crate::download::mirror_optional_image;
use crate::error::SyncError;
use crate::report::CollectionReport;
use clinic_core::prelude::*;
use clinic_fs::{LocalDir, write_json};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, instrument};

/// Unique, non-empty image names in first-reference order.
pub(crate) fn referenced_images<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|n| !n.is_empty())
        .filter(|n| seen.insert(*n))
        .map(str::to_string)
        .collect()
}

/// Mirrors the staff roster.
///
/// The sheet read is load-bearing and its failure propagates. Each image is
/// optional: lookup or download failures are logged and skipped. The manifest
/// is rebuilt from the active rows on every run, then images no active record
/// references are deleted.
#[instrument(skip(store, images), fields(dir = %images.root().display()))]
pub async fn sync_row_collection<S: RemoteStore>(
    store: &S,
    range: &str,
    folder_id: &str,
    manifest: &Path,
    images: &LocalDir,
) -> Result<CollectionReport, SyncError> {
    let rows = store.list_rows(range).await?;

    let records: Vec<StaffRecord> = rows
        .iter()
        .filter_map(|row| parse_staff_row(row))
        .filter(|record| record.active)
        .collect();

    let mut report = CollectionReport::new("staff");
    let wanted = referenced_images(records.iter().map(|r| r.image_file.as_str()));
    for name in &wanted {
        mirror_optional_image(store, folder_id, images, name, &mut report).await;
    }

    write_json(manifest, &records).await?;
    report.records = records.len();
    info!(records = records.len(), "Wrote staff manifest");

    let keep: HashSet<String> = wanted.into_iter().collect();
    report.deleted = images.prune(&keep).await?;

    Ok(report)
}
