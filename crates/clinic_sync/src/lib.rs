//! # clinic_sync
//!
//! Build-time mirror of the clinic's editable content.
//!
//! [`run_sync`] processes the collections in a fixed order: staff roster,
//! gallery, cover image, then each document collection. Every run recomputes
//! everything from the remote store plus local disk; nothing is carried over
//! between runs except the mirrored files themselves.

pub mod config;
pub mod cover;
pub mod crop;
pub mod documents;
pub mod download;
pub mod error;
pub mod gallery;
pub mod report;
pub mod roster;

pub use config::{Preflight, SheetRanges, SiteLayout, SyncConfig, preflight};
pub use cover::sync_cover_image;
pub use crop::{CropPlan, crop_to_fixed_aspect};
pub use documents::sync_document_collection;
pub use error::SyncError;
pub use gallery::sync_gallery;
pub use report::{CollectionReport, CoverReport, SyncReport};
pub use roster::sync_row_collection;

use clinic_core::prelude::*;
use clinic_fs::LocalDir;
use tracing::info;

/// The staff roster: rows from the staff range, images from the staff folder.
pub fn staff_target(config: &SyncConfig, layout: &SiteLayout) -> SyncTarget {
    SyncTarget::row_sheet("staff", &config.staff_folder_id, layout.staff_images())
}

/// The document collections mirrored after the sheet-backed ones.
pub fn document_targets(config: &SyncConfig, layout: &SiteLayout) -> Vec<SyncTarget> {
    vec![
        SyncTarget::documents("services", &config.services_folder_id, layout.services_dir()),
        SyncTarget::documents("messages", &config.messages_folder_id, layout.messages_dir()),
    ]
}

/// Runs one full synchronization. The first failure of a required collection
/// aborts the run.
pub async fn run_sync<S: RemoteStore>(
    store: &S,
    config: &SyncConfig,
    layout: &SiteLayout,
) -> Result<SyncReport, SyncError> {
    let mut report = SyncReport::default();

    let staff = staff_target(config, layout);
    info!(collection = %staff.name, kind = %staff.kind, "Syncing");
    let roster = sync_row_collection(
        store,
        &config.ranges.staff,
        &staff.remote_folder_id,
        &layout.staff_manifest(),
        &LocalDir::new(&staff.local_destination),
    )
    .await?;
    report.collections.push(roster);

    info!(collection = "gallery", kind = %TargetKind::RowSheet, "Syncing");
    let gallery = sync_gallery(
        store,
        &config.spreadsheet_id,
        &config.ranges.gallery,
        &layout.gallery_manifest(),
        &LocalDir::new(layout.gallery_images()),
    )
    .await?;

    let cover = SyncTarget::single_image("cover", &gallery.folder_id, layout.cover_cache());
    info!(collection = %cover.name, kind = %cover.kind, "Syncing");
    report.cover = sync_cover_image(
        store,
        &cover.remote_folder_id,
        gallery.sheet.as_ref(),
        &config.ranges.settings,
        &LocalDir::new(&cover.local_destination),
        &layout.cover_output(),
    )
    .await?;
    report.collections.push(gallery.report);

    for target in document_targets(config, layout) {
        info!(collection = %target.name, kind = %target.kind, "Syncing");
        let collection = sync_document_collection(store, &target).await?;
        report.collections.push(collection);
    }

    info!(
        downloads = report.total_downloads(),
        deletions = report.total_deletions(),
        "Sync complete"
    );
    Ok(report)
}
