use crate::download::mirror_optional_image;
use crate::error::SyncError;
use crate::report::CollectionReport;
use crate::roster::referenced_images;
use clinic_core::prelude::*;
use clinic_fs::{LocalDir, write_json};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, instrument, warn};

/// The gallery sheet split into its two audiences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GallerySheet {
    /// Active ordinary items, ascending by `order`.
    pub items: Vec<GalleryItem>,
    /// The active cover-image row, if any.
    pub cover: Option<GalleryItem>,
}

pub fn split_gallery(rows: &[Vec<String>]) -> GallerySheet {
    let mut sheet = GallerySheet::default();
    let mut covers = 0usize;

    for (index, row) in rows.iter().enumerate() {
        let Some(item) = parse_gallery_row(row, index) else {
            continue;
        };
        match item.item_type {
            GalleryItemType::CoverImage => {
                covers += 1;
                if item.active && sheet.cover.is_none() {
                    sheet.cover = Some(item);
                }
            }
            GalleryItemType::Gallery if item.active => sheet.items.push(item),
            GalleryItemType::Gallery => {}
        }
    }

    if covers > 1 {
        warn!(count = covers, "Several cover-image rows in gallery sheet, using the first active one");
    }

    sheet.items.sort_by_key(|item| item.order);
    sheet
}

/// Reads the gallery range. `None` means the tab does not exist, which is a
/// valid state; any other error propagates.
pub async fn read_gallery<S: RemoteStore>(store: &S, range: &str) -> Result<Option<GallerySheet>, SyncError> {
    match store.list_rows(range).await {
        Ok(rows) => Ok(Some(split_gallery(&rows))),
        Err(e) if e.is_range_not_found() => {
            info!(range, "Gallery sheet not found, treating as empty");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// The folder holding the settings spreadsheet, which also holds the gallery
/// and cover images.
pub async fn resolve_content_folder<S: RemoteStore>(store: &S, spreadsheet_id: &str) -> Result<String, SyncError> {
    store
        .parent_folder(spreadsheet_id)
        .await?
        .ok_or_else(|| SyncError::MissingParent(spreadsheet_id.to_string()))
}

#[derive(Debug, Clone)]
pub struct GalleryOutcome {
    pub report: CollectionReport,
    pub folder_id: String,
    /// `None` when the gallery tab does not exist.
    pub sheet: Option<GallerySheet>,
}

/// Mirrors the gallery images and writes `gallery.json`.
///
/// A missing gallery tab writes an empty manifest and prunes every image.
#[instrument(skip(store, images), fields(dir = %images.root().display()))]
pub async fn sync_gallery<S: RemoteStore>(
    store: &S,
    spreadsheet_id: &str,
    range: &str,
    manifest: &Path,
    images: &LocalDir,
) -> Result<GalleryOutcome, SyncError> {
    let folder_id = resolve_content_folder(store, spreadsheet_id).await?;
    let sheet = read_gallery(store, range).await?;
    let items: &[GalleryItem] = sheet.as_ref().map(|s| s.items.as_slice()).unwrap_or_default();

    let mut report = CollectionReport::new("gallery");
    let wanted = referenced_images(items.iter().map(|i| i.image_file.as_str()));
    for name in &wanted {
        mirror_optional_image(store, &folder_id, images, name, &mut report).await;
    }

    write_json(manifest, items).await?;
    report.records = items.len();
    info!(records = items.len(), "Wrote gallery manifest");

    let keep: HashSet<String> = wanted.into_iter().collect();
    report.deleted = images.prune(&keep).await?;

    Ok(GalleryOutcome {
        report,
        folder_id,
        sheet,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn cover_row_is_separated_and_items_sorted() {
        let sheet = split_gallery(&[
            row(&["Chair", "chair.jpg", "Chair", "yes", "2"]),
            row(&["Hero", "hero.jpg", "", "yes", "0", "1.2", "40", "60", "cover-image"]),
            row(&["Lobby", "lobby.jpg", "Lobby", "yes", "1"]),
            row(&["Old", "old.jpg", "", "no", "3"]),
        ]);

        let files: Vec<_> = sheet.items.iter().map(|i| i.image_file.as_str()).collect();
        assert_eq!(files, vec!["lobby.jpg", "chair.jpg"]);
        let cover = sheet.cover.unwrap();
        assert_eq!(cover.image_file, "hero.jpg");
        assert_eq!(cover.image_config.position_x, 40);
    }

    #[test]
    fn inactive_cover_row_is_dropped_everywhere() {
        let sheet = split_gallery(&[row(&["Hero", "hero.jpg", "", "no", "0", "", "", "", "cover-image"])]);
        assert!(sheet.items.is_empty());
        assert!(sheet.cover.is_none());
    }
}
