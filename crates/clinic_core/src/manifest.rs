use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 2.0;
pub const DEFAULT_SCALE: f64 = 1.0;
pub const DEFAULT_POSITION: u8 = 50;

/// Display adjustments for an image: zoom and focus point in percent.
///
/// Every value is always within bounds; see [`crate::rows::parse_image_config`]
/// for how raw sheet cells are normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub scale: f64,
    pub position_x: u8,
    pub position_y: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            position_x: DEFAULT_POSITION,
            position_y: DEFAULT_POSITION,
        }
    }
}

/// One entry of `staff.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffRecord {
    /// Slug derived from the name.
    pub id: String,
    pub name: String,
    pub title: String,
    pub description: String,
    pub image_file: String,
    pub active: bool,
    pub image_config: ImageConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GalleryItemType {
    #[default]
    Gallery,
    CoverImage,
}

/// One row of the gallery sheet. Cover-image rows never reach `gallery.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub title: String,
    pub image_file: String,
    pub alt_text: String,
    pub active: bool,
    pub order: i64,
    pub image_config: ImageConfig,
    #[serde(rename = "type")]
    pub item_type: GalleryItemType,
}

/// The unit of change detection for one remote item and its local copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub remote_id: String,
    pub remote_hash: Option<String>,
    pub local_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    MarkdownDocuments,
    RowSheet,
    SingleImage,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TargetKind::MarkdownDocuments => "markdown-documents",
            TargetKind::RowSheet => "row-sheet",
            TargetKind::SingleImage => "single-image",
        })
    }
}

/// One collection to synchronize. Built once per run from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    pub name: String,
    pub remote_folder_id: String,
    pub local_destination: PathBuf,
    pub kind: TargetKind,
}

impl SyncTarget {
    pub fn new(
        name: impl Into<String>,
        remote_folder_id: impl Into<String>,
        local_destination: impl Into<PathBuf>,
        kind: TargetKind,
    ) -> Self {
        Self {
            name: name.into(),
            remote_folder_id: remote_folder_id.into(),
            local_destination: local_destination.into(),
            kind,
        }
    }

    pub fn documents(
        name: impl Into<String>,
        remote_folder_id: impl Into<String>,
        local_destination: impl Into<PathBuf>,
    ) -> Self {
        Self::new(name, remote_folder_id, local_destination, TargetKind::MarkdownDocuments)
    }

    /// A sheet-backed collection whose images live in `remote_folder_id`.
    pub fn row_sheet(
        name: impl Into<String>,
        remote_folder_id: impl Into<String>,
        local_destination: impl Into<PathBuf>,
    ) -> Self {
        Self::new(name, remote_folder_id, local_destination, TargetKind::RowSheet)
    }

    pub fn single_image(
        name: impl Into<String>,
        remote_folder_id: impl Into<String>,
        local_destination: impl Into<PathBuf>,
    ) -> Self {
        Self::new(name, remote_folder_id, local_destination, TargetKind::SingleImage)
    }
}
