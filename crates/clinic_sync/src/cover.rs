use crate::crop::crop_to_fixed_aspect;
use crate::download::mirror_optional_image;
use crate::error::SyncError;
use crate::gallery::GallerySheet;
use crate::report::{CollectionReport, CoverReport};
use clinic_core::prelude::*;
use clinic_fs::LocalDir;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{info, instrument, warn};

pub const SETTING_COVER_IMAGE: &str = "cover_image";
pub const SETTING_COVER_SCALE: &str = "cover_image_scale";
pub const SETTING_COVER_POSITION_X: &str = "cover_image_position_x";
pub const SETTING_COVER_POSITION_Y: &str = "cover_image_position_y";

/// The cover image file and how to frame it.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverChoice {
    pub file: String,
    pub config: ImageConfig,
}

pub fn cover_from_settings(settings: &HashMap<String, String>) -> Option<CoverChoice> {
    let setting = |key: &str| settings.get(key).map(String::as_str).filter(|v| !v.trim().is_empty());
    let file = setting(SETTING_COVER_IMAGE)?.trim().to_string();

    Some(CoverChoice {
        file,
        config: parse_image_config(
            setting(SETTING_COVER_SCALE),
            setting(SETTING_COVER_POSITION_X),
            setting(SETTING_COVER_POSITION_Y),
        ),
    })
}

/// Prefers the active cover row of the gallery sheet, then the flat settings
/// sheet. A missing settings tab means no cover.
pub async fn resolve_cover<S: RemoteStore>(
    store: &S,
    gallery: Option<&GallerySheet>,
    settings_range: &str,
) -> Result<Option<CoverChoice>, SyncError> {
    if let Some(cover) = gallery.and_then(|g| g.cover.as_ref()) {
        return Ok(Some(CoverChoice {
            file: cover.image_file.clone(),
            config: cover.image_config,
        }));
    }

    match store.list_rows(settings_range).await {
        Ok(rows) => Ok(cover_from_settings(&parse_settings(&rows))),
        Err(e) if e.is_range_not_found() => {
            info!(range = settings_range, "Settings sheet not found");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Mirrors the cover source image and regenerates the derived crop.
///
/// The crop is rebuilt on every run, even when the source is unchanged,
/// because the framing lives in the sheet and may change on its own.
#[instrument(skip(store, gallery, cache), fields(cache = %cache.root().display()))]
pub async fn sync_cover_image<S: RemoteStore>(
    store: &S,
    folder_id: &str,
    gallery: Option<&GallerySheet>,
    settings_range: &str,
    cache: &LocalDir,
    output: &Path,
) -> Result<CoverReport, SyncError> {
    let Some(choice) = resolve_cover(store, gallery, settings_range).await? else {
        info!("No cover image configured");
        return Ok(CoverReport::default());
    };

    let mut report = CoverReport {
        file: Some(choice.file.clone()),
        ..Default::default()
    };

    let mut fetch = CollectionReport::new("cover");
    mirror_optional_image(store, folder_id, cache, &choice.file, &mut fetch).await;
    report.downloaded = !fetch.downloaded.is_empty();

    let keep = HashSet::from([choice.file.clone()]);
    cache.prune(&keep).await?;

    let source = match cache.path_of(&choice.file) {
        Ok(path) if tokio::fs::try_exists(&path).await.unwrap_or(false) => path,
        _ => {
            warn!(file = %choice.file, "No local copy of the cover image, crop not regenerated");
            return Ok(report);
        }
    };

    let config = choice.config;
    match crop_to_fixed_aspect(
        &source,
        output,
        config.scale,
        f64::from(config.position_x),
        f64::from(config.position_y),
    )
    .await
    {
        Ok(_) => report.regenerated = true,
        Err(e) => warn!(file = %choice.file, "Cover crop failed: {e}"),
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_supply_file_and_framing() {
        let settings = HashMap::from([
            (SETTING_COVER_IMAGE.to_string(), " hero.jpg ".to_string()),
            (SETTING_COVER_SCALE.to_string(), "5".to_string()),
            (SETTING_COVER_POSITION_X.to_string(), "10".to_string()),
        ]);
        let choice = cover_from_settings(&settings).unwrap();
        assert_eq!(choice.file, "hero.jpg");
        assert_eq!(choice.config.scale, 2.0);
        assert_eq!(choice.config.position_x, 10);
        assert_eq!(choice.config.position_y, 50);
    }

    #[test]
    fn blank_cover_setting_means_no_cover() {
        let settings = HashMap::from([(SETTING_COVER_IMAGE.to_string(), "  ".to_string())]);
        assert!(cover_from_settings(&settings).is_none());
    }
}
