//! Fixed-aspect cover crop for the social preview image.

use crate::error::SyncError;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use tracing::info;

pub const TARGET_WIDTH: u32 = 1200;
pub const TARGET_HEIGHT: u32 = 630;

/// Resize and extraction geometry for one source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropPlan {
    pub resize_width: u32,
    pub resize_height: u32,
    pub origin_x: u32,
    pub origin_y: u32,
    /// Equal to the target size unless a scale below 1 shrank the image
    /// under it.
    pub extract_width: u32,
    pub extract_height: u32,
}

/// Origin along one axis: centre the window on the focus point, then clamp it
/// so the window stays inside the resized image.
fn axis_origin(resized: u32, target: u32, focus_percent: f64) -> u32 {
    let focus = focus_percent / 100.0 * f64::from(resized);
    let origin = (focus - f64::from(target) / 2.0).round();
    let max = f64::from(resized.saturating_sub(target));
    origin.clamp(0.0, max) as u32
}

impl CropPlan {
    /// `scale` multiplies the factor that makes the image just cover the
    /// target box; focus values are percentages of the resized image.
    pub fn compute(source_width: u32, source_height: u32, scale: f64, focus_x: f64, focus_y: f64) -> Self {
        let (sw, sh) = (f64::from(source_width.max(1)), f64::from(source_height.max(1)));
        let cover = (f64::from(TARGET_WIDTH) / sw).max(f64::from(TARGET_HEIGHT) / sh);
        let total = cover * scale;

        let resize_width = ((sw * total).round() as u32).max(1);
        let resize_height = ((sh * total).round() as u32).max(1);

        Self {
            resize_width,
            resize_height,
            origin_x: axis_origin(resize_width, TARGET_WIDTH, focus_x),
            origin_y: axis_origin(resize_height, TARGET_HEIGHT, focus_y),
            extract_width: resize_width.min(TARGET_WIDTH),
            extract_height: resize_height.min(TARGET_HEIGHT),
        }
    }
}

/// Applies a plan. Windows smaller than the target are centred on a white
/// canvas so the result is always `TARGET_WIDTH`×`TARGET_HEIGHT`.
pub fn render(source: &DynamicImage, plan: &CropPlan) -> RgbImage {
    let window = source
        .resize_exact(plan.resize_width, plan.resize_height, FilterType::Lanczos3)
        .crop_imm(plan.origin_x, plan.origin_y, plan.extract_width, plan.extract_height)
        .to_rgb8();

    if window.dimensions() == (TARGET_WIDTH, TARGET_HEIGHT) {
        return window;
    }

    let mut canvas = RgbImage::from_pixel(TARGET_WIDTH, TARGET_HEIGHT, Rgb([255, 255, 255]));
    let x = i64::from((TARGET_WIDTH - window.width()) / 2);
    let y = i64::from((TARGET_HEIGHT - window.height()) / 2);
    imageops::overlay(&mut canvas, &window, x, y);
    canvas
}

fn crop_blocking(source: &Path, dest: &Path, scale: f64, focus_x: f64, focus_y: f64) -> Result<CropPlan, SyncError> {
    let image = image::open(source)?;
    let plan = CropPlan::compute(image.width(), image.height(), scale, focus_x, focus_y);
    let output = render(&image, &plan);

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| clinic_fs::MirrorError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let format = ImageFormat::from_path(dest).unwrap_or(ImageFormat::Jpeg);
    let mut tmp = dest.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    output.save_with_format(&tmp, format)?;
    std::fs::rename(&tmp, dest).map_err(|e| clinic_fs::MirrorError::Io {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(plan)
}

/// Writes a `TARGET_WIDTH`×`TARGET_HEIGHT` crop of `source` to `dest`.
///
/// Decoding and resizing run on the blocking pool.
pub async fn crop_to_fixed_aspect(
    source: &Path,
    dest: &Path,
    scale: f64,
    focus_x: f64,
    focus_y: f64,
) -> Result<CropPlan, SyncError> {
    let (source, dest) = (source.to_path_buf(), dest.to_path_buf());
    let (plan, dest) = tokio::task::spawn_blocking(move || {
        crop_blocking(&source, &dest, scale, focus_x, focus_y).map(|plan| (plan, dest))
    })
    .await??;

    info!(
        dest = %dest.display(),
        width = plan.resize_width,
        height = plan.resize_height,
        x = plan.origin_x,
        y = plan.origin_y,
        "Regenerated cover crop"
    );
    Ok(plan)
}
