//! Typed parsers for the position-significant sheet rows.
//!
//! Sheets omits trailing empty cells, so every parser treats a short row as
//! "remaining columns empty" and substitutes the documented defaults.

use crate::manifest::*;
use std::collections::HashMap;

const AFFIRMATIVE: &[&str] = &["yes", "y", "true", "1", "x", "ja"];

/// A borrowed row with bounds-safe, trimmed cell access.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a>(&'a [String]);

impl<'a> Row<'a> {
    pub fn new(cells: &'a [String]) -> Self {
        Self(cells)
    }

    /// Cell text, or `""` past the end of a short row.
    pub fn text(&self, column: usize) -> &'a str {
        self.0.get(column).map(|c| c.trim()).unwrap_or("")
    }

    /// Cell text, or `None` when missing or blank.
    pub fn optional(&self, column: usize) -> Option<&'a str> {
        let cell = self.text(column);
        (!cell.is_empty()).then_some(cell)
    }

    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|c| c.trim().is_empty())
    }
}

pub fn is_affirmative(cell: &str) -> bool {
    let cell = cell.trim();
    AFFIRMATIVE.iter().any(|a| a.eq_ignore_ascii_case(cell))
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Scale is clamped into `[MIN_SCALE, MAX_SCALE]`; missing or unparsable
/// input yields `DEFAULT_SCALE`.
pub fn normalize_scale(raw: Option<&str>) -> f64 {
    raw.and_then(parse_number)
        .map(|v| v.clamp(MIN_SCALE, MAX_SCALE))
        .unwrap_or(DEFAULT_SCALE)
}

/// Positions outside `0..=100` are replaced by `DEFAULT_POSITION`, not clamped.
pub fn normalize_position(raw: Option<&str>) -> u8 {
    raw.and_then(parse_number)
        .filter(|v| (0.0..=100.0).contains(v))
        .map(|v| v.round() as u8)
        .unwrap_or(DEFAULT_POSITION)
}

pub fn parse_image_config(scale: Option<&str>, x: Option<&str>, y: Option<&str>) -> ImageConfig {
    ImageConfig {
        scale: normalize_scale(scale),
        position_x: normalize_position(x),
        position_y: normalize_position(y),
    }
}

pub fn slugify(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Maps a roster row to a record. Rows without a name yield `None`.
///
/// Columns: name, title, description, image, active, scale, x, y.
pub fn parse_staff_row(cells: &[String]) -> Option<StaffRecord> {
    let row = Row::new(cells);
    let name = row.optional(0)?;

    Some(StaffRecord {
        id: slugify(name),
        name: name.to_string(),
        title: row.text(1).to_string(),
        description: row.text(2).to_string(),
        image_file: row.text(3).to_string(),
        active: is_affirmative(row.text(4)),
        image_config: parse_image_config(row.optional(5), row.optional(6), row.optional(7)),
    })
}

/// Maps a gallery row to an item. `index` is the row's position in the sheet
/// and stands in for a missing or unparsable `order` cell.
///
/// Columns: title, image, alt, active, order, scale, x, y, type. Sheets
/// written before the `type` column existed have 8 columns.
pub fn parse_gallery_row(cells: &[String], index: usize) -> Option<GalleryItem> {
    let row = Row::new(cells);
    if row.is_blank() {
        return None;
    }
    let image_file = row.optional(1)?;

    let order = row
        .optional(4)
        .and_then(|o| o.parse::<i64>().ok())
        .unwrap_or(index as i64 + 1);

    let item_type = match row.optional(8) {
        Some(t) if t.eq_ignore_ascii_case("cover-image") => GalleryItemType::CoverImage,
        _ => GalleryItemType::Gallery,
    };

    Some(GalleryItem {
        title: row.text(0).to_string(),
        image_file: image_file.to_string(),
        alt_text: row.text(2).to_string(),
        active: is_affirmative(row.text(3)),
        order,
        image_config: parse_image_config(row.optional(5), row.optional(6), row.optional(7)),
        item_type,
    })
}

/// Reads a flat two-column `key | value` sheet. Later duplicates win.
pub fn parse_settings(rows: &[Vec<String>]) -> HashMap<String, String> {
    rows.iter()
        .map(|cells| Row::new(cells))
        .filter_map(|row| Some((row.optional(0)?.to_string(), row.text(1).to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn scale_is_clamped() {
        assert_eq!(normalize_scale(Some("0.1")), 0.5);
        assert_eq!(normalize_scale(Some("3.0")), 2.0);
        assert_eq!(normalize_scale(Some("1,25")), 1.25);
        assert_eq!(normalize_scale(Some("abc")), 1.0);
    }

    #[test]
    fn out_of_range_position_falls_back_to_center() {
        assert_eq!(normalize_position(Some("150")), 50);
        assert_eq!(normalize_position(Some("-10")), 50);
        assert_eq!(normalize_position(Some("0")), 0);
        assert_eq!(normalize_position(Some("100")), 100);
        assert_eq!(normalize_position(Some("33.6")), 34);
    }

    #[test]
    fn absent_adjustments_use_defaults() {
        assert_eq!(parse_image_config(None, None, None), ImageConfig::default());

        let record = parse_staff_row(&row(&["Anna Berg", "Dentist", "Bio", "anna.jpg", "yes"]))
            .unwrap();
        assert_eq!(record.image_config.scale, 1.0);
        assert_eq!(record.image_config.position_x, 50);
        assert_eq!(record.image_config.position_y, 50);
    }

    #[test]
    fn staff_row_maps_columns() {
        let record = parse_staff_row(&row(&[
            " Dr. Jan de Vries ",
            "Orthodontist",
            "Braces",
            "jan.png",
            "YES",
            "1.5",
            "20",
            "80",
        ]))
        .unwrap();

        assert_eq!(record.id, "dr-jan-de-vries");
        assert_eq!(record.name, "Dr. Jan de Vries");
        assert!(record.active);
        assert_eq!(record.image_config.scale, 1.5);
        assert_eq!(record.image_config.position_x, 20);
        assert_eq!(record.image_config.position_y, 80);
    }

    #[test]
    fn staff_row_without_name_is_skipped() {
        assert!(parse_staff_row(&row(&["", "Title"])).is_none());
        assert!(parse_staff_row(&[]).is_none());
    }

    #[test]
    fn affirmative_is_case_insensitive() {
        assert!(is_affirmative("Yes"));
        assert!(is_affirmative(" TRUE "));
        assert!(!is_affirmative("no"));
        assert!(!is_affirmative(""));
    }

    #[test]
    fn gallery_row_without_type_is_ordinary() {
        let item = parse_gallery_row(
            &row(&["Lobby", "lobby.jpg", "Our lobby", "yes", "3", "", "", ""]),
            0,
        )
        .unwrap();
        assert_eq!(item.item_type, GalleryItemType::Gallery);
        assert_eq!(item.order, 3);
    }

    #[test]
    fn gallery_row_reads_cover_type_and_order_fallback() {
        let item = parse_gallery_row(
            &row(&["Hero", "hero.jpg", "", "yes", "", "", "", "", "Cover-Image"]),
            4,
        )
        .unwrap();
        assert_eq!(item.item_type, GalleryItemType::CoverImage);
        assert_eq!(item.order, 5);
    }

    #[test]
    fn settings_rows_become_a_map() {
        let settings = parse_settings(&[
            row(&["cover_image", "hero.jpg"]),
            row(&["", "ignored"]),
            row(&["cover_image_scale"]),
        ]);
        assert_eq!(settings.get("cover_image").map(String::as_str), Some("hero.jpg"));
        assert_eq!(settings.get("cover_image_scale").map(String::as_str), Some(""));
        assert_eq!(settings.len(), 2);
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Anna  Berg-Smith"), "anna-berg-smith");
        assert_eq!(slugify("Dr. Müller"), "dr-müller");
    }
}
