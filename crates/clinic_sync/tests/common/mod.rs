#![allow(dead_code)]

use clinic_store_mock::MemoryStore;
use clinic_sync::{SheetRanges, SiteLayout, SyncConfig};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

pub const SHEET_ID: &str = "sheet-1";
pub const STAFF_FOLDER: &str = "staff-folder";
pub const CONTENT_FOLDER: &str = "content-folder";
pub const SERVICES_FOLDER: &str = "services-folder";
pub const MESSAGES_FOLDER: &str = "messages-folder";

pub fn config() -> SyncConfig {
    SyncConfig {
        service_account_email: "sync@clinic.iam.gserviceaccount.com".to_string(),
        private_key: "unused".to_string(),
        spreadsheet_id: SHEET_ID.to_string(),
        staff_folder_id: STAFF_FOLDER.to_string(),
        services_folder_id: SERVICES_FOLDER.to_string(),
        messages_folder_id: MESSAGES_FOLDER.to_string(),
        ranges: SheetRanges::default(),
    }
}

pub fn site() -> (TempDir, SiteLayout) {
    let tmp = TempDir::new().expect("temp site root");
    let layout = SiteLayout::new(tmp.path());
    (tmp, layout)
}

/// PNG bytes of a solid image.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 80, 40])));
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

/// A store with a small but complete clinic: two active staff members, a
/// gallery with a cover row, services and messages.
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.set_parent(SHEET_ID, CONTENT_FOLDER);

    store.set_rows(
        "Staff!A2:H",
        vec![
            vec!["Anna Berg", "Dentist", "Gentle care", "anna.jpg", "yes", "0.1", "150", "20"],
            vec!["Jan de Vries", "Hygienist", "Cleanings", "jan.jpg", "Yes"],
            vec!["Former Colleague", "Assistant", "", "former.jpg", "no"],
        ],
    );
    store.put_file(STAFF_FOLDER, "anna.jpg", "anna-v1");
    store.put_file(STAFF_FOLDER, "jan.jpg", "jan-v1");
    store.put_file(STAFF_FOLDER, "former.jpg", "former-v1");

    store.set_rows(
        "Gallery!A2:I",
        vec![
            vec!["Treatment room", "room.jpg", "Treatment room", "yes", "2"],
            vec!["Hero", "hero.png", "", "yes", "0", "1", "50", "50", "cover-image"],
            vec!["Waiting area", "lobby.jpg", "Waiting area", "yes", "1"],
        ],
    );
    store.put_file(CONTENT_FOLDER, "room.jpg", "room-v1");
    store.put_file(CONTENT_FOLDER, "lobby.jpg", "lobby-v1");
    store.put_file(CONTENT_FOLDER, "hero.png", png(2000, 1000));

    store.put_file(SERVICES_FOLDER, "implants.md", "# Implants");
    store.put_file(SERVICES_FOLDER, "whitening.md", "# Whitening");
    store.put_file(
        MESSAGES_FOLDER,
        "holidays.md",
        "---\ntitle: Holidays\nstartDate: 2026-12-20\nendDate: 2027-01-02\n---\nClosed.",
    );

    store
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path).expect("manifest exists");
    serde_json::from_str(&text).expect("valid json")
}
