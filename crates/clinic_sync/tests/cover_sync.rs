mod common;

use clinic_fs::LocalDir;
use clinic_store_mock::MemoryStore;
use clinic_sync::crop::{TARGET_HEIGHT, TARGET_WIDTH};
use clinic_sync::gallery::read_gallery;
use clinic_sync::sync_cover_image;
use common::*;

const SETTINGS: &str = "Settings!A2:B";

#[tokio::test]
async fn gallery_cover_is_downloaded_and_cropped() {
    let store = seeded_store();
    let (_tmp, layout) = site();
    let sheet = read_gallery(&store, "Gallery!A2:I").await.unwrap();
    let cache = LocalDir::new(layout.cover_cache());

    let report = sync_cover_image(&store, CONTENT_FOLDER, sheet.as_ref(), SETTINGS, &cache, &layout.cover_output())
        .await
        .expect("cover sync");

    assert_eq!(report.file.as_deref(), Some("hero.png"));
    assert!(report.downloaded);
    assert!(report.regenerated);
    let output = image::open(layout.cover_output()).expect("crop written");
    assert_eq!((output.width(), output.height()), (TARGET_WIDTH, TARGET_HEIGHT));
}

#[tokio::test]
async fn crop_is_regenerated_even_when_source_is_unchanged() {
    let store = seeded_store();
    let (_tmp, layout) = site();
    let sheet = read_gallery(&store, "Gallery!A2:I").await.unwrap();
    let cache = LocalDir::new(layout.cover_cache());
    sync_cover_image(&store, CONTENT_FOLDER, sheet.as_ref(), SETTINGS, &cache, &layout.cover_output())
        .await
        .unwrap();
    std::fs::remove_file(layout.cover_output()).unwrap();
    store.clear_downloads();

    let report = sync_cover_image(&store, CONTENT_FOLDER, sheet.as_ref(), SETTINGS, &cache, &layout.cover_output())
        .await
        .unwrap();

    assert!(!report.downloaded);
    assert!(report.regenerated);
    assert!(store.downloads().is_empty());
    assert!(layout.cover_output().exists());
}

#[tokio::test]
async fn settings_sheet_is_the_fallback() {
    let store = MemoryStore::new();
    store.set_rows(
        SETTINGS,
        vec![
            vec!["cover_image", "front.png"],
            vec!["cover_image_scale", "2"],
            vec!["cover_image_position_x", "0"],
        ],
    );
    store.put_file(CONTENT_FOLDER, "front.png", png(800, 800));
    let (_tmp, layout) = site();
    let cache = LocalDir::new(layout.cover_cache());
    std::fs::create_dir_all(layout.cover_cache()).unwrap();
    std::fs::write(layout.cover_cache().join("previous.png"), "old").unwrap();

    let report = sync_cover_image(&store, CONTENT_FOLDER, None, SETTINGS, &cache, &layout.cover_output())
        .await
        .unwrap();

    assert_eq!(report.file.as_deref(), Some("front.png"));
    assert!(report.regenerated);
    assert!(!layout.cover_cache().join("previous.png").exists());
}

#[tokio::test]
async fn no_cover_anywhere_is_a_no_op() {
    let store = MemoryStore::new();
    let (_tmp, layout) = site();
    let cache = LocalDir::new(layout.cover_cache());

    let report = sync_cover_image(&store, CONTENT_FOLDER, None, SETTINGS, &cache, &layout.cover_output())
        .await
        .expect("missing cover is not an error");

    assert_eq!(report.file, None);
    assert!(!report.regenerated);
    assert!(!layout.cover_output().exists());
}

#[tokio::test]
async fn missing_remote_cover_skips_crop() {
    let store = MemoryStore::new();
    store.set_rows(SETTINGS, vec![vec!["cover_image", "gone.jpg"]]);
    let (_tmp, layout) = site();
    let cache = LocalDir::new(layout.cover_cache());

    let report = sync_cover_image(&store, CONTENT_FOLDER, None, SETTINGS, &cache, &layout.cover_output())
        .await
        .unwrap();

    assert_eq!(report.file.as_deref(), Some("gone.jpg"));
    assert!(!report.regenerated);
}

#[tokio::test]
async fn gallery_without_cover_row_falls_back_to_settings() {
    let store = MemoryStore::new();
    store.set_rows("Gallery!A2:I", vec![vec!["Lobby", "lobby.jpg", "", "yes", "1"]]);
    store.set_rows(SETTINGS, vec![vec!["cover_image", "front.png"]]);
    store.put_file(CONTENT_FOLDER, "front.png", png(1200, 900));
    let (_tmp, layout) = site();
    let cache = LocalDir::new(layout.cover_cache());

    let sheet = read_gallery(&store, "Gallery!A2:I").await.unwrap();
    assert!(sheet.as_ref().is_some_and(|s| s.cover.is_none()));

    let report = sync_cover_image(&store, CONTENT_FOLDER, sheet.as_ref(), SETTINGS, &cache, &layout.cover_output())
        .await
        .unwrap();

    assert_eq!(report.file.as_deref(), Some("front.png"));
    assert!(report.downloaded);
    assert!(report.regenerated);
    assert!(layout.cover_cache().join("front.png").exists());
}
