mod common;

use clinic_core::prelude::SyncTarget;
use clinic_store_mock::MemoryStore;
use clinic_sync::sync_document_collection;
use common::*;

fn services(layout: &clinic_sync::SiteLayout) -> SyncTarget {
    SyncTarget::documents("services", SERVICES_FOLDER, layout.services_dir())
}

#[tokio::test]
async fn mirrors_documents_and_removes_stale_ones() {
    let store = seeded_store();
    let (_tmp, layout) = site();
    let dir = layout.services_dir();
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("discontinued.md"), "# Gone").unwrap();
    std::fs::write(dir.join("_meta.json"), "{}").unwrap();

    let report = sync_document_collection(&store, &services(&layout)).await.unwrap();

    assert_eq!(report.deleted, vec!["discontinued.md"]);
    let mut downloaded = report.downloaded.clone();
    downloaded.sort();
    assert_eq!(downloaded, vec!["implants.md", "whitening.md"]);
    assert_eq!(std::fs::read_to_string(dir.join("implants.md")).unwrap(), "# Implants");
    assert!(dir.join("_meta.json").exists());
}

#[tokio::test]
async fn unchanged_documents_are_skipped() {
    let store = seeded_store();
    let (_tmp, layout) = site();
    sync_document_collection(&store, &services(&layout)).await.unwrap();
    store.clear_downloads();

    let report = sync_document_collection(&store, &services(&layout)).await.unwrap();

    assert!(report.downloaded.is_empty());
    assert_eq!(report.unchanged.len(), 2);
    assert!(store.downloads().is_empty());
}

#[tokio::test]
async fn documents_without_hash_are_always_fetched() {
    let store = MemoryStore::new();
    store.put_file_without_hash(SERVICES_FOLDER, "braces.md", "# Braces");
    let (_tmp, layout) = site();
    sync_document_collection(&store, &services(&layout)).await.unwrap();

    let report = sync_document_collection(&store, &services(&layout)).await.unwrap();
    assert_eq!(report.downloaded, vec!["braces.md"]);
}

#[tokio::test]
async fn empty_folder_clears_local_documents() {
    let store = MemoryStore::new();
    let (_tmp, layout) = site();
    let dir = layout.services_dir();
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("old.md"), "x").unwrap();

    let report = sync_document_collection(&store, &services(&layout))
        .await
        .expect("empty collection is valid");

    assert_eq!(report.records, 0);
    assert_eq!(report.deleted, vec!["old.md"]);
}

#[tokio::test]
async fn failed_document_download_is_fatal() {
    let store = seeded_store();
    let id = store.put_file(SERVICES_FOLDER, "implants.md", "# Implants");
    store.fail_download(&id);
    let (_tmp, layout) = site();

    assert!(sync_document_collection(&store, &services(&layout)).await.is_err());
}

#[tokio::test]
async fn interrupted_write_leftovers_are_cleared() {
    let store = seeded_store();
    let (_tmp, layout) = site();
    let dir = layout.services_dir();
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("implants.md.tmp"), "# Impl").unwrap();
    std::fs::write(dir.join("_meta.json"), "{}").unwrap();

    let report = sync_document_collection(&store, &services(&layout)).await.unwrap();

    assert_eq!(report.deleted, vec!["implants.md.tmp"]);
    assert!(!dir.join("implants.md.tmp").exists());
    assert!(dir.join("_meta.json").exists());
    assert!(dir.join("implants.md").exists());
}
