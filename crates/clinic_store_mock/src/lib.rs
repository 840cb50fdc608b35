use bytes::Bytes;
use clinic_core::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct StoredFile {
    meta: RemoteFile,
    data: Bytes,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: usize,
    files: Vec<StoredFile>,
    sheets: HashMap<String, Vec<Vec<String>>>,
    broken_ranges: HashSet<String>,
    parents: HashMap<String, String>,
    failing_downloads: HashSet<String>,
    downloads: Vec<String>,
}

/// Remote store kept entirely in memory. Clones share state, so a test can
/// keep a handle and inspect what a sync run downloaded.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Creates or replaces `name` in `folder_id`, with a content hash. Returns
    /// the file id, which stays stable across replacements.
    pub fn put_file(&self, folder_id: &str, name: &str, data: impl Into<Bytes>) -> String {
        let data = data.into();
        let hash = clinic_fs::hash_bytes(&data);
        self.upsert(folder_id, name, data, Some(hash))
    }

    /// Like [`MemoryStore::put_file`], but the store reports no hash.
    pub fn put_file_without_hash(&self, folder_id: &str, name: &str, data: impl Into<Bytes>) -> String {
        self.upsert(folder_id, name, data.into(), None)
    }

    /// Overrides the reported hash without touching the content.
    pub fn set_hash(&self, id: &str, hash: Option<&str>) {
        let mut inner = self.lock();
        if let Some(file) = inner.files.iter_mut().find(|f| f.meta.id == id) {
            file.meta.content_hash = hash.map(str::to_string);
        }
    }

    fn upsert(&self, folder_id: &str, name: &str, data: Bytes, hash: Option<String>) -> String {
        let mut inner = self.lock();
        if let Some(file) = inner
            .files
            .iter_mut()
            .find(|f| f.meta.parent_folder_id == folder_id && f.meta.name == name)
        {
            file.meta.content_hash = hash;
            file.data = data;
            return file.meta.id.clone();
        }

        inner.next_id += 1;
        let id = format!("file-{}", inner.next_id);
        inner.parents.insert(id.clone(), folder_id.to_string());
        inner.files.push(StoredFile {
            meta: RemoteFile {
                id: id.clone(),
                name: name.to_string(),
                content_hash: hash,
                parent_folder_id: folder_id.to_string(),
            },
            data,
        });
        id
    }

    pub fn remove_file(&self, folder_id: &str, name: &str) {
        self.lock()
            .files
            .retain(|f| !(f.meta.parent_folder_id == folder_id && f.meta.name == name));
    }

    /// Registers a spreadsheet (or any non-file resource) inside a folder.
    pub fn set_parent(&self, id: &str, folder_id: &str) {
        self.lock().parents.insert(id.to_string(), folder_id.to_string());
    }

    pub fn set_rows(&self, range: &str, rows: Vec<Vec<&str>>) {
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(str::to_string).collect())
            .collect();
        self.lock().sheets.insert(range.to_string(), rows);
    }

    /// Makes reads of `range` fail with a server error.
    pub fn break_range(&self, range: &str) {
        self.lock().broken_ranges.insert(range.to_string());
    }

    pub fn fail_download(&self, id: &str) {
        self.lock().failing_downloads.insert(id.to_string());
    }

    /// Names of every file downloaded so far, in request order.
    pub fn downloads(&self) -> Vec<String> {
        self.lock().downloads.clone()
    }

    pub fn clear_downloads(&self) {
        self.lock().downloads.clear();
    }
}

impl RemoteStore for MemoryStore {
    async fn list_files(&self, query: &FileQuery) -> Result<Vec<RemoteFile>, StoreError> {
        Ok(self
            .lock()
            .files
            .iter()
            .filter(|f| f.meta.parent_folder_id == query.folder_id)
            .filter(|f| query.name.as_ref().is_none_or(|n| &f.meta.name == n))
            .map(|f| f.meta.clone())
            .collect())
    }

    async fn get_file_bytes(&self, id: &str) -> Result<Bytes, StoreError> {
        let mut inner = self.lock();
        if inner.failing_downloads.contains(id) {
            return Err(StoreError::Api {
                status: 500,
                message: format!("download of {id} failed"),
            });
        }
        let file = inner
            .files
            .iter()
            .find(|f| f.meta.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        inner.downloads.push(file.meta.name);
        Ok(file.data)
    }

    async fn list_rows(&self, range: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let inner = self.lock();
        if inner.broken_ranges.contains(range) {
            return Err(StoreError::Api {
                status: 500,
                message: "backend error".to_string(),
            });
        }
        inner
            .sheets
            .get(range)
            .cloned()
            .ok_or_else(|| StoreError::RangeNotFound(range.to_string()))
    }

    async fn parent_folder(&self, id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().parents.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replacing_a_file_keeps_its_id() {
        let store = MemoryStore::new();
        let first = store.put_file("f", "a.md", "v1");
        let second = store.put_file("f", "a.md", "v2");
        assert_eq!(first, second);

        let bytes = store.get_file_bytes(&first).await.unwrap();
        assert_eq!(&bytes[..], b"v2");
        assert_eq!(store.downloads(), vec!["a.md"]);
    }

    #[tokio::test]
    async fn missing_range_is_range_not_found() {
        let store = MemoryStore::new();
        let err = store.list_rows("Gallery!A2:I").await.unwrap_err();
        assert!(err.is_range_not_found());
    }
}
