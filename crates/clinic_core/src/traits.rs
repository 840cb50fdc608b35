use crate::error::*;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One object in the remote store, as seen by a single sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,

    /// Hex SHA-256 of the content, when the store reports one.
    pub content_hash: Option<String>,

    pub parent_folder_id: String,
}

/// Selects files directly inside one remote folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileQuery {
    pub folder_id: String,

    /// Exact file name to match. `None` lists the whole folder.
    pub name: Option<String>,
}

impl FileQuery {
    pub fn folder(folder_id: impl Into<String>) -> Self {
        Self {
            folder_id: folder_id.into(),
            name: None,
        }
    }

    pub fn named(folder_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            folder_id: folder_id.into(),
            name: Some(name.into()),
        }
    }
}

/// The remote document/file/row-data provider a sync run mirrors from.
pub trait RemoteStore: Send + Sync + 'static + Clone {
    fn list_files(
        &self,
        query: &FileQuery,
    ) -> impl Future<Output = Result<Vec<RemoteFile>, StoreError>> + Send;

    fn get_file_bytes(&self, id: &str) -> impl Future<Output = Result<Bytes, StoreError>> + Send;

    /// Reads a tabular range such as `Staff!A2:H`. Rows may be shorter than
    /// the range when trailing cells are empty.
    fn list_rows(
        &self,
        range: &str,
    ) -> impl Future<Output = Result<Vec<Vec<String>>, StoreError>> + Send;

    /// Returns the folder containing `id`, if the store knows one.
    fn parent_folder(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Resolves a single file by name. The first match wins when a folder
    /// holds duplicates.
    fn find_file(
        &self,
        folder_id: &str,
        name: &str,
    ) -> impl Future<Output = Result<Option<RemoteFile>, StoreError>> + Send {
        let query = FileQuery::named(folder_id, name);
        async move { Ok(self.list_files(&query).await?.into_iter().next()) }
    }
}
