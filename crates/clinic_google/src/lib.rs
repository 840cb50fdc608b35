//! # Clinic Google store
//!
//! Implements [`RemoteStore`] on top of the Drive v3 and Sheets v4 REST APIs.
//!
//! ## Usage
//!
//! ```no_run
//! use clinic_google::{GoogleSession, GoogleStore, ServiceAccountCredentials};
//!
//! # async fn run() -> Result<(), clinic_core::prelude::StoreError> {
//! let creds = ServiceAccountCredentials::new("sync@clinic.iam.gserviceaccount.com", "-----BEGIN...");
//! let session = GoogleSession::initialize(&creds).await?;
//! let store = GoogleStore::new(session, "spreadsheet-id");
//! # Ok(())
//! # }
//! ```

mod session;

pub use session::{GoogleSession, SCOPES, ServiceAccountCredentials, TOKEN_URI};

use bytes::Bytes;
use clinic_core::prelude::*;
use reqwest::{Response, Url};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

pub const DRIVE_API: &str = "https://www.googleapis.com/drive/v3";
pub const SHEETS_API: &str = "https://sheets.googleapis.com/v4";

const PAGE_SIZE: &str = "1000";

#[derive(Clone)]
pub struct GoogleStore {
    session: Arc<GoogleSession>,
    spreadsheet_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    sha256_checksum: Option<String>,
    #[serde(default)]
    parents: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct Parents {
    #[serde(default)]
    parents: Vec<String>,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Turns a failed API answer into a [`StoreError`].
///
/// Neither API gives a stable machine-readable code for "this sheet tab does
/// not exist"; Sheets answers 400 with a message starting "Unable to parse
/// range". Matching on that text is best-effort and kept in this one place.
pub fn classify_api_error(status: u16, body: &str) -> StoreError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    if message.contains("Unable to parse range") {
        return StoreError::RangeNotFound(message);
    }

    match status {
        401 | 403 => StoreError::Auth(message),
        404 => StoreError::NotFound(message),
        _ => StoreError::Api { status, message },
    }
}

/// Quotes a value for a Drive `q` expression.
pub fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn drive_query(query: &FileQuery) -> String {
    let mut q = format!(
        "'{}' in parents and trashed = false",
        escape_query_value(&query.folder_id)
    );
    if let Some(name) = &query.name {
        q.push_str(&format!(" and name = '{}'", escape_query_value(name)));
    }
    q
}

fn cell_text(cell: serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn network_err(e: reqwest::Error) -> StoreError {
    StoreError::Generic(format!("Network error: {e}"))
}

async fn check(response: Response) -> Result<Response, StoreError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    Err(classify_api_error(status, &text))
}

impl GoogleStore {
    pub fn new(session: GoogleSession, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            session: Arc::new(session),
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    fn url(base: &str, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = Url::parse(base).map_err(|e| StoreError::Generic(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Generic(format!("{base} cannot be a base URL")))?
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url, query: &[(&str, &str)]) -> Result<Response, StoreError> {
        let builder = self.session.client.get(url).query(query);
        let response = self
            .session
            .authorize(builder)
            .send()
            .await
            .map_err(network_err)?;
        check(response).await
    }
}

impl RemoteStore for GoogleStore {
    #[instrument(skip(self), fields(folder = %query.folder_id))]
    async fn list_files(&self, query: &FileQuery) -> Result<Vec<RemoteFile>, StoreError> {
        let q = drive_query(query);
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("q", q.as_str()),
                ("fields", "nextPageToken, files(id, name, sha256Checksum, parents)"),
                ("pageSize", PAGE_SIZE),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.as_str()));
            }

            let page: FileList = self
                .get(Self::url(DRIVE_API, &["files"])?, &params)
                .await?
                .json()
                .await
                .map_err(|e| StoreError::Generic(format!("Failed to parse file list: {e}")))?;

            files.extend(page.files.into_iter().map(|f| RemoteFile {
                parent_folder_id: f
                    .parents
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| query.folder_id.clone()),
                id: f.id,
                name: f.name,
                content_hash: f.sha256_checksum,
            }));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = files.len(), "Listed remote files");
        Ok(files)
    }

    #[instrument(skip(self))]
    async fn get_file_bytes(&self, id: &str) -> Result<Bytes, StoreError> {
        let params = [("alt", "media"), ("supportsAllDrives", "true")];
        self.get(Self::url(DRIVE_API, &["files", id])?, &params)
            .await?
            .bytes()
            .await
            .map_err(network_err)
    }

    #[instrument(skip(self))]
    async fn list_rows(&self, range: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let url = Self::url(
            SHEETS_API,
            &["spreadsheets", &self.spreadsheet_id, "values", range],
        )?;
        let values: ValueRange = self
            .get(url, &[])
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Generic(format!("Failed to parse sheet values: {e}")))?;

        Ok(values
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    #[instrument(skip(self))]
    async fn parent_folder(&self, id: &str) -> Result<Option<String>, StoreError> {
        let params = [("fields", "parents"), ("supportsAllDrives", "true")];
        let parents: Parents = self
            .get(Self::url(DRIVE_API, &["files", id])?, &params)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Generic(format!("Failed to parse parents: {e}")))?;
        Ok(parents.parents.into_iter().next())
    }
}
