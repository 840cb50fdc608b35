//! Run configuration and the local site layout.
//!
//! Configuration is read through a lookup function rather than straight from
//! the process environment, so tests can supply their own variables.

use crate::error::SyncError;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const ENV_SERVICE_ACCOUNT_EMAIL: &str = "GOOGLE_SERVICE_ACCOUNT_EMAIL";
pub const ENV_PRIVATE_KEY: &str = "GOOGLE_PRIVATE_KEY";
pub const ENV_SHEET_ID: &str = "GOOGLE_SHEET_ID";
pub const ENV_STAFF_FOLDER_ID: &str = "GOOGLE_DRIVE_STAFF_FOLDER_ID";
pub const ENV_SERVICES_FOLDER_ID: &str = "GOOGLE_DRIVE_SERVICES_FOLDER_ID";
pub const ENV_MESSAGES_FOLDER_ID: &str = "GOOGLE_DRIVE_MESSAGES_FOLDER_ID";

const BOT_ACTORS: &[&str] = &["dependabot", "renovate"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRanges {
    pub staff: String,
    pub gallery: String,
    pub settings: String,
}

impl Default for SheetRanges {
    fn default() -> Self {
        Self {
            staff: "Staff!A2:H".to_string(),
            gallery: "Gallery!A2:I".to_string(),
            settings: "Settings!A2:B".to_string(),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub service_account_email: String,
    pub private_key: String,
    pub spreadsheet_id: String,
    pub staff_folder_id: String,
    pub services_folder_id: String,
    pub messages_folder_id: String,
    pub ranges: SheetRanges,
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("service_account_email", &self.service_account_email)
            .field("private_key", &"<redacted>")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("staff_folder_id", &self.staff_folder_id)
            .field("services_folder_id", &self.services_folder_id)
            .field("messages_folder_id", &self.messages_folder_id)
            .field("ranges", &self.ranges)
            .finish()
    }
}

impl SyncConfig {
    /// Builds the configuration, listing every missing variable at once.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SyncError> {
        let mut missing = Vec::new();
        let mut require = |name: &'static str| {
            let value = lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };

        let config = Self {
            service_account_email: require(ENV_SERVICE_ACCOUNT_EMAIL),
            private_key: require(ENV_PRIVATE_KEY),
            spreadsheet_id: require(ENV_SHEET_ID),
            staff_folder_id: require(ENV_STAFF_FOLDER_ID),
            services_folder_id: require(ENV_SERVICES_FOLDER_ID),
            messages_folder_id: require(ENV_MESSAGES_FOLDER_ID),
            ranges: SheetRanges::default(),
        };

        if missing.is_empty() {
            Ok(config)
        } else {
            Err(SyncError::MissingConfig(missing))
        }
    }
}

/// True when the build was started by an automated dependency-update bot,
/// which is not given access to the content secrets.
pub fn is_dependency_bot(lookup: &impl Fn(&str) -> Option<String>) -> bool {
    let actor = lookup("GITHUB_ACTOR").unwrap_or_default().to_lowercase();
    let head_ref = lookup("GITHUB_HEAD_REF").unwrap_or_default().to_lowercase();
    BOT_ACTORS
        .iter()
        .any(|bot| actor.contains(bot) || head_ref.starts_with(&format!("{bot}/")))
}

/// Outcome of validating the configuration before any network I/O.
#[derive(Debug)]
pub enum Preflight {
    Ready(SyncConfig),
    /// Secrets are missing in a dependency-bot build; the run succeeds
    /// without syncing.
    Skip { missing: Vec<&'static str> },
}

pub fn preflight(lookup: impl Fn(&str) -> Option<String>) -> Result<Preflight, SyncError> {
    match SyncConfig::from_lookup(&lookup) {
        Ok(config) => Ok(Preflight::Ready(config)),
        Err(SyncError::MissingConfig(missing)) if is_dependency_bot(&lookup) => {
            warn!(
                missing = %missing.join(", "),
                "Dependency bot build without content secrets, skipping sync"
            );
            Ok(Preflight::Skip { missing })
        }
        Err(e) => Err(e),
    }
}

/// Where each collection lands, relative to the site root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLayout {
    root: PathBuf,
}

impl SiteLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn staff_manifest(&self) -> PathBuf {
        self.root.join("src/data/staff.json")
    }

    pub fn gallery_manifest(&self) -> PathBuf {
        self.root.join("src/data/gallery.json")
    }

    pub fn staff_images(&self) -> PathBuf {
        self.root.join("public/images/staff")
    }

    pub fn gallery_images(&self) -> PathBuf {
        self.root.join("public/images/gallery")
    }

    /// Cached copy of the cover source image.
    pub fn cover_cache(&self) -> PathBuf {
        self.root.join("assets/cover")
    }

    /// The derived 1200×630 social preview image.
    pub fn cover_output(&self) -> PathBuf {
        self.root.join("public/og-image.jpg")
    }

    pub fn services_dir(&self) -> PathBuf {
        self.root.join("src/content/services")
    }

    pub fn messages_dir(&self) -> PathBuf {
        self.root.join("src/content/messages")
    }
}
