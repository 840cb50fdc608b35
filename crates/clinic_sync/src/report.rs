use std::fmt;

/// What one collection sync changed on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionReport {
    pub name: String,
    /// Records written to the manifest, or documents mirrored.
    pub records: usize,
    pub downloaded: Vec<String>,
    pub unchanged: Vec<String>,
    pub deleted: Vec<String>,
    /// Optional items that could not be fetched and were skipped.
    pub failed: Vec<String>,
}

impl CollectionReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl fmt::Display for CollectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} records, {} downloaded, {} unchanged, {} deleted",
            self.name,
            self.records,
            self.downloaded.len(),
            self.unchanged.len(),
            self.deleted.len()
        )?;
        if !self.failed.is_empty() {
            write!(f, ", {} failed ({})", self.failed.len(), self.failed.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverReport {
    /// Resolved cover file name, if any source named one.
    pub file: Option<String>,
    pub downloaded: bool,
    pub regenerated: bool,
}

impl fmt::Display for CoverReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            None => write!(f, "cover: none configured"),
            Some(file) => write!(
                f,
                "cover: {file} ({}, {})",
                if self.downloaded { "downloaded" } else { "unchanged" },
                if self.regenerated { "crop regenerated" } else { "crop not regenerated" }
            ),
        }
    }
}

/// Everything one `run_sync` invocation did, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub collections: Vec<CollectionReport>,
    pub cover: CoverReport,
}

impl SyncReport {
    pub fn total_downloads(&self) -> usize {
        self.collections.iter().map(|c| c.downloaded.len()).sum::<usize>()
            + usize::from(self.cover.downloaded)
    }

    pub fn total_deletions(&self) -> usize {
        self.collections.iter().map(|c| c.deleted.len()).sum()
    }
}
