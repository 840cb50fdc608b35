//! Loads synced announcement documents.
//!
//! Each announcement is a markdown file with a YAML front matter block:
//!
//! ```text
//! ---
//! title: Closed for holidays
//! startDate: 2026-12-20
//! endDate: 2027-01-02
//! ---
//! We are closed between Christmas and New Year.
//! ```

use crate::{MirrorError, io_err};
use clinic_core::announcement::AnnouncementRecord;
use serde_yaml::Value;
use std::path::Path;
use tokio::fs;
use tracing::warn;

fn scalar(front: &Value, key: &str) -> Option<String> {
    match front.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn split_front_matter(source: &str) -> Option<(&str, &str)> {
    let rest = source
        .strip_prefix("---\r\n")
        .or_else(|| source.strip_prefix("---\n"))?;
    let end = rest.find("\n---")?;
    let front = &rest[..end];
    let body = rest[end + 4..].trim_start_matches(['\r', '\n']);
    Some((front, body))
}

/// Parses one announcement document. `fallback_title` is used when the front
/// matter has no title. Returns `None` when there is no front matter at all.
///
/// Missing dates are kept as empty strings so the classifier reports them as
/// unknown rather than the loader dropping them.
pub fn parse_announcement(source: &str, fallback_title: &str) -> Option<AnnouncementRecord> {
    let (front, body) = split_front_matter(source)?;
    let front: Value = match serde_yaml::from_str(front) {
        Ok(value) => value,
        Err(e) => {
            warn!("Unreadable front matter in {fallback_title}: {e}");
            Value::Null
        }
    };

    Some(AnnouncementRecord {
        title: scalar(&front, "title").unwrap_or_else(|| fallback_title.to_string()),
        start_date: scalar(&front, "startDate").unwrap_or_default(),
        end_date: scalar(&front, "endDate"),
        body: body.trim_end().to_string(),
    })
}

/// Reads every `.md` file in `dir`, in file name order.
pub async fn read_announcements(dir: &Path) -> Result<Vec<AnnouncementRecord>, MirrorError> {
    let local = crate::LocalDir::new(dir);
    let mut records = Vec::new();

    for name in local.names().await? {
        let Some(stem) = name.strip_suffix(".md") else {
            continue;
        };
        let path = local.path_of(&name)?;
        let source = fs::read_to_string(&path)
            .await
            .map_err(|e| io_err(&path, e))?;

        match parse_announcement(&source, stem) {
            Some(record) => records.push(record),
            None => warn!(file = %name, "Announcement has no front matter, skipping"),
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_front_matter_and_body() {
        let source = "---\ntitle: Holidays\nstartDate: 2026-12-20\nendDate: 2027-01-02\n---\nClosed.\n";
        let record = parse_announcement(source, "holidays").unwrap();

        assert_eq!(record.title, "Holidays");
        assert_eq!(record.start_date, "2026-12-20");
        assert_eq!(record.end_date.as_deref(), Some("2027-01-02"));
        assert_eq!(record.body, "Closed.");
    }

    #[test]
    fn missing_title_uses_file_stem() {
        let record = parse_announcement("---\nstartDate: 2026-01-01\n---\n", "new-hours").unwrap();
        assert_eq!(record.title, "new-hours");
        assert_eq!(record.end_date, None);
    }

    #[test]
    fn document_without_front_matter_is_rejected() {
        assert!(parse_announcement("# Just markdown", "plain").is_none());
    }

    #[tokio::test]
    async fn reads_markdown_files_only() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("b.md"),
            "---\ntitle: B\nstartDate: 2026-02-01\n---\nbody",
        )
        .unwrap();
        std::fs::write(tmp.path().join("a.md"), "---\ntitle: A\n---\n").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let records = read_announcements(tmp.path()).await.unwrap();
        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert_eq!(records[0].start_date, "");
    }
}
