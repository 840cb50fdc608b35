//! Announcement status classification and display ordering.
//!
//! All comparisons happen on UTC calendar days so that a build machine and a
//! render host in different time zones agree on what is live.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// End date assumed when an announcement has none.
pub const FAR_FUTURE: NaiveDate = match NaiveDate::from_ymd_opt(9999, 12, 31) {
    Some(date) => date,
    None => panic!("invalid far-future sentinel"),
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementRecord {
    pub title: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Planned,
    Expired,
    Unknown,
}

impl Status {
    pub fn rank(self) -> u8 {
        match self {
            Status::Active => 0,
            Status::Planned => 1,
            Status::Expired => 2,
            Status::Unknown => 3,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Active => "active",
            Status::Planned => "planned",
            Status::Expired => "expired",
            Status::Unknown => "unknown",
        };
        f.pad(s)
    }
}

/// Parses `YYYY-MM-DD` or an RFC 3339 timestamp into a UTC calendar day.
/// A timestamp without an offset is taken as UTC.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

/// Truncates an instant to its UTC calendar day.
pub fn utc_day(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

impl AnnouncementRecord {
    /// `(start, end)` as days, or `None` when either bound does not parse.
    /// A missing or blank end date means [`FAR_FUTURE`].
    pub fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = parse_day(&self.start_date)?;
        let end = match self.end_date.as_deref().map(str::trim) {
            None | Some("") => FAR_FUTURE,
            Some(raw) => parse_day(raw)?,
        };
        Some((start, end))
    }
}

pub fn classify(record: &AnnouncementRecord, today: NaiveDate) -> Status {
    match record.range() {
        None => Status::Unknown,
        Some((start, _)) if today < start => Status::Planned,
        Some((_, end)) if today > end => Status::Expired,
        Some(_) => Status::Active,
    }
}

fn compare(a: &AnnouncementRecord, b: &AnnouncementRecord, today: NaiveDate) -> Ordering {
    let (status_a, status_b) = (classify(a, today), classify(b, today));
    if status_a != status_b {
        return status_a.rank().cmp(&status_b.rank());
    }

    match (status_a, a.range(), b.range()) {
        (Status::Active, Some((_, end_a)), Some((_, end_b))) => end_a.cmp(&end_b),
        (Status::Planned, Some((start_a, _)), Some((start_b, _))) => start_a.cmp(&start_b),
        (Status::Expired, Some((_, end_a)), Some((_, end_b))) => end_b.cmp(&end_a),
        _ => Ordering::Equal,
    }
}

/// Returns the records in display priority order: active (ending soonest
/// first), planned (starting soonest first), expired (most recent first),
/// then unknown in their original order.
pub fn sort(records: &[AnnouncementRecord], today: NaiveDate) -> Vec<AnnouncementRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| compare(a, b, today));
    sorted
}

/// Picks the announcement to show right now.
///
/// Among active records the one that started most recently wins; records with
/// the same start keep their collection order.
pub fn select_live(records: &[AnnouncementRecord], now: DateTime<Utc>) -> Option<&AnnouncementRecord> {
    let today = utc_day(now);
    records
        .iter()
        .filter(|r| classify(r, today) == Status::Active)
        .fold(None, |best: Option<&AnnouncementRecord>, candidate| match best {
            Some(current) if start_of(candidate) <= start_of(current) => Some(current),
            _ => Some(candidate),
        })
}

fn start_of(record: &AnnouncementRecord) -> Option<NaiveDate> {
    record.range().map(|(start, _)| start)
}
