use chrono::NaiveDateTime;
use serde::Serialize;

use crate::util;

/// Column order of every output file.
pub const OUTPUT_COLUMNS: [&str; 5] = ["review_text", "rating", "date", "app_id", "source"];

// ------------------------------------------------------------
// Review record
// ------------------------------------------------------------
//
// One review as handed back by a `ReviewSource`.
//
// Only the attributes the collector persists are kept. Every
// field is optional because the upstream feed omits them freely
// (deleted text, unrated entries, missing timestamps).
//
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewRecord {
    /// Free-text review body
    pub content: Option<String>,

    /// Star rating (1..=5 on Google Play)
    pub score: Option<i64>,

    /// Review time, already converted to local time
    pub at: Option<NaiveDateTime>,
}

// ------------------------------------------------------------
// Output row
// ------------------------------------------------------------
//
// Normalized CSV row. Field order here IS the column order on
// disk (`csv` derives the header from it), so it must stay in
// sync with `OUTPUT_COLUMNS`.
//
// `None` values serialize as empty cells.
//
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OutputRow<'a> {
    pub review_text: &'a str,
    pub rating: Option<i64>,
    pub date: Option<String>,
    pub app_id: &'a str,
    pub source: &'a str,
}

impl<'a> OutputRow<'a> {
    /// Builds a row for `app_id`. The app id always comes from the
    /// caller, never from the record.
    pub fn from_record(record: &'a ReviewRecord, app_id: &'a str, source: &'a str) -> Self {
        Self {
            review_text: record.content.as_deref().unwrap_or(""),
            rating: record.score,
            date: record.at.as_ref().map(util::format_review_date),
            app_id,
            source,
        }
    }
}

// ------------------------------------------------------------
// Fetch outcome
// ------------------------------------------------------------
//
// Result of `Collector::fetch_one` for one app id.
//
// `Skipped` and `Fetched(vec![])` are deliberately distinct:
// the first means today's file is already on disk, the second
// means the source really returned zero reviews.
//
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// App id is not part of the configured mapping
    NotApplicable,

    /// The review source reported an error (already logged)
    FetchFailed,

    /// Today's output file already exists, nothing was fetched
    Skipped,

    /// Reviews as returned by the source, in source order
    Fetched(Vec<ReviewRecord>),
}
