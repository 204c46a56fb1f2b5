/// Naming and date helpers shared by the collector and the sources.
///
/// IMPORTANT:
/// - Everything here must stay pure and deterministic.
/// - File names produced here are the dedupe key for a run day,
///   so changing the format invalidates "already fetched today".
///
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// Format used for the `date` column.
pub const REVIEW_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used for the run-date stamp in file names.
pub const RUN_DATE_FORMAT: &str = "%Y%m%d";

/// Turns a display name into a file-name stem.
///
/// Examples:
/// - "Bank of Abyssinia" -> "Bank_of_Abyssinia"
/// - "Dashen_Bank"       -> "Dashen_Bank"
pub fn file_stem(display_name: &str) -> String {
    display_name.replace(' ', "_")
}

/// `{stem}_raw_{YYYYMMDD}.csv`
pub fn raw_file_name(display_name: &str, run_date: NaiveDate) -> String {
    format!(
        "{}_raw_{}.csv",
        file_stem(display_name),
        run_date.format(RUN_DATE_FORMAT)
    )
}

pub fn format_review_date(at: &NaiveDateTime) -> String {
    at.format(REVIEW_DATE_FORMAT).to_string()
}

/// Today's calendar date in the process's local time zone.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Converts a Unix timestamp (seconds) into local wall-clock time.
///
/// Returns `None` for values chrono cannot represent.
pub fn local_from_unix(secs: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.with_timezone(&Local).naive_local())
}
