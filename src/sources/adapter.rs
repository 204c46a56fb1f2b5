use serde::Deserialize;

use crate::error::FetchError;
use crate::schema::ReviewRecord;

/// Review ordering requested from the store.
///
/// The numeric codes are the ones the Play Store RPC expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    MostRelevant,
    #[default]
    Newest,
    Rating,
}

impl SortOrder {
    pub fn code(self) -> u8 {
        match self {
            SortOrder::MostRelevant => 1,
            SortOrder::Newest => 2,
            SortOrder::Rating => 3,
        }
    }
}

/// Parameters for one `fetch_reviews` call.
///
/// Defaults: `en`, `us`, newest first, no score filter, 100 ms
/// between page requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchParams {
    pub lang: String,
    pub country: String,
    pub sort: SortOrder,
    pub filter_score: Option<u8>,
    pub sleep_ms: u64,
}

impl Default for FetchParams {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            country: "us".to_string(),
            sort: SortOrder::Newest,
            filter_score: None,
            sleep_ms: 100,
        }
    }
}

/// ReviewSource is the seam between:
/// - The collector (fetch/skip/persist decisions)
/// - A store-specific review feed
///
/// Each implementation must:
/// - Fetch *all* reviews for one app id in one call
/// - Normalize them into `ReviewRecord`
/// - Report failures as `FetchError`, never panic
///
/// THREAD SAFETY:
/// - Must be Send + Sync (held as `Arc<dyn ReviewSource>`)
///
#[async_trait::async_trait]
pub trait ReviewSource: Send + Sync {
    /// Registry key, must match `source.name` in configuration.
    fn name(&self) -> &'static str;

    /// Value written to the `source` column.
    fn label(&self) -> &'static str;

    /// Fetches every review for `app_id`.
    ///
    /// CONTRACT:
    /// - Called at most once per app per run
    /// - Returns records in the order the store delivered them
    /// - `Ok(vec![])` means the store has no reviews, not an error
    /// - Throttling between page requests uses `params.sleep_ms`
    ///
    async fn fetch_reviews(
        &self,
        app_id: &str,
        params: &FetchParams,
    ) -> Result<Vec<ReviewRecord>, FetchError>;
}
