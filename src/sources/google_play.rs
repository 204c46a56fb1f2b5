use std::time::Duration;

use log::debug;
use serde_json::{Value, json};
use tokio::time::sleep;

use crate::{config::SourceConfig, error::FetchError, schema::ReviewRecord, util};

use super::adapter::{FetchParams, ReviewSource};

pub const DEFAULT_BASE_URL: &str = "https://play.google.com";
pub const BATCH_EXECUTE_PATH: &str = "/_/PlayStoreUi/data/batchexecute";

/// Largest page the review RPC serves.
pub const PAGE_SIZE: u32 = 199;

const RPC_ID: &str = "UsvDTd";
const XSSI_GUARD: &str = ")]}'";

/// Google Play review adapter
///
/// Talks to the Play Store web client's `batchexecute` endpoint
/// (RPC `UsvDTd`), which serves reviews in pages linked by a
/// continuation token.
///
/// DESIGN PRINCIPLES:
/// - No file system access
/// - No knowledge of the app -> name mapping
/// - Pure request building, paging and response translation
///
/// Response layout (after the `)]}'` guard line):
/// - `[0][2]` is a JSON document encoded as a string
/// - inside it, `[0]` holds the review entries and `[-2][-1]`
///   the continuation token
/// - review entry: `[2]` score, `[4]` text, `[5][0]` unix seconds
pub struct GooglePlayAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl GooglePlayAdapter {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn from_config(cfg: &SourceConfig) -> Result<Self, FetchError> {
        let base_url = cfg.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Self::new(base_url, Duration::from_secs(cfg.timeout_secs))
    }

    async fn fetch_page(
        &self,
        app_id: &str,
        params: &FetchParams,
        token: Option<&str>,
    ) -> Result<ReviewPage, FetchError> {
        let url = format!("{}{}", self.base_url, BATCH_EXECUTE_PATH);
        let payload = build_request_payload(app_id, params, PAGE_SIZE, token);

        let response = self
            .client
            .post(&url)
            .query(&[("hl", params.lang.as_str()), ("gl", params.country.as_str())])
            .form(&[("f.req", payload)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        parse_page(&body)
    }
}

#[async_trait::async_trait]
impl ReviewSource for GooglePlayAdapter {
    fn name(&self) -> &'static str {
        "google_play"
    }

    fn label(&self) -> &'static str {
        "Google Play"
    }

    async fn fetch_reviews(
        &self,
        app_id: &str,
        params: &FetchParams,
    ) -> Result<Vec<ReviewRecord>, FetchError> {
        let mut reviews = Vec::new();
        let mut token: Option<String> = None;
        let mut page_no = 0usize;

        loop {
            page_no += 1;
            let page = self.fetch_page(app_id, params, token.as_deref()).await?;
            debug!(
                "{} page {}: {} reviews, more={}",
                app_id,
                page_no,
                page.reviews.len(),
                page.next_token.is_some()
            );

            // An empty page with a token would loop forever
            if page.reviews.is_empty() {
                break;
            }
            reviews.extend(page.reviews);

            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }

            if params.sleep_ms > 0 {
                sleep(Duration::from_millis(params.sleep_ms)).await;
            }
        }

        Ok(reviews)
    }
}

/// One decoded response page.
#[derive(Debug, Default)]
pub struct ReviewPage {
    pub reviews: Vec<ReviewRecord>,
    pub next_token: Option<String>,
}

/// Builds the `f.req` form value for one page request.
///
/// `count` is the page size, `token` the continuation token of the
/// previous page (none for the first page).
pub fn build_request_payload(
    app_id: &str,
    params: &FetchParams,
    count: u32,
    token: Option<&str>,
) -> String {
    let filter = match params.filter_score {
        Some(score) => json!([null, score]),
        None => json!([]),
    };

    let inner = json!([
        null,
        null,
        [2, params.sort.code(), [count, null, token], null, filter],
        [app_id, 7]
    ]);

    json!([[[RPC_ID, inner.to_string(), null, "generic"]]]).to_string()
}

/// Decodes a raw `batchexecute` response body.
///
/// A missing or null payload is an app without reviews (the store
/// answers unknown app ids the same way), not an error.
pub fn parse_page(body: &str) -> Result<ReviewPage, FetchError> {
    let rest = body
        .trim_start()
        .strip_prefix(XSSI_GUARD)
        .ok_or_else(|| FetchError::Malformed("missing response guard".into()))?;

    // Only the first JSON value matters; trailing chunks are ignored
    let envelope: Value = serde_json::Deserializer::from_str(rest)
        .into_iter::<Value>()
        .next()
        .ok_or_else(|| FetchError::Malformed("empty response".into()))?
        .map_err(|e| FetchError::Malformed(format!("envelope: {e}")))?;

    if !envelope.is_array() {
        return Err(FetchError::Malformed("envelope is not an array".into()));
    }

    let Some(payload) = envelope
        .get(0)
        .and_then(|frame| frame.get(2))
        .and_then(Value::as_str)
    else {
        return Ok(ReviewPage::default());
    };

    let data: Value = serde_json::from_str(payload)
        .map_err(|e| FetchError::Malformed(format!("payload: {e}")))?;

    let reviews: Vec<ReviewRecord> = data
        .get(0)
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(parse_review).collect())
        .unwrap_or_default();

    Ok(ReviewPage {
        reviews,
        next_token: continuation_token(&data),
    })
}

fn continuation_token(data: &Value) -> Option<String> {
    let items = data.as_array()?;
    let idx = items.len().checked_sub(2)?;
    items[idx]
        .as_array()?
        .last()?
        .as_str()
        .map(str::to_string)
}

fn parse_review(entry: &Value) -> ReviewRecord {
    ReviewRecord {
        content: entry.get(4).and_then(Value::as_str).map(str::to_string),
        score: entry.get(2).and_then(Value::as_i64),
        at: entry
            .get(5)
            .and_then(|ts| ts.get(0))
            .and_then(Value::as_i64)
            .and_then(util::local_from_unix),
    }
}
