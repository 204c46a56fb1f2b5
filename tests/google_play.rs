// tests/google_play.rs
use std::time::{Duration, Instant};

use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use review_collector::sources::google_play::{BATCH_EXECUTE_PATH, GooglePlayAdapter};
use review_collector::util;
use review_collector::{FetchError, FetchParams, ReviewSource};

/// Matches on the continuation token carried in the form body.
struct PageToken(Option<&'static str>);

impl Match for PageToken {
    fn matches(&self, request: &Request) -> bool {
        let body = String::from_utf8_lossy(&request.body);
        match self.0 {
            Some(token) => body.contains(token),
            None => !body.contains("tok-"),
        }
    }
}

fn body_for(reviews: Value, token: Option<&str>) -> String {
    let data = json!([reviews, null, [null, token], null]);
    let envelope = json!([
        ["wrb.fr", "UsvDTd", data.to_string(), null, null, null, "generic"],
        ["di", 17],
        ["af.httprm", 16, "-1", 5]
    ]);
    format!(")]}}'\n\n{envelope}")
}

fn entry(id: &str, score: i64, text: &str, secs: i64) -> Value {
    json!([id, ["user"], score, null, text, [secs, 0], 0])
}

fn adapter(server: &MockServer) -> GooglePlayAdapter {
    GooglePlayAdapter::new(server.uri(), Duration::from_secs(5)).unwrap()
}

fn fast_params() -> FetchParams {
    FetchParams {
        sleep_ms: 0,
        ..FetchParams::default()
    }
}

#[tokio::test]
async fn follows_continuation_token_across_pages() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(BATCH_EXECUTE_PATH))
        .and(query_param("hl", "en"))
        .and(query_param("gl", "us"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(PageToken(None))
        .respond_with(ResponseTemplate::new(200).set_body_string(body_for(
            json!([entry("r1", 5, "Great", 1_698_400_800), entry("r2", 1, "Bad", 1_698_404_400)]),
            Some("tok-2"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(BATCH_EXECUTE_PATH))
        .and(PageToken(Some("tok-2")))
        .respond_with(ResponseTemplate::new(200).set_body_string(body_for(
            json!([entry("r3", 3, "Okay", 1_698_408_000)]),
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let reviews = adapter(&server)
        .fetch_reviews("com.a.app", &fast_params())
        .await
        .unwrap();

    let texts: Vec<&str> = reviews.iter().filter_map(|r| r.content.as_deref()).collect();
    assert_eq!(texts, ["Great", "Bad", "Okay"]);
    assert_eq!(reviews[0].score, Some(5));
    assert_eq!(reviews[2].at, util::local_from_unix(1_698_408_000));
}

#[tokio::test]
async fn waits_between_page_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(BATCH_EXECUTE_PATH))
        .and(PageToken(None))
        .respond_with(ResponseTemplate::new(200).set_body_string(body_for(
            json!([entry("r1", 4, "First", 1_698_400_800)]),
            Some("tok-9"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(BATCH_EXECUTE_PATH))
        .and(PageToken(Some("tok-9")))
        .respond_with(ResponseTemplate::new(200).set_body_string(body_for(
            json!([entry("r2", 2, "Second", 1_698_404_400)]),
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let params = FetchParams {
        sleep_ms: 300,
        ..FetchParams::default()
    };
    let started = Instant::now();
    let reviews = adapter(&server).fetch_reviews("com.a.app", &params).await.unwrap();

    assert_eq!(reviews.len(), 2);
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn uses_configured_language_and_country() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(BATCH_EXECUTE_PATH))
        .and(query_param("hl", "am"))
        .and(query_param("gl", "et"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body_for(json!([]), None)))
        .expect(1)
        .mount(&server)
        .await;

    let params = FetchParams {
        lang: "am".into(),
        country: "et".into(),
        ..fast_params()
    };
    let reviews = adapter(&server).fetch_reviews("com.a.app", &params).await.unwrap();

    assert!(reviews.is_empty());
}

#[tokio::test]
async fn null_payload_means_no_reviews() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(BATCH_EXECUTE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            ")]}'\n\n[[\"wrb.fr\",\"UsvDTd\",null,null,null,[5],\"generic\"]]",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let reviews = adapter(&server)
        .fetch_reviews("com.does.not.exist", &fast_params())
        .await
        .unwrap();

    assert!(reviews.is_empty());
}

#[tokio::test]
async fn rate_limit_is_a_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(BATCH_EXECUTE_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = adapter(&server)
        .fetch_reviews("com.a.app", &fast_params())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Status(s) if s.as_u16() == 429));
}

#[tokio::test]
async fn html_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(BATCH_EXECUTE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>consent</html>"))
        .mount(&server)
        .await;

    let err = adapter(&server)
        .fetch_reviews("com.a.app", &fast_params())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Malformed(_)));
}
