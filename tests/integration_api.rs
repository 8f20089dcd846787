use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use httpmock::prelude::*;
use sqlx::SqlitePool;
use tower::ServiceExt; // for `app.oneshot()`

use order_reminder_hub::db::{queries, run_migrations};
use order_reminder_hub::email::PostmarkClient;
use order_reminder_hub::orderspace::Client;
use order_reminder_hub::routes::{router, AppState};
use order_reminder_hub::services::ReminderService;

async fn test_state(server: &MockServer) -> (AppState, SqlitePool) {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let client = Client::new("id", "secret", pool.clone())
        .unwrap()
        .with_base_url(server.url(""))
        .with_token_url(server.url("/oauth/token"));
    let mailer = Arc::new(
        PostmarkClient::new("pm-token")
            .unwrap()
            .with_base_url(server.url("")),
    );
    let service = ReminderService::new(
        pool.clone(),
        client.clone(),
        mailer,
        "ops@example.com",
        "ops@example.com",
    );
    (AppState { client, service }, pool)
}

fn mock_token_endpoint(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(POST).path("/oauth/token");
        then.status(200)
            .body(r#"{"access_token":"tok","token_type":"bearer","expires_in":1799,"scope":"read"}"#);
    })
}

fn customer_json(id: &str, name: &str, email: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "company_name": name,
        "created_at": "2025-06-01T00:00:00Z",
        "status": "active",
        "email_addresses": { "orders": email }
    })
}

fn postmark_ok(to: &str) -> serde_json::Value {
    serde_json::json!({
        "To": to,
        "SubmittedAt": "2025-06-06T10:00:12Z",
        "MessageID": format!("msg-{to}"),
        "ErrorCode": 0,
        "Message": "OK"
    })
}

async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn healthz_reports_ok() {
    let server = MockServer::start();
    let (state, _pool) = test_state(&server).await;

    let resp = router(state)
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["status"], "ok");
}

#[tokio::test]
async fn adhoc_without_subject_is_rejected_before_any_fetch() {
    let server = MockServer::start();
    let token_mock = mock_token_endpoint(&server);
    let customers_mock = server.mock(|when, then| {
        when.method(GET).path("/customers");
        then.status(200)
            .json_body(serde_json::json!({ "customers": [], "has_more": false }));
    });
    let (state, _pool) = test_state(&server).await;

    let resp = router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/email/send")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"html_body":"<p>hi</p>"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert!(body["error"].as_str().unwrap().contains("subject"));
    assert_eq!(token_mock.calls(), 0);
    assert_eq!(customers_mock.calls(), 0);
}

#[tokio::test]
async fn adhoc_run_reports_sent_failed_and_skipped() {
    let server = MockServer::start();
    mock_token_endpoint(&server);
    server.mock(|when, then| {
        when.method(GET).path("/customers");
        then.status(200).json_body(serde_json::json!({
            "customers": [
                customer_json("cu_a", "Alpha Roasters", "a@example.com"),
                customer_json("cu_b", "Bravo Beans", "b@example.com"),
                customer_json("cu_c", "Charlie Cafe", "c@example.com"),
            ],
            "has_more": false
        }));
    });
    // Transport accepts A, rejects B; C is opted out below.
    let send_ok = server.mock(|when, then| {
        when.method(POST)
            .path("/email")
            .body_includes(r#""To":"a@example.com""#);
        then.status(200).json_body(postmark_ok("a@example.com"));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/email")
            .body_includes(r#""To":"b@example.com""#);
        then.status(422)
            .json_body(serde_json::json!({ "ErrorCode": 300, "Message": "Invalid 'To' address" }));
    });

    let (state, pool) = test_state(&server).await;
    queries::set_notify_days(&pool, "cu_c", false).await.unwrap();

    let resp = router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/email/send")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"subject":"Holiday hours","text_body":"We close early Friday."}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let report = json_body(resp).await;
    assert_eq!(report["sent"], 1);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["skipped"], 1);
    assert_eq!(send_ok.calls(), 1);
}

#[tokio::test]
async fn preview_sends_one_summary_to_the_operator() {
    let server = MockServer::start();
    mock_token_endpoint(&server);
    server.mock(|when, then| {
        when.method(GET).path("/customers");
        then.status(200).json_body(serde_json::json!({
            "customers": [
                customer_json("cu_a", "Alpha Roasters", "a@example.com"),
                customer_json("cu_b", "Bravo Beans", "b@example.com"),
            ],
            "has_more": false
        }));
    });
    let preview_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/email")
            .body_includes(r#""To":"ops@example.com""#)
            .body_includes("Alpha Roasters (a@example.com)")
            .body_includes("Bravo Beans (b@example.com)");
        then.status(200).json_body(postmark_ok("ops@example.com"));
    });

    let (state, _pool) = test_state(&server).await;

    let resp = router(state)
        .oneshot(
            Request::builder()
                .uri("/api/email/preview-reminders")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["status"], "preview sent");
    assert_eq!(preview_mock.calls(), 1);
}

#[tokio::test]
async fn customer_listing_passes_filters_through() {
    let server = MockServer::start();
    mock_token_endpoint(&server);
    let customers_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/customers")
            .query_param("limit", "10")
            .query_param("status", "active");
        then.status(200).json_body(serde_json::json!({
            "customers": [customer_json("cu_a", "Alpha Roasters", "a@example.com")],
            "has_more": true
        }));
    });

    let (state, _pool) = test_state(&server).await;

    let resp = router(state)
        .oneshot(
            Request::builder()
                .uri("/api/customers?limit=10&status=active&updated_since=not-a-date")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page = json_body(resp).await;
    assert_eq!(page["has_more"], true);
    assert_eq!(page["customers"][0]["id"], "cu_a");
    assert_eq!(customers_mock.calls(), 1);
}
