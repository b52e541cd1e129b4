//! Integration tests running the full gateway against a mock recognizer

use chrono::Utc;
use facegate_gateway::config::GatewayConfig;
use facegate_gateway::routes::create_router;
use facegate_gateway::state::AppState;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_SECRET: &str = "integration-test-secret";

struct TestGateway {
    base_url: String,
    staging_dir: tempfile::TempDir,
}

async fn spawn_gateway(upstream_url: &str) -> TestGateway {
    spawn_gateway_with(upstream_url, |_| {}).await
}

async fn spawn_gateway_with(
    upstream_url: &str,
    tweak: impl FnOnce(&mut GatewayConfig),
) -> TestGateway {
    let staging_dir = tempfile::tempdir().unwrap();
    let mut config = GatewayConfig {
        jwt_secret: TEST_SECRET.to_string(),
        upstream_url: upstream_url.to_string(),
        staging_dir: staging_dir.path().to_path_buf(),
        // Keep dead-upstream tests fast
        health_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    tweak(&mut config);

    let state = AppState::new(config).unwrap();
    state.stager.ensure_dir().await.unwrap();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestGateway {
        base_url: format!("http://{}", addr),
        staging_dir,
    }
}

fn mint_claims(claims: Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

fn mint_token(subject: &str) -> String {
    mint_claims(json!({
        "sub": subject,
        "exp": (Utc::now() + chrono::Duration::hours(1)).timestamp(),
        "iat": Utc::now().timestamp(),
        "email": format!("{subject}@example.com"),
        "email_verified": true,
    }))
}

fn admin_token(subject: &str) -> String {
    mint_claims(json!({
        "sub": subject,
        "exp": (Utc::now() + chrono::Duration::hours(1)).timestamp(),
        "email": format!("{subject}@example.com"),
        "admin": true,
    }))
}

fn expired_token(subject: &str) -> String {
    // Well past the verifier's leeway
    mint_claims(json!({
        "sub": subject,
        "exp": (Utc::now() - chrono::Duration::hours(2)).timestamp(),
    }))
}

fn image_form(content: Vec<u8>) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new().part(
        "image",
        reqwest::multipart::Part::bytes(content)
            .file_name("probe.jpg")
            .mime_str("image/jpeg")
            .unwrap(),
    )
}

fn staged_file_count(gateway: &TestGateway) -> usize {
    std::fs::read_dir(gateway.staging_dir.path()).unwrap().count()
}

/// An address nothing is listening on
fn dead_upstream_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

async fn mount_search_ok(upstream: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(upstream)
        .await;
}

// ---- health and authentication ----

#[tokio::test]
async fn test_health_needs_no_token() {
    let upstream = MockServer::start().await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let response = reqwest::get(format!("{}/health", gateway.base_url))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Server is running");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let upstream = MockServer::start().await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let response = reqwest::get(format!("{}/protected-health", gateway.base_url))
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "missing_token");
    assert_eq!(body["error"], "Access token required");
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let upstream = MockServer::start().await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/protected-health", gateway.base_url))
        .bearer_auth("definitely-not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "invalid_token");
    assert_eq!(body["details"], "Authentication failed");
}

#[tokio::test]
async fn test_expired_token_is_rejected_with_its_own_code() {
    let upstream = MockServer::start().await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/protected-health", gateway.base_url))
        .bearer_auth(expired_token("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "expired_token");
    assert_eq!(body["details"], "Please refresh your authentication token");
}

#[tokio::test]
async fn test_protected_health_echoes_identity() {
    let upstream = MockServer::start().await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/protected-health", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Protected endpoint is working");
    assert_eq!(body["identity"]["subject"], "alice");
    assert_eq!(body["identity"]["email"], "alice@example.com");
}

// ---- face search ----

#[tokio::test]
async fn test_search_relays_matches_and_cleans_staging() {
    let upstream = MockServer::start().await;
    mount_search_ok(
        &upstream,
        json!([
            {"filename": "match1.jpg", "similarity": 87.5},
            {"filename": "match2.jpg", "similarity": 63.0},
        ]),
    )
    .await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/search-face", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .multipart(image_form(vec![0xFF; 512]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let matches: Value = response.json().await.unwrap();
    let matches = matches.as_array().unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0]["filename"], "match1.jpg");
    assert_eq!(matches[0]["similarity"], 87.5);

    // The staged copy is gone once the response is out
    assert_eq!(staged_file_count(&gateway), 0);
}

#[tokio::test]
async fn test_search_unwraps_results_object() {
    let upstream = MockServer::start().await;
    mount_search_ok(
        &upstream,
        json!({"results": [{"filename": "only.jpg", "similarity": 99.0}]}),
    )
    .await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/search-face", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .multipart(image_form(vec![1, 2, 3]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Clients always see a bare array, whatever the recognizer wrapped
    let matches: Value = response.json().await.unwrap();
    assert_eq!(matches.as_array().unwrap().len(), 1);
    assert_eq!(matches[0]["filename"], "only.jpg");
}

#[tokio::test]
async fn test_search_without_file_is_rejected() {
    let upstream = MockServer::start().await;
    // The recognizer must never hear about a fileless request
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&upstream)
        .await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let form = reqwest::multipart::Form::new().text("threshold", "70");
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/search-face", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "no_file");
    assert_eq!(body["error"], "No image file provided");
}

#[tokio::test]
async fn test_search_with_non_multipart_body_is_rejected() {
    let upstream = MockServer::start().await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/search-face", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .json(&json!({"image": "not how uploads work"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "no_file");
}

#[tokio::test]
async fn test_search_rejects_non_image_type() {
    let upstream = MockServer::start().await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let form = reqwest::multipart::Form::new().part(
        "image",
        reqwest::multipart::Part::bytes(vec![0x25, 0x50, 0x44, 0x46])
            .file_name("report.pdf")
            .mime_str("application/pdf")
            .unwrap(),
    );
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/search-face", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "unsupported_type");
    assert_eq!(body["error"], "Only image files are allowed");
    assert_eq!(staged_file_count(&gateway), 0);
}

#[tokio::test]
async fn test_search_rejects_oversized_upload() {
    let upstream = MockServer::start().await;
    let gateway = spawn_gateway_with(&upstream.uri(), |config| {
        config.max_upload_bytes = 1024;
    })
    .await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/search-face", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .multipart(image_form(vec![0xAA; 4096]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "payload_too_large");
    assert!(body["error"].as_str().unwrap().starts_with("File too large"));
    assert_eq!(staged_file_count(&gateway), 0);
}

#[tokio::test]
async fn test_search_forwards_threshold() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_string_contains("name=\"threshold\""))
        .and(body_string_contains("80"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&upstream)
        .await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let form = image_form(vec![1, 2, 3]).text("threshold", "80");
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/search-face", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_search_when_upstream_is_down() {
    let gateway = spawn_gateway(&dead_upstream_url()).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/search-face", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .multipart(image_form(vec![7; 64]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 503);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "upstream_unreachable");
    assert_eq!(body["error"], "Face recognition service unavailable");
    assert_eq!(
        body["details"],
        "Please ensure the recognizer service is running"
    );
    // Failure paths clean the staging directory too
    assert_eq!(staged_file_count(&gateway), 0);
}

#[tokio::test]
async fn test_search_reflects_upstream_failure_status() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("No face detected in image"))
        .mount(&upstream)
        .await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/search-face", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .multipart(image_form(vec![9; 128]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "upstream_error");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("No face detected"));
    assert_eq!(staged_file_count(&gateway), 0);
}

#[tokio::test]
async fn test_search_times_out_against_slow_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&upstream)
        .await;
    let gateway = spawn_gateway_with(&upstream.uri(), |config| {
        config.search_timeout = Duration::from_millis(300);
    })
    .await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/search-face", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .multipart(image_form(vec![3; 32]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 504);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "upstream_timeout");
    assert_eq!(staged_file_count(&gateway), 0);
}

// ---- rate limiting ----

#[tokio::test]
async fn test_rate_limit_enforced_per_identity() {
    let upstream = MockServer::start().await;
    mount_search_ok(&upstream, json!([])).await;
    let gateway = spawn_gateway_with(&upstream.uri(), |config| {
        config.rate_limit_max = 3;
    })
    .await;

    let client = reqwest::Client::new();

    // 1. Alice spends her whole budget
    for _ in 0..3 {
        let response = client
            .post(format!("{}/search-face", gateway.base_url))
            .bearer_auth(mint_token("alice"))
            .multipart(image_form(vec![1; 16]))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    // 2. Her next search is turned away
    let response = client
        .post(format!("{}/search-face", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .multipart(image_form(vec![1; 16]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 429);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "rate_limit_exceeded");
    assert_eq!(body["details"], "Maximum 3 requests per minute allowed");

    // 3. Bob's own budget is untouched
    let response = client
        .post(format!("{}/search-face", gateway.base_url))
        .bearer_auth(mint_token("bob"))
        .multipart(image_form(vec![1; 16]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_rate_limit_spares_other_routes() {
    let upstream = MockServer::start().await;
    mount_search_ok(&upstream, json!([])).await;
    let gateway = spawn_gateway_with(&upstream.uri(), |config| {
        config.rate_limit_max = 1;
    })
    .await;

    let client = reqwest::Client::new();
    let search = |form: reqwest::multipart::Form| {
        client
            .post(format!("{}/search-face", gateway.base_url))
            .bearer_auth(mint_token("alice"))
            .multipart(form)
            .send()
    };

    assert_eq!(search(image_form(vec![1])).await.unwrap().status(), 200);
    assert_eq!(search(image_form(vec![1])).await.unwrap().status(), 429);

    // Searches are capped, the rest of the API is not
    let response = client
        .get(format!("{}/protected-health", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_rate_window_lapses_and_budget_returns() {
    let upstream = MockServer::start().await;
    mount_search_ok(&upstream, json!([])).await;
    let gateway = spawn_gateway_with(&upstream.uri(), |config| {
        config.rate_limit_max = 1;
        config.rate_limit_window = Duration::from_secs(1);
    })
    .await;

    let client = reqwest::Client::new();
    let search = || {
        client
            .post(format!("{}/search-face", gateway.base_url))
            .bearer_auth(mint_token("alice"))
            .multipart(image_form(vec![1]))
            .send()
    };

    assert_eq!(search().await.unwrap().status(), 200);
    assert_eq!(search().await.unwrap().status(), 429);

    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert_eq!(search().await.unwrap().status(), 200);
}

// ---- image download ----

#[tokio::test]
async fn test_download_relays_image_with_headers() {
    let upstream = MockServer::start().await;
    let image = vec![0xAB; 2048];
    Mock::given(method("GET"))
        .and(path("/download/face_001.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(image.clone()),
        )
        .mount(&upstream)
        .await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/download/face_001.jpg", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "image/png"
    );
    assert_eq!(
        response.headers()["content-disposition"].to_str().unwrap(),
        "attachment; filename=\"face_001.jpg\""
    );
    assert_eq!(
        response.headers()["cache-control"].to_str().unwrap(),
        "public, max-age=3600"
    );

    let bytes = response.bytes().await.unwrap();
    assert_eq!(bytes.as_ref(), image.as_slice());
}

#[tokio::test]
async fn test_download_missing_image_is_404() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/nope.jpg"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&upstream)
        .await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/download/nope.jpg", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "image_not_found");
    assert_eq!(body["error"], "Image not found");
}

#[tokio::test]
async fn test_download_when_upstream_is_down() {
    let gateway = spawn_gateway(&dead_upstream_url()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/download/face_001.jpg", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 503);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "upstream_unreachable");
}

#[tokio::test]
async fn test_download_traversal_never_reaches_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/download/..%2Fsecrets.txt", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "image_not_found");
}

// ---- upstream diagnostics ----

#[tokio::test]
async fn test_upstream_probe_reports_health() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "ok", "faces_loaded": 42})),
        )
        .mount(&upstream)
        .await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/test-upstream", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "Recognizer service is reachable");
    assert_eq!(body["upstream_data"]["faces_loaded"], 42);
    assert_eq!(body["requested_by"], "alice");
}

#[tokio::test]
async fn test_upstream_probe_when_down() {
    let gateway = spawn_gateway(&dead_upstream_url()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/test-upstream", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 503);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "upstream_unreachable");
}

#[tokio::test]
async fn test_dataset_report_passes_through() {
    let upstream = MockServer::start().await;
    let report = json!({"total_faces": 10, "files": ["a.jpg", "b.jpg"]});
    Mock::given(method("GET"))
        .and(path("/debug/dataset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(report.clone()))
        .mount(&upstream)
        .await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/debug/upstream-dataset", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body, report);
}

// ---- admin ----

#[tokio::test]
async fn test_admin_route_requires_the_claim() {
    let upstream = MockServer::start().await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/admin/user-activity", gateway.base_url))
        .bearer_auth(mint_token("alice"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "insufficient_role");
    assert_eq!(body["error"], "Insufficient permissions");
    assert_eq!(body["details"], "Admin access required");
}

#[tokio::test]
async fn test_admin_sees_request_counts() {
    let upstream = MockServer::start().await;
    mount_search_ok(&upstream, json!([])).await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let client = reqwest::Client::new();

    // 1. Alice runs two searches
    for _ in 0..2 {
        let response = client
            .post(format!("{}/search-face", gateway.base_url))
            .bearer_auth(mint_token("alice"))
            .multipart(image_form(vec![5; 8]))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    // 2. The admin view shows them
    let response = client
        .get(format!("{}/admin/user-activity", gateway.base_url))
        .bearer_auth(admin_token("root"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Admin access granted");
    assert_eq!(body["request_counts"]["alice"], 2);
    assert_eq!(body["admin_identity"], "root@example.com");
}

// ---- ambient behavior ----

#[tokio::test]
async fn test_every_response_carries_a_request_id() {
    let upstream = MockServer::start().await;
    let gateway = spawn_gateway(&upstream.uri()).await;

    let response = reqwest::get(format!("{}/health", gateway.base_url))
        .await
        .unwrap();
    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}
