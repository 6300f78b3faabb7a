//! End-to-end tests driving the router over in-memory services.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use file_gateway::{
    auth::AuthKeys,
    config::Credentials,
    routes,
    services::{self, kv_index::KvIndex, object_store::ObjectStore, worker::JobQueue},
    state::AppState,
};

const BOUNDARY: &str = "test-boundary";

async fn test_app() -> Router {
    let pool = Arc::new(
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap(),
    );
    services::apply_migrations(&pool).await.unwrap();

    let base = std::env::temp_dir().join(format!("gateway-test-{}", Uuid::new_v4()));
    let store = ObjectStore::new(pool.clone(), base, "files");
    store.ensure_bucket().await.unwrap();
    let index = KvIndex::new(pool);
    let jobs = JobQueue::start(store.clone(), index.clone(), 8);

    let state = AppState {
        store,
        index,
        auth: AuthKeys::new("test-secret", 3600),
        credentials: Credentials {
            username: "admin".into(),
            password: "password123".into(),
        },
        jobs,
    };

    routes::routes::routes().with_state(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> axum::response::Response {
    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"username": username, "password": password}).to_string(),
        ))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn token(app: &Router) -> String {
    let response = login(app, "admin", "password123").await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

fn multipart_body(filename: &str, content_type: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(
    app: &Router,
    token: &str,
    folder: &str,
    filename: &str,
    content: &[u8],
) -> axum::response::Response {
    let request = Request::builder()
        .method("POST")
        .uri(format!("/upload?folder={folder}"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(filename, "text/plain", content)))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn get_with_token(app: &Router, token: &str, uri: &str) -> axum::response::Response {
    let request = Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = test_app().await;

    let response = login(&app, "admin", "wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Invalid credentials");
    assert!(body.get("access_token").is_none());

    let response = login(&app, "someone", "password123").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_endpoints_require_token() {
    let app = test_app().await;

    for uri in ["/file/some-id", "/download/some-id"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let request = Request::builder()
        .method("POST")
        .uri("/upload?folder=docs")
        .header(header::AUTHORIZATION, "Bearer not-a-real-token")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body("a.txt", "text/plain", b"x")))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_metadata_download_scenario() {
    let app = test_app().await;
    let token = token(&app).await;

    let response = upload(&app, &token, "docs", "report.txt", b"hello").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let file_id = body["file_id"].as_str().unwrap().to_string();
    assert_eq!(body["folder"], "docs");
    assert_eq!(body["filename"], "report.txt");

    let response = get_with_token(&app, &token, &format!("/file/{file_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["file_id"], file_id.as_str());
    assert_eq!(body["folder"], "docs");
    assert_eq!(body["filename"], "report.txt");
    assert_eq!(body["size"], 5);
    assert_eq!(body["content_type"], "text/plain");

    let response = get_with_token(&app, &token, &format!("/download/{file_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap(),
        "attachment; filename=report.txt"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"hello");
}

#[tokio::test]
async fn test_binary_round_trip() {
    let app = test_app().await;
    let token = token(&app).await;

    let payload: Vec<u8> = (0u16..4096).map(|i| (i % 251) as u8).collect();
    let response = upload(&app, &token, "bin", "blob.dat", &payload).await;
    assert_eq!(response.status(), StatusCode::OK);
    let file_id = body_json(response).await["file_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = get_with_token(&app, &token, &format!("/download/{file_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], &payload[..]);
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let app = test_app().await;
    let token = token(&app).await;
    let missing = Uuid::new_v4();

    let response = get_with_token(&app, &token, &format!("/file/{missing}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["detail"], "File ID not found");

    let response = get_with_token(&app, &token, &format!("/download/{missing}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_uploads_never_collide() {
    let app = test_app().await;
    let token = token(&app).await;

    let (a, b) = tokio::join!(
        upload(&app, &token, "one", "a.txt", b"first"),
        upload(&app, &token, "two", "b.txt", b"second"),
    );
    let a = body_json(a).await;
    let b = body_json(b).await;

    let id_a = a["file_id"].as_str().unwrap().to_string();
    let id_b = b["file_id"].as_str().unwrap().to_string();
    assert_ne!(id_a, id_b);

    let meta_a = body_json(get_with_token(&app, &token, &format!("/file/{id_a}")).await).await;
    let meta_b = body_json(get_with_token(&app, &token, &format!("/file/{id_b}")).await).await;
    assert_eq!(meta_a["folder"], "one");
    assert_eq!(meta_a["filename"], "a.txt");
    assert_eq!(meta_b["folder"], "two");
    assert_eq!(meta_b["filename"], "b.txt");
}

#[tokio::test]
async fn test_traversal_folder_rejected() {
    let app = test_app().await;
    let token = token(&app).await;

    let response = upload(&app, &token, "..%2F..%2Fetc", "a.txt", b"x").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = test_app().await;

    let request = Request::builder()
        .uri("/healthz")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .uri("/readyz")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
