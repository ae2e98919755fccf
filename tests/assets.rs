mod common;

use axum::{
    body::Body,
    extract::Request,
    http::{StatusCode, header},
};
use chrono::{DateTime, Duration, Utc};
use euregjug_site::{state::AssetState, storage::new_lazy_db_pool};

use common::{Call, FailingDetector, MemoryAssets, TestApp, body_text, upload_request};

const PNG: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00,
];

const MAX_BYTES: usize = 1024 * 1024;

fn app(assets: AssetState<MemoryAssets>) -> TestApp {
    // 文件接口不访问数据库，连接池不会真正建立连接
    let pool = new_lazy_db_pool("postgres://localhost/unused").expect("创建连接池失败");
    TestApp::new(pool, assets)
}

#[tokio::test]
async fn test_create_existing_asset_should_conflict() {
    let store = MemoryAssets::default().with_file("asset.png", Some("image/png"), PNG);
    let app = app(AssetState::new(store.clone(), MAX_BYTES));

    let resp = app.request(upload_request("assetData", "asset.png", PNG)).await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_text(resp).await, "");
    assert_eq!(store.calls(), vec![Call::FindOne("asset.png".into())]);
}

#[tokio::test]
async fn test_create_should_store_with_detected_type() {
    let store = MemoryAssets::default();
    let app = app(AssetState::new(store.clone(), MAX_BYTES));

    let resp = app.request(upload_request("assetData", "asset.png", PNG)).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_text(resp).await, "asset.png");
    assert_eq!(
        store.calls(),
        vec![
            Call::FindOne("asset.png".into()),
            Call::Store {
                filename: "asset.png".into(),
                content_type: Some("image/png".into()),
                size: PNG.len(),
            },
        ]
    );
}

#[tokio::test]
async fn test_failed_mimetype_detection_should_store_without_type() {
    let store = MemoryAssets::default();
    let app = app(AssetState::with_detector(
        store.clone(),
        FailingDetector,
        MAX_BYTES,
    ));

    let resp = app.request(upload_request("assetData", "asset.png", PNG)).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_text(resp).await, "asset.png");
    assert_eq!(
        store.calls(),
        vec![
            Call::FindOne("asset.png".into()),
            Call::Store {
                filename: "asset.png".into(),
                content_type: None,
                size: PNG.len(),
            },
        ]
    );
}

#[tokio::test]
async fn test_create_without_asset_field_should_fail() {
    let store = MemoryAssets::default();
    let app = app(AssetState::new(store.clone(), MAX_BYTES));

    let resp = app.request(upload_request("somethingElse", "asset.png", PNG)).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(store.calls().is_empty(), "未读取到文件时不应访问存储");
}

#[tokio::test]
async fn test_create_too_large_should_fail() {
    let store = MemoryAssets::default();
    let app = app(AssetState::new(store.clone(), 8));

    let resp = app.request(upload_request("assetData", "asset.png", PNG)).await;

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_get_missing_asset_should_fail() {
    let store = MemoryAssets::default();
    let app = app(AssetState::new(store.clone(), MAX_BYTES));

    let req = Request::get("/api/assets/notthere.jpg")
        .body(Body::empty())
        .expect("请求失败");
    let resp = app.request(req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.calls(), vec![Call::FindOne("notthere.jpg".into())]);
}

#[tokio::test]
async fn test_get_asset_should_stream_with_cache_headers() {
    let store = MemoryAssets::default().with_file(
        "helloworld.txt",
        Some("text/plain"),
        b"Hello, World!",
    );
    let app = app(AssetState::new(store.clone(), MAX_BYTES));

    let req = Request::get("/api/assets/helloworld.txt")
        .body(Body::empty())
        .expect("请求失败");
    let resp = app.request(req).await;

    assert_eq!(resp.status(), StatusCode::OK);

    let headers = resp.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "inline; filename=\"helloworld.txt\""
    );
    assert_eq!(headers[header::CACHE_CONTROL], "max-age=31536000, public");

    let expires = headers[header::EXPIRES].to_str().expect("Expires 应为 ASCII");
    let expires = DateTime::parse_from_rfc2822(expires).expect("Expires 格式错误");
    let expected = Utc::now() + Duration::days(365);
    assert!(
        (expected - expires.with_timezone(&Utc)).num_seconds().abs() < 60,
        "Expires 应为一年之后"
    );

    assert_eq!(body_text(resp).await, "Hello, World!");
    assert_eq!(
        store.calls(),
        vec![
            Call::FindOne("helloworld.txt".into()),
            Call::Download(0),
        ]
    );
}

#[tokio::test]
async fn test_uploaded_asset_can_be_read_back() {
    let store = MemoryAssets::default();
    let app = app(AssetState::new(store, MAX_BYTES));

    let resp = app
        .request(upload_request("assetData", "notes.txt", b"some notes"))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = Request::get("/api/assets/notes.txt")
        .body(Body::empty())
        .expect("请求失败");
    let resp = app.request(req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/plain");
    assert_eq!(resp.headers()[header::CONTENT_LENGTH], "10");
    assert_eq!(body_text(resp).await, "some notes");
}

#[tokio::test]
async fn test_get_asset_serves_headers_and_bytes_of_same_revision() {
    let store = MemoryAssets::default()
        .with_file("a.txt", Some("text/plain"), b"Hello, World!")
        .with_file("a.txt", Some("text/markdown"), b"Hello");
    let app = app(AssetState::new(store.clone(), MAX_BYTES));

    let req = Request::get("/api/assets/a.txt")
        .body(Body::empty())
        .expect("请求失败");
    let resp = app.request(req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/markdown");
    assert_eq!(resp.headers()[header::CONTENT_LENGTH], "5");
    assert_eq!(body_text(resp).await, "Hello");
    assert_eq!(
        store.calls(),
        vec![Call::FindOne("a.txt".into()), Call::Download(1)],
        "内容必须按查询到的文件标识读取"
    );
}

#[tokio::test]
async fn test_create_without_filename_should_fail() {
    let store = MemoryAssets::default();
    let app = app(AssetState::new(store.clone(), MAX_BYTES));

    let resp = app.request(upload_request("assetData", "  ", PNG)).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(store.calls().is_empty());
}
