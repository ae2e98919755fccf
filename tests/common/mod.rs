#![allow(dead_code)]

use std::{
    io,
    sync::{Arc, Mutex},
};

use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    extract::Request,
    http::Response,
};
use chrono::Utc;
use euregjug_site::{
    api,
    assets::{AssetStore, AssetStream, ContentTypeDetector, StoredAsset},
    error::Result,
    state::{AppState, AssetState},
    storage::DBPool,
};
use futures_util::stream;
use mongodb::bson::Bson;
use tower::util::ServiceExt;

/// 对 [`AssetStore`] 的调用记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FindOne(String),
    Store {
        filename: String,
        content_type: Option<String>,
        size: usize,
    },
    /// 按存储标识读取内容
    Download(i64),
}

/// 同名文件的一个版本
struct Revision {
    id: i64,
    filename: String,
    content_type: Option<String>,
    data: Bytes,
}

/// 内存中的 [`AssetStore`]，记录每一次调用
///
/// 与 GridFS 一样允许同名文件存在多个版本，查询时返回最新的版本。
#[derive(Clone, Default)]
pub struct MemoryAssets {
    files: Arc<Mutex<Vec<Revision>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MemoryAssets {
    pub fn with_file(self, filename: &str, content_type: Option<&str>, data: &'static [u8]) -> Self {
        self.insert(
            filename,
            content_type.map(str::to_string),
            Bytes::from_static(data),
        );
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("lock").push(call);
    }

    fn insert(&self, filename: &str, content_type: Option<String>, data: Bytes) {
        let mut files = self.files.lock().expect("lock");
        let id = files.len() as i64;
        files.push(Revision {
            id,
            filename: filename.to_string(),
            content_type,
            data,
        });
    }
}

impl AssetStore for MemoryAssets {
    async fn find_one(&self, filename: &str) -> Result<Option<StoredAsset>> {
        self.record(Call::FindOne(filename.to_string()));
        let files = self.files.lock().expect("lock");
        Ok(files
            .iter()
            .rev()
            .find(|r| r.filename == filename)
            .map(|r| StoredAsset {
                id: Bson::Int64(r.id),
                filename: r.filename.clone(),
                content_type: r.content_type.clone(),
                length: r.data.len() as u64,
                upload_date: Utc::now(),
            }))
    }

    async fn store(&self, data: Bytes, filename: &str, content_type: Option<&str>) -> Result<()> {
        self.record(Call::Store {
            filename: filename.to_string(),
            content_type: content_type.map(str::to_string),
            size: data.len(),
        });
        self.insert(filename, content_type.map(str::to_string), data);
        Ok(())
    }

    async fn download(&self, asset: &StoredAsset) -> Result<AssetStream> {
        let id = asset.id.as_i64().unwrap_or(-1);
        self.record(Call::Download(id));
        let data = self
            .files
            .lock()
            .expect("lock")
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.data.clone())
            .unwrap_or_default();
        Ok(Box::pin(stream::iter([Ok::<_, io::Error>(data)])))
    }
}

/// 总是失败的 MIME 识别器
pub struct FailingDetector;

impl ContentTypeDetector for FailingDetector {
    fn detect(&self, _data: &[u8], _filename: &str) -> io::Result<String> {
        Err(io::Error::other("detection failed"))
    }
}

pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new(pool: DBPool, assets: AssetState<MemoryAssets>) -> Self {
        let router = api::setup_route(AppState::new(pool, assets));
        Self { router }
    }

    pub async fn request(&self, req: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(req)
            .await
            .expect("oneshot fail")
    }
}

pub async fn body_text(resp: Response<Body>) -> String {
    let data = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("读取数据失败");
    String::from_utf8(data.to_vec()).expect("读取数据失败")
}

pub const BOUNDARY: &str = "----euregjug-boundary";

/// 构造只包含一个文件字段的 multipart 请求体
pub fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(field: &str, filename: &str, data: &[u8]) -> Request<Body> {
    Request::post("/api/assets")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, filename, data)))
        .expect("请求失败")
}
