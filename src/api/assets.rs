use axum::{
    Router,
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Duration, Utc};

use super::{ApiError, Result};
use crate::{
    assets::{AssetStore, DEFAULT_CONTENT_TYPE, StoredAsset},
    state::AssetState,
};

/// 上传表单中文件字段的名称
pub const ASSET_FIELD: &str = "assetData";

/// 客户端缓存时间：365 天
const CACHE_SECONDS: i64 = 31_536_000;

/// 文件上传与读取路由。
///
/// 路由包括：
/// - `POST /assets`：上传文件（multipart，字段 `assetData`）
/// - `GET /assets/{filename}`：读取文件
pub fn setup_route<A: AssetStore>(state: AssetState<A>) -> Router {
    let limit = state.max_bytes();

    Router::new()
        .route("/assets", post(create::<A>))
        .route("/assets/{filename}", get(asset::<A>))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

/// 上传文件。
///
/// 同名文件已存在时返回 409，不写入任何内容；
/// MIME 类型识别失败不影响上传，此时不记录类型。
/// 成功返回 201，响应体为存储的文件名。
async fn create<A: AssetStore>(
    State(assets): State<AssetState<A>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, String)> {
    let (filename, data) = read_asset_field(&mut multipart).await?;

    if assets.store().find_one(&filename).await?.is_some() {
        tracing::warn!(%filename, "asset already exists");
        return Err(ApiError::Conflict.into());
    }

    let content_type = match assets.detector().detect(&data, &filename) {
        Ok(ct) => Some(ct),
        Err(e) => {
            tracing::debug!(%e, %filename, "content type detection failed");
            None
        }
    };

    assets
        .store()
        .store(data, &filename, content_type.as_deref())
        .await?;

    Ok((StatusCode::CREATED, filename))
}

/// 从表单中读取 `assetData` 字段的文件名和内容
async fn read_asset_field(multipart: &mut Multipart) -> Result<(String, Bytes)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(ASSET_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().trim().to_string();
        // 没有文件名的文件无法通过 `GET /assets/{filename}` 读取，在查询存储之前拒绝
        if filename.is_empty() {
            return Err(ApiError::BadRequest("asset must have a filename".into()).into());
        }

        let data = field.bytes().await?;
        return Ok((filename, data));
    }

    Err(ApiError::BadRequest(format!("missing multipart field `{ASSET_FIELD}`")).into())
}

/// 读取文件。
///
/// 文件不存在返回 404；否则以流的形式返回内容，并附带长期缓存相关的响应头。
async fn asset<A: AssetStore>(
    Path(filename): Path<String>,
    State(assets): State<AssetState<A>>,
) -> Result<Response> {
    let asset = assets
        .store()
        .find_one(&filename)
        .await?
        .ok_or(ApiError::NotFound)?;

    let stream = assets.store().download(&asset).await?;

    Ok((asset_headers(&asset, Utc::now()), Body::from_stream(stream)).into_response())
}

/// 构造文件响应头
///
/// - `Content-Type`：上传时识别的类型，未知时为 [`DEFAULT_CONTENT_TYPE`]
/// - `Content-Disposition`：`inline`，附带文件名
/// - `Content-Length`
/// - `Last-Modified`：上传时间
/// - `Expires`：`now` 之后 365 天
/// - `Cache-Control`：`max-age=31536000, public`
fn asset_headers(asset: &StoredAsset, now: DateTime<Utc>) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let content_type = asset
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or(HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(&asset.filename),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(asset.length));
    headers.insert(header::LAST_MODIFIED, http_date(asset.upload_date));
    headers.insert(header::EXPIRES, http_date(now + Duration::seconds(CACHE_SECONDS)));
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("max-age=31536000, public"),
    );

    headers
}

/// `inline` 形式的 `Content-Disposition`
///
/// 非 ASCII 文件名按 RFC 5987 使用 `filename*` 编码。
fn content_disposition(filename: &str) -> HeaderValue {
    let printable = filename.chars().all(|c| c.is_ascii() && !c.is_ascii_control());

    let value = if printable {
        let escaped = filename.replace('\\', "\\\\").replace('"', "\\\"");
        format!("inline; filename=\"{escaped}\"")
    } else {
        let encoded: String = filename
            .bytes()
            .map(|b| match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'-' | b'_' | b'~' => {
                    (b as char).to_string()
                }
                _ => format!("%{b:02X}"),
            })
            .collect();
        format!("inline; filename*=UTF-8''{encoded}")
    };

    // 以上两种形式都只包含可见 ASCII 字符
    HeaderValue::from_str(&value).unwrap_or(HeaderValue::from_static("inline"))
}

/// IMF-fixdate 格式，例如 `Sun, 06 Nov 1994 08:49:37 GMT`
fn http_date(at: DateTime<Utc>) -> HeaderValue {
    let value = at.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
    HeaderValue::from_str(&value).unwrap_or(HeaderValue::from_static("0"))
}
