use axum::{
    Json, Router,
    extract::{FromRequest, Path, State},
    http::StatusCode,
    routing::get,
};
use axum_extra::extract::Query;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ApiError, Error, Result};
use crate::{
    content::{Format, Post, Status},
    storage::{DBPool, PostLink, PostStore, Querier},
};

/// 每页最多返回的文章数
const MAX_PAGE_SIZE: i32 = 100;

/// JSON 请求体，解析失败统一返回 400
#[derive(FromRequest)]
#[from_request(via(Json), rejection(Error))]
struct JsonBody<T>(T);

/// 配置文章相关路由。
///
/// 路由包括：
/// - `GET /posts`：文章列表
/// - `POST /posts`：新建文章
/// - `GET /posts/search`：全文检索
/// - `GET /posts/{id}`：按主键获取文章
/// - `PUT /posts/{id}`：更新文章
/// - `GET /posts/{year}/{month}/{day}/{slug}`：获取已发布的文章及前后导航
pub fn setup_route() -> Router<DBPool> {
    Router::new()
        .route("/posts", get(post_list).post(create_post))
        .route("/posts/search", get(search))
        .route("/posts/{id}", get(post_by_id).put(update_post))
        .route("/posts/{year}/{month}/{day}/{slug}", get(published_post))
}

/// 分页参数
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ListParams {
    page: i32,
    size: i32,
    /// 为 `true` 时包括草稿和隐藏的文章
    all: bool,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            size: 10,
            all: false,
        }
    }
}

fn page_size(size: i32) -> i32 {
    size.clamp(1, MAX_PAGE_SIZE)
}

/// 获取文章列表。
///
/// 默认只返回已发布的文章，按发布日期倒序。
async fn post_list(
    Query(params): Query<ListParams>,
    State(pool): State<DBPool>,
) -> Result<Json<Vec<Post>>> {
    let posts = pool
        .list(params.page, page_size(params.size), !params.all)
        .await?;
    Ok(Json(posts))
}

/// 新建文章的请求体
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    published_on: NaiveDate,
    #[serde(default)]
    slug: Option<String>,
    title: String,
    content: String,
    #[serde(default)]
    format: Option<Format>,
    #[serde(default)]
    status: Option<Status>,
    locale: String,
}

impl From<NewPost> for Post {
    fn from(req: NewPost) -> Self {
        let mut post = Post::new(req.published_on, req.slug, req.title, req.content);
        post.locale = req.locale;
        if let Some(format) = req.format {
            post.format = format;
        }
        if let Some(status) = req.status {
            post.status = status;
        }
        post
    }
}

/// 新建文章。
///
/// 成功返回 201 和完整文章；校验失败返回 400，`(publishedOn, slug)` 重复返回 409。
async fn create_post(
    State(pool): State<DBPool>,
    JsonBody(req): JsonBody<NewPost>,
) -> Result<(StatusCode, Json<Post>)> {
    let mut post = Post::from(req);
    pool.insert(&mut post).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// 根据主键获取文章，不限状态。
async fn post_by_id(Path(id): Path<i32>, State(pool): State<DBPool>) -> Result<Json<Post>> {
    let post = pool.get_by_id(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(post))
}

/// 更新文章的请求体，缺省字段保持不变
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostUpdate {
    title: Option<String>,
    content: Option<String>,
    format: Option<Format>,
    status: Option<Status>,
    locale: Option<String>,
}

impl PostUpdate {
    fn apply(self, post: &mut Post) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
        if let Some(format) = self.format {
            post.format = format;
        }
        if let Some(status) = self.status {
            post.status = status;
        }
        if let Some(locale) = self.locale {
            post.locale = locale;
        }
    }
}

/// 更新文章。
///
/// slug 和发布日期不可修改。
async fn update_post(
    Path(id): Path<i32>,
    State(pool): State<DBPool>,
    JsonBody(req): JsonBody<PostUpdate>,
) -> Result<Json<Post>> {
    let mut post = pool.get_by_id(id).await?.ok_or(ApiError::NotFound)?;
    req.apply(&mut post);
    pool.update(&mut post).await?;
    Ok(Json(post))
}

/// 已发布文章及其前后导航
#[derive(Debug, Serialize)]
pub struct PublishedPost {
    #[serde(flatten)]
    post: Post,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous: Option<PostLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next: Option<PostLink>,
}

/// 根据发布日期和 slug 获取已发布的文章。
///
/// 日期无效返回 400，文章不存在或未发布返回 404。
async fn published_post(
    Path((year, month, day, slug)): Path<(i32, u32, u32, String)>,
    State(pool): State<DBPool>,
) -> Result<Json<PublishedPost>> {
    let published_on = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid date {year}-{month}-{day}")))?;

    let post = pool
        .get_published(published_on, &slug)
        .await?
        .ok_or(ApiError::NotFound)?;

    let (previous, next) = match post.id() {
        Some(id) => tokio::try_join!(pool.previous(id), pool.next(id))?,
        None => (None, None),
    };

    Ok(Json(PublishedPost {
        post,
        previous,
        next,
    }))
}

/// 全文检索参数
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    q: String,
    page: i32,
    size: i32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            q: String::new(),
            page: 1,
            size: 10,
        }
    }
}

/// 在已发布文章中全文检索。
///
/// 检索词为空返回 400。
async fn search(
    Query(params): Query<SearchParams>,
    State(pool): State<DBPool>,
) -> Result<Json<Vec<Post>>> {
    let q = params.q.trim();
    if q.is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".into()).into());
    }

    let posts = pool.search(q, params.page, page_size(params.size)).await?;
    Ok(Json(posts))
}
