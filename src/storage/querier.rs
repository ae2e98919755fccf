use chrono::NaiveDate;

use super::{DBPool, PostLink};
use crate::content::Post;

const POST_COLUMNS: &str = "p.id, p.published_on, p.slug, p.title, p.content, p.format, p.status, p.locale, p.created_at, p.updated_at";

/// 用于查询文章相关数据
///
/// 提供按主键、按发布日期和 slug 查询，分页列表，上一篇/下一篇导航和全文检索。
pub trait Querier: Send + Sync {
    type Error;

    /// 按主键查询文章，不限状态
    fn get_by_id(
        &self,
        id: i32,
    ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send;

    /// 查询指定日期和 slug 的已发布文章
    fn get_published(
        &self,
        published_on: NaiveDate,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send;

    /// 分页查询文章，按发布日期和创建时间倒序
    ///
    /// `published_only` 为 `true` 时只返回已发布的文章。
    fn list(
        &self,
        page: i32,
        size: i32,
        published_only: bool,
    ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send;

    /// 比指定文章更早的最近一篇文章
    fn previous(
        &self,
        id: i32,
    ) -> impl Future<Output = Result<Option<PostLink>, Self::Error>> + Send;

    /// 比指定文章更新的最近一篇文章
    fn next(
        &self,
        id: i32,
    ) -> impl Future<Output = Result<Option<PostLink>, Self::Error>> + Send;

    /// 在已发布文章的标题和正文中全文检索
    ///
    /// 结果按相关度排序，相关度相同时按发布日期倒序。
    fn search(
        &self,
        query: &str,
        page: i32,
        size: i32,
    ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send;
}

fn offset(page: i32, size: i32) -> i64 {
    (i64::from(page.max(1)) - 1) * i64::from(size)
}

impl Querier for DBPool {
    type Error = sqlx::Error;

    async fn get_by_id(&self, id: i32) -> Result<Option<Post>, Self::Error> {
        sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self)
        .await
    }

    async fn get_published(
        &self,
        published_on: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, Self::Error> {
        sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            WHERE p.published_on = $1
            AND p.slug = $2
            AND p.status = 'published'
            "#
        ))
        .bind(published_on)
        .bind(slug)
        .fetch_optional(self)
        .await
    }

    async fn list(
        &self,
        page: i32,
        size: i32,
        published_only: bool,
    ) -> Result<Vec<Post>, Self::Error> {
        let mut builder =
            sqlx::QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM posts p"));

        if published_only {
            builder.push(" WHERE p.status = 'published'");
        }

        builder.push(" ORDER BY p.published_on DESC, p.created_at DESC");
        builder.push(" LIMIT ").push_bind(i64::from(size));
        builder.push(" OFFSET ").push_bind(offset(page, size));

        builder.build_query_as::<Post>().fetch_all(self).await
    }

    async fn previous(&self, id: i32) -> Result<Option<PostLink>, Self::Error> {
        sqlx::query_as::<_, PostLink>(
            r#"
            SELECT p1.published_on, p1.slug, p1.title
            FROM posts p1, posts p2
            WHERE p2.id = $1
            AND p1.id <> p2.id
            AND p1.status = 'published'
            AND (p1.published_on < p2.published_on
                 OR (p1.published_on = p2.published_on AND p1.created_at < p2.created_at))
            ORDER BY p1.published_on DESC, p1.created_at DESC
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(self)
        .await
    }

    async fn next(&self, id: i32) -> Result<Option<PostLink>, Self::Error> {
        sqlx::query_as::<_, PostLink>(
            r#"
            SELECT p1.published_on, p1.slug, p1.title
            FROM posts p1, posts p2
            WHERE p2.id = $1
            AND p1.id <> p2.id
            AND p1.status = 'published'
            AND (p1.published_on > p2.published_on
                 OR (p1.published_on = p2.published_on AND p1.created_at > p2.created_at))
            ORDER BY p1.published_on ASC, p1.created_at ASC
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(self)
        .await
    }

    async fn search(&self, query: &str, page: i32, size: i32) -> Result<Vec<Post>, Self::Error> {
        sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p, websearch_to_tsquery(p.search_config, $1) q
            WHERE p.status = 'published'
            AND p.search_vector @@ q
            ORDER BY ts_rank(p.search_vector, q) DESC, p.published_on DESC
            LIMIT $2
            OFFSET $3
            "#
        ))
        .bind(query)
        .bind(i64::from(size))
        .bind(offset(page, size))
        .fetch_all(self)
        .await
    }
}
