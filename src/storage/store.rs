use crate::{
    content::Post,
    error::{ApiError, Error, Result},
    storage::DBPool,
};

/// 文章写入接口
///
/// 所有写操作都会先调用 [`Post::prepare_for_write`] 并校验，再写入数据库，
/// 同时刷新全文索引字段。
pub trait PostStore: Send + Sync {
    /// 插入新文章，成功后为 `post` 填充主键
    ///
    /// 若 `(published_on, slug)` 已存在返回 [`ApiError::Conflict`]。
    fn insert(&self, post: &mut Post) -> impl Future<Output = Result<()>> + Send;

    /// 按主键更新文章
    ///
    /// 文章不存在返回 [`ApiError::NotFound`]。
    fn update(&self, post: &mut Post) -> impl Future<Output = Result<()>> + Send;
}

impl PostStore for DBPool {
    async fn insert(&self, post: &mut Post) -> Result<()> {
        post.prepare_for_write();
        post.validate()?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO posts
                (published_on, slug, title, content, format, status, locale,
                 created_at, updated_at, search_config, search_vector)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10::regconfig,
                    setweight(to_tsvector($10::regconfig, $3), 'A') ||
                    setweight(to_tsvector($10::regconfig, $4), 'B'))
            RETURNING id
            "#,
        )
        .bind(post.published_on)
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.format)
        .bind(post.status)
        .bind(&post.locale)
        .bind(post.created_at)
        .bind(post.updated_at)
        .bind(post.search_config())
        .fetch_one(self)
        .await
        .map_err(Error::from_write)?;

        post.id = Some(id);
        tracing::debug!(id, slug = %post.slug, "post inserted");
        Ok(())
    }

    async fn update(&self, post: &mut Post) -> Result<()> {
        let id = post.id.ok_or(ApiError::NotFound)?;
        post.prepare_for_write();
        post.validate()?;

        let result = sqlx::query(
            r#"
            UPDATE posts
            SET slug = $2,
                title = $3,
                content = $4,
                format = $5,
                status = $6,
                locale = $7,
                updated_at = $8,
                search_config = $9::regconfig,
                search_vector = setweight(to_tsvector($9::regconfig, $3), 'A') ||
                                setweight(to_tsvector($9::regconfig, $4), 'B')
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.format)
        .bind(post.status)
        .bind(&post.locale)
        .bind(post.updated_at)
        .bind(post.search_config())
        .execute(self)
        .await
        .map_err(Error::from_write)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound.into());
        }
        tracing::debug!(id, slug = %post.slug, "post updated");
        Ok(())
    }
}
