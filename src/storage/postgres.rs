use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use crate::config::Config;

/// 数据库连接池类型
pub type DBPool = sqlx::PgPool;

/// 根据 [`Config`] 中的 `database_url` 初始化数据库连接池
pub async fn init_db_from_config(config: &Config) -> Result<DBPool, sqlx::Error> {
    new_db_pool(&config.database_url).await
}

/// 根据连接 URL 创建新的数据库连接池
///
/// 连接池配置：
///
/// - 最大空闲时间 60 秒
/// - 最大生存时间 1500 秒（约 25 分钟）
/// - 最大连接数 10
/// - 获取连接超时 2 秒
/// - 获取前测试连接
/// - 最小连接数 2
pub async fn new_db_pool(conn_url: &str) -> Result<DBPool, sqlx::Error> {
    pool_options().connect(conn_url).await
}

/// 创建不立即建立连接的连接池，首次查询时才连接
pub fn new_lazy_db_pool(conn_url: &str) -> Result<DBPool, sqlx::Error> {
    pool_options().connect_lazy(conn_url)
}

fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .idle_timeout(Duration::from_secs(60))
        .max_lifetime(Duration::from_secs(1500))
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(2))
        .test_before_acquire(true)
        .min_connections(2)
}

/// 执行 SQL 文件中的迁移语句
///
/// 文件内容整体作为一个简单查询发送，可以包含多条语句和 `DO` 块
pub async fn migrate(db: &DBPool, file: &str) -> Result<(), sqlx::Error> {
    let content = std::fs::read_to_string(file)?;
    sqlx::raw_sql(&content).execute(db).await?;
    Ok(())
}
