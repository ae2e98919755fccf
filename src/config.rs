use std::{env, net::SocketAddr, path::PathBuf};

use crate::error::{Error, Result};

const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
const DEFAULT_MONGODB_DATABASE: &str = "euregjug";
const DEFAULT_GRIDFS_BUCKET: &str = "fs";
const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_ASSET_MAX_BYTES: usize = 10 * 1024 * 1024;

/// 运行配置
///
/// 全部来自环境变量，启动时若存在 `.env` 文件会先加载。
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres 连接地址，`DATABASE_URL`
    pub database_url: String,
    /// MongoDB 连接地址，`MONGODB_URI`
    pub mongodb_uri: String,
    /// 存放 GridFS bucket 的数据库，`MONGODB_DATABASE`
    pub mongodb_database: String,
    /// GridFS bucket 名称，`GRIDFS_BUCKET`
    pub gridfs_bucket: String,
    /// 监听地址，`SITE_ADDR`
    pub addr: SocketAddr,
    /// 上传文件大小上限（字节），`ASSET_MAX_BYTES`
    pub asset_max_bytes: usize,
}

impl Config {
    /// 从进程环境读取配置
    pub fn from_env() -> Result<Self> {
        check_dotenv(dotenvy::dotenv())?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 使用给定的查找函数读取配置，便于测试时替换环境
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::Config("`DATABASE_URL` not set".into()))?;

        let or_default = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let addr = or_default("SITE_ADDR", DEFAULT_ADDR)
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("`SITE_ADDR`: {e}")))?;

        let asset_max_bytes = match lookup("ASSET_MAX_BYTES").filter(|v| !v.trim().is_empty()) {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .map_err(|e| Error::Config(format!("`ASSET_MAX_BYTES`: {e}")))?,
            None => DEFAULT_ASSET_MAX_BYTES,
        };

        Ok(Self {
            database_url,
            mongodb_uri: or_default("MONGODB_URI", DEFAULT_MONGODB_URI),
            mongodb_database: or_default("MONGODB_DATABASE", DEFAULT_MONGODB_DATABASE),
            gridfs_bucket: or_default("GRIDFS_BUCKET", DEFAULT_GRIDFS_BUCKET),
            addr,
            asset_max_bytes,
        })
    }
}

/// `.env` 文件不存在时忽略，格式错误或无法读取时返回 [`Error::Config`]
fn check_dotenv(loaded: dotenvy::Result<PathBuf>) -> Result<()> {
    match loaded {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "loaded .env");
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(Error::Config(format!("`.env`: {e}"))),
    }
}
