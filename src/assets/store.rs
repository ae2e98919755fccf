use std::{io, pin::Pin};

use axum::body::Bytes;
use chrono::{DateTime, Utc};
use futures_util::Stream;
use mongodb::bson::Bson;

use crate::error::Result;

/// 文件内容的字节流
pub type AssetStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// 已存储文件的元信息
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAsset {
    /// 存储内部的文件标识，读取内容时使用，保证元信息与内容属于同一个文件
    pub id: Bson,
    /// 文件名，同时也是访问地址中的标识
    pub filename: String,
    /// 上传时识别出的 MIME 类型，识别失败时为 `None`
    pub content_type: Option<String>,
    /// 文件大小（字节）
    pub length: u64,
    /// 上传时间
    pub upload_date: DateTime<Utc>,
}

/// 二进制文件存储
///
/// 以文件名作为唯一标识，支持查询、写入和按流读取。
pub trait AssetStore: Clone + Send + Sync + 'static {
    /// 按文件名查找文件，不存在时返回 `None`
    fn find_one(&self, filename: &str) -> impl Future<Output = Result<Option<StoredAsset>>> + Send;

    /// 写入文件内容
    fn store(
        &self,
        data: Bytes,
        filename: &str,
        content_type: Option<&str>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// 以流的形式读取 [`StoredAsset`] 对应的内容
    fn download(&self, asset: &StoredAsset) -> impl Future<Output = Result<AssetStream>> + Send;
}
