use axum::body::Bytes;
use chrono::{DateTime, Utc};
use futures_util::{AsyncWriteExt, TryStreamExt};
use mongodb::{
    Client,
    bson::{Document, doc},
    gridfs::{FilesCollectionDocument, GridFsBucket},
    options::GridFsBucketOptions,
};
use tokio_util::{compat::FuturesAsyncReadCompatExt, io::ReaderStream};

use super::{AssetStore, AssetStream, StoredAsset};
use crate::{config::Config, error::Result};

/// GridFS 文件元数据中保存 MIME 类型的字段
pub const CONTENT_TYPE_KEY: &str = "_contentType";

/// 基于 MongoDB GridFS 的 [`AssetStore`] 实现
#[derive(Clone)]
pub struct GridFsAssets {
    bucket: GridFsBucket,
}

impl GridFsAssets {
    pub fn new(bucket: GridFsBucket) -> Self {
        Self { bucket }
    }

    /// 根据 [`Config`] 连接 MongoDB 并打开 GridFS bucket
    ///
    /// MongoDB 驱动按需建立连接，这里不会等待服务端响应。
    pub async fn connect(config: &Config) -> Result<Self> {
        let client = Client::with_uri_str(&config.mongodb_uri).await?;
        let bucket = client
            .database(&config.mongodb_database)
            .gridfs_bucket(
                GridFsBucketOptions::builder()
                    .bucket_name(config.gridfs_bucket.clone())
                    .build(),
            );

        tracing::info!(
            database = %config.mongodb_database,
            bucket = %config.gridfs_bucket,
            "gridfs bucket ready"
        );
        Ok(Self::new(bucket))
    }
}

impl From<FilesCollectionDocument> for StoredAsset {
    fn from(file: FilesCollectionDocument) -> Self {
        let content_type = file
            .metadata
            .as_ref()
            .and_then(|m| m.get_str(CONTENT_TYPE_KEY).ok())
            .map(str::to_string);

        let upload_date =
            DateTime::<Utc>::from_timestamp_millis(file.upload_date.timestamp_millis())
                .unwrap_or_default();

        Self {
            id: file.id,
            filename: file.filename.unwrap_or_default(),
            content_type,
            length: file.length,
            upload_date,
        }
    }
}

fn metadata(content_type: Option<&str>) -> Document {
    let mut metadata = Document::new();
    if let Some(ct) = content_type {
        metadata.insert(CONTENT_TYPE_KEY, ct);
    }
    metadata
}

impl AssetStore for GridFsAssets {
    async fn find_one(&self, filename: &str) -> Result<Option<StoredAsset>> {
        let file = self
            .bucket
            .find_one(doc! { "filename": filename })
            .sort(doc! { "uploadDate": -1 })
            .await?;
        Ok(file.map(StoredAsset::from))
    }

    async fn store(&self, data: Bytes, filename: &str, content_type: Option<&str>) -> Result<()> {
        let mut upload = self
            .bucket
            .open_upload_stream(filename)
            .metadata(metadata(content_type))
            .await?;

        upload.write_all(&data).await?;
        upload.close().await?;

        tracing::info!(filename, content_type, size = data.len(), "asset stored");
        Ok(())
    }

    async fn download(&self, asset: &StoredAsset) -> Result<AssetStream> {
        let download = self
            .bucket
            .open_download_stream(asset.id.clone())
            .await?;

        let stream = ReaderStream::new(download.compat()).inspect_err(|e| {
            tracing::error!(%e, "asset download interrupted");
        });
        Ok(Box::pin(stream))
    }
}
