use std::sync::Arc;

use crate::{
    assets::{AssetStore, ContentTypeDetector, GridFsAssets, SniffingDetector},
    storage::DBPool,
};

/// 文件接口使用的状态
///
/// 包含文件存储、MIME 识别器和上传大小上限。
#[derive(Clone)]
pub struct AssetState<A> {
    store: A,
    detector: Arc<dyn ContentTypeDetector>,
    max_bytes: usize,
}

impl<A: AssetStore> AssetState<A> {
    /// 使用默认的 [`SniffingDetector`] 创建
    pub fn new(store: A, max_bytes: usize) -> Self {
        Self::with_detector(store, SniffingDetector, max_bytes)
    }

    pub fn with_detector(
        store: A,
        detector: impl ContentTypeDetector + 'static,
        max_bytes: usize,
    ) -> Self {
        Self {
            store,
            detector: Arc::new(detector),
            max_bytes,
        }
    }

    pub fn store(&self) -> &A {
        &self.store
    }

    pub fn detector(&self) -> &dyn ContentTypeDetector {
        self.detector.as_ref()
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }
}

/// 应用程序上下文
///
/// [`AppState`] 封装了数据库连接池和文件存储，提供统一访问入口。
#[derive(Clone)]
pub struct AppState<A = GridFsAssets> {
    pool: DBPool,
    assets: AssetState<A>,
}

impl<A: AssetStore> AppState<A> {
    /// 创建一个新的 [`AppState`] 实例
    pub fn new(pool: DBPool, assets: AssetState<A>) -> Self {
        Self { pool, assets }
    }

    /// 获取数据库连接池，同时用于文章的读写
    pub fn querier(&self) -> &DBPool {
        &self.pool
    }

    /// 获取文件接口状态
    pub fn assets(&self) -> &AssetState<A> {
        &self.assets
    }
}
