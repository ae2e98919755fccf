pub mod api;
pub mod assets;
pub mod config;
pub mod content;
pub mod error;
pub mod state;
pub mod storage;

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use crate::{
    assets::GridFsAssets,
    config::Config,
    error::Result,
    state::{AppState, AssetState},
};

/// 迁移脚本路径
pub const MIGRATION_FILE: &str = "sql/01-CREATE_TABLE.sql";

pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::from_env("SITE_LOG"))
        .init();

    let config = Config::from_env()?;

    let pool = storage::init_db_from_config(&config).await?;
    storage::migrate(&pool, MIGRATION_FILE).await?;

    let assets = GridFsAssets::connect(&config).await?;
    let app = AppState::new(pool, AssetState::new(assets, config.asset_max_bytes));

    api::run_server(app, config.addr).await
}
