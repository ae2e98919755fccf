mod gridfs;
mod sniff;
mod store;

pub use self::{
    gridfs::{CONTENT_TYPE_KEY, GridFsAssets},
    sniff::{ContentTypeDetector, DEFAULT_CONTENT_TYPE, SniffingDetector},
    store::{AssetStore, AssetStream, StoredAsset},
};
