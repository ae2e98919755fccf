mod models;
mod postgres;
mod querier;
mod store;

pub use self::{
    models::PostLink,
    postgres::{DBPool, init_db_from_config, migrate, new_db_pool, new_lazy_db_pool},
    querier::Querier,
    store::PostStore,
};
