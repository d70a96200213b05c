//! Listings API: read-only search over a real-estate listings table.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod pagination;
pub mod routes;
pub mod sql;
pub mod state;
pub mod store;

#[cfg(test)]
mod testing;

pub use config::{Config, DatabaseConfig, PoolConfig};
pub use error::{AppError, ConfigError};
pub use model::{
    Listing, MarketSummary, PriceBucket, PropertyPage, PropertyTypeCount, SearchFilters, ZipStats,
};
pub use pagination::{paginate, Pagination};
pub use routes::{api_routes, app, cors_layer};
pub use sql::{build_predicate, Predicate};
pub use state::AppState;
pub use store::{connect_pool, ListingStore, PgListingStore};
