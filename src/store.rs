//! Listing repository: the `ListingStore` seam and its PostgreSQL implementation.

use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::model::{
    Listing, MarketSummary, PriceBucket, PropertyPage, PropertyTypeCount, SearchFilters, ZipStats,
};
use crate::pagination::{paginate, Pagination};
use crate::sql::{
    bind_all, bind_all_scalar, build_predicate, select_by_id, select_count, select_median_by_zip,
    select_page, select_price_histogram, select_property_type_counts, select_summary, Predicate,
    QueryBuf,
};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};

/// Read access to listings. Handlers only see this trait, never a pool.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Rows matching `predicate`.
    async fn count(&self, predicate: &Predicate) -> Result<i64, AppError>;

    /// One page of rows matching `predicate`, newest `listing_date` first, ties by `id` descending.
    async fn search(&self, predicate: &Predicate, limit: i64, offset: i64) -> Result<Vec<Listing>, AppError>;

    /// Fails with `AppError::NotFound` when no row has this id.
    async fn get_by_id(&self, id: i64) -> Result<Listing, AppError>;

    /// Cheap liveness check against the backing store.
    async fn ping(&self) -> Result<(), AppError>;

    /// Count, median price, median price per square foot and average beds of priced rows.
    async fn summary(&self, predicate: &Predicate) -> Result<MarketSummary, AppError>;

    /// Non-empty price buckets of width `bucket_size`, cheapest first.
    async fn price_histogram(&self, predicate: &Predicate, bucket_size: i64) -> Result<Vec<PriceBucket>, AppError>;

    /// The `limit` zip codes with the most priced rows, most first, ties by zip code.
    async fn median_by_zip(&self, predicate: &Predicate, limit: i64) -> Result<Vec<ZipStats>, AppError>;

    /// Row count per non-empty property type, alphabetical.
    async fn property_type_counts(&self, predicate: &Predicate) -> Result<Vec<PropertyTypeCount>, AppError>;

    /// Count and fetch one page with a single shared predicate.
    async fn search_page(&self, filters: &SearchFilters) -> Result<PropertyPage, AppError> {
        let predicate = build_predicate(filters);
        let total = self.count(&predicate).await?;
        let Pagination { offset, total_pages } = paginate(total, filters.page, filters.limit);
        let properties = self.search(&predicate, filters.limit, offset).await?;
        Ok(PropertyPage {
            properties,
            total,
            page: filters.page,
            limit: filters.limit,
            total_pages,
        })
    }
}

/// Build the bounded connection pool and verify it can reach the database.
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let opts = config.connect_options()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.pool.max_connections)
        .min_connections(config.pool.min_connections)
        .max_lifetime(config.pool.max_lifetime)
        .idle_timeout(config.pool.idle_timeout)
        .acquire_timeout(config.pool.acquire_timeout)
        .connect_with(opts)
        .await?;
    tracing::info!(
        max_connections = config.pool.max_connections,
        table = %config.table,
        "connected to database"
    );
    Ok(pool)
}

#[derive(Clone)]
pub struct PgListingStore {
    pool: PgPool,
    table: String,
}

impl PgListingStore {
    pub fn new(pool: PgPool, table: impl Into<String>) -> Self {
        PgListingStore {
            pool,
            table: table.into(),
        }
    }

    async fn fetch_all_as<T>(&self, q: QueryBuf) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_all(&self.pool)
            .await?;
        let decoded = rows
            .iter()
            .map(|row| T::from_row(row))
            .collect::<Result<Vec<T>, _>>()?;
        Ok(decoded)
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn count(&self, predicate: &Predicate) -> Result<i64, AppError> {
        let q = select_count(&self.table, predicate);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let total = bind_all_scalar(sqlx::query_scalar::<_, i64>(&q.sql), &q.params)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn search(&self, predicate: &Predicate, limit: i64, offset: i64) -> Result<Vec<Listing>, AppError> {
        let q = select_page(&self.table, predicate, limit, offset);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_all(&self.pool)
            .await?;
        // A row that fails to decode is dropped, so the page can hold fewer rows than `total` implies.
        let listings = rows
            .iter()
            .filter_map(|row| match Listing::from_row(row) {
                Ok(listing) => Some(listing),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping listing row that failed to decode");
                    None
                }
            })
            .collect();
        Ok(listings)
    }

    async fn get_by_id(&self, id: i64) -> Result<Listing, AppError> {
        let sql = select_by_id(&self.table);
        tracing::debug!(sql = %sql, id, "query");
        sqlx::query_as::<_, Listing>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    async fn summary(&self, predicate: &Predicate) -> Result<MarketSummary, AppError> {
        let q = select_summary(&self.table, predicate);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_one(&self.pool)
            .await?;
        Ok(MarketSummary::from_row(&row)?)
    }

    async fn price_histogram(&self, predicate: &Predicate, bucket_size: i64) -> Result<Vec<PriceBucket>, AppError> {
        self.fetch_all_as(select_price_histogram(&self.table, predicate, bucket_size))
            .await
    }

    async fn median_by_zip(&self, predicate: &Predicate, limit: i64) -> Result<Vec<ZipStats>, AppError> {
        self.fetch_all_as(select_median_by_zip(&self.table, predicate, limit))
            .await
    }

    async fn property_type_counts(&self, predicate: &Predicate) -> Result<Vec<PropertyTypeCount>, AppError> {
        self.fetch_all_as(select_property_type_counts(&self.table, predicate))
            .await
    }
}
