//! Listing record, per-request search filters, the paged response shape, and market insight rows.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

pub const DEFAULT_BUCKET_SIZE: i64 = 50_000;
pub const MIN_BUCKET_SIZE: i64 = 10_000;
/// Zip codes returned by the median-by-zip breakdown.
pub const TOP_ZIP_LIMIT: i64 = 15;

/// One row of the listings table. Populated upstream; this service never writes it.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct Listing {
    pub id: i64,
    pub mls_number: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub price: f64,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<f64>,
    pub square_feet: Option<i64>,
    pub lot_size: Option<f64>,
    pub year_built: Option<i64>,
    pub property_type: Option<String>,
    pub description: Option<String>,
    pub photo_url: Option<String>,
    pub listing_date: DateTime<Utc>,
    pub status: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Validated search input. Empty strings and non-positive numbers mean "no constraint".
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilters {
    pub city: String,
    pub zip_code: String,
    pub property_type: String,
    pub keyword: String,
    pub min_price: f64,
    pub max_price: f64,
    pub bedrooms: i64,
    pub bathrooms: f64,
    pub page: i64,
    pub limit: i64,
}

impl Default for SearchFilters {
    fn default() -> Self {
        SearchFilters {
            city: String::new(),
            zip_code: String::new(),
            property_type: String::new(),
            keyword: String::new(),
            min_price: 0.0,
            max_price: 0.0,
            bedrooms: 0,
            bathrooms: 0.0,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Response body for `GET /api/properties`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PropertyPage {
    pub properties: Vec<Listing>,
    /// Rows matching the filters across all pages.
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// Aggregate statistics over priced listings matching the filters.
/// Medians and averages are `null` when nothing qualifies.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct MarketSummary {
    pub count: i64,
    pub median_price: Option<f64>,
    /// Only listings with a positive `square_feet` contribute.
    pub median_price_per_sqft: Option<f64>,
    /// Only listings with a positive `bedrooms` contribute.
    pub avg_beds: Option<f64>,
}

/// One non-empty price bucket: `bucket_min..=bucket_max`.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct PriceBucket {
    pub bucket_min: i64,
    pub bucket_max: i64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct ZipStats {
    pub zip_code: String,
    pub count: i64,
    pub median_price: f64,
    pub median_price_per_sqft: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct PropertyTypeCount {
    pub property_type: String,
    pub count: i64,
}
