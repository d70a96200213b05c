//! Market insights over the same filters as listing search.
//!
//! Every endpoint builds its predicate with `build_predicate`, so an insight
//! and a search with identical query strings cover identical rows. Paging
//! parameters are accepted and ignored.

use super::properties::{parse_filters, parsed, QueryPairs};
use crate::error::AppError;
use crate::model::{
    MarketSummary, PriceBucket, PropertyTypeCount, ZipStats, DEFAULT_BUCKET_SIZE, MIN_BUCKET_SIZE,
    TOP_ZIP_LIMIT,
};
use crate::sql::build_predicate;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};

/// `bucket_size`: unparsable or non-positive means the default; small values are raised to the minimum.
pub fn parse_bucket_size(params: &[(String, String)]) -> i64 {
    parsed::<i64>(params, "bucket_size")
        .filter(|b| *b > 0)
        .map(|b| b.max(MIN_BUCKET_SIZE))
        .unwrap_or(DEFAULT_BUCKET_SIZE)
}

#[utoipa::path(
    get,
    path = "/api/insights/summary",
    responses(
        (status = 200, description = "Count, medians and average bedrooms of priced listings", body = MarketSummary),
        (status = 500, description = "Database failure"),
    )
)]
pub async fn market_summary(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<MarketSummary>, AppError> {
    let predicate = build_predicate(&parse_filters(&params));
    Ok(Json(state.store.summary(&predicate).await?))
}

#[utoipa::path(
    get,
    path = "/api/insights/price-histogram",
    params(
        ("bucket_size" = Option<i64>, Query, description = "Bucket width; default 50000, values below 10000 are raised to 10000"),
    ),
    responses(
        (status = 200, description = "Non-empty price buckets, cheapest first", body = [PriceBucket]),
        (status = 500, description = "Database failure"),
    )
)]
pub async fn price_histogram(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<Vec<PriceBucket>>, AppError> {
    let bucket_size = parse_bucket_size(&params);
    let predicate = build_predicate(&parse_filters(&params));
    Ok(Json(state.store.price_histogram(&predicate, bucket_size).await?))
}

#[utoipa::path(
    get,
    path = "/api/insights/median-by-zip",
    responses(
        (status = 200, description = "Busiest zip codes with their median prices", body = [ZipStats]),
        (status = 500, description = "Database failure"),
    )
)]
pub async fn median_by_zip(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<Vec<ZipStats>>, AppError> {
    let predicate = build_predicate(&parse_filters(&params));
    Ok(Json(state.store.median_by_zip(&predicate, TOP_ZIP_LIMIT).await?))
}

#[utoipa::path(
    get,
    path = "/api/insights/property-types",
    responses(
        (status = 200, description = "Listing count per property type", body = [PropertyTypeCount]),
        (status = 500, description = "Database failure"),
    )
)]
pub async fn property_types(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<Vec<PropertyTypeCount>>, AppError> {
    let predicate = build_predicate(&parse_filters(&params));
    Ok(Json(state.store.property_type_counts(&predicate).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(v: &str) -> i64 {
        parse_bucket_size(&[("bucket_size".to_string(), v.to_string())])
    }

    #[test]
    fn bucket_size_defaults_and_floor() {
        assert_eq!(parse_bucket_size(&[]), 50_000);
        assert_eq!(bucket("abc"), 50_000);
        assert_eq!(bucket("0"), 50_000);
        assert_eq!(bucket("-100"), 50_000);
        assert_eq!(bucket("5000"), 10_000);
        assert_eq!(bucket("10000"), 10_000);
        assert_eq!(bucket("25000"), 25_000);
    }
}
