//! Listing search and lookup.
//!
//! Query parsing is permissive: every field is read on its own, and a value
//! that does not parse (or is out of range) is treated as if it were absent.
//! Requests are never rejected for bad filter input. When a key is repeated,
//! only its first occurrence counts.

use crate::error::AppError;
use crate::model::{Listing, PropertyPage, SearchFilters, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::str::FromStr;

/// Raw query pairs in request order, repeated keys included.
pub type QueryPairs = Vec<(String, String)>;

/// First value given for `key`.
pub(crate) fn first<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

pub(crate) fn parsed<T: FromStr>(params: &[(String, String)], key: &str) -> Option<T> {
    first(params, key).and_then(|v| v.parse().ok())
}

/// Price and bathroom bounds: non-finite input (`NaN`, `inf`) counts as absent.
fn parsed_bound(params: &[(String, String)], key: &str) -> f64 {
    parsed::<f64>(params, key)
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Build `SearchFilters` from raw query parameters.
///
/// `page` must be a positive integer, otherwise 1. `limit` must be an integer
/// in `1..=100`, otherwise 20; out-of-range values are replaced, not clamped.
pub fn parse_filters(params: &[(String, String)]) -> SearchFilters {
    let text = |key: &str| first(params, key).unwrap_or_default().to_string();
    SearchFilters {
        city: text("city"),
        zip_code: text("zip_code"),
        property_type: text("property_type"),
        keyword: text("keyword"),
        min_price: parsed_bound(params, "min_price"),
        max_price: parsed_bound(params, "max_price"),
        bedrooms: parsed(params, "bedrooms").unwrap_or(0),
        bathrooms: parsed_bound(params, "bathrooms"),
        page: parsed(params, "page")
            .filter(|p: &i64| *p > 0)
            .unwrap_or(DEFAULT_PAGE),
        limit: parsed(params, "limit")
            .filter(|l: &i64| (1..=MAX_LIMIT).contains(l))
            .unwrap_or(DEFAULT_LIMIT),
    }
}

/// Search listings with optional filters, newest first.
#[utoipa::path(
    get,
    path = "/api/properties",
    params(
        ("city" = Option<String>, Query, description = "Case-insensitive exact city"),
        ("zip_code" = Option<String>, Query, description = "Exact zip code"),
        ("property_type" = Option<String>, Query, description = "Case-insensitive exact property type"),
        ("keyword" = Option<String>, Query, description = "Case-insensitive substring of address, description or city"),
        ("min_price" = Option<f64>, Query, description = "Lower price bound; ignored when unparsable or <= 0"),
        ("max_price" = Option<f64>, Query, description = "Upper price bound; ignored when unparsable or <= 0"),
        ("bedrooms" = Option<i64>, Query, description = "Minimum bedrooms; ignored when unparsable or <= 0"),
        ("bathrooms" = Option<f64>, Query, description = "Minimum bathrooms; ignored when unparsable or <= 0"),
        ("page" = Option<i64>, Query, description = "1-based page; invalid or < 1 falls back to 1"),
        ("limit" = Option<i64>, Query, description = "Page size 1..=100; anything else falls back to 20"),
    ),
    responses(
        (status = 200, description = "One page of matching listings", body = PropertyPage),
        (status = 500, description = "Database failure"),
    )
)]
pub async fn list_properties(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<PropertyPage>, AppError> {
    let filters = parse_filters(&params);
    let page = state.store.search_page(&filters).await?;
    Ok(Json(page))
}

/// Fetch one listing by id.
#[utoipa::path(
    get,
    path = "/api/properties/{id}",
    params(("id" = i64, Path, description = "Listing id")),
    responses(
        (status = 200, description = "The listing", body = Listing),
        (status = 404, description = "No listing with this id"),
        (status = 500, description = "Database failure"),
    )
)]
pub async fn get_property(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<Json<Listing>, AppError> {
    // A non-integer id cannot match any row.
    let id: i64 = id_str.parse().map_err(|_| AppError::NotFound(id_str.clone()))?;
    let listing = state.store.get_by_id(id).await?;
    Ok(Json(listing))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryPairs {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn no_params_gives_defaults() {
        assert_eq!(parse_filters(&[]), SearchFilters::default());
    }

    #[test]
    fn repeated_key_keeps_first_value() {
        let f = parse_filters(&params(&[
            ("limit", "10"),
            ("limit", "x"),
            ("city", "Austin"),
            ("city", "Dallas"),
        ]));
        assert_eq!(f.limit, 10);
        assert_eq!(f.city, "Austin");

        let f = parse_filters(&params(&[("page", "zero"), ("page", "3")]));
        assert_eq!(f.page, 1);
    }

    #[test]
    fn well_formed_params_are_read() {
        let f = parse_filters(&params(&[
            ("city", "Austin"),
            ("zip_code", "78701"),
            ("property_type", "Condo"),
            ("keyword", "loft"),
            ("min_price", "200000"),
            ("max_price", "450000.50"),
            ("bedrooms", "3"),
            ("bathrooms", "2.5"),
            ("page", "2"),
            ("limit", "10"),
        ]));
        assert_eq!(f.city, "Austin");
        assert_eq!(f.zip_code, "78701");
        assert_eq!(f.property_type, "Condo");
        assert_eq!(f.keyword, "loft");
        assert_eq!(f.min_price, 200_000.0);
        assert_eq!(f.max_price, 450_000.5);
        assert_eq!(f.bedrooms, 3);
        assert_eq!(f.bathrooms, 2.5);
        assert_eq!(f.page, 2);
        assert_eq!(f.limit, 10);
    }

    #[test]
    fn limit_outside_range_falls_back_to_default() {
        for bad in ["150", "0", "-5", "101", "ten", ""] {
            assert_eq!(parse_filters(&params(&[("limit", bad)])).limit, 20, "limit={bad}");
        }
        assert_eq!(parse_filters(&params(&[("limit", "100")])).limit, 100);
        assert_eq!(parse_filters(&params(&[("limit", "1")])).limit, 1);
    }

    #[test]
    fn page_below_one_falls_back_to_default() {
        for bad in ["0", "-1", "abc", "1.5"] {
            assert_eq!(parse_filters(&params(&[("page", bad)])).page, 1, "page={bad}");
        }
    }

    #[test]
    fn malformed_numbers_are_ignored_not_rejected() {
        let f = parse_filters(&params(&[
            ("min_price", "cheap"),
            ("max_price", "NaN"),
            ("bedrooms", "2.5"),
            ("bathrooms", "inf"),
            ("city", "Austin"),
        ]));
        assert_eq!(f.min_price, 0.0);
        assert_eq!(f.max_price, 0.0);
        assert_eq!(f.bedrooms, 0);
        assert_eq!(f.bathrooms, 0.0);
        assert_eq!(f.city, "Austin");
    }

    #[test]
    fn unknown_params_are_ignored() {
        let f = parse_filters(&params(&[("sort", "price"), ("offset", "40")]));
        assert_eq!(f, SearchFilters::default());
    }
}
