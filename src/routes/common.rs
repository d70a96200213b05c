//! Common routes: health and the OpenAPI document.

use crate::handlers::{health, HealthBody};
use crate::model::{Listing, MarketSummary, PriceBucket, PropertyPage, PropertyTypeCount, ZipStats};
use crate::state::AppState;
use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Listings API",
        description = "Read-only search over real-estate listings. Malformed or out-of-range \
                       query parameters are ignored and replaced by their defaults; they never \
                       cause a 4xx response."
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::properties::list_properties,
        crate::handlers::properties::get_property,
        crate::handlers::insights::market_summary,
        crate::handlers::insights::price_histogram,
        crate::handlers::insights::median_by_zip,
        crate::handlers::insights::property_types,
    ),
    components(schemas(
        Listing,
        PropertyPage,
        HealthBody,
        MarketSummary,
        PriceBucket,
        ZipStats,
        PropertyTypeCount
    ))
)]
pub struct ApiDoc;

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// GET /health (database check) and GET /openapi.json.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/openapi.json", get(openapi))
        .with_state(state)
}
