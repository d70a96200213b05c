//! Market insight routes; all take the listing search filters.

use crate::handlers::{market_summary, median_by_zip, price_histogram, property_types};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn insight_routes(state: AppState) -> Router {
    Router::new()
        .route("/insights/summary", get(market_summary))
        .route("/insights/price-histogram", get(price_histogram))
        .route("/insights/median-by-zip", get(median_by_zip))
        .route("/insights/property-types", get(property_types))
        .with_state(state)
}
