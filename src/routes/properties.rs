//! Listing routes: search and lookup by id.

use crate::handlers::{get_property, list_properties};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn property_routes(state: AppState) -> Router {
    Router::new()
        .route("/properties", get(list_properties))
        .route("/properties/:id", get(get_property))
        .with_state(state)
}
