//! Router assembly: API routes plus CORS and request-logging layers.

mod common;
mod insights;
mod properties;

pub use common::{common_routes, ApiDoc};
pub use insights::insight_routes;
pub use properties::property_routes;

use crate::error::ConfigError;
use crate::state::AppState;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::Router;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;

const CORS_MAX_AGE: Duration = Duration::from_secs(300);

/// CORS for the single configured frontend origin, with credentials.
pub fn cors_layer(frontend_url: &str) -> Result<CorsLayer, ConfigError> {
    let origin = HeaderValue::from_str(frontend_url).map_err(|_| ConfigError::Origin(frontend_url.to_string()))?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-csrf-token"),
        ])
        .expose_headers([header::LINK])
        .allow_credentials(true)
        .max_age(CORS_MAX_AGE))
}

/// All `/api` routes without middleware.
pub fn api_routes(state: AppState) -> Router {
    Router::new().nest(
        "/api",
        Router::new()
            .merge(common_routes(state.clone()))
            .merge(property_routes(state.clone()))
            .merge(insight_routes(state)),
    )
}

/// The full application: routes wrapped in request logging, then CORS.
pub fn app(state: AppState, frontend_url: &str) -> Result<Router, ConfigError> {
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );
    Ok(api_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace)
            .layer(cors_layer(frontend_url)?),
    ))
}
