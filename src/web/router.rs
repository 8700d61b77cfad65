//! Web application router and middleware setup.

use crate::api::{AirthingsApi, TokenSource};
use crate::metrics::AirthingsCollector;
use crate::web::config::METRICS_PATH;
use crate::web::handlers;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the exporter application: an index page and the metrics page.
pub fn create_app<A, T>(collector: Arc<AirthingsCollector<A, T>>) -> Router
where
    A: AirthingsApi + 'static,
    T: TokenSource + 'static,
{
    Router::new()
        .route("/", get(handlers::index))
        .route(METRICS_PATH, get(handlers::metrics::<A, T>))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(collector)
}
