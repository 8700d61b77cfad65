//! HTTP handlers.

use crate::api::{AirthingsApi, TokenSource};
use crate::metrics::{encode_records, exposition::CONTENT_TYPE, AirthingsCollector};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;

/// Scrape the Airthings cloud and render the result.
///
/// An authentication failure still yields a successful response carrying only
/// the build info gauge; the collector has already logged the cause.
pub async fn metrics<A, T>(State(collector): State<Arc<AirthingsCollector<A, T>>>) -> Response
where
    A: AirthingsApi,
    T: TokenSource,
{
    let records = collector.collect().await.unwrap_or_default();

    match encode_records(&records) {
        Ok(body) => ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics").into_response()
        }
    }
}

/// Landing page linking to the metrics.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<html>
<head><title>Airthings Exporter</title></head>
<body>
<h1>Airthings Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
</body>
</html>
"#;
