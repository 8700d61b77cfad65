//! HTTP surface of the exporter.
//!
//! Serves an informational index page at `/` and the scrape endpoint at
//! `/metrics`. Nothing else is routed.

pub mod config;
pub mod handlers;
pub mod router;

// Re-export commonly used items
pub use config::WebConfig;
pub use router::create_app;

use crate::api::{AirthingsApi, TokenSource};
use crate::error::{ExporterError, Result};
use crate::metrics::AirthingsCollector;
use std::sync::Arc;
use tracing::info;

/// Start the web server and serve scrapes until it fails.
pub async fn start_web_server<A, T>(
    config: WebConfig,
    collector: Arc<AirthingsCollector<A, T>>,
) -> Result<()>
where
    A: AirthingsApi + 'static,
    T: TokenSource + 'static,
{
    let app = create_app(collector);
    let addr = config.bind_address()?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ExporterError::web_server_error(format!("Failed to bind to address: {}", e)))?;

    info!("Listening on http://{}", addr);
    info!("Metrics available at http://{}{}", addr, config.metrics_path());

    axum::serve(listener, app)
        .await
        .map_err(|e| ExporterError::web_server_error(format!("Server error: {}", e)))?;

    Ok(())
}
