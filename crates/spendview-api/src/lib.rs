//! HTTP server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::transactions: list fragment, "View More", approval toggles
//! - routes::filter: employee filter selection

pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use spendview_config::Config;
use spendview_core::TransactionView;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub view: Arc<TransactionView>,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::filter::{api_filter, htmx_filter};
    use routes::transactions::{
        api_load_more, api_set_approval, api_view, htmx_load_more, htmx_set_approval,
        htmx_transactions_list, page_index,
    };

    let api = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/view", get(api_view))
        .route("/api/filter", post(api_filter))
        .route("/api/transactions/more", post(api_load_more))
        .route("/api/transactions/:id/approval", post(api_set_approval))
        .layer(CorsLayer::permissive());

    Router::new()
        // HTMX page routes
        .route("/", get(page_index))
        // HTMX partial routes
        .route("/transactions/list", get(htmx_transactions_list))
        .route("/transactions/more", post(htmx_load_more))
        .route("/transactions/:id/approval", post(htmx_set_approval))
        .route("/filter", post(htmx_filter))
        .merge(api)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Spendview</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/tailwindcss@2.2.19/dist/tailwind.min.css">
    <style>
        .htmx-indicator {{ display: none; }}
        .htmx-request .htmx-indicator {{ display: block; }}
        .htmx-request.htmx-indicator {{ display: block; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        spendview_utils::escape_html(title),
        content
    )
}

/// Start the web server
pub async fn start_server(config: Config, view: Arc<TransactionView>) -> std::io::Result<()> {
    let addr = config.bind_address();
    let state = AppState { view, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting Spendview server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Transactions)");
    log::info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router).await?;
    log::info!("Server stopped gracefully");
    Ok(())
}
