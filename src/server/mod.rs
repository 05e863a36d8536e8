//! HTTP server for the intake wizard API
//!
//! Serves the evaluation, generation, and diagnostics endpoints consumed by
//! the browser-based wizard. Intake runs are owned by the client session;
//! the server is stateless apart from the shared gateway client.

pub mod routes;
pub mod state;

pub use state::ServerAppState;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue,
};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Build the application router. Split out from `run_server` so tests can
/// drive the router in-process.
pub fn build_router(state: ServerAppState, cors_origins: Option<Vec<String>>) -> Router {
    // CORS must be the outermost layer so preflight OPTIONS requests are
    // handled before anything else
    let cors = match &cors_origins {
        Some(origins) if !origins.is_empty() => {
            let allowed_origins: Vec<HeaderValue> =
                origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods(Any)
                .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
        }
        _ => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]),
    };

    Router::new()
        .route("/api/evaluate-section", post(routes::evaluate_section))
        .route("/api/generate-summary", post(routes::generate_summary))
        .route("/api/follow-up-questions", post(routes::follow_up_questions))
        .route("/api/generate-concept", post(routes::generate_concept))
        .route("/api/generate-mockup", post(routes::generate_mockup))
        .route("/api/diagnostics", get(routes::diagnostics))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server until ctrl-c
pub async fn run_server(
    port: u16,
    bind: &str,
    state: ServerAppState,
    cors_origins: Option<Vec<String>>,
) -> Result<(), String> {
    let key_env = state.gateway.config().api_key_env.clone();
    let key_set = state.gateway.key_set();

    let app = build_router(state, cors_origins.clone());

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    let cors_display = match &cors_origins {
        Some(origins) if !origins.is_empty() => origins.join(", "),
        _ => "*".to_string(),
    };

    println!("Design Intake server listening on http://{}", addr);
    println!("  CORS origins: {}", cors_display);
    if key_set {
        println!("  AI credential: set ({})", key_env);
    } else {
        println!(
            "  AI credential: NOT set ({}) - evaluation runs on the fallback heuristic",
            key_env
        );
    }

    log::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {}", e))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    log::info!("Shutdown signal received, stopping server...");
}
