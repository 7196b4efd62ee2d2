//! Storyhaven API Gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Actor identification (trusted upstream headers)
//! - Request routing
//! - Observability (logging, metrics, tracing)
//!
//! Lifecycle and comment rules live in storyhaven-common; this binary wires
//! them to HTTP and performs the ownership checks the controller leaves to
//! its caller.

mod actor;
mod handlers;
mod middleware;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use storyhaven_common::{
    config::AppConfig,
    db::{DbPool, Repository},
    metrics, CommentEngine, CommentPolicy, LifecycleController,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, Level};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub repo: Repository,
    pub lifecycle: LifecycleController,
    pub comments: CommentEngine,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .json()
        .init();

    info!("Starting Storyhaven API Gateway v{}", storyhaven_common::VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    let config = Arc::new(config);

    // Initialize metrics and the Prometheus scrape endpoint
    metrics::register_metrics();
    if config.observability.metrics_port > 0 {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()?;
        info!("Metrics exposed on {}", metrics_addr);
    }

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    let repo = Repository::new(db.clone());
    let lifecycle = LifecycleController::new(repo.clone(), &config.content);
    let comments = CommentEngine::new(repo.clone(), CommentPolicy::from_config(&config.content));

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
        repo,
        lifecycle,
        comments,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let api_routes = Router::new()
        // Health endpoints (no auth)
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        // Story endpoints
        .route("/stories", post(handlers::stories::create_story))
        .route("/stories/{id}", get(handlers::stories::get_story))
        .route("/stories/{id}", delete(handlers::stories::delete_story))
        .route("/stories/{id}/views", post(handlers::stories::record_view))
        // Lifecycle transitions
        .route("/stories/{id}/publish", post(handlers::stories::publish))
        .route("/stories/{id}/archive", post(handlers::stories::archive))
        .route("/stories/{id}/trash", post(handlers::stories::trash))
        .route(
            "/stories/{id}/restore-from-archive",
            post(handlers::stories::restore_from_archive),
        )
        .route(
            "/stories/{id}/restore-from-trash",
            post(handlers::stories::restore_from_trash),
        )
        .route(
            "/stories/{id}/publish-from-archive",
            post(handlers::stories::publish_from_archive),
        )
        // Bookmark endpoints
        .route(
            "/stories/{id}/bookmark",
            post(handlers::bookmarks::create_bookmark),
        )
        .route(
            "/stories/{id}/bookmark",
            delete(handlers::bookmarks::delete_bookmark),
        )
        .route(
            "/stories/{id}/bookmarks",
            get(handlers::bookmarks::count_bookmarks),
        )
        // Comment endpoints
        .route(
            "/stories/{id}/comments",
            post(handlers::comments::create_comment),
        )
        .route(
            "/stories/{id}/comments",
            get(handlers::comments::list_comments),
        )
        .route("/comments/{id}", patch(handlers::comments::edit_comment))
        .route("/comments/{id}", delete(handlers::comments::delete_comment))
        .route(
            "/comments/{id}/restore",
            post(handlers::comments::restore_comment),
        )
        .route(
            "/users/{id}/comments",
            get(handlers::comments::list_author_comments),
        )
        .route(
            "/users/{id}/history",
            get(handlers::stories::view_history),
        );

    // Compose the app
    Router::new()
        .nest("/v1", api_routes)
        .layer(axum::middleware::from_fn(middleware::metrics::track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
