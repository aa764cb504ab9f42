//! Labsite Server - Research Laboratory Website Backend
//!
//! REST API server for visit analytics, push notification delivery and
//! scheduled dashboard snapshots.

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use labsite_server::{
    api,
    config::AppConfig,
    services::Services,
    store::{KvStore, MemoryStore, RedisStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("labsite_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Labsite Server v{}", env!("CARGO_PKG_VERSION"));

    // Select the key-value store
    let store: Arc<dyn KvStore> = match &config.redis.url {
        Some(url) => {
            let store = RedisStore::connect(url)
                .await
                .expect("Failed to connect to the key-value store");
            tracing::info!("Connected to Redis");
            Arc::new(store)
        }
        None => {
            tracing::warn!(
                "No key-value store configured; using the in-process store (development only)"
            );
            Arc::new(MemoryStore::new())
        }
    };

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create services
    let services = Services::new(store, &config).expect("Failed to create services");
    if config.push.vapid_private_key.is_none() {
        tracing::warn!("VAPID credentials not configured; push broadcast is disabled");
    }

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Visit analytics
        .route("/track", post(api::track::track))
        .route("/analytics", get(api::analytics::get_analytics))
        // Geolocation
        .route("/geo/lookup", post(api::geo::lookup_batch))
        // Push notifications
        .route("/push/public-key", get(api::push::public_key))
        .route("/push/subscribe", post(api::push::subscribe))
        .route("/push/unsubscribe", post(api::push::unsubscribe))
        .route("/push/broadcast", post(api::push::broadcast))
        // Dashboard snapshots
        .route("/backup/run", post(api::backup::run_backup))
        .route("/backup/snapshots", get(api::backup::list_snapshots))
        .route("/backup/snapshots/:date", get(api::backup::get_snapshot))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
