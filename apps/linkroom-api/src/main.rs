use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use linkroom_api::config::Config;
use linkroom_api::db::kv::{KeyValueStore, MemoryStore};
use linkroom_api::routes::ApiDoc;
use linkroom_api::AppState;

#[tokio::main]
async fn main() {
    // Load .env file (silently skip if missing, env vars may be set externally)
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let port = config.port;

    let store = linkroom_api::store::open(&config.database_url, config.db_max_connections)
        .expect("failed to open room store");

    // Sessions and tickets are process-local; a restart logs everybody out.
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

    let cors = match config.cors_origin.as_deref() {
        Some(origin) => CorsLayer::new().allow_origin(AllowOrigin::exact(
            HeaderValue::from_str(origin).expect("CORS_ORIGIN is not a valid header value"),
        )),
        None => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods(Any)
    .allow_headers(Any);

    tracing::info!(
        session_ttl_secs = config.session_ttl_secs,
        cors_origin = config.cors_origin.as_deref().unwrap_or("*"),
        "linkroom-api configured"
    );

    let state = AppState::new(store, kv, config);

    let app = Router::new()
        .merge(linkroom_api::routes::router())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "linkroom-api listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(?err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
