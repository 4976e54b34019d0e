use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, request::Parts, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    auth,
    config::{Config, CorsConfig},
    handlers::{self, AppState},
    metrics,
    sheet::{CachedRowSource, LiveRowSource, RowSource},
    signals::shutdown_signal,
};

/// Login bodies are a single small JSON object
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Start the price lookup server
///
/// This function:
/// 1. Initializes metrics (when enabled)
/// 2. Builds the row source and shared state
/// 3. Binds to the configured address
/// 4. Serves requests until SIGTERM/SIGINT, then drains connections
pub async fn start_server(config: Config) -> Result<()> {
    let config = Arc::new(config);

    let metrics_handle = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        Some(Arc::new(metrics::init_metrics()?))
    } else {
        None
    };

    let rows = build_row_source(&config, reqwest::Client::new());
    let state = AppState::new(config.clone(), rows);
    let app = create_router(state, metrics_handle);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting sheet-price on http://{}", addr);
    info!(
        gid = %config.sheet.gid,
        cache_ttl_seconds = config.cache.ttl_seconds,
        admin_login = state_has_login(&config),
        static_dir = config.server.static_dir.as_deref().unwrap_or("-"),
        "Configuration loaded"
    );
    if config.sheet.id.is_none() {
        warn!("sheet.id is not set; price lookups will fail until SHEET_ID is configured");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Live sheet source, wrapped in a TTL memo when `cache.ttl_seconds > 0`
pub fn build_row_source(config: &Config, http_client: reqwest::Client) -> Arc<dyn RowSource> {
    let live = LiveRowSource::new(http_client, config.sheet.clone());

    match config.cache.ttl_seconds {
        0 => Arc::new(live),
        ttl => {
            info!(ttl_seconds = ttl, "Sheet row cache enabled");
            Arc::new(CachedRowSource::new(live, Duration::from_secs(ttl)))
        }
    }
}

/// Create the Axum router with all routes and middleware
pub fn create_router(state: AppState, metrics_handle: Option<Arc<PrometheusHandle>>) -> Router {
    let config = state.config.clone();

    // Admin routes (Bearer token required)
    let admin_routes = Router::new()
        .route(
            "/api/admin/price/:model",
            get(handlers::price::get_admin_price),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    let mut app = Router::new()
        .route("/api/login", post(handlers::login::login))
        .route("/api/price/:model", get(handlers::price::get_price))
        .route("/api/debug", get(handlers::debug::sheet_debug))
        .route("/health", get(handlers::health::health_check))
        .merge(admin_routes)
        .with_state(state);

    if let Some(handle) = metrics_handle {
        app = app.merge(
            Router::new()
                .route(&config.metrics.endpoint, get(handlers::metrics_handler::metrics))
                .with_state(handle),
        );
    }

    app = match config.server.static_dir.as_deref() {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app.route("/", get(handlers::health::index)),
    };

    app.layer(cors_layer(&config.cors))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}

/// Browser CORS policy: configured origin suffixes and prefixes only
fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let cors = cors.clone();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin.to_str().map(|o| cors.allows(o)).unwrap_or(false)
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

fn state_has_login(config: &Config) -> bool {
    config.auth.admin_password.is_some() && config.auth.token_secret.is_some()
}
