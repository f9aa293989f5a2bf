//! Subsync service entry point.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use subsync::adapters::billing::BillingCheckoutAdapter;
use subsync::adapters::http::{api_router, AppState};
use subsync::adapters::postgres::PostgresSubscriptionStore;
use subsync::config::AppConfig;
use subsync::domain::subscription::WebhookVerifier;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));

    if config.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;
    config.validate().map_err(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(&config);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "Starting subsync"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .connect(&config.database.url)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to database");
            std::io::Error::other(format!("Database error: {}", e))
        })?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
            tracing::error!(error = %e, "Migration failed");
            std::io::Error::other(format!("Migration error: {}", e))
        })?;
        tracing::info!("Database migrations applied");
    }

    let catalog = config.billing.plan_catalog().map_err(|e| {
        eprintln!("Invalid plan mapping: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;
    if catalog.is_empty() {
        tracing::warn!("No billing plans configured; checkout creation will reject all plans");
    }

    let state = AppState {
        store: Arc::new(PostgresSubscriptionStore::new(pool)),
        checkout_provider: Arc::new(BillingCheckoutAdapter::new(
            config.billing.api_key.clone(),
            config.billing.api_base_url.clone(),
            catalog,
        )),
        webhook_verifier: Arc::new(WebhookVerifier::new(config.billing.webhook_secret.clone())),
    };

    let app = axum::Router::new()
        .nest("/api", api_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}
