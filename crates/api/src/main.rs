use std::net::{IpAddr, SocketAddr};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitals_api::config::{ConfigError, ServerConfig};
use vitals_api::router::build_app_router;
use vitals_api::state::AppState;
use vitals_ingest::listener::IngestListener;
use vitals_ingest::status::ListenerHandle;

/// Fatal errors during startup or while serving.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid HOST address '{0}'")]
    Host(String),

    #[error("Reading Store unavailable: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to apply migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "vitals_api=info,vitals_ingest=info,vitals_db=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Fatal error, exiting");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Reading Store ---
    let pool = vitals_db::create_pool(&config.database_url, config.db_max_connections).await?;
    tracing::info!(url = %config.database_url, "Reading Store pool created");

    vitals_db::health_check(&pool).await?;
    vitals_db::run_migrations(&pool).await?;
    tracing::info!("Reading Store migrations applied");

    // --- Ingestion listener ---
    // A broker failure leaves the query surface running without ingestion.
    let listener_status = ListenerHandle::new();
    let ingest = IngestListener::start_mqtt(&config.mqtt, pool.clone(), listener_status.clone())
        .await
        .ok();
    if ingest.is_none() {
        tracing::warn!(
            broker = %config.mqtt.broker,
            port = config.mqtt.port,
            "Serving queries without ingestion"
        );
    }

    // --- App state ---
    let state = AppState {
        pool: pool.clone(),
        listener: listener_status,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let ip: IpAddr = config
        .host
        .parse()
        .map_err(|_| StartupError::Host(config.host.clone()))?;
    let addr = SocketAddr::new(ip, config.port);
    tracing::info!(%addr, "Starting server");

    let tcp = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(tcp, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    if let Some(ingest) = ingest {
        ingest.shutdown().await;
    }
    pool.close().await;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
///
/// If a handler cannot be installed the corresponding branch never
/// resolves, so the other signal still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
