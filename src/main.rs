use std::error::Error;
use std::net::SocketAddr;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use trashcan_map::config::Config;
use trashcan_map::database::{self, schema};
use trashcan_map::state::AppState;
use trashcan_map::web::router::build_router;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        error!("❌ server stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;

    info!("Connecting to database: {}", config.database_url);
    let pool = database::connect(&config.database_url).await?;
    schema::ensure_schema(&pool).await?;

    let listener = bind_with_fallback(&config.host, config.port).await?;
    let app = build_router(AppState::new(pool, config));

    info!("🚀 Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

/// Binds `host:port`, trying `port + 1` once if the first bind fails.
async fn bind_with_fallback(host: &str, port: u16) -> Result<TcpListener, Box<dyn Error>> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    match TcpListener::bind(addr).await {
        Ok(listener) => Ok(listener),
        Err(e) => {
            let Some(fallback_port) = port.checked_add(1) else {
                return Err(e.into());
            };
            warn!(
                "⚠️  Could not bind {}: {}. Trying fallback {}:{}",
                addr, e, host, fallback_port
            );
            let fallback: SocketAddr = format!("{}:{}", host, fallback_port).parse()?;
            Ok(TcpListener::bind(fallback).await?)
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
