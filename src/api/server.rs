use anyhow::Context;
use axum::{http::HeaderValue, routing::get, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::handlers::{self, AppState};

/// Build the CORS layer: the listed origins, or any origin when none are set
fn cors_layer(allowed_origins: Option<&[String]>) -> anyhow::Result<CorsLayer> {
    let origin = match allowed_origins {
        Some(origins) if !origins.is_empty() => {
            log::info!("CORS configured for origins: {}", origins.join(","));
            let origin_list = origins
                .iter()
                .map(|s| {
                    s.parse::<HeaderValue>()
                        .with_context(|| format!("Invalid CORS origin: {}", s))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            AllowOrigin::list(origin_list)
        }
        _ => {
            log::warn!("CORS: Allowing all origins (development mode). Set ALLOWED_ORIGINS env var for production.");
            AllowOrigin::from(Any)
        }
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

pub fn create_router(
    manager: AppState,
    allowed_origins: Option<&[String]>,
) -> anyhow::Result<Router> {
    let cors = cors_layer(allowed_origins)?;

    Ok(Router::new()
        .route("/health", get(handlers::health_check))
        .route("/address", get(handlers::new_address_handler))
        .route("/balance", get(handlers::balance_handler))
        .route("/utxos", get(handlers::utxos_handler))
        .layer(cors)
        .with_state(manager))
}

pub async fn start_server(
    addr: &str,
    manager: AppState,
    allowed_origins: Option<&[String]>,
) -> anyhow::Result<()> {
    let app = create_router(manager, allowed_origins)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            log::info!("Received SIGTERM signal");
        },
    }

    log::info!("Shutdown signal received, exiting gracefully...");
}
