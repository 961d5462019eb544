//! # HTTP Server
//!
//! Combines the record and health routers into one axum server and owns
//! the store lifecycle: the injected store is closed after graceful
//! shutdown completes.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::config::HttpServerConfig;
use super::observability_routes::health_routes;
use super::record_routes::record_routes;
use crate::observability::{log_event, Event};
use crate::service::RecordService;
use crate::storage::StorageError;

/// Errors that stop the server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid listen address '{0}': {1}")]
    InvalidAddress(String, std::net::AddrParseError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to close storage: {0}")]
    Storage(#[from] StorageError),
}

/// HTTP server for the record service
pub struct HttpServer {
    config: HttpServerConfig,
    service: RecordService,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, service: RecordService) -> Self {
        let router = Self::build_router(&config, service.clone());
        Self {
            config,
            service,
            router,
        }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig, service: RecordService) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(health_routes())
            .merge(record_routes(service))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Binds the configured address and serves until `shutdown` resolves.
    pub async fn start<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let raw = self.config.socket_addr();
        let addr: SocketAddr = raw
            .parse()
            .map_err(|e| ServerError::InvalidAddress(raw.clone(), e))?;

        let listener = TcpListener::bind(addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` resolves, then
    /// closes the store.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener.local_addr()?;
        info!(event = %Event::ServerListening, addr = %local_addr);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        log_event(Event::ShutdownStart);
        self.service.store().close()?;
        log_event(Event::StorageClosed);

        Ok(())
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl-C handler");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
