#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod cors;
mod error;
mod handlers;
mod health;
mod log_error;
mod panic;
mod request_log;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use faultline_config::{Config, Validate};
use faultline_core::Catalog;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

use crate::health::HealthDocument;
use crate::state::AppState;

/// HTTP server exposing the catalog and rendering errors at the boundary
pub struct Server {
    config: Config,
    catalog: Arc<Catalog>,
    api: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration with the standard catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is inconsistent
    pub fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_catalog(config, Arc::new(Catalog::standard()))
    }

    /// Build the server around an already constructed catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is inconsistent
    pub fn with_catalog(config: Config, catalog: Arc<Catalog>) -> anyhow::Result<Self> {
        config.validate()?;

        let listen_address = config.server.listen_address_or_default();

        Ok(Self {
            config,
            catalog,
            api: Router::new(),
            listen_address,
        })
    }

    /// Mount additional routes under the API prefix
    ///
    /// Handlers can return [`ApiError`] and get the same error rendering and
    /// logging as the built-in routes.
    #[must_use]
    pub fn merge_api(mut self, routes: Router) -> Self {
        self.api = self.api.merge(routes);
        self
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Consume the server and return the assembled router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        let server = &self.config.server;
        let state = AppState::new(Arc::clone(&self.catalog), self.config.errors);

        let api = Router::new()
            .route("/hello", get(handlers::hello))
            .route("/errors", get(handlers::list_errors))
            .route("/errors/{code}", get(handlers::get_error))
            .with_state(state.clone())
            .merge(self.api);

        let mut app = Router::new().nest(&server.api_prefix, api);

        // Health check
        if server.health.enabled {
            let document = Arc::new(HealthDocument::from_config(&self.config));
            app = app.route(&server.health.path, get(health::health_handler).with_state(document));
        }

        // Apply middleware layers (innermost first)

        // Panic recovery (innermost, so the boundary renders the panic like any other error)
        app = app.layer(CatchPanicLayer::custom(panic::panic_response));

        // Error boundary
        app = app.layer(axum::middleware::from_fn_with_state(
            state.clone(),
            log_error::log_error_middleware,
        ));

        // Request logging
        if server.request_log.enabled {
            let log_state = request_log::RequestLogState {
                config: Arc::new(server.request_log.clone()),
                app: state,
            };
            app = app.layer(axum::middleware::from_fn_with_state(
                log_state,
                request_log::request_log_middleware,
            ));
        }

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        // CORS
        if let Some(ref cors_config) = server.cors {
            app = app.layer(cors::cors_layer(cors_config));
        }

        app
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.into_router())
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        tracing::info!("server stopped");
        Ok(())
    }
}
