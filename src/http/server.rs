//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the dispatcher's router in the base layers (request id, access
//!   log, body limit, timeout)
//! - Serve the route listener and the optional admin listener
//! - Stop both on the shutdown signal

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::EngineConfig;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::observability::logging::{events, topics};

/// Install the base layers around every bound route.
///
/// Must run after binding: axum layers only wrap routes that already exist.
#[allow(deprecated)]
pub fn apply_base_layers(router: Router, config: &EngineConfig) -> Router {
    let mut router = router;

    if config.http.request_timeout_secs > 0 {
        router = router.layer(TimeoutLayer::new(Duration::from_secs(config.http.request_timeout_secs)));
        tracing::debug!(topic = topics::SERVER, event = events::INIT, layer = "timeout", "Middleware loaded");
    }

    router = router.layer(RequestBodyLimitLayer::new(config.http.max_body_bytes));
    tracing::debug!(topic = topics::SERVER, event = events::INIT, layer = "body_limit", "Middleware loaded");

    router = router.layer(propagate_request_id_layer());

    if config.observability.access_log {
        router = router.layer(TraceLayer::new_for_http());
        tracing::debug!(topic = topics::SERVER, event = events::INIT, layer = "access_log", "Middleware loaded");
    }

    router = router.layer(set_request_id_layer());
    tracing::debug!(topic = topics::SERVER, event = events::INIT, layer = "request_id", "Middleware loaded");

    tracing::info!(topic = topics::SERVER, event = events::INIT, "All middlewares loaded");
    router
}

/// HTTP server for the bound routes.
pub struct HttpServer {
    router: Router,
    admin: Option<Router>,
    config: EngineConfig,
}

impl HttpServer {
    pub fn new(router: Router, config: EngineConfig) -> Self {
        Self {
            router,
            admin: None,
            config,
        }
    }

    /// Also serve `admin` on `admin.bind_address`.
    pub fn with_admin(mut self, admin: Router) -> Self {
        self.admin = Some(admin);
        self
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;

        if let Some(admin) = self.admin {
            let admin_listener = TcpListener::bind(&self.config.admin.bind_address).await?;
            let admin_addr = admin_listener.local_addr()?;
            let admin_shutdown = shutdown.resubscribe();
            tokio::spawn(async move {
                tracing::info!(topic = topics::ADMIN, event = events::READY, address = %admin_addr, "Admin API listening");
                if let Err(e) = axum::serve(admin_listener, admin)
                    .with_graceful_shutdown(wait_for(admin_shutdown))
                    .await
                {
                    tracing::error!(topic = topics::ADMIN, event = events::ERROR, error = %e, "Admin API failed");
                }
            });
        }

        tracing::info!(topic = topics::SERVER, event = events::READY, address = %addr, "Listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!(topic = topics::SERVER, event = events::SHUTDOWN, "HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

async fn wait_for(mut shutdown: broadcast::Receiver<()>) {
    let _ = shutdown.recv().await;
}
