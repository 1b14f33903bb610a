//! Startup sequence.
//!
//! Order matters: persistence must be connected before any route's `init`,
//! and base layers can only wrap routes that are already bound.

use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::admin::{setup_admin_router, AdminState};
use crate::config::{ConfigError, EngineConfig};
use crate::dispatch::{BindError, BoundRoute, Dispatcher};
use crate::http::{apply_base_layers, HttpServer};
use crate::loader::{DiscoveryError, Loader, RouteCatalog};
use crate::observability::logging::{events, topics};
use crate::observability::RouteLogger;
use crate::persistence::{Persistence, PersistenceError};
use crate::registry::Registry;
use crate::route::RouteContext;

/// Anything that aborts startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to connect persistence: {0}")]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fully bootstrapped engine: every discovered route registered and bound.
pub struct Engine {
    router: Router,
    registry: Registry,
    bound: Vec<BoundRoute>,
    config: EngineConfig,
}

impl Engine {
    /// Bind an already populated registry and install the base layers.
    pub fn from_registry(registry: Registry, config: &EngineConfig) -> Result<Self, StartupError> {
        let (router, bound) = Dispatcher::new().bind_all(&registry)?.into_parts();
        let router = apply_base_layers(router, config);

        tracing::info!(
            topic = topics::DISPATCH,
            event = events::READY,
            routes = bound.len(),
            endpoints = registry.endpoints().len(),
            "Handlers loaded"
        );

        Ok(Self {
            router,
            registry,
            bound,
            config: config.clone(),
        })
    }

    /// Router with every bound route and the base layers.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Bound routes in binding order.
    pub fn bound(&self) -> &[BoundRoute] {
        &self.bound
    }

    /// Admin router over this engine's routes.
    pub fn admin_router(&self, api_key: &str) -> Router {
        setup_admin_router(AdminState::new(
            api_key,
            self.registry.endpoints().clone(),
            self.bound.clone(),
        ))
    }

    /// Serve until `shutdown` fires. Also serves the admin API when enabled.
    pub async fn serve(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), StartupError> {
        let mut server = HttpServer::new(self.router.clone(), self.config.clone());
        if self.config.admin.enabled {
            server = server.with_admin(self.admin_router(&self.config.admin.api_key));
        }
        server.run(listener, shutdown).await?;
        Ok(())
    }
}

/// Connect persistence, discover and register every route, then bind them.
///
/// The first failure aborts the whole sequence.
pub async fn bootstrap(
    config: &EngineConfig,
    catalog: &RouteCatalog,
    persistence: Arc<dyn Persistence>,
) -> Result<Engine, StartupError> {
    persistence.connect().await?;
    tracing::info!(
        topic = topics::PERSISTENCE,
        event = events::INIT,
        backend = persistence.name(),
        "Persistence connected"
    );

    let context = RouteContext::new(RouteLogger::root(), persistence);
    let mut registry = Registry::new(config.routes.base_path.clone());

    let loaded = Loader::new(catalog, context)
        .discover_into(&config.routes.root, &mut registry)
        .await?;
    tracing::info!(
        topic = topics::LOADER,
        event = events::READY,
        root = %config.routes.root.display(),
        count = loaded,
        "Route modules discovered"
    );

    Engine::from_registry(registry, config)
}
