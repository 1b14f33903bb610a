//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Provide the logger handle injected into route units
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level
//! - Route loggers are spans, so every event a unit emits carries its id

use tracing::Span;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Topic names attached to startup events.
pub mod topics {
    pub const SERVER: &str = "server";
    pub const PERSISTENCE: &str = "persistence";
    pub const LOADER: &str = "loader";
    pub const DISPATCH: &str = "dispatch";
    pub const HANDLER: &str = "handler";
    pub const ADMIN: &str = "admin";
    pub const PROCESS: &str = "process";
}

/// Event names attached to startup events.
pub mod events {
    pub const INIT: &str = "init";
    pub const READY: &str = "ready";
    pub const ERROR: &str = "error";
    pub const SHUTDOWN: &str = "shutdown";
}

/// Install the global subscriber.
///
/// Returns an error when a subscriber is already installed.
pub fn init_tracing(default_level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("route_engine={default_level},tower_http={default_level}").into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

/// Logger handle shared with route units.
///
/// Cloning is cheap; all clones log into the same span.
#[derive(Debug, Clone)]
pub struct RouteLogger {
    span: Span,
}

impl RouteLogger {
    /// Logger for the engine itself.
    pub fn root() -> Self {
        Self {
            span: tracing::info_span!("engine"),
        }
    }

    /// Child logger tagged with a route id.
    pub fn scoped(&self, route_id: &str) -> Self {
        Self {
            span: tracing::info_span!(parent: &self.span, "route", route_id = %route_id),
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn debug(&self, message: &str) {
        self.span.in_scope(|| tracing::debug!("{}", message));
    }

    pub fn info(&self, message: &str) {
        self.span.in_scope(|| tracing::info!("{}", message));
    }

    pub fn warn(&self, message: &str) {
        self.span.in_scope(|| tracing::warn!("{}", message));
    }

    pub fn error(&self, message: &str) {
        self.span.in_scope(|| tracing::error!("{}", message));
    }
}

impl Default for RouteLogger {
    fn default() -> Self {
        Self::root()
    }
}
