//! Route module discovery, registration, ordering and dispatch.

pub mod admin;
pub mod api;
pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod loader;
pub mod observability;
pub mod persistence;
pub mod registry;
pub mod route;

pub use config::EngineConfig;
pub use dispatch::Dispatcher;
pub use http::HttpServer;
pub use lifecycle::{bootstrap, Engine, Shutdown};
pub use loader::{Loader, RouteCatalog};
pub use registry::Registry;
pub use route::RouteUnit;
