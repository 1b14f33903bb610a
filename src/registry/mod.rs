//! Route registry.
//!
//! # Data Flow
//! ```text
//! Box<dyn RouteUnit> (initialized)
//!     → route_registry.rs (uniqueness check)
//!     → endpoint.rs (resolve template under base path)
//!     → EndpointTable entry + Arc<dyn RouteUnit>
//! ```
//!
//! # Design Decisions
//! - Registration order is discovery order; sorting belongs to the dispatcher
//! - A failed registration never mutates the registry
//! - Explicitly owned by the bootstrap sequence, never global

pub mod endpoint;
pub mod route_registry;

pub use endpoint::{resolve_endpoint, EndpointError, EndpointTable};
pub use route_registry::{DuplicateRouteError, Registry, RegistryError};
