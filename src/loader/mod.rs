//! Route discovery.
//!
//! # Data Flow
//! ```text
//! discovery root (directory)
//!     → discovery.rs (walk, sorted)
//!     → manifest.rs (parse TOML: module + options)
//!     → catalog.rs (module name → constructor)
//!     → RouteUnit::init(RouteContext)
//!     → Registry::register
//! ```
//!
//! # Design Decisions
//! - Modules are resolved through an explicit catalog, never loaded as code
//! - Any unresolvable file aborts startup
//! - Each unit's `init` completes before the next file is read

pub mod catalog;
pub mod discovery;
pub mod manifest;

pub use catalog::{CatalogError, ConstructError, ModuleOptions, RouteCatalog, RouteConstructor};
pub use discovery::{DiscoveryError, LoadedRoute, Loader};
pub use manifest::Manifest;
