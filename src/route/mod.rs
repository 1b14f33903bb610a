//! Route unit contract.
//!
//! # Data Flow
//! ```text
//! manifest (routes/*.toml)
//!     → loader resolves a constructor from the catalog
//!     → RouteUnit instance (Discovered)
//!     → init(RouteContext) (Initialized)
//!     → registry (Registered)
//!     → dispatcher binds it behind the adapter (Bound)
//!
//! Per request:
//!     middleware[0] → middleware[1] → ... → exec
//! ```
//!
//! # Design Decisions
//! - `init` takes `&mut self`; once registered a unit is only reachable
//!   through `Arc<dyn RouteUnit>`, so it cannot be initialized twice
//! - Middlewares are ordered and may short-circuit by returning a response
//! - Handler failures are values (`HandlerError`), never panics

pub mod context;
pub mod error;
pub mod middleware;
pub mod unit;
pub mod verb;

pub use context::RouteContext;
pub use error::HandlerError;
pub use middleware::{Middleware, Next};
pub use unit::RouteUnit;
pub use verb::{Verb, VerbParseError};
