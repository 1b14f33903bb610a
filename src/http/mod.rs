//! HTTP listener glue.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum::serve, base layers)
//!     → request.rs (assign / propagate x-request-id)
//!     → route bound by the dispatcher
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{apply_base_layers, HttpServer};
