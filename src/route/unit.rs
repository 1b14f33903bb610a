//! The `RouteUnit` trait.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};

use crate::route::{HandlerError, Middleware, RouteContext, Verb};

/// A self-contained handler bound to one method + endpoint pair.
///
/// Implementations are constructed by the loader, initialized once with the
/// shared [`RouteContext`], and then shared across every request task.
#[async_trait]
pub trait RouteUnit: Send + Sync {
    /// Identity key, unique across the registry.
    fn id(&self) -> &str;

    fn method(&self) -> Verb;

    /// Endpoint template, e.g. `/users/:id` or `/files/*path`.
    fn endpoint(&self) -> &str;

    /// Bind priority. Lower binds first.
    fn order(&self) -> i32 {
        0
    }

    /// Middlewares run in declared order before `exec`.
    fn middlewares(&self) -> Vec<Arc<dyn Middleware>> {
        Vec::new()
    }

    /// One-time setup with the shared dependencies.
    async fn init(&mut self, _ctx: &RouteContext) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Handle one request.
    async fn exec(&self, req: Request<Body>) -> Result<Response, HandlerError>;
}

impl std::fmt::Debug for dyn RouteUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteUnit")
            .field("id", &self.id())
            .field("endpoint", &self.endpoint())
            .finish()
    }
}
