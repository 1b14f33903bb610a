//! Per-route middleware chain.
//!
//! # Responsibilities
//! - Define the `Middleware` trait route units declare
//! - Drive the chain in declared order, ending in the unit's `exec`
//!
//! # Design Decisions
//! - A middleware short-circuits by returning without calling `next.run`
//! - `Next` borrows the chain; nothing is cloned per request

use std::sync::Arc;

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};

use crate::route::{HandlerError, RouteUnit};

/// A request-processing step run before a unit's `exec`.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    async fn handle(&self, req: Request<Body>, next: Next<'_>) -> Result<Response, HandlerError>;
}

/// The remainder of a middleware chain.
pub struct Next<'a> {
    middlewares: &'a [Arc<dyn Middleware>],
    unit: &'a dyn RouteUnit,
}

impl<'a> Next<'a> {
    pub fn new(middlewares: &'a [Arc<dyn Middleware>], unit: &'a dyn RouteUnit) -> Self {
        Self { middlewares, unit }
    }

    /// Pass the request to the next middleware, or to `exec` when none remain.
    pub async fn run(self, req: Request<Body>) -> Result<Response, HandlerError> {
        match self.middlewares.split_first() {
            Some((current, rest)) => {
                tracing::trace!(
                    route_id = %self.unit.id(),
                    middleware = %current.name(),
                    "Running middleware"
                );
                current
                    .handle(req, Next { middlewares: rest, unit: self.unit })
                    .await
            }
            None => self.unit.exec(req).await,
        }
    }

    /// Number of middlewares still to run.
    pub fn remaining(&self) -> usize {
        self.middlewares.len()
    }
}
