//! Binding registered units to the listener.
//!
//! # Responsibilities
//! - Order units by `order` ascending, ties by registration order
//! - Attach each unit's method + resolved endpoint behind a `RouteAdapter`
//! - Report every bound unit
//!
//! # Design Decisions
//! - Attachment runs against a clone of the router, so a rejected unit
//!   leaves earlier bindings intact
//! - Any attachment failure is returned; startup treats it as fatal

use std::sync::Arc;

use axum::{body::Body, http::Request, Router};
use serde::Serialize;
use thiserror::Error;

use crate::dispatch::adapter::{catch_reported, panic_message, RouteAdapter};
use crate::observability::logging::{events, topics};
use crate::observability::metrics;
use crate::registry::Registry;
use crate::route::{RouteUnit, Verb};

/// A unit could not be attached to the listener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("route `{id}` has no resolved endpoint")]
    MissingEndpoint { id: String },

    #[error("route `{id}` could not be attached to {method} {endpoint}: {reason}")]
    Rejected {
        id: String,
        method: Verb,
        endpoint: String,
        reason: String,
    },
}

/// One successfully bound unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundRoute {
    pub id: String,
    pub method: Verb,
    pub endpoint: String,
    pub order: i32,
}

/// Units in bind order: `order` ascending, stable for ties.
pub fn bind_order(registry: &Registry) -> Vec<Arc<dyn RouteUnit>> {
    let mut units = registry.all().to_vec();
    units.sort_by_key(|u| u.order());
    units
}

/// Accumulates bindings on an `axum::Router`.
pub struct Dispatcher {
    router: Router,
    bound: Vec<BoundRoute>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_router(Router::new())
    }

    /// Bind on top of an existing router.
    pub fn with_router(router: Router) -> Self {
        Self {
            router,
            bound: Vec::new(),
        }
    }

    /// Bind every registered unit in bind order, stopping at the first failure.
    pub fn bind_all(mut self, registry: &Registry) -> Result<Self, BindError> {
        for unit in bind_order(registry) {
            let endpoint = registry
                .endpoint_of(unit.id())
                .ok_or_else(|| BindError::MissingEndpoint { id: unit.id().to_string() })?
                .to_string();
            self.bind(unit, &endpoint)?;
        }
        Ok(self)
    }

    /// Attach one unit at `endpoint`.
    pub fn bind(&mut self, unit: Arc<dyn RouteUnit>, endpoint: &str) -> Result<&BoundRoute, BindError> {
        let method = unit.method();
        let adapter = RouteAdapter::new(unit.clone());
        let method_router = method.method_router(move |req: Request<Body>| adapter.clone().call(req));

        let candidate = self.router.clone();
        let path = endpoint.to_string();
        // axum rejects conflicting routes by panicking. The panic hook stays
        // quiet here; the rejection is reported once, as the returned error.
        let attached = catch_reported(move || candidate.route(&path, method_router));

        match attached {
            Ok(router) => self.router = router,
            Err(payload) => {
                return Err(BindError::Rejected {
                    id: unit.id().to_string(),
                    method,
                    endpoint: endpoint.to_string(),
                    reason: panic_message(payload.as_ref()),
                });
            }
        }

        tracing::info!(
            topic = topics::DISPATCH,
            event = events::INIT,
            route_id = %unit.id(),
            method = %method,
            endpoint = %endpoint,
            order = unit.order(),
            "Route bound"
        );
        metrics::record_route_bound(unit.id());

        self.bound.push(BoundRoute {
            id: unit.id().to_string(),
            method,
            endpoint: endpoint.to_string(),
            order: unit.order(),
        });
        Ok(&self.bound[self.bound.len() - 1])
    }

    /// Units bound so far, in bind order.
    pub fn bound(&self) -> &[BoundRoute] {
        &self.bound
    }

    pub fn into_parts(self) -> (Router, Vec<BoundRoute>) {
        (self.router, self.bound)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
