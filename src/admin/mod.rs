//! Admin API.
//!
//! Read-only diagnostics over the bound routes, behind a bearer token.

pub mod auth;
pub mod handlers;

use std::sync::Arc;
use std::time::Instant;

use axum::{middleware, routing::get, Router};

use crate::dispatch::BoundRoute;
use crate::registry::EndpointTable;

use self::auth::admin_auth_middleware;
use self::handlers::*;

/// Snapshot of the engine shared with admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub api_key: Arc<str>,
    pub endpoints: Arc<EndpointTable>,
    pub bound: Arc<[BoundRoute]>,
    pub started_at: Instant,
}

impl AdminState {
    pub fn new(api_key: &str, endpoints: EndpointTable, bound: Vec<BoundRoute>) -> Self {
        Self {
            api_key: Arc::from(api_key),
            endpoints: Arc::new(endpoints),
            bound: bound.into(),
            started_at: Instant::now(),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/routes", get(get_routes))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
