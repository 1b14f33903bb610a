//! Shared dependencies injected into `RouteUnit::init`.

use std::sync::Arc;

use crate::observability::logging::RouteLogger;
use crate::persistence::Persistence;

/// Logger and persistence handle shared by every route unit.
#[derive(Clone)]
pub struct RouteContext {
    pub logger: RouteLogger,
    pub persistence: Arc<dyn Persistence>,
}

impl RouteContext {
    pub fn new(logger: RouteLogger, persistence: Arc<dyn Persistence>) -> Self {
        Self { logger, persistence }
    }

    /// Same handles, with the logger scoped to one route id.
    pub fn for_route(&self, route_id: &str) -> Self {
        Self {
            logger: self.logger.scoped(route_id),
            persistence: self.persistence.clone(),
        }
    }
}

impl std::fmt::Debug for RouteContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteContext")
            .field("logger", &self.logger)
            .field("persistence", &self.persistence.name())
            .finish()
    }
}
