//! The authoritative set of loaded route units.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::registry::endpoint::{resolve_endpoint, EndpointError, EndpointTable};
use crate::route::RouteUnit;

/// Two units declared the same id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("route `{id}` is already registered")]
pub struct DuplicateRouteError {
    pub id: String,
}

/// Why a unit could not be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Duplicate(#[from] DuplicateRouteError),

    #[error("route `{id}` has an invalid endpoint: {source}")]
    Endpoint {
        id: String,
        #[source]
        source: EndpointError,
    },
}

/// Route id → unit, in registration order.
pub struct Registry {
    base_path: String,
    units: Vec<Arc<dyn RouteUnit>>,
    index: HashMap<String, usize>,
    endpoints: EndpointTable,
}

impl Registry {
    /// Create an empty registry. `base_path` prefixes every endpoint.
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            units: Vec::new(),
            index: HashMap::new(),
            endpoints: EndpointTable::new(),
        }
    }

    /// Add a unit.
    ///
    /// Fails without touching any state when the id is taken or the endpoint
    /// template is malformed.
    pub fn register(&mut self, unit: Box<dyn RouteUnit>) -> Result<Arc<dyn RouteUnit>, RegistryError> {
        let id = unit.id().to_string();
        if self.index.contains_key(&id) {
            return Err(DuplicateRouteError { id }.into());
        }

        let endpoint = resolve_endpoint(&self.base_path, unit.endpoint())
            .map_err(|source| RegistryError::Endpoint { id: id.clone(), source })?;

        self.endpoints.insert(&id, endpoint);
        let unit: Arc<dyn RouteUnit> = Arc::from(unit);
        self.index.insert(id, self.units.len());
        self.units.push(unit.clone());

        Ok(unit)
    }

    /// Units in registration order.
    pub fn all(&self) -> &[Arc<dyn RouteUnit>] {
        &self.units
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn RouteUnit>> {
        self.index.get(id).map(|&i| &self.units[i])
    }

    pub fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }

    /// Resolved endpoint for a registered id.
    pub fn endpoint_of(&self, id: &str) -> Option<&str> {
        self.endpoints.get(id)
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("base_path", &self.base_path)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}
