//! Registration-time list of route constructors.
//!
//! A manifest names a module; the catalog maps that name to the constructor
//! that builds the unit. Adding a route module means adding one entry here.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::route::RouteUnit;

/// A constructor failed to build its unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConstructError(pub String);

/// Catalog setup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("module `{0}` is already in the catalog")]
    DuplicateModule(String),
}

/// The `[options]` table of a manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleOptions {
    table: toml::Table,
}

impl ModuleOptions {
    pub fn new(table: toml::Table) -> Self {
        Self { table }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.table.get(key).and_then(toml::Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.table.get(key).and_then(toml::Value::as_integer)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.table.get(key).and_then(toml::Value::as_bool)
    }

    /// Deserialize the whole table into a module's option struct.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ConstructError> {
        toml::Value::Table(self.table.clone())
            .try_into()
            .map_err(|e: toml::de::Error| ConstructError(format!("invalid options: {}", e.message())))
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Builds one route unit from manifest options.
pub type RouteConstructor =
    Arc<dyn Fn(&ModuleOptions) -> Result<Box<dyn RouteUnit>, ConstructError> + Send + Sync>;

/// Module name → constructor.
#[derive(Clone, Default)]
pub struct RouteCatalog {
    modules: BTreeMap<String, RouteConstructor>,
}

impl RouteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constructor under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F) -> Result<(), CatalogError>
    where
        F: Fn(&ModuleOptions) -> Result<Box<dyn RouteUnit>, ConstructError> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.modules.contains_key(&name) {
            return Err(CatalogError::DuplicateModule(name));
        }
        self.modules.insert(name, Arc::new(constructor));
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<&RouteConstructor> {
        self.modules.get(name)
    }

    /// Registered module names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl std::fmt::Debug for RouteCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.modules.keys()).finish()
    }
}
