//! Filesystem discovery of route manifests.
//!
//! # Responsibilities
//! - Walk the discovery root recursively in a stable order
//! - Resolve each manifest to a catalog constructor and build the unit
//! - Run `init` with the shared context before handing the unit on
//!
//! # Design Decisions
//! - Fail fast: the first bad file aborts the whole load
//! - Every non-hidden file must be a manifest; strays are errors, not skips
//! - Walk order is sorted by file name so restarts load identically

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::loader::catalog::{ConstructError, RouteCatalog};
use crate::loader::manifest::{Manifest, MANIFEST_EXTENSION};
use crate::observability::logging::{events, topics};
use crate::registry::{Registry, RegistryError};
use crate::route::{HandlerError, RouteContext, RouteUnit};

/// A route module could not be discovered, built, or initialized.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to walk `{}`: {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{}` is not a route manifest (expected .toml)", .path.display())]
    UnsupportedFile { path: PathBuf },

    #[error("failed to parse `{}`: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("`{}` names unknown module `{module}`", .path.display())]
    UnknownModule { path: PathBuf, module: String },

    #[error("module `{module}` from `{}` failed to construct: {source}", .path.display())]
    Construct {
        path: PathBuf,
        module: String,
        #[source]
        source: ConstructError,
    },

    #[error("route `{id}` from `{}` failed to initialize: {source}", .path.display())]
    Init {
        path: PathBuf,
        id: String,
        #[source]
        source: HandlerError,
    },

    #[error("failed to register `{}`: {source}", .path.display())]
    Register {
        path: PathBuf,
        #[source]
        source: RegistryError,
    },
}

/// An initialized unit and the manifest it came from.
pub struct LoadedRoute {
    pub source: PathBuf,
    pub unit: Box<dyn RouteUnit>,
}

impl std::fmt::Debug for LoadedRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedRoute")
            .field("source", &self.source)
            .field("id", &self.unit.id())
            .finish()
    }
}

/// Turns a directory of manifests into initialized route units.
pub struct Loader<'a> {
    catalog: &'a RouteCatalog,
    context: RouteContext,
}

impl<'a> Loader<'a> {
    pub fn new(catalog: &'a RouteCatalog, context: RouteContext) -> Self {
        Self { catalog, context }
    }

    /// List every manifest under `root`, recursively, in stable order.
    pub fn scan(root: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = entry.map_err(|source| DiscoveryError::Walk {
                root: root.to_path_buf(),
                source,
            })?;
            if entry.file_type().is_dir() {
                continue;
            }
            let path = entry.into_path();
            if path.extension().and_then(|e| e.to_str()) != Some(MANIFEST_EXTENSION) {
                return Err(DiscoveryError::UnsupportedFile { path });
            }
            files.push(path);
        }

        Ok(files)
    }

    /// Build and initialize the unit described by one manifest.
    pub async fn load_file(&self, path: &Path) -> Result<Box<dyn RouteUnit>, DiscoveryError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| DiscoveryError::Io { path: path.to_path_buf(), source })?;

        let manifest = Manifest::parse(&content)
            .map_err(|source| DiscoveryError::Parse { path: path.to_path_buf(), source })?;

        let constructor = self
            .catalog
            .resolve(&manifest.module)
            .ok_or_else(|| DiscoveryError::UnknownModule {
                path: path.to_path_buf(),
                module: manifest.module.clone(),
            })?;

        let mut unit = constructor(&manifest.module_options()).map_err(|source| DiscoveryError::Construct {
            path: path.to_path_buf(),
            module: manifest.module.clone(),
            source,
        })?;

        let ctx = self.context.for_route(unit.id());
        unit.init(&ctx).await.map_err(|source| DiscoveryError::Init {
            path: path.to_path_buf(),
            id: unit.id().to_string(),
            source,
        })?;

        tracing::debug!(
            topic = topics::LOADER,
            event = events::INIT,
            route_id = %unit.id(),
            module = %manifest.module,
            path = ?path,
            "Route initialized"
        );

        Ok(unit)
    }

    /// Load every manifest under `root`, in discovery order.
    pub async fn discover(&self, root: &Path) -> Result<Vec<LoadedRoute>, DiscoveryError> {
        let mut loaded = Vec::new();
        for path in Self::scan(root)? {
            let unit = self.load_file(&path).await?;
            loaded.push(LoadedRoute { source: path, unit });
        }
        Ok(loaded)
    }

    /// Load and register every manifest under `root`, stopping at the first
    /// failure. Returns the number of units registered.
    pub async fn discover_into(&self, root: &Path, registry: &mut Registry) -> Result<usize, DiscoveryError> {
        let files = Self::scan(root)?;
        tracing::info!(
            topic = topics::LOADER,
            event = events::INIT,
            root = ?root,
            files = files.len(),
            "Discovering routes"
        );

        for path in &files {
            let unit = self.load_file(path).await?;
            registry
                .register(unit)
                .map_err(|source| DiscoveryError::Register { path: path.clone(), source })?;
        }
        Ok(files.len())
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::catalog::ModuleOptions;
    use crate::observability::logging::RouteLogger;
    use crate::persistence::MemoryStore;
    use crate::registry::DuplicateRouteError;
    use crate::route::Verb;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request, response::{IntoResponse, Response}};
    use serde::Deserialize;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[derive(Deserialize)]
    struct StaticOptions {
        id: String,
        endpoint: String,
        #[serde(default)]
        fail_init: bool,
    }

    struct Static {
        opts: StaticOptions,
        inits: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RouteUnit for Static {
        fn id(&self) -> &str {
            &self.opts.id
        }

        fn method(&self) -> Verb {
            Verb::Get
        }

        fn endpoint(&self) -> &str {
            &self.opts.endpoint
        }

        async fn init(&mut self, _ctx: &RouteContext) -> Result<(), HandlerError> {
            self.inits.fetch_add(1, Ordering::SeqCst);
            if self.opts.fail_init {
                return Err(HandlerError::new("no upstream"));
            }
            Ok(())
        }

        async fn exec(&self, _req: Request<Body>) -> Result<Response, HandlerError> {
            Ok("static".into_response())
        }
    }

    fn catalog(inits: Arc<AtomicUsize>) -> RouteCatalog {
        let mut catalog = RouteCatalog::new();
        catalog
            .register("static", move |options: &ModuleOptions| {
                let opts: StaticOptions = options.parse()?;
                Ok(Box::new(Static { opts, inits: inits.clone() }) as Box<dyn RouteUnit>)
            })
            .unwrap();
        catalog
    }

    fn context() -> RouteContext {
        RouteContext::new(RouteLogger::root(), Arc::new(MemoryStore::new(None)))
    }

    fn write_manifest(dir: &Path, rel: &str, id: &str, endpoint: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            path,
            format!("module = \"static\"\n[options]\nid = \"{id}\"\nendpoint = \"{endpoint}\"\n"),
        )
        .unwrap();
    }

    #[test]
    fn test_scan_is_recursive_sorted_and_skips_hidden() {
        let temp_dir = TempDir::new().unwrap();
        write_manifest(temp_dir.path(), "b.toml", "b", "/b");
        write_manifest(temp_dir.path(), "a/z.toml", "z", "/z");
        write_manifest(temp_dir.path(), "a/c.toml", "c", "/c");
        fs::write(temp_dir.path().join(".keep"), "").unwrap();
        fs::create_dir_all(temp_dir.path().join(".git")).unwrap();
        fs::write(temp_dir.path().join(".git/HEAD"), "ref").unwrap();

        let files = Loader::scan(temp_dir.path()).unwrap();
        let rel: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(temp_dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(rel, vec!["a/c.toml", "a/z.toml", "b.toml"]);
    }

    #[test]
    fn test_scan_rejects_stray_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "hi").unwrap();
        let err = Loader::scan(temp_dir.path()).unwrap_err();
        assert!(matches!(err, DiscoveryError::UnsupportedFile { .. }));
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let err = Loader::scan(&temp_dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, DiscoveryError::Walk { .. }));
    }

    #[tokio::test]
    async fn test_discover_initializes_each_unit_once() {
        let temp_dir = TempDir::new().unwrap();
        write_manifest(temp_dir.path(), "one.toml", "one", "/one");
        write_manifest(temp_dir.path(), "two.toml", "two", "/two");

        let inits = Arc::new(AtomicUsize::new(0));
        let catalog = catalog(inits.clone());
        let loader = Loader::new(&catalog, context());

        let loaded = loader.discover(temp_dir.path()).await.unwrap();
        let ids: Vec<&str> = loaded.iter().map(|l| l.unit.id()).collect();
        assert_eq!(ids, vec!["one", "two"]);
        assert_eq!(inits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_module_aborts_load() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("x.toml"), "module = \"nope\"").unwrap();

        let catalog = catalog(Arc::new(AtomicUsize::new(0)));
        let loader = Loader::new(&catalog, context());
        let err = loader.discover(temp_dir.path()).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::UnknownModule { ref module, .. } if module == "nope"));
    }

    #[tokio::test]
    async fn test_bad_options_and_failed_init_are_fatal() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("x.toml"), "module = \"static\"\n[options]\nid = \"x\"").unwrap();
        let catalog = catalog(Arc::new(AtomicUsize::new(0)));
        let loader = Loader::new(&catalog, context());
        let err = loader.discover(temp_dir.path()).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Construct { .. }));

        fs::write(
            temp_dir.path().join("x.toml"),
            "module = \"static\"\n[options]\nid = \"x\"\nendpoint = \"/x\"\nfail_init = true",
        )
        .unwrap();
        let err = loader.discover(temp_dir.path()).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Init { ref id, .. } if id == "x"));
    }

    #[tokio::test]
    async fn test_discover_into_stops_at_duplicate() {
        let temp_dir = TempDir::new().unwrap();
        write_manifest(temp_dir.path(), "a.toml", "same", "/a");
        write_manifest(temp_dir.path(), "b.toml", "same", "/b");

        let catalog = catalog(Arc::new(AtomicUsize::new(0)));
        let loader = Loader::new(&catalog, context());
        let mut registry = Registry::new("");

        let err = loader.discover_into(temp_dir.path(), &mut registry).await.unwrap_err();
        match err {
            DiscoveryError::Register { source, .. } => {
                assert_eq!(source, RegistryError::Duplicate(DuplicateRouteError { id: "same".into() }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.endpoint_of("same"), Some("/a"));
    }
}
