//! Endpoint resolution and the endpoint table.
//!
//! # Responsibilities
//! - Join the configured base path with a unit's endpoint template
//! - Rewrite `:name` / `*name` segments into the listener's capture syntax
//! - Record one resolved endpoint per route id, never overwriting

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// A template that cannot be bound.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    #[error("endpoint is empty")]
    Empty,

    #[error("endpoint `{0}` must start with '/'")]
    MissingLeadingSlash(String),

    #[error("endpoint `{0}` has an unnamed parameter")]
    UnnamedParameter(String),

    #[error("endpoint `{0}` has a wildcard that is not the last segment")]
    WildcardNotLast(String),

    #[error("endpoint `{0}` has an empty segment")]
    EmptySegment(String),
}

/// Resolve `template` under `base_path`.
///
/// `base_path` is either empty or starts with `/` without a trailing slash.
///
/// ```
/// use route_engine::registry::resolve_endpoint;
///
/// assert_eq!(resolve_endpoint("/api", "/users/:id").unwrap(), "/api/users/{id}");
/// assert_eq!(resolve_endpoint("", "/files/*path").unwrap(), "/files/{*path}");
/// assert_eq!(resolve_endpoint("/api", "/").unwrap(), "/api");
/// ```
pub fn resolve_endpoint(base_path: &str, template: &str) -> Result<String, EndpointError> {
    if template.is_empty() {
        return Err(EndpointError::Empty);
    }
    if !template.starts_with('/') {
        return Err(EndpointError::MissingLeadingSlash(template.to_string()));
    }

    let trimmed = template.trim_end_matches('/');
    let segments: Vec<&str> = if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed[1..].split('/').collect()
    };

    let mut resolved = String::from(base_path.trim_end_matches('/'));
    for (i, segment) in segments.iter().enumerate() {
        let rewritten = if let Some(name) = segment.strip_prefix(':') {
            if name.is_empty() {
                return Err(EndpointError::UnnamedParameter(template.to_string()));
            }
            format!("{{{name}}}")
        } else if let Some(name) = segment.strip_prefix('*') {
            if name.is_empty() {
                return Err(EndpointError::UnnamedParameter(template.to_string()));
            }
            if i + 1 != segments.len() {
                return Err(EndpointError::WildcardNotLast(template.to_string()));
            }
            format!("{{*{name}}}")
        } else if segment.is_empty() {
            return Err(EndpointError::EmptySegment(template.to_string()));
        } else {
            (*segment).to_string()
        };
        resolved.push('/');
        resolved.push_str(&rewritten);
    }

    if resolved.is_empty() {
        resolved.push('/');
    }
    Ok(resolved)
}

/// Route id → resolved endpoint.
///
/// Entries are additive: an id is recorded once and never replaced.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct EndpointTable {
    entries: BTreeMap<String, String>,
}

impl EndpointTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `endpoint` for `id`. Returns false (and changes nothing) if the
    /// id already has an entry.
    pub fn insert(&mut self, id: &str, endpoint: String) -> bool {
        if self.entries.contains_key(id) {
            return false;
        }
        self.entries.insert(id.to_string(), endpoint);
        true
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
