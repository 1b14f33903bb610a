//! Route manifest files.
//!
//! ```toml
//! module = "kv.get"
//!
//! [options]
//! id = "kv.get"
//! endpoint = "/kv/:key"
//! order = 10
//! ```

use serde::Deserialize;

use crate::loader::catalog::ModuleOptions;

/// File extension the loader accepts.
pub const MANIFEST_EXTENSION: &str = "toml";

/// One discovered route module.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Catalog name of the module to instantiate.
    pub module: String,

    /// Passed through to the module's constructor.
    #[serde(default)]
    pub options: toml::Table,
}

impl Manifest {
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn module_options(&self) -> ModuleOptions {
        ModuleOptions::new(self.options.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest_with_options() {
        let manifest = Manifest::parse(
            r#"
            module = "echo"

            [options]
            id = "echo.v2"
            order = 3
            "#,
        )
        .unwrap();

        assert_eq!(manifest.module, "echo");
        let options = manifest.module_options();
        assert_eq!(options.get_str("id"), Some("echo.v2"));
        assert_eq!(options.get_i64("order"), Some(3));
    }

    #[test]
    fn test_module_key_is_required() {
        let err = Manifest::parse("[options]\nid = \"x\"").unwrap_err();
        assert!(err.to_string().contains("module"));
    }

    #[test]
    fn test_unknown_top_level_keys_rejected() {
        assert!(Manifest::parse("module = \"echo\"\nendpoint = \"/x\"").is_err());
    }
}
