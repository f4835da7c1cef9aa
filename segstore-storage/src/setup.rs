//! Configuration setup: raw per-component property bags.
//!
//! A [`ConfigSetup`] is the frozen set of raw `component.key = value` strings a
//! segment store was started with. Components turn their slice of it into a
//! validated value through [`ComponentConfig`].
//!
//! # File format
//!
//! ```toml
//! [extendeds3]
//! "connect.config.uri" = "https://ecs.local:9021?identity=user&secretKey=secret"
//! bucket = "segments"
//! prefix = "pravega"
//!
//! [extendeds3.concat.smallObject.threshold]
//! size = 2097152
//!
//! [storage]
//! "appends.enable" = false
//! ```
//!
//! Top-level tables name components. Nested tables and quoted dotted keys both
//! flatten to dotted property names; scalar values are kept as strings.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, StorageError};
use crate::properties::TypedProperties;

/// Prefix for environment variable overrides: `SEGSTORE__<COMPONENT>__<key>`.
pub const ENV_PREFIX: &str = "SEGSTORE__";

/// A configuration value built from one component's properties.
pub trait ComponentConfig: Sized {
    /// Component code the properties live under.
    const COMPONENT: &'static str;

    /// Validate and build the configuration.
    fn from_properties(properties: &TypedProperties) -> Result<Self>;
}

/// Frozen raw configuration, grouped by component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSetup {
    components: BTreeMap<String, BTreeMap<String, String>>,
}

impl ConfigSetup {
    pub fn builder() -> ConfigSetupBuilder {
        ConfigSetupBuilder::default()
    }

    /// Parse TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let table: toml::Table = contents
            .parse()
            .map_err(|e: toml::de::Error| StorageError::ConfigFile(e.to_string()))?;

        let mut builder = Self::builder();
        for (component, value) in table {
            let toml::Value::Table(entries) = value else {
                return Err(StorageError::ConfigFile(format!(
                    "top-level key '{}' must be a table",
                    component
                )));
            };
            let mut flat = BTreeMap::new();
            flatten(&component, "", &entries, &mut flat)?;
            for (key, value) in flat {
                builder = builder.with(&component, key, value);
            }
        }
        Ok(builder.build())
    }

    /// Load a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let setup = Self::from_toml_str(&contents).map_err(|e| match e {
            StorageError::ConfigFile(msg) => {
                StorageError::ConfigFile(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;
        info!(
            path = %path.display(),
            components = setup.components.len(),
            "Loaded storage configuration"
        );
        Ok(setup)
    }

    /// Apply `SEGSTORE__<COMPONENT>__<key>` overrides from the process environment.
    pub fn apply_env_overrides(self) -> Self {
        self.with_overrides(std::env::vars())
    }

    /// Apply overrides from `(variable, value)` pairs; non-matching variables are ignored.
    pub fn with_overrides<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in vars {
            let Some(rest) = name.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let Some((component, key)) = rest.split_once("__") else {
                continue;
            };
            if component.is_empty() || key.is_empty() {
                continue;
            }
            let component = component.to_ascii_lowercase();
            debug!(component = %component, key = key, "Environment override");
            self.components
                .entry(component)
                .or_default()
                .insert(key.to_string(), value.into());
        }
        self
    }

    /// Properties of one component; empty if the component is not configured.
    pub fn properties(&self, component: &str) -> TypedProperties {
        TypedProperties::new(
            component,
            self.components.get(component).cloned().unwrap_or_default(),
        )
    }

    /// Build a component configuration from its properties.
    pub fn get_config<C: ComponentConfig>(&self) -> Result<C> {
        C::from_properties(&self.properties(C::COMPONENT))
    }

    /// Names of the configured components.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }
}

/// Builder for programmatic setups (tests, embedding).
#[derive(Debug, Default)]
pub struct ConfigSetupBuilder {
    components: BTreeMap<String, BTreeMap<String, String>>,
}

impl ConfigSetupBuilder {
    /// Set `component.key = value`.
    pub fn with(
        mut self,
        component: impl Into<String>,
        key: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        self.components
            .entry(component.into())
            .or_default()
            .insert(key.into(), value.to_string());
        self
    }

    pub fn build(self) -> ConfigSetup {
        ConfigSetup {
            components: self.components,
        }
    }
}

fn flatten(
    component: &str,
    prefix: &str,
    table: &toml::Table,
    out: &mut BTreeMap<String, String>,
) -> Result<()> {
    for (key, value) in table {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        let raw = match value {
            toml::Value::Table(nested) => {
                flatten(component, &name, nested, out)?;
                continue;
            }
            toml::Value::String(s) => s.clone(),
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Datetime(d) => d.to_string(),
            toml::Value::Array(_) => {
                return Err(StorageError::ConfigFile(format!(
                    "{}.{}: arrays are not supported",
                    component, name
                )));
            }
        };
        if out.contains_key(&name) {
            return Err(StorageError::ConfigFile(format!(
                "{}.{}: defined more than once",
                component, name
            )));
        }
        out.insert(name, raw);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::Property;

    const BUCKET: Property<&'static str> = Property::named("bucket", "");
    const THRESHOLD: Property<i64> = Property::named("concat.smallObject.threshold.size", 0);
    const OVERRIDE: Property<bool> = Property::named("connect.config.uri.override", false);

    #[test]
    fn test_builder() {
        let setup = ConfigSetup::builder()
            .with("s3", "bucket", "b1")
            .with("s3", "concat.smallObject.threshold.size", 10)
            .build();
        let props = setup.properties("s3");
        assert_eq!(props.get_string(&BUCKET).unwrap(), "b1");
        assert_eq!(props.get_int(&THRESHOLD).unwrap(), 10);
        assert_eq!(setup.components().collect::<Vec<_>>(), vec!["s3"]);
    }

    #[test]
    fn test_unknown_component_is_empty() {
        let setup = ConfigSetup::default();
        let props = setup.properties("azure");
        assert_eq!(props.component(), "azure");
        assert_eq!(props.get_string(&BUCKET).unwrap(), "");
    }

    #[test]
    fn test_toml_nested_and_quoted_keys() {
        let toml = r#"
            [s3]
            bucket = "b1"
            "connect.config.uri" = "http://localhost:9000"
            "connect.config.uri.override" = true

            [s3.concat.smallObject.threshold]
            size = 2048
        "#;
        let setup = ConfigSetup::from_toml_str(toml).unwrap();
        let props = setup.properties("s3");
        assert_eq!(props.get_string(&BUCKET).unwrap(), "b1");
        assert_eq!(props.get_int(&THRESHOLD).unwrap(), 2048);
        assert!(props.get_bool(&OVERRIDE).unwrap());
    }

    #[test]
    fn test_toml_rejects_duplicate_flattened_keys() {
        let toml = r#"
            [extendeds3]
            "concat.smallObject.threshold.size" = 1024

            [extendeds3.concat.smallObject.threshold]
            size = 2048
        "#;
        let err = ConfigSetup::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, StorageError::ConfigFile(_)));
        assert!(err
            .to_string()
            .contains("extendeds3.concat.smallObject.threshold.size"));
    }

    #[test]
    fn test_toml_rejects_top_level_scalars() {
        let err = ConfigSetup::from_toml_str("bucket = \"b1\"").unwrap_err();
        assert!(matches!(err, StorageError::ConfigFile(_)));
    }

    #[test]
    fn test_toml_rejects_arrays() {
        let err = ConfigSetup::from_toml_str("[s3]\nbucket = [\"a\", \"b\"]").unwrap_err();
        assert!(err.to_string().contains("s3.bucket"));
    }

    #[test]
    fn test_env_overrides() {
        let setup = ConfigSetup::builder()
            .with("extendeds3", "bucket", "from-file")
            .build()
            .with_overrides(vec![
                ("SEGSTORE__EXTENDEDS3__bucket", "from-env"),
                ("SEGSTORE__AZURE__container", "c1"),
                ("SEGSTORE__broken", "ignored"),
                ("HOME", "/root"),
            ]);

        assert_eq!(
            setup.properties("extendeds3").get_string(&BUCKET).unwrap(),
            "from-env"
        );
        assert_eq!(
            setup
                .properties("azure")
                .get_string(&Property::named("container", ""))
                .unwrap(),
            "c1"
        );
        assert_eq!(setup.components().count(), 2);
    }
}
