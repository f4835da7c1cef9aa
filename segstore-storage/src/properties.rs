//! Typed, defaulted configuration properties.
//!
//! Every backend declares its settings as [`Property`] constants. A property
//! has a name, a default and optionally a legacy name that older deployment
//! files still use. Lookups go through [`TypedProperties`], a frozen view of
//! one component's raw `key = value` pairs.
//!
//! ```
//! use segstore_storage::{ConfigSetup, Property};
//!
//! const BUCKET: Property<&'static str> = Property::named("bucket", "");
//! const NONE_MATCH: Property<bool> =
//!     Property::with_legacy_name("noneMatch.enable", false, "useNoneMatch");
//!
//! let setup = ConfigSetup::builder()
//!     .with("extendeds3", "bucket", "segments")
//!     .with("extendeds3", "useNoneMatch", "true")
//!     .build();
//! let props = setup.properties("extendeds3");
//!
//! assert_eq!(props.get_string(&BUCKET).unwrap(), "segments");
//! assert!(props.get_bool(&NONE_MATCH).unwrap());
//! ```

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::{Result, StorageError};

/// A value type a [`Property`] can be declared with.
///
/// Implemented for `bool`, `i64` and `&'static str`; the declared type fixes
/// which accessor applies, so asking for the wrong type does not compile.
pub trait PropertyValue: Copy {
    /// Owned type returned by lookups.
    type Output;

    /// Parse a raw string value.
    fn parse(raw: &str) -> std::result::Result<Self::Output, String>;

    /// Convert a declared default into the lookup type.
    fn into_output(self) -> Self::Output;
}

impl PropertyValue for bool {
    type Output = bool;

    fn parse(raw: &str) -> std::result::Result<bool, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err("expected true or false".to_string()),
        }
    }

    fn into_output(self) -> bool {
        self
    }
}

impl PropertyValue for i64 {
    type Output = i64;

    fn parse(raw: &str) -> std::result::Result<i64, String> {
        raw.trim()
            .parse::<i64>()
            .map_err(|e| format!("expected an integer: {}", e))
    }

    fn into_output(self) -> i64 {
        self
    }
}

impl PropertyValue for &'static str {
    type Output = String;

    fn parse(raw: &str) -> std::result::Result<String, String> {
        Ok(raw.to_string())
    }

    fn into_output(self) -> String {
        self.to_string()
    }
}

/// A named configuration key with a typed default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property<T> {
    name: &'static str,
    default: T,
    legacy_name: Option<&'static str>,
}

impl<T: PropertyValue> Property<T> {
    /// Declare a property without a legacy name.
    pub const fn named(name: &'static str, default: T) -> Self {
        Self {
            name,
            default,
            legacy_name: None,
        }
    }

    /// Declare a property that is also read under an older name.
    pub const fn with_legacy_name(name: &'static str, default: T, legacy_name: &'static str) -> Self {
        Self {
            name,
            default,
            legacy_name: Some(legacy_name),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn legacy_name(&self) -> Option<&'static str> {
        self.legacy_name
    }

    pub fn default_value(&self) -> T::Output {
        self.default.into_output()
    }

    /// Name qualified by the owning component, e.g. `extendeds3.bucket`.
    pub fn full_name(&self, component: &str) -> String {
        format!("{}.{}", component, self.name)
    }
}

/// Read-only view over one component's raw properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypedProperties {
    component: String,
    values: BTreeMap<String, String>,
}

impl TypedProperties {
    /// Wrap raw values (keys without the component prefix).
    pub fn new(component: impl Into<String>, values: BTreeMap<String, String>) -> Self {
        Self {
            component: component.into(),
            values,
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// Look up a property, falling back to its legacy name and then its default.
    pub fn get<T: PropertyValue>(&self, property: &Property<T>) -> Result<T::Output> {
        match self.raw(property) {
            Some((key, raw)) => T::parse(raw).map_err(|reason| StorageError::InvalidValue {
                property: format!("{}.{}", self.component, key),
                value: raw.to_string(),
                reason,
            }),
            None => Ok(property.default_value()),
        }
    }

    pub fn get_bool(&self, property: &Property<bool>) -> Result<bool> {
        self.get(property)
    }

    pub fn get_int(&self, property: &Property<i64>) -> Result<i64> {
        self.get(property)
    }

    pub fn get_string(&self, property: &Property<&'static str>) -> Result<String> {
        self.get(property)
    }

    /// Look up a string property that must be present and non-blank.
    pub fn get_required_string(&self, property: &Property<&'static str>) -> Result<String> {
        let value = self.get_string(property)?;
        if value.trim().is_empty() {
            return Err(StorageError::missing(self.full_name(property)));
        }
        Ok(value)
    }

    /// Look up an integer property that must not be negative.
    pub fn get_non_negative(&self, property: &Property<i64>) -> Result<u64> {
        let value = self.get_int(property)?;
        u64::try_from(value).map_err(|_| StorageError::InvalidValue {
            property: self.full_name(property),
            value: value.to_string(),
            reason: "must not be negative".to_string(),
        })
    }

    pub fn full_name<T: PropertyValue>(&self, property: &Property<T>) -> String {
        property.full_name(&self.component)
    }

    fn raw<T: PropertyValue>(&self, property: &Property<T>) -> Option<(&'static str, &str)> {
        if let Some(value) = self.values.get(property.name) {
            return Some((property.name, value.as_str()));
        }
        let legacy = property.legacy_name?;
        let value = self.values.get(legacy)?;
        warn!(
            component = %self.component,
            legacy = legacy,
            current = property.name,
            "Deprecated property name in use"
        );
        Some((legacy, value.as_str()))
    }
}
