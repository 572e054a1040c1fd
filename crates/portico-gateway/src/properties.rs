//! In-memory [`DynamicPropertySource`] implementation.
//!
//! Values are stored as the raw strings an operator or a property feed
//! supplied and are parsed on every read, so an update is visible to the very
//! next getter call. Whatever keeps the map fresh (polling a property
//! service, watching a file, an admin endpoint) calls [`DynamicProperties::set`].

use dashmap::DashMap;
use portico_kernel::pool::DynamicPropertySource;
use std::collections::BTreeMap;
use tracing::debug;

/// Concurrent property map.
///
/// Backed by a sharded map: a writer updating one property does not hold up
/// readers of the others.
#[derive(Debug, Default)]
pub struct DynamicProperties {
    values: DashMap<String, String>,
}

impl DynamicProperties {
    /// Create an empty property map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace a property, returning the previous raw value.
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        debug!(property = %name, value = %value, "dynamic property updated");
        self.values.insert(name, value)
    }

    /// Apply a batch of updates.
    pub fn set_all<I, K, V>(&self, updates: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in updates {
            self.set(name, value);
        }
    }

    /// Unset a property; subsequent reads fall back to their defaults.
    pub fn remove(&self, name: &str) -> Option<String> {
        let removed = self.values.remove(name).map(|(_, value)| value);
        if removed.is_some() {
            debug!(property = %name, "dynamic property removed");
        }
        removed
    }

    /// Raw value of a property, if set.
    pub fn get_raw(&self, name: &str) -> Option<String> {
        self.values.get(name).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sorted copy of every property.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

impl DynamicPropertySource for DynamicProperties {
    fn get_int(&self, name: &str, default: i32) -> i32 {
        let Some(raw) = self.values.get(name) else {
            return default;
        };
        match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                debug!(property = %name, value = %raw.value(), default, "not an integer, using default");
                default
            }
        }
    }

    fn get_bool(&self, name: &str, default: bool) -> bool {
        let Some(raw) = self.values.get(name) else {
            return default;
        };
        parse_bool(&raw).unwrap_or_else(|| {
            debug!(property = %name, value = %raw.value(), default, "not a boolean, using default");
            default
        })
    }
}

/// Lenient boolean parse: `true`/`yes`/`on` and `false`/`no`/`off`, any case.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
