//! Per-origin connection-pool configuration.
//!
//! [`OriginConnectionPoolConfig`] answers every pool knob by looking the knob
//! up in [`POOL_KNOBS`](portico_kernel::pool::POOL_KNOBS) and reading the
//! bound source on each call. Nothing is cached apart from the dynamic
//! property names, so a property change is seen by the next getter call.

use portico_kernel::origin::OriginName;
use portico_kernel::pool::{
    ConnectionPoolConfig, DynamicPropertySource, KnobSource, KnobValue, PoolKnob,
    StaticConfigSource,
};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Pool configuration for one origin, backed by a static client configuration
/// and a live property source.
pub struct OriginConnectionPoolConfig {
    origin_name: OriginName,
    client_config: Arc<dyn StaticConfigSource>,
    properties: Arc<dyn DynamicPropertySource>,
    /// Fully qualified property name of every dynamic knob.
    dynamic_keys: HashMap<PoolKnob, String>,
}

impl OriginConnectionPoolConfig {
    pub fn new(
        origin_name: OriginName,
        client_config: Arc<dyn StaticConfigSource>,
        properties: Arc<dyn DynamicPropertySource>,
    ) -> Self {
        let dynamic_keys: HashMap<PoolKnob, String> = PoolKnob::ALL
            .into_iter()
            .filter_map(|knob| match knob.source() {
                KnobSource::Dynamic(suffix) => Some((knob, origin_name.property_key(suffix))),
                KnobSource::Static(_) => None,
            })
            .collect();

        debug!(
            client = origin_name.client_name(),
            dynamic_knobs = dynamic_keys.len(),
            "connection pool config created"
        );

        Self {
            origin_name,
            client_config,
            properties,
            dynamic_keys,
        }
    }

    /// Name the knob is looked up under in its source: the static key name or
    /// the origin-qualified property name.
    pub fn property_key(&self, knob: PoolKnob) -> String {
        self.lookup_key(knob).into_owned()
    }

    /// Every knob with its source, lookup key, current value and default.
    pub fn describe(&self) -> PoolDescription {
        let knobs = PoolKnob::ALL
            .into_iter()
            .map(|knob| KnobReport {
                knob,
                source: if knob.is_dynamic() { "dynamic" } else { "static" },
                key: self.property_key(knob),
                value: self.resolve(knob),
                default: knob.default_value(),
            })
            .collect();

        PoolDescription {
            client_name: self.origin_name.client_name().to_string(),
            target: self.origin_name.target().to_string(),
            authority: self.origin_name.authority().to_string(),
            knobs,
        }
    }

    fn lookup_key(&self, knob: PoolKnob) -> Cow<'_, str> {
        match knob.source() {
            KnobSource::Static(key) => Cow::Borrowed(key.as_str()),
            KnobSource::Dynamic(suffix) => match self.dynamic_keys.get(&knob) {
                Some(key) => Cow::Borrowed(key.as_str()),
                None => Cow::Owned(self.origin_name.property_key(suffix)),
            },
        }
    }
}

impl ConnectionPoolConfig for OriginConnectionPoolConfig {
    fn origin_name(&self) -> &OriginName {
        &self.origin_name
    }

    fn resolve_int(&self, knob: PoolKnob) -> i32 {
        let binding = knob.binding();
        let KnobValue::Int(default) = binding.default else {
            return 0;
        };
        match binding.source {
            KnobSource::Static(key) => self.client_config.get_int(key, default),
            KnobSource::Dynamic(_) => self.properties.get_int(&self.lookup_key(knob), default),
        }
    }

    fn resolve_bool(&self, knob: PoolKnob) -> bool {
        let binding = knob.binding();
        let KnobValue::Bool(default) = binding.default else {
            return false;
        };
        match binding.source {
            KnobSource::Static(key) => self.client_config.get_bool(key, default),
            KnobSource::Dynamic(_) => self.properties.get_bool(&self.lookup_key(knob), default),
        }
    }
}

impl fmt::Debug for OriginConnectionPoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OriginConnectionPoolConfig")
            .field("origin_name", &self.origin_name)
            .field("dynamic_keys", &self.dynamic_keys.len())
            .finish_non_exhaustive()
    }
}

/// Serializable view of a pool configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolDescription {
    pub client_name: String,
    pub target: String,
    pub authority: String,
    pub knobs: Vec<KnobReport>,
}

impl PoolDescription {
    pub fn knob(&self, knob: PoolKnob) -> Option<&KnobReport> {
        self.knobs.iter().find(|report| report.knob == knob)
    }
}

/// One knob in a [`PoolDescription`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnobReport {
    pub knob: PoolKnob,
    pub source: &'static str,
    pub key: String,
    pub value: KnobValue,
    pub default: KnobValue,
}
