//! Static client configuration for an origin.
//!
//! A [`ClientConfig`] is built once, when the origin's client is created, and
//! never changes afterwards. It can be assembled in code with
//! [`ClientConfig::builder`] or loaded from configuration files:
//!
//! ```toml
//! connect_timeout = 250
//! max_connections_per_host = 200
//! conn_idle_evict_time_ms = 30000
//! receive_buffer_size = 65536
//! send_buffer_size = 65536
//! is_secure = true
//! use_ip_addr_for_server = false
//! ```

use crate::error::GatewayResult;
use crate::properties::parse_bool;
use portico_kernel::config::{self, FileFormat};
use portico_kernel::pool::{ClientConfigKey, StaticConfigSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// A single static configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClientConfigValue {
    Int(i32),
    Bool(bool),
    /// Unparsed text; converted on read.
    Text(String),
}

impl From<i32> for ClientConfigValue {
    fn from(value: i32) -> Self {
        ClientConfigValue::Int(value)
    }
}

impl From<bool> for ClientConfigValue {
    fn from(value: bool) -> Self {
        ClientConfigValue::Bool(value)
    }
}

impl From<&str> for ClientConfigValue {
    fn from(value: &str) -> Self {
        ClientConfigValue::Text(value.to_string())
    }
}

impl From<String> for ClientConfigValue {
    fn from(value: String) -> Self {
        ClientConfigValue::Text(value)
    }
}

/// On-disk shape of a client configuration file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfigFile {
    pub connect_timeout: Option<i32>,
    pub max_connections_per_host: Option<i32>,
    pub conn_idle_evict_time_ms: Option<i32>,
    pub receive_buffer_size: Option<i32>,
    pub send_buffer_size: Option<i32>,
    pub is_secure: Option<bool>,
    pub use_ip_addr_for_server: Option<bool>,
}

impl From<ClientConfigFile> for ClientConfig {
    fn from(file: ClientConfigFile) -> Self {
        let ints = [
            (ClientConfigKey::ConnectTimeout, file.connect_timeout),
            (ClientConfigKey::MaxConnectionsPerHost, file.max_connections_per_host),
            (ClientConfigKey::ConnIdleEvictTimeMilliSeconds, file.conn_idle_evict_time_ms),
            (ClientConfigKey::ReceiveBufferSize, file.receive_buffer_size),
            (ClientConfigKey::SendBufferSize, file.send_buffer_size),
        ];
        let bools = [
            (ClientConfigKey::IsSecure, file.is_secure),
            (ClientConfigKey::UseIpAddrForServer, file.use_ip_addr_for_server),
        ];

        let mut builder = ClientConfig::builder();
        for (key, value) in ints {
            if let Some(value) = value {
                builder = builder.set(key, value);
            }
        }
        for (key, value) in bools {
            if let Some(value) = value {
                builder = builder.set(key, value);
            }
        }
        builder.build()
    }
}

/// Immutable [`StaticConfigSource`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    values: BTreeMap<ClientConfigKey, ClientConfigValue>,
}

impl ClientConfig {
    /// A configuration with nothing set; every lookup yields its default.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Load from one file, format detected from its extension.
    pub fn from_file(path: &str) -> GatewayResult<Self> {
        let file: ClientConfigFile = config::load_config(path)?;
        let loaded = Self::from(file);
        info!(path, keys = loaded.len(), "client configuration loaded");
        Ok(loaded)
    }

    /// Load from several files, later files overriding earlier ones.
    pub fn from_files(paths: &[&str]) -> GatewayResult<Self> {
        let file: ClientConfigFile = config::load_merged(paths)?;
        let loaded = Self::from(file);
        info!(files = paths.len(), keys = loaded.len(), "client configuration layers loaded");
        Ok(loaded)
    }

    /// Load from one file, then apply `<env_prefix>_<KEY>` environment overrides.
    pub fn from_file_with_env(path: &str, env_prefix: &str) -> GatewayResult<Self> {
        let file: ClientConfigFile = config::load_with_env(path, env_prefix)?;
        let loaded = Self::from(file);
        info!(path, env_prefix, keys = loaded.len(), "client configuration loaded with env overrides");
        Ok(loaded)
    }

    /// Merge in-memory layers, later layers overriding earlier ones.
    pub fn from_layers(layers: &[(&str, FileFormat)]) -> GatewayResult<Self> {
        let file: ClientConfigFile = config::merge_configs(layers)?;
        Ok(Self::from(file))
    }

    pub fn get(&self, key: ClientConfigKey) -> Option<&ClientConfigValue> {
        self.values.get(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClientConfigKey, &ClientConfigValue)> {
        self.values.iter().map(|(key, value)| (*key, value))
    }
}

impl StaticConfigSource for ClientConfig {
    fn get_int(&self, key: ClientConfigKey, default: i32) -> i32 {
        match self.values.get(&key) {
            Some(ClientConfigValue::Int(value)) => *value,
            Some(ClientConfigValue::Text(text)) => text.trim().parse().unwrap_or(default),
            Some(ClientConfigValue::Bool(_)) | None => default,
        }
    }

    fn get_bool(&self, key: ClientConfigKey, default: bool) -> bool {
        match self.values.get(&key) {
            Some(ClientConfigValue::Bool(value)) => *value,
            Some(ClientConfigValue::Text(text)) => parse_bool(text).unwrap_or(default),
            Some(ClientConfigValue::Int(_)) | None => default,
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    values: BTreeMap<ClientConfigKey, ClientConfigValue>,
}

impl ClientConfigBuilder {
    /// Set `key`, replacing any earlier value.
    pub fn set(mut self, key: ClientConfigKey, value: impl Into<ClientConfigValue>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    pub fn build(self) -> ClientConfig {
        ClientConfig {
            values: self.values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_yields_defaults() {
        let config = ClientConfig::empty();
        assert_eq!(config.get_int(ClientConfigKey::ConnectTimeout, 500), 500);
        assert!(config.get_bool(ClientConfigKey::UseIpAddrForServer, true));
    }

    #[test]
    fn typed_values_are_returned() {
        let config = ClientConfig::builder()
            .set(ClientConfigKey::ConnectTimeout, 250)
            .set(ClientConfigKey::IsSecure, true)
            .build();
        assert_eq!(config.get_int(ClientConfigKey::ConnectTimeout, 500), 250);
        assert!(config.get_bool(ClientConfigKey::IsSecure, false));
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn text_values_are_parsed_on_read() {
        let config = ClientConfig::builder()
            .set(ClientConfigKey::SendBufferSize, "65536")
            .set(ClientConfigKey::IsSecure, "yes")
            .set(ClientConfigKey::MaxConnectionsPerHost, "many")
            .build();
        assert_eq!(config.get_int(ClientConfigKey::SendBufferSize, 0), 65_536);
        assert!(config.get_bool(ClientConfigKey::IsSecure, false));
        assert_eq!(config.get_int(ClientConfigKey::MaxConnectionsPerHost, 50), 50);
    }

    #[test]
    fn mismatched_types_fall_back_to_default() {
        let config = ClientConfig::builder()
            .set(ClientConfigKey::ConnectTimeout, true)
            .set(ClientConfigKey::IsSecure, 1)
            .build();
        assert_eq!(config.get_int(ClientConfigKey::ConnectTimeout, 500), 500);
        assert!(!config.get_bool(ClientConfigKey::IsSecure, false));
    }

    #[test]
    fn layers_merge_in_order() {
        let defaults = r#"{ "connect_timeout": 500, "is_secure": false }"#;
        let site = r#"
is_secure = true
receive_buffer_size = 65536
"#;
        let config =
            ClientConfig::from_layers(&[(defaults, FileFormat::Json), (site, FileFormat::Toml)])
                .unwrap();
        assert_eq!(config.get_int(ClientConfigKey::ConnectTimeout, 0), 500);
        assert_eq!(config.get_int(ClientConfigKey::ReceiveBufferSize, 0), 65_536);
        assert!(config.get_bool(ClientConfigKey::IsSecure, false));
        assert_eq!(config.get(ClientConfigKey::SendBufferSize), None);
    }
}
