//! Configuration source capabilities.
//!
//! The pool configuration facade reads from two injected sources:
//!
//! - a [`StaticConfigSource`], fixed when the origin's client is built and
//!   keyed by [`ClientConfigKey`];
//! - a [`DynamicPropertySource`], refreshed while the process runs and keyed
//!   by free-form property names.
//!
//! Both lookups take the default to fall back on. Implementations must not
//! block and must not panic: a missing or malformed value yields the default.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Keys understood by a [`StaticConfigSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ClientConfigKey {
    ConnectTimeout,
    MaxConnectionsPerHost,
    ConnIdleEvictTimeMilliSeconds,
    ReceiveBufferSize,
    SendBufferSize,
    IsSecure,
    #[serde(rename = "UseIPAddrForServer")]
    UseIpAddrForServer,
}

impl ClientConfigKey {
    pub const ALL: [ClientConfigKey; 7] = [
        ClientConfigKey::ConnectTimeout,
        ClientConfigKey::MaxConnectionsPerHost,
        ClientConfigKey::ConnIdleEvictTimeMilliSeconds,
        ClientConfigKey::ReceiveBufferSize,
        ClientConfigKey::SendBufferSize,
        ClientConfigKey::IsSecure,
        ClientConfigKey::UseIpAddrForServer,
    ];

    /// Canonical key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientConfigKey::ConnectTimeout => "ConnectTimeout",
            ClientConfigKey::MaxConnectionsPerHost => "MaxConnectionsPerHost",
            ClientConfigKey::ConnIdleEvictTimeMilliSeconds => "ConnIdleEvictTimeMilliSeconds",
            ClientConfigKey::ReceiveBufferSize => "ReceiveBufferSize",
            ClientConfigKey::SendBufferSize => "SendBufferSize",
            ClientConfigKey::IsSecure => "IsSecure",
            ClientConfigKey::UseIpAddrForServer => "UseIPAddrForServer",
        }
    }

    /// Case-insensitive lookup by canonical name.
    pub fn from_str_ci(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for ClientConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client configuration fixed at construction time.
pub trait StaticConfigSource: Send + Sync {
    /// Integer value of `key`, or `default` when unset or not an integer.
    fn get_int(&self, key: ClientConfigKey, default: i32) -> i32;

    /// Boolean value of `key`, or `default` when unset or not a boolean.
    fn get_bool(&self, key: ClientConfigKey, default: bool) -> bool;
}

/// Live, externally refreshed properties.
///
/// Each call must observe the latest value the implementation has received;
/// callers never cache results.
pub trait DynamicPropertySource: Send + Sync {
    /// Integer value of property `name`, or `default` when unset or malformed.
    fn get_int(&self, name: &str, default: i32) -> i32;

    /// Boolean value of property `name`, or `default` when unset or malformed.
    fn get_bool(&self, name: &str, default: bool) -> bool;
}
