//! Routing table for connection-pool knobs.
//!
//! Each knob is read from exactly one source with exactly one default:
//!
//! ```text
//! knob                          source   key                             default
//! ───────────────────────────── ──────── ─────────────────────────────── ───────
//! connect_timeout               static   ConnectTimeout                  500
//! max_requests_per_connection   dynamic  maxRequestsPerConnection        1000
//! max_connections_per_host      static   MaxConnectionsPerHost           50
//! per_server_waterline          dynamic  perServerWaterline              4
//! idle_timeout                  static   ConnIdleEvictTimeMilliSeconds   60000
//! tcp_keep_alive                dynamic  TcpKeepAlive                    false
//! tcp_no_delay                  dynamic  TcpNoDelay                      false
//! tcp_receive_buffer_size       static   ReceiveBufferSize               32768
//! tcp_send_buffer_size          static   SendBufferSize                  32768
//! write_buffer_high_water_mark  dynamic  WriteBufferHighWaterMark        32768
//! write_buffer_low_water_mark   dynamic  WriteBufferLowWaterMark         8192
//! auto_read                     dynamic  AutoRead                        false
//! is_secure                     static   IsSecure                        false
//! use_ip_addr_for_server        static   UseIPAddrForServer              true
//! ```
//!
//! Structural and security settings are static. Backpressure and concurrency
//! settings are dynamic so operators can retune them without a restart.
//! Dynamic keys are namespaced per origin, see
//! [`OriginName::property_key`](crate::origin::OriginName::property_key).

use super::source::ClientConfigKey;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_BUFFER_SIZE: i32 = 32 * 1024;
pub const DEFAULT_CONNECT_TIMEOUT_MS: i32 = 500;
pub const DEFAULT_IDLE_TIMEOUT_MS: i32 = 60_000;
pub const DEFAULT_MAX_CONNECTIONS_PER_HOST: i32 = 50;
pub const DEFAULT_MAX_REQUESTS_PER_CONNECTION: i32 = 1000;
pub const DEFAULT_PER_SERVER_WATERLINE: i32 = 4;
pub const DEFAULT_WRITE_BUFFER_HIGH_WATER_MARK: i32 = 32 * 1024;
pub const DEFAULT_WRITE_BUFFER_LOW_WATER_MARK: i32 = 8 * 1024;

/// A tunable exposed by [`ConnectionPoolConfig`](super::ConnectionPoolConfig).
///
/// Discriminants index [`POOL_KNOBS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKnob {
    ConnectTimeout = 0,
    MaxRequestsPerConnection = 1,
    MaxConnectionsPerHost = 2,
    /// Applied per I/O worker: every worker keeps its own pool per host.
    PerServerWaterline = 3,
    IdleTimeout = 4,
    TcpKeepAlive = 5,
    TcpNoDelay = 6,
    TcpReceiveBufferSize = 7,
    TcpSendBufferSize = 8,
    WriteBufferHighWaterMark = 9,
    WriteBufferLowWaterMark = 10,
    AutoRead = 11,
    IsSecure = 12,
    UseIpAddrForServer = 13,
}

impl PoolKnob {
    pub const ALL: [PoolKnob; 14] = [
        PoolKnob::ConnectTimeout,
        PoolKnob::MaxRequestsPerConnection,
        PoolKnob::MaxConnectionsPerHost,
        PoolKnob::PerServerWaterline,
        PoolKnob::IdleTimeout,
        PoolKnob::TcpKeepAlive,
        PoolKnob::TcpNoDelay,
        PoolKnob::TcpReceiveBufferSize,
        PoolKnob::TcpSendBufferSize,
        PoolKnob::WriteBufferHighWaterMark,
        PoolKnob::WriteBufferLowWaterMark,
        PoolKnob::AutoRead,
        PoolKnob::IsSecure,
        PoolKnob::UseIpAddrForServer,
    ];

    /// Routing entry for this knob.
    pub fn binding(self) -> &'static KnobBinding {
        &POOL_KNOBS[self as usize]
    }

    pub fn source(self) -> KnobSource {
        self.binding().source
    }

    pub fn default_value(self) -> KnobValue {
        self.binding().default
    }

    pub fn is_dynamic(self) -> bool {
        matches!(self.source(), KnobSource::Dynamic(_))
    }
}

impl fmt::Display for PoolKnob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Where a knob is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnobSource {
    /// Static client configuration, by key.
    Static(ClientConfigKey),
    /// Dynamic property `<client_name>.netty.client.<suffix>`, by suffix.
    Dynamic(&'static str),
}

/// A knob's value or default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KnobValue {
    Int(i32),
    Bool(bool),
}

impl KnobValue {
    pub fn as_int(self) -> Option<i32> {
        match self {
            KnobValue::Int(value) => Some(value),
            KnobValue::Bool(_) => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            KnobValue::Bool(value) => Some(value),
            KnobValue::Int(_) => None,
        }
    }
}

impl fmt::Display for KnobValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnobValue::Int(value) => write!(f, "{value}"),
            KnobValue::Bool(value) => write!(f, "{value}"),
        }
    }
}

/// One row of the routing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnobBinding {
    pub knob: PoolKnob,
    pub source: KnobSource,
    pub default: KnobValue,
}

const fn bind(knob: PoolKnob, source: KnobSource, default: KnobValue) -> KnobBinding {
    KnobBinding {
        knob,
        source,
        default,
    }
}

/// The routing table, in [`PoolKnob`] discriminant order.
pub const POOL_KNOBS: [KnobBinding; 14] = [
    bind(
        PoolKnob::ConnectTimeout,
        KnobSource::Static(ClientConfigKey::ConnectTimeout),
        KnobValue::Int(DEFAULT_CONNECT_TIMEOUT_MS),
    ),
    bind(
        PoolKnob::MaxRequestsPerConnection,
        KnobSource::Dynamic("maxRequestsPerConnection"),
        KnobValue::Int(DEFAULT_MAX_REQUESTS_PER_CONNECTION),
    ),
    bind(
        PoolKnob::MaxConnectionsPerHost,
        KnobSource::Static(ClientConfigKey::MaxConnectionsPerHost),
        KnobValue::Int(DEFAULT_MAX_CONNECTIONS_PER_HOST),
    ),
    bind(
        PoolKnob::PerServerWaterline,
        KnobSource::Dynamic("perServerWaterline"),
        KnobValue::Int(DEFAULT_PER_SERVER_WATERLINE),
    ),
    bind(
        PoolKnob::IdleTimeout,
        KnobSource::Static(ClientConfigKey::ConnIdleEvictTimeMilliSeconds),
        KnobValue::Int(DEFAULT_IDLE_TIMEOUT_MS),
    ),
    bind(
        PoolKnob::TcpKeepAlive,
        KnobSource::Dynamic("TcpKeepAlive"),
        KnobValue::Bool(false),
    ),
    bind(
        PoolKnob::TcpNoDelay,
        KnobSource::Dynamic("TcpNoDelay"),
        KnobValue::Bool(false),
    ),
    bind(
        PoolKnob::TcpReceiveBufferSize,
        KnobSource::Static(ClientConfigKey::ReceiveBufferSize),
        KnobValue::Int(DEFAULT_BUFFER_SIZE),
    ),
    bind(
        PoolKnob::TcpSendBufferSize,
        KnobSource::Static(ClientConfigKey::SendBufferSize),
        KnobValue::Int(DEFAULT_BUFFER_SIZE),
    ),
    bind(
        PoolKnob::WriteBufferHighWaterMark,
        KnobSource::Dynamic("WriteBufferHighWaterMark"),
        KnobValue::Int(DEFAULT_WRITE_BUFFER_HIGH_WATER_MARK),
    ),
    bind(
        PoolKnob::WriteBufferLowWaterMark,
        KnobSource::Dynamic("WriteBufferLowWaterMark"),
        KnobValue::Int(DEFAULT_WRITE_BUFFER_LOW_WATER_MARK),
    ),
    bind(
        PoolKnob::AutoRead,
        KnobSource::Dynamic("AutoRead"),
        KnobValue::Bool(false),
    ),
    bind(
        PoolKnob::IsSecure,
        KnobSource::Static(ClientConfigKey::IsSecure),
        KnobValue::Bool(false),
    ),
    bind(
        PoolKnob::UseIpAddrForServer,
        KnobSource::Static(ClientConfigKey::UseIpAddrForServer),
        KnobValue::Bool(true),
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_is_indexed_by_discriminant() {
        for (index, knob) in PoolKnob::ALL.into_iter().enumerate() {
            assert_eq!(POOL_KNOBS[index].knob, knob);
            assert_eq!(knob.binding().knob, knob);
        }
    }

    #[test]
    fn every_static_key_is_routed_once() {
        let routed: Vec<ClientConfigKey> = POOL_KNOBS
            .iter()
            .filter_map(|b| match b.source {
                KnobSource::Static(key) => Some(key),
                KnobSource::Dynamic(_) => None,
            })
            .collect();
        let unique: HashSet<_> = routed.iter().copied().collect();
        assert_eq!(routed.len(), unique.len());
        assert_eq!(unique.len(), ClientConfigKey::ALL.len());
    }

    #[test]
    fn dynamic_suffixes_are_unique() {
        let suffixes: HashSet<&str> = POOL_KNOBS
            .iter()
            .filter_map(|b| match b.source {
                KnobSource::Dynamic(suffix) => Some(suffix),
                KnobSource::Static(_) => None,
            })
            .collect();
        assert_eq!(suffixes.len(), 7);
    }

    #[test]
    fn split_matches_policy() {
        let dynamic: Vec<PoolKnob> = PoolKnob::ALL
            .into_iter()
            .filter(|k| k.is_dynamic())
            .collect();
        assert_eq!(
            dynamic,
            vec![
                PoolKnob::MaxRequestsPerConnection,
                PoolKnob::PerServerWaterline,
                PoolKnob::TcpKeepAlive,
                PoolKnob::TcpNoDelay,
                PoolKnob::WriteBufferHighWaterMark,
                PoolKnob::WriteBufferLowWaterMark,
                PoolKnob::AutoRead,
            ]
        );
    }

    #[test]
    fn defaults_match_published_values() {
        assert_eq!(PoolKnob::ConnectTimeout.default_value(), KnobValue::Int(500));
        assert_eq!(PoolKnob::IdleTimeout.default_value(), KnobValue::Int(60_000));
        assert_eq!(PoolKnob::TcpSendBufferSize.default_value(), KnobValue::Int(32_768));
        assert_eq!(PoolKnob::WriteBufferLowWaterMark.default_value(), KnobValue::Int(8_192));
        assert_eq!(PoolKnob::UseIpAddrForServer.default_value(), KnobValue::Bool(true));
        assert_eq!(PoolKnob::AutoRead.default_value(), KnobValue::Bool(false));
    }
}
