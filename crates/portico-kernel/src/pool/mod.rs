//! Connection-pool configuration contract.
//!
//! The connection-pool subsystem asks a [`ConnectionPoolConfig`] for its
//! tuning knobs every time it configures a pool or channel. Where each knob
//! comes from is fixed by the routing table in [`knob`]; implementations only
//! decide how to read a knob from its source.
//!
//! ```text
//!                     ┌──────────────────────┐
//!  pool subsystem ──► │ ConnectionPoolConfig │ ── POOL_KNOBS ──┬─► StaticConfigSource
//!                     └──────────────────────┘                 └─► DynamicPropertySource
//! ```
//!
//! The concrete facade is `OriginConnectionPoolConfig` in `portico-gateway`.

pub mod knob;
pub mod source;

pub use knob::{KnobBinding, KnobSource, KnobValue, POOL_KNOBS, PoolKnob};
pub use source::{ClientConfigKey, DynamicPropertySource, StaticConfigSource};

use crate::origin::OriginName;
use serde::{Deserialize, Serialize};

/// Pool tuning knobs for one origin.
///
/// Implementors supply [`resolve_int`](Self::resolve_int) and
/// [`resolve_bool`](Self::resolve_bool); every named getter is routed through
/// them. Getters must be side-effect free, must not block and must never
/// panic. They are called on every pool configuration event, so values
/// changed in a dynamic source are picked up without rebuilding anything.
///
/// No cross-knob validation happens here: a low write-buffer watermark at or
/// above the high watermark is reported as configured.
pub trait ConnectionPoolConfig: Send + Sync {
    /// Origin these settings belong to.
    fn origin_name(&self) -> &OriginName;

    /// Current value of an integer knob, or its default.
    fn resolve_int(&self, knob: PoolKnob) -> i32;

    /// Current value of a boolean knob, or its default.
    fn resolve_bool(&self, knob: PoolKnob) -> bool;

    /// Current value of any knob, typed after its default.
    fn resolve(&self, knob: PoolKnob) -> KnobValue {
        match knob.default_value() {
            KnobValue::Int(_) => KnobValue::Int(self.resolve_int(knob)),
            KnobValue::Bool(_) => KnobValue::Bool(self.resolve_bool(knob)),
        }
    }

    /// TCP connect timeout in milliseconds.
    fn connect_timeout(&self) -> i32 {
        self.resolve_int(PoolKnob::ConnectTimeout)
    }

    /// Requests served by one connection before it is retired.
    fn max_requests_per_connection(&self) -> i32 {
        self.resolve_int(PoolKnob::MaxRequestsPerConnection)
    }

    fn max_connections_per_host(&self) -> i32 {
        self.resolve_int(PoolKnob::MaxConnectionsPerHost)
    }

    /// Idle-connection threshold per host. Applied per I/O worker, since each
    /// worker keeps its own pool for every host.
    fn per_server_waterline(&self) -> i32 {
        self.resolve_int(PoolKnob::PerServerWaterline)
    }

    /// Idle connection eviction time in milliseconds.
    fn idle_timeout(&self) -> i32 {
        self.resolve_int(PoolKnob::IdleTimeout)
    }

    fn tcp_keep_alive(&self) -> bool {
        self.resolve_bool(PoolKnob::TcpKeepAlive)
    }

    fn tcp_no_delay(&self) -> bool {
        self.resolve_bool(PoolKnob::TcpNoDelay)
    }

    fn tcp_receive_buffer_size(&self) -> i32 {
        self.resolve_int(PoolKnob::TcpReceiveBufferSize)
    }

    fn tcp_send_buffer_size(&self) -> i32 {
        self.resolve_int(PoolKnob::TcpSendBufferSize)
    }

    fn write_buffer_high_water_mark(&self) -> i32 {
        self.resolve_int(PoolKnob::WriteBufferHighWaterMark)
    }

    fn write_buffer_low_water_mark(&self) -> i32 {
        self.resolve_int(PoolKnob::WriteBufferLowWaterMark)
    }

    fn auto_read(&self) -> bool {
        self.resolve_bool(PoolKnob::AutoRead)
    }

    fn is_secure(&self) -> bool {
        self.resolve_bool(PoolKnob::IsSecure)
    }

    fn use_ip_addr_for_server(&self) -> bool {
        self.resolve_bool(PoolKnob::UseIpAddrForServer)
    }

    /// Read every knob once.
    fn settings(&self) -> ConnectionPoolSettings {
        ConnectionPoolSettings {
            connect_timeout: self.connect_timeout(),
            max_requests_per_connection: self.max_requests_per_connection(),
            max_connections_per_host: self.max_connections_per_host(),
            per_server_waterline: self.per_server_waterline(),
            idle_timeout: self.idle_timeout(),
            tcp_keep_alive: self.tcp_keep_alive(),
            tcp_no_delay: self.tcp_no_delay(),
            tcp_receive_buffer_size: self.tcp_receive_buffer_size(),
            tcp_send_buffer_size: self.tcp_send_buffer_size(),
            write_buffer_high_water_mark: self.write_buffer_high_water_mark(),
            write_buffer_low_water_mark: self.write_buffer_low_water_mark(),
            auto_read: self.auto_read(),
            is_secure: self.is_secure(),
            use_ip_addr_for_server: self.use_ip_addr_for_server(),
        }
    }
}

/// Point-in-time copy of every knob, for logs and diagnostics.
///
/// Pool code should keep calling the getters instead of holding on to one of
/// these; a snapshot does not follow later dynamic changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionPoolSettings {
    pub connect_timeout: i32,
    pub max_requests_per_connection: i32,
    pub max_connections_per_host: i32,
    pub per_server_waterline: i32,
    pub idle_timeout: i32,
    pub tcp_keep_alive: bool,
    pub tcp_no_delay: bool,
    pub tcp_receive_buffer_size: i32,
    pub tcp_send_buffer_size: i32,
    pub write_buffer_high_water_mark: i32,
    pub write_buffer_low_water_mark: i32,
    pub auto_read: bool,
    pub is_secure: bool,
    pub use_ip_addr_for_server: bool,
}

impl Default for ConnectionPoolSettings {
    /// Every knob at its default.
    fn default() -> Self {
        Self {
            connect_timeout: knob::DEFAULT_CONNECT_TIMEOUT_MS,
            max_requests_per_connection: knob::DEFAULT_MAX_REQUESTS_PER_CONNECTION,
            max_connections_per_host: knob::DEFAULT_MAX_CONNECTIONS_PER_HOST,
            per_server_waterline: knob::DEFAULT_PER_SERVER_WATERLINE,
            idle_timeout: knob::DEFAULT_IDLE_TIMEOUT_MS,
            tcp_keep_alive: false,
            tcp_no_delay: false,
            tcp_receive_buffer_size: knob::DEFAULT_BUFFER_SIZE,
            tcp_send_buffer_size: knob::DEFAULT_BUFFER_SIZE,
            write_buffer_high_water_mark: knob::DEFAULT_WRITE_BUFFER_HIGH_WATER_MARK,
            write_buffer_low_water_mark: knob::DEFAULT_WRITE_BUFFER_LOW_WATER_MARK,
            auto_read: false,
            is_secure: false,
            use_ip_addr_for_server: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Answers every knob with its default, proving the getters route by table.
    struct Defaults(OriginName);

    impl ConnectionPoolConfig for Defaults {
        fn origin_name(&self) -> &OriginName {
            &self.0
        }

        fn resolve_int(&self, knob: PoolKnob) -> i32 {
            knob.default_value().as_int().unwrap_or_default()
        }

        fn resolve_bool(&self, knob: PoolKnob) -> bool {
            knob.default_value().as_bool().unwrap_or_default()
        }
    }

    #[test]
    fn provided_getters_follow_table_defaults() {
        let config = Defaults(OriginName::from_vip("api"));
        assert_eq!(config.settings(), ConnectionPoolSettings::default());
    }

    #[test]
    fn resolve_is_typed_after_default() {
        let config = Defaults(OriginName::from_vip("api"));
        assert_eq!(config.resolve(PoolKnob::PerServerWaterline), KnobValue::Int(4));
        assert_eq!(config.resolve(PoolKnob::UseIpAddrForServer), KnobValue::Bool(true));
    }
}
