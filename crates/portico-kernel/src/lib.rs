//! `portico-kernel` — contracts and data types shared by the Portico gateway.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`filter`] | [`FilterRecord`](filter::FilterRecord), [`FilterType`](filter::FilterType), revision keys and ordering |
//! | [`origin`] | [`OriginName`](origin::OriginName), the identity of a backend cluster |
//! | [`pool`] | configuration source traits, the knob routing table and the [`ConnectionPoolConfig`](pool::ConnectionPoolConfig) contract |
//! | `config` | multi-format configuration loader (requires the `config` feature) |
//!
//! Concrete sources, the pool configuration facade and the in-memory filter
//! store live in `portico-gateway`.

// filter module
pub mod filter;

// origin module
pub mod origin;

// pool module
pub mod pool;

// config module
#[cfg(feature = "config")]
pub mod config;
