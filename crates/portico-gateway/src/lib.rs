//! `portico-gateway` — runtime implementations of the portico kernel contracts.
//!
//! | Kernel contract | Implementation |
//! |----------------|----------------|
//! | [`StaticConfigSource`](portico_kernel::pool::StaticConfigSource) | [`client_config::ClientConfig`] |
//! | [`DynamicPropertySource`](portico_kernel::pool::DynamicPropertySource) | [`properties::DynamicProperties`] |
//! | [`ConnectionPoolConfig`](portico_kernel::pool::ConnectionPoolConfig) | [`connection_pool::OriginConnectionPoolConfig`] |
//! | [`FilterRecord`](portico_kernel::filter::FilterRecord) storage | [`filter::InMemoryFilterStore`] |
//!
//! # Quick start
//!
//! ```rust,no_run
//! use portico_gateway::client_config::ClientConfig;
//! use portico_gateway::connection_pool::OriginConnectionPoolConfig;
//! use portico_gateway::properties::DynamicProperties;
//! use portico_kernel::origin::OriginName;
//! use portico_kernel::pool::ConnectionPoolConfig;
//! use std::sync::Arc;
//!
//! let properties = Arc::new(DynamicProperties::new());
//! let pool = OriginConnectionPoolConfig::new(
//!     OriginName::from_vip_and_app("api-prod:7001", "api"),
//!     Arc::new(ClientConfig::from_file("api-client.toml").unwrap()),
//!     properties.clone(),
//! );
//!
//! properties.set("api-prod:7001.netty.client.perServerWaterline", "8");
//! assert_eq!(pool.per_server_waterline(), 8);
//! ```

pub mod client_config;
pub mod connection_pool;
pub mod error;
pub mod filter;
pub mod properties;

// Re-export the kernel for convenience.
pub use portico_kernel as kernel;
