//! `portico-pool` — print the effective connection-pool settings of an origin.
//!
//! Builds the same [`OriginConnectionPoolConfig`] the pool subsystem would and
//! prints its description as JSON on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! portico-pool [KEY=VALUE ...]
//! ```
//!
//! Each argument sets a dynamic property. A key without a `.` is taken as a
//! knob suffix and qualified with the origin's client name, so
//! `perServerWaterline=8` sets `<client>.netty.client.perServerWaterline`.
//!
//! # Environment variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PORTICO_ORIGIN_VIP` | *(required)* | VIP of the origin. |
//! | `PORTICO_ORIGIN_APP` | *(guessed from VIP)* | Application owning the origin. |
//! | `PORTICO_CLIENT_NAME` | *(VIP)* | Client name namespacing dynamic properties. |
//! | `PORTICO_CLIENT_CONFIG` | *(none)* | Static client configuration file. |
//! | `PORTICO_ENV_PREFIX` | *(none)* | Prefix of environment overrides for the client configuration file. |
//! | `RUST_LOG` | `portico_gateway=info` | Log filter. |

use portico_gateway::client_config::ClientConfig;
use portico_gateway::connection_pool::OriginConnectionPoolConfig;
use portico_gateway::error::{GatewayError, GatewayResult};
use portico_gateway::properties::DynamicProperties;
use portico_kernel::origin::OriginName;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("portico_gateway=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("portico-pool: {e}");
        std::process::exit(1);
    }
}

fn run() -> GatewayResult<()> {
    let origin = origin_from_env()?;
    info!(origin = %origin, "resolving connection pool settings");

    let client_config = match std::env::var("PORTICO_CLIENT_CONFIG").ok() {
        Some(path) => match std::env::var("PORTICO_ENV_PREFIX").ok() {
            Some(prefix) => ClientConfig::from_file_with_env(&path, &prefix)?,
            None => ClientConfig::from_file(&path)?,
        },
        None => {
            warn!("PORTICO_CLIENT_CONFIG is not set, static knobs use their defaults");
            ClientConfig::empty()
        }
    };

    let properties = Arc::new(DynamicProperties::new());
    for arg in std::env::args().skip(1) {
        let (key, value) = parse_property(&origin, &arg)?;
        properties.set(key, value);
    }

    let pool = OriginConnectionPoolConfig::new(origin, Arc::new(client_config), properties);
    println!("{}", serde_json::to_string_pretty(&pool.describe())?);
    Ok(())
}

fn origin_from_env() -> GatewayResult<OriginName> {
    let vip = std::env::var("PORTICO_ORIGIN_VIP")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| GatewayError::InvalidArgument("PORTICO_ORIGIN_VIP is not set".to_string()))?;

    let app = std::env::var("PORTICO_ORIGIN_APP").ok();
    let client_name = std::env::var("PORTICO_CLIENT_NAME").ok();

    Ok(match (app, client_name) {
        (Some(app), Some(client)) => OriginName::from_vip_and_app_with_client(vip, app, client),
        (Some(app), None) => OriginName::from_vip_and_app(vip, app),
        (None, Some(client)) => {
            let app = portico_kernel::origin::app_name_from_vip(&vip).to_string();
            OriginName::from_vip_and_app_with_client(vip, app, client)
        }
        (None, None) => OriginName::from_vip(vip),
    })
}

/// Split `KEY=VALUE`, qualifying bare knob suffixes with the origin's namespace.
fn parse_property(origin: &OriginName, arg: &str) -> GatewayResult<(String, String)> {
    let (key, value) = arg
        .split_once('=')
        .filter(|(key, _)| !key.trim().is_empty())
        .ok_or_else(|| GatewayError::InvalidArgument(format!("expected KEY=VALUE, got `{arg}`")))?;

    let key = key.trim();
    let key = if key.contains('.') {
        key.to_string()
    } else {
        origin.property_key(key)
    };
    Ok((key, value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_suffix_is_namespaced() {
        let origin = OriginName::from_vip("api");
        let (key, value) = parse_property(&origin, "perServerWaterline=8").unwrap();
        assert_eq!(key, "api.netty.client.perServerWaterline");
        assert_eq!(value, "8");
    }

    #[test]
    fn qualified_key_is_kept() {
        let origin = OriginName::from_vip("api");
        let (key, _) = parse_property(&origin, "other.netty.client.AutoRead=true").unwrap();
        assert_eq!(key, "other.netty.client.AutoRead");
    }

    #[test]
    fn malformed_argument_is_rejected() {
        let origin = OriginName::from_vip("api");
        assert!(matches!(
            parse_property(&origin, "perServerWaterline"),
            Err(GatewayError::InvalidArgument(_))
        ));
        assert!(parse_property(&origin, "=8").is_err());
    }
}
