//! Gateway error types

use portico_kernel::config::ConfigError;
use portico_kernel::filter::{FilterError, FilterRevisionKey};
use thiserror::Error;

/// Gateway-level errors
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("filter revision already stored: {0}")]
    DuplicateRevision(FilterRevisionKey),

    #[error("filter not found: {0}")]
    FilterNotFound(String),

    #[error("filter revision not found: {0}")]
    RevisionNotFound(FilterRevisionKey),

    #[error("filter ordering failed: {0}")]
    Filter(#[from] FilterError),

    #[error("client configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;
