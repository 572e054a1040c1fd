//! Configuration loader
//!
//! Loads layered configuration files into typed structs. Static client
//! configuration for origins is read through these functions.
//!
//! ## Features
//!
//! - Auto-detection of format from file extension
//! - Environment variable substitution (`${VAR}` and `$VAR` syntax)
//! - Configuration merging from multiple sources, later sources winning
//! - Prefixed environment overrides
//! - Formats: YAML, TOML, JSON, INI, RON, JSON5

use config::{Config as Cfg, Environment, File};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

pub use config::FileFormat;

static BRACED_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("braced variable pattern is valid")
});

static BARE_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)\b").expect("bare variable pattern is valid")
});

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parsing error: {0}")]
    Parse(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Detect configuration format from file extension
///
/// # Supported Extensions
///
/// - YAML: `.yaml`, `.yml`
/// - TOML: `.toml`
/// - JSON: `.json`
/// - INI: `.ini`
/// - RON: `.ron`
/// - JSON5: `.json5`
pub fn detect_format(path: &str) -> ConfigResult<FileFormat> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| ConfigError::UnsupportedFormat("No file extension found".to_string()))?;

    match ext.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        "toml" => Ok(FileFormat::Toml),
        "json" => Ok(FileFormat::Json),
        "ini" => Ok(FileFormat::Ini),
        "ron" => Ok(FileFormat::Ron),
        "json5" => Ok(FileFormat::Json5),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}

/// Substitute environment variables in a string
///
/// `${VAR_NAME}` is replaced first, then `$VAR_NAME`. References to unset
/// variables are left as written.
///
/// # Example
///
/// ```rust,ignore
/// use portico_kernel::config::substitute_env_vars;
///
/// std::env::set_var("API_TIMEOUT", "250");
/// let result = substitute_env_vars("connect_timeout: ${API_TIMEOUT}");
/// assert_eq!(result, "connect_timeout: 250");
/// ```
pub fn substitute_env_vars(content: &str) -> String {
    let braced = BRACED_VAR.replace_all(content, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    });

    BARE_VAR
        .replace_all(&braced, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

fn deserialize<T: DeserializeOwned>(built: Result<Cfg, config::ConfigError>) -> ConfigResult<T> {
    built
        .map_err(|e| ConfigError::Parse(e.to_string()))?
        .try_deserialize()
        .map_err(|e| ConfigError::Serialization(e.to_string()))
}

/// Read `path` and substitute environment variables in its content.
fn read_substituted(path: &str) -> ConfigResult<(String, FileFormat)> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    debug!(path, ?format, bytes = content.len(), "read configuration file");
    Ok((substitute_env_vars(&content), format))
}

/// Load configuration from a file
///
/// Detects the format from the file extension and substitutes environment
/// variables before parsing.
///
/// # Example
///
/// ```rust,ignore
/// use portico_kernel::config::load_config;
///
/// #[derive(serde::Deserialize)]
/// struct ClientFile {
///     connect_timeout: Option<i32>,
/// }
///
/// let file: ClientFile = load_config("api-client.toml")?;
/// ```
pub fn load_config<T>(path: &str) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let (content, format) = read_substituted(path)?;
    deserialize(Cfg::builder().add_source(File::from_str(&content, format)).build())
}

/// Load configuration from a string with explicit format
pub fn from_str<T>(content: &str, format: FileFormat) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let substituted = substitute_env_vars(content);
    deserialize(Cfg::builder().add_source(File::from_str(&substituted, format)).build())
}

/// Merge multiple configuration sources
///
/// Later sources override earlier ones (defaults -> site -> host, ...).
///
/// # Example
///
/// ```rust,ignore
/// use portico_kernel::config::{merge_configs, FileFormat};
///
/// let base = r#"{ "connect_timeout": 500, "is_secure": false }"#;
/// let site = r#"{ "is_secure": true }"#;
///
/// let merged: ClientFile = merge_configs(&[(base, FileFormat::Json), (site, FileFormat::Json)])?;
/// // merged.connect_timeout == Some(500), merged.is_secure == Some(true)
/// ```
pub fn merge_configs<T>(sources: &[(&str, FileFormat)]) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let mut builder = Cfg::builder();

    for (content, format) in sources {
        let substituted = substitute_env_vars(content);
        builder = builder.add_source(File::from_str(&substituted, *format));
    }

    deserialize(builder.build())
}

/// Load configuration from multiple files with later files overriding earlier ones
pub fn load_merged<T>(paths: &[&str]) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let mut builder = Cfg::builder();

    for path in paths {
        let (content, format) = read_substituted(path)?;
        builder = builder.add_source(File::from_str(&content, format));
    }

    deserialize(builder.build())
}

/// Load configuration with environment variable overrides
///
/// Environment variables are prefixed with `env_prefix` and use double
/// underscores `__` for nesting: with prefix `PORTICO`, the field
/// `connect_timeout` is overridden by `PORTICO_CONNECT_TIMEOUT`.
pub fn load_with_env<T>(path: &str, env_prefix: &str) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let (content, format) = read_substituted(path)?;
    deserialize(
        Cfg::builder()
            .add_source(File::from_str(&content, format))
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build(),
    )
}


// Include integration tests
#[cfg(test)]
mod tests;
