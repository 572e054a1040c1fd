//! File-backed tests for the configuration loader.

#[cfg(test)]
mod integration_tests {
    use crate::config::*;
    use serde::Deserialize;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Shape of a per-origin client configuration file.
    #[derive(Debug, Deserialize, PartialEq)]
    struct ClientFile {
        origin: OriginSection,
        pool: Option<PoolSection>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct OriginSection {
        vip: String,
        app: Option<String>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct PoolSection {
        connect_timeout: Option<i32>,
        max_connections_per_host: Option<i32>,
        is_secure: Option<bool>,
    }

    fn create_test_file(dir: &TempDir, filename: &str, content: &str) -> PathBuf {
        let path = dir.path().join(filename);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_formats_load_the_same_client_file() {
        let temp_dir = TempDir::new().unwrap();

        let yaml = r#"
origin:
  vip: api-prod:7001
  app: api
pool:
  connect_timeout: 250
  is_secure: true
"#;
        let toml = r#"
[origin]
vip = "api-prod:7001"
app = "api"

[pool]
connect_timeout = 250
is_secure = true
"#;
        let json = r#"{
    "origin": { "vip": "api-prod:7001", "app": "api" },
    "pool": { "connect_timeout": 250, "is_secure": true }
}"#;

        for (name, content) in [("api.yml", yaml), ("api.toml", toml), ("api.json", json)] {
            let path = create_test_file(&temp_dir, name, content);
            let config: ClientFile = load_config(path.to_str().unwrap()).unwrap();
            assert_eq!(config.origin.vip, "api-prod:7001", "{name}");
            let pool = config.pool.unwrap();
            assert_eq!(pool.connect_timeout, Some(250), "{name}");
            assert_eq!(pool.is_secure, Some(true), "{name}");
            assert_eq!(pool.max_connections_per_host, None, "{name}");
        }
    }

    #[test]
    fn test_unsupported_extension_is_rejected_before_reading() {
        let result: ConfigResult<ClientFile> = load_config("/nonexistent/api.txt");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.toml");
        let result: ConfigResult<ClientFile> = load_config(path.to_str().unwrap());
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_env_var_substitution_braced() {
        let temp_dir = TempDir::new().unwrap();

        unsafe { std::env::set_var("PORTICO_TEST_VIP", "search-prod:7001"); }

        let yaml = r#"
origin:
  vip: ${PORTICO_TEST_VIP}
"#;
        let path = create_test_file(&temp_dir, "search.yml", yaml);
        let config: ClientFile = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.origin.vip, "search-prod:7001");

        unsafe { std::env::remove_var("PORTICO_TEST_VIP"); }
    }

    #[test]
    fn test_env_var_substitution_unbraced() {
        unsafe { std::env::set_var("PORTICO_TEST_APP", "billing"); }

        let yaml = r#"
origin:
  vip: billing-prod
  app: $PORTICO_TEST_APP
"#;
        let config: ClientFile = from_str(yaml, FileFormat::Yaml).unwrap();
        assert_eq!(config.origin.app.as_deref(), Some("billing"));

        unsafe { std::env::remove_var("PORTICO_TEST_APP"); }
    }

    #[test]
    fn test_missing_env_var_preserved() {
        let result = substitute_env_vars("vip: ${PORTICO_TEST_MISSING}");
        assert_eq!(result, "vip: ${PORTICO_TEST_MISSING}");

        let result = substitute_env_vars("vip: $PORTICO_TEST_ALSO_MISSING");
        assert_eq!(result, "vip: $PORTICO_TEST_ALSO_MISSING");
    }

    #[test]
    fn test_load_merged_from_files() {
        let temp_dir = TempDir::new().unwrap();

        let defaults = r#"
origin:
  vip: api-prod
pool:
  connect_timeout: 500
  max_connections_per_host: 50
"#;
        let site = r#"
pool:
  max_connections_per_host: 200
  is_secure: true
"#;
        let defaults_path = create_test_file(&temp_dir, "defaults.yml", defaults);
        let site_path = create_test_file(&temp_dir, "site.yml", site);

        let merged: ClientFile = load_merged(&[
            defaults_path.to_str().unwrap(),
            site_path.to_str().unwrap(),
        ])
        .unwrap();

        let pool = merged.pool.unwrap();
        assert_eq!(merged.origin.vip, "api-prod");
        assert_eq!(pool.connect_timeout, Some(500));
        assert_eq!(pool.max_connections_per_host, Some(200));
        assert_eq!(pool.is_secure, Some(true));
    }

    #[test]
    fn test_env_override() {
        let temp_dir = TempDir::new().unwrap();

        unsafe { std::env::set_var("PORTICOTEST_ORIGIN__VIP", "api-canary"); }

        let yaml = r#"
origin:
  vip: api-prod
"#;
        let path = create_test_file(&temp_dir, "api.yml", yaml);
        let config: ClientFile = load_with_env(path.to_str().unwrap(), "PORTICOTEST").unwrap();
        assert_eq!(config.origin.vip, "api-canary");

        unsafe { std::env::remove_var("PORTICOTEST_ORIGIN__VIP"); }
    }
}
