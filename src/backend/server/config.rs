/**
 * Server Configuration
 *
 * Loads the gateway configuration from, in order of precedence:
 *
 * 1. Environment variables (a `.env` file is read by the binary first)
 * 2. The TOML file named by `XFDOCS_CONFIG`
 * 3. Built-in defaults (listen address only)
 *
 * | Variable              | Setting                      |
 * |-----------------------|------------------------------|
 * | `SERVER_PORT`         | port on `0.0.0.0`            |
 * | `XFDOCS_STORAGE_ROOT` | storage root                 |
 * | `XFDOCS_CACHE_DIR`    | rendition cache directory    |
 * | `XFDOCS_SHARES`       | shares manifest              |
 * | `XFDOCS_CONVERTER`    | external converter program   |
 * | `XFDOCS_SAVE_LOCK_TTL`| save lock lifetime, seconds  |
 * | `JWT_SECRET`          | JWT secret                   |
 *
 * Unlike the optional services of a larger deployment, nothing here can be
 * skipped: a configuration error stops startup.
 */

use std::path::PathBuf;

use crate::shared::config::{ConfigError, FileConfig, GatewayConfig};

/// Environment variable naming the TOML config file
pub const CONFIG_FILE_VAR: &str = "XFDOCS_CONFIG";

/// Load the configuration from the process environment
pub fn load_config() -> Result<GatewayConfig, ConfigError> {
    let file = match std::env::var(CONFIG_FILE_VAR) {
        Ok(path) => {
            let path = PathBuf::from(path);
            tracing::info!("Reading configuration from {}", path.display());
            let body = std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::Read { path, source })?;
            Some(FileConfig::from_toml_str(&body)?)
        }
        Err(_) => None,
    };

    config_from_sources(|name| std::env::var(name).ok(), file)
}

/// Build the configuration from a variable lookup and an optional file
pub fn config_from_sources<F>(
    var: F,
    file: Option<FileConfig>,
) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = GatewayConfig::builder();

    if let Some(port) = var("SERVER_PORT") {
        let port = port
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidAddress(format!("port {}", port)))?;
        builder = builder.bind_addr(format!("0.0.0.0:{}", port));
    }
    if let Some(root) = var("XFDOCS_STORAGE_ROOT") {
        builder = builder.storage_root(root.into());
    }
    if let Some(dir) = var("XFDOCS_CACHE_DIR") {
        builder = builder.cache_dir(dir.into());
    }
    if let Some(manifest) = var("XFDOCS_SHARES") {
        builder = builder.shares_manifest(manifest.into());
    }
    if let Some(program) = var("XFDOCS_CONVERTER") {
        builder = builder.converter(program.into());
    }
    if let Some(ttl) = var("XFDOCS_SAVE_LOCK_TTL") {
        let secs = ttl.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
            name: "XFDOCS_SAVE_LOCK_TTL",
            value: ttl.clone(),
        })?;
        builder = builder.save_lock_ttl_secs(secs);
    }
    if let Some(secret) = var("JWT_SECRET") {
        builder = builder.jwt_secret(secret);
    }

    if let Some(file) = file {
        builder = builder.with_file(file);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_environment_only() {
        let config = config_from_sources(
            vars(&[
                ("SERVER_PORT", "8081"),
                ("XFDOCS_STORAGE_ROOT", "/srv/files"),
                ("XFDOCS_CACHE_DIR", "/tmp/cache"),
                ("JWT_SECRET", "secret"),
            ]),
            None,
        )
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8081);
        assert_eq!(config.storage_root, PathBuf::from("/srv/files"));
        assert!(config.shares_manifest.is_none());
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = FileConfig::from_toml_str(
            r#"
            bind_addr = "127.0.0.1:9000"
            storage_root = "/from/file"
            cache_dir = "/cache/from/file"
            jwt_secret = "file-secret"
            "#,
        )
        .unwrap();

        let config = config_from_sources(vars(&[("XFDOCS_STORAGE_ROOT", "/from/env")]), Some(file))
            .unwrap();

        assert_eq!(config.storage_root, PathBuf::from("/from/env"));
        assert_eq!(config.cache_dir, PathBuf::from("/cache/from/file"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.jwt_secret, "file-secret");
    }

    #[test]
    fn test_invalid_port() {
        let result = config_from_sources(
            vars(&[
                ("SERVER_PORT", "http"),
                ("XFDOCS_STORAGE_ROOT", "/srv/files"),
                ("XFDOCS_CACHE_DIR", "/tmp/cache"),
                ("JWT_SECRET", "secret"),
            ]),
            None,
        );
        assert_matches!(result, Err(ConfigError::InvalidAddress(_)));
    }

    #[test]
    fn test_missing_secret() {
        let result = config_from_sources(
            vars(&[("XFDOCS_STORAGE_ROOT", "/srv/files"), ("XFDOCS_CACHE_DIR", "/tmp/cache")]),
            None,
        );
        assert_matches!(result, Err(ConfigError::MissingValue("jwt_secret")));
    }

    #[test]
    fn test_save_lock_ttl_from_environment() {
        let base = [
            ("XFDOCS_STORAGE_ROOT", "/srv/files"),
            ("XFDOCS_CACHE_DIR", "/tmp/cache"),
            ("JWT_SECRET", "secret"),
        ];

        let mut pairs = base.to_vec();
        pairs.push(("XFDOCS_SAVE_LOCK_TTL", "5"));
        let config = config_from_sources(vars(&pairs), None).unwrap();
        assert_eq!(config.save_lock_ttl, std::time::Duration::from_secs(5));

        let mut pairs = base.to_vec();
        pairs.push(("XFDOCS_SAVE_LOCK_TTL", "soon"));
        let result = config_from_sources(vars(&pairs), None);
        assert_matches!(
            result,
            Err(ConfigError::InvalidValue { name: "XFDOCS_SAVE_LOCK_TTL", .. })
        );
    }
}
