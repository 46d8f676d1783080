//! Gateway configuration module
//!
//! Provides the configuration the gateway runs with, a builder for it and
//! the optional TOML file layer. Environment handling lives in
//! `backend::server::config`.

use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default listen address
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Default lifetime of an unrenewed save lock, in seconds
pub const DEFAULT_SAVE_LOCK_TTL_SECS: u64 = 60;

/// Gateway configuration
#[derive(Clone)]
pub struct GatewayConfig {
    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,
    /// Directory shared files are resolved under
    pub storage_root: PathBuf,
    /// Directory editor renditions are cached in
    pub cache_dir: PathBuf,
    /// HS256 secret for caller and editor JWTs
    pub jwt_secret: String,
    /// TOML manifest listing issued share tokens
    pub shares_manifest: Option<PathBuf>,
    /// External program producing renditions in other formats
    pub converter: Option<PathBuf>,
    /// How long a save lock survives without a new save part
    pub save_lock_ttl: Duration,
}

impl GatewayConfig {
    /// Create a new GatewayConfigBuilder
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingValue("jwt_secret"));
        }
        if self.storage_root.as_os_str().is_empty() {
            return Err(ConfigError::MissingValue("storage_root"));
        }
        if self.cache_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingValue("cache_dir"));
        }
        if self.save_lock_ttl.is_zero() {
            return Err(ConfigError::MissingValue("save_lock_ttl_secs"));
        }
        Ok(())
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("bind_addr", &self.bind_addr)
            .field("storage_root", &self.storage_root)
            .field("cache_dir", &self.cache_dir)
            .field("jwt_secret", &"<redacted>")
            .field("shares_manifest", &self.shares_manifest)
            .field("converter", &self.converter)
            .field("save_lock_ttl", &self.save_lock_ttl)
            .finish()
    }
}

/// Builder for GatewayConfig
#[derive(Debug, Default)]
pub struct GatewayConfigBuilder {
    bind_addr: Option<String>,
    storage_root: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    jwt_secret: Option<String>,
    shares_manifest: Option<PathBuf>,
    converter: Option<PathBuf>,
    save_lock_ttl_secs: Option<u64>,
}

impl GatewayConfigBuilder {
    /// Set the listen address (`host:port`)
    pub fn bind_addr(mut self, addr: String) -> Self {
        self.bind_addr = Some(addr);
        self
    }

    /// Set the storage root
    pub fn storage_root(mut self, root: PathBuf) -> Self {
        self.storage_root = Some(root);
        self
    }

    /// Set the rendition cache directory
    pub fn cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache_dir = Some(dir);
        self
    }

    /// Set the JWT secret
    pub fn jwt_secret(mut self, secret: String) -> Self {
        self.jwt_secret = Some(secret);
        self
    }

    /// Set the shares manifest path
    pub fn shares_manifest(mut self, path: PathBuf) -> Self {
        self.shares_manifest = Some(path);
        self
    }

    /// Set the external converter program
    pub fn converter(mut self, program: PathBuf) -> Self {
        self.converter = Some(program);
        self
    }

    /// Set the save lock lifetime in seconds
    pub fn save_lock_ttl_secs(mut self, secs: u64) -> Self {
        self.save_lock_ttl_secs = Some(secs);
        self
    }

    /// Fill every unset value from a parsed config file
    pub fn with_file(mut self, file: FileConfig) -> Self {
        self.bind_addr = self.bind_addr.or(file.bind_addr);
        self.storage_root = self.storage_root.or(file.storage_root);
        self.cache_dir = self.cache_dir.or(file.cache_dir);
        self.jwt_secret = self.jwt_secret.or(file.jwt_secret);
        self.shares_manifest = self.shares_manifest.or(file.shares_manifest);
        self.converter = self.converter.or(file.converter);
        self.save_lock_ttl_secs = self.save_lock_ttl_secs.or(file.save_lock_ttl_secs);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<GatewayConfig, ConfigError> {
        let bind_addr = self
            .bind_addr
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidAddress(bind_addr))?;

        let config = GatewayConfig {
            bind_addr,
            storage_root: self
                .storage_root
                .ok_or(ConfigError::MissingValue("storage_root"))?,
            cache_dir: self.cache_dir.ok_or(ConfigError::MissingValue("cache_dir"))?,
            jwt_secret: self.jwt_secret.ok_or(ConfigError::MissingValue("jwt_secret"))?,
            shares_manifest: self.shares_manifest,
            converter: self.converter,
            save_lock_ttl: Duration::from_secs(
                self.save_lock_ttl_secs.unwrap_or(DEFAULT_SAVE_LOCK_TTL_SECS),
            ),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Optional TOML configuration file
///
/// ```toml
/// bind_addr = "127.0.0.1:8080"
/// storage_root = "/srv/files"
/// cache_dir = "/var/cache/xfdocs"
/// shares_manifest = "/etc/xfdocs/shares.toml"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub bind_addr: Option<String>,
    pub storage_root: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub jwt_secret: Option<String>,
    pub shares_manifest: Option<PathBuf>,
    pub converter: Option<PathBuf>,
    pub save_lock_ttl_secs: Option<u64>,
}

impl FileConfig {
    /// Parse a TOML config file body
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid listen address: {0}")]
    InvalidAddress(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
