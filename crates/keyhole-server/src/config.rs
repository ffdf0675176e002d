use keyhole_auth::config::AuthConfig;
use keyhole_auth::types::TokenRecord;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, net::SocketAddr, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Introspection, policy and audit configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Clients and tokens seeded into the in-memory stores at startup
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Server validations
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // Auth validation
        self.auth
            .validate()
            .map_err(|e| format!("auth config error: {e}"))?;
        // Bootstrap validation
        self.bootstrap.validate()
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
    /// How often expired token records are purged. Zero disables cleanup.
    #[serde(default = "default_cleanup_interval", with = "humantime_serde")]
    pub cleanup_interval: Duration,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_body_limit() -> usize {
    16 * 1024
}
fn default_cleanup_interval() -> Duration {
    Duration::from_secs(60)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
            cleanup_interval: default_cleanup_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Fixture data for a standalone deployment.
///
/// Example:
/// ```toml
/// [[bootstrap.clients]]
/// client_id = "orders-api"
/// client_secret = "change-me"
///
/// [[bootstrap.tokens]]
/// token = "abc123"
/// kind = "access_token"
/// client_id = "web-app"
/// scope = "read write"
/// expires_in = "1h"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BootstrapConfig {
    #[serde(default)]
    pub clients: Vec<ClientSeed>,
    #[serde(default)]
    pub tokens: Vec<TokenSeed>,
}

impl BootstrapConfig {
    fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for client in &self.clients {
            if client.client_id.is_empty() {
                return Err("bootstrap.clients[].client_id must not be empty".into());
            }
            if !seen.insert(client.client_id.as_str()) {
                return Err(format!(
                    "bootstrap.clients has duplicate client_id '{}'",
                    client.client_id
                ));
            }
            if client.client_secret.as_deref() == Some("") {
                return Err(format!(
                    "bootstrap client '{}' has an empty client_secret",
                    client.client_id
                ));
            }
        }
        if self.tokens.iter().any(|t| t.token.is_empty()) {
            return Err("bootstrap.tokens[].token must not be empty".into());
        }
        Ok(())
    }
}

/// A client to register at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSeed {
    pub client_id: String,
    /// Plaintext secret (hashed before storage). Absent for public clients.
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// A token to register at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSeed {
    /// Plaintext token value (hashed before storage).
    pub token: String,
    /// Sets `exp` relative to startup; overrides any `exp` in the record.
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<Duration>,
    #[serde(flatten)]
    pub record: TokenRecord,
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::{Path, PathBuf};

    /// Default configuration file name.
    pub const DEFAULT_CONFIG_FILE: &str = "keyhole.toml";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., KEYHOLE__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("KEYHOLE")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        // Validate
        merged.validate()?;
        Ok(merged)
    }

    pub fn load_config_with_default_path<P: AsRef<Path>>(
        path: Option<P>,
    ) -> Result<AppConfig, String> {
        let p = path
            .as_ref()
            .map(|p| p.as_ref().to_string_lossy().to_string());
        load_config(p.as_deref())
    }
}
