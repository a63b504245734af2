use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// A missing `.env` is fine; an unreadable or malformed one is an error.
/// Runs before the tracing subscriber exists.
fn dotenv_loaded(result: Result<PathBuf, dotenvy::Error>) -> anyhow::Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(err).context("failed to read .env file"),
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in KB
    #[serde(default = "default_max_body_size_kb")]
    pub max_body_size_kb: usize,

    /// Enable CORS for all origins
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level (an `EnvFilter` directive)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Engine YAML file; the built-in defaults apply when unset.
    #[serde(default)]
    pub engine_config: Option<PathBuf>,

    #[serde(default)]
    pub database: DatabaseConfig,
}

/// PostgreSQL connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_host")]
    pub host: String,

    #[serde(default = "default_db_port")]
    pub port: u16,

    #[serde(default = "default_db_name")]
    pub name: String,

    #[serde(default = "default_db_user")]
    pub user: String,

    #[serde(default = "default_db_password")]
    pub password: String,

    /// Schema whose tables are offered to the fallback planner
    #[serde(default = "default_db_schema")]
    pub schema: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_db_host(),
            port: default_db_port(),
            name: default_db_name(),
            user: default_db_user(),
            password: default_db_password(),
            schema: default_db_schema(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_kb: default_max_body_size_kb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            engine_config: None,
            database: DatabaseConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `server.{toml,yaml,json}`
    /// file and `NLQ_SERVER__*` environment variables, in that order.
    pub fn load() -> anyhow::Result<Self> {
        dotenv_loaded(dotenvy::dotenv())?;

        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("server").required(false))
            // Override with environment variables
            .add_source(config::Environment::with_prefix("NLQ_SERVER").separator("__"));

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_kb * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_kb() -> usize {
    64
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_db_host() -> String {
    "db".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_name() -> String {
    "retail_db".to_string()
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_db_password() -> String {
    "postgres".to_string()
}

fn default_db_schema() -> String {
    "public".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dotenv_is_ignored() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "no .env");
        assert!(dotenv_loaded(Err(dotenvy::Error::Io(missing))).is_ok());
        assert!(dotenv_loaded(Ok(PathBuf::from(".env"))).is_ok());
    }

    #[test]
    fn test_malformed_dotenv_is_an_error() {
        let err = dotenv_loaded(Err(dotenvy::Error::LineParse("=oops".into(), 0))).unwrap_err();
        assert!(err.to_string().contains(".env"));
    }

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_body_size(), 64 * 1024);
        assert!(cfg.enable_cors);
        assert!(cfg.metrics_enabled);
        assert!(cfg.engine_config.is_none());
    }

    #[test]
    fn test_database_defaults() {
        let db = DatabaseConfig::default();
        assert_eq!(db.host, "db");
        assert_eq!(db.name, "retail_db");
        assert_eq!(db.user, "postgres");
        assert_eq!(db.password, "postgres");
        assert_eq!(db.schema, "public");
        assert_eq!(db.port, 5432);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_partial_override() {
        let cfg: ServerConfig = config::Config::builder()
            .set_override("port", 8088)
            .unwrap()
            .set_override("database.host", "localhost")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.port, 8088);
        assert_eq!(cfg.database.host, "localhost");
        assert_eq!(cfg.database.name, "retail_db");
    }
}
