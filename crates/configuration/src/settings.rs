use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub client: ClientSettings,
    pub logging: LoggingSettings,
}

/// Contains parameters for the HTTP API layer.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// The interface to bind (e.g., "0.0.0.0").
    pub host: String,
    pub port: u16,
    /// `*` for any origin, otherwise a comma-separated list of allowed origins.
    pub cors_origin: String,
    /// Directory served for any GET that matches no API route.
    pub static_dir: PathBuf,
}

impl ServerSettings {
    /// Host and port in the form `TcpListener::bind` accepts. The host may be
    /// an IPv4 or IPv6 literal or a name to resolve.
    pub fn bind_address(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

/// Contains parameters for the Postgres connection pool and schema initialization.
#[derive(Clone, Deserialize)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub idle_timeout_secs: u64,
    /// Also bounds how long a query waits for a free pooled connection.
    pub connect_timeout_secs: u64,
    /// Total attempts made by the schema initializer before giving up.
    pub init_retries: u32,
    pub init_retry_delay_secs: u64,
}

impl DatabaseSettings {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn init_retry_delay(&self) -> Duration {
        Duration::from_secs(self.init_retry_delay_secs)
    }
}

// The password never ends up in a log line.
impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"********")
            .field("max_connections", &self.max_connections)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("init_retries", &self.init_retries)
            .field("init_retry_delay_secs", &self.init_retry_delay_secs)
            .finish()
    }
}

/// Contains parameters for the client view.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    /// Base URL of the HTTP API, without a trailing `/api`.
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Fallback `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}
