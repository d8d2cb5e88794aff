//! # Message Board Configuration
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. built-in defaults (every setting has one),
//! 2. an optional `config.toml` with `[server]`, `[database]`, `[client]`
//!    and `[logging]` tables,
//! 3. the flat environment variables the deployment uses (`PORT`,
//!    `CORS_ORIGIN`, `DB_HOST`, ...).
//!
//! A missing variable falls back to its default; a present but malformed
//! one (e.g. `PORT=abc`) is an error.

use crate::error::ConfigError;
use config::builder::DefaultState;
use config::ConfigBuilder;

// Declare the modules that make up this crate.
#[cfg(feature = "clap")]
pub mod cli;
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{ClientSettings, DatabaseSettings, LoggingSettings, ServerSettings, Settings};

/// Maps each recognized environment variable onto its settings key.
pub const ENV_KEYS: &[(&str, &str)] = &[
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("CORS_ORIGIN", "server.cors_origin"),
    ("STATIC_DIR", "server.static_dir"),
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_NAME", "database.name"),
    ("DB_USER", "database.user"),
    ("DB_PASSWORD", "database.password"),
    ("DB_MAX_CONNECTIONS", "database.max_connections"),
    ("DB_IDLE_TIMEOUT_SECS", "database.idle_timeout_secs"),
    ("DB_CONNECT_TIMEOUT_SECS", "database.connect_timeout_secs"),
    ("DB_INIT_RETRIES", "database.init_retries"),
    ("DB_INIT_RETRY_DELAY_SECS", "database.init_retry_delay_secs"),
    ("API_BASE_URL", "client.base_url"),
    ("LOG_DIR", "logging.directory"),
];

/// Loads the application configuration from `config.toml` (if present) and
/// the process environment.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_with(
        Some(config::File::with_name("config").required(false)),
        |key| std::env::var(key).ok(),
    )
}

/// Same as [`load_config`], but with the file source and the environment
/// lookup supplied by the caller.
pub fn load_config_with<S, F>(file: Option<S>, env: F) -> Result<Settings, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    let mut builder = with_defaults(config::Config::builder())?;

    if let Some(file) = file {
        builder = builder.add_source(file);
    }

    // A variable that is set but empty counts as unset.
    for (var, key) in ENV_KEYS {
        builder = builder.set_override_option(*key, env(var).filter(|v| !v.is_empty()))?;
    }

    let settings = builder.build()?.try_deserialize::<Settings>()?;
    validate(&settings)?;
    Ok(settings)
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("server.cors_origin", "*")?
        .set_default("server.static_dir", "public")?
        .set_default("database.host", "postgres")?
        .set_default("database.port", 5432)?
        .set_default("database.name", "appdb")?
        .set_default("database.user", "postgres")?
        .set_default("database.password", "postgres")?
        .set_default("database.max_connections", 20)?
        .set_default("database.idle_timeout_secs", 30)?
        .set_default("database.connect_timeout_secs", 2)?
        .set_default("database.init_retries", 5)?
        .set_default("database.init_retry_delay_secs", 5)?
        .set_default("client.base_url", "http://localhost:3000")?
        .set_default("logging.filter", "info,tower_http=info,sqlx=warn")
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.server.host.trim().is_empty() {
        return Err(ConfigError::ValidationError("HOST must not be empty".to_string()));
    }

    if settings.server.cors_origin.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "CORS_ORIGIN must not be empty; use * to allow any origin".to_string(),
        ));
    }
    if settings.database.max_connections == 0 {
        return Err(ConfigError::ValidationError(
            "DB_MAX_CONNECTIONS must be at least 1".to_string(),
        ));
    }
    if settings.database.init_retries == 0 {
        return Err(ConfigError::ValidationError(
            "DB_INIT_RETRIES must be at least 1".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat, FileSourceString};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    type NoFile = File<FileSourceString, FileFormat>;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = load_config_with(None::<NoFile>, env_from(&[])).unwrap();

        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.server.cors_origin, "*");
        assert_eq!(settings.server.static_dir, PathBuf::from("public"));
        assert_eq!(settings.database.host, "postgres");
        assert_eq!(settings.database.port, 5432);
        assert_eq!(settings.database.name, "appdb");
        assert_eq!(settings.database.user, "postgres");
        assert_eq!(settings.database.password, "postgres");
        assert_eq!(settings.database.max_connections, 20);
        assert_eq!(settings.database.idle_timeout(), Duration::from_secs(30));
        assert_eq!(settings.database.connect_timeout(), Duration::from_secs(2));
        assert_eq!(settings.database.init_retries, 5);
        assert_eq!(settings.database.init_retry_delay(), Duration::from_secs(5));
        assert_eq!(settings.client.base_url, "http://localhost:3000");
        assert!(settings.logging.directory.is_none());
    }

    #[test]
    fn environment_overrides_defaults() {
        let env = env_from(&[
            ("PORT", "8080"),
            ("CORS_ORIGIN", "http://localhost:5173"),
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("DB_NAME", "board"),
            ("DB_USER", "board_rw"),
            ("DB_PASSWORD", "s3cret"),
            ("LOG_DIR", "/var/log/board"),
        ]);
        let settings = load_config_with(None::<NoFile>, env).unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.cors_origin, "http://localhost:5173");
        assert_eq!(settings.database.host, "db.internal");
        assert_eq!(settings.database.port, 6543);
        assert_eq!(settings.database.name, "board");
        assert_eq!(settings.database.user, "board_rw");
        assert_eq!(settings.database.password, "s3cret");
        assert_eq!(settings.logging.directory, Some(PathBuf::from("/var/log/board")));
    }

    #[test]
    fn file_values_sit_between_defaults_and_environment() {
        let file = File::from_str(
            r#"
            [server]
            port = 4000
            cors_origin = "https://board.example.com"

            [database]
            host = "from-file"
            "#,
            FileFormat::Toml,
        );
        let settings = load_config_with(Some(file), env_from(&[("DB_HOST", "from-env")])).unwrap();

        assert_eq!(settings.server.port, 4000);
        assert_eq!(settings.server.cors_origin, "https://board.example.com");
        assert_eq!(settings.database.host, "from-env");
        assert_eq!(settings.database.name, "appdb");
    }

    #[test]
    fn malformed_port_is_an_error() {
        let result = load_config_with(None::<NoFile>, env_from(&[("PORT", "abc")]));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn empty_variables_fall_back_to_defaults() {
        let env = env_from(&[("PORT", ""), ("DB_HOST", ""), ("CORS_ORIGIN", ""), ("LOG_DIR", "")]);
        let settings = load_config_with(None::<NoFile>, env).unwrap();

        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.database.host, "postgres");
        assert_eq!(settings.server.cors_origin, "*");
        assert!(settings.logging.directory.is_none());
    }

    #[test]
    fn host_may_be_a_name_or_an_ipv6_address() {
        for host in ["localhost", "::", "127.0.0.1"] {
            let settings = load_config_with(None::<NoFile>, env_from(&[("HOST", host)])).unwrap();
            assert_eq!(settings.server.bind_address(), (host, 3000));
        }
    }

    #[test]
    fn zero_retries_is_rejected() {
        let result = load_config_with(None::<NoFile>, env_from(&[("DB_INIT_RETRIES", "0")]));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn debug_output_hides_the_password() {
        let settings = load_config_with(None::<NoFile>, env_from(&[("DB_PASSWORD", "hunter2")])).unwrap();
        let rendered = format!("{:?}", settings.database);
        assert!(!rendered.contains("hunter2"));
    }
}
