use configuration::DatabaseSettings;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

/// Builds the connection options from discrete settings, so the password is
/// never spliced into a URL string.
pub fn connect_options(settings: &DatabaseSettings) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .database(&settings.name)
        .username(&settings.user)
        .password(&settings.password)
}

/// Creates the shared connection pool.
///
/// The pool connects lazily: creating it never fails, and an unreachable
/// database surfaces as an error from the first query instead. Callers wait
/// at most `connect_timeout` for a free connection before that query fails.
pub fn connect(settings: &DatabaseSettings) -> PgPool {
    tracing::info!(
        host = %settings.host,
        port = settings.port,
        database = %settings.name,
        max_connections = settings.max_connections,
        "Configuring database connection pool."
    );

    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .idle_timeout(settings.idle_timeout())
        .acquire_timeout(settings.connect_timeout())
        .connect_lazy_with(connect_options(settings))
}
