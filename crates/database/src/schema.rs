//! Startup schema initialization.
//!
//! [`initialize`] makes sure the `messages` table exists and holds the two
//! sample rows the first time it is empty. The database container is often
//! still starting when the service comes up, so each attempt is retried
//! under a [`RetryPolicy`]. Exhausting the policy is an error; the caller
//! decides what to do with it (the binary exits).

use crate::repository::MessageStore;
use crate::DbError;
use chrono::{DateTime, Utc};
use configuration::DatabaseSettings;
use core_types::NewMessage;
use std::future::Future;
use std::time::Duration;

/// Bounded, fixed-delay retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn from_settings(settings: &DatabaseSettings) -> Self {
        Self {
            max_attempts: settings.init_retries.max(1),
            delay: settings.init_retry_delay(),
        }
    }
}

/// What a successful [`initialize`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub database_time: DateTime<Utc>,
    pub attempts: u32,
    /// Sample rows inserted; zero unless the table was empty.
    pub seeded: u64,
}

/// Runs `operation` until it succeeds or `policy.max_attempts` is used up,
/// sleeping `policy.delay` between attempts.
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &'static str,
    mut attempt_fn: F,
) -> Result<(T, u32), DbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match attempt_fn().await {
            Ok(value) => return Ok((value, attempt)),
            Err(e) if attempt >= max_attempts => {
                tracing::error!(error = %e, attempts = attempt, "{operation} failed, giving up.");
                return Err(DbError::RetriesExhausted {
                    operation,
                    attempts: attempt,
                    source: Box::new(e),
                });
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    attempts_left = max_attempts - attempt,
                    delay = ?policy.delay,
                    "{operation} failed, retrying."
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}

/// Inserts the two sample messages if, and only if, the table is empty.
///
/// The zero-count check is the only guard; there is no uniqueness constraint
/// on the sample rows.
pub async fn seed_if_empty(store: &dyn MessageStore) -> Result<u64, DbError> {
    if store.count_messages().await? > 0 {
        return Ok(0);
    }
    let inserted = store.insert_messages(&NewMessage::samples()).await?;
    tracing::info!(rows = inserted, "Added sample data to messages table.");
    Ok(inserted)
}

/// Probes the store, creates the `messages` table and seeds it, retrying the
/// whole sequence under `policy`.
pub async fn initialize(store: &dyn MessageStore, policy: &RetryPolicy) -> Result<InitReport, DbError> {
    let ((database_time, seeded), attempts) = retry(policy, "Schema initialization", move || async move {
        let database_time = store.ping().await?;
        store.ensure_schema().await?;
        let seeded = seed_if_empty(store).await?;
        Ok::<_, DbError>((database_time, seeded))
    })
    .await?;

    tracing::info!(%database_time, attempts, "Database initialized successfully.");
    Ok(InitReport { database_time, attempts, seeded })
}
