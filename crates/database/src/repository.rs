use crate::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{CatalogItem, Message, NewMessage};
use sqlx::postgres::PgPool;

/// The operations the HTTP layer and the schema initializer need from the
/// persistent store.
///
/// Implementations own their connections: callers never acquire or release
/// anything themselves.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Liveness probe. Returns the store's current time.
    async fn ping(&self) -> Result<DateTime<Utc>, DbError>;

    /// Creates the `messages` table if it does not exist. Idempotent.
    async fn ensure_schema(&self) -> Result<(), DbError>;

    async fn count_messages(&self) -> Result<i64, DbError>;

    /// Inserts all of `messages` atomically. Returns the number of rows written.
    async fn insert_messages(&self, messages: &[NewMessage]) -> Result<u64, DbError>;

    /// Inserts one message and returns it with its assigned `id` and `created_at`.
    async fn create_message(&self, message: &NewMessage) -> Result<Message, DbError>;

    /// Newest first, at most `limit` rows.
    async fn list_messages(&self, limit: i64) -> Result<Vec<Message>, DbError>;

    /// Rows of the read-only `products` table, ordered by id.
    async fn list_catalog_items(&self) -> Result<Vec<CatalogItem>, DbError>;

    /// Closes every pooled connection. Called once, after the server has drained.
    async fn close(&self);
}

const CREATE_MESSAGES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS messages (
        id SERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        email VARCHAR(100) NOT NULL,
        message TEXT NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// Columns read back into a [`Message`]. `created_at` is nullable in the
/// table; a NULL (only possible for rows written outside this service) reads
/// as the Unix epoch, so it sorts last instead of failing the whole list.
const MESSAGE_COLUMNS: &str =
    "id, name, email, message, COALESCE(created_at, 'epoch'::timestamp) AS created_at";

/// The `PgRepository` provides the Postgres implementation of [`MessageStore`].
/// All user input reaches the database through `$n` bind parameters.
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    /// Creates a new `PgRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgRepository {
    async fn ping(&self) -> Result<DateTime<Utc>, DbError> {
        let now = sqlx::query_scalar::<_, DateTime<Utc>>("SELECT NOW()")
            .fetch_one(&self.pool)
            .await?;
        Ok(now)
    }

    async fn ensure_schema(&self) -> Result<(), DbError> {
        sqlx::query(CREATE_MESSAGES_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn count_messages(&self) -> Result<i64, DbError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Saves a batch of messages within a single transaction for atomicity.
    async fn insert_messages(&self, messages: &[NewMessage]) -> Result<u64, DbError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for message in messages {
            inserted += sqlx::query("INSERT INTO messages (name, email, message) VALUES ($1, $2, $3)")
                .bind(message.name())
                .bind(message.email())
                .bind(message.message())
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn create_message(&self, message: &NewMessage) -> Result<Message, DbError> {
        let sql = format!(
            "INSERT INTO messages (name, email, message) VALUES ($1, $2, $3) RETURNING {MESSAGE_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Message>(&sql)
            .bind(message.name())
            .bind(message.email())
            .bind(message.message())
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn list_messages(&self, limit: i64) -> Result<Vec<Message>, DbError> {
        // `created_at` in ORDER BY resolves to the coalesced output column.
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages ORDER BY created_at DESC, id DESC LIMIT $1"
        );
        let messages = sqlx::query_as::<_, Message>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(messages)
    }

    async fn list_catalog_items(&self) -> Result<Vec<CatalogItem>, DbError> {
        let items = sqlx::query_as::<_, CatalogItem>("SELECT id, name, price FROM products ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection pool closed.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_projection_never_yields_a_null_timestamp() {
        assert!(MESSAGE_COLUMNS.contains("COALESCE(created_at, 'epoch'::timestamp) AS created_at"));
        assert!(CREATE_MESSAGES_TABLE.contains("created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP"));
    }
}
