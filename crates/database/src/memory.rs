use crate::repository::MessageStore;
use crate::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{CatalogItem, Message, NewMessage};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Message>,
    last_id: i32,
    schema_ready: bool,
}

/// A process-local [`MessageStore`].
///
/// Ids are assigned monotonically and `created_at` is stamped with the
/// current time, as the real table's defaults would. The store can be made
/// unreachable, or made to fail a fixed number of upcoming calls, to exercise
/// error paths.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    table: RwLock<Table>,
    catalog: Vec<CatalogItem>,
    unavailable: AtomicBool,
    failures_remaining: AtomicU32,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(mut self, items: Vec<CatalogItem>) -> Self {
        self.catalog = items;
        self
    }

    /// While `true`, every call fails as if the database host were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes the next `count` calls fail, then behaves normally again.
    pub fn fail_next(&self, count: u32) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    pub async fn schema_ready(&self) -> bool {
        self.table.read().await.schema_ready
    }

    fn check(&self) -> Result<(), DbError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("connection refused".to_string()));
        }
        let transient = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if transient {
            return Err(DbError::Unavailable("connection reset".to_string()));
        }
        Ok(())
    }
}

fn append(table: &mut Table, message: &NewMessage) -> Message {
    table.last_id += 1;
    let row = Message {
        id: table.last_id,
        name: message.name().to_string(),
        email: message.email().to_string(),
        message: message.message().to_string(),
        created_at: Utc::now().naive_utc(),
    };
    table.rows.push(row.clone());
    row
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn ping(&self) -> Result<DateTime<Utc>, DbError> {
        self.check()?;
        Ok(Utc::now())
    }

    async fn ensure_schema(&self) -> Result<(), DbError> {
        self.check()?;
        self.table.write().await.schema_ready = true;
        Ok(())
    }

    async fn count_messages(&self) -> Result<i64, DbError> {
        self.check()?;
        Ok(self.table.read().await.rows.len() as i64)
    }

    async fn insert_messages(&self, messages: &[NewMessage]) -> Result<u64, DbError> {
        self.check()?;
        let mut table = self.table.write().await;
        for message in messages {
            append(&mut table, message);
        }
        Ok(messages.len() as u64)
    }

    async fn create_message(&self, message: &NewMessage) -> Result<Message, DbError> {
        self.check()?;
        let mut table = self.table.write().await;
        Ok(append(&mut table, message))
    }

    async fn list_messages(&self, limit: i64) -> Result<Vec<Message>, DbError> {
        self.check()?;
        let mut rows = self.table.read().await.rows.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn list_catalog_items(&self) -> Result<Vec<CatalogItem>, DbError> {
        self.check()?;
        Ok(self.catalog.clone())
    }

    async fn close(&self) {}
}
