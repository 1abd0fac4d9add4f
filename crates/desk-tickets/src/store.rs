//! Record persistence port
//!
//! Abstracts whatever backend holds the tickets. The in-memory
//! implementation serves tests and development; soft-deleted records stay
//! in the map as tombstones and never come back through `find`/`list`.

use crate::kind::TicketKind;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// Store result type
pub type StoreResult<T> = Result<T, StoreError>;

/// Store backend errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Persistence port for one record kind.
#[async_trait]
pub trait RecordStore<K: TicketKind>: Send + Sync {
    /// Live (not soft-deleted) record by id.
    async fn find(&self, id: i64) -> StoreResult<Option<K>>;

    /// All live records.
    async fn list(&self) -> StoreResult<Vec<K>>;

    /// Persist a new record, assigning its id. Returns the stored copy.
    async fn insert(&self, record: K) -> StoreResult<K>;

    /// Overwrite an existing record.
    async fn save(&self, record: K) -> StoreResult<K>;

    /// Mark a record deleted. Returns false when no live record had the id.
    async fn soft_delete(&self, id: i64) -> StoreResult<bool>;
}

struct Stored<K> {
    record: K,
    deleted: bool,
}

/// In-memory record store (for testing and development)
pub struct InMemoryStore<K> {
    records: RwLock<HashMap<i64, Stored<K>>>,
    next_id: AtomicI64,
}

impl<K> InMemoryStore<K> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Live record count.
    pub fn len(&self) -> usize {
        self.records.read().values().filter(|s| !s.deleted).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K> Default for InMemoryStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: TicketKind> RecordStore<K> for InMemoryStore<K> {
    async fn find(&self, id: i64) -> StoreResult<Option<K>> {
        Ok(self
            .records
            .read()
            .get(&id)
            .filter(|stored| !stored.deleted)
            .map(|stored| stored.record.clone()))
    }

    async fn list(&self) -> StoreResult<Vec<K>> {
        Ok(self
            .records
            .read()
            .values()
            .filter(|stored| !stored.deleted)
            .map(|stored| stored.record.clone())
            .collect())
    }

    async fn insert(&self, mut record: K) -> StoreResult<K> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        record.set_id(id);
        self.records
            .write()
            .insert(id, Stored { record: record.clone(), deleted: false });
        Ok(record)
    }

    async fn save(&self, record: K) -> StoreResult<K> {
        let mut records = self.records.write();
        match records.get_mut(&record.id()) {
            Some(stored) if !stored.deleted => {
                stored.record = record.clone();
                Ok(record)
            }
            _ => Err(StoreError::Backend(format!(
                "no live record with id {}",
                record.id()
            ))),
        }
    }

    async fn soft_delete(&self, id: i64) -> StoreResult<bool> {
        let mut records = self.records.write();
        match records.get_mut(&id) {
            Some(stored) if !stored.deleted => {
                stored.deleted = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
