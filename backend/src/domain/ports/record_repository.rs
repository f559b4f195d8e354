//! Persistence port for QR records.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::QrRecord;

/// Errors surfaced by the persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordPersistenceError {
    /// Database connectivity or pool checkout failures.
    #[error("record persistence connection failed: {message}")]
    Connection {
        /// Adapter-provided description of the failure.
        message: String,
    },
    /// Query or mutation failures bubbling up from the adapter.
    #[error("record persistence query failed: {message}")]
    Query {
        /// Adapter-provided description of the failure.
        message: String,
    },
}

impl RecordPersistenceError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Result of a capped insert attempt.
///
/// The cap check and the insert happen inside the adapter as one atomic
/// operation, so concurrent creations for the same VATIN cannot race past
/// the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was persisted.
    Inserted,
    /// The VATIN already holds `limit` records; nothing was written.
    LimitReached,
}

/// Repository port for the `qrs` table.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Persist `record` unless its VATIN already holds `limit` records.
    async fn insert_capped(
        &self,
        record: &QrRecord,
        limit: u32,
    ) -> Result<InsertOutcome, RecordPersistenceError>;

    /// Fetch a record by its public lookup key.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<QrRecord>, RecordPersistenceError>;

    /// Count all stored records.
    async fn count_all(&self) -> Result<u64, RecordPersistenceError>;
}

/// In-memory repository used by tests and by handler examples.
///
/// The mutex makes `insert_capped` atomic, mirroring the transactional
/// guarantee of the database adapter.
#[derive(Debug, Default)]
pub struct InMemoryRecordRepository {
    records: std::sync::Mutex<Vec<QrRecord>>,
}

impl InMemoryRecordRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<QrRecord>>, RecordPersistenceError> {
        self.records
            .lock()
            .map_err(|_| RecordPersistenceError::query("record store lock poisoned"))
    }
}

#[async_trait]
impl RecordRepository for InMemoryRecordRepository {
    async fn insert_capped(
        &self,
        record: &QrRecord,
        limit: u32,
    ) -> Result<InsertOutcome, RecordPersistenceError> {
        let mut records = self.lock()?;
        let existing = records
            .iter()
            .filter(|stored| stored.vatin() == record.vatin())
            .count();
        if existing >= limit as usize {
            return Ok(InsertOutcome::LimitReached);
        }
        records.push(record.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<QrRecord>, RecordPersistenceError> {
        Ok(self.lock()?.iter().find(|r| r.id() == id).cloned())
    }

    async fn count_all(&self) -> Result<u64, RecordPersistenceError> {
        Ok(self.lock()?.len() as u64)
    }
}
