//! PostgreSQL-backed `RecordRepository` implementation using Diesel.
//!
//! The capped insert runs in one transaction serialised per VATIN through a
//! Postgres advisory lock, so concurrent creations for the same VATIN queue
//! behind each other instead of racing past the cap.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{InsertOutcome, RecordPersistenceError, RecordRepository};
use crate::domain::QrRecord;

use super::models::{NewQrRow, QrRow};
use super::pool::{DbPool, PoolError};
use super::schema::qrs;

/// Diesel-backed implementation of the `RecordRepository` port.
#[derive(Clone)]
pub struct DieselRecordRepository {
    pool: DbPool,
}

impl DieselRecordRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RecordPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RecordPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> RecordPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RecordPersistenceError::connection("database connection error")
        }
        _ => RecordPersistenceError::query("database error"),
    }
}

fn row_to_record(row: QrRow) -> Result<QrRecord, RecordPersistenceError> {
    QrRecord::from_storage(row.id, row.vatin, row.first_name, row.last_name, row.created_at)
        .map_err(|err| RecordPersistenceError::query(format!("stored record is invalid: {err}")))
}

fn non_negative(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

#[async_trait]
impl RecordRepository for DieselRecordRepository {
    async fn insert_capped(
        &self,
        record: &QrRecord,
        limit: u32,
    ) -> Result<InsertOutcome, RecordPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewQrRow {
            id: record.id(),
            vatin: record.vatin().as_str(),
            first_name: record.first_name(),
            last_name: record.last_name(),
            created_at: record.created_at(),
        };
        let vatin = record.vatin().as_str();

        conn.transaction::<InsertOutcome, diesel::result::Error, _>(|conn| {
            async move {
                // Serialise creations per VATIN for the rest of this
                // transaction; released automatically at commit or rollback.
                diesel::sql_query("SELECT pg_advisory_xact_lock(hashtext($1))")
                    .bind::<Text, _>(vatin)
                    .execute(conn)
                    .await?;

                let existing: i64 = qrs::table
                    .filter(qrs::vatin.eq(vatin))
                    .count()
                    .get_result(conn)
                    .await?;
                if existing >= i64::from(limit) {
                    return Ok(InsertOutcome::LimitReached);
                }

                diesel::insert_into(qrs::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                Ok(InsertOutcome::Inserted)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<QrRecord>, RecordPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = qrs::table
            .find(id)
            .select(QrRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_record).transpose()
    }

    async fn count_all(&self) -> Result<u64, RecordPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = qrs::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(non_negative(count))
    }
}
