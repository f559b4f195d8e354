//! Record use-cases composed over the persistence port.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::ports::{InsertOutcome, RecordPersistenceError, RecordRepository};
use crate::domain::{Error, QrRecord, RecordDraft};

/// At most this many records may share one VATIN.
pub const VATIN_RECORD_LIMIT: u32 = 3;

/// Message returned when a lookup misses; also used verbatim as the 404 body.
pub const RECORD_NOT_FOUND_MESSAGE: &str = "QR code not found.";

fn map_persistence_error(error: RecordPersistenceError) -> Error {
    // Every database failure is terminal and generic to callers.
    Error::internal(error.to_string())
}

/// Application service for creating and resolving QR records.
#[derive(Clone)]
pub struct RecordService {
    repository: Arc<dyn RecordRepository>,
}

impl RecordService {
    /// Create a service over the given repository.
    pub fn new(repository: Arc<dyn RecordRepository>) -> Self {
        Self { repository }
    }

    /// Mint and persist a record, enforcing the per-VATIN cap.
    ///
    /// The cap check happens inside the repository's atomic insert, so two
    /// concurrent creations for the same VATIN serialise rather than racing
    /// past the limit.
    pub async fn create(&self, draft: RecordDraft) -> Result<QrRecord, Error> {
        let record = QrRecord::create(draft);
        let outcome = self
            .repository
            .insert_capped(&record, VATIN_RECORD_LIMIT)
            .await
            .map_err(map_persistence_error)?;
        match outcome {
            InsertOutcome::Inserted => Ok(record),
            InsertOutcome::LimitReached => Err(Error::limit_exceeded(format!(
                "QR code limit reached for this VATIN; at most {VATIN_RECORD_LIMIT} QR codes \
                 may be generated per VATIN"
            ))
            .with_details(serde_json::json!({ "vatin": record.vatin().as_str() }))),
        }
    }

    /// Resolve a record by its public lookup key.
    pub async fn lookup(&self, id: Uuid) -> Result<QrRecord, Error> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found(RECORD_NOT_FOUND_MESSAGE))
    }

    /// Total number of stored records, for the landing page.
    pub async fn total_records(&self) -> Result<u64, Error> {
        self.repository
            .count_all()
            .await
            .map_err(map_persistence_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::InMemoryRecordRepository;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn service() -> RecordService {
        RecordService::new(Arc::new(InMemoryRecordRepository::new()))
    }

    fn draft(vatin: &str) -> RecordDraft {
        RecordDraft::new(
            Some(vatin.to_owned()),
            Some("Ada".to_owned()),
            Some("Lovelace".to_owned()),
        )
        .expect("valid draft")
    }

    #[rstest]
    #[actix_web::test]
    async fn creates_and_resolves_records() {
        let service = service();
        let created = service.create(draft("HR100")).await.expect("create");
        let found = service.lookup(created.id()).await.expect("lookup");
        assert_eq!(found, created);
        assert_eq!(service.total_records().await.expect("count"), 1);
    }

    #[rstest]
    #[actix_web::test]
    async fn fourth_record_per_vatin_is_rejected() {
        let service = service();
        for _ in 0..VATIN_RECORD_LIMIT {
            service.create(draft("HR200")).await.expect("create");
        }
        let err = service
            .create(draft("HR200"))
            .await
            .expect_err("cap must hold");
        assert_eq!(err.code(), ErrorCode::LimitExceeded);
        assert_eq!(
            service.total_records().await.expect("count"),
            u64::from(VATIN_RECORD_LIMIT)
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_record_maps_to_not_found() {
        let err = service()
            .lookup(Uuid::new_v4())
            .await
            .expect_err("lookup must miss");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), RECORD_NOT_FOUND_MESSAGE);
    }
}
