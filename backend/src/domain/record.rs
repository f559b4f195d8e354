//! QR record data model.
//!
//! A record ties a VATIN (tax identifier) to a person's display name. Records
//! are create-once/read-many: `id` and `created_at` are assigned server-side
//! at creation and never change afterwards.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound on stored VATIN length.
pub const VATIN_MAX_LEN: usize = 32;
/// Upper bound on stored name length.
pub const NAME_MAX_LEN: usize = 64;

/// Validation failures raised while assembling a [`RecordDraft`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordValidationError {
    /// A required field is absent or blank.
    #[error("missing '{field}' in request body")]
    MissingField {
        /// Request field name as clients send it.
        field: &'static str,
    },
    /// A field exceeds its stored length cap.
    #[error("'{field}' must be at most {max} characters")]
    FieldTooLong {
        /// Request field name as clients send it.
        field: &'static str,
        /// Maximum accepted length.
        max: usize,
    },
}

impl RecordValidationError {
    /// Request field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } | Self::FieldTooLong { field, .. } => field,
        }
    }
}

fn validated_field(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<String, RecordValidationError> {
    let value = value.unwrap_or_default();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RecordValidationError::MissingField { field });
    }
    if trimmed.chars().count() > max {
        return Err(RecordValidationError::FieldTooLong { field, max });
    }
    Ok(trimmed.to_owned())
}

/// Validated tax identifier.
///
/// No country-specific checksum is applied; the identifier is treated as an
/// opaque non-empty string, capped so it fits the storage column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vatin(String);

impl Vatin {
    /// Validate and construct a [`Vatin`].
    pub fn new(raw: impl Into<String>) -> Result<Self, RecordValidationError> {
        validated_field("vatin", Some(raw.into()), VATIN_MAX_LEN).map(Self)
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Vatin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Vatin {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validated input for record creation, before an identity is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    vatin: Vatin,
    first_name: String,
    last_name: String,
}

impl RecordDraft {
    /// Validate raw request fields into a draft.
    ///
    /// Each field must be present and non-blank; the offending request field
    /// is named in the returned error so the HTTP adapter can surface it.
    pub fn new(
        vatin: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Result<Self, RecordValidationError> {
        let vatin = validated_field("vatin", vatin, VATIN_MAX_LEN).map(Vatin)?;
        let first_name = validated_field("firstName", first_name, NAME_MAX_LEN)?;
        let last_name = validated_field("lastName", last_name, NAME_MAX_LEN)?;
        Ok(Self {
            vatin,
            first_name,
            last_name,
        })
    }

    /// Tax identifier the record will be counted against.
    pub fn vatin(&self) -> &Vatin {
        &self.vatin
    }
}

/// A persisted (or about-to-be-persisted) QR identity record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrRecord {
    id: Uuid,
    vatin: Vatin,
    first_name: String,
    last_name: String,
    created_at: DateTime<Utc>,
}

impl QrRecord {
    /// Mint a new record from a validated draft.
    ///
    /// Assigns a fresh v4 UUID as the public lookup key and stamps the
    /// server-side creation time.
    pub fn create(draft: RecordDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            vatin: draft.vatin,
            first_name: draft.first_name,
            last_name: draft.last_name,
            created_at: Utc::now(),
        }
    }

    /// Rehydrate a record from storage.
    ///
    /// Stored rows were validated on the way in, but the constructor still
    /// revalidates so a hand-edited row cannot smuggle blank fields into the
    /// domain.
    pub fn from_storage(
        id: Uuid,
        vatin: String,
        first_name: String,
        last_name: String,
        created_at: DateTime<Utc>,
    ) -> Result<Self, RecordValidationError> {
        let draft = RecordDraft::new(Some(vatin), Some(first_name), Some(last_name))?;
        Ok(Self {
            id,
            vatin: draft.vatin,
            first_name: draft.first_name,
            last_name: draft.last_name,
            created_at,
        })
    }

    /// Public lookup key.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Tax identifier the record is counted against.
    pub fn vatin(&self) -> &Vatin {
        &self.vatin
    }

    /// Given name for display.
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Family name for display.
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Server-side creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn field(value: &str) -> Option<String> {
        Some(value.to_owned())
    }

    #[rstest]
    #[case(None, field("Ada"), field("Lovelace"), "vatin")]
    #[case(field(""), field("Ada"), field("Lovelace"), "vatin")]
    #[case(field("  "), field("Ada"), field("Lovelace"), "vatin")]
    #[case(field("HR12345678901"), None, field("Lovelace"), "firstName")]
    #[case(field("HR12345678901"), field("Ada"), None, "lastName")]
    fn rejects_missing_fields(
        #[case] vatin: Option<String>,
        #[case] first: Option<String>,
        #[case] last: Option<String>,
        #[case] expected_field: &str,
    ) {
        let err = RecordDraft::new(vatin, first, last).expect_err("draft must fail");
        assert_eq!(err.field(), expected_field);
        assert!(matches!(err, RecordValidationError::MissingField { .. }));
    }

    #[rstest]
    fn rejects_overlong_vatin() {
        let err = RecordDraft::new(
            field(&"9".repeat(VATIN_MAX_LEN + 1)),
            field("Ada"),
            field("Lovelace"),
        )
        .expect_err("overlong vatin must fail");
        assert_eq!(
            err,
            RecordValidationError::FieldTooLong {
                field: "vatin",
                max: VATIN_MAX_LEN
            }
        );
    }

    #[rstest]
    fn trims_surrounding_whitespace() {
        let draft = RecordDraft::new(field(" HR123 "), field(" Ada "), field(" Lovelace "))
            .expect("valid draft");
        let record = QrRecord::create(draft);
        assert_eq!(record.vatin().as_str(), "HR123");
        assert_eq!(record.first_name(), "Ada");
        assert_eq!(record.last_name(), "Lovelace");
    }

    #[rstest]
    fn create_assigns_distinct_ids() {
        let draft = || {
            RecordDraft::new(field("HR123"), field("Ada"), field("Lovelace")).expect("valid draft")
        };
        assert_ne!(QrRecord::create(draft()).id(), QrRecord::create(draft()).id());
    }

    #[rstest]
    fn from_storage_rejects_blank_rows() {
        let err = QrRecord::from_storage(
            Uuid::new_v4(),
            String::new(),
            "Ada".to_owned(),
            "Lovelace".to_owned(),
            Utc::now(),
        )
        .expect_err("blank vatin must fail");
        assert_eq!(err.field(), "vatin");
    }
}
