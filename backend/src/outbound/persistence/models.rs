//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::qrs;

/// Row struct for reading from the qrs table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = qrs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct QrRow {
    pub id: Uuid,
    pub vatin: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = qrs)]
pub(crate) struct NewQrRow<'a> {
    pub id: Uuid,
    pub vatin: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub created_at: DateTime<Utc>,
}
