//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `migrations/` exactly;
//! regenerate with `diesel print-schema` after schema changes.

diesel::table! {
    /// QR identity records.
    ///
    /// Create-once/read-many: rows are never updated or deleted. The `id`
    /// column is the public lookup key embedded in generated QR codes.
    qrs (id) {
        /// Primary key: UUID v4 lookup key.
        id -> Uuid,
        /// Tax identifier; capped at 3 rows per value by the insert path.
        vatin -> Varchar,
        /// Given name for display.
        first_name -> Varchar,
        /// Family name for display.
        last_name -> Varchar,
        /// Server-side creation timestamp.
        created_at -> Timestamptz,
    }
}
