//! PostgreSQL persistence adapter using Diesel.
//!
//! Thin translation between Diesel rows and domain types; no business logic
//! lives here. Row structs and table definitions are internal details.

mod diesel_record_repository;
mod models;
mod pool;
mod schema;

pub use diesel_record_repository::DieselRecordRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
