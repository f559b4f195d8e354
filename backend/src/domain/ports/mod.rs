//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (database, identity provider, QR renderer). Each trait exposes strongly
//! typed errors so adapters map their failures into predictable variants.

mod identity_provider;
mod qr_renderer;
mod record_repository;

pub use identity_provider::{
    AuthenticatedUser, FixtureIdentityProvider, IdentityError, IdentityProvider, LoginAttempt,
};
pub use qr_renderer::{QrRenderError, QrRenderer};
pub use record_repository::{
    InMemoryRecordRepository, InsertOutcome, RecordPersistenceError, RecordRepository,
};
