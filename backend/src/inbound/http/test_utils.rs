//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::Key;
use url::Url;

use crate::domain::ports::{FixtureIdentityProvider, InMemoryRecordRepository};
use crate::domain::RecordService;
use crate::inbound::http::state::HttpState;
use crate::outbound::PngQrRenderer;

/// Build a session middleware configured for tests.
///
/// Generates a fresh signing key per invocation and disables the `Secure`
/// flag so plain-HTTP test requests keep their cookies.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// HTTP state over in-memory fixtures, no network or database required.
pub fn fixture_state() -> HttpState {
    HttpState::new(
        RecordService::new(Arc::new(InMemoryRecordRepository::new())),
        Arc::new(FixtureIdentityProvider),
        Arc::new(PngQrRenderer::default()),
        Url::parse("https://qr.example.com").unwrap_or_else(|err| {
            panic!("fixture base url must parse: {err}");
        }),
    )
}
