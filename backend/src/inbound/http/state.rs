//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data`, so they depend only on
//! domain ports and stay testable without a database, a provider, or the
//! rendering library. Nothing in the process holds these as globals.

use std::sync::Arc;

use url::Url;

use crate::domain::ports::{IdentityProvider, QrRenderer};
use crate::domain::RecordService;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Record creation and lookup use-cases.
    pub records: RecordService,
    /// External identity provider adapter.
    pub identity: Arc<dyn IdentityProvider>,
    /// QR bitmap renderer.
    pub qr: Arc<dyn QrRenderer>,
    /// Public base URL embedded in generated lookup links.
    pub base_url: Url,
}

impl HttpState {
    /// Bundle the port implementations handlers need.
    pub fn new(
        records: RecordService,
        identity: Arc<dyn IdentityProvider>,
        qr: Arc<dyn QrRenderer>,
        base_url: Url,
    ) -> Self {
        Self {
            records,
            identity,
            qr,
            base_url,
        }
    }

    /// Absolute lookup URL for a record id, the string encoded into QR codes.
    pub fn lookup_url(&self, id: uuid::Uuid) -> String {
        format!("{}/qr/{id}", self.base_url.as_str().trim_end_matches('/'))
    }
}
