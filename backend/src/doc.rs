//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI specification
//! for the HTTP interface. It registers:
//!
//! - **Paths**: the landing page, record creation and lookup, and the login
//!   flow endpoints
//! - **Schemas**: request/response payloads and the shared error envelope
//! - **Security**: the session cookie authentication scheme
//!
//! The generated specification backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::landing::LandingResponse;
use crate::inbound::http::records::{CreateRecordRequest, RecordResponse};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie established by the OpenID Connect login flow.",
            ))),
        );
    }
}

/// OpenAPI document for the HTTP interface.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "vatqr backend API",
        description = "QR-coded identity records keyed by VAT identification number."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::landing::landing,
        crate::inbound::http::records::creation_form,
        crate::inbound::http::records::create_record,
        crate::inbound::http::records::get_record,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::callback,
        crate::inbound::http::auth::logout,
    ),
    components(schemas(LandingResponse, CreateRecordRequest, RecordResponse, Error, ErrorCode)),
    tags(
        (name = "landing", description = "Public landing page"),
        (name = "records", description = "QR record creation and lookup"),
        (name = "auth", description = "OpenID Connect login flow")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn document_registers_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/",
            "/generate-qr",
            "/qr/{id}",
            "/login",
            "/callback",
            "/logout",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing path: {path}"
            );
        }
    }

    #[rstest]
    fn document_registers_the_error_envelope() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components present");
        assert!(components.schemas.contains_key("Error"));
        assert!(components.schemas.contains_key("ErrorCode"));
    }
}
