//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repository via Diesel
//! - **oidc**: OpenID Connect relying-party flow
//! - **qr_png**: QR bitmap rendering
//!
//! Adapters translate between domain types and infrastructure
//! representations; they carry no business logic.

pub mod oidc;
pub mod persistence;
pub mod qr_png;

pub use oidc::OidcIdentityProvider;
pub use qr_png::PngQrRenderer;
