//! Identity verification port.
//!
//! Session establishment is delegated to an external OpenID Connect provider.
//! The port exposes just the three moments the handlers need: starting a
//! login, completing it with an authorization code, and ending it.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// The verified identity returned by a completed login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Stable provider-issued subject identifier.
    pub subject: String,
    /// End-user display name claim, when the provider supplies one.
    pub name: Option<String>,
}

impl AuthenticatedUser {
    /// Display name for attribution, falling back to the subject.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.subject)
    }
}

/// A freshly minted authorization request.
///
/// The CSRF state and nonce must be stashed in the caller's session and
/// checked again when the provider redirects back.
#[derive(Debug, Clone)]
pub struct LoginAttempt {
    /// Provider authorization endpoint with all query parameters applied.
    pub authorize_url: Url,
    /// Anti-forgery state echoed back by the provider.
    pub csrf_state: String,
    /// Nonce bound into the ID token.
    pub nonce: String,
}

/// Errors surfaced by the identity adapter.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider rejected the authorization code exchange.
    #[error("authorization code exchange failed: {message}")]
    CodeExchange {
        /// Adapter-provided description of the failure.
        message: String,
    },
    /// The returned ID token failed verification.
    #[error("identity token verification failed: {message}")]
    TokenVerification {
        /// Adapter-provided description of the failure.
        message: String,
    },
    /// The provider could not be reached or configured.
    #[error("identity provider unavailable: {message}")]
    Unavailable {
        /// Adapter-provided description of the failure.
        message: String,
    },
}

impl IdentityError {
    /// Create a code-exchange error with the given message.
    pub fn code_exchange(message: impl Into<String>) -> Self {
        Self::CodeExchange {
            message: message.into(),
        }
    }

    /// Create a token-verification error with the given message.
    pub fn token_verification(message: impl Into<String>) -> Self {
        Self::TokenVerification {
            message: message.into(),
        }
    }

    /// Create an unavailability error with the given message.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Port over the external identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Mint an authorization request for the provider's login page.
    fn begin_login(&self) -> LoginAttempt;

    /// Exchange the callback code and verify the ID token against the nonce
    /// stashed when the login began.
    async fn complete_login(
        &self,
        code: &str,
        expected_nonce: &str,
    ) -> Result<AuthenticatedUser, IdentityError>;

    /// Provider end-session URL, when it advertises RP-initiated logout.
    fn logout_url(&self) -> Option<Url>;
}

/// Deterministic identity provider for tests.
///
/// Accepts only [`FixtureIdentityProvider::VALID_CODE`] and returns a fixed
/// user, so handler tests can drive the whole login flow without a network.
#[derive(Debug, Clone, Default)]
pub struct FixtureIdentityProvider;

impl FixtureIdentityProvider {
    /// The only authorization code the fixture accepts.
    pub const VALID_CODE: &'static str = "fixture-code";
    /// CSRF state issued by [`IdentityProvider::begin_login`].
    pub const CSRF_STATE: &'static str = "fixture-state";
    /// Nonce issued by [`IdentityProvider::begin_login`].
    pub const NONCE: &'static str = "fixture-nonce";
    /// Subject of the fixture user.
    pub const SUBJECT: &'static str = "auth0|fixture";
    /// Display name of the fixture user.
    pub const NAME: &'static str = "Ada Lovelace";
}

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    fn begin_login(&self) -> LoginAttempt {
        let authorize_url = Url::parse(&format!(
            "https://idp.example/authorize?state={}&nonce={}",
            Self::CSRF_STATE,
            Self::NONCE
        ))
        .unwrap_or_else(|err| panic!("fixture authorize url must parse: {err}"));
        LoginAttempt {
            authorize_url,
            csrf_state: Self::CSRF_STATE.to_owned(),
            nonce: Self::NONCE.to_owned(),
        }
    }

    async fn complete_login(
        &self,
        code: &str,
        expected_nonce: &str,
    ) -> Result<AuthenticatedUser, IdentityError> {
        if code != Self::VALID_CODE {
            return Err(IdentityError::code_exchange("unknown authorization code"));
        }
        if expected_nonce != Self::NONCE {
            return Err(IdentityError::token_verification("nonce mismatch"));
        }
        Ok(AuthenticatedUser {
            subject: Self::SUBJECT.to_owned(),
            name: Some(Self::NAME.to_owned()),
        })
    }

    fn logout_url(&self) -> Option<Url> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn display_name_falls_back_to_subject() {
        let named = AuthenticatedUser {
            subject: "auth0|123".to_owned(),
            name: Some("Ada".to_owned()),
        };
        assert_eq!(named.display_name(), "Ada");

        let anonymous = AuthenticatedUser {
            subject: "auth0|123".to_owned(),
            name: None,
        };
        assert_eq!(anonymous.display_name(), "auth0|123");
    }

    #[rstest]
    #[actix_web::test]
    async fn fixture_rejects_unknown_codes() {
        let provider = FixtureIdentityProvider;
        let err = provider
            .complete_login("wrong", FixtureIdentityProvider::NONCE)
            .await
            .expect_err("unknown code must fail");
        assert!(matches!(err, IdentityError::CodeExchange { .. }));
    }
}
