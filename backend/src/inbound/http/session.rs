//! Session helpers keeping handlers free of framework-specific logic.
//!
//! Wraps the Actix cookie session behind domain-friendly operations: persist
//! a verified user, read them back, and stash the transient state of an
//! in-flight OpenID Connect login.

use actix_session::Session;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};

use crate::domain::ports::AuthenticatedUser;
use crate::domain::Error;

const USER_KEY: &str = "user";
const PENDING_LOGIN_KEY: &str = "oidc_login";

/// Verified identity stored in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Provider-issued subject identifier.
    pub subject: String,
    /// Display name claim, when the provider supplied one.
    pub name: Option<String>,
}

impl SessionUser {
    /// Display name for attribution, falling back to the subject.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.subject)
    }
}

impl From<&AuthenticatedUser> for SessionUser {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            subject: user.subject.clone(),
            name: user.name.clone(),
        }
    }
}

/// CSRF state and nonce held between `/login` and `/callback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLogin {
    /// Anti-forgery state the provider must echo back.
    pub csrf_state: String,
    /// Nonce the returned ID token must be bound to.
    pub nonce: String,
}

/// Newtype wrapper exposing higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the verified user and drop any in-flight login state.
    pub fn persist_user(&self, user: &AuthenticatedUser) -> Result<(), Error> {
        self.0.remove(PENDING_LOGIN_KEY);
        self.0
            .insert(USER_KEY, SessionUser::from(user))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current user from the session, if present.
    ///
    /// An undecodable value is treated as an absent session rather than an
    /// error; a stale or tampered cookie should just demand a fresh login.
    pub fn current_user(&self) -> Result<Option<SessionUser>, Error> {
        match self.0.get::<SessionUser>(USER_KEY) {
            Ok(user) => Ok(user),
            Err(error) => {
                tracing::warn!(%error, "invalid user entry in session cookie");
                Ok(None)
            }
        }
    }

    /// Require a verified session or fail with a login redirect.
    pub fn require_user(&self) -> Result<SessionUser, Error> {
        self.current_user()?
            .ok_or_else(|| Error::unauthenticated("login required"))
    }

    /// Stash the CSRF state and nonce of a login that has just begun.
    pub fn begin_login(&self, pending: &PendingLogin) -> Result<(), Error> {
        self.0
            .insert(PENDING_LOGIN_KEY, pending)
            .map_err(|error| Error::internal(format!("failed to persist login state: {error}")))
    }

    /// Take the in-flight login state, leaving none behind.
    ///
    /// Each stash is good for exactly one callback; a replayed callback finds
    /// nothing and is rejected.
    pub fn take_pending_login(&self) -> Result<Option<PendingLogin>, Error> {
        let pending = self
            .0
            .get::<PendingLogin>(PENDING_LOGIN_KEY)
            .map_err(|error| Error::internal(format!("failed to read login state: {error}")))?;
        self.0.remove(PENDING_LOGIN_KEY);
        Ok(pending)
    }

    /// Drop the whole session, ending any login.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
