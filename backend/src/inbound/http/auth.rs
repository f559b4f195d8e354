//! Login flow endpoints delegating to the external identity provider.
//!
//! ```text
//! GET /login     start the authorization-code flow
//! GET /callback  complete it and establish the session
//! GET /logout    end the session (and the provider session, if supported)
//! ```

use actix_web::http::header::LOCATION;
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use tracing::info;

use crate::domain::ports::IdentityError;
use crate::domain::Error;
use crate::inbound::http::session::{PendingLogin, SessionContext};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Query parameters the provider appends to the callback redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .finish()
}

fn map_identity_error(err: IdentityError) -> Error {
    match err {
        IdentityError::CodeExchange { .. } | IdentityError::TokenVerification { .. } => {
            Error::invalid_request(format!("login failed: {err}"))
        }
        IdentityError::Unavailable { .. } => Error::internal(err.to_string()),
    }
}

/// Begin a provider login and redirect to its authorization page.
#[utoipa::path(
    get,
    path = "/login",
    responses((status = 303, description = "Redirect to the identity provider")),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[get("/login")]
pub async fn login(state: web::Data<HttpState>, session: SessionContext) -> ApiResult<HttpResponse> {
    let attempt = state.identity.begin_login();
    session.begin_login(&PendingLogin {
        csrf_state: attempt.csrf_state,
        nonce: attempt.nonce,
    })?;
    Ok(see_other(attempt.authorize_url.as_str()))
}

/// Complete the provider login and establish the session.
#[utoipa::path(
    get,
    path = "/callback",
    responses(
        (status = 303, description = "Session established; redirect to landing"),
        (status = 400, description = "Provider error, state mismatch, or failed exchange", body = Error)
    ),
    tags = ["auth"],
    operation_id = "loginCallback",
    security([])
)]
#[get("/callback")]
pub async fn callback(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<CallbackQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        return Err(Error::invalid_request(format!(
            "identity provider returned an error: {error} {description}"
        )));
    }

    let pending = session
        .take_pending_login()?
        .ok_or_else(|| Error::invalid_request("no login in progress"))?;
    if query.state.as_deref() != Some(pending.csrf_state.as_str()) {
        return Err(Error::invalid_request("login state mismatch"));
    }
    let code = query
        .code
        .ok_or_else(|| Error::invalid_request("missing authorization code"))?;

    let user = state
        .identity
        .complete_login(&code, &pending.nonce)
        .await
        .map_err(map_identity_error)?;
    info!(subject = %user.subject, "login completed");
    session.persist_user(&user)?;

    Ok(see_other("/"))
}

/// End the session, and the provider session when it supports it.
#[utoipa::path(
    get,
    path = "/logout",
    responses((status = 303, description = "Session cleared; redirect to landing or provider logout")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[get("/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    session.purge();
    Ok(match state.identity.logout_url() {
        Some(url) => see_other(url.as_str()),
        None => see_other("/"),
    })
}
