//! HTTP mapping for domain errors.
//!
//! Keeps the domain error type HTTP-agnostic while giving Actix handlers a
//! consistent translation:
//!
//! - `invalid_request` / `limit_exceeded` → 400 with a JSON envelope
//! - `unauthenticated` → 303 redirect into the login flow
//! - `not_found` → 404 with a plain-text body
//! - `internal_error` → 500 with a redacted JSON envelope, details logged

use actix_web::http::header::{ContentType, LOCATION};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};
use crate::middleware::trace::TraceId;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Route unauthenticated callers are redirected to.
pub const LOGIN_PATH: &str = "/login";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest | ErrorCode::LimitExceeded => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthenticated => StatusCode::SEE_OTHER,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn with_ambient_trace(error: &Error) -> Error {
    match (error.trace_id(), TraceId::current()) {
        (None, Some(id)) => error.clone().with_trace_id(id.to_string()),
        _ => error.clone(),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let error = with_ambient_trace(self);
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = error.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        match error.code() {
            ErrorCode::Unauthenticated => builder.insert_header((LOCATION, LOGIN_PATH)).finish(),
            ErrorCode::NotFound => builder
                .content_type(ContentType::plaintext())
                .body(error.message().to_owned()),
            ErrorCode::InternalError => {
                error!(message = error.message(), "request failed with internal error");
                let mut redacted = Error::internal("Internal server error");
                if let Some(id) = error.trace_id() {
                    redacted = redacted.with_trace_id(id.to_owned());
                }
                builder.json(redacted)
            }
            ErrorCode::InvalidRequest | ErrorCode::LimitExceeded => builder.json(error),
        }
    }
}
