//! Record endpoints: creation form, creation, and lookup.
//!
//! ```text
//! GET  /generate-qr                         (session required)
//! POST /generate-qr {vatin, firstName, lastName}
//! GET  /qr/{id}
//! ```

use actix_web::http::header::ContentType;
use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, RecordDraft, RecordValidationError, RECORD_NOT_FOUND_MESSAGE};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Creation request body, accepted as JSON or form-urlencoded.
///
/// Fields are optional at the serde layer so that a missing field produces
/// a 400 envelope naming the field, not a generic deserialise error.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordRequest {
    /// Tax identifier the record is counted against.
    #[schema(example = "HR12345678901")]
    pub vatin: Option<String>,
    /// Given name for display.
    #[schema(example = "Ada")]
    pub first_name: Option<String>,
    /// Family name for display.
    #[schema(example = "Lovelace")]
    pub last_name: Option<String>,
}

/// Record detail payload returned by lookups.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    /// Public lookup key.
    pub id: Uuid,
    /// Tax identifier.
    pub vatin: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Server-side creation timestamp.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Display name of the session that viewed the record, for attribution.
    pub viewed_by: String,
}

fn map_validation_error(err: RecordValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "field": err.field() }))
}

/// Minimal creation form so the service is usable without a separate client.
const CREATION_FORM_HTML: &str = concat!(
    "<!doctype html>\n",
    "<html lang=\"en\">\n",
    "<head><meta charset=\"utf-8\"><title>Generate QR code</title></head>\n",
    "<body>\n",
    "<h1>Generate QR code</h1>\n",
    "<form method=\"post\" action=\"/generate-qr\">\n",
    "  <label>VATIN <input name=\"vatin\" required></label><br>\n",
    "  <label>First name <input name=\"firstName\" required></label><br>\n",
    "  <label>Last name <input name=\"lastName\" required></label><br>\n",
    "  <button type=\"submit\">Generate</button>\n",
    "</form>\n",
    "</body>\n",
    "</html>\n",
);

/// Serve the record-creation form.
#[utoipa::path(
    get,
    path = "/generate-qr",
    responses(
        (status = 200, description = "Creation form", content_type = "text/html"),
        (status = 303, description = "Redirect to login when unauthenticated")
    ),
    tags = ["records"],
    operation_id = "creationForm"
)]
#[get("/generate-qr")]
pub async fn creation_form(session: SessionContext) -> ApiResult<HttpResponse> {
    session.require_user()?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(CREATION_FORM_HTML))
}

/// Create a record and return its lookup URL rendered as a QR PNG.
#[utoipa::path(
    post,
    path = "/generate-qr",
    request_body = CreateRecordRequest,
    responses(
        (status = 200, description = "QR image for the new record", content_type = "image/png"),
        (status = 303, description = "Redirect to login when unauthenticated"),
        (status = 400, description = "Missing field or VATIN limit reached", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["records"],
    operation_id = "createRecord"
)]
#[post("/generate-qr")]
pub async fn create_record(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Either<web::Json<CreateRecordRequest>, web::Form<CreateRecordRequest>>,
) -> ApiResult<HttpResponse> {
    session.require_user()?;
    let payload = match body {
        web::Either::Left(json) => json.into_inner(),
        web::Either::Right(form) => form.into_inner(),
    };

    let draft = RecordDraft::new(payload.vatin, payload.first_name, payload.last_name)
        .map_err(map_validation_error)?;
    let record = state.records.create(draft).await?;

    let lookup_url = state.lookup_url(record.id());
    let png = state
        .qr
        .render_png(&lookup_url)
        .map_err(|err| Error::internal(err.to_string()))?;

    Ok(HttpResponse::Ok().content_type(ContentType::png()).body(png))
}

/// Resolve a record by the identifier embedded in its QR code.
#[utoipa::path(
    get,
    path = "/qr/{id}",
    params(("id" = Uuid, Path, description = "Record lookup key")),
    responses(
        (status = 200, description = "Record detail", body = RecordResponse),
        (status = 303, description = "Redirect to login when unauthenticated"),
        (status = 404, description = "Unknown record", content_type = "text/plain"),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["records"],
    operation_id = "getRecord"
)]
#[get("/qr/{id}")]
pub async fn get_record(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<RecordResponse>> {
    let user = session.require_user()?;
    // A malformed id is indistinguishable from an unknown one to callers.
    let id = Uuid::parse_str(&path.into_inner())
        .map_err(|_| Error::not_found(RECORD_NOT_FOUND_MESSAGE))?;
    let record = state.records.lookup(id).await?;

    Ok(web::Json(RecordResponse {
        id: record.id(),
        vatin: record.vatin().as_str().to_owned(),
        first_name: record.first_name().to_owned(),
        last_name: record.last_name().to_owned(),
        created_at: record.created_at(),
        viewed_by: user.display_name().to_owned(),
    }))
}
