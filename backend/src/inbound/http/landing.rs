//! Public landing endpoint.
//!
//! ```text
//! GET /
//! ```

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Landing page payload: record count plus the caller's session state.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LandingResponse {
    /// Number of records stored at query time.
    #[schema(example = 42)]
    pub total_records: u64,
    /// Whether the caller holds a verified session.
    pub authenticated: bool,
}

/// Record count and authentication state; no session required.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Landing summary", body = LandingResponse),
        (status = 500, description = "Internal server error")
    ),
    tags = ["landing"],
    operation_id = "landing",
    security([])
)]
#[get("/")]
pub async fn landing(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<LandingResponse>> {
    let total_records = state.records.total_records().await?;
    let authenticated = session.current_user()?.is_some();
    Ok(web::Json(LandingResponse {
        total_records,
        authenticated,
    }))
}
