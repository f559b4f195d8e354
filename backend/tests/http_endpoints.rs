//! End-to-end handler tests over in-memory fixtures.
//!
//! Drives the full login flow against the deterministic identity fixture and
//! exercises record creation, lookup, gating, and the landing page through
//! the assembled Actix application.

use std::sync::Arc;

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use rstest::rstest;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use vatqr::domain::ports::{
    FixtureIdentityProvider, InMemoryRecordRepository, RecordRepository,
};
use vatqr::domain::{QrRecord, RecordDraft, RecordService, VATIN_RECORD_LIMIT};
use vatqr::inbound::http::auth::{callback, login, logout};
use vatqr::inbound::http::landing::landing;
use vatqr::inbound::http::records::{create_record, creation_form, get_record};
use vatqr::inbound::http::state::HttpState;
use vatqr::outbound::PngQrRenderer;
use vatqr::Trace;

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

fn fixture_state(repository: Arc<InMemoryRecordRepository>) -> HttpState {
    HttpState::new(
        RecordService::new(repository),
        Arc::new(FixtureIdentityProvider),
        Arc::new(PngQrRenderer::default()),
        Url::parse("https://qr.example.com").expect("fixture base url must parse"),
    )
}

async fn test_app(
    state: HttpState,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .wrap(Trace)
            .service(landing)
            .service(creation_form)
            .service(create_record)
            .service(get_record)
            .service(login)
            .service(callback)
            .service(logout),
    )
    .await
}

fn session_cookie(resp: &ServiceResponse) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// Drive `/login` then `/callback` and return the authenticated cookie.
async fn log_in(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
) -> Cookie<'static> {
    let begin = test::call_service(app, test::TestRequest::get().uri("/login").to_request()).await;
    assert_eq!(begin.status(), StatusCode::SEE_OTHER);
    let pending = session_cookie(&begin).expect("login must stash pending state");

    let complete = test::call_service(
        app,
        test::TestRequest::get()
            .uri(&format!(
                "/callback?code={}&state={}",
                FixtureIdentityProvider::VALID_CODE,
                FixtureIdentityProvider::CSRF_STATE
            ))
            .cookie(pending)
            .to_request(),
    )
    .await;
    assert_eq!(complete.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        complete
            .headers()
            .get(header::LOCATION)
            .expect("location header"),
        "/"
    );
    session_cookie(&complete).expect("callback must establish a session")
}

fn valid_form() -> Vec<(&'static str, &'static str)> {
    vec![
        ("vatin", "PL1234567890"),
        ("firstName", "Grace"),
        ("lastName", "Hopper"),
    ]
}

#[rstest]
#[actix_web::test]
async fn landing_page_reports_count_and_authentication() {
    let repository = Arc::new(InMemoryRecordRepository::new());
    let app = test_app(fixture_state(repository)).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["totalRecords"], 0);
    assert_eq!(body["authenticated"], false);

    let cookie = log_in(&app).await;
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["authenticated"], true);

    let created = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/generate-qr")
            .cookie(cookie.clone())
            .set_form(valid_form())
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::OK);

    // The count reflects the stored rows at query time.
    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/").cookie(cookie).to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["totalRecords"], 1);
}

#[rstest]
#[case::form("/generate-qr")]
#[case::lookup("/qr/7c9e6679-7425-40de-963d-ce19eaf18a12")]
#[actix_web::test]
async fn gated_routes_redirect_anonymous_visitors_to_login(#[case] uri: &str) {
    let app = test_app(fixture_state(Arc::new(InMemoryRecordRepository::new()))).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).expect("location header"),
        "/login"
    );
}

#[rstest]
#[actix_web::test]
async fn authenticated_visitor_sees_the_creation_form() {
    let app = test_app(fixture_state(Arc::new(InMemoryRecordRepository::new()))).await;
    let cookie = log_in(&app).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/generate-qr")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .expect("content type");
    assert!(content_type.starts_with("text/html"));
    let body = test::read_body(resp).await;
    assert!(std::str::from_utf8(&body)
        .expect("html body")
        .contains("name=\"vatin\""));
}

#[rstest]
#[actix_web::test]
async fn creating_a_record_returns_a_png() {
    let app = test_app(fixture_state(Arc::new(InMemoryRecordRepository::new()))).await;
    let cookie = log_in(&app).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/generate-qr")
            .cookie(cookie)
            .set_form(valid_form())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).expect("content type"),
        "image/png"
    );
    let body = test::read_body(resp).await;
    assert_eq!(&body[..PNG_MAGIC.len()], &PNG_MAGIC);
}

#[rstest]
#[actix_web::test]
async fn creation_accepts_json_payloads_too() {
    let app = test_app(fixture_state(Arc::new(InMemoryRecordRepository::new()))).await;
    let cookie = log_in(&app).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/generate-qr")
            .cookie(cookie)
            .set_json(serde_json::json!({
                "vatin": "PL1234567890",
                "firstName": "Grace",
                "lastName": "Hopper",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).expect("content type"),
        "image/png"
    );
}

#[rstest]
#[case::vatin("vatin")]
#[case::first_name("firstName")]
#[case::last_name("lastName")]
#[actix_web::test]
async fn creation_rejects_a_missing_field(#[case] missing: &str) {
    let app = test_app(fixture_state(Arc::new(InMemoryRecordRepository::new()))).await;
    let cookie = log_in(&app).await;

    let form: Vec<_> = valid_form()
        .into_iter()
        .filter(|(name, _)| *name != missing)
        .collect();
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/generate-qr")
            .cookie(cookie)
            .set_form(form)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], missing);
}

#[rstest]
#[actix_web::test]
async fn a_vatin_is_capped_at_three_records() {
    let app = test_app(fixture_state(Arc::new(InMemoryRecordRepository::new()))).await;
    let cookie = log_in(&app).await;

    for _ in 0..VATIN_RECORD_LIMIT {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/generate-qr")
                .cookie(cookie.clone())
                .set_form(valid_form())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/generate-qr")
            .cookie(cookie)
            .set_form(valid_form())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "limit_exceeded");
    assert_eq!(body["details"]["vatin"], "PL1234567890");
}

#[rstest]
#[actix_web::test]
async fn lookup_returns_the_stored_record_with_attribution() {
    let repository = Arc::new(InMemoryRecordRepository::new());
    let draft = RecordDraft::new(
        Some("PL1234567890".to_owned()),
        Some("Grace".to_owned()),
        Some("Hopper".to_owned()),
    )
    .expect("valid draft");
    let record = QrRecord::create(draft);
    repository
        .insert_capped(&record, VATIN_RECORD_LIMIT)
        .await
        .expect("insert fixture record");

    let app = test_app(fixture_state(repository)).await;
    let cookie = log_in(&app).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/qr/{}", record.id()))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], record.id().to_string().as_str());
    assert_eq!(body["vatin"], "PL1234567890");
    assert_eq!(body["firstName"], "Grace");
    assert_eq!(body["lastName"], "Hopper");
    assert_eq!(body["viewedBy"], FixtureIdentityProvider::NAME);
}

#[rstest]
#[case::unknown(Uuid::nil().to_string())]
#[case::malformed("not-a-uuid".to_owned())]
#[actix_web::test]
async fn lookup_misses_are_plain_text_not_found(#[case] id: String) {
    let app = test_app(fixture_state(Arc::new(InMemoryRecordRepository::new()))).await;
    let cookie = log_in(&app).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/qr/{id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .expect("content type");
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(test::read_body(resp).await, "QR code not found.".as_bytes());
}

#[rstest]
#[actix_web::test]
async fn callback_rejects_a_mismatched_state() {
    let app = test_app(fixture_state(Arc::new(InMemoryRecordRepository::new()))).await;

    let begin = test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
    let pending = session_cookie(&begin).expect("pending state cookie");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/callback?code={}&state=forged",
                FixtureIdentityProvider::VALID_CODE
            ))
            .cookie(pending)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn callback_without_a_pending_login_is_rejected() {
    let app = test_app(fixture_state(Arc::new(InMemoryRecordRepository::new()))).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/callback?code={}&state={}",
                FixtureIdentityProvider::VALID_CODE,
                FixtureIdentityProvider::CSRF_STATE
            ))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn logout_ends_the_session() {
    let app = test_app(fixture_state(Arc::new(InMemoryRecordRepository::new()))).await;
    let cookie = log_in(&app).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    // The fixture provider advertises no end-session endpoint.
    assert_eq!(
        resp.headers().get(header::LOCATION).expect("location header"),
        "/"
    );
    let cleared = session_cookie(&resp).expect("logout must rewrite the cookie");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/generate-qr")
            .cookie(cleared)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}
