//! HTTP server assembly and lifecycle.
//!
//! Builds the Actix application from its dependencies, wires the session and
//! trace middleware, and binds the listener. When `EXTERNAL_URL` is set an
//! upstream proxy terminates TLS and the service listens plain HTTP;
//! otherwise it terminates TLS itself from the configured PEM files.

pub mod config;
pub mod tls;

pub use config::{AppConfig, ConfigError, DatabaseConfig, OidcConfig, TlsConfig};

use actix_session::{
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
    SessionMiddleware,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};
use tracing::info;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::auth::{callback, login, logout};
use crate::inbound::http::landing::landing;
use crate::inbound::http::records::{create_record, creation_form, get_record};
use crate::inbound::http::state::HttpState;
use crate::middleware::Trace;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

const SESSION_TTL_HOURS: i64 = 2;

#[derive(Clone)]
struct AppDependencies {
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
}

fn session_middleware(key: Key, cookie_secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(
            PersistentSession::default()
                .session_ttl(actix_web::cookie::time::Duration::hours(SESSION_TTL_HOURS)),
        )
        .build()
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        key,
        cookie_secure,
    } = deps;

    let app = App::new()
        .app_data(http_state)
        .wrap(session_middleware(key, cookie_secure))
        .wrap(Trace)
        .service(landing)
        .service(creation_form)
        .service(create_record)
        .service(get_record)
        .service(login)
        .service(callback)
        .service(logout);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Bind the listener and run the server until shutdown.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when TLS material cannot be loaded, the
/// socket cannot be bound, or the server fails while running.
pub async fn run(config: AppConfig, state: HttpState) -> std::io::Result<()> {
    let http_state = web::Data::new(state);
    let key = config.session_key.clone();
    // Cookies stay plain-HTTP-compatible only when the public URL itself is.
    let cookie_secure = config.public_url().scheme() == "https";
    let port = config.port;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
        })
    });

    match &config.external_url {
        Some(external) => {
            info!(external = %external, port, "listening for plain HTTP behind TLS terminator");
            server.bind(("0.0.0.0", port))?.run().await
        }
        None => {
            let tls_config = tls::load_server_config(&config.tls.cert_file, &config.tls.key_file)
                .map_err(std::io::Error::other)?;
            info!(port, "listening with local TLS termination");
            server
                .bind_rustls_0_23(("0.0.0.0", port), tls_config)?
                .run()
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;

    use crate::inbound::http::test_utils::fixture_state;

    #[rstest]
    #[actix_web::test]
    async fn assembled_app_serves_the_landing_page() {
        let app = test::init_service(build_app(AppDependencies {
            http_state: web::Data::new(fixture_state()),
            key: Key::generate(),
            cookie_secure: false,
        }))
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn assembled_app_gates_record_creation() {
        let app = test::init_service(build_app(AppDependencies {
            http_state: web::Data::new(fixture_state()),
            key: Key::generate(),
            cookie_secure: false,
        }))
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/generate-qr").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }
}
