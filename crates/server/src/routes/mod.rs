//! HTTP route handlers for the event server.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness
//! GET    /health/ready              - Readiness (database)
//!
//! # Auth
//! POST   /api/auth/login            - Email + employee ID login (rate limited)
//! POST   /api/auth/logout           - Clear session cookie
//!
//! # Attendee (any session)
//! GET    /api/me                    - Current attendee record
//! GET    /api/me/qr                 - QR code of the attendee's employee ID
//!
//! # Staff (staff or admin)
//! POST   /api/redeem                - Redeem one unit of an item
//! POST   /api/checkin               - Mark attendee as checked in
//!
//! # Admin
//! GET    /api/admin/attendees       - Search and paginate attendees
//! POST   /api/admin/attendees       - Create attendee
//! PATCH  /api/admin/attendees/{id}  - Partial update
//! DELETE /api/admin/attendees/{id}  - Delete attendee without history
//! GET    /api/admin/logs            - Redemption log (JSON or CSV)
//! ```

pub mod admin;
pub mod auth;
pub mod checkin;
pub mod health;
pub mod me;
pub mod redeem;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::{auth_rate_limiter, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Create the auth routes router. Only login is rate limited.
pub fn auth_routes(trust_proxy_headers: bool) -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter(trust_proxy_headers))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the event server.
///
/// `trust_proxy_headers` selects where the login limiter reads client IPs from.
pub fn routes(trust_proxy_headers: bool) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/auth", auth_routes(trust_proxy_headers))
        .route("/api/me", get(me::me))
        .route("/api/me/qr", get(me::qr_code))
        .route("/api/redeem", post(redeem::redeem))
        .route("/api/checkin", post(checkin::checkin))
        .nest("/api/admin", admin::admin_routes())
        .fallback(not_found)
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

/// Build the full application: routes, middleware and state.
///
/// Sentry layers are added by the binary so tests can run without a client.
pub fn router(state: AppState) -> Router {
    routes(state.config().trust_proxy_headers)
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::net::SocketAddr;

    use axum::{
        body::{Body, to_bytes},
        extract::ConnectInfo,
        http::{Request, StatusCode, header},
    };
    use chrono::Utc;
    use secrecy::SecretString;
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use eventpass_core::{AttendeeId, Role};

    use super::*;
    use crate::config::ServerConfig;
    use crate::models::SessionClaims;

    fn test_state() -> AppState {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/eventpass_unreachable"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("Zq8#vL2@pX9!mR4$tK7&wN1*bH6^cJ3%"),
            session_ttl_seconds: 3600,
            trust_proxy_headers: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/eventpass_unreachable")
            .unwrap();
        AppState::new(config, pool)
    }

    fn cookie_for(state: &AppState, role: Role, ttl: i64) -> String {
        let now = Utc::now().timestamp();
        let token = state
            .sessions()
            .sign(&SessionClaims {
                sub: AttendeeId::generate(),
                employee_id: "E100".to_string(),
                email: "budi@example.com".to_string(),
                role,
                name: None,
                iat: now,
                exp: now + ttl,
            })
            .unwrap();
        format!("session={token}")
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let mut request = builder.body(Body::from(body.to_string())).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo("198.51.100.7:40000".parse::<SocketAddr>().unwrap()));
        request
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn error_of(body: &[u8]) -> String {
        let value: Value = serde_json::from_slice(body).unwrap();
        value["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let state = test_state();
        let (status, headers, body) = send(&state, get_request("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
        assert!(headers.contains_key("x-request-id"));
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let state = test_state();
        let (status, _, body) = send(&state, get_request("/api/nope", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_of(&body), "Not found");
    }

    #[tokio::test]
    async fn test_me_requires_session() {
        let state = test_state();
        let (status, _, body) = send(&state, get_request("/api/me", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_of(&body), "Unauthorized");
    }

    #[tokio::test]
    async fn test_expired_session_is_unauthorized() {
        let state = test_state();
        let cookie = cookie_for(&state, Role::Admin, -60);
        let (status, _, _) = send(&state, get_request("/api/admin/logs", Some(&cookie))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_forged_session_is_unauthorized() {
        let state = test_state();
        let (status, _, _) = send(
            &state,
            get_request("/api/me", Some("session=eyJhbGciOiJIUzI1NiJ9.e30.c2ln")),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_redeem_forbidden_for_attendees() {
        let state = test_state();
        let cookie = cookie_for(&state, Role::Attendee, 3600);
        let (status, _, body) = send(
            &state,
            json_request(
                "POST",
                "/api/redeem",
                Some(&cookie),
                r#"{"employee_id":"E100","item":"beer","booth_id":"B1"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(error_of(&body), "Forbidden");
    }

    #[tokio::test]
    async fn test_redeem_rejects_invalid_input() {
        let state = test_state();
        let cookie = cookie_for(&state, Role::Staff, 3600);
        for body in [
            r#"{"employee_id":"E100","item":"coffee","booth_id":"B1"}"#,
            r#"{"employee_id":"","item":"beer","booth_id":"B1"}"#,
            r#"{"employee_id":"E100","item":"beer","booth_id":"  "}"#,
            "not json",
        ] {
            let (status, _, response) =
                send(&state, json_request("POST", "/api/redeem", Some(&cookie), body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            assert_eq!(error_of(&response), "Invalid input");
        }
    }

    #[tokio::test]
    async fn test_checkin_forbidden_for_attendees() {
        let state = test_state();
        let cookie = cookie_for(&state, Role::Attendee, 3600);
        let (status, _, _) = send(
            &state,
            json_request("POST", "/api/checkin", Some(&cookie), r#"{"employee_id":"E100"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_routes_forbidden_for_staff() {
        let state = test_state();
        let cookie = cookie_for(&state, Role::Staff, 3600);
        for uri in ["/api/admin/attendees", "/api/admin/logs"] {
            let (status, _, _) = send(&state, get_request(uri, Some(&cookie))).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "uri: {uri}");
        }
    }

    #[tokio::test]
    async fn test_patch_validation() {
        let state = test_state();
        let cookie = cookie_for(&state, Role::Admin, 3600);
        let uri = format!("/api/admin/attendees/{}", AttendeeId::generate());

        let (status, _, body) =
            send(&state, json_request("PATCH", &uri, Some(&cookie), "{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), "No patchable fields provided");

        let (status, _, _) = send(
            &state,
            json_request("PATCH", &uri, Some(&cookie), r#"{"quota_beer":-1}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logs_reject_bad_filters() {
        let state = test_state();
        let cookie = cookie_for(&state, Role::Admin, 3600);
        for uri in ["/api/admin/logs?item=coffee", "/api/admin/logs?from=yesterday"] {
            let (status, _, _) = send(&state, get_request(uri, Some(&cookie))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
        }
    }

    #[tokio::test]
    async fn test_qr_defaults_to_png() {
        let state = test_state();
        let cookie = cookie_for(&state, Role::Attendee, 3600);
        for uri in ["/api/me/qr", "/api/me/qr?format=png"] {
            let (status, headers, body) = send(&state, get_request(uri, Some(&cookie))).await;
            assert_eq!(status, StatusCode::OK, "uri: {uri}");
            assert_eq!(headers[header::CONTENT_TYPE], "image/png");
            assert_eq!(&body[..8], b"\x89PNG\r\n\x1a\n");
        }
    }

    #[tokio::test]
    async fn test_qr_svg() {
        let state = test_state();
        let cookie = cookie_for(&state, Role::Attendee, 3600);
        let (status, headers, body) =
            send(&state, get_request("/api/me/qr?format=svg", Some(&cookie))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "image/svg+xml");
        assert!(String::from_utf8(body).unwrap().contains("<svg"));
    }

    #[tokio::test]
    async fn test_qr_rejects_unknown_formats() {
        let state = test_state();
        let cookie = cookie_for(&state, Role::Attendee, 3600);
        let (status, _, body) =
            send(&state, get_request("/api/me/qr?format=gif", Some(&cookie))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), "Unsupported format");
    }

    #[tokio::test]
    async fn test_login_rejects_invalid_input() {
        let state = test_state();
        let (status, headers, body) = send(
            &state,
            json_request(
                "POST",
                "/api/auth/login",
                None,
                r#"{"email":"not-an-email","employee_id":"E100"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), "Invalid input");
        assert!(!headers.contains_key(header::SET_COOKIE));
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let state = test_state();
        let (status, headers, _) =
            send(&state, json_request("POST", "/api/auth/logout", None, "")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let cookie = headers[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("session="));
        assert!(cookie.contains("Max-Age=0"));
    }

    async fn login_statuses(app: &Router, forwarded_for: impl Fn(usize) -> String) -> Vec<StatusCode> {
        let mut statuses = Vec::new();
        for i in 0..8 {
            let mut request = json_request(
                "POST",
                "/api/auth/login",
                None,
                r#"{"email":"not-an-email","employee_id":"E100"}"#,
            );
            request
                .headers_mut()
                .insert("x-forwarded-for", forwarded_for(i).parse().unwrap());
            let response = app.clone().oneshot(request).await.unwrap();
            statuses.push(response.status());
        }
        statuses
    }

    #[tokio::test]
    async fn test_login_limit_ignores_rotating_forwarded_for() {
        let app = router(test_state());
        let statuses = login_statuses(&app, |i| format!("10.9.8.{i}")).await;

        assert!(statuses[..5].iter().all(|s| *s == StatusCode::BAD_REQUEST));
        assert!(statuses[5..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
    }
}
