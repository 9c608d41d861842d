use assert_matches::assert_matches;
use axum::{
    body::Body,
    extract::{Extension, Json, State},
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::auth_routes;
use auth_cell::handlers::{get_session, login, logout, navigate, NavigateRequest};
use shared_models::auth::LoginRequest;
use shared_models::error::AppError;
use shared_models::session::{AdminSession, Role, Section, SessionStore};
use shared_utils::test_utils::{JwtTestUtils, MockClinicResponses, TestConfig, TestUser};
use shared_utils::AppState;

fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

async fn stored_session(store: &SessionStore, token: &str, user: &TestUser) -> AdminSession {
    let session = AdminSession::start(token, user.to_user()).unwrap();
    store.insert(session.clone()).await;
    session
}

fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token));
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_login_opens_session_from_backend_token() {
    let server = MockServer::start().await;
    let config = TestConfig::with_api_url(server.uri());
    let user = TestUser::receptionist("desk@clinic.test");
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(8));

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "email": "desk@clinic.test", "password": "s3cret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockClinicResponses::login_response(&token)))
        .expect(1)
        .mount(&server)
        .await;

    let sessions = SessionStore::new();
    let reply = login(
        State(config.to_arc()),
        State(sessions.clone()),
        Json(login_request("desk@clinic.test", "s3cret")),
    )
    .await
    .unwrap()
    .0;

    assert_eq!(reply.token, token);
    assert_eq!(sessions.get(&token).await.unwrap().role(), Role::Receptionist);
    assert_eq!(reply.session.user_id, user.id);
    assert_eq!(reply.session.role, Role::Receptionist);
    assert_eq!(reply.session.active_section, Section::Appointments);
    assert!(!reply.session.sections.contains(&Section::Users));
}

#[tokio::test]
async fn test_login_with_wrong_credentials_is_unauthorized() {
    let server = MockServer::start().await;
    let config = TestConfig::with_api_url(server.uri());

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(MockClinicResponses::error_response("bad credentials")))
        .mount(&server)
        .await;

    let sessions = SessionStore::new();
    let result = login(
        State(config.to_arc()),
        State(sessions.clone()),
        Json(login_request("desk@clinic.test", "nope")),
    )
    .await;

    assert_matches!(result, Err(AppError::Auth(msg)) if msg == "Invalid email or password");
    assert!(sessions.is_empty().await);
}

#[tokio::test]
async fn test_login_rejects_token_with_unknown_role() {
    let server = MockServer::start().await;
    let config = TestConfig::with_api_url(server.uri());
    let token = JwtTestUtils::create_test_token(&TestUser::new("x@clinic.test", "PATIENT"), &config.jwt_secret, None);

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockClinicResponses::login_response(&token)))
        .mount(&server)
        .await;

    let result = login(
        State(config.to_arc()),
        State(SessionStore::new()),
        Json(login_request("x@clinic.test", "pw")),
    )
    .await;

    assert_matches!(result, Err(AppError::Auth(msg)) if msg.contains("PATIENT"));
}

#[tokio::test]
async fn test_login_requires_credentials() {
    let config = TestConfig::default();

    let result = login(State(config.to_arc()), State(SessionStore::new()), Json(login_request(" ", ""))).await;

    assert_matches!(result, Err(AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_navigate_respects_role() {
    let store = SessionStore::new();

    let admin = stored_session(&store, "admin-token", &TestUser::admin("admin@clinic.test")).await;
    let view = navigate(State(store.clone()), Extension(admin), Json(NavigateRequest { section: Section::Users }))
        .await
        .unwrap()
        .0;
    assert_eq!(view.active_section, Section::Users);
    assert_eq!(store.get("admin-token").await.unwrap().active_section(), Section::Users);

    let professional = stored_session(&store, "pro-token", &TestUser::professional("dentist@clinic.test")).await;
    let result = navigate(
        State(store.clone()),
        Extension(professional),
        Json(NavigateRequest { section: Section::Plans }),
    )
    .await;
    assert_matches!(result, Err(AppError::Forbidden(_)));
    assert_eq!(store.get("pro-token").await.unwrap().active_section(), Section::Appointments);
}

#[tokio::test]
async fn test_session_and_logout_handlers() {
    let store = SessionStore::new();
    let user = TestUser::admin("admin@clinic.test");
    let session = stored_session(&store, "token", &user).await;

    let view = get_session(Extension(session.clone())).await.0;
    assert_eq!(view.user_id, user.id);
    assert_eq!(view.sections.len(), Section::ALL.len());

    let reply = logout(State(store.clone()), Extension(session)).await.0;
    assert_eq!(reply, json!({ "logged_out": true }));
    assert!(store.get("token").await.is_none());
}

#[tokio::test]
async fn test_session_route_requires_valid_token() {
    let config = TestConfig::default();
    let app = auth_routes(config.to_state());

    let expired = JwtTestUtils::create_expired_token(&TestUser::default(), &config.jwt_secret);
    let response = app.oneshot(authed("GET", "/session", &expired, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = read_json(response).await;
    assert_eq!(json["error"], "Token expired");
}

#[tokio::test]
async fn test_session_route_rejects_token_without_login() {
    let config = TestConfig::default();
    let app = auth_routes(config.to_state());

    let token = JwtTestUtils::create_test_token(&TestUser::admin("admin@clinic.test"), &config.jwt_secret, None);
    let response = app.oneshot(authed("GET", "/session", &token, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_route_returns_view() {
    let config = TestConfig::default();
    let state = config.to_state();
    let token = config.open_session(&state, &TestUser::professional("dentist@clinic.test")).await;

    let response = auth_routes(state).oneshot(authed("GET", "/session", &token, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = read_json(response).await;
    assert_eq!(json["role"], "PROFESSIONAL");
    assert_eq!(json["sections"], json!(["appointments", "patients"]));
}

#[tokio::test]
async fn test_session_lifecycle_across_requests() {
    let server = MockServer::start().await;
    let config = TestConfig::with_api_url(server.uri());
    let state: AppState = config.to_state();
    let app = auth_routes(state.clone());
    let token = JwtTestUtils::create_test_token(&TestUser::admin("admin@clinic.test"), &config.jwt_secret, Some(8));

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockClinicResponses::login_response(&token)))
        .mount(&server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "email": "admin@clinic.test", "password": "pw" }).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["session"]["active_section"], "dashboard");

    let response = app
        .clone()
        .oneshot(authed("POST", "/session/navigate", &token, Some(json!({ "section": "patients" }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(authed("GET", "/session", &token, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["active_section"], "patients");

    let response = app.clone().oneshot(authed("POST", "/logout", &token, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.sessions.is_empty().await);

    let response = app.oneshot(authed("GET", "/session", &token, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let config = TestConfig::default();

    let response = auth_routes(config.to_state())
        .oneshot(Request::builder().uri("/nowhere").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
