use std::sync::Arc;

use axum::extract::{Extension, Json, State};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, to_value, Value};
use tracing::{debug, info};

use shared_client::ClinicApiClient;
use shared_config::AppConfig;
use shared_models::auth::{LoginRequest, LoginResponse};
use shared_models::error::AppError;
use shared_models::session::{AdminSession, Section, SessionStore, SessionView};
use shared_utils::jwt::validate_token;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginReply {
    pub token: String,
    pub session: SessionView,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavigateRequest {
    pub section: Section,
}

/// Exchanges credentials with the clinic backend and opens a console session.
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    State(sessions): State<SessionStore>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginReply>, AppError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::ValidationError("Email and password are required".to_string()));
    }
    debug!("Logging in {}", request.email);

    let body = to_value(&request).map_err(|e| AppError::Internal(e.to_string()))?;
    let client = ClinicApiClient::new(&config);
    let response: LoginResponse = client
        .request(Method::POST, "/auth/login", None, Some(body))
        .await
        .map_err(|e| {
            let message = e.to_string();
            if message.starts_with("Authentication error") {
                AppError::Auth("Invalid email or password".to_string())
            } else {
                AppError::ExternalService(message)
            }
        })?;

    let user = validate_token(&response.token, &config.clinic_jwt_secret).map_err(AppError::Auth)?;
    let session = AdminSession::start(response.token, user)?;

    info!("User {} logged in as {}", session.user().id, session.role());

    let reply = LoginReply {
        token: session.token().to_string(),
        session: session.view(),
    };
    sessions.insert(session).await;

    Ok(Json(reply))
}

pub async fn get_session(Extension(session): Extension<AdminSession>) -> Json<SessionView> {
    Json(session.view())
}

pub async fn navigate(
    State(sessions): State<SessionStore>,
    Extension(session): Extension<AdminSession>,
    Json(request): Json<NavigateRequest>,
) -> Result<Json<SessionView>, AppError> {
    let updated = sessions
        .navigate(session.token(), request.section)
        .await?
        .ok_or_else(|| AppError::Auth("No active session for token".to_string()))?;
    debug!("User {} switched to {:?}", updated.user().id, request.section);

    Ok(Json(updated.view()))
}

pub async fn logout(
    State(sessions): State<SessionStore>,
    Extension(session): Extension<AdminSession>,
) -> Json<Value> {
    let ended = sessions.end(session.token()).await;
    info!("User {} logged out", session.user().id);

    Json(json!({ "logged_out": ended }))
}
