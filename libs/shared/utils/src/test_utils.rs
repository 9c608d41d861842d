use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::session::AdminSession;

use crate::state::AppState;

pub struct TestConfig {
    pub jwt_secret: String,
    pub clinic_api_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            clinic_api_url: "http://localhost:8080".to_string(),
        }
    }
}

impl TestConfig {
    /// Config pointing at a mock clinic backend (e.g. a `wiremock::MockServer::uri()`).
    pub fn with_api_url(url: impl Into<String>) -> Self {
        Self {
            clinic_api_url: url.into(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            clinic_api_url: self.clinic_api_url.clone(),
            clinic_jwt_secret: self.jwt_secret.clone(),
            server_port: 3000,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }

    pub fn to_state(&self) -> AppState {
        AppState::new(self.to_app_config())
    }

    /// Signs a token for `user` and registers its session in `state`, as a
    /// successful login would.
    pub async fn open_session(&self, state: &AppState, user: &TestUser) -> String {
        let token = JwtTestUtils::create_test_token(user, &self.jwt_secret, Some(1));
        let session = AdminSession::start(token.clone(), user.to_user())
            .expect("test user should carry a console role");
        state.sessions.insert(session).await;
        token
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "RECEPTIONIST".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "ADMIN")
    }

    pub fn receptionist(email: &str) -> Self {
        Self::new(email, "RECEPTIONIST")
    }

    pub fn professional(email: &str) -> Self {
        Self::new(email, "PROFESSIONAL")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            name: None,
            role: Some(self.role.clone()),
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct MockClinicResponses;

impl MockClinicResponses {
    pub fn professional_response(id: i64, schedules: serde_json::Value) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Dr. Ana Souza",
            "email": "ana.souza@clinic.test",
            "phone": "+55 11 99999-0000",
            "specialty": "Orthodontics",
            "cro": "SP-12345",
            "active": true,
            "schedules": schedules
        })
    }

    pub fn login_response(token: &str) -> serde_json::Value {
        json!({ "token": token })
    }

    pub fn error_response(message: &str) -> serde_json::Value {
        json!({ "message": message })
    }
}
