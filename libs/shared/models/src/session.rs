use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::auth::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Receptionist,
    Professional,
}

impl Role {
    /// Section shown right after login.
    pub fn landing_section(&self) -> Section {
        match self {
            Role::Admin => Section::Dashboard,
            Role::Receptionist | Role::Professional => Section::Appointments,
        }
    }

    pub fn can_access(&self, section: Section) -> bool {
        match self {
            Role::Admin => true,
            Role::Receptionist => !matches!(section, Section::Users | Section::Dashboard),
            Role::Professional => matches!(section, Section::Appointments | Section::Patients),
        }
    }
}

impl FromStr for Role {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "RECEPTIONIST" => Ok(Role::Receptionist),
            "PROFESSIONAL" => Ok(Role::Professional),
            _ => Err(SessionError::UnknownRole(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "ADMIN",
            Role::Receptionist => "RECEPTIONIST",
            Role::Professional => "PROFESSIONAL",
        };
        write!(f, "{}", name)
    }
}

/// Top-level screens of the admin console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Dashboard,
    Appointments,
    Patients,
    Professionals,
    Users,
    HealthInsurances,
    Plans,
    Services,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Dashboard,
        Section::Appointments,
        Section::Patients,
        Section::Professionals,
        Section::Users,
        Section::HealthInsurances,
        Section::Plans,
        Section::Services,
    ];
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Token carries no role claim")]
    MissingRole,

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Role {role} cannot access section {section:?}")]
    Forbidden { role: Role, section: Section },
}

/// Per-login context handed to every handler that needs the caller's identity.
///
/// Created from a validated token at login, kept in a [`SessionStore`] until
/// logout, and consumed by [`AdminSession::end`] when it is removed.
#[derive(Debug, Clone)]
pub struct AdminSession {
    token: String,
    user: User,
    role: Role,
    active_section: Section,
}

impl AdminSession {
    pub fn start(token: impl Into<String>, user: User) -> Result<Self, SessionError> {
        let role: Role = user
            .role
            .as_deref()
            .ok_or(SessionError::MissingRole)?
            .parse()?;

        debug!("Session started for user {} with role {}", user.id, role);

        Ok(Self {
            token: token.into(),
            user,
            role,
            active_section: role.landing_section(),
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn active_section(&self) -> Section {
        self.active_section
    }

    pub fn can_access(&self, section: Section) -> bool {
        self.role.can_access(section)
    }

    pub fn require(&self, section: Section) -> Result<(), SessionError> {
        if self.can_access(section) {
            Ok(())
        } else {
            Err(SessionError::Forbidden { role: self.role, section })
        }
    }

    pub fn navigate(&mut self, section: Section) -> Result<(), SessionError> {
        self.require(section)?;
        self.active_section = section;
        Ok(())
    }

    pub fn accessible_sections(&self) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|section| self.can_access(*section))
            .collect()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            user_id: self.user.id.clone(),
            email: self.user.email.clone(),
            name: self.user.name.clone(),
            role: self.role,
            active_section: self.active_section,
            sections: self.accessible_sections(),
        }
    }

    /// Logout. The session (and its token) is dropped here.
    pub fn end(self) {
        debug!("Session ended for user {}", self.user.id);
    }
}

/// Live sessions keyed by token. Cloning shares the same map.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, AdminSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session. A later login with the same token replaces it.
    pub async fn insert(&self, session: AdminSession) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.token.clone(), session);
    }

    pub async fn get(&self, token: &str) -> Option<AdminSession> {
        self.sessions.read().await.get(token).cloned()
    }

    /// Switches the stored session to `section` and returns the updated copy.
    /// Returns `Ok(None)` when no session is held for `token`.
    pub async fn navigate(
        &self,
        token: &str,
        section: Section,
    ) -> Result<Option<AdminSession>, SessionError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(token) {
            Some(session) => {
                session.navigate(section)?;
                Ok(Some(session.clone()))
            }
            None => Ok(None),
        }
    }

    /// Removes and ends the session for `token`. Returns false if none was held.
    pub async fn end(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token);
        match removed {
            Some(session) => {
                session.end();
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Client-facing projection of a session; never carries the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Role,
    pub active_section: Section,
    pub sections: Vec<Section>,
}
