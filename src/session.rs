// Explicit login session shared between the HTTP client and the UI layer

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::models::Role;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub role: Option<Role>,
}

/// Holds the bearer token and role claim between login and logout.
///
/// The role only decides which screens are offered; the server re-authorizes
/// every call.
#[derive(Debug, Default)]
pub struct SessionContext {
    current: RwLock<Option<Session>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            current: RwLock::new(Some(session)),
        }
    }

    pub fn establish(&self, token: impl Into<String>, role: Option<Role>) {
        let token = token.into();
        if token.is_empty() {
            self.clear();
            return;
        }
        info!(?role, "session established");
        *self.current.write() = Some(Session { token, role });
    }

    pub fn clear(&self) {
        if self.current.write().take().is_some() {
            info!("session cleared");
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.current.read().clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.current.read().as_ref().and_then(|s| s.role)
    }

    /// Raw token for the `Authorization: Bearer` header.
    pub fn token(&self) -> Option<String> {
        self.current.read().as_ref().map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    pub fn is_user(&self) -> bool {
        self.role() == Some(Role::User)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SessionError> {
        let json = serde_json::to_string(&*self.current.read())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Restores a session written by [`SessionContext::save_to`]. A missing
    /// file means nobody is logged in.
    pub fn load_from(path: &Path) -> Result<Self, SessionError> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(SessionError::Io(e)),
        };
        let session: Option<Session> = serde_json::from_str(&json)?;
        Ok(Self {
            current: RwLock::new(session),
        })
    }
}
