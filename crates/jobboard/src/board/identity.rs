use std::collections::HashMap;
use std::sync::RwLock;

use super::domain::Caller;

/// Resolves a session token to the caller behind it.
pub trait IdentityProvider: Send + Sync {
    fn authenticate(&self, token: &str) -> Result<Caller, AuthenticationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthenticationError {
    #[error("no session token supplied")]
    MissingToken,
    #[error("session token is not recognised")]
    UnknownToken,
    #[error("identity provider unavailable")]
    Unavailable,
}

/// Token table issued out of band (configuration or a login service).
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Caller>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sessions(sessions: impl IntoIterator<Item = (String, Caller)>) -> Self {
        Self {
            sessions: RwLock::new(sessions.into_iter().collect()),
        }
    }

    pub fn insert(
        &self,
        token: impl Into<String>,
        caller: Caller,
    ) -> Result<(), AuthenticationError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| AuthenticationError::Unavailable)?;
        sessions.insert(token.into(), caller);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|sessions| sessions.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdentityProvider for SessionRegistry {
    fn authenticate(&self, token: &str) -> Result<Caller, AuthenticationError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthenticationError::MissingToken);
        }

        let sessions = self
            .sessions
            .read()
            .map_err(|_| AuthenticationError::Unavailable)?;
        sessions
            .get(token)
            .cloned()
            .ok_or(AuthenticationError::UnknownToken)
    }
}
