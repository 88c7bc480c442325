use std::sync::Mutex;

use crate::domain::SessionId;

use super::{ClientStore, Result};

/// Volatile store for tests and one-off runs.
#[derive(Debug, Default)]
pub struct MemoryClientStore {
    session_id: Mutex<Option<SessionId>>,
    auth_token: Mutex<Option<String>>,
}

impl MemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(id: SessionId) -> Self {
        let store = Self::default();
        *store.session_id.lock().unwrap_or_else(|p| p.into_inner()) = Some(id);
        store
    }
}

impl ClientStore for MemoryClientStore {
    fn session_id(&self) -> Result<Option<SessionId>> {
        Ok(*self.session_id.lock().unwrap_or_else(|p| p.into_inner()))
    }

    fn record_session_id(&self, id: Option<SessionId>) -> Result<()> {
        *self.session_id.lock().unwrap_or_else(|p| p.into_inner()) = id;
        Ok(())
    }

    fn auth_token(&self) -> Result<Option<String>> {
        Ok(self.auth_token.lock().unwrap_or_else(|p| p.into_inner()).clone())
    }

    fn record_auth_token(&self, token: Option<&str>) -> Result<()> {
        *self.auth_token.lock().unwrap_or_else(|p| p.into_inner()) = token.map(str::to_string);
        Ok(())
    }
}
