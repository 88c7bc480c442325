//! Client-side persisted state: the only things remembered across restarts
//! are the active session id and the auth token.

pub mod json_backend;
pub mod memory;

use crate::{domain::SessionId, errors::StorageError};

pub type Result<T> = std::result::Result<T, StorageError>;

/// Abstraction over where the client keeps its small piece of durable state.
pub trait ClientStore: Send + Sync {
    fn session_id(&self) -> Result<Option<SessionId>>;
    fn record_session_id(&self, id: Option<SessionId>) -> Result<()>;
    fn auth_token(&self) -> Result<Option<String>>;
    fn record_auth_token(&self, token: Option<&str>) -> Result<()>;

    fn forget_session(&self) -> Result<()> {
        self.record_session_id(None)
    }
}

impl<T: ClientStore + ?Sized> ClientStore for std::sync::Arc<T> {
    fn session_id(&self) -> Result<Option<SessionId>> {
        (**self).session_id()
    }

    fn record_session_id(&self, id: Option<SessionId>) -> Result<()> {
        (**self).record_session_id(id)
    }

    fn auth_token(&self) -> Result<Option<String>> {
        (**self).auth_token()
    }

    fn record_auth_token(&self, token: Option<&str>) -> Result<()> {
        (**self).record_auth_token(token)
    }
}

pub use json_backend::JsonClientStore;
pub use memory::MemoryClientStore;
