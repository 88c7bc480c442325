use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::Mutex};

use crate::{
    domain::SessionId,
    utils::{
        paths::PathResolver,
        persistence::{ensure_dir, read_json, write_json_atomic},
    },
};

use super::{ClientStore, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StoreState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
}

/// Keeps client state in `state.json` under the application directory.
pub struct JsonClientStore {
    state_file: PathBuf,
    // Serializes read-modify-write cycles on the state file.
    lock: Mutex<()>,
}

impl JsonClientStore {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let base = PathResolver::resolve_base(root);
        ensure_dir(&base)?;
        Ok(Self {
            state_file: PathResolver::state_file_in(&base),
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.state_file
    }

    fn read_state(&self) -> Result<StoreState> {
        Ok(read_json(&self.state_file)?.unwrap_or_default())
    }

    fn update<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut StoreState),
    {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut state = self.read_state()?;
        apply(&mut state);
        write_json_atomic(&self.state_file, &state)
    }
}

impl ClientStore for JsonClientStore {
    fn session_id(&self) -> Result<Option<SessionId>> {
        Ok(self.read_state()?.current_session_id)
    }

    fn record_session_id(&self, id: Option<SessionId>) -> Result<()> {
        self.update(|state| state.current_session_id = id)
    }

    fn auth_token(&self) -> Result<Option<String>> {
        Ok(self
            .read_state()?
            .auth_token
            .filter(|token| !token.trim().is_empty()))
    }

    fn record_auth_token(&self, token: Option<&str>) -> Result<()> {
        let token = token
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        self.update(|state| state.auth_token = token)
    }
}
