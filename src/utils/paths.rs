use dirs::home_dir;
use std::{
    env,
    path::{Path, PathBuf},
};

const DEFAULT_DIR_NAME: &str = ".intake_wizard";
const CONFIG_FILE: &str = "config.json";
const STATE_FILE: &str = "state.json";

/// Resolves the on-disk locations used by the client.
pub struct PathResolver;

impl PathResolver {
    /// `$INTAKE_WIZARD_HOME`, falling back to `~/.intake_wizard`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os("INTAKE_WIZARD_HOME") {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(custom: Option<PathBuf>) -> PathBuf {
        custom.unwrap_or_else(Self::base_dir)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        base.join(CONFIG_FILE)
    }

    pub fn state_file_in(base: &Path) -> PathBuf {
        base.join(STATE_FILE)
    }
}
