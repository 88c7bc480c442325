//! Terminal frontend and command dispatch for the `intake_wizard_cli` binary.

pub mod app;
pub mod forms;
pub mod output;
pub mod prompter;
pub mod render;
pub mod script;

use std::sync::Arc;

use tracing::info;

use crate::{
    api::HttpIntakeClient,
    config::{Config, ConfigManager, AUTH_TOKEN_ENV},
    errors::CliError,
    storage::{ClientStore, JsonClientStore, MemoryClientStore},
    utils::build_info,
    wizard::WizardMachine,
};

pub use app::WizardApp;
pub use prompter::{Prompter, ScriptedPrompter, TerminalPrompter, TextAnswer};

const USAGE: &str = "\
Usage: intake_wizard_cli [COMMAND]

Commands:
  start           Resume or begin the intake wizard (default)
  login <TOKEN>   Remember the API token used to authenticate requests
  logout          Forget the stored API token
  reset           Forget the stored session so the next run starts fresh
  config          Show the active configuration
  version         Show build information
  help            Show this message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Login(String),
    Logout,
    Reset,
    ShowConfig,
    Version,
    Help,
}

impl Command {
    pub fn parse<I, T>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        let mut words = args.iter().map(String::as_str);
        let command = match words.next() {
            None | Some("start") => Command::Start,
            Some("login") => match words.next() {
                Some(token) if !token.trim().is_empty() => Command::Login(token.trim().to_string()),
                _ => return Err(CliError::Input("login requires a token".into())),
            },
            Some("logout") => Command::Logout,
            Some("reset") => Command::Reset,
            Some("config") => Command::ShowConfig,
            Some("version" | "--version" | "-V") => Command::Version,
            Some("help" | "--help" | "-h") => Command::Help,
            Some(other) => {
                return Err(CliError::Input(format!(
                    "unknown command `{other}`. Run `intake_wizard_cli help` for usage."
                )))
            }
        };
        if let Some(extra) = words.next() {
            return Err(CliError::Input(format!("unexpected argument `{extra}`")));
        }
        Ok(command)
    }
}

/// Entry point used by the binary: parses `std::env::args` and runs the
/// selected command.
pub fn run_cli() -> Result<(), CliError> {
    let command = Command::parse(std::env::args().skip(1))?;
    run_command(command)
}

pub fn run_command(command: Command) -> Result<(), CliError> {
    match command {
        Command::Help => {
            output::line(USAGE);
            Ok(())
        }
        Command::Version => {
            output::line(build_info::current().summary());
            Ok(())
        }
        command => {
            let manager = ConfigManager::new()?;
            let config = manager.load()?;
            output::set_preferences(output::OutputPreferences {
                screen_reader_mode: config.screen_reader_mode,
                high_contrast_mode: config.high_contrast_mode,
            });
            let store = Arc::new(JsonClientStore::new(Some(manager.base_dir().to_path_buf()))?);
            run_with(command, &config, store, manager.path().display().to_string())
        }
    }
}

fn run_with(
    command: Command,
    config: &Config,
    store: Arc<JsonClientStore>,
    config_path: String,
) -> Result<(), CliError> {
    match command {
        Command::Login(token) => {
            store.record_auth_token(Some(&token))?;
            output::success("Token saved.");
            Ok(())
        }
        Command::Logout => {
            store.record_auth_token(None)?;
            output::success("Token removed.");
            Ok(())
        }
        Command::Reset => {
            store.forget_session()?;
            output::success("The next run will start a new intake.");
            Ok(())
        }
        Command::ShowConfig => {
            output::section("Configuration");
            output::line(format!("File: {config_path}"));
            output::line(format!("API: {}", config.api_base_url));
            output::line(format!("District: {}", config.district_id));
            output::line(format!(
                "Request timeout: {}",
                config
                    .request_timeout_secs
                    .map(|secs| format!("{secs}s"))
                    .unwrap_or_else(|| "default".into())
            ));
            output::line(format!("Screen reader mode: {}", config.screen_reader_mode));
            output::line(format!("High contrast mode: {}", config.high_contrast_mode));
            Ok(())
        }
        Command::Start => {
            // A token in the environment wins over the stored one for this run only.
            let tokens: Arc<dyn ClientStore> = match std::env::var(AUTH_TOKEN_ENV) {
                Ok(token) if !token.trim().is_empty() => {
                    let memory = MemoryClientStore::new();
                    memory.record_auth_token(Some(token.trim()))?;
                    Arc::new(memory)
                }
                _ => store.clone(),
            };
            let client = HttpIntakeClient::new(config).with_token_source(tokens);
            let machine = WizardMachine::new(client, store).with_district(config.district_id);
            info!(api = %config.api_base_url, "starting intake wizard");

            match script::Script::from_env() {
                Some(script) => WizardApp::new(machine, ScriptedPrompter::new(script)).run(),
                None => WizardApp::new(machine, TerminalPrompter::new())
                    .with_screen_clearing(!config.screen_reader_mode)
                    .run(),
            }
        }
        Command::Help | Command::Version => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_starts_the_wizard() {
        assert_eq!(Command::parse(Vec::<String>::new()).unwrap(), Command::Start);
        assert_eq!(Command::parse(["start"]).unwrap(), Command::Start);
    }

    #[test]
    fn login_requires_a_token() {
        assert_eq!(
            Command::parse(["login", "abc"]).unwrap(),
            Command::Login("abc".into())
        );
        assert!(Command::parse(["login"]).is_err());
    }

    #[test]
    fn unknown_commands_and_extra_arguments_fail() {
        assert!(Command::parse(["frobnicate"]).is_err());
        assert!(Command::parse(["reset", "now"]).is_err());
        assert_eq!(Command::parse(["--version"]).unwrap(), Command::Version);
    }
}
