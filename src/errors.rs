use std::fmt;

use thiserror::Error;

use crate::validation::ValidationReport;

/// Message used when the backend's error body cannot be parsed.
pub const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Failures raised by the remote session client.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// No response was received (connection refused, DNS, timeout, ...).
    #[error("Network error: {0}")]
    Transport(String),
    /// The backend answered with a non-success status.
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        details: Option<serde_json::Value>,
    },
    /// A success response whose body did not match the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            ApiError::Status { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Failures reading or writing persisted client state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Storage(StorageError::Io(err))
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Storage(StorageError::Serde(err))
    }
}

/// The user-visible operations of the wizard, used to phrase failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    StartSession,
    SaveProgress,
    CompleteSession,
    MeansTest,
    LoadSummary,
    PreviewForm,
    GenerateForm,
    UpdateForm,
}

impl Operation {
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::StartSession => "Unable to start your intake session. Please try again.",
            Operation::SaveProgress => "Unable to save your progress. Please try again.",
            Operation::CompleteSession => {
                "Unable to finalize your session. Please ensure all required information is provided."
            }
            Operation::MeansTest => {
                "Unable to calculate means test. Please ensure all income information is provided."
            }
            Operation::LoadSummary => "Unable to load your session summary. Please try again.",
            Operation::PreviewForm => "Unable to preview your form. Please try again.",
            Operation::GenerateForm => "Unable to generate your form. Please try again.",
            Operation::UpdateForm => "Unable to update your form. Please try again.",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Operation::StartSession => "start session",
            Operation::SaveProgress => "save progress",
            Operation::CompleteSession => "complete session",
            Operation::MeansTest => "calculate means test",
            Operation::LoadSummary => "load summary",
            Operation::PreviewForm => "preview form",
            Operation::GenerateForm => "generate form",
            Operation::UpdateForm => "update form",
        };
        f.write_str(label)
    }
}

/// Failures surfaced by the wizard state machine.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Another request is still in progress")]
    Busy,
    #[error("No active session found. Please start a new intake.")]
    NoSession,
    #[error("Please correct the highlighted fields before continuing")]
    Validation(ValidationReport),
    #[error("Some required sections are incomplete: {}", .0.join(", "))]
    IncompleteSteps(Vec<&'static str>),
    #[error("Complete is only available on the last step")]
    NotOnLastStep,
    #[error("This is the last step. Complete the intake to finish.")]
    AtLastStep,
    #[error("This intake has already been completed")]
    AlreadyCompleted,
    #[error("A newer action superseded this response")]
    Stale,
    #[error("Failed to {operation}: {source}")]
    Api {
        operation: Operation,
        #[source]
        source: ApiError,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl WizardError {
    pub fn api(operation: Operation, source: ApiError) -> Self {
        WizardError::Api { operation, source }
    }

    /// The single string shown to the user for this failure. Status codes and
    /// server payloads stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            WizardError::Api { operation, .. } => operation.failure_message().to_string(),
            WizardError::Storage(_) => {
                "Unable to remember your session on this device. Your progress is still saved."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Top-level error for the interactive binary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Input error: {0}")]
    Input(String),
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        CliError::Input(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Input(err.to_string())
    }
}
