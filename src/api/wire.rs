//! Request and response envelopes of the session endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{DistrictId, GeneratedForm, MeansTestResult, Session, SessionId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub district: DistrictId,
    pub current_step: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStepRequest {
    pub current_step: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// `{session, message}` returned by create and update-step.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionEnvelope {
    pub session: Session,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeansTestEnvelope {
    pub means_test_result: MeansTestResult,
    #[serde(default)]
    pub session_id: Option<SessionId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateFormRequest {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateFormEnvelope {
    pub form: GeneratedForm,
    #[serde(default)]
    pub message: String,
}

/// Error body `{error, message, details?}`. Every key is optional because
/// framework-generated errors use other shapes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
}
