//! Server-computed results the client only displays.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{de_amount, RecordId, SessionId};
use super::session::Session;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeansTestDetails {
    #[serde(default)]
    pub household_size: u32,
    #[serde(default, deserialize_with = "de_amount")]
    pub total_income: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub total_expenses: f64,
    #[serde(default)]
    pub district_name: String,
}

/// Eligibility snapshot returned by `calculate_means_test`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeansTestResult {
    pub passes_means_test: bool,
    #[serde(default)]
    pub qualifies_for_fee_waiver: bool,
    #[serde(default, deserialize_with = "de_amount")]
    pub current_monthly_income: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub median_income_threshold: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub disposable_monthly_income: f64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: MeansTestDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub current_step: u32,
    pub status: String,
    pub completion_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeansTestBrief {
    pub passes: bool,
    pub qualifies_fee_waiver: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormBrief {
    pub form_type: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormsOverview {
    #[serde(default)]
    pub generated_count: u32,
    #[serde(default)]
    pub forms: Vec<FormBrief>,
}

/// Response of `GET /intake/sessions/{id}/summary/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session: Session,
    pub progress: SessionProgress,
    #[serde(default)]
    pub means_test: Option<MeansTestBrief>,
    #[serde(default)]
    pub forms: FormsOverview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormType {
    #[serde(rename = "form_101")]
    Form101,
    #[serde(rename = "form_106")]
    Form106,
    #[serde(rename = "form_107")]
    Form107,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    Generated,
    Downloaded,
    Filed,
}

/// A court form produced server-side from the session data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedForm {
    pub id: RecordId,
    pub session: SessionId,
    pub form_type: FormType,
    #[serde(default)]
    pub form_type_display: String,
    pub status: FormStatus,
    #[serde(default)]
    pub status_display: String,
    #[serde(default)]
    pub form_data: serde_json::Value,
    #[serde(default)]
    pub pdf_file_path: Option<String>,
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
}
