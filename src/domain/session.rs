use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{DistrictId, SessionId};
use super::debtor::DebtorInfo;
use super::finance::{ExpenseInfo, IncomeInfo};
use super::property::{AssetInfo, DebtInfo};

/// Lifecycle of an intake session as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Started,
    InProgress,
    Completed,
    Abandoned,
}

impl SessionStatus {
    pub fn label(self) -> &'static str {
        match self {
            SessionStatus::Started => "started",
            SessionStatus::InProgress => "in progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
        }
    }
}

/// Root aggregate tracking one user's progress through the wizard, with its
/// nested step records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    #[serde(default)]
    pub user: Option<i64>,
    pub district: DistrictId,
    pub current_step: u32,
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debtor_info: Option<DebtorInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_info: Option<IncomeInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense_info: Option<ExpenseInfo>,
    #[serde(default)]
    pub assets: Vec<AssetInfo>,
    #[serde(default)]
    pub debts: Vec<DebtInfo>,
}

impl Session {
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}

/// Partial update body for `PATCH /intake/sessions/{id}/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<DistrictId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,
}
