//! Identifiers, step kinds, and serde helpers shared by the records.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Backend primary key of an intake session.
pub type SessionId = i64;

/// Backend primary key of a child record (debtor info, asset, ...).
pub type RecordId = i64;

/// Backend primary key of a bankruptcy court district.
pub type DistrictId = i64;

/// The categories of data collected by the wizard, one per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    DebtorInfo,
    IncomeInfo,
    ExpenseInfo,
    Assets,
    Debts,
    Review,
}

impl StepKind {
    /// Stable key used in logs and the session payload.
    pub fn key(self) -> &'static str {
        match self {
            StepKind::DebtorInfo => "debtor_info",
            StepKind::IncomeInfo => "income_info",
            StepKind::ExpenseInfo => "expense_info",
            StepKind::Assets => "assets",
            StepKind::Debts => "debts",
            StepKind::Review => "review",
        }
    }

    /// Whether the step must validate before the session may be completed.
    pub fn required_for_completion(self) -> bool {
        matches!(
            self,
            StepKind::DebtorInfo | StepKind::IncomeInfo | StepKind::ExpenseInfo
        )
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Where a record's figures came from, kept for the backend audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    #[default]
    Manual,
    BankImport,
    TaxReturn,
    Plaid,
    CreditReport,
    UploadedDocument,
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
    Missing(Option<()>),
}

/// Accepts `12.5`, `"12.50"`, `""` and `null`; the latter two become zero.
pub(crate) fn de_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawAmount::deserialize(deserializer)? {
        RawAmount::Number(value) => Ok(value),
        RawAmount::Text(text) if text.trim().is_empty() => Ok(0.0),
        RawAmount::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid amount `{text}`"))),
        RawAmount::Missing(_) => Ok(0.0),
    }
}

/// Treats `null` as an empty string so optional text columns stay plain `String`s.
pub(crate) fn de_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
