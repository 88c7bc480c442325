use serde::{Deserialize, Serialize};

use super::common::{de_amount, de_text, RecordId, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    #[serde(alias = "real_property")]
    RealEstate,
    Vehicle,
    BankAccount,
    RetirementAccount,
    PersonalProperty,
    #[serde(other)]
    Other,
}

impl AssetType {
    pub const ALL: [AssetType; 6] = [
        AssetType::RealEstate,
        AssetType::Vehicle,
        AssetType::BankAccount,
        AssetType::RetirementAccount,
        AssetType::PersonalProperty,
        AssetType::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AssetType::RealEstate => "Real estate / home",
            AssetType::Vehicle => "Vehicle",
            AssetType::BankAccount => "Bank account",
            AssetType::RetirementAccount => "Retirement account (401k, IRA)",
            AssetType::PersonalProperty => "Personal property",
            AssetType::Other => "Other",
        }
    }
}

/// Something the filer owns, with what is still owed on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionId>,
    pub asset_type: AssetType,
    #[serde(default, deserialize_with = "de_text")]
    pub description: String,
    #[serde(default, deserialize_with = "de_amount")]
    pub current_value: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub amount_owed: f64,
    #[serde(default, deserialize_with = "de_text")]
    pub account_number: String,
    #[serde(default, deserialize_with = "de_amount")]
    pub equity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtType {
    #[serde(alias = "auto_loan", alias = "mortgage")]
    Secured,
    Priority,
    /// Also absorbs the backend's creditor categories (credit card, medical, ...).
    #[serde(other)]
    Unsecured,
}

impl DebtType {
    pub const ALL: [DebtType; 3] = [DebtType::Unsecured, DebtType::Secured, DebtType::Priority];

    pub fn label(self) -> &'static str {
        match self {
            DebtType::Secured => "Secured (car loan, mortgage)",
            DebtType::Unsecured => "Unsecured (credit card, medical)",
            DebtType::Priority => "Priority (taxes, child support)",
        }
    }
}

/// An amount owed to a creditor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionId>,
    pub debt_type: DebtType,
    #[serde(default, deserialize_with = "de_text")]
    pub creditor_name: String,
    #[serde(default, deserialize_with = "de_text")]
    pub account_number: String,
    #[serde(default, deserialize_with = "de_amount")]
    pub amount_owed: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub monthly_payment: f64,
    #[serde(default)]
    pub is_secured: bool,
    #[serde(default, deserialize_with = "de_text")]
    pub collateral_description: String,
}
