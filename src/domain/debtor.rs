use serde::{Deserialize, Serialize};

use super::common::{de_text, RecordId, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingType {
    #[default]
    Individual,
    Joint,
}

impl FilingType {
    pub fn label(self) -> &'static str {
        match self {
            FilingType::Individual => "Individual (filing alone)",
            FilingType::Joint => "Joint (filing with spouse)",
        }
    }
}

/// Personal, contact, and household details of the filer, as stored by the
/// backend. Co-debtor columns are blank for individual filings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebtorInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionId>,
    #[serde(default, deserialize_with = "de_text")]
    pub first_name: String,
    #[serde(default, deserialize_with = "de_text")]
    pub middle_name: String,
    #[serde(default, deserialize_with = "de_text")]
    pub last_name: String,
    #[serde(default, deserialize_with = "de_text")]
    pub ssn: String,
    #[serde(default, deserialize_with = "de_text")]
    pub date_of_birth: String,
    #[serde(default, deserialize_with = "de_text")]
    pub street_address: String,
    #[serde(default, deserialize_with = "de_text")]
    pub city: String,
    #[serde(default, deserialize_with = "de_text")]
    pub state: String,
    #[serde(default, deserialize_with = "de_text")]
    pub zip_code: String,
    #[serde(default, deserialize_with = "de_text")]
    pub phone_number: String,
    #[serde(default, deserialize_with = "de_text")]
    pub email: String,
    #[serde(default)]
    pub household_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filing_type: Option<FilingType>,
    #[serde(default, deserialize_with = "de_text")]
    pub co_debtor_first_name: String,
    #[serde(default, deserialize_with = "de_text")]
    pub co_debtor_middle_name: String,
    #[serde(default, deserialize_with = "de_text")]
    pub co_debtor_last_name: String,
    #[serde(default, deserialize_with = "de_text")]
    pub co_debtor_ssn: String,
    #[serde(default, deserialize_with = "de_text")]
    pub co_debtor_date_of_birth: String,
}
