use serde::{Deserialize, Serialize};

use super::common::{de_amount, DataSource, RecordId, SessionId};

/// Average monthly income before taxes, by source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionId>,
    #[serde(default)]
    pub data_source: DataSource,
    #[serde(default, deserialize_with = "de_amount")]
    pub monthly_gross_wages: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub monthly_overtime: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub monthly_tips: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub monthly_rental_income: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub monthly_pension: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub monthly_social_security: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub monthly_unemployment: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub monthly_child_support: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub monthly_alimony: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub monthly_other_income: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub total_monthly_income: f64,
}

/// Average monthly household expenses, by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionId>,
    #[serde(default)]
    pub data_source: DataSource,
    #[serde(default, deserialize_with = "de_amount")]
    pub rent_or_mortgage: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub utilities: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub home_maintenance: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub car_payment: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub car_insurance: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub gas_transportation: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub food_groceries: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub childcare: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub medical_expenses: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub insurance_not_deducted: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub other_necessary_expenses: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub total_monthly_expenses: f64,
}
