//! Field tables for the step editors and string-level access to drafts.
//!
//! Prompts deal in text; [`FormModel`] converts between that text and the
//! typed drafts. Parse problems (e.g. letters in an amount) are reported
//! here, while everything the validators judge is left to them.

use crate::domain::{AssetType, DebtType, FilingType};
use crate::validation::{AssetDraft, DebtDraft, DebtorDraft, ExpenseDraft, IncomeDraft, US_STATES};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Whole number; blank clears it.
    Count,
    /// Dollar amount; blank means zero.
    Amount,
    /// One of `(code, label)` pairs.
    Choice(Vec<(&'static str, &'static str)>),
    Toggle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub hint: Option<&'static str>,
}

impl FieldSpec {
    fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: false,
            hint: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn hint(mut self, hint: &'static str) -> Self {
        self.hint = Some(hint);
        self
    }

    pub fn prompt(&self) -> String {
        match (self.required, self.hint) {
            (true, Some(hint)) => format!("{} * ({hint})", self.label),
            (true, None) => format!("{} *", self.label),
            (false, Some(hint)) => format!("{} ({hint})", self.label),
            (false, None) => self.label.to_string(),
        }
    }
}

/// A draft that can be edited one text field at a time.
pub trait FormModel {
    /// Fields in display order. May depend on current values.
    fn fields(&self) -> Vec<FieldSpec>;
    fn read(&self, key: &str) -> String;
    fn write(&mut self, key: &str, raw: &str) -> Result<(), String>;

    fn label_of(&self, key: &str) -> Option<&'static str> {
        self.fields()
            .into_iter()
            .find(|field| field.key == key)
            .map(|field| field.label)
    }
}

const AMOUNT_PARSE_MESSAGE: &str = "Please enter an amount such as 1250.00";

pub fn parse_amount(raw: &str) -> Result<f64, String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return Ok(0.0);
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| AMOUNT_PARSE_MESSAGE.to_string())
}

/// Amounts are shown without trailing zeros so a re-entered value is
/// recognised as unchanged.
pub fn show_amount(value: f64) -> String {
    if value == 0.0 {
        String::new()
    } else {
        format!("{value}")
    }
}

fn parse_toggle(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" => Ok(true),
        "n" | "no" | "false" | "" => Ok(false),
        _ => Err("Please answer yes or no".to_string()),
    }
}

fn filing_code(kind: FilingType) -> &'static str {
    match kind {
        FilingType::Individual => "individual",
        FilingType::Joint => "joint",
    }
}

pub fn asset_type_code(kind: AssetType) -> &'static str {
    match kind {
        AssetType::RealEstate => "real_estate",
        AssetType::Vehicle => "vehicle",
        AssetType::BankAccount => "bank_account",
        AssetType::RetirementAccount => "retirement_account",
        AssetType::PersonalProperty => "personal_property",
        AssetType::Other => "other",
    }
}

pub fn debt_type_code(kind: DebtType) -> &'static str {
    match kind {
        DebtType::Secured => "secured",
        DebtType::Unsecured => "unsecured",
        DebtType::Priority => "priority",
    }
}

fn unknown_field(key: &str) -> String {
    format!("`{key}` is not a field of this form")
}

impl FormModel for DebtorDraft {
    fn fields(&self) -> Vec<FieldSpec> {
        let mut fields = vec![
            FieldSpec::new("first_name", "First name", FieldKind::Text).required(),
            FieldSpec::new("middle_name", "Middle name", FieldKind::Text),
            FieldSpec::new("last_name", "Last name", FieldKind::Text).required(),
            FieldSpec::new("ssn", "Social Security Number", FieldKind::Text)
                .required()
                .hint("XXX-XX-XXXX"),
            FieldSpec::new("date_of_birth", "Date of birth", FieldKind::Text)
                .required()
                .hint("YYYY-MM-DD"),
            FieldSpec::new("street_address", "Street address", FieldKind::Text).required(),
            FieldSpec::new("city", "City", FieldKind::Text).required(),
            FieldSpec::new("state", "State", FieldKind::Choice(US_STATES.to_vec())).required(),
            FieldSpec::new("zip_code", "ZIP code", FieldKind::Text)
                .required()
                .hint("XXXXX or XXXXX-XXXX"),
            FieldSpec::new("phone_number", "Phone number", FieldKind::Text)
                .required()
                .hint("XXX-XXX-XXXX"),
            FieldSpec::new("email", "Email address", FieldKind::Text).required(),
            FieldSpec::new("household_size", "People in your household", FieldKind::Count)
                .required()
                .hint("including yourself"),
            FieldSpec::new(
                "filing_type",
                "Filing type",
                FieldKind::Choice(vec![
                    ("individual", FilingType::Individual.label()),
                    ("joint", FilingType::Joint.label()),
                ]),
            )
            .required(),
        ];
        if self.filing.as_ref().and_then(|f| f.co_debtor()).is_some() {
            fields.extend([
                FieldSpec::new("co_debtor_first_name", "Spouse's first name", FieldKind::Text)
                    .required(),
                FieldSpec::new("co_debtor_middle_name", "Spouse's middle name", FieldKind::Text),
                FieldSpec::new("co_debtor_last_name", "Spouse's last name", FieldKind::Text)
                    .required(),
                FieldSpec::new("co_debtor_ssn", "Spouse's Social Security Number", FieldKind::Text)
                    .required()
                    .hint("XXX-XX-XXXX"),
                FieldSpec::new("co_debtor_date_of_birth", "Spouse's date of birth", FieldKind::Text)
                    .required()
                    .hint("YYYY-MM-DD"),
            ]);
        }
        fields
    }

    fn read(&self, key: &str) -> String {
        let co = self.filing.as_ref().and_then(|f| f.co_debtor());
        match key {
            "first_name" => self.first_name.clone(),
            "middle_name" => self.middle_name.clone(),
            "last_name" => self.last_name.clone(),
            "ssn" => self.ssn.clone(),
            "date_of_birth" => self.date_of_birth.clone(),
            "street_address" => self.street_address.clone(),
            "city" => self.city.clone(),
            "state" => self.state.clone(),
            "zip_code" => self.zip_code.clone(),
            "phone_number" => self.phone_number.clone(),
            "email" => self.email.clone(),
            "household_size" => self
                .household_size
                .map(|size| size.to_string())
                .unwrap_or_default(),
            "filing_type" => self
                .filing
                .as_ref()
                .map(|filing| filing_code(filing.filing_type()).to_string())
                .unwrap_or_default(),
            "co_debtor_first_name" => co.map(|c| c.first_name.clone()).unwrap_or_default(),
            "co_debtor_middle_name" => co.map(|c| c.middle_name.clone()).unwrap_or_default(),
            "co_debtor_last_name" => co.map(|c| c.last_name.clone()).unwrap_or_default(),
            "co_debtor_ssn" => co.map(|c| c.ssn.clone()).unwrap_or_default(),
            "co_debtor_date_of_birth" => co.map(|c| c.date_of_birth.clone()).unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn write(&mut self, key: &str, raw: &str) -> Result<(), String> {
        let value = raw.trim().to_string();
        if let Some(field) = key.strip_prefix("co_debtor_") {
            let co = self
                .filing
                .as_mut()
                .and_then(|filing| filing.co_debtor_mut())
                .ok_or_else(|| "Spouse details apply to joint filings only".to_string())?;
            match field {
                "first_name" => co.first_name = value,
                "middle_name" => co.middle_name = value,
                "last_name" => co.last_name = value,
                "ssn" => co.ssn = value,
                "date_of_birth" => co.date_of_birth = value,
                _ => return Err(unknown_field(key)),
            }
            return Ok(());
        }
        match key {
            "first_name" => self.first_name = value,
            "middle_name" => self.middle_name = value,
            "last_name" => self.last_name = value,
            "ssn" => self.ssn = value,
            "date_of_birth" => self.date_of_birth = value,
            "street_address" => self.street_address = value,
            "city" => self.city = value,
            "state" => self.state = value.to_ascii_uppercase(),
            "zip_code" => self.zip_code = value,
            "phone_number" => self.phone_number = value,
            "email" => self.email = value,
            "household_size" => {
                self.household_size = if value.is_empty() {
                    None
                } else {
                    Some(
                        value
                            .parse::<u32>()
                            .map_err(|_| "Please enter a whole number".to_string())?,
                    )
                }
            }
            "filing_type" => match value.to_ascii_lowercase().as_str() {
                "individual" => self.set_filing_type(FilingType::Individual),
                "joint" => self.set_filing_type(FilingType::Joint),
                "" => self.filing = None,
                _ => return Err("Please choose individual or joint".to_string()),
            },
            _ => return Err(unknown_field(key)),
        }
        Ok(())
    }
}

macro_rules! amount_form {
    ($draft:ty) => {
        impl FormModel for $draft {
            fn fields(&self) -> Vec<FieldSpec> {
                <$draft>::FIELDS
                    .iter()
                    .map(|field| FieldSpec::new(field.key, field.label, FieldKind::Amount))
                    .collect()
            }

            fn read(&self, key: &str) -> String {
                self.amount(key).map(show_amount).unwrap_or_default()
            }

            fn write(&mut self, key: &str, raw: &str) -> Result<(), String> {
                let value = parse_amount(raw)?;
                if self.set_amount(key, value) {
                    Ok(())
                } else {
                    Err(unknown_field(key))
                }
            }
        }
    };
}

amount_form!(IncomeDraft);
amount_form!(ExpenseDraft);

impl FormModel for AssetDraft {
    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new(
                "asset_type",
                "Type of asset",
                FieldKind::Choice(
                    AssetType::ALL
                        .iter()
                        .map(|kind| (asset_type_code(*kind), kind.label()))
                        .collect(),
                ),
            )
            .required(),
            FieldSpec::new("description", "Description", FieldKind::Text)
                .required()
                .hint("e.g. 2015 Honda Civic"),
            FieldSpec::new("current_value", "Current value", FieldKind::Amount),
            FieldSpec::new("amount_owed", "Amount still owed", FieldKind::Amount),
            FieldSpec::new("account_number", "Account number", FieldKind::Text)
                .hint("last 4 digits are enough"),
        ]
    }

    fn read(&self, key: &str) -> String {
        match key {
            "asset_type" => self
                .asset_type
                .map(|kind| asset_type_code(kind).to_string())
                .unwrap_or_default(),
            "description" => self.description.clone(),
            "current_value" => show_amount(self.current_value),
            "amount_owed" => show_amount(self.amount_owed),
            "account_number" => self.account_number.clone(),
            _ => String::new(),
        }
    }

    fn write(&mut self, key: &str, raw: &str) -> Result<(), String> {
        match key {
            "asset_type" => {
                let code = raw.trim();
                self.asset_type = AssetType::ALL
                    .iter()
                    .copied()
                    .find(|kind| asset_type_code(*kind) == code);
                if self.asset_type.is_none() && !code.is_empty() {
                    return Err("Please choose one of the listed asset types".to_string());
                }
            }
            "description" => self.description = raw.trim().to_string(),
            "current_value" => self.current_value = parse_amount(raw)?,
            "amount_owed" => self.amount_owed = parse_amount(raw)?,
            "account_number" => self.account_number = raw.trim().to_string(),
            _ => return Err(unknown_field(key)),
        }
        Ok(())
    }
}

impl FormModel for DebtDraft {
    fn fields(&self) -> Vec<FieldSpec> {
        let mut fields = vec![
            FieldSpec::new("creditor_name", "Owed to", FieldKind::Text)
                .required()
                .hint("creditor name"),
            FieldSpec::new(
                "debt_type",
                "Kind of debt",
                FieldKind::Choice(
                    DebtType::ALL
                        .iter()
                        .map(|kind| (debt_type_code(*kind), kind.label()))
                        .collect(),
                ),
            )
            .required(),
            FieldSpec::new("amount_owed", "Amount owed", FieldKind::Amount),
            FieldSpec::new("monthly_payment", "Monthly payment", FieldKind::Amount),
            FieldSpec::new("account_number", "Account number", FieldKind::Text),
            FieldSpec::new("is_secured", "Is property pledged for this debt?", FieldKind::Toggle),
        ];
        if self.secured() {
            fields.push(
                FieldSpec::new("collateral_description", "Pledged property", FieldKind::Text)
                    .required(),
            );
        }
        fields
    }

    fn read(&self, key: &str) -> String {
        match key {
            "creditor_name" => self.creditor_name.clone(),
            "debt_type" => self
                .debt_type
                .map(|kind| debt_type_code(kind).to_string())
                .unwrap_or_default(),
            "amount_owed" => show_amount(self.amount_owed),
            "monthly_payment" => show_amount(self.monthly_payment),
            "account_number" => self.account_number.clone(),
            "is_secured" => (if self.is_secured { "yes" } else { "no" }).to_string(),
            "collateral_description" => self.collateral_description.clone(),
            _ => String::new(),
        }
    }

    fn write(&mut self, key: &str, raw: &str) -> Result<(), String> {
        match key {
            "creditor_name" => self.creditor_name = raw.trim().to_string(),
            "debt_type" => {
                let code = raw.trim();
                self.debt_type = DebtType::ALL
                    .iter()
                    .copied()
                    .find(|kind| debt_type_code(*kind) == code);
                if self.debt_type.is_none() && !code.is_empty() {
                    return Err("Please choose one of the listed kinds of debt".to_string());
                }
            }
            "amount_owed" => self.amount_owed = parse_amount(raw)?,
            "monthly_payment" => self.monthly_payment = parse_amount(raw)?,
            "account_number" => self.account_number = raw.trim().to_string(),
            "is_secured" => self.is_secured = parse_toggle(raw)?,
            "collateral_description" => self.collateral_description = raw.trim().to_string(),
            _ => return Err(unknown_field(key)),
        }
        Ok(())
    }
}
