//! Per-step editable data and the pure validators that judge it.
//!
//! A validator never performs I/O: it maps a draft (plus the reference date
//! for age checks) to a [`ValidationReport`]. An empty report means the step
//! may be submitted.

pub mod debtor;
pub mod finance;
pub mod property;
mod rules;

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::domain::{Session, StepKind};

pub use debtor::{validate_debtor, CoDebtor, DebtorDraft, Filing, US_STATES};
pub use finance::{
    validate_expense, validate_income, AmountField, ExpenseDraft, IncomeDraft,
    ZERO_EXPENSE_MESSAGE, ZERO_INCOME_MESSAGE,
};
pub use property::{
    validate_asset, validate_assets, validate_debt, validate_debts, AssetDraft, DebtDraft,
    ListDraft, Persisted,
};

/// Key of the step-wide message that is not tied to a single field.
pub const GENERAL: &str = "general";

/// Field name → human-readable message. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records `message` for `field`, keeping the first message if the
    /// field already failed another rule.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_insert_with(|| message.into());
    }

    pub fn set_general(&mut self, message: impl Into<String>) {
        self.insert(GENERAL, message);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn general(&self) -> Option<&str> {
        self.get(GENERAL)
    }

    /// Field-specific messages, excluding the general one.
    pub fn field_errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .iter()
            .filter(|(field, _)| field.as_str() != GENERAL)
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    /// Copies `other` under `prefix` (e.g. `assets[2].`). A nested general
    /// message lands on the prefix itself.
    pub fn absorb(&mut self, prefix: &str, other: ValidationReport) {
        for (field, message) in other.errors {
            if field == GENERAL {
                self.insert(prefix.trim_end_matches('.'), message);
            } else {
                self.insert(format!("{prefix}{field}"), message);
            }
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// Every editor the wizard carries, one per step kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepDrafts {
    pub debtor: DebtorDraft,
    pub income: IncomeDraft,
    pub expense: ExpenseDraft,
    pub assets: ListDraft<AssetDraft>,
    pub debts: ListDraft<DebtDraft>,
}

impl StepDrafts {
    /// Pre-populates every editor from the records nested in `session`.
    pub fn from_session(session: &Session) -> Self {
        Self {
            debtor: session
                .debtor_info
                .as_ref()
                .map(DebtorDraft::from_record)
                .unwrap_or_default(),
            income: session
                .income_info
                .as_ref()
                .map(IncomeDraft::from_record)
                .unwrap_or_default(),
            expense: session
                .expense_info
                .as_ref()
                .map(ExpenseDraft::from_record)
                .unwrap_or_default(),
            assets: ListDraft::from_items(session.assets.iter().map(AssetDraft::from_record)),
            debts: ListDraft::from_items(session.debts.iter().map(DebtDraft::from_record)),
        }
    }

    /// Runs the validator for `kind` against the matching draft.
    pub fn validate(&self, kind: StepKind, today: NaiveDate) -> ValidationReport {
        match kind {
            StepKind::DebtorInfo => validate_debtor(&self.debtor, today),
            StepKind::IncomeInfo => validate_income(&self.income),
            StepKind::ExpenseInfo => validate_expense(&self.expense),
            StepKind::Assets => validate_assets(&self.assets),
            StepKind::Debts => validate_debts(&self.debts),
            StepKind::Review => ValidationReport::new(),
        }
    }
}
