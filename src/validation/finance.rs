use crate::domain::{DataSource, ExpenseInfo, IncomeInfo, RecordId};

use super::rules::non_negative;
use super::ValidationReport;

/// Describes one monthly amount on the income or expense form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountField {
    pub key: &'static str,
    pub label: &'static str,
    pub section: &'static str,
}

/// Generates a draft of monthly amounts plus its field table, keyed
/// accessors, derived total, and record conversions.
macro_rules! amount_draft {
    (
        $(#[$meta:meta])*
        $name:ident => $record:ident, total: $total:ident {
            $($field:ident : $label:literal in $section:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub record_id: Option<RecordId>,
            pub data_source: DataSource,
            $(pub $field: f64,)+
        }

        impl $name {
            pub const FIELDS: &'static [AmountField] = &[
                $(AmountField {
                    key: stringify!($field),
                    label: $label,
                    section: $section,
                },)+
            ];

            /// Sum of every constituent amount.
            pub fn total(&self) -> f64 {
                0.0 $(+ self.$field)+
            }

            pub fn amount(&self, key: &str) -> Option<f64> {
                match key {
                    $(stringify!($field) => Some(self.$field),)+
                    _ => None,
                }
            }

            /// Returns `false` when `key` names no field of this form.
            pub fn set_amount(&mut self, key: &str, value: f64) -> bool {
                match key {
                    $(stringify!($field) => {
                        self.$field = value;
                        true
                    })+
                    _ => false,
                }
            }

            pub fn from_record(record: &$record) -> Self {
                Self {
                    record_id: record.id,
                    data_source: record.data_source,
                    $($field: record.$field,)+
                }
            }

            /// Builds the record to persist, with the derived total filled in.
            pub fn to_record(&self) -> $record {
                $record {
                    id: self.record_id,
                    session: None,
                    data_source: self.data_source,
                    $($field: self.$field,)+
                    $total: self.total(),
                }
            }
        }
    };
}

amount_draft! {
    /// Monthly income before taxes.
    IncomeDraft => IncomeInfo, total: total_monthly_income {
        monthly_gross_wages: "Monthly wages/salary" in "Employment income",
        monthly_overtime: "Overtime pay" in "Employment income",
        monthly_tips: "Tips and commissions" in "Employment income",
        monthly_rental_income: "Rental income" in "Other income",
        monthly_pension: "Pension or retirement" in "Other income",
        monthly_social_security: "Social Security" in "Other income",
        monthly_unemployment: "Unemployment benefits" in "Other income",
        monthly_child_support: "Child support received" in "Other income",
        monthly_alimony: "Alimony received" in "Other income",
        monthly_other_income: "Other income" in "Other income",
    }
}

amount_draft! {
    /// Monthly household expenses.
    ExpenseDraft => ExpenseInfo, total: total_monthly_expenses {
        rent_or_mortgage: "Rent or mortgage" in "Housing",
        utilities: "Utilities" in "Housing",
        home_maintenance: "Home maintenance" in "Housing",
        car_payment: "Car payment" in "Transportation",
        car_insurance: "Car insurance" in "Transportation",
        gas_transportation: "Gas and transit" in "Transportation",
        food_groceries: "Food and groceries" in "Living expenses",
        childcare: "Childcare" in "Living expenses",
        medical_expenses: "Medical expenses" in "Living expenses",
        insurance_not_deducted: "Insurance not deducted from pay" in "Living expenses",
        other_necessary_expenses: "Other necessary expenses" in "Living expenses",
    }
}

pub const ZERO_INCOME_MESSAGE: &str =
    "Please enter at least one source of income. If you have no income, enter 0 for all fields.";
pub const ZERO_EXPENSE_MESSAGE: &str =
    "Please enter your monthly expenses. If you have no expenses, enter 0 for all fields.";

pub fn validate_income(draft: &IncomeDraft) -> ValidationReport {
    let mut report = ValidationReport::new();
    for field in IncomeDraft::FIELDS {
        non_negative(&mut report, field.key, draft.amount(field.key).unwrap_or(0.0));
    }
    if draft.total() == 0.0 {
        report.set_general(ZERO_INCOME_MESSAGE);
    }
    report
}

pub fn validate_expense(draft: &ExpenseDraft) -> ValidationReport {
    let mut report = ValidationReport::new();
    for field in ExpenseDraft::FIELDS {
        non_negative(&mut report, field.key, draft.amount(field.key).unwrap_or(0.0));
    }
    if draft.total() == 0.0 {
        report.set_general(ZERO_EXPENSE_MESSAGE);
    }
    report
}
