//! Turns the shell view and wizard state into printable lines.

use crate::domain::StepKind;
use crate::validation::{ExpenseDraft, IncomeDraft, StepDrafts, ValidationReport, GENERAL};
use crate::wizard::{ProgressStatus, ShellView, WizardState};

use super::forms::FormModel;
use super::output::{format_message, MessageKind, OutputPreferences};

/// `$1,234.50`, with a leading minus for negative amounts.
pub fn format_money(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (index, digit) in dollars.chars().enumerate() {
        if index > 0 && (dollars.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

pub fn progress_line(view: &ShellView, prefs: &OutputPreferences) -> String {
    if prefs.screen_reader_mode {
        let parts: Vec<String> = view
            .progress
            .iter()
            .map(|entry| {
                let status = match entry.status {
                    ProgressStatus::Completed => "completed",
                    ProgressStatus::Current => "current",
                    ProgressStatus::Upcoming => "not started",
                };
                format!("{} {status}", entry.label)
            })
            .collect();
        return format!("Progress: {}.", parts.join(", "));
    }
    view.progress
        .iter()
        .map(|entry| {
            let mark = match entry.status {
                ProgressStatus::Completed => "x",
                ProgressStatus::Current => ">",
                ProgressStatus::Upcoming => " ",
            };
            format!("[{mark}] {}", entry.label)
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// One full frame: header, progress, error banner, step body, and (after a
/// rejected Continue) the validation messages.
pub fn frame_lines(
    view: &ShellView,
    state: &WizardState,
    show_validation: bool,
    prefs: &OutputPreferences,
) -> Vec<String> {
    let mut lines = vec![
        format_message(MessageKind::Section, view.title, prefs),
        view.announcement.clone(),
        progress_line(view, prefs),
    ];
    if let Some(error) = &view.error {
        lines.push(format_message(MessageKind::Error, error, prefs));
    }
    if view.completed {
        lines.push(format_message(
            MessageKind::Success,
            "Your intake is complete. You can still review results and forms.",
            prefs,
        ));
    }
    lines.push(format_message(MessageKind::Separator, "", prefs));
    lines.extend(step_body(view.step_kind, state));
    if show_validation && !view.validation.is_valid() {
        lines.push(String::new());
        lines.extend(validation_lines(view.step_kind, &state.drafts, &view.validation, prefs));
    }
    lines
}

pub fn validation_lines(
    kind: StepKind,
    drafts: &StepDrafts,
    report: &ValidationReport,
    prefs: &OutputPreferences,
) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(general) = report.general() {
        lines.push(format_message(MessageKind::Warning, general, prefs));
    }
    for (field, message) in report.field_errors() {
        let label = field_label(kind, drafts, field).unwrap_or(field);
        lines.push(format_message(
            MessageKind::FieldError,
            format!("{label}: {message}"),
            prefs,
        ));
    }
    lines
}

/// Display label of a report key, including `assets[1].description` style
/// keys of list steps.
pub fn field_label<'a>(kind: StepKind, drafts: &StepDrafts, field: &'a str) -> Option<&'a str> {
    if field == GENERAL {
        return None;
    }
    match kind {
        StepKind::DebtorInfo => drafts.debtor.label_of(field),
        StepKind::IncomeInfo => drafts.income.label_of(field),
        StepKind::ExpenseInfo => drafts.expense.label_of(field),
        StepKind::Assets | StepKind::Debts | StepKind::Review => None,
    }
}

fn step_body(kind: StepKind, state: &WizardState) -> Vec<String> {
    let drafts = &state.drafts;
    match kind {
        StepKind::DebtorInfo => debtor_lines(drafts),
        StepKind::IncomeInfo => amount_lines(
            IncomeDraft::FIELDS.iter().map(|f| (f.section, f.label, drafts.income.amount(f.key))),
            "Total monthly income",
            drafts.income.total(),
        ),
        StepKind::ExpenseInfo => amount_lines(
            ExpenseDraft::FIELDS.iter().map(|f| (f.section, f.label, drafts.expense.amount(f.key))),
            "Total monthly expenses",
            drafts.expense.total(),
        ),
        StepKind::Assets => asset_lines(drafts),
        StepKind::Debts => debt_lines(drafts),
        StepKind::Review => review_lines(state),
    }
}

fn debtor_lines(drafts: &StepDrafts) -> Vec<String> {
    let debtor = &drafts.debtor;
    debtor
        .fields()
        .iter()
        .map(|field| {
            let value = debtor.read(field.key);
            let shown = if value.is_empty() {
                "(not provided)".to_string()
            } else if field.key.ends_with("ssn") {
                mask_ssn(&value)
            } else {
                value
            };
            format!("{}: {shown}", field.label)
        })
        .collect()
}

fn mask_ssn(ssn: &str) -> String {
    let digits: String = ssn.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        9 => format!("***-**-{}", &digits[5..]),
        _ => "***".to_string(),
    }
}

fn amount_lines<'a>(
    fields: impl Iterator<Item = (&'a str, &'a str, Option<f64>)>,
    total_label: &str,
    total: f64,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut section = "";
    for (field_section, label, amount) in fields {
        if field_section != section {
            section = field_section;
            lines.push(format!("{section}:"));
        }
        lines.push(format!("  {label}: {}", format_money(amount.unwrap_or(0.0))));
    }
    lines.push(format!("{total_label}: {}", format_money(total)));
    lines
}

fn asset_lines(drafts: &StepDrafts) -> Vec<String> {
    let assets = drafts.assets.items();
    if assets.is_empty() {
        return vec!["No assets listed. Add anything you own, or continue if you own nothing of value.".into()];
    }
    let mut lines: Vec<String> = assets
        .iter()
        .enumerate()
        .map(|(index, asset)| {
            format!(
                "{}. {} - {}: value {}, owed {}, equity {}",
                index + 1,
                asset.asset_type.map(|t| t.label()).unwrap_or("(type not chosen)"),
                if asset.description.is_empty() { "(no description)" } else { asset.description.as_str() },
                format_money(asset.current_value),
                format_money(asset.amount_owed),
                format_money(asset.equity()),
            )
        })
        .collect();
    let equity: f64 = assets.iter().map(|asset| asset.equity()).sum();
    lines.push(format!("Total equity: {}", format_money(equity)));
    lines
}

fn debt_lines(drafts: &StepDrafts) -> Vec<String> {
    let debts = drafts.debts.items();
    if debts.is_empty() {
        return vec!["No amounts owed listed.".into()];
    }
    let mut lines: Vec<String> = debts
        .iter()
        .enumerate()
        .map(|(index, debt)| {
            let mut line = format!(
                "{}. {} ({}): owed {}, monthly {}",
                index + 1,
                if debt.creditor_name.is_empty() { "(no creditor)" } else { debt.creditor_name.as_str() },
                debt.debt_type.map(|t| t.label()).unwrap_or("kind not chosen"),
                format_money(debt.amount_owed),
                format_money(debt.monthly_payment),
            );
            if debt.secured() && !debt.collateral_description.is_empty() {
                line.push_str(&format!(", secured by {}", debt.collateral_description));
            }
            line
        })
        .collect();
    let total: f64 = debts.iter().map(|debt| debt.amount_owed).sum();
    lines.push(format!("Total owed: {}", format_money(total)));
    lines
}

fn review_lines(state: &WizardState) -> Vec<String> {
    let drafts = &state.drafts;
    let mut lines = vec![
        format!(
            "Name: {}",
            format!("{} {}", drafts.debtor.first_name, drafts.debtor.last_name).trim()
        ),
        format!("Monthly income: {}", format_money(drafts.income.total())),
        format!("Monthly expenses: {}", format_money(drafts.expense.total())),
        format!(
            "Assets: {} listed, equity {}",
            drafts.assets.len(),
            format_money(drafts.assets.items().iter().map(|a| a.equity()).sum())
        ),
        format!(
            "Amounts owed: {} listed, total {}",
            drafts.debts.len(),
            format_money(drafts.debts.items().iter().map(|d| d.amount_owed).sum())
        ),
    ];
    if let Some(session) = &state.session {
        lines.push(format!("Session status: {}", session.status.label()));
    }
    if let Some(result) = &state.means_test {
        lines.push(String::new());
        lines.push(format!(
            "Means test: {}",
            if result.passes_means_test {
                "you appear to qualify for Chapter 7"
            } else {
                "your income is above the Chapter 7 threshold"
            }
        ));
        lines.push(format!(
            "  Current monthly income {} vs. median {}",
            format_money(result.current_monthly_income),
            format_money(result.median_income_threshold)
        ));
        lines.push(format!(
            "  Disposable monthly income {}",
            format_money(result.disposable_monthly_income)
        ));
        if result.qualifies_for_fee_waiver {
            lines.push("  You may qualify for a filing fee waiver.".into());
        }
        if !result.message.is_empty() {
            lines.push(format!("  {}", result.message));
        }
    }
    if let Some(summary) = &state.summary {
        lines.push(format!(
            "Progress: {}% ({} form(s) generated)",
            summary.progress.completion_percentage, summary.forms.generated_count
        ));
    }
    if let Some(form) = &state.generated_form {
        let status = if form.status_display.is_empty() {
            format!("{:?}", form.status).to_lowercase()
        } else {
            form.status_display.clone()
        };
        lines.push(format!("Form 101 #{}: {status}", form.id));
    }
    lines
}
