use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationReport;

pub(crate) const MINIMUM_FILING_AGE: i32 = 18;

// The literals below are fixed; a failed compile is a programming error caught by tests.
// Digit classes are ASCII only: `\d` would also match other scripts' digits.
pub(crate) static SSN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{3}-?[0-9]{2}-?[0-9]{4}$").expect("valid ssn pattern"));
pub(crate) static ZIP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{5}(-[0-9]{4})?$").expect("valid zip pattern"));
pub(crate) static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{3}-?[0-9]{3}-?[0-9]{4}$").expect("valid phone pattern"));
pub(crate) static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Flags `field` when `value` is blank. Returns whether a value is present.
pub(crate) fn require(
    report: &mut ValidationReport,
    field: &str,
    value: &str,
    message: &str,
) -> bool {
    if value.trim().is_empty() {
        report.insert(field, message);
        false
    } else {
        true
    }
}

/// Required field that must also match `pattern`.
pub(crate) fn require_pattern(
    report: &mut ValidationReport,
    field: &str,
    value: &str,
    pattern: &Regex,
    missing: &str,
    malformed: &str,
) {
    if require(report, field, value, missing) && !pattern.is_match(value.trim()) {
        report.insert(field, malformed);
    }
}

/// Required `YYYY-MM-DD` date whose year lies at least 18 years before
/// `today`'s year. Month and day are ignored: someone born in December is
/// treated as 18 from January 1st of their eighteenth year.
pub(crate) fn require_adult_birth_date(
    report: &mut ValidationReport,
    field: &str,
    value: &str,
    today: NaiveDate,
    missing: &str,
    underage: &str,
) {
    if !require(report, field, value, missing) {
        return;
    }
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(birth) => {
            if today.year() - birth.year() < MINIMUM_FILING_AGE {
                report.insert(field, underage);
            }
        }
        Err(_) => report.insert(field, "Please enter the date as YYYY-MM-DD"),
    }
}

pub(crate) fn non_negative(report: &mut ValidationReport, field: &str, value: f64) {
    if value < 0.0 || !value.is_finite() {
        report.insert(field, "Amount cannot be negative");
    }
}
