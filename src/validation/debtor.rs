use chrono::NaiveDate;

use crate::domain::{DebtorInfo, FilingType, RecordId};

use super::rules::{
    require, require_adult_birth_date, require_pattern, EMAIL_PATTERN, PHONE_PATTERN,
    SSN_PATTERN, ZIP_PATTERN,
};
use super::ValidationReport;

/// States offered by the address form.
pub const US_STATES: [(&str, &str); 3] = [("IL", "Illinois"), ("IN", "Indiana"), ("WI", "Wisconsin")];

const UNDERAGE_MESSAGE: &str = "You must be 18 or older to file for bankruptcy";

/// Identity of the second filer in a joint case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoDebtor {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub ssn: String,
    pub date_of_birth: String,
}

/// How the case is filed. Joint filings carry the co-debtor they require.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filing {
    Individual,
    Joint(CoDebtor),
}

impl Filing {
    pub fn filing_type(&self) -> FilingType {
        match self {
            Filing::Individual => FilingType::Individual,
            Filing::Joint(_) => FilingType::Joint,
        }
    }

    /// Fields that become mandatory with this filing type.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Filing::Individual => &[],
            Filing::Joint(_) => &[
                "co_debtor_first_name",
                "co_debtor_last_name",
                "co_debtor_ssn",
                "co_debtor_date_of_birth",
            ],
        }
    }

    pub fn co_debtor(&self) -> Option<&CoDebtor> {
        match self {
            Filing::Individual => None,
            Filing::Joint(co) => Some(co),
        }
    }

    pub fn co_debtor_mut(&mut self) -> Option<&mut CoDebtor> {
        match self {
            Filing::Individual => None,
            Filing::Joint(co) => Some(co),
        }
    }
}

/// Editable personal information for step one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebtorDraft {
    pub record_id: Option<RecordId>,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub ssn: String,
    pub date_of_birth: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone_number: String,
    pub email: String,
    pub household_size: Option<u32>,
    pub filing: Option<Filing>,
}

impl DebtorDraft {
    /// Switches filing type, keeping any co-debtor details already typed
    /// when staying joint.
    pub fn set_filing_type(&mut self, filing_type: FilingType) {
        self.filing = Some(match (filing_type, self.filing.take()) {
            (FilingType::Individual, _) => Filing::Individual,
            (FilingType::Joint, Some(Filing::Joint(co))) => Filing::Joint(co),
            (FilingType::Joint, _) => Filing::Joint(CoDebtor::default()),
        });
    }

    pub fn from_record(record: &DebtorInfo) -> Self {
        let filing = record.filing_type.map(|kind| match kind {
            FilingType::Individual => Filing::Individual,
            FilingType::Joint => Filing::Joint(CoDebtor {
                first_name: record.co_debtor_first_name.clone(),
                middle_name: record.co_debtor_middle_name.clone(),
                last_name: record.co_debtor_last_name.clone(),
                ssn: record.co_debtor_ssn.clone(),
                date_of_birth: record.co_debtor_date_of_birth.clone(),
            }),
        });
        Self {
            record_id: record.id,
            first_name: record.first_name.clone(),
            middle_name: record.middle_name.clone(),
            last_name: record.last_name.clone(),
            ssn: record.ssn.clone(),
            date_of_birth: record.date_of_birth.clone(),
            street_address: record.street_address.clone(),
            city: record.city.clone(),
            state: record.state.clone(),
            zip_code: record.zip_code.clone(),
            phone_number: record.phone_number.clone(),
            email: record.email.clone(),
            household_size: (record.household_size > 0).then_some(record.household_size),
            filing,
        }
    }

    /// Flattens the draft into the backend's column layout. Co-debtor
    /// columns are sent blank for individual filings.
    pub fn to_record(&self) -> DebtorInfo {
        let co = self
            .filing
            .as_ref()
            .and_then(Filing::co_debtor)
            .cloned()
            .unwrap_or_default();
        DebtorInfo {
            id: self.record_id,
            session: None,
            first_name: self.first_name.trim().to_string(),
            middle_name: self.middle_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            ssn: self.ssn.trim().to_string(),
            date_of_birth: self.date_of_birth.trim().to_string(),
            street_address: self.street_address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip_code: self.zip_code.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            email: self.email.trim().to_string(),
            household_size: self.household_size.unwrap_or(0),
            filing_type: self.filing.as_ref().map(Filing::filing_type),
            co_debtor_first_name: co.first_name.trim().to_string(),
            co_debtor_middle_name: co.middle_name.trim().to_string(),
            co_debtor_last_name: co.last_name.trim().to_string(),
            co_debtor_ssn: co.ssn.trim().to_string(),
            co_debtor_date_of_birth: co.date_of_birth.trim().to_string(),
        }
    }
}

pub fn validate_debtor(draft: &DebtorDraft, today: NaiveDate) -> ValidationReport {
    let mut report = ValidationReport::new();

    require(&mut report, "first_name", &draft.first_name, "Please enter your first name");
    require(&mut report, "last_name", &draft.last_name, "Please enter your last name");
    require_adult_birth_date(
        &mut report,
        "date_of_birth",
        &draft.date_of_birth,
        today,
        "Please enter your date of birth",
        UNDERAGE_MESSAGE,
    );
    require_pattern(
        &mut report,
        "ssn",
        &draft.ssn,
        &SSN_PATTERN,
        "Please enter your Social Security Number",
        "Please enter a valid Social Security Number (XXX-XX-XXXX)",
    );
    require(
        &mut report,
        "street_address",
        &draft.street_address,
        "Please enter your street address",
    );
    require(&mut report, "city", &draft.city, "Please enter your city");
    require(&mut report, "state", &draft.state, "Please select your state");
    require_pattern(
        &mut report,
        "zip_code",
        &draft.zip_code,
        &ZIP_PATTERN,
        "Please enter your ZIP code",
        "Please enter a valid ZIP code (XXXXX or XXXXX-XXXX)",
    );
    require_pattern(
        &mut report,
        "email",
        &draft.email,
        &EMAIL_PATTERN,
        "Please enter your email address",
        "Please enter a valid email address",
    );
    require_pattern(
        &mut report,
        "phone_number",
        &draft.phone_number,
        &PHONE_PATTERN,
        "Please enter your phone number",
        "Please enter a valid phone number (XXX-XXX-XXXX)",
    );
    if draft.household_size.unwrap_or(0) < 1 {
        report.insert("household_size", "Please enter your household size");
    }

    match &draft.filing {
        None => report.insert("filing_type", "Please select your filing type"),
        Some(Filing::Individual) => {}
        Some(Filing::Joint(co)) => validate_co_debtor(&mut report, co, today),
    }

    report
}

fn validate_co_debtor(report: &mut ValidationReport, co: &CoDebtor, today: NaiveDate) {
    require(
        report,
        "co_debtor_first_name",
        &co.first_name,
        "Please enter your spouse's first name",
    );
    require(
        report,
        "co_debtor_last_name",
        &co.last_name,
        "Please enter your spouse's last name",
    );
    require_pattern(
        report,
        "co_debtor_ssn",
        &co.ssn,
        &SSN_PATTERN,
        "Please enter your spouse's Social Security Number",
        "Please enter a valid Social Security Number (XXX-XX-XXXX)",
    );
    require_adult_birth_date(
        report,
        "co_debtor_date_of_birth",
        &co.date_of_birth,
        today,
        "Please enter your spouse's date of birth",
        UNDERAGE_MESSAGE,
    );
}
