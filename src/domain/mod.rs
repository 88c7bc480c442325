//! Records exchanged with the intake backend.
//!
//! Field names follow the backend's JSON contract. Amounts are carried as
//! `f64` and accept either JSON numbers or decimal strings on input.

pub mod common;
pub mod debtor;
pub mod finance;
pub mod property;
pub mod results;
pub mod session;

pub use common::{DataSource, DistrictId, RecordId, SessionId, StepKind};
pub use debtor::{DebtorInfo, FilingType};
pub use finance::{ExpenseInfo, IncomeInfo};
pub use property::{AssetInfo, AssetType, DebtInfo, DebtType};
pub use results::{
    FormStatus, FormType, GeneratedForm, MeansTestDetails, MeansTestResult, SessionProgress,
    SessionSummary,
};
pub use session::{Session, SessionPatch, SessionStatus};
