//! Remote session client.
//!
//! [`IntakeApi`] is the transport seam: the wizard only ever talks to the
//! backend through it, which keeps the state machine testable against an
//! in-memory fake. [`HttpIntakeClient`] is the production implementation.
//! Step-typed create-or-update logic lives in [`upsert`] and is written once
//! against the trait.

pub mod http;
pub mod upsert;
pub mod wire;

use std::sync::Arc;

use serde_json::Value;

use crate::{
    domain::{
        DistrictId, GeneratedForm, MeansTestResult, RecordId, Session, SessionId, SessionPatch,
        SessionSummary,
    },
    errors::ApiError,
};

pub use http::HttpIntakeClient;
pub use upsert::{
    sync_assets, sync_debts, upsert_debtor, upsert_expense, upsert_income, SyncFailure,
    SyncProgress, SyncResult,
};
pub use wire::{CreateSessionRequest, UpdateStepRequest};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// The per-step child collections exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    DebtorInfo,
    IncomeInfo,
    ExpenseInfo,
    Assets,
    Debts,
}

impl Collection {
    pub fn path(self) -> &'static str {
        match self {
            Collection::DebtorInfo => "/intake/debtor-info/",
            Collection::IncomeInfo => "/intake/income-info/",
            Collection::ExpenseInfo => "/intake/expense-info/",
            Collection::Assets => "/intake/assets/",
            Collection::Debts => "/intake/debts/",
        }
    }

    pub fn record_path(self, id: RecordId) -> String {
        format!("{}{}/", self.path(), id)
    }
}

/// Typed operations against the intake backend. Implementations perform no
/// caching and no retries.
pub trait IntakeApi: Send + Sync {
    fn create_session(&self, request: &CreateSessionRequest) -> ApiResult<Session>;
    fn get_session(&self, id: SessionId) -> ApiResult<Session>;
    fn update_session(&self, id: SessionId, patch: &SessionPatch) -> ApiResult<Session>;
    fn update_step(&self, id: SessionId, request: &UpdateStepRequest) -> ApiResult<Session>;
    fn complete_session(&self, id: SessionId) -> ApiResult<()>;
    fn calculate_means_test(&self, id: SessionId) -> ApiResult<MeansTestResult>;
    fn preview_form_101(&self, id: SessionId) -> ApiResult<Value>;
    fn session_summary(&self, id: SessionId) -> ApiResult<SessionSummary>;

    /// Creates a child record owned by `session`; the body gains a
    /// `session` key.
    fn create_record(
        &self,
        collection: Collection,
        session: SessionId,
        body: &Value,
    ) -> ApiResult<Value>;
    fn update_record(&self, collection: Collection, id: RecordId, body: &Value)
        -> ApiResult<Value>;
    fn delete_record(&self, collection: Collection, id: RecordId) -> ApiResult<()>;

    fn generate_form_101(&self, session: SessionId) -> ApiResult<GeneratedForm>;
    fn mark_form_downloaded(&self, form: RecordId) -> ApiResult<()>;
    fn mark_form_filed(&self, form: RecordId) -> ApiResult<()>;
}

impl<T: IntakeApi + ?Sized> IntakeApi for Arc<T> {
    fn create_session(&self, request: &CreateSessionRequest) -> ApiResult<Session> {
        (**self).create_session(request)
    }

    fn get_session(&self, id: SessionId) -> ApiResult<Session> {
        (**self).get_session(id)
    }

    fn update_session(&self, id: SessionId, patch: &SessionPatch) -> ApiResult<Session> {
        (**self).update_session(id, patch)
    }

    fn update_step(&self, id: SessionId, request: &UpdateStepRequest) -> ApiResult<Session> {
        (**self).update_step(id, request)
    }

    fn complete_session(&self, id: SessionId) -> ApiResult<()> {
        (**self).complete_session(id)
    }

    fn calculate_means_test(&self, id: SessionId) -> ApiResult<MeansTestResult> {
        (**self).calculate_means_test(id)
    }

    fn preview_form_101(&self, id: SessionId) -> ApiResult<Value> {
        (**self).preview_form_101(id)
    }

    fn session_summary(&self, id: SessionId) -> ApiResult<SessionSummary> {
        (**self).session_summary(id)
    }

    fn create_record(
        &self,
        collection: Collection,
        session: SessionId,
        body: &Value,
    ) -> ApiResult<Value> {
        (**self).create_record(collection, session, body)
    }

    fn update_record(
        &self,
        collection: Collection,
        id: RecordId,
        body: &Value,
    ) -> ApiResult<Value> {
        (**self).update_record(collection, id, body)
    }

    fn delete_record(&self, collection: Collection, id: RecordId) -> ApiResult<()> {
        (**self).delete_record(collection, id)
    }

    fn generate_form_101(&self, session: SessionId) -> ApiResult<GeneratedForm> {
        (**self).generate_form_101(session)
    }

    fn mark_form_downloaded(&self, form: RecordId) -> ApiResult<()> {
        (**self).mark_form_downloaded(form)
    }

    fn mark_form_filed(&self, form: RecordId) -> ApiResult<()> {
        (**self).mark_form_filed(form)
    }
}

/// Request to open a new session in `district` at step one.
pub fn new_session_request(district: DistrictId) -> CreateSessionRequest {
    CreateSessionRequest {
        district,
        current_step: 1,
    }
}
