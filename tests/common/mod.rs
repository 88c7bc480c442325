#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::{mpsc, Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, TimeZone, Utc};
use intake_wizard::{
    api::{ApiResult, Collection, CreateSessionRequest, IntakeApi, UpdateStepRequest},
    domain::{
        FilingType, FormStatus, FormType, GeneratedForm, MeansTestDetails, MeansTestResult,
        RecordId, Session, SessionId, SessionPatch, SessionProgress, SessionStatus,
        SessionSummary,
    },
    errors::ApiError,
    storage::MemoryClientStore,
    time::FixedClock,
    validation::DebtorDraft,
    wizard::WizardMachine,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

pub type TestWizard = WizardMachine<Arc<FakeBackend>, Arc<MemoryClientStore>>;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
}

pub fn wizard(backend: &Arc<FakeBackend>, store: &Arc<MemoryClientStore>) -> TestWizard {
    WizardMachine::new(backend.clone(), store.clone())
        .with_clock(Arc::new(FixedClock::new(today())))
}

pub fn complete_debtor(draft: &mut DebtorDraft) {
    draft.first_name = "Ana".into();
    draft.last_name = "Lopez".into();
    draft.ssn = "123-45-6789".into();
    draft.date_of_birth = "1985-06-02".into();
    draft.street_address = "1200 W Grand Ave".into();
    draft.city = "Chicago".into();
    draft.state = "IL".into();
    draft.zip_code = "60642".into();
    draft.phone_number = "312-555-0199".into();
    draft.email = "ana.lopez@example.com".into();
    draft.household_size = Some(2);
    draft.set_filing_type(FilingType::Individual);
}

/// Fills steps one through three with valid answers.
pub fn fill_required_steps(wizard: &TestWizard) {
    wizard
        .edit(|drafts| {
            complete_debtor(&mut drafts.debtor);
            drafts.income.monthly_gross_wages = 3100.0;
            drafts.expense.rent_or_mortgage = 1250.0;
            drafts.expense.food_groceries = 420.0;
        })
        .unwrap();
}

/// Blocks `update_step` until released, to observe the in-flight state.
pub struct Gate {
    entered: mpsc::Sender<()>,
    release: mpsc::Receiver<()>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    sessions: BTreeMap<SessionId, Session>,
    forms: BTreeMap<RecordId, GeneratedForm>,
    calls: Vec<String>,
    failing: HashSet<String>,
}

impl Inner {
    fn allocate(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn call(&mut self, name: &str) -> ApiResult<()> {
        self.calls.push(name.to_string());
        let operation = name.split(' ').next().unwrap_or(name);
        if self.failing.contains(name) || self.failing.contains(operation) {
            return Err(ApiError::Status {
                status: 500,
                message: "Internal Server Error".into(),
                details: None,
            });
        }
        Ok(())
    }

    fn session_mut(&mut self, id: SessionId) -> ApiResult<&mut Session> {
        self.sessions.get_mut(&id).ok_or_else(not_found)
    }
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        message: "Not found.".into(),
        details: None,
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
}

/// In-memory stand-in for the intake backend that records every call.
#[derive(Default)]
pub struct FakeBackend {
    inner: Mutex<Inner>,
    gate: Mutex<Option<Gate>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Adds a session directly, as if created by an earlier run.
    pub fn seed_session(&self, current_step: u32) -> SessionId {
        let mut inner = self.lock();
        let id = inner.allocate();
        inner.sessions.insert(id, new_session(id, 1, current_step));
        id
    }

    pub fn session(&self, id: SessionId) -> Option<Session> {
        self.lock().sessions.get(&id).cloned()
    }

    pub fn fail(&self, call: &str) {
        self.lock().failing.insert(call.to_string());
    }

    pub fn recover(&self, call: &str) {
        self.lock().failing.remove(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Number of calls whose name starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    /// Makes the next `update_step` wait. Returns a receiver that fires when
    /// the call is in flight and a sender that lets it finish.
    pub fn hold_next_update_step(&self) -> (mpsc::Receiver<()>, mpsc::Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *self.gate.lock().unwrap() = Some(Gate {
            entered: entered_tx,
            release: release_rx,
        });
        (entered_rx, release_tx)
    }
}

fn new_session(id: SessionId, district: i64, current_step: u32) -> Session {
    decode(json!({
        "id": id,
        "district": district,
        "current_step": current_step,
        "status": "started",
        "created_at": "2026-03-15T09:00:00Z",
        "assets": [],
        "debts": []
    }))
    .unwrap()
}

impl IntakeApi for FakeBackend {
    fn create_session(&self, request: &CreateSessionRequest) -> ApiResult<Session> {
        let mut inner = self.lock();
        inner.call("create_session")?;
        let id = inner.allocate();
        let session = new_session(id, request.district, request.current_step);
        inner.sessions.insert(id, session.clone());
        Ok(session)
    }

    fn get_session(&self, id: SessionId) -> ApiResult<Session> {
        let mut inner = self.lock();
        inner.call("get_session")?;
        inner.sessions.get(&id).cloned().ok_or_else(not_found)
    }

    fn update_session(&self, id: SessionId, patch: &SessionPatch) -> ApiResult<Session> {
        let mut inner = self.lock();
        inner.call("update_session")?;
        let session = inner.session_mut(id)?;
        if let Some(step) = patch.current_step {
            session.current_step = step;
        }
        if let Some(status) = patch.status {
            session.status = status;
        }
        if let Some(district) = patch.district {
            session.district = district;
        }
        Ok(session.clone())
    }

    fn update_step(&self, id: SessionId, request: &UpdateStepRequest) -> ApiResult<Session> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.entered.send(());
            let _ = gate.release.recv();
        }
        let mut inner = self.lock();
        inner.call("update_step")?;
        let session = inner.session_mut(id)?;
        session.current_step = request.current_step;
        session.status = SessionStatus::InProgress;
        Ok(session.clone())
    }

    fn complete_session(&self, id: SessionId) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("complete_session")?;
        let session = inner.session_mut(id)?;
        session.status = SessionStatus::Completed;
        session.completed_at = Some(Utc.with_ymd_and_hms(2026, 3, 15, 10, 0, 0).unwrap());
        Ok(())
    }

    fn calculate_means_test(&self, id: SessionId) -> ApiResult<MeansTestResult> {
        let mut inner = self.lock();
        inner.call("calculate_means_test")?;
        let session = inner.session_mut(id)?;
        let income = session
            .income_info
            .as_ref()
            .map(|info| info.total_monthly_income)
            .ok_or_else(|| ApiError::Status {
                status: 400,
                message: "Income information required".into(),
                details: None,
            })?;
        let expenses = session
            .expense_info
            .as_ref()
            .map(|info| info.total_monthly_expenses)
            .unwrap_or(0.0);
        Ok(MeansTestResult {
            passes_means_test: income < 6500.0,
            qualifies_for_fee_waiver: false,
            current_monthly_income: income,
            median_income_threshold: 6500.0,
            disposable_monthly_income: income - expenses,
            message: "Calculated".into(),
            details: MeansTestDetails {
                household_size: 2,
                total_income: income,
                total_expenses: expenses,
                district_name: "Northern District of Illinois".into(),
            },
        })
    }

    fn preview_form_101(&self, id: SessionId) -> ApiResult<Value> {
        let mut inner = self.lock();
        inner.call("preview_form_101")?;
        let session = inner.session_mut(id)?;
        Ok(json!({
            "debtor_name": session
                .debtor_info
                .as_ref()
                .map(|d| format!("{} {}", d.first_name, d.last_name)),
        }))
    }

    fn session_summary(&self, id: SessionId) -> ApiResult<SessionSummary> {
        let mut inner = self.lock();
        inner.call("session_summary")?;
        let session = inner.session_mut(id)?.clone();
        Ok(SessionSummary {
            progress: SessionProgress {
                current_step: session.current_step,
                status: session.status.label().into(),
                completion_percentage: session.current_step * 100 / 6,
            },
            session,
            means_test: None,
            forms: Default::default(),
        })
    }

    fn create_record(
        &self,
        collection: Collection,
        session: SessionId,
        body: &Value,
    ) -> ApiResult<Value> {
        let mut inner = self.lock();
        inner.call(&format!("create_record {}", collection.path()))?;
        let id = inner.allocate();
        let mut value = body.clone();
        value["id"] = json!(id);
        value["session"] = json!(session);
        let target = inner.session_mut(session)?;
        match collection {
            Collection::DebtorInfo => target.debtor_info = Some(decode(value.clone())?),
            Collection::IncomeInfo => target.income_info = Some(decode(value.clone())?),
            Collection::ExpenseInfo => target.expense_info = Some(decode(value.clone())?),
            Collection::Assets => target.assets.push(decode(value.clone())?),
            Collection::Debts => target.debts.push(decode(value.clone())?),
        }
        Ok(value)
    }

    fn update_record(
        &self,
        collection: Collection,
        id: RecordId,
        body: &Value,
    ) -> ApiResult<Value> {
        let mut inner = self.lock();
        inner.call(&format!("update_record {}", collection.path()))?;
        for (session_id, session) in inner.sessions.iter_mut() {
            let mut value = body.clone();
            value["id"] = json!(id);
            value["session"] = json!(session_id);
            let matched = match collection {
                Collection::DebtorInfo if session.debtor_info.as_ref().and_then(|r| r.id) == Some(id) => {
                    session.debtor_info = Some(decode(value.clone())?);
                    true
                }
                Collection::IncomeInfo if session.income_info.as_ref().and_then(|r| r.id) == Some(id) => {
                    session.income_info = Some(decode(value.clone())?);
                    true
                }
                Collection::ExpenseInfo if session.expense_info.as_ref().and_then(|r| r.id) == Some(id) => {
                    session.expense_info = Some(decode(value.clone())?);
                    true
                }
                Collection::Assets => match session.assets.iter_mut().find(|a| a.id == Some(id)) {
                    Some(slot) => {
                        *slot = decode(value.clone())?;
                        true
                    }
                    None => false,
                },
                Collection::Debts => match session.debts.iter_mut().find(|d| d.id == Some(id)) {
                    Some(slot) => {
                        *slot = decode(value.clone())?;
                        true
                    }
                    None => false,
                },
                _ => false,
            };
            if matched {
                return Ok(value);
            }
        }
        Err(not_found())
    }

    fn delete_record(&self, collection: Collection, id: RecordId) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call(&format!("delete_record {}", collection.path()))?;
        for session in inner.sessions.values_mut() {
            let before = session.assets.len() + session.debts.len();
            match collection {
                Collection::Assets => session.assets.retain(|a| a.id != Some(id)),
                Collection::Debts => session.debts.retain(|d| d.id != Some(id)),
                _ => {}
            }
            if session.assets.len() + session.debts.len() < before {
                return Ok(());
            }
        }
        Err(not_found())
    }

    fn generate_form_101(&self, session: SessionId) -> ApiResult<GeneratedForm> {
        let mut inner = self.lock();
        inner.call("generate_form_101")?;
        inner.session_mut(session)?;
        let id = inner.allocate();
        let form = GeneratedForm {
            id,
            session,
            form_type: FormType::Form101,
            form_type_display: "Form 101 - Voluntary Petition".into(),
            status: FormStatus::Generated,
            status_display: "Generated".into(),
            form_data: json!({ "session": session }),
            pdf_file_path: None,
            generated_at: None,
        };
        inner.forms.insert(id, form.clone());
        Ok(form)
    }

    fn mark_form_downloaded(&self, form: RecordId) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("mark_form_downloaded")?;
        let stored = inner.forms.get_mut(&form).ok_or_else(not_found)?;
        stored.status = FormStatus::Downloaded;
        Ok(())
    }

    fn mark_form_filed(&self, form: RecordId) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("mark_form_filed")?;
        let stored = inner.forms.get_mut(&form).ok_or_else(not_found)?;
        stored.status = FormStatus::Filed;
        Ok(())
    }
}
