use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    api::{
        new_session_request, sync_assets, sync_debts, upsert_debtor, upsert_expense,
        upsert_income, IntakeApi, SyncFailure, SyncProgress, UpdateStepRequest,
    },
    config::DEFAULT_DISTRICT_ID,
    domain::{
        AssetInfo, DebtInfo, DistrictId, FormStatus, GeneratedForm, MeansTestResult, RecordId,
        Session, SessionId, SessionSummary, StepKind,
    },
    errors::{ApiError, Operation, WizardError},
    storage::ClientStore,
    time::{Clock, SystemClock},
    validation::{
        AssetDraft, DebtDraft, DebtorDraft, ExpenseDraft, IncomeDraft, ListDraft, StepDrafts,
        ValidationReport,
    },
};

use super::shell::{NavigationShell, ShellView};
use super::steps::{StepDescriptor, StepOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No session has been resumed or created yet.
    Uninitialized,
    Ready,
}

/// Everything the wizard knows at one instant. Obtained through
/// [`WizardMachine::snapshot`].
#[derive(Debug, Clone)]
pub struct WizardState {
    pub phase: Phase,
    pub session: Option<Session>,
    /// 1-based index into the step order.
    pub current_step: u32,
    /// True while a request started by this wizard is outstanding.
    pub busy: bool,
    /// User-facing message of the most recent failed request.
    pub last_error: Option<String>,
    pub drafts: StepDrafts,
    pub means_test: Option<MeansTestResult>,
    pub summary: Option<SessionSummary>,
    pub form_preview: Option<Value>,
    pub generated_form: Option<GeneratedForm>,
    generation: u64,
}

impl WizardState {
    fn new() -> Self {
        Self {
            phase: Phase::Uninitialized,
            session: None,
            current_step: 1,
            busy: false,
            last_error: None,
            drafts: StepDrafts::default(),
            means_test: None,
            summary: None,
            form_preview: None,
            generated_form: None,
            generation: 0,
        }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|session| session.id)
    }

    pub fn is_completed(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_completed)
    }

    /// Adopts `session` and re-seeds every editor from its nested records.
    fn hydrate(&mut self, session: Session, current_step: u32) {
        self.drafts = StepDrafts::from_session(&session);
        self.session = Some(session);
        self.current_step = current_step;
        self.phase = Phase::Ready;
        self.means_test = None;
        self.summary = None;
        self.form_preview = None;
        self.generated_form = None;
        self.generation += 1;
    }
}

/// Record ids acknowledged by a step save.
enum StepSave {
    Nothing,
    Debtor(Option<RecordId>),
    Income(Option<RecordId>),
    Expense(Option<RecordId>),
    Assets(Vec<AssetInfo>),
    Debts(Vec<DebtInfo>),
    AssetsPartly(SyncProgress),
    DebtsPartly(SyncProgress),
}

/// A failed save together with whatever the backend stored before failing.
struct SaveFailure {
    saved: StepSave,
    error: ApiError,
}

impl From<ApiError> for SaveFailure {
    fn from(error: ApiError) -> Self {
        Self {
            saved: StepSave::Nothing,
            error,
        }
    }
}

impl StepSave {
    fn apply(self, drafts: &mut StepDrafts) {
        match self {
            StepSave::Nothing => {}
            StepSave::Debtor(id) => drafts.debtor.record_id = id.or(drafts.debtor.record_id),
            StepSave::Income(id) => drafts.income.record_id = id.or(drafts.income.record_id),
            StepSave::Expense(id) => drafts.expense.record_id = id.or(drafts.expense.record_id),
            StepSave::Assets(records) => drafts
                .assets
                .mark_synced(records.iter().map(AssetDraft::from_record).collect()),
            StepSave::Debts(records) => drafts
                .debts
                .mark_synced(records.iter().map(DebtDraft::from_record).collect()),
            StepSave::AssetsPartly(progress) => drafts
                .assets
                .acknowledge(&progress.deleted, &progress.stored),
            StepSave::DebtsPartly(progress) => drafts
                .debts
                .acknowledge(&progress.deleted, &progress.stored),
        }
    }
}

/// Clears the busy flag when a request finishes, however it finishes.
struct BusyGuard<'a> {
    state: &'a Mutex<WizardState>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .busy = false;
    }
}

/// What a request captured from the state when it started.
struct Ticket {
    session_id: SessionId,
    generation: u64,
    step: u32,
}

/// The intake wizard: tracks the active session and step, gates navigation
/// on validation, and persists each step before moving forward.
///
/// Methods take `&self`; state sits behind a mutex that is never held across
/// a network call. At most one request runs at a time. A second
/// [`advance`](Self::advance) or [`complete`](Self::complete) while one is in
/// flight fails with [`WizardError::Busy`] and sends nothing.
pub struct WizardMachine<A, S> {
    api: A,
    store: S,
    clock: Arc<dyn Clock>,
    steps: StepOrder,
    shell: NavigationShell,
    district: DistrictId,
    state: Mutex<WizardState>,
}

impl<A: IntakeApi, S: ClientStore> WizardMachine<A, S> {
    pub fn new(api: A, store: S) -> Self {
        let steps = StepOrder::default();
        Self {
            api,
            store,
            clock: Arc::new(SystemClock),
            shell: NavigationShell::new(steps.clone()),
            steps,
            district: DEFAULT_DISTRICT_ID,
            state: Mutex::new(WizardState::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// District used when a new session has to be created.
    pub fn with_district(mut self, district: DistrictId) -> Self {
        self.district = district;
        self
    }

    pub fn with_steps(mut self, steps: StepOrder) -> Self {
        self.shell = NavigationShell::new(steps.clone());
        self.steps = steps;
        self
    }

    pub fn steps(&self) -> &StepOrder {
        &self.steps
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn snapshot(&self) -> WizardState {
        self.lock().clone()
    }

    pub fn current_step(&self) -> u32 {
        self.lock().current_step
    }

    pub fn current_descriptor(&self) -> Option<StepDescriptor> {
        self.steps.get(self.current_step()).copied()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    /// Validation outcome of the current step's draft.
    pub fn validation(&self) -> ValidationReport {
        let state = self.lock();
        self.validate_step(&state, state.current_step)
    }

    pub fn can_go_next(&self) -> bool {
        self.validation().is_valid()
    }

    /// Presentation model of the navigation shell for the current state.
    pub fn view(&self) -> ShellView {
        let state = self.lock();
        let validation = self.validate_step(&state, state.current_step);
        self.shell.view(&state, &validation)
    }

    /// Resumes the stored session or starts a new one.
    ///
    /// A stored id whose session cannot be fetched is forgotten and a fresh
    /// session is created at step 1. Calling this once ready is a no-op.
    pub fn initialize(&self) -> Result<(), WizardError> {
        {
            let mut state = self.lock();
            if state.phase == Phase::Ready {
                return Ok(());
            }
            if state.busy {
                return Err(WizardError::Busy);
            }
            state.busy = true;
            state.last_error = None;
        }
        let _guard = self.busy_guard();

        let stored = match self.store.session_id() {
            Ok(id) => id,
            Err(err) => {
                warn!(error = %err, "could not read stored session id; starting a new session");
                None
            }
        };

        if let Some(id) = stored {
            match self.api.get_session(id) {
                Ok(session) => {
                    let step = self.steps.clamp(session.current_step);
                    info!(session = id, step, status = session.status.label(), "resumed intake session");
                    self.lock().hydrate(session, step);
                    return Ok(());
                }
                Err(err) => {
                    warn!(session = id, error = %err, "stored session could not be loaded; starting over");
                    if let Err(err) = self.store.forget_session() {
                        warn!(error = %err, "could not forget stale session id");
                    }
                }
            }
        }

        match self.api.create_session(&new_session_request(self.district)) {
            Ok(session) => {
                info!(session = session.id, district = self.district, "created intake session");
                if let Err(err) = self.store.record_session_id(Some(session.id)) {
                    warn!(error = %err, "could not remember session id");
                }
                self.lock().hydrate(session, 1);
                Ok(())
            }
            Err(err) => Err(self.fail(Operation::StartSession, err)),
        }
    }

    /// Forgets the stored session and starts a new one.
    pub fn start_over(&self) -> Result<(), WizardError> {
        {
            let mut state = self.lock();
            if state.busy {
                return Err(WizardError::Busy);
            }
            self.store.forget_session()?;
            let generation = state.generation + 1;
            *state = WizardState::new();
            state.generation = generation;
        }
        info!("starting a new intake session");
        self.initialize()
    }

    /// Validates and saves the current step, then moves to the next one.
    /// Returns the new step number.
    ///
    /// On any failure the step index is unchanged. Validation failures are
    /// returned without touching the network.
    pub fn advance(&self) -> Result<u32, WizardError> {
        let (ticket, kind, drafts) = {
            let mut state = self.lock();
            if state.busy {
                return Err(WizardError::Busy);
            }
            let session_id = state.session_id().ok_or(WizardError::NoSession)?;
            if state.is_completed() {
                return Err(WizardError::AlreadyCompleted);
            }
            if self.steps.is_last(state.current_step) {
                return Err(WizardError::AtLastStep);
            }
            let report = self.validate_step(&state, state.current_step);
            if !report.is_valid() {
                debug!(step = state.current_step, errors = %report, "step failed validation");
                return Err(WizardError::Validation(report));
            }
            let kind = self.kind_at(state.current_step);
            state.busy = true;
            state.last_error = None;
            let ticket = Ticket {
                session_id,
                generation: state.generation,
                step: state.current_step,
            };
            (ticket, kind, state.drafts.clone())
        };
        let _guard = self.busy_guard();

        let next = ticket.step + 1;
        let outcome = self
            .save_step(ticket.session_id, kind, &drafts)
            .and_then(|saved| {
                let request = UpdateStepRequest {
                    current_step: next,
                    data: None,
                };
                match self.api.update_step(ticket.session_id, &request) {
                    Ok(session) => Ok((saved, session)),
                    Err(error) => Err(SaveFailure { saved, error }),
                }
            });

        match outcome {
            Ok((saved, session)) => {
                let mut state = self.lock();
                saved.apply(&mut state.drafts);
                if state.generation != ticket.generation {
                    debug!(step = ticket.step, "discarding advance superseded by navigation");
                    return Err(WizardError::Stale);
                }
                state.session = Some(session);
                state.current_step = next;
                state.generation += 1;
                info!(session = ticket.session_id, step = next, "advanced to step");
                Ok(next)
            }
            Err(failure) => {
                Err(self.fail_saving(ticket.generation, Operation::SaveProgress, failure))
            }
        }
    }

    /// Moves back one step. Never touches the network and never validates.
    /// Allowed while a request is in flight; that request's result is then
    /// discarded. The navigation shell disables its Previous button while
    /// busy, so only callers driving the machine directly reach that case.
    pub fn retreat(&self) -> u32 {
        let mut state = self.lock();
        if state.current_step > 1 {
            state.current_step -= 1;
            state.generation += 1;
            debug!(step = state.current_step, "moved back");
        }
        state.current_step
    }

    /// Saves the last step, marks the session complete, and re-fetches it.
    pub fn complete(&self) -> Result<Session, WizardError> {
        let (ticket, kind, drafts) = {
            let mut state = self.lock();
            if state.busy {
                return Err(WizardError::Busy);
            }
            let session_id = state.session_id().ok_or(WizardError::NoSession)?;
            if !self.steps.is_last(state.current_step) {
                return Err(WizardError::NotOnLastStep);
            }
            if state.is_completed() {
                return Err(WizardError::AlreadyCompleted);
            }
            let report = self.validate_step(&state, state.current_step);
            if !report.is_valid() {
                return Err(WizardError::Validation(report));
            }
            let today = self.clock.today();
            let incomplete: Vec<&'static str> = self
                .steps
                .iter()
                .filter(|step| step.kind.required_for_completion())
                .filter(|step| !state.drafts.validate(step.kind, today).is_valid())
                .map(|step| step.label)
                .collect();
            if !incomplete.is_empty() {
                return Err(WizardError::IncompleteSteps(incomplete));
            }
            let kind = self.kind_at(state.current_step);
            state.busy = true;
            state.last_error = None;
            let ticket = Ticket {
                session_id,
                generation: state.generation,
                step: state.current_step,
            };
            (ticket, kind, state.drafts.clone())
        };
        let _guard = self.busy_guard();

        let outcome = self
            .save_step(ticket.session_id, kind, &drafts)
            .and_then(|saved| {
                let finished = self
                    .api
                    .complete_session(ticket.session_id)
                    .and_then(|()| self.api.get_session(ticket.session_id));
                match finished {
                    Ok(session) => Ok((saved, session)),
                    Err(error) => Err(SaveFailure { saved, error }),
                }
            });

        match outcome {
            Ok((saved, session)) => {
                let mut state = self.lock();
                saved.apply(&mut state.drafts);
                if state.generation != ticket.generation {
                    return Err(WizardError::Stale);
                }
                if !session.is_completed() {
                    warn!(session = session.id, status = session.status.label(), "completed session reported unexpected status");
                }
                info!(session = session.id, "intake session completed");
                state.session = Some(session.clone());
                state.generation += 1;
                Ok(session)
            }
            Err(failure) => {
                Err(self.fail_saving(ticket.generation, Operation::CompleteSession, failure))
            }
        }
    }

    pub fn calculate_means_test(&self) -> Result<MeansTestResult, WizardError> {
        let result = self.request(Operation::MeansTest, |id| self.api.calculate_means_test(id))?;
        info!(passes = result.passes_means_test, "means test calculated");
        self.lock().means_test = Some(result.clone());
        Ok(result)
    }

    pub fn load_summary(&self) -> Result<SessionSummary, WizardError> {
        let summary = self.request(Operation::LoadSummary, |id| self.api.session_summary(id))?;
        self.lock().summary = Some(summary.clone());
        Ok(summary)
    }

    pub fn preview_form_101(&self) -> Result<Value, WizardError> {
        let preview = self.request(Operation::PreviewForm, |id| self.api.preview_form_101(id))?;
        self.lock().form_preview = Some(preview.clone());
        Ok(preview)
    }

    pub fn generate_form_101(&self) -> Result<GeneratedForm, WizardError> {
        let form = self.request(Operation::GenerateForm, |id| self.api.generate_form_101(id))?;
        info!(form = form.id, "generated Form 101");
        self.lock().generated_form = Some(form.clone());
        Ok(form)
    }

    pub fn mark_form_downloaded(&self, form: RecordId) -> Result<(), WizardError> {
        self.request(Operation::UpdateForm, |_| self.api.mark_form_downloaded(form))?;
        self.set_form_status(form, FormStatus::Downloaded);
        Ok(())
    }

    pub fn mark_form_filed(&self, form: RecordId) -> Result<(), WizardError> {
        self.request(Operation::UpdateForm, |_| self.api.mark_form_filed(form))?;
        self.set_form_status(form, FormStatus::Filed);
        Ok(())
    }

    pub fn clear_error(&self) {
        self.lock().last_error = None;
    }

    pub fn edit_debtor<R>(&self, edit: impl FnOnce(&mut DebtorDraft) -> R) -> Result<R, WizardError> {
        self.edit(|drafts| edit(&mut drafts.debtor))
    }

    pub fn edit_income<R>(&self, edit: impl FnOnce(&mut IncomeDraft) -> R) -> Result<R, WizardError> {
        self.edit(|drafts| edit(&mut drafts.income))
    }

    pub fn edit_expense<R>(
        &self,
        edit: impl FnOnce(&mut ExpenseDraft) -> R,
    ) -> Result<R, WizardError> {
        self.edit(|drafts| edit(&mut drafts.expense))
    }

    pub fn edit_assets<R>(
        &self,
        edit: impl FnOnce(&mut ListDraft<AssetDraft>) -> R,
    ) -> Result<R, WizardError> {
        self.edit(|drafts| edit(&mut drafts.assets))
    }

    pub fn edit_debts<R>(
        &self,
        edit: impl FnOnce(&mut ListDraft<DebtDraft>) -> R,
    ) -> Result<R, WizardError> {
        self.edit(|drafts| edit(&mut drafts.debts))
    }

    /// Applies `edit` to the step editors. Rejected while a request is in
    /// flight so a save never races the data it is saving.
    pub fn edit<R>(&self, edit: impl FnOnce(&mut StepDrafts) -> R) -> Result<R, WizardError> {
        let mut state = self.lock();
        if state.busy {
            return Err(WizardError::Busy);
        }
        Ok(edit(&mut state.drafts))
    }

    fn lock(&self) -> MutexGuard<'_, WizardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn busy_guard(&self) -> BusyGuard<'_> {
        BusyGuard { state: &self.state }
    }

    fn kind_at(&self, step: u32) -> StepKind {
        self.steps
            .get(step)
            .map(|descriptor| descriptor.kind)
            .unwrap_or(StepKind::Review)
    }

    fn validate_step(&self, state: &WizardState, step: u32) -> ValidationReport {
        state.drafts.validate(self.kind_at(step), self.clock.today())
    }

    fn save_step(
        &self,
        session: SessionId,
        kind: StepKind,
        drafts: &StepDrafts,
    ) -> Result<StepSave, SaveFailure> {
        debug!(session, step = %kind, "saving step");
        Ok(match kind {
            StepKind::DebtorInfo => {
                StepSave::Debtor(upsert_debtor(&self.api, session, &drafts.debtor.to_record())?.id)
            }
            StepKind::IncomeInfo => {
                StepSave::Income(upsert_income(&self.api, session, &drafts.income.to_record())?.id)
            }
            StepKind::ExpenseInfo => StepSave::Expense(
                upsert_expense(&self.api, session, &drafts.expense.to_record())?.id,
            ),
            StepKind::Assets => match sync_assets(&self.api, session, &drafts.assets) {
                Ok(records) => StepSave::Assets(records),
                Err(SyncFailure { progress, error }) => {
                    return Err(SaveFailure {
                        saved: StepSave::AssetsPartly(progress),
                        error,
                    })
                }
            },
            StepKind::Debts => match sync_debts(&self.api, session, &drafts.debts) {
                Ok(records) => StepSave::Debts(records),
                Err(SyncFailure { progress, error }) => {
                    return Err(SaveFailure {
                        saved: StepSave::DebtsPartly(progress),
                        error,
                    })
                }
            },
            StepKind::Review => StepSave::Nothing,
        })
    }

    /// Runs a session-scoped request under the busy flag.
    fn request<T>(
        &self,
        operation: Operation,
        call: impl FnOnce(SessionId) -> Result<T, ApiError>,
    ) -> Result<T, WizardError> {
        let (session_id, generation) = {
            let mut state = self.lock();
            if state.busy {
                return Err(WizardError::Busy);
            }
            let session_id = state.session_id().ok_or(WizardError::NoSession)?;
            state.busy = true;
            state.last_error = None;
            (session_id, state.generation)
        };
        let _guard = self.busy_guard();
        call(session_id).map_err(|err| self.fail_for(generation, operation, err))
    }

    fn set_form_status(&self, form: RecordId, status: FormStatus) {
        let mut state = self.lock();
        if let Some(generated) = state.generated_form.as_mut().filter(|g| g.id == form) {
            generated.status = status;
        }
    }

    fn fail(&self, operation: Operation, err: ApiError) -> WizardError {
        let generation = self.lock().generation;
        self.fail_for(generation, operation, err)
    }

    /// Keeps the record ids a failed save did store, then reports the failure.
    /// The ids are kept even for a superseded request; edits are blocked while
    /// busy, so the list positions still match.
    fn fail_saving(
        &self,
        generation: u64,
        operation: Operation,
        failure: SaveFailure,
    ) -> WizardError {
        failure.saved.apply(&mut self.lock().drafts);
        self.fail_for(generation, operation, failure.error)
    }

    /// Logs the raw failure and records the user-facing message, unless the
    /// request was superseded in the meantime.
    fn fail_for(&self, generation: u64, operation: Operation, err: ApiError) -> WizardError {
        warn!(operation = %operation, status = ?err.status(), error = %err, "intake request failed");
        let error = WizardError::api(operation, err);
        let mut state = self.lock();
        if state.generation == generation {
            state.last_error = Some(error.user_message());
        }
        error
    }
}
