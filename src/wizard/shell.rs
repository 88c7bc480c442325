//! Presentation model of the wizard chrome: title, progress, screen-reader
//! announcement, error banner, and navigation buttons.

use crate::domain::StepKind;
use crate::validation::ValidationReport;

use super::machine::{Phase, WizardState};
use super::steps::StepOrder;

pub const WIZARD_TITLE: &str = "Bankruptcy Intake";
pub const PREVIOUS_LABEL: &str = "Go Back";
pub const CONTINUE_LABEL: &str = "Continue";
pub const COMPLETE_LABEL: &str = "Complete Intake";
pub const SAVING_LABEL: &str = "Saving...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    Completed,
    Current,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEntry {
    pub number: u32,
    pub label: &'static str,
    pub status: ProgressStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Previous,
    Continue,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub action: NavAction,
    pub label: &'static str,
    pub enabled: bool,
}

/// Everything a frontend needs to draw one frame of the wizard.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellView {
    pub title: &'static str,
    pub ready: bool,
    pub step_number: u32,
    pub step_count: u32,
    pub step_kind: StepKind,
    pub step_label: &'static str,
    pub progress: Vec<ProgressEntry>,
    /// e.g. "Step 2 of 6: Income", for assistive technology.
    pub announcement: String,
    pub error: Option<String>,
    pub validation: ValidationReport,
    pub can_go_next: bool,
    pub is_last_step: bool,
    pub busy: bool,
    pub completed: bool,
    /// Previous is absent on the first step.
    pub actions: Vec<ActionButton>,
}

impl ShellView {
    pub fn action(&self, action: NavAction) -> Option<&ActionButton> {
        self.actions.iter().find(|button| button.action == action)
    }

    pub fn is_enabled(&self, action: NavAction) -> bool {
        self.action(action).is_some_and(|button| button.enabled)
    }
}

#[derive(Debug, Clone)]
pub struct NavigationShell {
    steps: StepOrder,
}

impl NavigationShell {
    pub fn new(steps: StepOrder) -> Self {
        Self { steps }
    }

    pub fn view(&self, state: &WizardState, validation: &ValidationReport) -> ShellView {
        let count = self.steps.len();
        let number = self.steps.clamp(state.current_step);
        let (kind, label) = self
            .steps
            .get(number)
            .map(|step| (step.kind, step.label))
            .unwrap_or((StepKind::Review, ""));
        let is_last_step = self.steps.is_last(number);
        let can_go_next = validation.is_valid();
        let completed = state.is_completed();

        let progress = self
            .steps
            .iter()
            .map(|step| ProgressEntry {
                number: step.number,
                label: step.label,
                status: match step.number.cmp(&number) {
                    std::cmp::Ordering::Less => ProgressStatus::Completed,
                    std::cmp::Ordering::Equal => ProgressStatus::Current,
                    std::cmp::Ordering::Greater => ProgressStatus::Upcoming,
                },
            })
            .collect();

        let mut actions = Vec::with_capacity(2);
        // The button is disabled while busy, but `WizardMachine::retreat`
        // still accepts a call then and discards the in-flight result.
        if number > 1 {
            actions.push(ActionButton {
                action: NavAction::Previous,
                label: PREVIOUS_LABEL,
                enabled: !state.busy,
            });
        }
        let forward = if is_last_step {
            NavAction::Complete
        } else {
            NavAction::Continue
        };
        actions.push(ActionButton {
            action: forward,
            label: match (state.busy, is_last_step) {
                (true, _) => SAVING_LABEL,
                (false, true) => COMPLETE_LABEL,
                (false, false) => CONTINUE_LABEL,
            },
            enabled: can_go_next
                && !state.busy
                && !completed
                && state.phase == Phase::Ready,
        });

        ShellView {
            title: WIZARD_TITLE,
            ready: state.phase == Phase::Ready,
            step_number: number,
            step_count: count,
            step_kind: kind,
            step_label: label,
            progress,
            announcement: format!("Step {number} of {count}: {label}"),
            error: state.last_error.clone(),
            validation: validation.clone(),
            can_go_next,
            is_last_step,
            busy: state.busy,
            completed,
            actions,
        }
    }
}
