//! The step state machine and the navigation shell rendered on top of it.

pub mod machine;
pub mod shell;
pub mod steps;

pub use machine::{Phase, WizardMachine, WizardState};
pub use shell::{ActionButton, NavAction, NavigationShell, ProgressEntry, ProgressStatus, ShellView};
pub use steps::{StepDescriptor, StepOrder};
