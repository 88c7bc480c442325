use std::io::{stdout, IsTerminal};

use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use tracing::debug;

use crate::{
    api::IntakeApi,
    domain::StepKind,
    errors::{CliError, WizardError},
    storage::ClientStore,
    validation::{StepDrafts, ValidationReport},
    wizard::{NavAction, ShellView, WizardMachine},
};

use super::forms::{FieldKind, FieldSpec, FormModel};
use super::output::{self, current_preferences};
use super::prompter::{Prompter, TextAnswer};
use super::render;

const MENU_PROMPT: &str = "What would you like to do?";

#[derive(Debug, Clone, PartialEq, Eq)]
enum MenuItem {
    Edit,
    Nav(NavAction),
    MeansTest,
    Summary,
    PreviewForm,
    GenerateForm,
    MarkDownloaded(i64),
    MarkFiled(i64),
    StartOver,
    Exit,
}

impl MenuItem {
    fn label(&self, view: &ShellView) -> String {
        match self {
            MenuItem::Edit => format!("Edit {}", view.step_label),
            MenuItem::Nav(action) => view
                .action(*action)
                .map(|button| button.label.to_string())
                .unwrap_or_default(),
            MenuItem::MeansTest => "Calculate means test".into(),
            MenuItem::Summary => "View session summary".into(),
            MenuItem::PreviewForm => "Preview Form 101".into(),
            MenuItem::GenerateForm => "Generate Form 101".into(),
            MenuItem::MarkDownloaded(_) => "Mark Form 101 as downloaded".into(),
            MenuItem::MarkFiled(_) => "Mark Form 101 as filed".into(),
            MenuItem::StartOver => "Start a new intake".into(),
            MenuItem::Exit => "Save and exit".into(),
        }
    }
}

/// Terminal frontend of the wizard: draws each frame and routes the chosen
/// action to the state machine.
pub struct WizardApp<A, S, P> {
    machine: WizardMachine<A, S>,
    prompter: P,
    show_validation: bool,
    clear_screen: bool,
}

impl<A: IntakeApi, S: ClientStore, P: Prompter> WizardApp<A, S, P> {
    pub fn new(machine: WizardMachine<A, S>, prompter: P) -> Self {
        Self {
            machine,
            prompter,
            show_validation: false,
            clear_screen: false,
        }
    }

    /// Redraw from the top of the screen between frames.
    pub fn with_screen_clearing(mut self, enabled: bool) -> Self {
        self.clear_screen = enabled && stdout().is_terminal();
        self
    }

    pub fn machine(&self) -> &WizardMachine<A, S> {
        &self.machine
    }

    pub fn run(&mut self) -> Result<(), CliError> {
        if let Err(err) = self.machine.initialize() {
            output::error(err.user_message());
            return Err(err.into());
        }

        loop {
            let view = self.machine.view();
            self.draw(&view);

            let menu = self.menu(&view);
            let labels: Vec<String> = menu.iter().map(|item| item.label(&view)).collect();
            let default = menu
                .iter()
                .position(|item| matches!(item, MenuItem::Nav(NavAction::Continue | NavAction::Complete)))
                .unwrap_or(0);
            let Some(choice) = self.prompter.select(MENU_PROMPT, &labels, default)? else {
                continue;
            };

            debug!(choice = %labels[choice], "menu selection");
            match &menu[choice] {
                MenuItem::Edit => self.edit_current_step()?,
                MenuItem::Nav(NavAction::Continue) => self.go_next(),
                MenuItem::Nav(NavAction::Previous) => self.go_back(),
                MenuItem::Nav(NavAction::Complete) => self.complete(),
                MenuItem::MeansTest => report(self.machine.calculate_means_test().map(|_| ())),
                MenuItem::Summary => report(self.machine.load_summary().map(|_| ())),
                MenuItem::PreviewForm => match self.machine.preview_form_101() {
                    Ok(preview) => {
                        output::section("Form 101 preview");
                        output::line(
                            serde_json::to_string_pretty(&preview)
                                .unwrap_or_else(|_| preview.to_string()),
                        );
                    }
                    Err(err) => report(Err(err)),
                },
                MenuItem::GenerateForm => match self.machine.generate_form_101() {
                    Ok(form) => output::success(format!("Form 101 generated (#{}).", form.id)),
                    Err(err) => report(Err(err)),
                },
                MenuItem::MarkDownloaded(id) => report(self.machine.mark_form_downloaded(*id)),
                MenuItem::MarkFiled(id) => report(self.machine.mark_form_filed(*id)),
                MenuItem::StartOver => {
                    if self.prompter.confirm(
                        "Start a new intake? Your current answers stay on the server but this device will forget them.",
                        false,
                    )? {
                        self.show_validation = false;
                        report(self.machine.start_over());
                    }
                }
                MenuItem::Exit => {
                    output::info(
                        "Your progress is saved. Run the wizard again to continue where you left off.",
                    );
                    return Ok(());
                }
            }
        }
    }

    fn draw(&self, view: &ShellView) {
        if self.clear_screen {
            let _ = execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0));
        }
        let state = self.machine.snapshot();
        let prefs = current_preferences();
        for line in render::frame_lines(view, &state, self.show_validation, &prefs) {
            output::line(line);
        }
    }

    fn menu(&self, view: &ShellView) -> Vec<MenuItem> {
        let mut menu = Vec::new();
        if !view.completed && view.step_kind != StepKind::Review {
            menu.push(MenuItem::Edit);
        }
        if !view.completed {
            for button in &view.actions {
                if button.action != NavAction::Previous {
                    menu.push(MenuItem::Nav(button.action));
                }
            }
        }
        if view.action(NavAction::Previous).is_some() {
            menu.push(MenuItem::Nav(NavAction::Previous));
        }
        if view.step_kind == StepKind::Review {
            menu.extend([MenuItem::MeansTest, MenuItem::Summary, MenuItem::PreviewForm]);
            if view.completed {
                menu.push(MenuItem::GenerateForm);
                if let Some(form) = self.machine.snapshot().generated_form {
                    menu.push(MenuItem::MarkDownloaded(form.id));
                    menu.push(MenuItem::MarkFiled(form.id));
                }
            }
        }
        menu.push(MenuItem::StartOver);
        menu.push(MenuItem::Exit);
        menu
    }

    fn go_next(&mut self) {
        match self.machine.advance() {
            Ok(step) => {
                self.show_validation = false;
                debug!(step, "moved forward");
            }
            Err(WizardError::Validation(_)) => {
                self.show_validation = true;
            }
            // Request failures show up in the error banner.
            Err(WizardError::Api { .. }) => {}
            Err(other) => output::warning(other.user_message()),
        }
    }

    fn go_back(&mut self) {
        self.machine.retreat();
        self.show_validation = false;
    }

    fn complete(&mut self) {
        match self.machine.complete() {
            Ok(_) => {
                self.show_validation = false;
                output::success("Your intake is complete.");
            }
            Err(WizardError::Validation(_)) => self.show_validation = true,
            Err(WizardError::Api { .. }) => {}
            Err(other) => output::warning(other.user_message()),
        }
    }

    fn edit_current_step(&mut self) -> Result<(), CliError> {
        let kind = self
            .machine
            .current_descriptor()
            .map(|step| step.kind)
            .unwrap_or(StepKind::Review);
        match kind {
            StepKind::DebtorInfo => self.edit_form(
                "",
                |drafts| Some(drafts.debtor.clone()),
                |drafts, key, raw| Some(drafts.debtor.write(key, raw)),
            ),
            StepKind::IncomeInfo => self.edit_form(
                "",
                |drafts| Some(drafts.income.clone()),
                |drafts, key, raw| Some(drafts.income.write(key, raw)),
            ),
            StepKind::ExpenseInfo => self.edit_form(
                "",
                |drafts| Some(drafts.expense.clone()),
                |drafts, key, raw| Some(drafts.expense.write(key, raw)),
            ),
            StepKind::Assets => self.edit_assets(),
            StepKind::Debts => self.edit_debts(),
            StepKind::Review => Ok(()),
        }
    }

    fn edit_assets(&mut self) -> Result<(), CliError> {
        loop {
            let drafts = self.machine.snapshot().drafts;
            let items: Vec<String> = drafts
                .assets
                .items()
                .iter()
                .map(|asset| describe(&asset.description, asset.asset_type.map(|t| t.label())))
                .collect();
            match self.list_menu("asset", &items)? {
                ListChoice::Add => {
                    let index = self.machine.edit_assets(|assets| {
                        assets.push(Default::default());
                        assets.len() - 1
                    })?;
                    self.edit_asset(index)?;
                }
                ListChoice::Edit(index) => self.edit_asset(index)?,
                ListChoice::Remove(index) => {
                    self.machine.edit_assets(|assets| assets.remove(index))?;
                }
                ListChoice::Done => return Ok(()),
            }
        }
    }

    fn edit_asset(&mut self, index: usize) -> Result<(), CliError> {
        self.edit_form(
            &format!("assets[{index}]."),
            |drafts| drafts.assets.items().get(index).cloned(),
            |drafts, key, raw| drafts.assets.get_mut(index).map(|asset| asset.write(key, raw)),
        )
    }

    fn edit_debts(&mut self) -> Result<(), CliError> {
        loop {
            let drafts = self.machine.snapshot().drafts;
            let items: Vec<String> = drafts
                .debts
                .items()
                .iter()
                .map(|debt| describe(&debt.creditor_name, debt.debt_type.map(|t| t.label())))
                .collect();
            match self.list_menu("amount owed", &items)? {
                ListChoice::Add => {
                    let index = self.machine.edit_debts(|debts| {
                        debts.push(Default::default());
                        debts.len() - 1
                    })?;
                    self.edit_debt(index)?;
                }
                ListChoice::Edit(index) => self.edit_debt(index)?,
                ListChoice::Remove(index) => {
                    self.machine.edit_debts(|debts| debts.remove(index))?;
                }
                ListChoice::Done => return Ok(()),
            }
        }
    }

    fn edit_debt(&mut self, index: usize) -> Result<(), CliError> {
        self.edit_form(
            &format!("debts[{index}]."),
            |drafts| drafts.debts.items().get(index).cloned(),
            |drafts, key, raw| drafts.debts.get_mut(index).map(|debt| debt.write(key, raw)),
        )
    }

    fn list_menu(&mut self, noun: &str, items: &[String]) -> Result<ListChoice, CliError> {
        let mut choices = vec![ListChoice::Add];
        let mut labels = vec![format!("Add {noun}")];
        for (index, item) in items.iter().enumerate() {
            choices.push(ListChoice::Edit(index));
            labels.push(format!("Edit {noun} {}: {item}", index + 1));
        }
        for (index, item) in items.iter().enumerate() {
            choices.push(ListChoice::Remove(index));
            labels.push(format!("Remove {noun} {}: {item}", index + 1));
        }
        choices.push(ListChoice::Done);
        labels.push("Done".into());

        let selected = self.prompter.select("Choose an entry", &labels, 0)?;
        Ok(selected
            .and_then(|index| choices.get(index).copied())
            .unwrap_or(ListChoice::Done))
    }

    /// Walks every field of one form. The field list is re-read after each
    /// answer because some answers (filing type, secured) add fields.
    fn edit_form<M, R, W>(&mut self, prefix: &str, read: R, write: W) -> Result<(), CliError>
    where
        M: FormModel,
        R: Fn(&StepDrafts) -> Option<M>,
        W: Fn(&mut StepDrafts, &str, &str) -> Option<Result<(), String>>,
    {
        let mut position = 0;
        loop {
            let Some(model) = read(&self.machine.snapshot().drafts) else {
                return Ok(());
            };
            let fields = model.fields();
            let Some(field) = fields.get(position) else {
                return Ok(());
            };
            let current = model.read(field.key);

            let answer = self.ask(field, &current)?;
            let value = match answer {
                TextAnswer::Back => return Ok(()),
                TextAnswer::Keep => None,
                TextAnswer::Value(value) => Some(value),
            };
            if let Some(value) = value {
                let key = field.key;
                match self.machine.edit(|drafts| write(drafts, key, &value))? {
                    Some(Err(message)) => {
                        output::field_error(message);
                        continue;
                    }
                    Some(Ok(())) | None => {}
                }
            }
            self.show_field_feedback(prefix, field);
            position += 1;
        }
    }

    fn ask(&mut self, field: &FieldSpec, current: &str) -> Result<TextAnswer, CliError> {
        match &field.kind {
            FieldKind::Choice(options) => {
                let labels: Vec<String> = options
                    .iter()
                    .map(|(code, label)| format!("{label} ({code})"))
                    .collect();
                let default = options
                    .iter()
                    .position(|(code, _)| *code == current)
                    .unwrap_or(0);
                Ok(match self.prompter.select(&field.prompt(), &labels, default)? {
                    Some(index) => TextAnswer::Value(options[index].0.to_string()),
                    None => TextAnswer::Keep,
                })
            }
            FieldKind::Toggle => {
                let answer = self.prompter.confirm(&field.prompt(), current == "yes")?;
                let value = if answer { "yes" } else { "no" };
                Ok(TextAnswer::Value(value.to_string()))
            }
            FieldKind::Text | FieldKind::Count | FieldKind::Amount => {
                self.prompter.text(&field.prompt(), current)
            }
        }
    }

    /// Re-validates after each answer and shows the message for that field.
    fn show_field_feedback(&self, prefix: &str, field: &FieldSpec) {
        let report: ValidationReport = self.machine.validation();
        if let Some(message) = report.get(&format!("{prefix}{}", field.key)) {
            output::field_error(format!("{}: {message}", field.label));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListChoice {
    Add,
    Edit(usize),
    Remove(usize),
    Done,
}

fn describe(text: &str, kind: Option<&str>) -> String {
    match (text.trim().is_empty(), kind) {
        (false, Some(kind)) => format!("{text} ({kind})"),
        (false, None) => text.to_string(),
        (true, Some(kind)) => kind.to_string(),
        (true, None) => "(incomplete)".to_string(),
    }
}

/// Operation failures are already recorded for the banner; anything else is
/// printed as a warning.
fn report(result: Result<(), WizardError>) {
    match result {
        Ok(()) | Err(WizardError::Api { .. }) => {}
        Err(other) => output::warning(other.user_message()),
    }
}
