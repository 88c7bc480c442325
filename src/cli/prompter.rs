use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::errors::CliError;

use super::output;
use super::script::{resolve_choice, Script, ScriptToken};

/// Typing this at a text prompt leaves the current form.
pub const BACK_COMMAND: &str = ":back";
/// Typing this at a text prompt empties the field.
pub const CLEAR_COMMAND: &str = ":clear";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextAnswer {
    Value(String),
    Keep,
    Back,
}

/// Source of answers for the wizard frontend.
pub trait Prompter {
    /// `None` when the user backs out of the menu.
    fn select(&mut self, prompt: &str, items: &[String], default: usize)
        -> Result<Option<usize>, CliError>;
    fn text(&mut self, prompt: &str, current: &str) -> Result<TextAnswer, CliError>;
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, CliError>;
}

/// Interactive prompts on the controlling terminal.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn select(
        &mut self,
        prompt: &str,
        items: &[String],
        default: usize,
    ) -> Result<Option<usize>, CliError> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default.min(items.len().saturating_sub(1)))
            .interact_opt()?)
    }

    fn text(&mut self, prompt: &str, current: &str) -> Result<TextAnswer, CliError> {
        let raw: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()?;
        Ok(interpret_text(&raw, current))
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, CliError> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }
}

fn interpret_text(raw: &str, current: &str) -> TextAnswer {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case(BACK_COMMAND) {
        TextAnswer::Back
    } else if trimmed.eq_ignore_ascii_case(CLEAR_COMMAND) {
        TextAnswer::Value(String::new())
    } else if trimmed == current.trim() {
        TextAnswer::Keep
    } else {
        TextAnswer::Value(trimmed.to_string())
    }
}

/// Answers prompts from a [`Script`], echoing each exchange to stdout.
pub struct ScriptedPrompter {
    script: Script,
}

impl ScriptedPrompter {
    pub fn new(script: Script) -> Self {
        Self { script }
    }

    fn next(&mut self, prompt: &str) -> Result<ScriptToken, CliError> {
        self.script
            .next()
            .ok_or_else(|| CliError::Input(format!("scripted input exhausted at `{prompt}`")))
    }
}

impl Prompter for ScriptedPrompter {
    fn select(
        &mut self,
        prompt: &str,
        items: &[String],
        _default: usize,
    ) -> Result<Option<usize>, CliError> {
        match self.next(prompt)? {
            ScriptToken::Back | ScriptToken::Keep => {
                output::line(format!("{prompt}: <back>"));
                Ok(None)
            }
            ScriptToken::Value(token) => {
                let index = resolve_choice(&token, items).ok_or_else(|| {
                    CliError::Input(format!(
                        "`{token}` matches none of the choices for `{prompt}`: {}",
                        items.join(", ")
                    ))
                })?;
                output::line(format!("{prompt}: {}", items[index]));
                Ok(Some(index))
            }
        }
    }

    fn text(&mut self, prompt: &str, current: &str) -> Result<TextAnswer, CliError> {
        let answer = match self.next(prompt)? {
            ScriptToken::Keep => TextAnswer::Keep,
            ScriptToken::Back => TextAnswer::Back,
            ScriptToken::Value(value) => interpret_text(&value, current),
        };
        output::line(format!("{prompt}: {answer:?}"));
        Ok(answer)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, CliError> {
        let answer = match self.next(prompt)? {
            ScriptToken::Keep | ScriptToken::Back => default,
            ScriptToken::Value(value) => {
                matches!(value.to_ascii_lowercase().as_str(), "y" | "yes" | "true")
            }
        };
        output::line(format!("{prompt}: {}", if answer { "yes" } else { "no" }));
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_commands_are_recognised() {
        assert_eq!(interpret_text(":back", "x"), TextAnswer::Back);
        assert_eq!(interpret_text(" :CLEAR ", "x"), TextAnswer::Value(String::new()));
        assert_eq!(interpret_text("Lopez ", "Lopez"), TextAnswer::Keep);
        assert_eq!(interpret_text("Ruiz", "Lopez"), TextAnswer::Value("Ruiz".into()));
    }

    #[test]
    fn scripted_prompter_consumes_tokens_in_order() {
        let mut prompter = ScriptedPrompter::new(Script::parse("Continue|Ana|no"));
        let items = vec!["Edit answers".to_string(), "Continue".to_string()];
        assert_eq!(prompter.select("Next", &items, 0).unwrap(), Some(1));
        assert_eq!(
            prompter.text("First name", "").unwrap(),
            TextAnswer::Value("Ana".into())
        );
        assert!(!prompter.confirm("Sure?", true).unwrap());
        assert!(prompter.text("Last name", "").is_err());
    }
}
