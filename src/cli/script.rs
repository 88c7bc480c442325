//! Scripted answers for non-interactive runs.
//!
//! When `INTAKE_WIZARD_INPUTS` is set, every prompt is answered from its
//! `|`-separated tokens instead of the terminal. Menu tokens match an item
//! label (case-insensitive, prefix allowed) or its 1-based position.

use std::collections::VecDeque;
use std::env;

pub const INPUTS_ENV: &str = "INTAKE_WIZARD_INPUTS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptToken {
    Value(String),
    /// Leave the current value unchanged.
    Keep,
    /// Leave the current form or menu.
    Back,
}

#[derive(Debug, Default)]
pub struct Script {
    tokens: VecDeque<ScriptToken>,
}

impl Script {
    /// Reads the script from the environment, if one is configured.
    pub fn from_env() -> Option<Self> {
        env::var(INPUTS_ENV).ok().map(|raw| Self::parse(&raw))
    }

    pub fn parse(raw: &str) -> Self {
        let tokens = raw
            .split('|')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(parse_token)
            .collect();
        Self { tokens }
    }

    pub fn next(&mut self) -> Option<ScriptToken> {
        self.tokens.pop_front()
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len()
    }
}

fn parse_token(token: &str) -> ScriptToken {
    match token.to_ascii_uppercase().as_str() {
        "<KEEP>" => ScriptToken::Keep,
        "<BACK>" | "<ESC>" => ScriptToken::Back,
        "<BLANK>" | "<EMPTY>" => ScriptToken::Value(String::new()),
        _ => ScriptToken::Value(token.to_string()),
    }
}

/// Resolves a menu token against `items`: 1-based index, exact label, then
/// unique label prefix.
pub fn resolve_choice(token: &str, items: &[String]) -> Option<usize> {
    let needle = token.trim();
    if let Ok(position) = needle.parse::<usize>() {
        return (1..=items.len()).contains(&position).then(|| position - 1);
    }
    let lowered = needle.to_lowercase();
    if let Some(index) = items
        .iter()
        .position(|item| item.to_lowercase() == lowered)
    {
        return Some(index);
    }
    let mut prefixed = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.to_lowercase().starts_with(&lowered));
    match (prefixed.next(), prefixed.next()) {
        (Some((index, _)), None) => Some(index),
        _ => None,
    }
}
