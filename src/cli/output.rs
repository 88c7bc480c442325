use colored::Colorize;
use std::fmt;
use std::sync::{OnceLock, RwLock};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    /// An inline validation message attached to a field.
    FieldError,
    Section,
    Separator,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputPreferences {
    /// Plain prefixed text, no colour or glyphs.
    pub screen_reader_mode: bool,
    /// Bold instead of colour for anything that needs attention.
    pub high_contrast_mode: bool,
}

static PREFERENCES: OnceLock<RwLock<OutputPreferences>> = OnceLock::new();

pub fn set_preferences(prefs: OutputPreferences) {
    let lock = PREFERENCES.get_or_init(|| RwLock::new(OutputPreferences::default()));
    if let Ok(mut guard) = lock.write() {
        *guard = prefs;
    }
}

pub fn current_preferences() -> OutputPreferences {
    PREFERENCES
        .get_or_init(|| RwLock::new(OutputPreferences::default()))
        .read()
        .map(|guard| *guard)
        .unwrap_or_default()
}

fn build_label(kind: MessageKind, prefs: &OutputPreferences) -> &'static str {
    match (kind, prefs.screen_reader_mode) {
        (MessageKind::Info, true) => "Note:",
        (MessageKind::Success, true) => "Done:",
        (MessageKind::Warning, true) => "Warning:",
        (MessageKind::Error, true) => "Error:",
        (MessageKind::FieldError, true) => "Needs attention:",
        (MessageKind::Info, false) => "[i]",
        (MessageKind::Success, false) => "[ok]",
        (MessageKind::Warning, false) => "[!]",
        (MessageKind::Error, false) => "[x]",
        (MessageKind::FieldError, false) => "  ->",
        (MessageKind::Section | MessageKind::Separator, _) => "",
    }
}

/// Formats `message` for `kind` under `prefs`, without printing it.
pub fn format_message(
    kind: MessageKind,
    message: impl fmt::Display,
    prefs: &OutputPreferences,
) -> String {
    let text = message.to_string();

    let formatted = match kind {
        MessageKind::Section if prefs.screen_reader_mode => text.trim().to_string(),
        MessageKind::Section => format!("=== {} ===", text.trim()),
        MessageKind::Separator if prefs.screen_reader_mode => String::new(),
        MessageKind::Separator => String::from("----------------------------------------"),
        _ => format!("{} {text}", build_label(kind, prefs)),
    };

    if prefs.screen_reader_mode {
        return formatted;
    }

    if prefs.high_contrast_mode {
        return match kind {
            MessageKind::Success
            | MessageKind::Warning
            | MessageKind::Error
            | MessageKind::FieldError
            | MessageKind::Section => formatted.bold().to_string(),
            MessageKind::Info | MessageKind::Separator => formatted,
        };
    }

    match kind {
        MessageKind::Success => formatted.bright_green().to_string(),
        MessageKind::Warning => formatted.bright_yellow().to_string(),
        MessageKind::Error => formatted.bright_red().to_string(),
        MessageKind::FieldError => formatted.red().to_string(),
        MessageKind::Section => formatted.bold().to_string(),
        MessageKind::Info | MessageKind::Separator => formatted,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let prefs = current_preferences();
    let formatted = format_message(kind, message, &prefs);
    match kind {
        MessageKind::Section | MessageKind::Separator => println!("\n{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn field_error(message: impl fmt::Display) {
    print(MessageKind::FieldError, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

pub fn separator() {
    print(MessageKind::Separator, "");
}

/// Prints a line verbatim.
pub fn line(text: impl fmt::Display) {
    println!("{}", text);
}
