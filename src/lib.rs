#![doc(test(attr(deny(warnings))))]

//! Client for a guided bankruptcy intake: per-step validators, a wizard
//! state machine that persists each step to the intake REST API, and a
//! terminal frontend that renders the navigation shell.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod time;
pub mod utils;
pub mod validation;
pub mod wizard;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Intake wizard tracing initialized.");
    });
}
