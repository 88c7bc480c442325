mod common;

use std::sync::Arc;
use std::thread;

use common::{fill_required_steps, wizard, FakeBackend};
use intake_wizard::{
    domain::{AssetType, FormStatus, SessionStatus},
    errors::{Operation, WizardError},
    storage::{ClientStore, MemoryClientStore},
    validation::AssetDraft,
    wizard::{NavAction, Phase},
};

#[test]
fn initialize_creates_a_session_and_remembers_it() {
    let backend = FakeBackend::new();
    let store = Arc::new(MemoryClientStore::new());
    let wizard = wizard(&backend, &store);

    wizard.initialize().unwrap();

    let state = wizard.snapshot();
    assert_eq!(state.phase, Phase::Ready);
    assert_eq!(state.current_step, 1);
    let id = state.session_id().unwrap();
    assert_eq!(store.session_id().unwrap(), Some(id));
    assert_eq!(backend.calls(), vec!["create_session"]);

    // Already ready: nothing else is sent.
    wizard.initialize().unwrap();
    assert_eq!(backend.call_count(), 1);
}

#[test]
fn stale_stored_session_is_replaced() {
    let backend = FakeBackend::new();
    let store = Arc::new(MemoryClientStore::with_session(999));
    let wizard = wizard(&backend, &store);

    wizard.initialize().unwrap();

    let id = wizard.snapshot().session_id().unwrap();
    assert_ne!(id, 999);
    assert_eq!(store.session_id().unwrap(), Some(id));
    assert_eq!(wizard.current_step(), 1);
    assert_eq!(backend.calls(), vec!["get_session", "create_session"]);
}

#[test]
fn failed_start_reports_a_friendly_message() {
    let backend = FakeBackend::new();
    backend.fail("create_session");
    let store = Arc::new(MemoryClientStore::new());
    let wizard = wizard(&backend, &store);

    let err = wizard.initialize().unwrap_err();
    assert!(matches!(
        err,
        WizardError::Api {
            operation: Operation::StartSession,
            ..
        }
    ));
    let state = wizard.snapshot();
    assert_eq!(state.phase, Phase::Uninitialized);
    assert!(!state.busy);
    assert_eq!(
        state.last_error.as_deref(),
        Some("Unable to start your intake session. Please try again.")
    );
    assert_eq!(store.session_id().unwrap(), None);
}

#[test]
fn invalid_step_blocks_advance_without_network() {
    let backend = FakeBackend::new();
    let store = Arc::new(MemoryClientStore::new());
    let wizard = wizard(&backend, &store);
    wizard.initialize().unwrap();
    fill_required_steps(&wizard);
    wizard.edit_debtor(|debtor| debtor.last_name.clear()).unwrap();
    let sent = backend.call_count();

    let err = wizard.advance().unwrap_err();

    match err {
        WizardError::Validation(report) => {
            assert_eq!(report.get("last_name"), Some("Please enter your last name"));
            assert_eq!(report.len(), 1);
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert_eq!(backend.call_count(), sent);
    assert_eq!(wizard.current_step(), 1);
    assert!(!wizard.can_go_next());
    assert!(!wizard.view().is_enabled(NavAction::Continue));
}

#[test]
fn advance_saves_the_step_then_moves_forward() {
    let backend = FakeBackend::new();
    let store = Arc::new(MemoryClientStore::new());
    let wizard = wizard(&backend, &store);
    wizard.initialize().unwrap();
    fill_required_steps(&wizard);

    assert_eq!(wizard.advance().unwrap(), 2);

    assert_eq!(
        backend.calls(),
        vec![
            "create_session",
            "get_session",
            "create_record /intake/debtor-info/",
            "update_step",
        ]
    );
    let state = wizard.snapshot();
    let session = backend.session(state.session_id().unwrap()).unwrap();
    assert_eq!(session.current_step, 2);
    let stored = session.debtor_info.unwrap();
    assert_eq!(stored.last_name, "Lopez");
    assert_eq!(state.drafts.debtor.record_id, stored.id);
    assert_eq!(state.session.unwrap().current_step, 2);
}

#[test]
fn saving_a_step_again_updates_the_existing_record() {
    let backend = FakeBackend::new();
    let store = Arc::new(MemoryClientStore::new());
    let wizard = wizard(&backend, &store);
    wizard.initialize().unwrap();
    fill_required_steps(&wizard);

    wizard.advance().unwrap();
    assert_eq!(wizard.retreat(), 1);
    wizard.edit_debtor(|debtor| debtor.city = "Evanston".into()).unwrap();
    wizard.advance().unwrap();

    assert_eq!(backend.count("create_record /intake/debtor-info/"), 1);
    assert_eq!(backend.count("update_record /intake/debtor-info/"), 1);
    let id = wizard.snapshot().session_id().unwrap();
    assert_eq!(backend.session(id).unwrap().debtor_info.unwrap().city, "Evanston");
}

#[test]
fn lookup_failure_never_creates_a_duplicate() {
    let backend = FakeBackend::new();
    let store = Arc::new(MemoryClientStore::new());
    let wizard = wizard(&backend, &store);
    wizard.initialize().unwrap();
    fill_required_steps(&wizard);
    backend.fail("get_session");

    assert!(wizard.advance().is_err());
    assert_eq!(backend.count("create_record"), 0);
    assert_eq!(backend.count("update_step"), 0);
    assert_eq!(wizard.current_step(), 1);
}

#[test]
fn failed_save_keeps_the_step_and_shows_an_error() {
    let backend = FakeBackend::new();
    let store = Arc::new(MemoryClientStore::new());
    let wizard = wizard(&backend, &store);
    wizard.initialize().unwrap();
    fill_required_steps(&wizard);
    backend.fail("update_step");

    let err = wizard.advance().unwrap_err();

    assert_eq!(err.user_message(), "Unable to save your progress. Please try again.");
    let view = wizard.view();
    assert_eq!(view.step_number, 1);
    assert!(!view.busy);
    assert_eq!(
        view.error.as_deref(),
        Some("Unable to save your progress. Please try again.")
    );
    assert!(view.is_enabled(NavAction::Continue));

    // Retrying after the backend recovers clears the banner.
    backend.recover("update_step");
    assert_eq!(wizard.advance().unwrap(), 2);
    assert_eq!(wizard.snapshot().last_error, None);
}

#[test]
fn retreat_never_touches_the_network() {
    let backend = FakeBackend::new();
    let store = Arc::new(MemoryClientStore::new());
    let wizard = wizard(&backend, &store);
    wizard.initialize().unwrap();
    fill_required_steps(&wizard);
    wizard.advance().unwrap();
    wizard.advance().unwrap();
    let sent = backend.call_count();

    assert_eq!(wizard.retreat(), 2);
    assert_eq!(wizard.retreat(), 1);
    assert_eq!(wizard.retreat(), 1);
    assert_eq!(backend.call_count(), sent);
}

#[test]
fn reload_resumes_on_the_saved_step_with_data() {
    let backend = FakeBackend::new();
    let store = Arc::new(MemoryClientStore::new());
    let first = wizard(&backend, &store);
    first.initialize().unwrap();
    fill_required_steps(&first);
    first.advance().unwrap();
    first.advance().unwrap();
    let id = first.snapshot().session_id().unwrap();
    drop(first);

    let second = wizard(&backend, &store);
    second.initialize().unwrap();

    let state = second.snapshot();
    assert_eq!(state.session_id(), Some(id));
    assert_eq!(state.current_step, 3);
    assert_eq!(state.drafts.debtor.last_name, "Lopez");
    assert!(state.drafts.debtor.record_id.is_some());
    assert_eq!(state.drafts.income.monthly_gross_wages, 3100.0);
    assert_eq!(state.drafts.income.total(), 3100.0);
    assert!(state.drafts.income.record_id.is_some());
    assert_eq!(backend.count("create_session"), 1);
    assert_eq!(second.view().announcement, "Step 3 of 6: Expenses");

    // Going back to the income step shows the saved answers.
    assert_eq!(second.retreat(), 2);
    assert!(second.can_go_next());
}

#[test]
fn out_of_range_saved_step_is_clamped() {
    let backend = FakeBackend::new();
    let id = backend.seed_session(42);
    let store = Arc::new(MemoryClientStore::with_session(id));
    let wizard = wizard(&backend, &store);

    wizard.initialize().unwrap();
    assert_eq!(wizard.current_step(), 6);
}

#[test]
fn second_advance_while_saving_is_rejected() {
    let backend = FakeBackend::new();
    let store = Arc::new(MemoryClientStore::new());
    let wizard = Arc::new(wizard(&backend, &store));
    wizard.initialize().unwrap();
    fill_required_steps(&wizard);
    let (entered, release) = backend.hold_next_update_step();

    let worker = {
        let wizard = wizard.clone();
        thread::spawn(move || wizard.advance())
    };
    entered.recv().unwrap();

    assert!(wizard.is_busy());
    assert!(matches!(wizard.advance(), Err(WizardError::Busy)));
    assert!(matches!(
        wizard.edit_debtor(|debtor| debtor.city.clear()),
        Err(WizardError::Busy)
    ));
    let view = wizard.view();
    let forward = view.action(NavAction::Continue).unwrap();
    assert_eq!(forward.label, "Saving...");
    assert!(!forward.enabled);

    release.send(()).unwrap();
    assert_eq!(worker.join().unwrap().unwrap(), 2);
    assert_eq!(backend.count("update_step"), 1);
    assert!(!wizard.is_busy());
}

#[test]
fn going_back_during_a_save_discards_its_navigation() {
    let backend = FakeBackend::new();
    let store = Arc::new(MemoryClientStore::new());
    let wizard = Arc::new(wizard(&backend, &store));
    wizard.initialize().unwrap();
    fill_required_steps(&wizard);
    wizard.advance().unwrap();
    let (entered, release) = backend.hold_next_update_step();

    let worker = {
        let wizard = wizard.clone();
        thread::spawn(move || wizard.advance())
    };
    entered.recv().unwrap();
    let view = wizard.view();
    assert!(view.busy);
    assert!(!view.is_enabled(NavAction::Previous));
    // Only the shell's button is disabled; the machine itself still goes back.
    assert_eq!(wizard.retreat(), 1);
    release.send(()).unwrap();

    assert!(matches!(worker.join().unwrap(), Err(WizardError::Stale)));
    let state = wizard.snapshot();
    assert_eq!(state.current_step, 1);
    assert!(!state.busy);
    // The income record was stored, so its id is kept for the next save.
    assert!(state.drafts.income.record_id.is_some());
}

#[test]
fn lists_sync_creates_updates_and_deletes() {
    let backend = FakeBackend::new();
    let store = Arc::new(MemoryClientStore::new());
    let wizard = wizard(&backend, &store);
    wizard.initialize().unwrap();
    fill_required_steps(&wizard);
    for _ in 0..3 {
        wizard.advance().unwrap();
    }
    assert_eq!(wizard.current_step(), 4);

    wizard
        .edit_assets(|assets| {
            assets.push(AssetDraft {
                asset_type: Some(AssetType::Vehicle),
                description: "2016 Honda Civic".into(),
                current_value: 9000.0,
                amount_owed: 4000.0,
                ..Default::default()
            });
            assets.push(AssetDraft {
                asset_type: Some(AssetType::BankAccount),
                description: "Checking".into(),
                current_value: 650.0,
                ..Default::default()
            });
        })
        .unwrap();
    wizard.advance().unwrap();
    let id = wizard.snapshot().session_id().unwrap();
    assert_eq!(backend.session(id).unwrap().assets.len(), 2);

    wizard.retreat();
    wizard.edit_assets(|assets| assets.remove(1)).unwrap();
    wizard.advance().unwrap();

    let assets = backend.session(id).unwrap().assets;
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].description, "2016 Honda Civic");
    assert_eq!(backend.count("create_record /intake/assets/"), 2);
    assert_eq!(backend.count("update_record /intake/assets/"), 1);
    assert_eq!(backend.count("delete_record /intake/assets/"), 1);
    assert!(wizard.snapshot().drafts.assets.removed().is_empty());
}

#[test]
fn retry_after_failed_step_update_does_not_duplicate_list_items() {
    let backend = FakeBackend::new();
    let store = Arc::new(MemoryClientStore::new());
    let wizard = wizard(&backend, &store);
    wizard.initialize().unwrap();
    fill_required_steps(&wizard);
    for _ in 0..3 {
        wizard.advance().unwrap();
    }
    wizard
        .edit_assets(|assets| {
            assets.push(AssetDraft {
                asset_type: Some(AssetType::Vehicle),
                description: "2016 Honda Civic".into(),
                current_value: 9000.0,
                ..Default::default()
            })
        })
        .unwrap();
    backend.fail("update_step");

    assert!(wizard.advance().is_err());
    assert_eq!(wizard.current_step(), 4);
    assert!(wizard.snapshot().drafts.assets.items()[0].record_id.is_some());

    backend.recover("update_step");
    assert_eq!(wizard.advance().unwrap(), 5);

    let id = wizard.snapshot().session_id().unwrap();
    assert_eq!(backend.session(id).unwrap().assets.len(), 1);
    assert_eq!(backend.count("create_record /intake/assets/"), 1);
    assert_eq!(backend.count("update_record /intake/assets/"), 1);
}

#[test]
fn complete_finishes_the_intake() {
    let backend = FakeBackend::new();
    let store = Arc::new(MemoryClientStore::new());
    let wizard = wizard(&backend, &store);
    wizard.initialize().unwrap();
    fill_required_steps(&wizard);
    for _ in 0..5 {
        wizard.advance().unwrap();
    }
    let view = wizard.view();
    assert!(view.is_last_step);
    assert_eq!(view.action(NavAction::Complete).unwrap().label, "Complete Intake");
    assert!(matches!(wizard.advance(), Err(WizardError::AtLastStep)));

    let session = wizard.complete().unwrap();

    assert_eq!(session.status, SessionStatus::Completed);
    assert!(session.completed_at.is_some());
    assert!(wizard.view().completed);
    assert!(!wizard.view().is_enabled(NavAction::Complete));
    assert!(matches!(wizard.complete(), Err(WizardError::AlreadyCompleted)));
}

#[test]
fn complete_requires_the_last_step_and_the_core_sections() {
    let backend = FakeBackend::new();
    let store = Arc::new(MemoryClientStore::new());
    let early = wizard(&backend, &store);
    early.initialize().unwrap();
    assert!(matches!(early.complete(), Err(WizardError::NotOnLastStep)));

    let id = backend.seed_session(6);
    let store = Arc::new(MemoryClientStore::with_session(id));
    let late = wizard(&backend, &store);
    late.initialize().unwrap();
    let sent = backend.call_count();

    match late.complete() {
        Err(WizardError::IncompleteSteps(labels)) => {
            assert_eq!(labels, vec!["Your Information", "Income", "Expenses"]);
        }
        other => panic!("expected incomplete steps, got {other:?}"),
    }
    assert_eq!(backend.call_count(), sent);
}

#[test]
fn review_actions_store_their_results() {
    let backend = FakeBackend::new();
    let store = Arc::new(MemoryClientStore::new());
    let wizard = wizard(&backend, &store);
    wizard.initialize().unwrap();
    fill_required_steps(&wizard);
    for _ in 0..5 {
        wizard.advance().unwrap();
    }

    let result = wizard.calculate_means_test().unwrap();
    assert!(result.passes_means_test);
    assert_eq!(result.current_monthly_income, 3100.0);

    let summary = wizard.load_summary().unwrap();
    assert_eq!(summary.progress.completion_percentage, 100);

    wizard.complete().unwrap();
    let form = wizard.generate_form_101().unwrap();
    wizard.mark_form_downloaded(form.id).unwrap();

    let state = wizard.snapshot();
    assert!(state.means_test.is_some());
    assert!(state.summary.is_some());
    assert_eq!(state.generated_form.unwrap().status, FormStatus::Downloaded);
}

#[test]
fn failed_means_test_sets_and_clears_the_banner() {
    let backend = FakeBackend::new();
    let store = Arc::new(MemoryClientStore::new());
    let wizard = wizard(&backend, &store);
    wizard.initialize().unwrap();
    backend.fail("calculate_means_test");

    assert!(wizard.calculate_means_test().is_err());
    assert!(wizard.snapshot().last_error.is_some());
    wizard.clear_error();
    assert_eq!(wizard.snapshot().last_error, None);
}

#[test]
fn start_over_forgets_the_previous_session() {
    let backend = FakeBackend::new();
    let store = Arc::new(MemoryClientStore::new());
    let wizard = wizard(&backend, &store);
    wizard.initialize().unwrap();
    fill_required_steps(&wizard);
    wizard.advance().unwrap();
    let old = wizard.snapshot().session_id().unwrap();

    wizard.start_over().unwrap();

    let state = wizard.snapshot();
    let new = state.session_id().unwrap();
    assert_ne!(old, new);
    assert_eq!(state.current_step, 1);
    assert!(state.drafts.debtor.last_name.is_empty());
    assert_eq!(store.session_id().unwrap(), Some(new));
}

#[test]
fn first_step_view_has_no_previous_button() {
    let backend = FakeBackend::new();
    let store = Arc::new(MemoryClientStore::new());
    let wizard = wizard(&backend, &store);
    wizard.initialize().unwrap();

    let view = wizard.view();
    assert_eq!(view.title, "Bankruptcy Intake");
    assert_eq!(view.announcement, "Step 1 of 6: Your Information");
    assert!(view.action(NavAction::Previous).is_none());
    assert_eq!(view.action(NavAction::Continue).unwrap().label, "Continue");

    fill_required_steps(&wizard);
    wizard.advance().unwrap();
    let view = wizard.view();
    assert!(view.is_enabled(NavAction::Previous));
    assert_eq!(view.progress[0].label, "Your Information");
}
