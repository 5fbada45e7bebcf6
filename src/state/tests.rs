//! Tests for extraction state types

use super::*;
use crate::pagination::PaginationCursor;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

#[test_case("sync-units", Phase::SyncUnits)]
#[test_case("external_sync_units", Phase::SyncUnits)]
#[test_case("Metadata", Phase::Metadata)]
#[test_case("data", Phase::Data)]
#[test_case(" attachments ", Phase::Attachments)]
fn test_phase_from_str(name: &str, expected: Phase) {
    assert_eq!(name.parse::<Phase>().unwrap(), expected);
}

#[test]
fn test_phase_from_str_unknown() {
    assert!("loading".parse::<Phase>().is_err());
}

#[test]
fn test_phase_order() {
    let before_data: Vec<_> = Phase::Data.predecessors().collect();
    assert_eq!(before_data, vec![Phase::SyncUnits, Phase::Metadata]);
    assert_eq!(Phase::SyncUnits.predecessors().count(), 0);
    assert_eq!(serde_json::to_value(Phase::SyncUnits).unwrap(), json!("sync-units"));
}

#[test]
fn test_phase_status_derivation() {
    let mut phase = PhaseState::new();
    assert_eq!(phase.status(), PhaseStatus::NotStarted);

    phase = phase.with_progress(0, Some(PaginationCursor::new("c", "/q")));
    assert_eq!(phase.status(), PhaseStatus::InProgress);

    phase.mark_errored("boom");
    assert_eq!(phase.status(), PhaseStatus::Errored);
    assert_eq!(phase.current_index, Some(0));

    phase.mark_completed();
    assert_eq!(phase.status(), PhaseStatus::Completed);
    assert!(phase.cursor.is_none());
    assert!(phase.error.is_none());

    phase.reset();
    assert_eq!(phase, PhaseState::new());
}

#[test]
fn test_ensure_can_run_enforces_order() {
    let mut state = ExtractionState::new();
    assert!(state.ensure_can_run(Phase::SyncUnits).is_ok());

    let err = state.ensure_can_run(Phase::Data).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Phase 'data' cannot run before 'sync-units' is completed"
    );

    state.external_sync_units.mark_completed();
    assert_eq!(state.pending_before(Phase::Data), Some(Phase::Metadata));

    state.metadata.mark_completed();
    assert!(state.ensure_can_run(Phase::Data).is_ok());
    assert_eq!(state.next_phase(), Some(Phase::Data));
}

#[test]
fn test_finished_when_all_completed() {
    let mut state = ExtractionState::new();
    for phase in Phase::ALL {
        assert!(!state.is_finished());
        state.phase_mut(phase).mark_completed();
    }
    assert!(state.is_finished());
}

#[test]
fn test_state_serialization_shape() {
    let mut state = ExtractionState::new();
    state.external_sync_units.mark_completed();
    state.data = PhaseState::new().with_progress(
        1,
        Some(PaginationCursor::new("1700:0:100", "/projects/acme/web/issues/")),
    );

    assert_eq!(
        serde_json::to_value(&state).unwrap(),
        json!({
            "external_sync_units": {"completed": true},
            "metadata": {"completed": false},
            "data": {
                "completed": false,
                "cursor": {"token": "1700:0:100", "origin": "/projects/acme/web/issues/"},
                "currentIndex": 1
            },
            "attachments": {"completed": false}
        })
    );
}
