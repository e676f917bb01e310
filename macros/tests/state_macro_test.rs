//! Tests for #[derive(State)] macro

use tasklist_macros::State;

#[derive(State, Clone, Debug, Default)]
struct ListState {
    pub labels: Vec<String>,
    #[revision]
    pub revision: u64,
}

#[derive(State, Clone, Debug)]
struct SmallState {
    #[revision]
    rev: u8,
}

#[derive(State, Clone, Debug)]
struct PlainState {
    pub count: i32,
}

#[test]
fn test_revision_starts_at_field_value() {
    let state = ListState {
        labels: vec!["A".to_string()],
        revision: 5,
    };

    assert_eq!(state.revision(), 5);
}

#[test]
fn test_bump_revision() {
    let mut state = ListState::default();
    assert_eq!(state.revision(), 0);

    state.bump_revision();
    state.bump_revision();
    assert_eq!(state.revision(), 2);
    assert!(state.labels.is_empty());
}

#[test]
fn test_bump_revision_wraps() {
    let mut state = SmallState { rev: u8::MAX };
    state.bump_revision();
    assert_eq!(state.revision(), 0);
}

#[test]
fn test_state_without_revision_compiles() {
    let state = PlainState { count: 3 };
    assert_eq!(state.count, 3);
}
