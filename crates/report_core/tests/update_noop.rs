use report_core::{update, ControllerState, Msg};

#[test]
fn update_is_noop() {
    let state = ControllerState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
