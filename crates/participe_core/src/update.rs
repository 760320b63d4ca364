use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FieldChanged { name, value } => {
            state.set_field(&name, value);
            Vec::new()
        }
        Msg::SubmitClicked => match state.begin_attempt() {
            Some((attempt_id, action, entries)) => vec![Effect::SendSubmission {
                attempt_id,
                action,
                entries,
            }],
            // Trigger is disabled while an attempt is outstanding.
            None => Vec::new(),
        },
        Msg::SubmissionResolved {
            attempt_id,
            outcome,
        } => {
            state.resolve_attempt(attempt_id, outcome);
            Vec::new()
        }
    };

    (state, effects)
}
