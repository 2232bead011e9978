use crate::{AppState, Effect, ErrorInfo, Msg, SubmitPolicy};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::SubmitClicked => submit(&mut state),
        Msg::AnalysisSettled {
            request_id,
            outcome,
            settled_utc,
        } => {
            // Unknown ids are superseded or duplicate completions.
            state.settle(request_id, outcome, settled_utc);
            Vec::new()
        }
    };

    (state, effects)
}

fn submit(state: &mut AppState) -> Vec<Effect> {
    let mut effects = Vec::new();
    match state.policy() {
        SubmitPolicy::RejectWhilePending if state.is_pending() => return effects,
        SubmitPolicy::Supersede => {
            effects.extend(
                state
                    .abandon_in_flight()
                    .into_iter()
                    .map(|request_id| Effect::CancelAnalysis { request_id }),
            );
        }
        SubmitPolicy::RejectWhilePending | SubmitPolicy::LastWriteWins => {}
    }

    if state.input().trim().is_empty() {
        state.fail(ErrorInfo::empty_input());
        return effects;
    }

    // The raw input goes out untouched: no trimming, no scheme inference.
    let url = state.input().to_owned();
    let request_id = state.begin_request(url.clone());
    effects.push(Effect::AnalyzeUrl { request_id, url });
    effects
}
