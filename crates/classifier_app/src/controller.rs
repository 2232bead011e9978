//! Drives the core state machine against a live engine.

use classifier_core::{update, AnalysisOutcome, AnalysisViewModel, AppState, Msg};
use classifier_engine::{EngineError, EngineHandle};
use classifier_logging::{classifier_debug, classifier_error};

use crate::config::ClassifierConfig;
use crate::effects::{utc_clock, EffectRunner};

pub struct Controller {
    state: AppState,
    runner: EffectRunner,
}

impl Controller {
    pub fn new(config: &ClassifierConfig) -> Result<Self, EngineError> {
        let engine = EngineHandle::new(config.client_settings(), Some(utc_clock()))?;
        Ok(Self::from_parts(
            AppState::with_policy(config.submit_policy()),
            engine,
        ))
    }

    pub fn from_parts(state: AppState, engine: EngineHandle) -> Self {
        Self {
            state,
            runner: EffectRunner::new(engine),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AnalysisViewModel {
        self.state.view()
    }

    /// A fresh view if the state changed since the last frame was taken.
    pub fn take_frame(&mut self) -> Option<AnalysisViewModel> {
        self.state.consume_dirty().then(|| self.state.view())
    }

    /// Apply one message and hand any resulting effects to the engine.
    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.dispatch(Msg::InputChanged(text.into()));
    }

    /// Submit whatever is in the input box without waiting for the answer.
    pub fn submit_current(&mut self) {
        self.dispatch(Msg::SubmitClicked);
    }

    /// Analyze `input` and wait until the request settles.
    pub fn submit(&mut self, input: &str) -> AnalysisViewModel {
        self.set_input(input);
        self.submit_current();
        self.wait_idle();
        self.view()
    }

    /// Apply every completion that has already arrived. Returns how many.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(msg) = self.runner.try_next_msg() {
            self.dispatch(msg);
            applied += 1;
        }
        applied
    }

    /// Block until no tracked request is outstanding.
    pub fn wait_idle(&mut self) {
        while self.state.outstanding_requests() > 0 {
            match self.runner.next_msg() {
                Some(msg) => self.dispatch(msg),
                None => {
                    classifier_error!("Analysis engine stopped with requests outstanding");
                    self.fail_outstanding();
                    return;
                }
            }
        }
        classifier_debug!("No outstanding requests");
    }

    /// Stop the engine. Completions already delivered are applied; requests
    /// still in flight settle as transport failures.
    pub fn shutdown(&mut self) {
        self.runner.shutdown();
        self.wait_idle();
    }

    // Pending must always end, even when the engine dies underneath us.
    fn fail_outstanding(&mut self) {
        for request_id in self.state.outstanding_request_ids() {
            self.dispatch(Msg::AnalysisSettled {
                request_id,
                outcome: AnalysisOutcome::TransportFailed {
                    cause: Some("analysis engine stopped".to_string()),
                },
                settled_utc: None,
            });
        }
    }
}
