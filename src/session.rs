//! Control-surface state.
//!
//! A surface (CLI, web page, TUI) never holds a pipeline across actions by itself: it hands the
//! current [`SessionState`] to [`apply`] together with an action and stores whatever comes back.
//! [`SessionStore`] is the in-process owner of those states, keyed by session id.

use crate::config::EtlConfig;
use crate::error::{EtlError, Result};
use crate::pipeline::Pipeline;
use crate::types::LoadResult;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

/// What a surface keeps between actions
#[derive(Debug, Clone)]
pub struct SessionState {
    pub pipeline: Pipeline,
    /// Whether a run has been attempted since the last reset
    pub pipeline_run: bool,
}

impl SessionState {
    pub fn new(config: EtlConfig) -> Self {
        Self {
            pipeline: Pipeline::with_config(config),
            pipeline_run: false,
        }
    }
}

/// Actions offered by the control surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlAction {
    /// Run the full pipeline on a fresh instance
    Run { source: String, destination: String },
    /// Discard the pipeline and return to the uninitialized state
    Reset,
}

/// Result of an action, for the surface to render as a success or failure banner
#[derive(Debug)]
pub enum ActionOutcome {
    Succeeded(LoadResult),
    Failed(EtlError),
    Reset,
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Succeeded(_))
    }
}

/// Apply one action to a session state and return the new state.
///
/// Both actions replace the pipeline wholesale, so the incoming state is consumed unread.
pub fn apply(
    _current: SessionState,
    action: ControlAction,
    config: &EtlConfig,
) -> (SessionState, ActionOutcome) {
    match action {
        ControlAction::Run {
            source,
            destination,
        } => {
            // Every run starts from a fresh pipeline, so the log covers exactly one run
            let mut pipeline = Pipeline::with_config(config.clone());
            let outcome = match pipeline.run_full_pipeline(&source, &destination) {
                Ok(result) => ActionOutcome::Succeeded(result),
                Err(e) => ActionOutcome::Failed(e),
            };
            (
                SessionState {
                    pipeline,
                    pipeline_run: true,
                },
                outcome,
            )
        }
        ControlAction::Reset => (SessionState::new(config.clone()), ActionOutcome::Reset),
    }
}

/// In-process owner of session states
#[derive(Debug, Default)]
pub struct SessionStore {
    config: EtlConfig,
    sessions: HashMap<Uuid, SessionState>,
}

impl SessionStore {
    pub fn new(config: EtlConfig) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
        }
    }

    /// Start a new session in the uninitialized state
    pub fn open(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .insert(id, SessionState::new(self.config.clone()));
        info!(session = %id, "Opened session");
        id
    }

    /// Apply an action to an existing session; the new state replaces the old one
    pub fn dispatch(&mut self, id: Uuid, action: ControlAction) -> Result<ActionOutcome> {
        let state = self
            .sessions
            .remove(&id)
            .ok_or(EtlError::UnknownSession(id))?;
        let (next, outcome) = apply(state, action, &self.config);
        match &outcome {
            ActionOutcome::Succeeded(result) => {
                info!(session = %id, destination = %result.destination, "Pipeline run succeeded")
            }
            ActionOutcome::Failed(e) => warn!(session = %id, "Pipeline run failed: {}", e),
            ActionOutcome::Reset => info!(session = %id, "Session reset"),
        }
        self.sessions.insert(id, next);
        Ok(outcome)
    }

    pub fn get(&self, id: Uuid) -> Option<&SessionState> {
        self.sessions.get(&id)
    }

    /// Drop a session entirely
    pub fn close(&mut self, id: Uuid) -> bool {
        self.sessions.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineStage;

    fn run(source: &str, destination: &str) -> ControlAction {
        ControlAction::Run {
            source: source.to_string(),
            destination: destination.to_string(),
        }
    }

    #[test]
    fn test_apply_run_then_reset() {
        let config = EtlConfig::default();
        let state = SessionState::new(config.clone());
        assert!(!state.pipeline_run);

        let (state, outcome) = apply(state, run("sample", "memory"), &config);
        assert!(outcome.is_success());
        assert!(state.pipeline_run);
        assert_eq!(state.pipeline.stage(), PipelineStage::Loaded);

        let (state, outcome) = apply(state, ControlAction::Reset, &config);
        assert!(matches!(outcome, ActionOutcome::Reset));
        assert!(!state.pipeline_run);
        assert_eq!(state.pipeline.stage(), PipelineStage::Uninitialized);
        assert!(state.pipeline.logs().is_empty());
    }

    #[test]
    fn test_each_run_starts_with_fresh_log() {
        let config = EtlConfig::default();
        let (state, _) = apply(SessionState::new(config.clone()), run("sample", "memory"), &config);
        let first_len = state.pipeline.logs().len();
        let (state, _) = apply(state, run("sample", "memory"), &config);
        assert_eq!(state.pipeline.logs().len(), first_len);
    }

    #[test]
    fn test_failed_run_is_reported() {
        let config = EtlConfig::default();
        let (state, outcome) =
            apply(SessionState::new(config.clone()), run("ftp", "memory"), &config);
        assert!(matches!(outcome, ActionOutcome::Failed(EtlError::UnknownSource(_))));
        assert!(state.pipeline_run);
        assert!(state.pipeline.transformed_data().is_none());
    }

    #[test]
    fn test_store_keeps_sessions_independent() {
        let mut store = SessionStore::new(EtlConfig::default());
        let a = store.open();
        let b = store.open();
        assert_eq!(store.len(), 2);

        let outcome = store.dispatch(a, run("sample", "memory")).unwrap();
        assert!(outcome.is_success());
        assert!(store.get(a).unwrap().pipeline_run);
        assert!(!store.get(b).unwrap().pipeline_run);

        store.dispatch(a, ControlAction::Reset).unwrap();
        assert!(!store.get(a).unwrap().pipeline_run);
    }

    #[test]
    fn test_unknown_session() {
        let mut store = SessionStore::new(EtlConfig::default());
        let id = store.open();
        assert!(store.close(id));
        assert!(!store.close(id));
        let err = store.dispatch(id, ControlAction::Reset).unwrap_err();
        assert!(matches!(err, EtlError::UnknownSession(u) if u == id));
        assert!(store.is_empty());
    }
}
