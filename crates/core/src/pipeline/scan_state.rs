use serde::Serialize;

use crate::shared::scan_error::FailedStage;

/// Lifecycle of one scan run. Transitions only move forward; a finished
/// run (completed or failed) never changes state again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "stage", rename_all = "snake_case")]
pub enum ScanState {
    Idle,
    ReferenceLoaded,
    Scanning,
    Completed,
    Failed(FailedStage),
}

impl ScanState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ScanState::Completed | ScanState::Failed(_))
    }

    /// The state `event` leads to, or `None` when the move is not allowed.
    pub fn next(self, event: ScanEvent) -> Option<ScanState> {
        use ScanEvent::*;
        use ScanState::*;
        match (self, event) {
            (Idle, ReferenceEncoded) => Some(ReferenceLoaded),
            (ReferenceLoaded, ScanStarted) => Some(Scanning),
            (Scanning, ScanFinished) => Some(Completed),
            (Idle | ReferenceLoaded | Scanning, Failure(stage)) => Some(Failed(stage)),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanEvent {
    ReferenceEncoded,
    ScanStarted,
    ScanFinished,
    Failure(FailedStage),
}

/// Tracks the state of a run and rejects out-of-order events.
#[derive(Debug)]
pub struct ScanStateMachine {
    state: ScanState,
}

impl ScanStateMachine {
    pub fn new() -> Self {
        Self {
            state: ScanState::Idle,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Applies `event`. An illegal move is logged and leaves the state
    /// unchanged.
    pub fn apply(&mut self, event: ScanEvent) -> ScanState {
        if self.state.is_terminal() {
            log::warn!("Ignoring {event:?}; run already ended as {:?}", self.state);
            return self.state;
        }
        match self.state.next(event) {
            Some(next) => {
                log::debug!("Scan state {:?} -> {:?}", self.state, next);
                self.state = next;
            }
            None => log::warn!("Ignoring {event:?} in state {:?}", self.state),
        }
        self.state
    }
}

impl Default for ScanStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
