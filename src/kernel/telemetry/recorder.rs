use std::collections::VecDeque;
use super::event::{ActionKind, TelemetryEvent};
use super::metrics::{TelemetrySnapshot, compute_snapshot};
use crate::kernel::state::SessionState;

const MAX_EVENTS: usize = 10_000;

#[derive(Debug)]
pub struct TelemetryRecorder {
    buffer: VecDeque<TelemetryEvent>,
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(MAX_EVENTS),
        }
    }

    pub fn record(&mut self, event: TelemetryEvent) {
        if self.buffer.len() >= MAX_EVENTS {
            self.buffer.pop_front();
        }
        self.buffer.push_back(event);
    }

    pub fn events(&self) -> impl Iterator<Item = &TelemetryEvent> {
        self.buffer.iter()
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        // Delegate to pure functional metrics module
        compute_snapshot(&self.buffer)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Closing record for one session. The reactor records it on terminal action, reset or shutdown.
    pub fn aggregate_session(&self, state: &SessionState) -> TelemetryEvent {
        TelemetryEvent::SessionSummary {
            patient_turns: state.patient_turns(),
            questions_asked: state.progress().asked.len(),
            outcome: state.outcome().map(ActionKind::from),
        }
    }
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}
