use uuid::Uuid;

use super::event::{OutputId, Turn, Transcript};
use super::extract::FactSet;
use super::policy::{Action, PolicyState, Progress, QuestionClass};

/// Strict state delta. This is the ONLY way session state mutates.
#[derive(Debug, Clone)]
pub enum StateDelta {
    TurnAppended(Turn),
    FactsAbsorbed(FactSet),
    QuestionIssued(QuestionClass),
    Concluded(Action),
    OutputRequested(OutputId),
    ReplyDelivered(OutputId),
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: Uuid,
    transcript: Transcript,
    facts: FactSet,
    progress: Progress,
    /// Terminal action once the session reached Ready or UrgentOverride.
    outcome: Option<Action>,
    /// Phrasing requests not yet answered by the driver.
    pending_outputs: Vec<OutputId>,
    // Monotonic version, bumped on every delta
    pub version: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            transcript: Transcript::new(),
            facts: FactSet::default(),
            progress: Progress::default(),
            outcome: None,
            pending_outputs: Vec::new(),
            version: 0,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure reduction: State + Delta -> Mutated State
    pub fn reduce(&mut self, delta: StateDelta) {
        self.version += 1;

        match delta {
            StateDelta::TurnAppended(turn) => {
                self.transcript.push(turn);
            }
            StateDelta::FactsAbsorbed(window) => {
                self.facts.absorb(&window);
            }
            StateDelta::QuestionIssued(class) => {
                self.progress.asked.insert(class);
            }
            StateDelta::Concluded(action) => {
                // First terminal action wins; a session is not re-entered.
                if self.outcome.is_none() {
                    self.outcome = Some(action);
                }
            }
            StateDelta::OutputRequested(id) => {
                self.pending_outputs.push(id);
            }
            StateDelta::ReplyDelivered(id) => {
                self.pending_outputs.retain(|p| *p != id);
            }
        }
    }

    // Read-only accessors
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn facts(&self) -> &FactSet {
        &self.facts
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn outcome(&self) -> Option<&Action> {
        self.outcome.as_ref()
    }

    pub fn policy_state(&self) -> Option<PolicyState> {
        self.outcome.as_ref().map(|a| a.state())
    }

    pub fn is_closed(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn is_pending(&self, id: &OutputId) -> bool {
        self.pending_outputs.contains(id)
    }

    pub fn patient_turns(&self) -> u32 {
        self.transcript
            .turns()
            .iter()
            .filter(|t| t.speaker == super::event::Speaker::Patient)
            .count() as u32
    }
}
