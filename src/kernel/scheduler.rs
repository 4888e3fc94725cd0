use super::event::OutputId;
use super::policy::Action;
use super::state::StateDelta;
use crate::outputs::report::TriageReport;

pub struct Scheduler;

#[derive(Debug, Clone)]
pub enum SideEffect {
    Log(String),
    /// Ask the phrasing collaborator to render `action` as patient-facing text.
    RequestPhrasing { output_id: OutputId, action: Action },
    /// Terminal payload for downstream systems. `output_id` is the phrasing request that closes it.
    Finalize { output_id: OutputId, report: TriageReport },
}

impl Scheduler {
    /// Pure Projection: Action + Context -> (StateDeltas, SideEffect)
    pub fn schedule(&self, action: Action, turn: u32, ordinal: u16) -> (Vec<StateDelta>, SideEffect) {
        let output_id = OutputId { turn, ordinal };
        let mut deltas = Vec::new();

        if let Some(class) = action.question_class() {
            deltas.push(StateDelta::QuestionIssued(class));
        }
        if action.state().is_terminal() {
            deltas.push(StateDelta::Concluded(action.clone()));
        }
        deltas.push(StateDelta::OutputRequested(output_id));

        (deltas, SideEffect::RequestPhrasing { output_id, action })
    }
}
