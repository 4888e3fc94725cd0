use serde::{Deserialize, Serialize};
use crate::kernel::event::{OutputId, Speaker};
use crate::kernel::policy::{Action, Field};

// Allowed: IDs, Turn indices, Counts, Enums
// Forbidden: Message text, Numeric readings, Tag lists tied to a patient

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TelemetryEvent {
    TurnReceived {
        turn: u32,
        speaker: Speaker,
    },

    /// A patient turn arrived after the session reached a terminal state.
    TurnRejected {
        turn: u32,
    },

    FactsUpdated {
        turn: u32,
        complaint_present: bool,
        has_temperature: bool,
        has_duration: bool,
        symptom_count: usize,
        red_flag_count: usize,
    },

    ReadingDiscarded {
        kind: ReadingKind,
        count: usize,
    },

    ActionSelected {
        turn: u32,
        kind: ActionKind,
    },

    PhrasingLifecycle {
        output_id: OutputId,
        event: PhrasingEvent,
    },

    SessionSummary {
        patient_turns: u32,
        questions_asked: usize,
        outcome: Option<ActionKind>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadingKind {
    Temperature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhrasingEvent {
    Requested,
    Generated,
    /// The collaborator failed or timed out; a template was used.
    FellBack,
    Delivered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    AskComplaint,
    AskTemperature,
    AskDuration,
    AskSymptoms,
    AskRedFlags,
    EmitSummary,
    UrgentReferral,
}

impl From<&Action> for ActionKind {
    fn from(action: &Action) -> Self {
        match action {
            Action::AskField(Field::Complaint) => ActionKind::AskComplaint,
            Action::AskField(Field::Temperature) => ActionKind::AskTemperature,
            Action::AskField(Field::Duration) => ActionKind::AskDuration,
            Action::AskField(Field::Symptoms) => ActionKind::AskSymptoms,
            Action::AskRedFlags => ActionKind::AskRedFlags,
            Action::EmitSummary(_) => ActionKind::EmitSummary,       // Content STRIPPED
            Action::UrgentReferral(_) => ActionKind::UrgentReferral, // Content STRIPPED
        }
    }
}
