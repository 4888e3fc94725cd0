use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::extract::FactSet;
use super::vocabulary::ComplaintTag;

/// Fields the policy can request from the patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Complaint,
    Temperature,
    Duration,
    Symptoms,
}

/// Question classes issued at most once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionClass {
    Field(Field),
    RedFlags,
}

/// Per-session markers threaded alongside the transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub asked: BTreeSet<QuestionClass>,
}

impl Progress {
    pub fn has_asked(&self, class: QuestionClass) -> bool {
        self.asked.contains(&class)
    }

    pub fn red_flags_asked(&self) -> bool {
        self.has_asked(QuestionClass::RedFlags)
    }
}

/// The machine-auditable record handed to downstream consumers. Field names are a stable contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub complaint: String,
    pub duration_days: Option<u32>,
    pub temperature_c: Option<f64>,
    pub symptoms: Vec<String>,
    pub red_flags_present: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrgentNotice {
    pub red_flags: Vec<String>,
    pub complaint: Option<String>,
    pub duration_days: Option<u32>,
    pub temperature_c: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data")]
pub enum Action {
    AskField(Field),
    AskRedFlags,
    EmitSummary(Summary),
    UrgentReferral(UrgentNotice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyState {
    CollectingComplaint,
    CollectingTemperature,
    CollectingDuration,
    CollectingSymptoms,
    ScreeningRedFlags,
    Ready,
    UrgentOverride,
}

impl PolicyState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PolicyState::Ready | PolicyState::UrgentOverride)
    }
}

impl Action {
    pub fn state(&self) -> PolicyState {
        match self {
            Action::AskField(Field::Complaint) => PolicyState::CollectingComplaint,
            Action::AskField(Field::Temperature) => PolicyState::CollectingTemperature,
            Action::AskField(Field::Duration) => PolicyState::CollectingDuration,
            Action::AskField(Field::Symptoms) => PolicyState::CollectingSymptoms,
            Action::AskRedFlags => PolicyState::ScreeningRedFlags,
            Action::EmitSummary(_) => PolicyState::Ready,
            Action::UrgentReferral(_) => PolicyState::UrgentOverride,
        }
    }

    /// The question class this action consumes, if it is a question.
    pub fn question_class(&self) -> Option<QuestionClass> {
        match self {
            Action::AskField(f) => Some(QuestionClass::Field(*f)),
            Action::AskRedFlags => Some(QuestionClass::RedFlags),
            _ => None,
        }
    }
}

pub struct ProgressionPolicy {
    pub summary_top_n: usize,
}

impl Default for ProgressionPolicy {
    fn default() -> Self {
        Self { summary_top_n: 3 }
    }
}

impl ProgressionPolicy {
    pub fn new(summary_top_n: usize) -> Self {
        Self { summary_top_n }
    }

    /// PURE FUNCTION: (facts, progress) -> exactly one next action.
    ///
    /// Red flags pre-empt everything. Otherwise the first unresolved, not-yet-asked
    /// field in priority order is requested, and the summary is the fallback.
    pub fn next_action(&self, facts: &FactSet, progress: &Progress) -> Action {
        if !facts.red_flags.is_empty() {
            return Action::UrgentReferral(urgent_notice(facts));
        }

        let open = |f: Field| !progress.has_asked(QuestionClass::Field(f));

        if !facts.complaint_present && open(Field::Complaint) {
            return Action::AskField(Field::Complaint);
        }
        if facts.has_febrile_complaint() && facts.temperature_c.is_none() && open(Field::Temperature) {
            return Action::AskField(Field::Temperature);
        }
        if facts.duration_days.is_none() && open(Field::Duration) {
            return Action::AskField(Field::Duration);
        }
        if facts.symptoms.is_empty() && open(Field::Symptoms) {
            return Action::AskField(Field::Symptoms);
        }
        if !progress.red_flags_asked() && !facts.further_symptoms_denied {
            return Action::AskRedFlags;
        }

        Action::EmitSummary(self.summarize(facts))
    }

    pub fn summarize(&self, facts: &FactSet) -> Summary {
        Summary {
            complaint: complaint_label(&facts.complaints).unwrap_or_else(|| "unspecified".to_string()),
            duration_days: facts.duration_days,
            temperature_c: facts.temperature_c,
            symptoms: facts
                .symptoms
                .iter()
                .take(self.summary_top_n)
                .map(|s| s.label().to_string())
                .collect(),
            red_flags_present: !facts.red_flags.is_empty(),
        }
    }
}

fn urgent_notice(facts: &FactSet) -> UrgentNotice {
    UrgentNotice {
        red_flags: facts.red_flags.iter().map(|r| r.label().to_string()).collect(),
        complaint: complaint_label(&facts.complaints),
        duration_days: facts.duration_days,
        temperature_c: facts.temperature_c,
    }
}

/// "fever/rhinitis". Generic pain is dropped when a specific complaint exists.
fn complaint_label(complaints: &[ComplaintTag]) -> Option<String> {
    let specific: Vec<&str> = complaints
        .iter()
        .filter(|c| **c != ComplaintTag::Pain)
        .map(|c| c.label())
        .collect();

    if !specific.is_empty() {
        Some(specific.join("/"))
    } else if complaints.contains(&ComplaintTag::Pain) {
        Some(ComplaintTag::Pain.label().to_string())
    } else {
        None
    }
}
