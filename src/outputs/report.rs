use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TriageConfig;
use crate::kernel::event::OutputId;
use crate::kernel::extract::FactSet;
use crate::kernel::policy::{Action, ProgressionPolicy, Summary};
use super::realizer::render_markdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriageLevel {
    /// Red flag seen: direct the patient to the emergency number.
    #[serde(rename = "URGENT_15")]
    Urgent15,
    /// Same-day unscheduled care through a regulated teleconsultation.
    #[serde(rename = "SNP")]
    Unscheduled,
}

/// Final payload handed to the booking side once the session concludes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageReport {
    pub session_id: Uuid,
    pub triage: TriageLevel,
    pub estimated_slot_min: u32,
    pub summary: Summary,
    pub red_flags: Vec<String>,
    /// Structured record for the doctor.
    pub summary_md: String,
    /// Patient-facing recap, filled in by the driver once phrasing returns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_patient: Option<String>,
}

impl TriageReport {
    /// Builds the report for a terminal action. Returns `None` for questions.
    pub fn build(
        session_id: Uuid,
        action: &Action,
        facts: &FactSet,
        policy: &ProgressionPolicy,
        config: &TriageConfig,
    ) -> Option<Self> {
        let (triage, summary, red_flags) = match action {
            Action::EmitSummary(summary) => (TriageLevel::Unscheduled, summary.clone(), Vec::new()),
            Action::UrgentReferral(notice) => (
                TriageLevel::Urgent15,
                policy.summarize(facts),
                notice.red_flags.clone(),
            ),
            Action::AskField(_) | Action::AskRedFlags => return None,
        };

        let estimated_slot_min = match triage {
            TriageLevel::Urgent15 => 0,
            TriageLevel::Unscheduled => estimate_slot(facts, config),
        };
        let summary_md = render_markdown(&summary, triage, &red_flags);

        Some(Self {
            session_id,
            triage,
            estimated_slot_min,
            summary,
            red_flags,
            summary_md,
            summary_patient: None,
        })
    }
}

/// Longer slot when the summary had to truncate symptoms or the problem is long-standing.
fn estimate_slot(facts: &FactSet, config: &TriageConfig) -> u32 {
    let truncated = facts.symptoms.len() > config.summary_top_n;
    let long_standing = facts
        .duration_days
        .is_some_and(|d| d > config.extended_after_days);

    if truncated || long_standing {
        config.slot_minutes_extended
    } else {
        config.slot_minutes_base
    }
}

/// Response envelope of the chat endpoint: either the next question or the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatReply {
    Ask(String),
    Final(Box<TriageReport>),
}

/// Holds a session's final report until the phrasing of its closing message returns.
/// Replies to earlier questions that are still in flight never complete it.
#[derive(Debug, Default)]
pub struct PendingFinal {
    slot: Option<(OutputId, TriageReport)>,
}

impl PendingFinal {
    pub fn hold(&mut self, output_id: OutputId, report: TriageReport) {
        self.slot = Some((output_id, report));
    }

    pub fn is_waiting(&self) -> bool {
        self.slot.is_some()
    }

    /// Returns the final envelope when `output_id` is the closing request, with the
    /// phrased text attached as the patient recap.
    pub fn complete(&mut self, output_id: OutputId, patient_text: &str) -> Option<ChatReply> {
        match &self.slot {
            Some((id, _)) if *id == output_id => {}
            _ => return None,
        }
        let (_, mut report) = self.slot.take()?;
        report.summary_patient = Some(patient_text.to_string());
        Some(ChatReply::Final(Box::new(report)))
    }
}
