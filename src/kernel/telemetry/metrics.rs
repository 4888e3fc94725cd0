use std::collections::VecDeque;
use super::event::{ActionKind, PhrasingEvent, ReadingKind, TelemetryEvent};
use crate::kernel::event::Speaker;

#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub turn_stats: TurnStats,
    pub question_stats: QuestionStats,
    pub outcome_stats: OutcomeStats,
    pub reading_stats: ReadingStats,
    pub phrasing_stats: PhrasingStats,
}

#[derive(Debug, Clone, Default)]
pub struct TurnStats {
    pub patient: u64,
    pub assistant: u64,
    pub rejected: u64,
}

#[derive(Debug, Clone, Default)]
pub struct QuestionStats {
    pub complaint: u64,
    pub temperature: u64,
    pub duration: u64,
    pub symptoms: u64,
    pub red_flags: u64,
}

impl QuestionStats {
    pub fn total(&self) -> u64 {
        self.complaint + self.temperature + self.duration + self.symptoms + self.red_flags
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutcomeStats {
    pub summaries: u64,
    pub urgent_referrals: u64,
    pub sessions: u64,
    pub total_turns_to_outcome: u64,
    pub avg_turns_to_outcome: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ReadingStats {
    pub discarded_temperatures: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PhrasingStats {
    pub requested: u64,
    pub generated: u64,
    pub fell_back: u64,
    pub delivered: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();
    let mut concluded_sessions = 0;

    for event in events {
        match event {
            TelemetryEvent::TurnReceived { speaker, .. } => match speaker {
                Speaker::Patient => snap.turn_stats.patient += 1,
                Speaker::Assistant => snap.turn_stats.assistant += 1,
            },
            TelemetryEvent::TurnRejected { .. } => snap.turn_stats.rejected += 1,
            TelemetryEvent::ReadingDiscarded { kind, count } => match kind {
                ReadingKind::Temperature => snap.reading_stats.discarded_temperatures += *count as u64,
            },
            TelemetryEvent::ActionSelected { kind, .. } => match kind {
                ActionKind::AskComplaint => snap.question_stats.complaint += 1,
                ActionKind::AskTemperature => snap.question_stats.temperature += 1,
                ActionKind::AskDuration => snap.question_stats.duration += 1,
                ActionKind::AskSymptoms => snap.question_stats.symptoms += 1,
                ActionKind::AskRedFlags => snap.question_stats.red_flags += 1,
                ActionKind::EmitSummary => snap.outcome_stats.summaries += 1,
                ActionKind::UrgentReferral => snap.outcome_stats.urgent_referrals += 1,
            },
            TelemetryEvent::PhrasingLifecycle { event, .. } => match event {
                PhrasingEvent::Requested => snap.phrasing_stats.requested += 1,
                PhrasingEvent::Generated => snap.phrasing_stats.generated += 1,
                PhrasingEvent::FellBack => snap.phrasing_stats.fell_back += 1,
                PhrasingEvent::Delivered => snap.phrasing_stats.delivered += 1,
            },
            TelemetryEvent::SessionSummary { patient_turns, outcome, .. } => {
                snap.outcome_stats.sessions += 1;
                if outcome.is_some() {
                    snap.outcome_stats.total_turns_to_outcome += *patient_turns as u64;
                    concluded_sessions += 1;
                }
            }
            TelemetryEvent::FactsUpdated { .. } => {}
        }
    }

    if concluded_sessions > 0 {
        snap.outcome_stats.avg_turns_to_outcome =
            snap.outcome_stats.total_turns_to_outcome as f64 / concluded_sessions as f64;
    }

    snap
}
