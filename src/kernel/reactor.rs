use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::event::{Event, OutputId, Speaker, Turn};
use super::extract::SignalExtractor;
use super::policy::ProgressionPolicy;
use super::scheduler::{Scheduler, SideEffect};
use super::state::{SessionState, StateDelta};
use super::telemetry::event::{ActionKind, PhrasingEvent, ReadingKind, TelemetryEvent};
use super::telemetry::recorder::TelemetryRecorder;
use crate::config::TriageConfig;
use crate::error::TriageError;
use crate::outputs::report::TriageReport;

/// One triage session. Owns its state exclusively; sessions share only the immutable config.
pub struct Reactor {
    pub receiver: mpsc::Receiver<Event>,
    pub state: SessionState,
    pub scheduler: Scheduler,
    pub extractor: SignalExtractor,
    pub policy: ProgressionPolicy,
    pub telemetry: TelemetryRecorder,
    config: TriageConfig,
    // An open session already got its closing summary
    summarized_open: bool,
}

impl Reactor {
    pub fn new(receiver: mpsc::Receiver<Event>, config: TriageConfig) -> Self {
        Self {
            receiver,
            state: SessionState::new(),
            scheduler: Scheduler,
            extractor: SignalExtractor::new(config.vocabulary.clone(), config.limits),
            policy: ProgressionPolicy::new(config.summary_top_n),
            telemetry: TelemetryRecorder::new(),
            config,
            summarized_open: false,
        }
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    /// Pure Step: Advances State. Returns SideEffects to be executed by the driver.
    /// MUST NOT await I/O or timers.
    ///
    /// All patient turns in the batch are appended first; the policy then runs once,
    /// so a burst of messages produces a single next question.
    pub fn step(&mut self, events: Vec<Event>) -> Vec<SideEffect> {
        let mut effects = Vec::new();
        let mut new_patient_text = Vec::new();

        for event in events {
            match event {
                Event::Turn(turn) => {
                    if self.state.is_closed() {
                        let err = TriageError::SessionClosed(self.state.session_id);
                        warn!("Rejected turn: {}", err);
                        self.telemetry.record(TelemetryEvent::TurnRejected {
                            turn: self.state.patient_turns(),
                        });
                        effects.push(SideEffect::Log(err.to_string()));
                        continue;
                    }
                    if turn.speaker == Speaker::Patient {
                        new_patient_text.push(turn.text.clone());
                    }
                    self.append(turn);
                }
                Event::AssistantReply { output_id, text } => {
                    if let Err(e) = self.deliver(output_id, &text) {
                        warn!("Dropped reply: {}", e);
                        effects.push(SideEffect::Log(e.to_string()));
                    }
                }
                Event::Reset => {
                    self.reset();
                    effects.push(SideEffect::Log("Session reset".to_string()));
                }
            }
        }

        if new_patient_text.is_empty() {
            return effects;
        }

        // === EXTRACT (window) + ABSORB (accumulate) ===
        let (facts, _) = {
            let window = self.state.transcript().patient_messages(self.config.window_turns);
            self.extractor.extract_window(&window)
        };
        self.state.reduce(StateDelta::FactsAbsorbed(facts));

        // Out-of-range readings are counted once, from the turns that introduced them.
        let discarded: usize = new_patient_text
            .iter()
            .map(|t| self.extractor.extract_with_notes(t).1.discarded_temperatures)
            .sum();
        if discarded > 0 {
            self.telemetry.record(TelemetryEvent::ReadingDiscarded {
                kind: ReadingKind::Temperature,
                count: discarded,
            });
        }

        let turn = self.state.patient_turns();
        let facts = self.state.facts();
        self.telemetry.record(TelemetryEvent::FactsUpdated {
            turn,
            complaint_present: facts.complaint_present,
            has_temperature: facts.temperature_c.is_some(),
            has_duration: facts.duration_days.is_some(),
            symptom_count: facts.symptoms.len(),
            red_flag_count: facts.red_flags.len(),
        });

        // === DECIDE ===
        let action = self.policy.next_action(self.state.facts(), self.state.progress());
        let kind = ActionKind::from(&action);
        debug!("Turn {}: {:?}", turn, kind);
        self.telemetry.record(TelemetryEvent::ActionSelected { turn, kind });

        let report = TriageReport::build(
            self.state.session_id,
            &action,
            self.state.facts(),
            &self.policy,
            &self.config,
        );

        // === SCHEDULE ===
        let (deltas, effect) = self.scheduler.schedule(action, turn, 0);
        for delta in deltas {
            self.state.reduce(delta);
        }
        let requested = match &effect {
            SideEffect::RequestPhrasing { output_id, .. } => Some(*output_id),
            _ => None,
        };
        if let Some(output_id) = requested {
            self.telemetry.record(TelemetryEvent::PhrasingLifecycle {
                output_id,
                event: PhrasingEvent::Requested,
            });
        }
        effects.push(effect);

        // The report travels with the id of the request that phrases its closing message.
        if let (Some(report), Some(output_id)) = (report, requested) {
            info!("Session {} concluded: {:?}", self.state.session_id, report.triage);
            let summary = self.telemetry.aggregate_session(&self.state);
            self.telemetry.record(summary);
            effects.push(SideEffect::Finalize { output_id, report });
        }

        effects
    }

    /// Convenience for synchronous callers: one patient message in, effects out.
    pub fn submit(&mut self, text: &str) -> Result<Vec<SideEffect>, TriageError> {
        if self.state.is_closed() {
            return Err(TriageError::SessionClosed(self.state.session_id));
        }
        Ok(self.step(vec![Event::Turn(Turn::patient(text))]))
    }

    /// Record the rendered text of a pending phrasing request as an assistant turn.
    pub fn deliver(&mut self, output_id: OutputId, text: &str) -> Result<(), TriageError> {
        if !self.state.is_pending(&output_id) {
            return Err(TriageError::UnknownOutput(output_id));
        }
        self.state.reduce(StateDelta::ReplyDelivered(output_id));
        self.append(Turn::assistant(text));
        self.telemetry.record(TelemetryEvent::PhrasingLifecycle {
            output_id,
            event: PhrasingEvent::Delivered,
        });
        Ok(())
    }

    /// Start a fresh session. Telemetry is kept across sessions.
    pub fn reset(&mut self) {
        self.shutdown();
        info!("Session {} reset", self.state.session_id);
        self.state = SessionState::new();
        self.summarized_open = false;
    }

    /// Record the closing summary of a session that never reached a terminal action.
    /// Concluded sessions were summarized when they concluded; calling this twice is harmless.
    pub fn shutdown(&mut self) {
        if self.state.is_closed() || self.state.transcript().is_empty() || self.summarized_open {
            return;
        }
        let summary = self.telemetry.aggregate_session(&self.state);
        self.telemetry.record(summary);
        self.summarized_open = true;
    }

    fn append(&mut self, turn: Turn) {
        let speaker = turn.speaker;
        self.state.reduce(StateDelta::TurnAppended(turn));
        self.telemetry.record(TelemetryEvent::TurnReceived {
            turn: self.state.patient_turns(),
            speaker,
        });
    }

    /// Async Driver Loop. Effects are only logged here; `main` wires the phrasing service.
    pub async fn run(&mut self) {
        info!("Reactor Pipeline Started. Session {}", self.state.session_id);

        while let Some(event) = self.receiver.recv().await {
            // Drain whatever else is already queued so bursts are evaluated together
            let mut events = vec![event];
            while let Ok(more) = self.receiver.try_recv() {
                events.push(more);
            }

            for effect in self.step(events) {
                match effect {
                    SideEffect::Log(msg) => info!("[LOG] {}", msg),
                    SideEffect::RequestPhrasing { output_id, action } => {
                        info!("[PHRASE-{:?}] {:?}", output_id, ActionKind::from(&action));
                    }
                    SideEffect::Finalize { report, .. } => {
                        info!("[FINAL] {:?} slot={}min", report.triage, report.estimated_slot_min);
                    }
                }
            }
        }
    }
}
