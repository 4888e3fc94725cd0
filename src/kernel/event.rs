use serde::{Deserialize, Serialize};

/// Correlates a phrasing request with the reply the driver feeds back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputId {
    pub turn: u32,
    pub ordinal: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    #[serde(rename = "user")]
    Patient,
    #[serde(rename = "assistant")]
    Assistant,
}

/// One message. Serialized in the chat wire shape `{ "role", "content" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    #[serde(rename = "role")]
    pub speaker: Speaker,
    #[serde(rename = "content")]
    pub text: String,
}

impl Turn {
    pub fn patient(text: &str) -> Self {
        Self {
            speaker: Speaker::Patient,
            text: text.to_string(),
        }
    }

    pub fn assistant(text: &str) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.to_string(),
        }
    }
}

/// Append-only message log owned by a single session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The last `k` turns, oldest first.
    pub fn recent(&self, k: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(k);
        &self.turns[start..]
    }

    /// Patient messages among the last `k` turns, oldest first.
    /// Assistant turns are skipped: our own questions must not count as findings.
    pub fn patient_messages(&self, k: usize) -> Vec<&str> {
        self.recent(k)
            .iter()
            .filter(|t| t.speaker == Speaker::Patient)
            .map(|t| t.text.as_str())
            .collect()
    }

    /// The same messages joined one per line.
    pub fn patient_window(&self, k: usize) -> String {
        self.patient_messages(k).join("\n")
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    /// Inbound patient message.
    Turn(Turn),
    /// Rendered text for a previously requested action.
    AssistantReply { output_id: OutputId, text: String },
    /// Drop the session and start over.
    Reset,
}
