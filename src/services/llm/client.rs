use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::PhrasingConfig;
use crate::error::PhrasingError;
use crate::kernel::event::{Speaker, Transcript};
use crate::kernel::policy::{Action, Field};
use crate::outputs::realizer::render_template;

const SYSTEM_PROMPT: &str = "Tu es un assistant médical de triage (SNP). Tu poses des questions courtes et claires \
(motif, depuis quand, symptômes, éléments de gravité). Tu ne poses jamais de diagnostic. Réponds en français.";

/// How many transcript turns are sent along for context.
const CONTEXT_TURNS: usize = 6;

#[derive(Clone)]
pub struct PhrasingService {
    client: Client,
    config: PhrasingConfig,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Outcome of a phrasing call, so the driver can tell generated text from fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phrased {
    Generated(String),
    Template(String),
}

impl Phrased {
    pub fn text(&self) -> &str {
        match self {
            Phrased::Generated(t) | Phrased::Template(t) => t,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Phrased::Generated(t) | Phrased::Template(t) => t,
        }
    }
}

impl PhrasingService {
    pub fn new(config: PhrasingConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_millis(config.timeout_ms)) // HARD Timeout Enforcement (Network Level)
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    pub fn config(&self) -> &PhrasingConfig {
        &self.config
    }

    /// Never fails: any service problem degrades to the fixed template.
    /// Urgent referrals never wait on the network.
    pub async fn phrase(&self, action: &Action, transcript: &Transcript) -> Phrased {
        if matches!(action, Action::UrgentReferral(_)) {
            return Phrased::Template(render_template(action));
        }

        let budget = Duration::from_millis(self.config.timeout_ms);
        let result = match tokio::time::timeout(budget, self.generate(action, transcript)).await {
            Ok(r) => r,
            Err(_) => Err(PhrasingError::Timeout(self.config.timeout_ms)),
        };

        match result {
            Ok(text) => Phrased::Generated(text),
            Err(e) => {
                warn!("Phrasing fell back to template: {}", e);
                Phrased::Template(render_template(action))
            }
        }
    }

    pub async fn generate(&self, action: &Action, transcript: &Transcript) -> Result<String, PhrasingError> {
        let key = match self.config.api_key.as_deref() {
            Some(k) if !k.is_empty() => k,
            _ => return Err(PhrasingError::MissingKey),
        };

        let hint = instruction_for(action);
        let mut messages = vec![ChatMessage { role: "system", content: SYSTEM_PROMPT }];
        for turn in transcript.recent(CONTEXT_TURNS) {
            let role = match turn.speaker {
                Speaker::Patient => "user",
                Speaker::Assistant => "assistant",
            };
            messages.push(ChatMessage { role, content: &turn.text });
        }
        messages.push(ChatMessage { role: "system", content: &hint });

        let request_body = CompletionRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.config.base_url))
            .bearer_auth(key)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PhrasingError::Status(response.status()));
        }

        let payload: CompletionResponse = response.json().await?;
        payload
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(PhrasingError::EmptyReply)
    }
}

/// What the collaborator must produce. Carries field names and the summary record, never raw patient text.
pub fn instruction_for(action: &Action) -> String {
    match action {
        Action::AskField(field) => {
            let what = match field {
                Field::Complaint => "le motif principal de consultation",
                Field::Temperature => "la température mesurée en °C",
                Field::Duration => "depuis quand les symptômes ont commencé",
                Field::Symptoms => "les autres symptômes associés",
            };
            format!("Pose UNE seule question courte pour obtenir {}. Ne redemande rien de déjà répondu.", what)
        }
        Action::AskRedFlags => "Pose UNE seule question courte pour vérifier l'absence de signes de gravité \
             (difficulté à respirer, douleur thoracique, nuque raide, taches violettes, somnolence)."
            .to_string(),
        Action::EmitSummary(summary) => format!(
            "Remercie le patient et résume en deux phrases simples, sans diagnostic : {}",
            serde_json::to_string(summary).unwrap_or_default()
        ),
        Action::UrgentReferral(_) => "Demande au patient d'appeler immédiatement le 15.".to_string(),
    }
}
