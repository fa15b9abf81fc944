use crate::models::Dialogue;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    /// The selected backend has no credential configured. Callers treat this
    /// as "skip generation", not as a failed run.
    #[error("{var} environment variable not set")]
    MissingApiKey { var: &'static str },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The reply could not be decoded against the declared dialogue shape.
    #[error("response did not match the dialogue schema: {0}")]
    SchemaViolation(String),
}

/// Endpoint, model and credential source for one chat-completions backend.
pub struct BackendConfig {
    pub base_url: &'static str,
    pub model: &'static str,
    pub api_key_var: &'static str,
}

impl BackendConfig {
    pub fn openai() -> Self {
        Self {
            base_url: "https://api.openai.com/v1",
            model: "gpt-4o",
            api_key_var: "OPENAI_API_KEY",
        }
    }

    /// Gemini through its OpenAI-compatible endpoint, so both backends share
    /// one wire format.
    pub fn gemini() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai",
            model: "gemini-1.5-pro",
            api_key_var: "GEMINI_API_KEY",
        }
    }
}

/// Prompt pair sent to the service.
pub struct DialogueRequest {
    pub system: String,
    pub prompt: String,
}

/// Capability of producing a structured dialogue from a prompt.
pub trait DialogueService {
    fn generate(&self, request: &DialogueRequest) -> Result<Dialogue, GenerateError>;
}

/// Chat-completions client for any [`BackendConfig`].
pub struct ChatCompletions {
    config: BackendConfig,
    api_key: String,
    client: Client,
}

impl ChatCompletions {
    /// Fails with [`GenerateError::MissingApiKey`] when the backend's
    /// credential environment variable is unset or empty.
    pub fn new(config: BackendConfig) -> Result<Self, GenerateError> {
        let api_key = env::var(config.api_key_var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GenerateError::MissingApiKey {
                var: config.api_key_var,
            })?;
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            config,
            api_key,
            client,
        })
    }
}

impl DialogueService for ChatCompletions {
    fn generate(&self, request: &DialogueRequest) -> Result<Dialogue, GenerateError> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.prompt },
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "dialogue",
                    "strict": true,
                    "schema": dialogue_schema(),
                },
            },
        });
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(self.api_key.trim())
            .json(&body)
            .send()?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(GenerateError::Api { status, body });
        }
        let parsed: ChatResponse = resp
            .json()
            .map_err(|e| GenerateError::SchemaViolation(e.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| GenerateError::SchemaViolation("reply contained no choices".into()))?;
        parse_dialogue(&content)
    }
}

/// JSON schema declared to the service: ordered lines, each with a speaker
/// tag, source sentence and target translation.
fn dialogue_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "lines": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "speaker": {
                            "type": "string",
                            "description": "Speaker identifier (A or B)",
                        },
                        "source": { "type": "string" },
                        "target": { "type": "string" },
                    },
                    "required": ["speaker", "source", "target"],
                    "additionalProperties": false,
                },
            },
        },
        "required": ["lines"],
        "additionalProperties": false,
    })
}

/// Decodes the message content into a [`Dialogue`], failing closed on any
/// shape mismatch.
pub fn parse_dialogue(content: &str) -> Result<Dialogue, GenerateError> {
    serde_json::from_str(content).map_err(|e| GenerateError::SchemaViolation(e.to_string()))
}

/// Flattens a dialogue into the persisted text form, one turn per line,
/// in the order the service returned them.
pub fn flatten(dialogue: &Dialogue) -> String {
    dialogue
        .lines
        .iter()
        .map(|line| format!("{}: {} [{}]", line.speaker, line.source, line.target))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

#[test]
fn test_parse_dialogue_accepts_declared_shape() {
    let content = r#"{"lines":[
        {"speaker":"A","source":"Wie geht es dir?","target":"Jak się masz?"},
        {"speaker":"B","source":"Gut, danke.","target":"Dobrze, dziękuję."}
    ]}"#;
    let dialogue = parse_dialogue(content).unwrap();

    assert_eq!(dialogue.lines.len(), 2);
    assert_eq!(dialogue.lines[0].speaker, "A");
    assert_eq!(dialogue.lines[1].target, "Dobrze, dziękuję.");
}

#[test]
fn test_parse_dialogue_rejects_missing_fields() {
    let content = r#"{"lines":[{"speaker":"A","source":"Hallo"}]}"#;
    let result = parse_dialogue(content);

    assert!(matches!(result, Err(GenerateError::SchemaViolation(_))));
}

#[test]
fn test_parse_dialogue_rejects_free_form_text() {
    let result = parse_dialogue("A: Hallo [Cześć]\nB: Tschüss [Pa]");
    assert!(matches!(result, Err(GenerateError::SchemaViolation(_))));
}

#[test]
fn test_flatten_preserves_turn_order() {
    use crate::models::DialogueLine;

    let dialogue = Dialogue {
        lines: vec![
            DialogueLine {
                speaker: "A".to_string(),
                source: "Hallo".to_string(),
                target: "Cześć".to_string(),
            },
            DialogueLine {
                speaker: "B".to_string(),
                source: "Tschüss".to_string(),
                target: "Pa".to_string(),
            },
        ],
    };
    assert_eq!(flatten(&dialogue), "A: Hallo [Cześć]\nB: Tschüss [Pa]");
}

#[test]
fn test_missing_credential_is_typed() {
    let config = BackendConfig {
        base_url: "https://example.invalid/v1",
        model: "test",
        api_key_var: "KARTEI_TEST_UNSET_KEY",
    };
    let result = ChatCompletions::new(config);

    assert!(matches!(
        result,
        Err(GenerateError::MissingApiKey {
            var: "KARTEI_TEST_UNSET_KEY"
        })
    ));
}
