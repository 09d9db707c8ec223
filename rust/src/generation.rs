use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::{info, warn};

use crate::config_store::ConfigStore;
use crate::error::AppError;

pub const NO_RESULT: &str = "No result";

pub const ENDPOINT_ENV: &str = "PAGECRAFT_ENDPOINT";
pub const MODE_ENV: &str = "PAGECRAFT_MODE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    #[default]
    Backend,
    Direct,
}

impl EndpointKind {
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim();
        if value.eq_ignore_ascii_case("backend") {
            Some(Self::Backend)
        } else if value.eq_ignore_ascii_case("direct") {
            Some(Self::Direct)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backend => "backend",
            Self::Direct => "direct",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    pub kind: EndpointKind,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl GenerationSettings {
    // Environment values win over the file.
    pub fn resolve<F>(config: &ConfigStore, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            env(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let kind = match non_empty(MODE_ENV) {
            Some(raw) => EndpointKind::parse(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "ignoring unknown {MODE_ENV}");
                config.endpoint_kind()
            }),
            None => config.endpoint_kind(),
        };

        Self {
            kind,
            endpoint: non_empty(ENDPOINT_ENV).unwrap_or_else(|| config.endpoint()),
            model: config.model(),
            api_key: non_empty(&config.api_key_env()),
        }
    }
}

#[derive(Debug, Serialize)]
struct BackendRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Clone)]
pub struct GenerationClient {
    client: Client,
    settings: GenerationSettings,
}

impl GenerationClient {
    pub fn new(settings: GenerationSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let started = Instant::now();
        let request = self.client.post(&self.settings.endpoint);
        let request = match self.settings.kind {
            EndpointKind::Backend => {
                let request = request.json(&BackendRequest { prompt });
                match self.settings.api_key.as_deref() {
                    Some(key) => request.bearer_auth(key),
                    None => request,
                }
            }
            EndpointKind::Direct => {
                let Some(key) = self.settings.api_key.as_deref() else {
                    warn!("direct endpoint configured without an API key");
                    return Err(AppError::Auth);
                };
                request.bearer_auth(key).json(&ChatRequest {
                    model: &self.settings.model,
                    messages: vec![ChatMessage {
                        role: "user",
                        content: prompt,
                    }],
                })
            }
        };
        info!(
            kind = self.settings.kind.as_str(),
            endpoint = %self.settings.endpoint,
            "generation started"
        );

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    error = %err,
                    endpoint = %self.settings.endpoint,
                    "generation request failed"
                );
                return Err(AppError::Transport);
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, %status, "failed to read generation response");
                return Err(AppError::Transport);
            }
        };
        let body = parse_body(&text);

        let outcome = if status.is_success() {
            normalize_response(&body)
        } else {
            Err(classify_failure(status, &body))
        };

        match &outcome {
            Ok(document) => info!(
                %status,
                bytes = document.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "generation finished"
            ),
            Err(err) => warn!(
                %status,
                error = %err,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "generation failed"
            ),
        }
        outcome
    }
}

// Non-JSON bodies are kept as a JSON string.
pub fn parse_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

pub fn classify_failure(status: StatusCode, body: &Value) -> AppError {
    if status == StatusCode::UNAUTHORIZED {
        return AppError::Auth;
    }
    match structured_error(body) {
        Some(message) => AppError::GenerationFailed(message),
        None => AppError::Transport,
    }
}

// An `error` field wins, then the success shapes in order, then a bare string,
// then pretty JSON.
pub fn normalize_response(body: &Value) -> Result<String, AppError> {
    if let Some(message) = structured_error(body) {
        return Err(AppError::GenerationFailed(message));
    }

    let extracted = SUCCESS_PATHS
        .iter()
        .find_map(|path| lookup_text(body, path))
        .map(ToOwned::to_owned)
        .or_else(|| body.as_str().map(ToOwned::to_owned))
        .unwrap_or_else(|| serde_json::to_string_pretty(body).unwrap_or_default());

    if extracted.is_empty() {
        Ok(NO_RESULT.to_string())
    } else {
        Ok(extracted)
    }
}

#[derive(Clone, Copy)]
enum Step {
    Key(&'static str),
    Index(usize),
}

const SUCCESS_PATHS: [&[Step]; 4] = [
    // chat completion
    &[
        Step::Key("choices"),
        Step::Index(0),
        Step::Key("message"),
        Step::Key("content"),
    ],
    // text completion
    &[Step::Key("choices"), Step::Index(0), Step::Key("text")],
    &[Step::Key("generated_text")],
    &[
        Step::Key("output"),
        Step::Index(0),
        Step::Key("content"),
        Step::Index(0),
        Step::Key("text"),
    ],
];

fn lookup_text<'a>(body: &'a Value, path: &[Step]) -> Option<&'a str> {
    let mut current = body;
    for step in path {
        current = match step {
            Step::Key(key) => current.get(*key)?,
            Step::Index(index) => current.get(*index)?,
        };
    }
    current.as_str().filter(|text| !text.is_empty())
}

fn structured_error(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    if !is_truthy(error) {
        return None;
    }
    let message = error
        .get("message")
        .filter(|message| is_truthy(message))
        .unwrap_or(error);
    Some(match message {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}
