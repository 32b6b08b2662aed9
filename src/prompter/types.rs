use super::languages::{self, Language, NO_TRANSLATION};

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PromptStyle {
    #[default]
    Standard,
    Constructive,
}

impl PromptStyle {
    pub fn label(&self) -> &'static str {
        match self {
            PromptStyle::Standard => "Standard",
            PromptStyle::Constructive => "Constructive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetLanguage {
    None,
    Translate(&'static Language),
}

impl TargetLanguage {
    pub fn from_code(code: &str) -> Result<Self, ValidationError> {
        match languages::find_language(code) {
            Some(lang) if lang.code == NO_TRANSLATION => Ok(TargetLanguage::None),
            Some(lang) => Ok(TargetLanguage::Translate(lang)),
            None => Err(ValidationError::UnsupportedLanguage(code.trim().to_string())),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            TargetLanguage::None => NO_TRANSLATION,
            TargetLanguage::Translate(lang) => lang.code,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, TargetLanguage::None)
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Structured reply from the model. Field names are the wire names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompletionResult {
    #[serde(rename = "detectedLanguage")]
    pub detected_language: String,
    #[serde(rename = "constructiveEnglishPrompt")]
    pub refined_prompt: String,
    #[serde(rename = "translatedPrompt")]
    pub translated_prompt: String,
}

/// Everything the transport needs for one structured completion.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    pub system_instruction: String,
    pub user_content: String,
    pub response_schema: serde_json::Value,
    pub temperature: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Per-request overrides sent by the UI. Blank fields fall back to the environment.
/// Sampling temperature is fixed, so an override for it is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ProviderConfig {
    /// Fill every blank field of `self` from `fallback`.
    pub fn or(self, fallback: ProviderConfig) -> ProviderConfig {
        ProviderConfig {
            api_key: non_blank(self.api_key).or_else(|| non_blank(fallback.api_key)),
            base_url: non_blank(self.base_url).or_else(|| non_blank(fallback.base_url)),
            model: non_blank(self.model).or_else(|| non_blank(fallback.model)),
            timeout_secs: valid_timeout(self.timeout_secs).or(valid_timeout(fallback.timeout_secs)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    pub provider: ProviderConfig,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        // A missing .env file is the normal case
        let _ = dotenvy::dotenv();

        let provider = ProviderConfig {
            api_key: env_var("GEMINI_API_KEY").or_else(|| env_var("API_KEY")),
            base_url: env_var("PROMPTER_BASE_URL"),
            model: env_var("PROMPTER_MODEL"),
            timeout_secs: env_var("PROMPTER_TIMEOUT_SECS").and_then(|s| parse_timeout_secs(&s)),
        };

        Self { provider }
    }

    /// Environment config with the UI's overrides layered on top.
    pub fn with_overrides(overrides: Option<ProviderConfig>) -> Self {
        let env = Self::from_env();
        match overrides {
            Some(o) => Self {
                provider: o.or(env.provider),
            },
            None => env,
        }
    }
}

/// Zero would make every request time out immediately.
pub(crate) fn valid_timeout(secs: Option<u64>) -> Option<u64> {
    secs.filter(|s| *s > 0)
}

fn parse_timeout_secs(raw: &str) -> Option<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => {
            tracing::warn!("PROMPTER_TIMEOUT_SECS is 0; using the default of {DEFAULT_TIMEOUT_SECS}s");
            None
        }
        Ok(secs) => Some(secs),
        Err(e) => {
            tracing::warn!(value = raw, error = %e, "PROMPTER_TIMEOUT_SECS is not a number; using the default of {DEFAULT_TIMEOUT_SECS}s");
            None
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    non_blank(std::env::var(key).ok())
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let t = v.trim().to_string();
        if t.is_empty() { None } else { Some(t) }
    })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter your idea first.")]
    EmptyIdea,

    #[error("Input cannot exceed {max} words.")]
    TooManyWords { count: usize, max: usize },

    #[error("Unsupported target language: {0}")]
    UnsupportedLanguage(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No API key set for provider: {provider}")]
    NoApiKey { provider: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned error: {status} — {message}")]
    ApiResponse { status: u16, message: String },

    #[error("Model returned no text")]
    EmptyReply,

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Response does not match schema: {0}")]
    SchemaViolation(String),

    #[error("Model {model} cannot enforce a JSON response schema")]
    SchemaUnsupported { model: String },
}

/// What the caller sees. `Display` is the message shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("Failed to generate prompt: {0}")]
    Failed(#[from] ApiError),

    #[error("An unknown error occurred while generating the prompt.")]
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub system_instruction: GeminiContent,
    pub contents: Vec<GeminiContent>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct GeminiPart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl From<UsageMetadata> for Usage {
    fn from(u: UsageMetadata) -> Self {
        Self {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        }
    }
}
