use super::prompts;
use super::types::{
    ApiError, CompletionResult, GenerationError, PromptStyle, StructuredRequest, TargetLanguage,
    DEFAULT_TEMPERATURE,
};
use super::validation::{validate_idea_input, IdeaInput};

use async_trait::async_trait;
use std::time::Instant;

/// One structured-output call against a hosted model.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    fn model(&self) -> &str;

    /// Whether the model can be held to a JSON response schema.
    fn supports_response_schema(&self) -> bool;

    /// Returns the raw reply text.
    async fn generate_structured(&self, request: &StructuredRequest) -> Result<String, ApiError>;
}

pub struct CompletionClient<T> {
    transport: T,
}

impl<T: CompletionTransport> CompletionClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_request(
        &self,
        idea: &str,
        target: &TargetLanguage,
        style: PromptStyle,
    ) -> StructuredRequest {
        StructuredRequest {
            system_instruction: prompts::system_instruction(style, target),
            user_content: prompts::user_content(idea, target),
            response_schema: prompts::response_schema(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Single request/response round trip. No retry.
    pub async fn complete(
        &self,
        idea: &str,
        target: &TargetLanguage,
        style: PromptStyle,
    ) -> Result<CompletionResult, ApiError> {
        let model = self.transport.model();
        if !self.transport.supports_response_schema() {
            tracing::warn!(model, "model cannot enforce a response schema; refusing request");
            return Err(ApiError::SchemaUnsupported {
                model: model.to_string(),
            });
        }

        let request = self.build_request(idea, target, style);

        tracing::info!(model, style = style.label(), target = %target, "generating prompt");
        let t0 = Instant::now();

        let raw = self.transport.generate_structured(&request).await.map_err(|e| {
            tracing::error!(model, error = %e, "completion request failed");
            e
        })?;

        let result = parse_completion(&raw, target).map_err(|e| {
            tracing::error!(model, error = %e, "completion reply rejected");
            e
        })?;

        tracing::info!(
            model,
            latency_ms = t0.elapsed().as_millis() as u64,
            detected_language = %result.detected_language,
            "prompt generated"
        );

        Ok(result)
    }
}

/// Caller-facing entry point: validate, then one completion.
pub async fn generate_prompt<T: CompletionTransport>(
    client: &CompletionClient<T>,
    idea: &str,
    target_code: &str,
    style: PromptStyle,
) -> Result<CompletionResult, GenerationError> {
    let input = IdeaInput {
        idea: idea.to_string(),
        target_language: target_code.to_string(),
    };
    let target = validate_idea_input(&input)?;

    Ok(client.complete(idea, &target, style).await?)
}

/// Strict parse of the model reply. All three fields must be present strings.
pub fn parse_completion(raw: &str, target: &TargetLanguage) -> Result<CompletionResult, ApiError> {
    let cleaned = strip_code_fence(raw.trim());

    let result: CompletionResult = serde_json::from_str(cleaned).map_err(|e| {
        if e.is_data() {
            ApiError::SchemaViolation(e.to_string())
        } else {
            ApiError::Parse(format!("JSON parse: {} | output: {}", e, excerpt(cleaned)))
        }
    })?;

    if target.is_none() && !result.translated_prompt.is_empty() {
        return Err(ApiError::SchemaViolation(
            "translatedPrompt must be empty when no translation was requested".to_string(),
        ));
    }

    Ok(result)
}

fn strip_code_fence(text: &str) -> &str {
    match text.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => text,
    }
}

fn excerpt(text: &str) -> String {
    const MAX: usize = 800;
    if text.chars().count() > MAX {
        format!("{}…", text.chars().take(MAX).collect::<String>())
    } else {
        text.to_string()
    }
}
