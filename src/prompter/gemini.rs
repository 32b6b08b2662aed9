use super::completion::CompletionTransport;
use super::types::{
    non_blank, valid_timeout, ApiConfig, ApiError, GeminiContent, GeminiPart, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, StructuredRequest, Usage, DEFAULT_BASE_URL,
    DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
};

use async_trait::async_trait;
use std::time::{Duration, Instant};

const JSON_MIME: &str = "application/json";

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let provider = config.provider;

        let api_key = non_blank(provider.api_key).ok_or_else(|| ApiError::NoApiKey {
            provider: "gemini".to_string(),
        })?;

        let model = non_blank(provider.model)
            .map(|m| m.trim_start_matches("models/").to_string())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url = non_blank(provider.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout = valid_timeout(provider.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url,
            model,
        })
    }

    pub fn generate_content_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    pub async fn test_connection(&self) -> Result<(), ApiError> {
        let body = GenerateContentRequest {
            system_instruction: text_content(None, "You are a connectivity test. Reply with OK."),
            contents: vec![text_content(Some("user"), "ping")],
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: Some(1),
                response_mime_type: None,
                response_schema: None,
            },
        };

        self.post(&body).await?;
        Ok(())
    }

    async fn post(&self, body: &GenerateContentRequest) -> Result<GenerateContentResponse, ApiError> {
        let response = self
            .client
            .post(self.generate_content_url())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::ApiResponse {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl CompletionTransport for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    fn supports_response_schema(&self) -> bool {
        model_supports_schema(&self.model)
    }

    async fn generate_structured(&self, request: &StructuredRequest) -> Result<String, ApiError> {
        let body = build_request_body(request);

        let t0 = Instant::now();
        let resp = self.post(&body).await?;
        let (text, usage) = extract_reply(resp)?;

        tracing::debug!(
            model = %self.model,
            latency_ms = t0.elapsed().as_millis() as u64,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "gemini reply received"
        );

        Ok(text)
    }
}

/// Legacy 1.0 models reject `responseSchema`.
fn model_supports_schema(model: &str) -> bool {
    let m = model.trim().to_ascii_lowercase();
    !(m.starts_with("gemini-1.0") || m.starts_with("gemini-pro"))
}

fn text_content(role: Option<&str>, text: &str) -> GeminiContent {
    GeminiContent {
        role: role.map(str::to_string),
        parts: vec![GeminiPart {
            text: Some(text.to_string()),
        }],
    }
}

fn build_request_body(request: &StructuredRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        system_instruction: text_content(None, &request.system_instruction),
        contents: vec![text_content(Some("user"), &request.user_content)],
        generation_config: GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: None,
            response_mime_type: Some(JSON_MIME.to_string()),
            response_schema: Some(request.response_schema.clone()),
        },
    }
}

fn extract_reply(resp: GenerateContentResponse) -> Result<(String, Usage), ApiError> {
    let usage = resp.usage_metadata.map(Usage::from).unwrap_or_default();

    let text = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ApiError::EmptyReply);
    }

    Ok((text, usage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompter::prompts::response_schema;
    use crate::prompter::types::ProviderConfig;
    use serde_json::json;

    fn config(api_key: Option<&str>, model: Option<&str>) -> ApiConfig {
        ApiConfig {
            provider: ProviderConfig {
                api_key: api_key.map(str::to_string),
                model: model.map(str::to_string),
                ..Default::default()
            },
        }
    }

    #[test]
    fn missing_key_is_rejected() {
        let err = GeminiClient::new(config(Some("   "), None)).err().unwrap();
        assert!(matches!(err, ApiError::NoApiKey { .. }));
    }

    #[test]
    fn defaults_and_url() {
        let client = GeminiClient::new(config(Some("k"), None)).unwrap();
        assert_eq!(client.model(), DEFAULT_MODEL);
        assert_eq!(
            client.generate_content_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );

        let client = GeminiClient::new(config(Some("k"), Some("models/gemini-2.0-flash"))).unwrap();
        assert_eq!(client.model(), "gemini-2.0-flash");
    }

    #[test]
    fn schema_capability_by_model_family() {
        assert!(model_supports_schema("gemini-2.5-flash"));
        assert!(model_supports_schema("gemini-1.5-pro"));
        assert!(!model_supports_schema("gemini-1.0-pro"));
        assert!(!model_supports_schema("gemini-pro"));
    }

    #[test]
    fn request_body_wire_shape() {
        let request = StructuredRequest {
            system_instruction: "sys".to_string(),
            user_content: "User Idea: \"x\"".to_string(),
            response_schema: response_schema(),
            temperature: 0.7,
        };
        let body = serde_json::to_value(build_request_body(&request)).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "User Idea: \"x\"");
        assert_eq!(body["generationConfig"]["responseMimeType"], JSON_MIME);
        assert_eq!(body["generationConfig"]["responseSchema"], response_schema());
        assert!(body["generationConfig"].get("maxOutputTokens").is_none());
    }

    #[test]
    fn reply_text_joins_parts_and_reads_usage() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 34, "totalTokenCount": 46 }
        }))
        .unwrap();

        let (text, usage) = extract_reply(resp).unwrap();
        assert_eq!(text, "{\"a\":1}");
        assert_eq!(usage, Usage { input_tokens: 12, output_tokens: 34 });
    }

    #[test]
    fn missing_candidates_is_an_empty_reply() {
        let resp: GenerateContentResponse =
            serde_json::from_value(json!({ "promptFeedback": { "blockReason": "SAFETY" } })).unwrap();
        assert!(matches!(extract_reply(resp), Err(ApiError::EmptyReply)));
    }
}
