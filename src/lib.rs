pub mod prompter;

pub use prompter::completion::{generate_prompt, parse_completion, CompletionClient, CompletionTransport};
pub use prompter::gemini::GeminiClient;
pub use prompter::languages::{supported_languages, Language};
pub use prompter::types::{
    ApiConfig, ApiError, CompletionResult, GenerationError, PromptStyle, ProviderConfig,
    TargetLanguage, ValidationError,
};
pub use prompter::validation::{count_words, MAX_WORDS};

#[cfg(feature = "desktop")]
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
#[cfg(feature = "desktop")]
use std::time::Instant;

#[cfg(feature = "desktop")]
use serde::Serialize;

/// Installs the global `tracing` subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// App-wide busy flag: one generation at a time across all windows. A second submit is rejected, not queued.
#[cfg(feature = "desktop")]
#[derive(Default)]
struct GenerationState {
    busy: Arc<AtomicBool>,
}

#[cfg(feature = "desktop")]
struct BusyGuard(Arc<AtomicBool>);

#[cfg(feature = "desktop")]
impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(feature = "desktop")]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct WordCount {
    count: usize,
    max: usize,
}

#[cfg(feature = "desktop")]
#[tauri::command]
async fn prompter_generate(
    state: tauri::State<'_, GenerationState>,
    idea: String,
    target_language: String,
    prompt_style: PromptStyle,
    provider: Option<ProviderConfig>,
) -> Result<CompletionResult, String> {
    if state.busy.swap(true, Ordering::AcqRel) {
        return Err("A prompt is already being generated.".to_string());
    }
    let _guard = BusyGuard(state.busy.clone());

    let task = tauri::async_runtime::spawn(async move {
        let client = GeminiClient::new(ApiConfig::with_overrides(provider))
            .map_err(GenerationError::from)?;
        let client = CompletionClient::new(client);
        generate_prompt(&client, &idea, &target_language, prompt_style).await
    });

    let outcome = match task.await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "generation task aborted");
            Err(GenerationError::Unknown)
        }
    };

    outcome.map_err(|e| e.to_string())
}

#[cfg(feature = "desktop")]
#[tauri::command]
fn prompter_list_languages() -> Vec<Language> {
    supported_languages().to_vec()
}

#[cfg(feature = "desktop")]
#[tauri::command]
fn prompter_count_words(text: String) -> WordCount {
    WordCount {
        count: count_words(&text),
        max: MAX_WORDS,
    }
}

#[cfg(feature = "desktop")]
#[tauri::command]
async fn prompter_test_provider(provider: Option<ProviderConfig>) -> Result<String, String> {
    let client = GeminiClient::new(ApiConfig::with_overrides(provider)).map_err(|e| e.to_string())?;

    let t0 = Instant::now();
    client.test_connection().await.map_err(|e| e.to_string())?;
    let ms = t0.elapsed().as_millis();

    Ok(format!(
        "provider: gemini\nendpoint: {}\nmodel: {}\nschema: {}\nlatencyMs: {}",
        client.generate_content_url(),
        client.model(),
        if client.supports_response_schema() { "enforced" } else { "unsupported" },
        ms
    ))
}

#[cfg(feature = "desktop")]
pub fn run() {
    init_logging();

    tauri::Builder::default()
        .manage(GenerationState::default())
        .invoke_handler(tauri::generate_handler![
            prompter_generate,
            prompter_list_languages,
            prompter_count_words,
            prompter_test_provider,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
