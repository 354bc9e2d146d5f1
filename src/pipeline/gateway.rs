//! LLM gateway: one prompt in, one text completion out.
//!
//! This module is intentionally thin — all prompt engineering lives in
//! [`crate::prompts`] so it can change without touching transport code here.
//!
//! The [`CompletionGateway`] trait is the seam the orchestrator is tested
//! through: stages receive the gateway as an injected collaborator, so tests
//! substitute a mock and assert on call counts without any network access.
//! The production implementation wraps an `edgequake_llm` provider resolved
//! once per session.
//!
//! There is deliberately no retry, no backoff, no streaming, and no timeout:
//! each stage issues exactly one request and blocks on it, and any transport
//! or service error propagates to the invoking stage unhandled.

use crate::config::AnalysisConfig;
use crate::error::BiasScopeError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// The external completion-service boundary.
///
/// `max_output_tokens` is the per-stage response ceiling; callers pass the
/// ceiling appropriate to their stage rather than a global constant. When
/// `image` is supplied the request carries the instructional text and the
/// inline base64 payload in one user message.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        max_output_tokens: usize,
        image: Option<ImageData>,
    ) -> Result<String, BiasScopeError>;
}

/// Production gateway backed by an `edgequake_llm` provider.
pub struct LlmGateway {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
}

impl LlmGateway {
    /// Resolve the provider from the config and wrap it.
    ///
    /// Fails with [`BiasScopeError::ProviderNotConfigured`] when no usable
    /// credential is found — before any stage runs, so a missing API key is
    /// a startup condition rather than a mid-pipeline surprise.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, BiasScopeError> {
        let provider = resolve_provider(config)?;
        Ok(Self {
            provider,
            temperature: config.temperature,
        })
    }

    /// Wrap a pre-built provider (used when the caller constructed one with
    /// custom middleware).
    pub fn new(provider: Arc<dyn LLMProvider>, temperature: f32) -> Self {
        Self {
            provider,
            temperature,
        }
    }
}

#[async_trait]
impl CompletionGateway for LlmGateway {
    async fn complete(
        &self,
        prompt: &str,
        max_output_tokens: usize,
        image: Option<ImageData>,
    ) -> Result<String, BiasScopeError> {
        let start = Instant::now();

        let messages = match image {
            Some(image) => vec![ChatMessage::user_with_images(prompt, vec![image])],
            None => vec![ChatMessage::user(prompt)],
        };
        let options = completion_options(self.temperature, max_output_tokens);

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| BiasScopeError::LlmApiError {
                message: format!("{}", e),
            })?;

        debug!(
            "Completion: {} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        Ok(response.content)
    }
}

/// Build `CompletionOptions` for one call.
fn completion_options(temperature: f32, max_tokens: usize) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(temperature),
        max_tokens: Some(max_tokens),
        ..Default::default()
    }
}

/// Read an extracted image file and wrap it as an inline base64 payload.
pub fn load_image_data(path: &Path) -> Result<ImageData, BiasScopeError> {
    let bytes = std::fs::read(path).map_err(|e| BiasScopeError::ArtifactReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    let b64 = STANDARD.encode(&bytes);
    debug!("Encoded {} → {} bytes base64", path.display(), b64.len());
    Ok(ImageData::new(b64, "image/png"))
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// The four-level fallback chain lets library users and CLI users each set
/// exactly as much or as little as they need:
///
/// 1. **Pre-built provider** (`config.provider`) — the caller constructed and
///    configured the provider entirely; we use it as-is.
///
/// 2. **Named provider + model** (`config.provider_name`) — the factory reads
///    the corresponding API key (`OPENAI_API_KEY`, etc.) from the environment.
///
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`) —
///    a provider and model chosen at the execution-environment level
///    (Makefile, shell script, CI). Checked before full auto-detection so the
///    model choice is honoured even when multiple API keys are present.
///
/// 4. **Full auto-detection** (`ProviderFactory::from_env`) — the factory
///    scans all known API key variables and picks the first available
///    provider, preferring OpenAI when its key is present.
fn resolve_provider(config: &AnalysisConfig) -> Result<Arc<dyn LLMProvider>, BiasScopeError> {
    // 1) User-provided provider takes priority
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    // 2) Provider name + model
    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or("gpt-4o-mini");
        return create_provider(name, model);
    }

    // 3) Environment pair
    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    // Prefer OpenAI explicitly when an OpenAI API key is present, so users
    // with multiple provider keys get a predictable default.
    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or("gpt-4o-mini");
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| BiasScopeError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

/// Instantiate a named provider with the given model.
fn create_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, BiasScopeError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        BiasScopeError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_carry_stage_ceiling() {
        let opts = completion_options(0.2, 650);
        assert_eq!(opts.temperature, Some(0.2));
        assert_eq!(opts.max_tokens, Some(650));
    }

    #[test]
    fn load_image_data_encodes_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image1.png");
        std::fs::write(&path, b"fake png bytes").unwrap();

        let data = load_image_data(&path).unwrap();
        assert_eq!(data.mime_type, "image/png");
        assert_eq!(STANDARD.decode(&data.data).unwrap(), b"fake png bytes");
    }

    #[test]
    fn load_image_data_missing_file_is_reported() {
        let err = load_image_data(Path::new("/no/such/image1.png")).unwrap_err();
        assert!(matches!(err, BiasScopeError::ArtifactReadFailed { .. }));
    }
}
