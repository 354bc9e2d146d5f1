//! Configuration types for a bias-analysis session.
//!
//! All pipeline behaviour is controlled through [`AnalysisConfig`], built via
//! its [`AnalysisConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share a config across stages, log it, and diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::BiasScopeError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for one analysis session.
///
/// Built via [`AnalysisConfig::builder()`] or [`AnalysisConfig::default()`].
///
/// # Example
/// ```rust
/// use biascope::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .model("gpt-4o-mini")
///     .workdir("/tmp/biascope")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// LLM model identifier, e.g. "gpt-4o-mini". If None, uses provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is auto-detected from the
    /// environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for every completion. Default: 0.2.
    ///
    /// The pipeline asks the model to restate and mark up existing article
    /// text far more than to write free prose; a low temperature keeps the
    /// quoted phrases verbatim so highlight spans land on real text.
    pub temperature: f32,

    /// Working directory for persisted artifacts (`article.txt`,
    /// `trigger_phrases.txt`, `explanation.txt`, extracted images).
    /// Default: the current directory.
    pub workdir: PathBuf,

    /// Token ceiling for the bias-analysis stage. Default: 650.
    ///
    /// Ceilings differ per stage so each call's cost and latency are bounded
    /// by what the stage actually produces: five short category paragraphs
    /// need far fewer tokens than a fully marked-up article body.
    pub analysis_max_tokens: usize,

    /// Token ceiling for the scoring stage. Default: 650.
    pub score_max_tokens: usize,

    /// Token ceiling for the trigger-extraction stage. Default: 300.
    pub trigger_max_tokens: usize,

    /// Token ceiling for the per-category and annotated highlighting stages.
    /// Default: 3000 — the response carries the entire article body back.
    pub highlight_max_tokens: usize,

    /// Token ceiling for the explanation-summary stage. Default: 500.
    pub summary_max_tokens: usize,

    /// Token ceiling for one image caption. Default: 200.
    pub caption_max_tokens: usize,

    /// Download timeout for URL inputs in seconds. Default: 120.
    ///
    /// Gateway calls themselves carry no timeout: a hung completion blocks
    /// the invoking stage until the provider answers or the connection dies.
    pub download_timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.2,
            workdir: PathBuf::from("."),
            analysis_max_tokens: 650,
            score_max_tokens: 650,
            trigger_max_tokens: 300,
            highlight_max_tokens: 3000,
            summary_max_tokens: 500,
            caption_max_tokens: 200,
            download_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("workdir", &self.workdir)
            .field("analysis_max_tokens", &self.analysis_max_tokens)
            .field("score_max_tokens", &self.score_max_tokens)
            .field("trigger_max_tokens", &self.trigger_max_tokens)
            .field("highlight_max_tokens", &self.highlight_max_tokens)
            .field("summary_max_tokens", &self.summary_max_tokens)
            .field("caption_max_tokens", &self.caption_max_tokens)
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.workdir = dir.into();
        self
    }

    pub fn analysis_max_tokens(mut self, n: usize) -> Self {
        self.config.analysis_max_tokens = n;
        self
    }

    pub fn score_max_tokens(mut self, n: usize) -> Self {
        self.config.score_max_tokens = n;
        self
    }

    pub fn trigger_max_tokens(mut self, n: usize) -> Self {
        self.config.trigger_max_tokens = n;
        self
    }

    pub fn highlight_max_tokens(mut self, n: usize) -> Self {
        self.config.highlight_max_tokens = n;
        self
    }

    pub fn summary_max_tokens(mut self, n: usize) -> Self {
        self.config.summary_max_tokens = n;
        self
    }

    pub fn caption_max_tokens(mut self, n: usize) -> Self {
        self.config.caption_max_tokens = n;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, BiasScopeError> {
        let c = &self.config;
        for (name, ceiling) in [
            ("analysis_max_tokens", c.analysis_max_tokens),
            ("score_max_tokens", c.score_max_tokens),
            ("trigger_max_tokens", c.trigger_max_tokens),
            ("highlight_max_tokens", c.highlight_max_tokens),
            ("summary_max_tokens", c.summary_max_tokens),
            ("caption_max_tokens", c.caption_max_tokens),
        ] {
            if ceiling == 0 {
                return Err(BiasScopeError::InvalidConfig(format!(
                    "{name} must be ≥ 1"
                )));
            }
        }
        Ok(self.config)
    }
}
