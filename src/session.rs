//! The pipeline orchestrator: one imported document, a fixed stage order,
//! every stage gated on its prerequisite.
//!
//! ## State machine
//!
//! ```text
//! Imported ──▶ TextExtracted ──▶ Analyzed ──▶ { Scored, TriggersExtracted }
//!    │               │
//!    │               └──▶ Highlighted(category) ──▶ Summarized
//!    └──▶ ImagesCaptioned
//! ```
//!
//! A stage invoked before its prerequisite is rejected with
//! [`BiasScopeError::StageNotReady`] — never skipped, never run on invented
//! input. The analysis result lives only in memory on the session; the
//! article text, trigger phrases, and explanation go through the
//! [`ArtifactStore`] so the annotated view (and a later session on the same
//! working directory) can re-read them.
//!
//! Stages run strictly one at a time: each gateway call is awaited to
//! completion before anything else happens, and image captioning walks the
//! extracted images sequentially in ordinal order.

use crate::artifacts::{ArtifactKind, ArtifactStore};
use crate::category::BiasCategory;
use crate::config::AnalysisConfig;
use crate::error::BiasScopeError;
use crate::pipeline::extract::{self, DocumentInfo};
use crate::pipeline::gateway::{self, CompletionGateway, LlmGateway};
use crate::pipeline::input::{self, ResolvedInput};
use crate::pipeline::{score, split};
use crate::prompts;
use crate::report::{Highlight, ImageCaption, SessionReport};
use std::sync::Arc;
use tracing::{debug, info};

/// One document's analysis session.
pub struct AnalysisSession {
    config: AnalysisConfig,
    gateway: Arc<dyn CompletionGateway>,
    store: ArtifactStore,
    source: Option<ResolvedInput>,
    /// Held in memory for the session only; deliberately never persisted.
    analysis: Option<String>,
    report: SessionReport,
}

impl AnalysisSession {
    /// Create a session with a provider resolved from the config.
    ///
    /// Fails immediately when no provider credential is available: every
    /// stage except import/extraction reaches the gateway, so a missing key
    /// is a startup condition.
    pub fn new(config: AnalysisConfig) -> Result<Self, BiasScopeError> {
        let gateway = LlmGateway::from_config(&config)?;
        Ok(Self::with_gateway(config, Arc::new(gateway)))
    }

    /// Create a session with an injected gateway (tests substitute a mock
    /// here; embedders can wrap the production gateway with middleware).
    pub fn with_gateway(config: AnalysisConfig, gateway: Arc<dyn CompletionGateway>) -> Self {
        let store = ArtifactStore::persistent(config.workdir.clone());
        Self {
            config,
            gateway,
            store,
            source: None,
            analysis: None,
            report: SessionReport::default(),
        }
    }

    /// Import a document: resolve the path or URL and validate it is a PDF.
    pub async fn import(&mut self, input: &str) -> Result<(), BiasScopeError> {
        let resolved = input::resolve_input(input, self.config.download_timeout_secs).await?;
        info!("Imported {}", resolved.path().display());
        self.report.source = Some(input.to_string());
        self.source = Some(resolved);
        Ok(())
    }

    /// Extract the article's plain text and persist it as the article
    /// artifact. Requires an imported document.
    pub async fn extract_text(&mut self) -> Result<String, BiasScopeError> {
        let source = self.source.as_ref().ok_or(BiasScopeError::StageNotReady {
            stage: "text extraction",
            hint: "import a PDF first",
        })?;
        let text = extract::extract_text(source.path()).await?;
        self.store.put(ArtifactKind::ArticleText, text.clone())?;
        Ok(text)
    }

    /// Run the bias analysis over the extracted article text.
    ///
    /// The result is the context for scoring and trigger extraction; it is
    /// held in memory on the session and never written to disk.
    pub async fn analyze(&mut self) -> Result<String, BiasScopeError> {
        let article = self.article_text("bias analysis")?;
        debug!("Running bias analysis ({} chars of article)", article.len());

        let prompt = prompts::analysis_prompt(&article);
        let response = self
            .gateway
            .complete(&prompt, self.config.analysis_max_tokens, None)
            .await?;

        self.analysis = Some(response.clone());
        self.report.analysis = Some(response.clone());
        Ok(response)
    }

    /// Score the severity of the detected bias. Requires a prior analysis.
    ///
    /// The fixed `Score: N/10` line in the response is recoloured in place
    /// (red at 5 and above, green below); an unrecognised response is
    /// returned unmodified.
    pub async fn score(&mut self) -> Result<String, BiasScopeError> {
        let analysis = self
            .analysis
            .clone()
            .ok_or(BiasScopeError::StageNotReady {
                stage: "bias score",
                hint: "run the bias analysis first",
            })?;
        let article = self.article_text("bias score")?;

        let prompt = prompts::score_prompt(&analysis, &article);
        let response = self
            .gateway
            .complete(&prompt, self.config.score_max_tokens, None)
            .await?;

        let colored = score::recolor_score(response.trim());
        self.report.score = Some(colored.clone());
        Ok(colored)
    }

    /// Extract three trigger phrases supporting the analysis and persist
    /// them for the annotated view. Requires a prior analysis.
    pub async fn triggers(&mut self) -> Result<String, BiasScopeError> {
        let analysis = self
            .analysis
            .clone()
            .ok_or(BiasScopeError::StageNotReady {
                stage: "trigger phrases",
                hint: "run the bias analysis first",
            })?;
        let article = self.article_text("trigger phrases")?;

        let prompt = prompts::trigger_prompt(&analysis, &article);
        let response = self
            .gateway
            .complete(&prompt, self.config.trigger_max_tokens, None)
            .await?;

        self.store
            .put(ArtifactKind::TriggerPhrases, response.clone())?;
        self.report.triggers = Some(response.clone());
        Ok(response)
    }

    /// Highlight two phrases of one bias category across the article.
    ///
    /// The response is fence-stripped and split into article body and
    /// explanation; the explanation overwrites the explanation artifact
    /// (last-writer-wins across categories) and is summarised immediately
    /// when non-empty.
    pub async fn highlight(
        &mut self,
        category: BiasCategory,
    ) -> Result<Highlight, BiasScopeError> {
        let article = self.article_text("category highlighting")?;
        info!("Highlighting {}", category);

        let prompt = prompts::highlight_prompt(category, &article);
        let raw = self
            .gateway
            .complete(&prompt, self.config.highlight_max_tokens, None)
            .await?;

        let stripped = split::strip_code_fences(&raw);
        let parts = split::split_article_and_explanation(&stripped);
        self.store
            .put(ArtifactKind::Explanation, parts.explanation.clone())?;

        let summary = if parts.explanation.trim().is_empty() {
            None
        } else {
            Some(self.summarize_explanations().await?)
        };

        let highlight = Highlight {
            category,
            body: parts.body,
            explanation: parts.explanation,
            summary,
        };
        self.report.highlights.push(highlight.clone());
        Ok(highlight)
    }

    /// Reformat the persisted explanation artifact into phrase/explanation
    /// pairs. The artifact belongs to whichever category ran most recently.
    ///
    /// An absent or empty artifact reports "no explanation available" without
    /// a gateway call.
    pub async fn summarize_explanations(&mut self) -> Result<String, BiasScopeError> {
        let not_ready = || BiasScopeError::StageNotReady {
            stage: "explanation summary",
            hint: "no explanation available — run a category highlight first",
        };

        let explanation = self
            .store
            .get(ArtifactKind::Explanation)
            .map(str::to_string)
            .ok_or_else(not_ready)?;
        if explanation.trim().is_empty() {
            return Err(not_ready());
        }

        let prompt = prompts::summary_prompt(&explanation);
        let response = self
            .gateway
            .complete(&prompt, self.config.summary_max_tokens, None)
            .await?
            .trim()
            .to_string();

        self.report.summary = Some(response.clone());
        Ok(response)
    }

    /// Produce the annotated document: the article with the persisted
    /// trigger phrases wrapped in purple bold spans. Requires the article
    /// and trigger artifacts (either from this session or persisted by an
    /// earlier one).
    pub async fn annotated_document(&mut self) -> Result<String, BiasScopeError> {
        let article = self.article_text("annotated document")?;
        let triggers = self
            .store
            .get(ArtifactKind::TriggerPhrases)
            .map(str::to_string)
            .ok_or(BiasScopeError::StageNotReady {
                stage: "annotated document",
                hint: "extract trigger phrases first",
            })?;

        let prompt = prompts::annotate_prompt(&triggers, &article);
        let raw = self
            .gateway
            .complete(&prompt, self.config.highlight_max_tokens, None)
            .await?;

        let html = split::strip_code_fences(&raw);
        self.report.annotated = Some(html.clone());
        Ok(html)
    }

    /// Extract and caption every embedded image, strictly one at a time in
    /// ordinal order. Requires an imported document.
    ///
    /// Previously extracted image files are cleared first, so re-running on
    /// the same document yields the same ordinal-to-image assignment. An
    /// imageless document returns an empty set without any gateway call.
    pub async fn caption_images(&mut self) -> Result<Vec<ImageCaption>, BiasScopeError> {
        let source = self.source.as_ref().ok_or(BiasScopeError::StageNotReady {
            stage: "image analysis",
            hint: "import a PDF first",
        })?;
        let source_path = source.path().to_path_buf();

        let dir = self.config.workdir.clone();
        extract::clear_extracted_images(&dir)?;
        let images = extract::extract_images(&source_path, &dir).await?;

        let mut captions = Vec::with_capacity(images.len());
        for image in images {
            let data = gateway::load_image_data(&image.path)?;
            let caption = self
                .gateway
                .complete(
                    prompts::IMAGE_CAPTION_PROMPT,
                    self.config.caption_max_tokens,
                    Some(data),
                )
                .await?
                .trim()
                .to_string();
            debug!("Captioned image {}", image.ordinal);
            captions.push(ImageCaption {
                ordinal: image.ordinal,
                path: image.path,
                caption,
            });
        }

        self.report.captions = Some(captions.clone());
        Ok(captions)
    }

    /// Page count, image count, and document metadata; no gateway call.
    pub async fn inspect(&self) -> Result<DocumentInfo, BiasScopeError> {
        let source = self.source.as_ref().ok_or(BiasScopeError::StageNotReady {
            stage: "inspection",
            hint: "import a PDF first",
        })?;
        extract::document_info(source.path()).await
    }

    /// Everything the session has produced so far.
    pub fn report(&self) -> &SessionReport {
        &self.report
    }

    /// The session configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn article_text(&mut self, stage: &'static str) -> Result<String, BiasScopeError> {
        self.store
            .get(ArtifactKind::ArticleText)
            .map(str::to_string)
            .ok_or(BiasScopeError::StageNotReady {
                stage,
                hint: "extract the article text first",
            })
    }
}
