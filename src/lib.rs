//! # biascope
//!
//! Detect and visualise media bias in PDF articles using LLMs.
//!
//! ## What it does
//!
//! Given a PDF article, biascope extracts the plain text and every embedded
//! image, then drives a fixed sequence of LLM stages over them: a five-category
//! bias analysis, a 0–10 severity score, trigger-phrase extraction,
//! per-category phrase highlighting, a cross-category annotated document, an
//! explanation summary, and per-image captions. Each stage returns an HTML
//! fragment ready for a document viewer; intermediate results are persisted
//! as plain-text artifacts in a working directory so the annotated view (and
//! later sessions) can re-read them.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Import    resolve local file or download from URL
//!  ├─ 2. Extract   text + embedded images via pdfium (spawn_blocking)
//!  ├─ 3. Analyze   five-category bias analysis (LLM)
//!  ├─ 4. Score     severity 0–10, recoloured in place
//!  ├─ 5. Triggers  three trigger phrases → trigger_phrases.txt
//!  ├─ 6. Highlight per-category spans, split body/explanation
//!  ├─ 7. Annotate  trigger phrases marked across the article
//!  └─ 8. Captions  one sequential vision call per embedded image
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use biascope::{AnalysisConfig, AnalysisSession, BiasCategory};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = AnalysisConfig::default();
//!     let mut session = AnalysisSession::new(config)?;
//!
//!     session.import("article.pdf").await?;
//!     session.extract_text().await?;
//!     let analysis = session.analyze().await?;
//!     println!("{analysis}");
//!
//!     let score = session.score().await?;
//!     let highlight = session.highlight(BiasCategory::Narrative).await?;
//!     println!("{score}\n{}", highlight.body);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `biascope` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! biascope = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod artifacts;
pub mod category;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use artifacts::{ArtifactKind, ArtifactStore};
pub use category::BiasCategory;
pub use config::{AnalysisConfig, AnalysisConfigBuilder};
pub use error::BiasScopeError;
pub use pipeline::extract::DocumentInfo;
pub use pipeline::gateway::{CompletionGateway, LlmGateway};
pub use report::{Highlight, ImageCaption, SessionReport};
pub use session::AnalysisSession;
