//! Integration tests for the analysis pipeline.
//!
//! The orchestrator is driven end-to-end against a scripted mock gateway, so
//! these tests exercise stage gating, artifact hand-off, and response
//! post-processing without any network access or PDF file. The one test that
//! needs a real PDF (text/image extraction through pdfium) is gated behind
//! the `BIASCOPE_E2E_PDF` environment variable, the same way live tests are
//! usually kept out of CI.

use async_trait::async_trait;
use biascope::{
    AnalysisConfig, AnalysisSession, BiasCategory, BiasScopeError, CompletionGateway,
};
use edgequake_llm::ImageData;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Mock gateway ─────────────────────────────────────────────────────────────

/// Scripted gateway: pops one canned response per call and records every
/// request so tests can assert on call counts, prompts, and token ceilings.
#[derive(Default)]
struct MockGateway {
    responses: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, usize, bool)>>,
}

impl MockGateway {
    fn scripted(responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            ..Self::default()
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn request(&self, index: usize) -> (String, usize, bool) {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl CompletionGateway for MockGateway {
    async fn complete(
        &self,
        prompt: &str,
        max_output_tokens: usize,
        image: Option<ImageData>,
    ) -> Result<String, BiasScopeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push((
            prompt.to_string(),
            max_output_tokens,
            image.is_some(),
        ));
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}

// ── Test helpers ─────────────────────────────────────────────────────────────

/// A session over a scratch working directory pre-seeded with extracted
/// article text, i.e. in the `TextExtracted` state.
fn session_with_article(
    workdir: &Path,
    article: &str,
    gateway: Arc<MockGateway>,
) -> AnalysisSession {
    std::fs::write(workdir.join("article.txt"), article).unwrap();
    let config = AnalysisConfig::builder().workdir(workdir).build().unwrap();
    AnalysisSession::with_gateway(config, gateway)
}

const ARTICLE: &str = "Paragraph one.\n\nParagraph two.";

// ── Stage gating ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn score_before_analysis_is_rejected_without_a_gateway_call() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = MockGateway::scripted(&[]);
    let mut session = session_with_article(dir.path(), ARTICLE, gateway.clone());

    let err = session.score().await.unwrap_err();
    assert!(matches!(err, BiasScopeError::StageNotReady { .. }));
    assert!(err.to_string().contains("run the bias analysis first"));
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn triggers_before_analysis_is_rejected_without_a_gateway_call() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = MockGateway::scripted(&[]);
    let mut session = session_with_article(dir.path(), ARTICLE, gateway.clone());

    let err = session.triggers().await.unwrap_err();
    assert!(matches!(err, BiasScopeError::StageNotReady { .. }));
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn analysis_without_article_text_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = MockGateway::scripted(&[]);
    let config = AnalysisConfig::builder()
        .workdir(dir.path())
        .build()
        .unwrap();
    let mut session = AnalysisSession::with_gateway(config, gateway.clone());

    let err = session.analyze().await.unwrap_err();
    assert!(err.to_string().contains("extract the article text first"));
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn annotate_without_triggers_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = MockGateway::scripted(&[]);
    let mut session = session_with_article(dir.path(), ARTICLE, gateway.clone());

    let err = session.annotated_document().await.unwrap_err();
    assert!(err.to_string().contains("extract trigger phrases first"));
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn summary_without_explanation_reports_not_available() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = MockGateway::scripted(&[]);
    let mut session = session_with_article(dir.path(), ARTICLE, gateway.clone());

    let err = session.summarize_explanations().await.unwrap_err();
    assert!(err.to_string().contains("no explanation available"));
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn empty_persisted_explanation_also_reports_not_available() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("explanation.txt"), "  \n").unwrap();
    let gateway = MockGateway::scripted(&[]);
    let mut session = session_with_article(dir.path(), ARTICLE, gateway.clone());

    let err = session.summarize_explanations().await.unwrap_err();
    assert!(err.to_string().contains("no explanation available"));
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn import_of_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = MockGateway::scripted(&[]);
    let config = AnalysisConfig::builder()
        .workdir(dir.path())
        .build()
        .unwrap();
    let mut session = AnalysisSession::with_gateway(config, gateway);

    let err = session.import("/no/such/article.pdf").await.unwrap_err();
    assert!(matches!(err, BiasScopeError::FileNotFound { .. }));
}

// ── Analysis / score / triggers ──────────────────────────────────────────────

#[tokio::test]
async fn analysis_result_stays_in_memory_only() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = MockGateway::scripted(&["<p><b>Narrative Bias:</b> framing...</p>"]);
    let mut session = session_with_article(dir.path(), ARTICLE, gateway.clone());

    let analysis = session.analyze().await.unwrap();
    assert_eq!(analysis, "<p><b>Narrative Bias:</b> framing...</p>");
    assert_eq!(session.report().analysis.as_deref(), Some(analysis.as_str()));

    // The analysis prompt carried the article and used the analysis ceiling.
    let (prompt, max_tokens, with_image) = gateway.request(0);
    assert!(prompt.contains(ARTICLE));
    assert_eq!(max_tokens, 650);
    assert!(!with_image);

    // Only article.txt exists in the workdir; the analysis is not persisted.
    let files: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files, vec!["article.txt"]);
}

#[tokio::test]
async fn high_score_is_recolored_red() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = MockGateway::scripted(&[
        "analysis text",
        "<p><b>Score:</b> 7/10</p>\n<p>One-sided sourcing throughout.</p>",
    ]);
    let mut session = session_with_article(dir.path(), ARTICLE, gateway.clone());

    session.analyze().await.unwrap();
    let score = session.score().await.unwrap();
    assert!(score.contains("<span style='color:red;'>7/10</span>"));
    assert!(score.contains("One-sided sourcing"));

    // The score prompt embeds both the analysis and the article.
    let (prompt, max_tokens, _) = gateway.request(1);
    assert!(prompt.contains("analysis text"));
    assert!(prompt.contains(ARTICLE));
    assert_eq!(max_tokens, 650);
}

#[tokio::test]
async fn low_score_is_recolored_green() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = MockGateway::scripted(&["analysis", "<p><b>Score:</b> 3/10</p>"]);
    let mut session = session_with_article(dir.path(), ARTICLE, gateway);

    session.analyze().await.unwrap();
    let score = session.score().await.unwrap();
    assert!(score.contains("<span style='color:green;'>3/10</span>"));
}

#[tokio::test]
async fn unparseable_score_passes_through_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = MockGateway::scripted(&["analysis", "The bias is moderate overall."]);
    let mut session = session_with_article(dir.path(), ARTICLE, gateway);

    session.analyze().await.unwrap();
    let score = session.score().await.unwrap();
    assert_eq!(score, "The bias is moderate overall.");
}

#[tokio::test]
async fn triggers_are_persisted_for_the_annotated_view() {
    let dir = tempfile::tempdir().unwrap();
    let trigger_html =
        "<p><b>Trigger Phrase:</b> 'they always lie'<br><b>Paragraph:</b> 1</p>";
    let gateway = MockGateway::scripted(&["analysis", trigger_html]);
    let mut session = session_with_article(dir.path(), ARTICLE, gateway.clone());

    session.analyze().await.unwrap();
    let triggers = session.triggers().await.unwrap();
    assert_eq!(triggers, trigger_html);

    let persisted = std::fs::read_to_string(dir.path().join("trigger_phrases.txt")).unwrap();
    assert_eq!(persisted, trigger_html);
    assert_eq!(gateway.request(1).1, 300);
}

// ── Highlighting ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn highlight_splits_body_and_explanation() {
    let dir = tempfile::tempdir().unwrap();
    let response =
        "<p>Paragraph one.</p>\n\n<p>Paragraph two.</p>\n\nPhrase: x\nExplain: y";
    let gateway = MockGateway::scripted(&[response, "<b>x</b>: y"]);
    let mut session = session_with_article(dir.path(), ARTICLE, gateway.clone());

    let highlight = session.highlight(BiasCategory::Narrative).await.unwrap();
    assert_eq!(highlight.body, "<p>Paragraph one.</p>");
    assert_eq!(
        highlight.explanation,
        "<p>Paragraph two.</p>\n\nPhrase: x\nExplain: y"
    );
    // The explanation summary ran automatically on the persisted artifact.
    assert_eq!(highlight.summary.as_deref(), Some("<b>x</b>: y"));
    assert_eq!(gateway.call_count(), 2);

    let (prompt, max_tokens, _) = gateway.request(0);
    assert!(prompt.contains("narrative bias"));
    assert!(prompt.contains("#1E90FF"));
    assert_eq!(max_tokens, 3000);

    let persisted = std::fs::read_to_string(dir.path().join("explanation.txt")).unwrap();
    assert_eq!(persisted, highlight.explanation);
}

#[tokio::test]
async fn highlight_strips_markdown_fences() {
    let dir = tempfile::tempdir().unwrap();
    let response = "```html\n<p>Body.</p>\n\n<p>Tail.</p>\n\nPhrase: z\n```";
    let gateway = MockGateway::scripted(&[response, "summary"]);
    let mut session = session_with_article(dir.path(), ARTICLE, gateway);

    let highlight = session.highlight(BiasCategory::Slant).await.unwrap();
    assert_eq!(highlight.body, "<p>Body.</p>");
    assert!(!highlight.explanation.contains("```"));
}

#[tokio::test]
async fn unsplit_response_is_all_body_and_skips_the_summary() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = MockGateway::scripted(&["<p>Single block, no separator.</p>"]);
    let mut session = session_with_article(dir.path(), ARTICLE, gateway.clone());

    let highlight = session.highlight(BiasCategory::Regional).await.unwrap();
    assert_eq!(highlight.body, "<p>Single block, no separator.</p>");
    assert_eq!(highlight.explanation, "");
    assert_eq!(highlight.summary, None);
    // No summary call: the explanation artifact is empty.
    assert_eq!(gateway.call_count(), 1);
}

#[tokio::test]
async fn explanation_artifact_is_last_writer_wins_across_categories() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = MockGateway::scripted(&[
        "<p>A.</p>\n\n<p>B.</p>\n\nnarrative explanation",
        "narrative summary",
        "<p>A.</p>\n\n<p>B.</p>\n\nsentiment explanation",
        "sentiment summary",
    ]);
    let mut session = session_with_article(dir.path(), ARTICLE, gateway);

    session.highlight(BiasCategory::Narrative).await.unwrap();
    session.highlight(BiasCategory::Sentiment).await.unwrap();

    let persisted = std::fs::read_to_string(dir.path().join("explanation.txt")).unwrap();
    assert!(persisted.contains("sentiment explanation"));
    assert!(!persisted.contains("narrative explanation"));
}

// ── Annotated document ───────────────────────────────────────────────────────

#[tokio::test]
async fn annotate_uses_persisted_triggers_from_an_earlier_session() {
    let dir = tempfile::tempdir().unwrap();
    // A previous session left the trigger artifact behind.
    std::fs::write(
        dir.path().join("trigger_phrases.txt"),
        "<p><b>Trigger Phrase:</b> 'silenced voices'</p>",
    )
    .unwrap();
    let annotated = "```html\n<p>The <span style='color:purple; font-weight:bold;'>silenced \
                     voices</span> claim.</p>\n```";
    let gateway = MockGateway::scripted(&[annotated]);
    let mut session = session_with_article(dir.path(), ARTICLE, gateway.clone());

    let html = session.annotated_document().await.unwrap();
    assert!(html.starts_with("<p>"));
    assert!(!html.contains("```"));

    let (prompt, _, _) = gateway.request(0);
    assert!(prompt.contains("silenced voices"));
    assert!(prompt.contains(ARTICLE));
}

// ── Report ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn report_distinguishes_not_run_from_empty() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = MockGateway::scripted(&["analysis"]);
    let mut session = session_with_article(dir.path(), ARTICLE, gateway);

    session.analyze().await.unwrap();
    let report = session.report();
    assert!(report.analysis.is_some());
    assert!(report.score.is_none());
    assert!(report.captions.is_none(), "captions never ran");
    assert!(report.highlights.is_empty());
}

// ── PDF extraction (needs a real document + pdfium) ──────────────────────────

/// Run with: BIASCOPE_E2E_PDF=/path/to/article.pdf cargo test --test pipeline
#[tokio::test]
async fn extraction_is_deterministic_across_runs() {
    let Ok(pdf) = std::env::var("BIASCOPE_E2E_PDF") else {
        println!("SKIP — set BIASCOPE_E2E_PDF to run extraction tests");
        return;
    };

    use biascope::pipeline::extract;
    let path = std::path::PathBuf::from(&pdf);
    let dir = tempfile::tempdir().unwrap();

    let text = extract::extract_text(&path).await.unwrap();
    assert!(!text.trim().is_empty());

    let first = extract::extract_images(&path, dir.path()).await.unwrap();
    extract::clear_extracted_images(dir.path()).unwrap();
    let second = extract::extract_images(&path, dir.path()).await.unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.ordinal, b.ordinal);
        assert_eq!(a.path, b.path);
    }
    // Ordinals are 1-based and contiguous in extraction order.
    for (index, image) in second.iter().enumerate() {
        assert_eq!(image.ordinal, index + 1);
        assert!(image.path.exists());
    }
}
