//! CLI binary for biascope.
//!
//! A thin shim over the library crate that maps CLI flags to an
//! [`AnalysisConfig`], drives the requested stages in pipeline order on one
//! [`AnalysisSession`], and prints results.

use anyhow::{Context, Result};
use biascope::{AnalysisConfig, AnalysisSession, BiasCategory, BiasScopeError};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Bias analysis (default stage)
  biascope article.pdf

  # Analysis, severity score, and trigger phrases in one session
  biascope article.pdf --analyze --score --triggers

  # Highlight one category's phrases across the article
  biascope article.pdf --highlight narrative

  # Annotated document from previously persisted trigger phrases
  biascope article.pdf --annotate

  # Caption every embedded image
  biascope article.pdf --captions

  # Everything, as JSON
  biascope article.pdf --all --json > report.json

  # Analyse an article fetched from a URL
  biascope https://example.com/story.pdf --all

  # Page/image counts and metadata, no API key needed
  biascope --inspect-only article.pdf

STAGE ORDER & PREREQUISITES:
  extract ──▶ analyze ──▶ { score, triggers }
     │
     ├──▶ highlight <category>  (writes explanation.txt, then summarises it)
     └──▶ annotate              (needs trigger_phrases.txt)
  captions needs only the imported PDF.

  Stages run in pipeline order within one invocation. Requesting --score
  without --analyze fails with "run the bias analysis first": the severity
  score is grounded in the analysis, which is never persisted between runs.

ARTIFACTS (written to --workdir):
  article.txt           extracted article text
  trigger_phrases.txt   three trigger phrases with paragraph numbers
  explanation.txt       explanation blocks of the most recent highlight run
  image<N>.png          extracted embedded images, cleared on each --captions

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to an existing libpdfium

SETUP:
  1. Set API key:     export OPENAI_API_KEY=sk-...
  2. Analyse:         biascope article.pdf --all
"#;

/// Detect and visualise media bias in PDF articles using LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "biascope",
    version,
    about = "Detect media bias in PDF articles using LLMs",
    long_about = "Extract the text and images of a PDF article and run them through a fixed \
sequence of LLM analysis stages: five-category bias analysis, severity scoring, trigger-phrase \
extraction, per-category highlighting, annotated highlighting, and image captioning.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Run the five-category bias analysis (default when no stage is given).
    #[arg(long)]
    analyze: bool,

    /// Score the severity of the detected bias (requires --analyze).
    #[arg(long)]
    score: bool,

    /// Extract three trigger phrases (requires --analyze).
    #[arg(long)]
    triggers: bool,

    /// Highlight one category's phrases; repeatable.
    #[arg(long, value_enum)]
    highlight: Vec<CategoryArg>,

    /// Produce the annotated document from persisted trigger phrases.
    #[arg(long)]
    annotate: bool,

    /// Extract and caption every embedded image.
    #[arg(long)]
    captions: bool,

    /// Run every stage (all five highlight categories included).
    #[arg(long)]
    all: bool,

    /// Print page/image counts and metadata only, no LLM calls.
    #[arg(long)]
    inspect_only: bool,

    /// Output the full session report as JSON instead of formatted text.
    #[arg(long, env = "BIASCOPE_JSON")]
    json: bool,

    /// Working directory for persisted artifacts.
    #[arg(long, env = "BIASCOPE_WORKDIR", default_value = ".")]
    workdir: PathBuf,

    /// LLM model ID (e.g. gpt-4o-mini).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "BIASCOPE_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// HTTP download timeout in seconds for URL inputs.
    #[arg(long, env = "BIASCOPE_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Disable per-stage spinners.
    #[arg(long, env = "BIASCOPE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BIASCOPE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, env = "BIASCOPE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum CategoryArg {
    Narrative,
    Sentiment,
    Regional,
    Slant,
    CoverageDepth,
}

impl From<CategoryArg> for BiasCategory {
    fn from(v: CategoryArg) -> Self {
        match v {
            CategoryArg::Narrative => BiasCategory::Narrative,
            CategoryArg::Sentiment => BiasCategory::Sentiment,
            CategoryArg::Regional => BiasCategory::Regional,
            CategoryArg::Slant => BiasCategory::Slant,
            CategoryArg::CoverageDepth => BiasCategory::CoverageDepth,
        }
    }
}

/// Per-stage spinner; a no-op handle when progress is disabled.
struct StageSpinner(Option<ProgressBar>);

impl StageSpinner {
    fn start(enabled: bool, label: &str) -> Self {
        if !enabled {
            return Self(None);
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_message(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self(Some(bar))
    }

    fn finish(self) {
        if let Some(bar) = self.0 {
            bar.finish_and_clear();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config + session ───────────────────────────────────────────
    let mut builder = AnalysisConfig::builder()
        .temperature(cli.temperature)
        .workdir(&cli.workdir)
        .download_timeout_secs(cli.download_timeout);
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Inspect-only mode: no provider, no API key needed ────────────────
    if cli.inspect_only {
        let mut session = AnalysisSession::with_gateway(config, no_gateway());
        session
            .import(&cli.input)
            .await
            .context("Failed to import document")?;
        let info = session.inspect().await.context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialise metadata")?
            );
        } else {
            println!("File:    {}", cli.input);
            if let Some(ref t) = info.title {
                println!("Title:   {}", t);
            }
            if let Some(ref a) = info.author {
                println!("Author:  {}", a);
            }
            println!("Pages:   {}", info.page_count);
            println!("Images:  {}", info.image_count);
        }
        return Ok(());
    }

    let mut session = AnalysisSession::new(config).context("Failed to initialise LLM provider")?;
    session
        .import(&cli.input)
        .await
        .context("Failed to import document")?;

    // ── Stage plan ───────────────────────────────────────────────────────
    let no_stage_requested = !cli.analyze
        && !cli.score
        && !cli.triggers
        && cli.highlight.is_empty()
        && !cli.annotate
        && !cli.captions
        && !cli.all;

    let run_analyze = cli.analyze || cli.all || no_stage_requested;
    let run_score = cli.score || cli.all;
    let run_triggers = cli.triggers || cli.all;
    let run_annotate = cli.annotate || cli.all;
    let run_captions = cli.captions || cli.all;
    let highlights: Vec<BiasCategory> = if cli.all {
        BiasCategory::ALL.to_vec()
    } else {
        cli.highlight.iter().map(|&c| c.into()).collect()
    };

    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let needs_text =
        run_analyze || run_score || run_triggers || run_annotate || !highlights.is_empty();
    let mut failed = 0usize;

    // ── Run stages in pipeline order ─────────────────────────────────────
    if needs_text {
        let spinner = StageSpinner::start(show_progress, "Extracting article text…");
        let result = session.extract_text().await;
        spinner.finish();
        // Extraction failure gates every text stage; bail out like a fatal.
        result.context("Text extraction failed")?;
    }

    if run_analyze {
        let spinner = StageSpinner::start(show_progress, "Running bias analysis…");
        let result = session.analyze().await;
        spinner.finish();
        report_stage(&cli, "Bias Analysis", result, &mut failed);
    }

    if run_score {
        let spinner = StageSpinner::start(show_progress, "Scoring bias…");
        let result = session.score().await;
        spinner.finish();
        report_stage(&cli, "Bias Score", result, &mut failed);
    }

    if run_triggers {
        let spinner = StageSpinner::start(show_progress, "Extracting trigger phrases…");
        let result = session.triggers().await;
        spinner.finish();
        report_stage(&cli, "Trigger Phrases", result, &mut failed);
    }

    for category in highlights {
        let spinner = StageSpinner::start(
            show_progress,
            &format!("Highlighting {}…", category.label()),
        );
        let result = session.highlight(category).await;
        spinner.finish();
        match result {
            Ok(highlight) => {
                if !cli.json {
                    print_section(&format!("{} Highlights", category.label()), &highlight.body);
                    if let Some(ref summary) = highlight.summary {
                        print_section("Explanation Summary", summary);
                    }
                }
            }
            Err(e) => stage_failed(&format!("{} Highlights", category.label()), &e, &mut failed),
        }
    }

    if run_annotate {
        let spinner = StageSpinner::start(show_progress, "Generating annotated document…");
        let result = session.annotated_document().await;
        spinner.finish();
        report_stage(&cli, "Annotated Document", result, &mut failed);
    }

    if run_captions {
        let spinner = StageSpinner::start(show_progress, "Analyzing images…");
        let result = session.caption_images().await;
        spinner.finish();
        match result {
            Ok(captions) if !cli.json => {
                if captions.is_empty() {
                    println!("{}", bold("No image found."));
                } else {
                    for caption in &captions {
                        print_section(
                            &format!("Image {} ({})", caption.ordinal, caption.path.display()),
                            &caption.caption,
                        );
                    }
                }
            }
            Ok(_) => {}
            Err(e) => stage_failed("Image Analysis", &e, &mut failed),
        }
    }

    // ── Final output ─────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(session.report())
            .context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet {
        if failed > 0 {
            eprintln!("{} {} stage(s) failed", red("✗"), failed);
        } else {
            eprintln!("{} all requested stages completed", green("✔"));
        }
    }

    Ok(())
}

/// Print a stage result (human mode) or record a failure. JSON mode defers
/// all output to the final report.
fn report_stage(cli: &Cli, title: &str, result: Result<String, BiasScopeError>, failed: &mut usize) {
    match result {
        Ok(text) => {
            if !cli.json {
                print_section(title, &text);
            }
        }
        Err(e) => stage_failed(title, &e, failed),
    }
}

/// Stage failures are local: report and continue with the remaining stages.
fn stage_failed(title: &str, error: &BiasScopeError, failed: &mut usize) {
    *failed += 1;
    eprintln!("{} {}: {}", red("✗"), bold(title), error);
}

fn print_section(title: &str, body: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let _ = writeln!(handle, "{} {}", cyan("◆"), bold(title));
    let _ = writeln!(handle, "{}\n", body.trim_end());
}

/// Gateway stand-in for inspect-only mode, which never issues a completion.
fn no_gateway() -> std::sync::Arc<dyn biascope::CompletionGateway> {
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl biascope::CompletionGateway for Unreachable {
        async fn complete(
            &self,
            _prompt: &str,
            _max_output_tokens: usize,
            _image: Option<edgequake_llm::ImageData>,
        ) -> Result<String, BiasScopeError> {
            Err(BiasScopeError::Internal(
                "inspect mode issued a completion".into(),
            ))
        }
    }

    std::sync::Arc::new(Unreachable)
}
