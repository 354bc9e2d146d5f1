//! Response splitting: separate a highlighting response into article body
//! and explanation, and strip Markdown code-fence artefacts.
//!
//! Models wrap HTML in ```` ```html ```` fences despite being told not to,
//! and the highlighting prompt instructs them to put two blank lines between
//! the marked-up article and the explanation blocks. Both quirks are handled
//! here with cheap, deterministic string rules so the prompts stay focused on
//! what to extract rather than on formatting edge cases.

use once_cell::sync::Lazy;
use regex::Regex;

/// A highlighting response separated into its two display segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitResponse {
    /// The marked-up article paragraphs.
    pub body: String,
    /// The trailing explanation blocks; empty when the response had no
    /// blank-line separator at all.
    pub explanation: String,
}

static RE_FENCE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^```(?:html)?\s*").unwrap());
static RE_FENCE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*```$").unwrap());

/// Strip a leading fenced-code marker (optional `html` language tag) and a
/// trailing fence, if present. Idempotent: re-applying to already-stripped
/// text changes nothing.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let opened = RE_FENCE_OPEN.replace(trimmed, "");
    RE_FENCE_CLOSE.replace(&opened, "").into_owned()
}

/// Split a (fence-stripped) highlighting response on blank-line boundaries.
///
/// Rule: if the text splits into more than one double-newline segment, the
/// last two segments joined form the explanation and all preceding segments
/// joined form the body; otherwise the whole text is the body and the
/// explanation is empty.
///
/// "Last two segments" is a proxy for the prompt's "two blank lines before
/// the explanation" instruction, and it is known to be weaker: a model that
/// emits extra blank-line gaps inside the article will have trailing article
/// paragraphs attributed to the explanation. Inherited behaviour; callers
/// should not rely on the boundary being exact.
pub fn split_article_and_explanation(raw: &str) -> SplitResponse {
    let trimmed = raw.trim();
    let segments: Vec<&str> = trimmed.split("\n\n").collect();

    if segments.len() > 1 {
        let cut = segments.len() - 2;
        SplitResponse {
            body: segments[..cut].join("\n\n"),
            explanation: segments[cut..].join("\n\n"),
        }
    } else {
        SplitResponse {
            body: trimmed.to_string(),
            explanation: String::new(),
        }
    }
}
