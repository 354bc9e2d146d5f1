//! Aggregated per-stage results for one analysis session.
//!
//! The report mirrors what the viewer's panels display, and serialises to
//! JSON for the CLI's `--json` mode. `Option` distinguishes "stage never ran"
//! from a stage that ran and produced an empty result — in particular
//! `captions: Some(vec![])` means the document was scanned and contained no
//! images, while `None` means image analysis was never invoked.

use crate::category::BiasCategory;
use serde::Serialize;
use std::path::PathBuf;

/// The result of one per-category highlighting run.
#[derive(Debug, Clone, Serialize)]
pub struct Highlight {
    pub category: BiasCategory,
    /// The marked-up article paragraphs.
    pub body: String,
    /// The raw explanation blocks persisted to the explanation artifact.
    pub explanation: String,
    /// Reformatted phrase/explanation pairs; `None` when the response carried
    /// no explanation segment to summarise.
    pub summary: Option<String>,
}

/// One captioned embedded image, in extraction order.
#[derive(Debug, Clone, Serialize)]
pub struct ImageCaption {
    /// 1-based position among all images in the document.
    pub ordinal: usize,
    /// Path of the extracted `image<N>.png` file.
    pub path: PathBuf,
    pub caption: String,
}

/// Everything one session has produced so far.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionReport {
    /// The imported input as the user supplied it (path or URL).
    pub source: Option<String>,
    pub analysis: Option<String>,
    pub score: Option<String>,
    pub triggers: Option<String>,
    /// One entry per highlighting run, in invocation order.
    pub highlights: Vec<Highlight>,
    /// Most recent explanation summary.
    pub summary: Option<String>,
    pub annotated: Option<String>,
    /// `None` until image analysis runs; `Some(vec![])` for an imageless
    /// document.
    pub captions: Option<Vec<ImageCaption>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_caption_set_is_distinct_from_not_run() {
        let mut report = SessionReport::default();
        assert!(report.captions.is_none());

        report.captions = Some(Vec::new());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["captions"], serde_json::json!([]));
    }

    #[test]
    fn highlight_serialises_category_label() {
        let h = Highlight {
            category: BiasCategory::Slant,
            body: "<p>text</p>".into(),
            explanation: String::new(),
            summary: None,
        };
        let json = serde_json::to_value(&h).unwrap();
        assert_eq!(json["category"], "slant");
    }
}
