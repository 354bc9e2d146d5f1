//! The five fixed bias categories and their display colours.
//!
//! Every prompt that names a category pulls its label and colour from here so
//! the taxonomy exists in exactly one place. The highlight pipeline is one
//! parameterised function dispatching on this enum rather than five
//! near-duplicate stage implementations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five bias classifications the pipeline detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasCategory {
    /// Storyline framing.
    Narrative,
    /// Positive/negative choice of words.
    Sentiment,
    /// Geographic over/underrepresentation.
    Regional,
    /// Partisan word usage or source citations.
    Slant,
    /// Single-source vs multi-source reporting.
    CoverageDepth,
}

impl BiasCategory {
    /// All categories in their fixed display order.
    pub const ALL: [BiasCategory; 5] = [
        BiasCategory::Narrative,
        BiasCategory::Sentiment,
        BiasCategory::Regional,
        BiasCategory::Slant,
        BiasCategory::CoverageDepth,
    ];

    /// Human-readable label, e.g. `"Narrative Bias"`.
    pub fn label(&self) -> &'static str {
        match self {
            BiasCategory::Narrative => "Narrative Bias",
            BiasCategory::Sentiment => "Sentiment Bias",
            BiasCategory::Regional => "Regional Bias",
            BiasCategory::Slant => "Slant",
            BiasCategory::CoverageDepth => "Coverage Depth",
        }
    }

    /// Lower-case noun used inside prompt sentences, e.g. `"narrative bias"`.
    pub fn noun(&self) -> &'static str {
        match self {
            BiasCategory::Narrative => "narrative bias",
            BiasCategory::Sentiment => "sentiment bias",
            BiasCategory::Regional => "regional bias",
            BiasCategory::Slant => "slant",
            BiasCategory::CoverageDepth => "coverage depth",
        }
    }

    /// Fixed highlight colour as a hex code for inline `<span>` styles.
    pub fn hex_color(&self) -> &'static str {
        match self {
            BiasCategory::Narrative => "#1E90FF",
            BiasCategory::Sentiment => "#FF4500",
            BiasCategory::Regional => "#228B22",
            BiasCategory::Slant => "#DAA520",
            BiasCategory::CoverageDepth => "#FF8C00",
        }
    }

    /// Plain colour name used when a prompt describes the colour in words.
    pub fn color_name(&self) -> &'static str {
        match self {
            BiasCategory::Narrative => "blue",
            BiasCategory::Sentiment => "red",
            BiasCategory::Regional => "green",
            BiasCategory::Slant => "goldenrod",
            BiasCategory::CoverageDepth => "orange",
        }
    }
}

impl fmt::Display for BiasCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_and_colors_are_fixed() {
        assert_eq!(BiasCategory::Narrative.hex_color(), "#1E90FF");
        assert_eq!(BiasCategory::Sentiment.hex_color(), "#FF4500");
        assert_eq!(BiasCategory::Regional.hex_color(), "#228B22");
        assert_eq!(BiasCategory::Slant.hex_color(), "#DAA520");
        assert_eq!(BiasCategory::CoverageDepth.hex_color(), "#FF8C00");
        assert_eq!(BiasCategory::CoverageDepth.label(), "Coverage Depth");
    }

    #[test]
    fn all_covers_every_variant_once() {
        let labels: std::collections::HashSet<_> =
            BiasCategory::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels.len(), 5);
    }

    #[test]
    fn serde_round_trip() {
        let json = serde_json::to_string(&BiasCategory::CoverageDepth).unwrap();
        assert_eq!(json, "\"coverage_depth\"");
        let back: BiasCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BiasCategory::CoverageDepth);
    }
}
