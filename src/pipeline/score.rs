//! Score post-processing: recognise the fixed `Score: N/10` line and
//! recolour it in place.
//!
//! The scoring prompt pins the response to contain exactly
//! `<p><b>Score:</b> N/10</p>`. That line is the only part of the response
//! the pipeline interprets; everything else passes through to the display
//! layer untouched. The recogniser is an explicit fallible parse so callers
//! can branch on "pattern not found" instead of discovering it downstream.

use once_cell::sync::Lazy;
use regex::Regex;

/// Severity threshold: scores at or above this use the high-severity colour.
const HIGH_SEVERITY_FLOOR: u8 = 5;

const HIGH_SEVERITY_COLOR: &str = "red";
const LOW_SEVERITY_COLOR: &str = "green";

static RE_SCORE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<p><b>Score:</b>\s*(\d+)/10</p>").unwrap());

/// Extract the integer severity score from a scoring response.
///
/// Returns `None` when the response does not contain the fixed
/// `<p><b>Score:</b> N/10</p>` line.
pub fn parse_score(html: &str) -> Option<u8> {
    RE_SCORE_LINE
        .captures(html)
        .and_then(|caps| caps[1].parse().ok())
}

/// Colour for a given score: red at or above the severity threshold,
/// green below it.
pub fn severity_color(score: u8) -> &'static str {
    if score >= HIGH_SEVERITY_FLOOR {
        HIGH_SEVERITY_COLOR
    } else {
        LOW_SEVERITY_COLOR
    }
}

/// Replace the plain score line with a colour-wrapped version.
///
/// When the fixed pattern is absent the input is returned unchanged — the
/// display layer shows whatever the model produced.
pub fn recolor_score(html: &str) -> String {
    let Some(score) = parse_score(html) else {
        return html.to_string();
    };

    let colored = format!(
        "<p><b>Score:</b> <span style='color:{};'>{}/10</span></p>",
        severity_color(score),
        score
    );
    RE_SCORE_LINE.replace(html, colored.as_str()).into_owned()
}
