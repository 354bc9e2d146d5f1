//! Prompt templates for every analysis stage.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the category taxonomy, the colour bindings,
//!    and the output contracts (HTML only, `<p>`-wrapped paragraphs, the fixed
//!    `Score: N/10` line) each live in exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the built strings directly
//!    without an LLM call, so a taxonomy or format regression is caught at
//!    test time rather than in a live response.
//!
//! Every builder is a pure function: fixed instructional preamble, optional
//! prior-stage text, then the raw article text. No builder performs I/O.

use crate::category::BiasCategory;

/// Instruction sent with each extracted image during the captioning stage.
pub const IMAGE_CAPTION_PROMPT: &str =
    "Briefly describe in 2-3 sentences how this image relates to the bias detected.";

/// Build the bias-analysis prompt: one HTML paragraph per category, each with
/// its colour-bound header.
pub fn analysis_prompt(article: &str) -> String {
    let mut prompt = String::from(
        "Analyze the following article for these bias categories:\n\
         Narrative Bias, Sentiment Bias, Regional Bias, Slant, and Coverage Depth.\n\n\
         Use only HTML formatting. For each section:\n\
         - Wrap the explanation in a <p> tag.\n\
         - Start with a <b> tag containing the category name, but color the header like so:\n",
    );
    for category in BiasCategory::ALL {
        prompt.push_str(&format!(
            "  • {}: <span style='color:{};'> ({})\n",
            category.label(),
            category.hex_color(),
            category.color_name()
        ));
    }
    prompt.push_str(
        "- Close the colored span and bold tag, and follow it with the analysis text.\n\n\
         Example:\n\
         <p><b><span style='color:#1E90FF;'>Narrative Bias:</span></b> This article uses a compelling 'us vs. them' story...</p>\n\
         <p><b><span style='color:#FF4500;'>Sentiment Bias:</span></b> The wording is emotionally charged...</p>\n\
         ...and so on.\n\n\
         Do not use Markdown. Only return valid HTML.\n\n\
         Article:\n",
    );
    prompt.push_str(article);
    prompt
}

/// Build the severity-scoring prompt. The response must contain the fixed
/// line `<p><b>Score:</b> N/10</p>` that [`crate::pipeline::score`] recognises.
pub fn score_prompt(analysis: &str, article: &str) -> String {
    format!(
        "You are formatting an HTML block of text for a document viewer.\n\
         Based on the analysis below, give a bias score out of 10 (10 = extremely biased), \
         and provide a short summary explaining why.\n\n\
         Strict formatting instructions:\n\
         - Wrap the score line in a <p> tag, starting with <b>Score:</b> followed by the score (e.g., 6/10).\n\
         - Wrap the summary explanation in a separate <p> tag.\n\
         - Use ONLY HTML. Do NOT use Markdown or raw text formatting.\n\
         - Do NOT write anything before or after the <p> blocks.\n\n\
         Example:\n\
         <p><b>Score:</b> 7/10</p>\n<p>The article uses emotionally charged language to present a one-sided view...</p>\n\n\
         Now generate the output.\n\n\
         Analysis:\n{analysis}\n\nArticle:\n{article}"
    )
}

/// Build the trigger-phrase prompt: exactly three phrases, each with the
/// paragraph number it appears in.
pub fn trigger_prompt(analysis: &str, article: &str) -> String {
    format!(
        "You are formatting an HTML block to display trigger phrases in a document viewer.\n\
         Identify 3 trigger phrases that support the bias analysis below, and include the \
         paragraph number for each.\n\n\
         Strict formatting instructions:\n\
         - Use ONLY HTML.\n\
         - For each phrase, wrap the output in a <p> tag.\n\
         - Bold the phrase label using <b>Trigger Phrase:</b> and bold the paragraph label with <b>Paragraph:</b>.\n\
         - Do NOT use Markdown (**bold**) or raw text formatting.\n\
         - Do NOT write anything outside the <p> blocks.\n\n\
         Example:\n\
         <p><b>Trigger Phrase:</b> 'They always lie to the people.'<br><b>Paragraph:</b> 3</p>\n\
         <p><b>Trigger Phrase:</b> 'A corrupt cabal controls the media.'<br><b>Paragraph:</b> 6</p>\n\
         <p><b>Trigger Phrase:</b> 'Voices of reason are silenced.'<br><b>Paragraph:</b> 8</p>\n\n\
         Now extract trigger phrases based on this analysis:\n{analysis}\n\nFrom this article:\n{article}"
    )
}

/// Build the per-category highlighting prompt.
///
/// Output contract: the full article with every paragraph in `<p>` tags and
/// exactly two category phrases wrapped in the category's colour span, then
/// two blank lines, then one explanation block per phrase. The blank-line
/// separator is what [`crate::pipeline::split`] keys on.
pub fn highlight_prompt(category: BiasCategory, article: &str) -> String {
    format!(
        "You are given an article. Identify two specific phrases that represent {noun}.\n\
         Highlight them in the full text using this format:\n\
         - Wrap each paragraph in <p> tags.\n\
         - For each {noun} phrase, wrap it with this HTML span:\n\
         \x20 <span style='color:{hex}; font-weight:bold;'>phrase</span>\n\n\
         After the full article, add **two blank lines**.\n\
         Then, provide an explanation for each highlighted phrase in the following format:\n\n\
         Phrase: \n\
         Explanation of why it's an example of {noun}.\n\n\
         Separate each explanation with a single blank line.\n\
         Return ONLY valid HTML that includes the full article (with highlighted phrases in \
         <span style='color:{color_name}'>{color_name}</span>) and the list of formatted \
         explanations underneath.\n\
         Do not include any extra text or markdown outside of the HTML.\n\n\
         Article:\n{article}",
        noun = category.noun(),
        hex = category.hex_color(),
        color_name = category.color_name(),
    )
}

/// Build the cross-category annotation prompt: wrap only the exact phrases
/// from the persisted trigger list, in purple bold.
pub fn annotate_prompt(triggers: &str, article: &str) -> String {
    format!(
        "Highlight the specific trigger phrases listed below in purple, bold text inside the article.\n\n\
         Trigger Phrases:\n{triggers}\n\n\
         Instructions:\n\
         - Wrap each paragraph of the article in a <p> tag.\n\
         - Within paragraphs, wrap each trigger phrase in this HTML span:\n\
         \x20 <span style='color:purple; font-weight:bold;'>trigger phrase</span>\n\
         - Only modify exact phrases from the trigger list. Keep everything else unchanged.\n\
         - Use ONLY valid HTML and do not include explanations or intros.\n\
         - Exclude any unnecessary text and just use the main paragraphs in the article.\n\n\
         Article:\n{article}"
    )
}

/// Build the explanation-summary prompt: reformat the persisted explanation
/// text into bolded phrase/explanation pairs.
pub fn summary_prompt(explanation: &str) -> String {
    format!(
        "You are given a block of text that includes phrases and their bias explanations. \
         Reformat the output into valid HTML where each phrase is bolded, followed by its \
         explanation. Use the following format:\n\n\
         Phrase: Explanation\n\n\
         Separate each pair with a single blank line. Return ONLY valid HTML. Do not return \
         a list, dictionary, markdown, or code block.\n\n\
         Input:\n{explanation}"
    )
}
