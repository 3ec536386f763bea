//! The copywrite module asks a language model for banner copies and for
//! rewrites of a single copy.

use llm::chat::ChatMessage;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::analyze::{AiContext, AnalysisResult, ask, fill_template};
use crate::coerce::{parse_numbered_lines, strip_think};
use crate::constants::{COPY_RULES, MAX_COPY_CANDIDATES, REFINE_PROMPT_TEMPLATE};
use crate::error::{WizardError, WizardResult};

/// Constraints for copy generation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CopyOptions {
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub tone: Option<String>,
    /// Words no copy may contain
    pub ng_words: Vec<String>,
    pub count: usize,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            product_name: None,
            category: None,
            tone: None,
            ng_words: Vec::new(),
            count: MAX_COPY_CANDIDATES,
        }
    }
}

impl CopyOptions {
    /// # Errors
    ///
    /// Returns [`WizardError::Validation`] when `count` is outside
    /// `1..=MAX_COPY_CANDIDATES`.
    pub fn validate(&self) -> WizardResult<()> {
        if self.count == 0 || self.count > MAX_COPY_CANDIDATES {
            return Err(WizardError::validation(format!(
                "count must be between 1 and {MAX_COPY_CANDIDATES}"
            )));
        }

        Ok(())
    }

    fn active_ng_words(&self) -> impl Iterator<Item = &str> {
        self.ng_words
            .iter()
            .map(|word| word.trim())
            .filter(|word| !word.is_empty())
    }

    /// Tells whether `copy` contains one of the NG words, ignoring case.
    pub fn violates(&self, copy: &str) -> bool {
        let copy = copy.to_lowercase();
        self.active_ng_words()
            .any(|word| copy.contains(&word.to_lowercase()))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

/// Builds the copy generation prompt.
pub fn copy_prompt(analysis: &AnalysisResult, options: &CopyOptions) -> String {
    let mut prompt = format!(
        "You are an excellent advertising copywriter. Write {} catchy copies based on the information below.\n",
        options.count
    );

    let product: Vec<String> = [
        non_empty(&options.product_name).map(|name| format!("- Product name: {name}")),
        non_empty(&options.category).map(|category| format!("- Category: {category}")),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !product.is_empty() {
        prompt.push_str("\n# Product\n");
        prompt.push_str(&product.join("\n"));
        prompt.push('\n');
    }

    let strengths: Vec<String> = analysis
        .strengths
        .iter()
        .enumerate()
        .map(|(index, strength)| format!("  {}. {strength}", index + 1))
        .collect();
    prompt.push_str(&format!(
        "\n# Marketing analysis\n- Target: {}\n- Strengths:\n{}\n- Brand tone: {}\n- Competitors: {}\n",
        analysis.target,
        strengths.join("\n"),
        analysis.brand_tone,
        analysis.competitors.join(", ")
    ));

    if let Some(tone) = non_empty(&options.tone) {
        prompt.push_str(&format!("\n# Desired tone\n{tone}\n"));
    }

    let ng_words: Vec<&str> = options.active_ng_words().collect();
    if !ng_words.is_empty() {
        prompt.push_str(&format!(
            "\n# NG words (never use)\n{}\n",
            ng_words.join(", ")
        ));
    }

    prompt.push_str(COPY_RULES);
    prompt
}

/// Drops copies containing an NG word and keeps at most `options.count`.
pub fn screen_copies(copies: Vec<String>, options: &CopyOptions) -> Vec<String> {
    copies
        .into_iter()
        .filter(|copy| !options.violates(copy))
        .take(options.count)
        .collect()
}

/// Generates copies for the analyzed site.
///
/// # Errors
///
/// Returns an error if:
/// * `options` are invalid
/// * the model call fails
/// * the answer has no numbered line, or every line uses an NG word
pub async fn generate_copies(
    ctx: &AiContext<'_>,
    analysis: &AnalysisResult,
    options: &CopyOptions,
) -> WizardResult<Vec<String>> {
    options.validate()?;

    info!("Generating {} copies", options.count);
    let prompt = copy_prompt(analysis, options);
    debug!("Copy prompt: {prompt}");

    let answer = ask(ctx, vec![ChatMessage::user().content(prompt)]).await?;
    let copies = screen_copies(parse_numbered_lines(&answer)?, options);
    if copies.is_empty() {
        return Err(WizardError::shape("every generated copy used an NG word"));
    }

    info!("Generated {} copies", copies.len());
    Ok(copies)
}

/// Rewrites a copy according to user feedback.
///
/// # Errors
///
/// Returns an error if:
/// * the copy or the feedback is empty
/// * the model call fails
/// * the model answers with nothing
pub async fn refine_copy(
    ctx: &AiContext<'_>,
    original: &str,
    feedback: &str,
    analysis: &AnalysisResult,
) -> WizardResult<String> {
    if original.trim().is_empty() || feedback.trim().is_empty() {
        return Err(WizardError::validation(
            "originalCopy and feedback are required",
        ));
    }

    let prompt = fill_template(
        REFINE_PROMPT_TEMPLATE,
        &[
            ("copy", original.trim()),
            ("feedback", feedback.trim()),
            ("target", analysis.target.as_str()),
            ("brand_tone", analysis.brand_tone.as_str()),
        ],
    );

    let answer = ask(ctx, vec![ChatMessage::user().content(prompt.trim())]).await?;
    let refined = strip_think(&answer);
    if refined.is_empty() {
        return Err(WizardError::shape("model returned an empty copy"));
    }

    Ok(refined)
}
