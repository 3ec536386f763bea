//! The analyze module asks a language model for the color palette of a site
//! and for a marketing analysis of its content.

use std::time::Duration;

use llm::chat::{ChatMessage, ChatMessageBuilder, ChatProvider};
use log::{debug, info};
use once_cell::sync::Lazy;
use rate_guard::{RateLimit, StdTokenBucket, TokenBucketBuilder};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::coerce::extract_json_object;
use crate::constants::{COLOR_PROMPT, MARKETING_PROMPT_TEMPLATE};
use crate::error::{WizardError, WizardResult};
use crate::scrape::{ScrapedSite, TextContent};

static HEX_COLOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9A-Fa-f]{3}|[0-9A-Fa-f]{6})$").expect("Failed to compile hex color regex")
});

static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([a-z0-9_]+)\}").expect("Failed to compile placeholder regex")
});

/// Fills `{name}` placeholders of a prompt template in a single pass.
///
/// Substituted text is never scanned again, so page content holding
/// `{title}`-like text stays as it is. Unknown placeholders are kept.
pub(crate) fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |captures: &Captures<'_>| {
            let placeholder = captures.get(0).map_or("", |found| found.as_str());
            let name = captures.get(1).map_or("", |found| found.as_str());
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map_or(placeholder, |(_, value)| *value)
                .to_owned()
        })
        .into_owned()
}

/// Shared data for every language model call.
pub struct AiContext<'a> {
    /// Model answering the prompts
    pub model: &'a dyn ChatProvider,
    /// Rate limiter for controlling request frequency
    pub rate_limiter: Option<&'a StdTokenBucket>,
}

/// Builds a token bucket allowing `rpm` requests per minute.
pub fn rate_limiter(rpm: Option<u32>) -> Option<StdTokenBucket> {
    rpm.and_then(|rpm| {
        let capacity = rpm.max(1) as u64;
        let refill_interval = Duration::from_secs_f64(60.0 / capacity as f64);

        TokenBucketBuilder::builder()
            .capacity(capacity)
            .refill_amount(1_u64)
            .refill_every(refill_interval)
            .with_time(rate_guard::StdTimeSource::new())
            .with_precision::<rate_guard::Nanos>()
            .build()
            .ok()
    })
}

/// Sends one chat request and returns the raw answer text.
///
/// # Errors
///
/// Returns [`WizardError::Upstream`] if the provider call fails.
pub async fn ask(ctx: &AiContext<'_>, messages: Vec<ChatMessageBuilder>) -> WizardResult<String> {
    let messages: Vec<ChatMessage> = messages
        .into_iter()
        .map(|message| message.build())
        .collect();

    if let Some(limiter) = ctx.rate_limiter {
        loop {
            match limiter.try_acquire(1) {
                Ok(()) => break,
                Err(_) => {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }

    let response = ctx
        .model
        .chat(&messages)
        .await
        .map_err(|err| WizardError::upstream(format!("LLM error: {err}")))?
        .to_string();

    debug!("Model answered: {response}");
    Ok(response)
}

/// Main, accent and base colors of a site, as hex strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPalette {
    pub main: String,
    pub accent: String,
    pub base: String,
}

impl ColorPalette {
    /// Palette served when extraction is not possible.
    pub fn fallback() -> Self {
        Self {
            main: "#3B82F6".to_owned(),
            accent: "#F59E0B".to_owned(),
            base: "#F3F4F6".to_owned(),
        }
    }

    /// # Errors
    ///
    /// Returns [`WizardError::Shape`] naming the first field that is not a
    /// `#RGB` or `#RRGGBB` color.
    pub fn validate(self) -> WizardResult<Self> {
        for (name, value) in [
            ("main", &self.main),
            ("accent", &self.accent),
            ("base", &self.base),
        ] {
            if !is_hex_color(value) {
                return Err(WizardError::shape(format!(
                    "{name} color {value:?} is not a hex color"
                )));
            }
        }

        Ok(self)
    }
}

pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR_REGEX.is_match(value)
}

/// Extracts a palette from an image, usually the site screenshot.
///
/// # Errors
///
/// Returns an error if:
/// * `image_url` is empty
/// * the model call fails
/// * the answer has no JSON object or its colors are not hex
pub async fn extract_colors(ctx: &AiContext<'_>, image_url: &str) -> WizardResult<ColorPalette> {
    if image_url.trim().is_empty() {
        return Err(WizardError::validation("Image URL is required"));
    }

    info!("Extracting colors from {image_url}");
    let answer = ask(
        ctx,
        vec![
            ChatMessage::user().content(COLOR_PROMPT.trim()),
            ChatMessage::user().image_url(image_url),
        ],
    )
    .await?;

    extract_json_object::<ColorPalette>(&answer)?.validate()
}

/// Competitors, strengths, target persona and brand tone of a site.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub competitors: Vec<String>,
    pub strengths: Vec<String>,
    pub target: String,
    pub brand_tone: String,
}

/// Scraped content submitted for marketing analysis.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSummary {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub text_content: TextContent,
    #[serde(default)]
    pub category: Option<String>,
}

impl SiteSummary {
    pub fn from_site(site: &ScrapedSite, category: Option<String>) -> Self {
        Self {
            title: site.title.clone(),
            description: site.description.clone(),
            text_content: site.text_content.clone(),
            category,
        }
    }
}

/// Builds the marketing analysis prompt.
///
/// Only the first five h2 headings and the first three paragraphs are sent.
pub fn marketing_prompt(summary: &SiteSummary) -> String {
    let text = &summary.text_content;
    let h2: Vec<&str> = text.h2.iter().take(5).map(String::as_str).collect();
    let paragraphs: Vec<&str> = text.paragraphs.iter().take(3).map(String::as_str).collect();
    let category = summary
        .category
        .as_deref()
        .filter(|category| !category.trim().is_empty())
        .map(|category| format!("- Product category: {category}\n"))
        .unwrap_or_default();

    fill_template(
        MARKETING_PROMPT_TEMPLATE,
        &[
            ("title", summary.title.as_str()),
            ("description", summary.description.as_str()),
            ("h1", text.h1.join(", ").as_str()),
            ("h2", h2.join(", ").as_str()),
            ("paragraphs", paragraphs.join(" ").as_str()),
            ("category", category.as_str()),
        ],
    )
    .trim()
    .to_owned()
}

/// Runs a marketing analysis of the scraped content.
///
/// # Errors
///
/// Returns an error if:
/// * the title is empty
/// * the model call fails
/// * the answer has no JSON object with the four analysis fields
pub async fn analyze_marketing(
    ctx: &AiContext<'_>,
    summary: &SiteSummary,
) -> WizardResult<AnalysisResult> {
    if summary.title.trim().is_empty() {
        return Err(WizardError::validation("Title and textContent are required"));
    }

    info!("Analyzing {}", summary.title);
    let prompt = marketing_prompt(summary);
    debug!("Marketing prompt: {prompt}");

    let answer = ask(ctx, vec![ChatMessage::user().content(prompt)]).await?;
    extract_json_object(&answer)
}
