//! The scrape module fetches a single page and extracts what the later
//! wizard steps need: title, description, candidate images and text.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::{debug, info};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::compose::escape_xml;
use crate::constants::{EXCLUDED_IMAGE_MARKERS, MAX_PARAGRAPHS, MIN_PARAGRAPH_CHARS, USER_AGENT};
use crate::error::{WizardError, WizardResult};

fn selector(query: &str) -> Selector {
    Selector::parse(query).expect("Failed to compile static CSS selector")
}

static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
static H1: Lazy<Selector> = Lazy::new(|| selector("h1"));
static H2: Lazy<Selector> = Lazy::new(|| selector("h2"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("p"));
static IMG: Lazy<Selector> = Lazy::new(|| selector("img[src]"));
static DESCRIPTION: Lazy<Selector> = Lazy::new(|| selector(r#"meta[name="description"]"#));
static OG_IMAGE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:image"]"#));

/// Headings and paragraphs of a scraped page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub paragraphs: Vec<String>,
}

/// Everything extracted from one page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedSite {
    pub url: String,
    pub title: String,
    pub description: String,
    /// Fetchable preview of the page.
    pub screenshot: String,
    pub images: Vec<String>,
    pub text_content: TextContent,
}

/// Handle to the HTTP client used for scraping.
///
/// Built once and shared by every request.
#[derive(Clone, Debug)]
pub struct SiteScraper {
    client: reqwest::Client,
    max_images: usize,
}

impl SiteScraper {
    /// Creates a scraper with the given fetch timeout and image cap.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(timeout: Duration, max_images: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, max_images })
    }

    /// Fetches `url` once and extracts its content.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * `url` is not an absolute http(s) URL
    /// * the request fails, times out or answers with a non-2xx status
    pub async fn scrape(&self, url: &str) -> WizardResult<ScrapedSite> {
        let page_url = parse_page_url(url)?;

        info!("Scraping {page_url}");
        let response = self.client.get(page_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WizardError::upstream(format!(
                "{page_url} answered with status {status}"
            )));
        }

        let base_url = response.url().clone();
        let html = response.text().await?;
        debug!("Fetched {} bytes from {base_url}", html.len());

        let mut site = extract_site(&html, &base_url, self.max_images);
        site.url = page_url.to_string();
        info!(
            "Scraped {page_url}: {} images, {} paragraphs",
            site.images.len(),
            site.text_content.paragraphs.len()
        );

        Ok(site)
    }
}

/// Parses user input into an absolute http(s) URL.
///
/// # Errors
///
/// Returns [`WizardError::Validation`] when the input is empty, unparseable
/// or not http(s).
pub fn parse_page_url(url: &str) -> WizardResult<Url> {
    let url = url.trim();
    if url.is_empty() {
        return Err(WizardError::validation("URL is required"));
    }

    let parsed = Url::parse(url)
        .map_err(|e| WizardError::validation(format!("Invalid URL format: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(WizardError::validation(format!(
            "Invalid URL format: unsupported scheme {scheme}"
        ))),
    }
}

/// Extracts title, description, images and text from an HTML document.
///
/// Relative image sources are resolved against `base_url`. At most
/// `max_images` images are kept, in order of first appearance.
pub fn extract_site(html: &str, base_url: &Url, max_images: usize) -> ScrapedSite {
    let document = Html::parse_document(html);
    let title = parse_title(&document);

    ScrapedSite {
        url: base_url.to_string(),
        screenshot: preview_card(&title),
        description: attribute_of(&document, &DESCRIPTION, "content").unwrap_or_default(),
        images: extract_images(&document, base_url, max_images),
        text_content: extract_text(&document),
        title,
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_owned()
}

fn attribute_of(document: &Html, selector: &Selector, attribute: &str) -> Option<String> {
    document
        .select(selector)
        .next()
        .and_then(|element| element.value().attr(attribute))
        .map(str::to_owned)
}

fn parse_title(document: &Html) -> String {
    [&*TITLE, &*H1]
        .into_iter()
        .filter_map(|selector| document.select(selector).next())
        .map(element_text)
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| "No title".to_owned())
}

/// Markers match case-sensitively, so `/LOGO.png` is kept.
fn is_decorative(src: &str) -> bool {
    EXCLUDED_IMAGE_MARKERS
        .iter()
        .any(|marker| src.contains(marker))
}

fn extract_images(document: &Html, base_url: &Url, max_images: usize) -> Vec<String> {
    let og_image = attribute_of(document, &OG_IMAGE, "content");
    let sources = document
        .select(&IMG)
        .filter_map(|element| element.value().attr("src"))
        .filter(|src| !is_decorative(src))
        .map(str::to_owned);

    let mut seen = HashSet::new();
    og_image
        .into_iter()
        .chain(sources)
        .filter_map(|src| base_url.join(src.trim()).ok())
        .map(|url| url.to_string())
        .filter(|url| seen.insert(url.clone()))
        .take(max_images)
        .collect()
}

fn extract_text(document: &Html) -> TextContent {
    let texts = |selector: &Selector| -> Vec<String> {
        document
            .select(selector)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect()
    };

    let paragraphs = document
        .select(&PARAGRAPH)
        .map(element_text)
        .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
        .take(MAX_PARAGRAPHS)
        .collect();

    TextContent {
        h1: texts(&H1),
        h2: texts(&H2),
        paragraphs,
    }
}

/// Renders a preview card for the page as an SVG data URL.
///
/// No browser is driven, so the card stands in for a real screenshot.
fn preview_card(title: &str) -> String {
    let title: String = title.chars().take(50).collect();
    let svg = format!(
        r##"<svg width="1200" height="800" xmlns="http://www.w3.org/2000/svg">
  <defs>
    <linearGradient id="bg" x1="0%" y1="0%" x2="100%" y2="100%">
      <stop offset="0%" style="stop-color:#667eea;stop-opacity:1"/>
      <stop offset="100%" style="stop-color:#764ba2;stop-opacity:1"/>
    </linearGradient>
  </defs>
  <rect width="1200" height="800" fill="url(#bg)"/>
  <rect x="150" y="200" width="900" height="400" rx="20" fill="white" opacity="0.95"/>
  <rect x="150" y="200" width="900" height="50" rx="20" fill="#e2e8f0"/>
  <circle cx="180" cy="225" r="8" fill="#ff5f57"/>
  <circle cx="210" cy="225" r="8" fill="#febc2e"/>
  <circle cx="240" cy="225" r="8" fill="#28c840"/>
  <text x="600" y="350" font-family="system-ui, sans-serif" font-size="32" font-weight="600" fill="#1a202c" text-anchor="middle">{}</text>
  <text x="600" y="420" font-family="system-ui, sans-serif" font-size="18" fill="#718096" text-anchor="middle">Website preview</text>
</svg>"##,
        escape_xml(&title)
    );

    format!("data:image/svg+xml;base64,{}", BASE64.encode(svg))
}
