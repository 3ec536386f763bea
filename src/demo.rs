//! Deterministic data served when a provider is not configured, so the
//! wizard can be walked end to end without API keys.

use crate::analyze::{AnalysisResult, ColorPalette};
use crate::copywrite::{CopyOptions, screen_copies};
use crate::scrape::{ScrapedSite, TextContent};

pub fn palette() -> ColorPalette {
    ColorPalette {
        main: "#2563EB".to_owned(),
        accent: "#F59E0B".to_owned(),
        base: "#F3F4F6".to_owned(),
    }
}

pub fn analysis() -> AnalysisResult {
    AnalysisResult {
        competitors: vec![
            "Company A - market leader with a broad lineup".to_owned(),
            "Company B - premium quality at premium prices".to_owned(),
            "Company C - online only, low price strategy".to_owned(),
        ],
        strengths: vec![
            "Quality guaranteed by in-house technology".to_owned(),
            "Customer support around the clock".to_owned(),
            "Generous refund policy for first-time buyers".to_owned(),
        ],
        target: "Working people aged 30 to 45 balancing career and family, \
                 who value saving time and invest in quality."
            .to_owned(),
        brand_tone: "Trustworthy yet innovative; professional but approachable".to_owned(),
    }
}

pub const IMAGES: [&str; 5] = [
    "https://images.unsplash.com/photo-1522202176988-66273c2fd55f?w=800",
    "https://images.unsplash.com/photo-1553877522-43269d4ea984?w=800",
    "https://images.unsplash.com/photo-1497366216548-37526070297c?w=800",
    "https://images.unsplash.com/photo-1557804506-669a67965ba0?w=800",
    "https://images.unsplash.com/photo-1516321318423-f06f85e504b3?w=800",
];

pub const SCREENSHOT: &str = "https://images.unsplash.com/photo-1499951360447-b19be8fe80f5?w=1200";

pub fn site(url: &str) -> ScrapedSite {
    ScrapedSite {
        url: url.to_owned(),
        title: "Demo site - quality service for you".to_owned(),
        description: "Demo description used instead of a live scrape.".to_owned(),
        screenshot: SCREENSHOT.to_owned(),
        images: IMAGES.iter().map(|image| (*image).to_owned()).collect(),
        text_content: TextContent {
            h1: vec!["Main title".to_owned(), "Subtitle".to_owned()],
            h2: vec![
                "Feature 1".to_owned(),
                "Feature 2".to_owned(),
                "Feature 3".to_owned(),
            ],
            paragraphs: vec![
                "Demo body text standing in for scraped content.".to_owned(),
                "More detailed explanation follows here.".to_owned(),
            ],
        },
    }
}

/// Template copies built from the analysis, honoring `count` and NG words.
pub fn copies(analysis: &AnalysisResult, options: &CopyOptions) -> Vec<String> {
    let strength = analysis
        .strengths
        .first()
        .map(String::as_str)
        .unwrap_or("Quality");
    let category = options.category.as_deref().unwrap_or("great");
    let product = options.product_name.as_deref().unwrap_or("service");

    let templates = [
        format!("The best solution for {}", analysis.target),
        format!("{strength}, a new experience"),
        format!("Start your {category} service today"),
        "Here is why people choose us".to_owned(),
        "We solve your problem".to_owned(),
        format!("Trusted {product} with a track record"),
        format!("A brand that embodies {}", analysis.brand_tone),
        format!("An innovative {category} solution for you"),
        "Why professionals choose us".to_owned(),
        "Your first step to success starts here".to_owned(),
    ];

    let candidates = templates
        .iter()
        .cycle()
        .take(templates.len() * 2)
        .enumerate()
        .map(|(index, template)| {
            if index >= templates.len() {
                format!("{template} - {}", index + 1)
            } else {
                template.clone()
            }
        })
        .collect();

    screen_copies(candidates, options)
}
