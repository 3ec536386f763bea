//! The adsmith library turns a marketing website into advertising banners:
//! it scrapes the site, asks language models for a palette, a marketing
//! analysis and copies, asks an image model for backgrounds and composes
//! the final banners.

pub mod analyze;
pub mod background;
pub mod coerce;
pub mod compose;
pub mod constants;
pub mod copywrite;
pub mod demo;
pub mod error;
pub mod layout;
pub mod scrape;
pub mod server;
pub mod wizard;

use serde::{Deserialize, Serialize};

/// Enum representing the banner format.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerSize {
    /// 1080x1080
    #[default]
    Square,
    /// 1080x1920
    Vertical,
}

impl BannerSize {
    /// Pixel dimensions as `(width, height)`.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            BannerSize::Square => (1080, 1080),
            BannerSize::Vertical => (1080, 1920),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BannerSize::Square => "square",
            BannerSize::Vertical => "vertical",
        }
    }

    pub(crate) fn aspect_ratio(self) -> &'static str {
        match self {
            BannerSize::Square => "1:1",
            BannerSize::Vertical => "9:16",
        }
    }
}

impl std::str::FromStr for BannerSize {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "square" => Ok(BannerSize::Square),
            "vertical" => Ok(BannerSize::Vertical),
            _ => Err(format!(
                "Invalid size: {input}. Must be \"square\" or \"vertical\""
            )),
        }
    }
}

impl std::fmt::Display for BannerSize {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

pub use analyze::{AnalysisResult, ColorPalette, analyze_marketing, extract_colors};
pub use background::{BackgroundImage, ImageGenerator};
pub use coerce::Fallback;
pub use compose::{Composition, render_svg};
pub use copywrite::{CopyOptions, generate_copies, refine_copy};
pub use error::{WizardError, WizardResult};
pub use layout::{Rect, collage_layout};
pub use scrape::{ScrapedSite, SiteScraper, TextContent, extract_site};
pub use wizard::{Banner, Project, WizardStep, generate_banners};
