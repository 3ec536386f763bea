//! The compose module describes a banner composition (copy, background,
//! accent color, size) and renders it as an SVG document.

use serde::Deserialize;
use url::Url;

use crate::BannerSize;
use crate::analyze::is_hex_color;
use crate::error::{WizardError, WizardResult};
use crate::layout::place_images;

pub const COMPOSE_PATH: &str = "/api/compose-banner";
pub const COMPOSE_COLLAGE_PATH: &str = "/api/compose-banner-collage";

const DEFAULT_COLOR: &str = "#3B82F6";

/// What lies behind the copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Backdrop {
    /// Gradient derived from the accent color
    Gradient,
    Image(String),
    /// Up to five images laid out by [`crate::layout::collage_layout`]
    Collage(Vec<String>),
}

/// Input parameters of one banner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Composition {
    pub text: String,
    pub backdrop: Backdrop,
    pub color: String,
    pub size: BannerSize,
}

/// Query string of the composition endpoints.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ComposeQuery {
    pub text: Option<String>,
    pub bg: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
}

impl Composition {
    /// # Errors
    ///
    /// Returns [`WizardError::Validation`] when the text is missing, or the
    /// color or the size is malformed.
    pub fn from_query(query: ComposeQuery, collage: bool) -> WizardResult<Self> {
        let text = query
            .text
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| WizardError::validation("Missing required parameters: text"))?;

        let color = query.color.unwrap_or_else(|| DEFAULT_COLOR.to_owned());
        if !is_hex_color(&color) {
            return Err(WizardError::validation(format!("Invalid color: {color}")));
        }

        let size = match query.size {
            Some(size) => size.parse().map_err(WizardError::Validation)?,
            None => BannerSize::default(),
        };

        let bg = query.bg.unwrap_or_default();
        let backdrop = if collage {
            let images = split_image_list(&bg);
            if images.is_empty() {
                Backdrop::Gradient
            } else {
                Backdrop::Collage(images)
            }
        } else if bg.trim().is_empty() {
            Backdrop::Gradient
        } else {
            Backdrop::Image(bg.trim().to_owned())
        };

        Ok(Self {
            text,
            backdrop,
            color,
            size,
        })
    }

    /// URL of the composition endpoint rendering this banner.
    pub fn to_query_url(&self, base: &Url) -> Url {
        let (path, bg) = match &self.backdrop {
            Backdrop::Gradient => (COMPOSE_PATH, None),
            Backdrop::Image(image) => (COMPOSE_PATH, Some(image.clone())),
            Backdrop::Collage(images) => (COMPOSE_COLLAGE_PATH, Some(images.join(","))),
        };

        let mut url = base.clone();
        url.set_path(path);
        {
            let mut query = url.query_pairs_mut();
            query.clear().append_pair("text", &self.text);
            if let Some(bg) = bg {
                query.append_pair("bg", &bg);
            }
            query
                .append_pair("color", &self.color)
                .append_pair("size", self.size.as_str());
        }

        url
    }

    fn font_size(&self) -> u32 {
        match (&self.backdrop, self.size) {
            (Backdrop::Collage(_), BannerSize::Square) => 72,
            (Backdrop::Collage(_), BannerSize::Vertical) => 90,
            (_, BannerSize::Square) => 80,
            (_, BannerSize::Vertical) => 100,
        }
    }
}

/// Splits a comma separated image list, keeping `data:` URLs whole.
///
/// A `data:` head is joined with the part after it unless that part starts a
/// new image; a head left without payload is kept with an empty one.
pub fn split_image_list(list: &str) -> Vec<String> {
    let mut images: Vec<String> = Vec::new();
    let mut pending_data_url: Option<String> = None;

    for part in list.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        match pending_data_url.take() {
            Some(head) if !starts_image(part) => {
                images.push(format!("{head},{part}"));
                continue;
            }
            Some(head) => images.push(format!("{head},")),
            None => {}
        }

        if part.starts_with("data:") {
            pending_data_url = Some(part.to_owned());
        } else {
            images.push(part.to_owned());
        }
    }

    if let Some(head) = pending_data_url {
        images.push(format!("{head},"));
    }

    images
}

fn starts_image(part: &str) -> bool {
    part.starts_with("data:") || part.contains("://")
}

pub(crate) fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Greedy word wrap; words longer than a line are cut by characters.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let word: String = word.into_iter().collect();
        let needed = line.chars().count() + usize::from(!line.is_empty()) + word.chars().count();
        if !line.is_empty() && needed > max_chars {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&word);
    }

    if !line.is_empty() {
        lines.push(line);
    }

    lines
}

fn image_element(href: &str) -> String {
    format!(
        r#"<image href="{}" x="0" y="0" width="100%" height="100%" preserveAspectRatio="xMidYMid slice"/>"#,
        escape_xml(href)
    )
}

/// Renders the banner: backdrop, darkening overlay, then the copy centered
/// with a drop shadow.
pub fn render_svg(composition: &Composition) -> String {
    let (width, height) = composition.size.dimensions();
    let font_size = composition.font_size();
    let color = escape_xml(&composition.color);

    let (backdrop, overlay) = match &composition.backdrop {
        Backdrop::Gradient => (
            format!(
                r#"<linearGradient id="backdrop" x1="0%" y1="0%" x2="100%" y2="100%"><stop offset="0%" stop-color="{color}" stop-opacity="0.13"/><stop offset="100%" stop-color="{color}" stop-opacity="0.53"/></linearGradient><rect width="100%" height="100%" fill="url(#backdrop)"/>"#
            ),
            RADIAL_OVERLAY,
        ),
        Backdrop::Image(image) => (image_element(image), RADIAL_OVERLAY),
        Backdrop::Collage(images) => {
            let cells: String = place_images(images)
                .into_iter()
                .map(|(cell, image)| {
                    format!(
                        r#"<svg x="{}%" y="{}%" width="{}%" height="{}%">{}</svg>"#,
                        cell.left,
                        cell.top,
                        cell.width,
                        cell.height,
                        image_element(image)
                    )
                })
                .collect();
            (
                format!(
                    r##"<linearGradient id="backdrop" x1="0%" y1="0%" x2="100%" y2="100%"><stop offset="0%" stop-color="#667eea"/><stop offset="100%" stop-color="#764ba2"/></linearGradient><rect width="100%" height="100%" fill="url(#backdrop)"/>{cells}"##
                ),
                LINEAR_OVERLAY,
            )
        }
    };

    let max_chars = ((width as f32 * 0.85) / (font_size as f32 * 0.6)).max(1.0) as usize;
    let lines = wrap_text(&composition.text, max_chars);
    let line_height = font_size * 6 / 5;
    let block_offset = line_height * (lines.len() as u32).saturating_sub(1) / 2;
    let first_baseline = (height / 2 + font_size / 3).saturating_sub(block_offset);
    let tspans: String = lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            format!(
                r#"<tspan x="50%" y="{}">{}</tspan>"#,
                first_baseline + line_height * index as u32,
                escape_xml(line)
            )
        })
        .collect();

    format!(
        r##"<svg width="{width}" height="{height}" viewBox="0 0 {width} {height}" xmlns="http://www.w3.org/2000/svg">
<defs><filter id="shadow" x="-20%" y="-20%" width="140%" height="140%"><feDropShadow dx="0" dy="8" stdDeviation="8" flood-color="#000000" flood-opacity="0.8"/></filter></defs>
{backdrop}
{overlay}
<text font-family="'Noto Sans JP', sans-serif" font-size="{font_size}" font-weight="900" fill="#FFFFFF" text-anchor="middle" filter="url(#shadow)">{tspans}</text>
</svg>"##
    )
}

const RADIAL_OVERLAY: &str = r#"<radialGradient id="overlay"><stop offset="0%" stop-color="black" stop-opacity="0.2"/><stop offset="100%" stop-color="black" stop-opacity="0.5"/></radialGradient><rect width="100%" height="100%" fill="url(#overlay)"/>"#;

const LINEAR_OVERLAY: &str = r#"<linearGradient id="overlay" x1="0%" y1="0%" x2="0%" y2="100%"><stop offset="0%" stop-color="black" stop-opacity="0.3"/><stop offset="100%" stop-color="black" stop-opacity="0.6"/></linearGradient><rect width="100%" height="100%" fill="url(#overlay)"/>"#;
