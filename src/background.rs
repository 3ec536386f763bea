//! The background module asks an image model for banner backgrounds.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::{debug, info};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::BannerSize;
use crate::error::{WizardError, WizardResult};

/// A generated image, either inline or hosted by the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackgroundImage {
    Inline { mime: String, data: String },
    Remote(Url),
}

impl BackgroundImage {
    /// Normalizes the image into one fetchable URL (`data:` URL for inline
    /// payloads).
    pub fn into_url(self) -> String {
        match self {
            BackgroundImage::Inline { mime, data } => format!("data:{mime};base64,{data}"),
            BackgroundImage::Remote(url) => url.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
    uri: Option<String>,
}

impl TryFrom<Prediction> for BackgroundImage {
    type Error = WizardError;

    fn try_from(prediction: Prediction) -> WizardResult<Self> {
        if let Some(data) = prediction.bytes_base64_encoded {
            BASE64
                .decode(data.as_bytes())
                .map_err(|e| WizardError::shape(format!("invalid base64 image payload: {e}")))?;
            return Ok(BackgroundImage::Inline {
                mime: prediction.mime_type.unwrap_or_else(|| "image/png".to_owned()),
                data,
            });
        }

        let uri = prediction
            .uri
            .ok_or_else(|| WizardError::shape("no image data returned by the image model"))?;
        Url::parse(&uri)
            .map(BackgroundImage::Remote)
            .map_err(|e| WizardError::shape(format!("invalid image URL {uri:?}: {e}")))
    }
}

/// Builds the image prompt for a banner background.
pub fn background_prompt(category: &str, tone: &str, size: BannerSize) -> String {
    let aspect = match size {
        BannerSize::Square => "1:1 aspect ratio",
        BannerSize::Vertical => "9:16 aspect ratio (vertical)",
    };

    format!(
        "Product photography style for {category}, {tone} mood, minimalist composition, \
         high quality, 4k, clean background space in the center for text overlay, \
         negative space design, professional advertising photography, studio lighting, \
         premium feel, {aspect}, suitable for banner advertisement"
    )
}

/// Client of an Imagen-style `:predict` endpoint.
#[derive(Clone, Debug)]
pub struct ImageGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl ImageGenerator {
    /// `endpoint` is the API root, e.g.
    /// `https://generativelanguage.googleapis.com/v1beta`.
    pub fn new(client: reqwest::Client, endpoint: &str, model: &str, api_key: String) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            model: model.to_owned(),
            api_key,
        }
    }

    /// Generates one background image.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * `category` or `tone` is empty
    /// * the request fails or answers with a non-2xx status
    /// * the answer holds neither an inline image nor an image URL
    pub async fn generate(
        &self,
        category: &str,
        tone: &str,
        size: BannerSize,
    ) -> WizardResult<BackgroundImage> {
        if category.trim().is_empty() || tone.trim().is_empty() {
            return Err(WizardError::validation(
                "Category, tone, and size are required",
            ));
        }

        let prompt = background_prompt(category.trim(), tone.trim(), size);
        info!("Generating {size} background for {category}");
        debug!("Image prompt: {prompt}");

        let response = self
            .client
            .post(format!("{}/models/{}:predict", self.endpoint, self.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({
                "instances": [{ "prompt": prompt }],
                "parameters": { "sampleCount": 1, "aspectRatio": size.aspect_ratio() },
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WizardError::upstream(format!(
                "image model answered with status {status}: {body}"
            )));
        }

        let body = response.text().await?;
        let answer: PredictResponse = serde_json::from_str(&body)
            .map_err(|e| WizardError::shape(format!("malformed image model response: {e}")))?;

        answer
            .predictions
            .into_iter()
            .next()
            .ok_or_else(|| WizardError::shape("image model returned no predictions"))?
            .try_into()
    }
}

/// Deterministic gradient served when no background can be generated.
pub fn placeholder_background(size: BannerSize) -> String {
    let (width, height) = size.dimensions();
    let svg = format!(
        r##"<svg width="{width}" height="{height}" xmlns="http://www.w3.org/2000/svg">
  <defs>
    <linearGradient id="grad" x1="0%" y1="0%" x2="100%" y2="100%">
      <stop offset="0%" style="stop-color:#667eea;stop-opacity:1"/>
      <stop offset="100%" style="stop-color:#764ba2;stop-opacity:1"/>
    </linearGradient>
  </defs>
  <rect width="100%" height="100%" fill="url(#grad)"/>
  <text x="50%" y="50%" font-family="Arial, sans-serif" font-size="48" fill="white" text-anchor="middle" dominant-baseline="middle" opacity="0.3">{width}x{height}</text>
</svg>"##
    );

    BackgroundImage::Inline {
        mime: "image/svg+xml".to_owned(),
        data: BASE64.encode(svg),
    }
    .into_url()
}
