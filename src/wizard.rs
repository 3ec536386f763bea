//! The wizard module walks the five steps (input, extraction, analysis,
//! copywriting, banners) and owns the fallback policy of each step.

use std::cell::Cell;
use std::future::Future;

use chrono::{DateTime, Utc};
use llm::LLMProvider;
use log::{error, info, warn};
use rate_guard::StdTokenBucket;
use serde::Serialize;
use url::Url;

use crate::BannerSize;
use crate::analyze::{
    AiContext, AnalysisResult, ColorPalette, SiteSummary, analyze_marketing, extract_colors,
};
use crate::background::{ImageGenerator, placeholder_background};
use crate::coerce::{Fallback, with_fallback};
use crate::compose::{Backdrop, Composition};
use crate::constants::MAX_BANNERS_PER_SIZE;
use crate::copywrite::{CopyOptions, generate_copies, refine_copy};
use crate::demo;
use crate::error::{WizardError, WizardResult};
use crate::scrape::{ScrapedSite, SiteScraper, parse_page_url};

/// Stages of the wizard, in order.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    Input,
    Extraction,
    Analysis,
    Copywriting,
    Banners,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Idle,
    Analyzing,
    Generating,
    Completed,
    Error,
}

/// A composed banner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: String,
    pub size: BannerSize,
    pub background_url: String,
    pub text_overlay: String,
    pub final_image_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepError {
    pub message: String,
    pub step: WizardStep,
}

/// State of one wizard session. Kept in memory only.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub url: String,
    pub status: ProjectStatus,
    pub step: WizardStep,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub options: CopyOptions,
    pub colors: Option<ColorPalette>,
    pub screenshot: Option<String>,
    pub extracted_images: Vec<String>,
    pub analysis: Option<AnalysisResult>,
    pub copy_candidates: Vec<String>,
    pub selected_copy: Option<String>,
    pub banners: Vec<Banner>,
    /// Steps that served substitute data instead of a live answer
    pub fallbacks: Vec<WizardStep>,
    pub error: Option<StepError>,
}

impl Project {
    pub fn new(url: &str, options: CopyOptions) -> Self {
        let now = Utc::now();
        Self {
            id: format!("project-{}", now.timestamp_millis()),
            url: url.trim().to_owned(),
            status: ProjectStatus::Idle,
            step: WizardStep::Input,
            created_at: now,
            updated_at: now,
            options,
            colors: None,
            screenshot: None,
            extracted_images: Vec::new(),
            analysis: None,
            copy_candidates: Vec::new(),
            selected_copy: None,
            banners: Vec::new(),
            fallbacks: Vec::new(),
            error: None,
        }
    }

    fn enter(&mut self, step: WizardStep, status: ProjectStatus) {
        info!("Project {}: entering {step:?}", self.id);
        self.step = step;
        self.status = status;
        self.updated_at = Utc::now();
    }

    fn record<T>(&mut self, value: Fallback<T>) -> T {
        if value.fallback {
            self.mark_fallback();
        }
        value.value
    }

    fn mark_fallback(&mut self) {
        if !self.fallbacks.contains(&self.step) {
            self.fallbacks.push(self.step);
        }
    }

    fn fail(&mut self, error: &WizardError) {
        self.status = ProjectStatus::Error;
        self.error = Some(StepError {
            message: error.to_string(),
            step: self.step,
        });
        self.updated_at = Utc::now();
    }
}

/// Generates `count` banners one after another.
///
/// Each iteration asks `background` for one background URL and builds the
/// composition URL against `base`. The first failure aborts the loop and the
/// banners produced so far are dropped.
///
/// # Errors
///
/// Returns an error if:
/// * `copy` is empty or `count` is outside `1..=MAX_BANNERS_PER_SIZE`
/// * any background request fails
pub async fn generate_banners<F, Fut>(
    copy: &str,
    palette: &ColorPalette,
    size: BannerSize,
    count: usize,
    base: &Url,
    mut background: F,
) -> WizardResult<Vec<Banner>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = WizardResult<String>>,
{
    if copy.trim().is_empty() {
        return Err(WizardError::validation("A selected copy is required"));
    }
    if count == 0 || count > MAX_BANNERS_PER_SIZE {
        return Err(WizardError::validation(format!(
            "count must be between 1 and {MAX_BANNERS_PER_SIZE}"
        )));
    }

    let mut banners = Vec::with_capacity(count);
    for index in 0..count {
        let background_url = background().await?;
        let composition = Composition {
            text: copy.trim().to_owned(),
            backdrop: Backdrop::Image(background_url.clone()),
            color: palette.accent.clone(),
            size,
        };

        let created_at = Utc::now();
        banners.push(Banner {
            id: format!("banner-{}-{index}", created_at.timestamp_millis()),
            size,
            background_url,
            text_overlay: composition.text.clone(),
            final_image_url: composition.to_query_url(base).to_string(),
            created_at,
        });
    }

    info!("Generated {} {size} banners", banners.len());
    Ok(banners)
}

/// Providers behind the wizard steps.
///
/// A step whose provider is absent serves demo data flagged as fallback.
pub struct Wizard {
    pub scraper: SiteScraper,
    pub analysis_model: Option<Box<dyn LLMProvider>>,
    pub copy_model: Option<Box<dyn LLMProvider>>,
    pub image_generator: Option<ImageGenerator>,
    pub rate_limiter: Option<StdTokenBucket>,
    /// Serve the demo site instead of scraping
    pub demo: bool,
    /// Root URL the composition endpoints are served from
    pub public_url: Url,
}

impl Wizard {
    fn context<'a>(&'a self, model: &'a dyn LLMProvider) -> AiContext<'a> {
        AiContext {
            model,
            rate_limiter: self.rate_limiter.as_ref(),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the page cannot be fetched.
    pub async fn scrape(&self, url: &str) -> WizardResult<Fallback<ScrapedSite>> {
        let url = parse_page_url(url)?;
        if self.demo {
            return Ok(Fallback::substitute(demo::site(url.as_str())));
        }

        self.scraper.scrape(url.as_str()).await.map(Fallback::live)
    }

    /// Never fails: placeholders, missing models and errors all yield a
    /// default palette.
    pub async fn colors(&self, image_url: &str) -> Fallback<ColorPalette> {
        if image_url.starts_with("data:image/svg") {
            info!("SVG placeholder detected, using default colors");
            return Fallback::substitute(ColorPalette::fallback());
        }

        match &self.analysis_model {
            None => Fallback::substitute(demo::palette()),
            Some(model) => with_fallback(
                "color extraction",
                extract_colors(&self.context(model.as_ref()), image_url).await,
                ColorPalette::fallback,
            ),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the summary has no title or the live analysis
    /// fails.
    pub async fn marketing(
        &self,
        summary: &SiteSummary,
    ) -> WizardResult<Fallback<AnalysisResult>> {
        if summary.title.trim().is_empty() {
            return Err(WizardError::validation("Title and textContent are required"));
        }

        match &self.analysis_model {
            None => Ok(Fallback::substitute(demo::analysis())),
            Some(model) => analyze_marketing(&self.context(model.as_ref()), summary)
                .await
                .map(Fallback::live),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the options are invalid or the live generation
    /// fails.
    pub async fn copies(
        &self,
        analysis: &AnalysisResult,
        options: &CopyOptions,
    ) -> WizardResult<Fallback<Vec<String>>> {
        options.validate()?;

        match &self.copy_model {
            None => {
                let copies = demo::copies(analysis, options);
                if copies.is_empty() {
                    return Err(WizardError::shape("every demo copy used an NG word"));
                }
                Ok(Fallback::substitute(copies))
            }
            Some(model) => generate_copies(&self.context(model.as_ref()), analysis, options)
                .await
                .map(Fallback::live),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the input is empty or the live rewrite fails.
    pub async fn refine(
        &self,
        original: &str,
        feedback: &str,
        analysis: &AnalysisResult,
    ) -> WizardResult<Fallback<String>> {
        if original.trim().is_empty() || feedback.trim().is_empty() {
            return Err(WizardError::validation(
                "originalCopy and feedback are required",
            ));
        }

        match &self.copy_model {
            None => Ok(Fallback::substitute(original.trim().to_owned())),
            Some(model) => {
                let ctx = self.context(model.as_ref());
                refine_copy(&ctx, original, feedback, analysis)
                    .await
                    .map(Fallback::live)
            }
        }
    }

    /// Generates one background URL; provider failures yield the placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Validation`] if `category` or `tone` is empty.
    pub async fn background(
        &self,
        category: &str,
        tone: &str,
        size: BannerSize,
    ) -> WizardResult<Fallback<String>> {
        if category.trim().is_empty() || tone.trim().is_empty() {
            return Err(WizardError::validation(
                "Category, tone, and size are required",
            ));
        }

        let Some(generator) = &self.image_generator else {
            return Ok(Fallback::substitute(placeholder_background(size)));
        };

        match generator.generate(category, tone, size).await {
            Err(error @ WizardError::Validation(_)) => Err(error),
            result => Ok(with_fallback(
                "background generation",
                result.map(|image| image.into_url()),
                || placeholder_background(size),
            )),
        }
    }

    /// Runs every step for `url` and returns the resulting project.
    ///
    /// A failing step stops the run; the project then carries the error and
    /// the step it happened in.
    pub async fn run(
        &self,
        url: &str,
        options: CopyOptions,
        size: BannerSize,
        banner_count: usize,
    ) -> Project {
        let mut project = Project::new(url, options);
        match self.drive(&mut project, size, banner_count).await {
            Ok(()) => {
                project.status = ProjectStatus::Completed;
                project.updated_at = Utc::now();
            }
            Err(step_error) => {
                error!("Project {} failed at {:?}: {step_error}", project.id, project.step);
                project.fail(&step_error);
            }
        }

        project
    }

    async fn drive(
        &self,
        project: &mut Project,
        size: BannerSize,
        banner_count: usize,
    ) -> WizardResult<()> {
        project.options.validate()?;
        parse_page_url(&project.url)?;

        project.enter(WizardStep::Extraction, ProjectStatus::Analyzing);
        let site = self.scrape(&project.url).await?;
        let site = project.record(site);
        let colors = self.colors(&site.screenshot).await;
        project.colors = Some(project.record(colors));
        project.screenshot = Some(site.screenshot.clone());
        project.extracted_images = site.images.clone();

        project.enter(WizardStep::Analysis, ProjectStatus::Analyzing);
        let summary = SiteSummary::from_site(&site, project.options.category.clone());
        let analysis = self.marketing(&summary).await?;
        let analysis = project.record(analysis);

        project.enter(WizardStep::Copywriting, ProjectStatus::Generating);
        let copies = self.copies(&analysis, &project.options).await?;
        project.copy_candidates = project.record(copies);
        project.selected_copy = project.copy_candidates.first().cloned();

        project.enter(WizardStep::Banners, ProjectStatus::Generating);
        let category = project
            .options
            .category
            .clone()
            .unwrap_or_else(|| "product".to_owned());
        let tone = project
            .options
            .tone
            .clone()
            .unwrap_or_else(|| analysis.brand_tone.clone());
        let tone = if tone.trim().is_empty() {
            "professional, modern".to_owned()
        } else {
            tone
        };
        project.analysis = Some(analysis);

        let substituted = Cell::new(false);
        let palette = project.colors.clone().unwrap_or_else(ColorPalette::fallback);
        let copy = project.selected_copy.clone().unwrap_or_default();
        let (category, tone, flag) = (category.as_str(), tone.as_str(), &substituted);
        let next_background = move || async move {
            let background = self.background(category, tone, size).await?;
            if background.fallback {
                flag.set(true);
            }
            Ok::<_, WizardError>(background.value)
        };
        let banners = generate_banners(
            &copy,
            &palette,
            size,
            banner_count,
            &self.public_url,
            next_background,
        )
        .await?;

        if substituted.get() {
            warn!("Project {}: some backgrounds are placeholders", project.id);
            project.mark_fallback();
        }
        project.banners = banners;

        Ok(())
    }
}
