//! HTTP API of the wizard. Every endpoint maps to one wizard step and answers
//! with `{ "success": true, ... }` or `{ "success": false, "error": ... }`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};

use crate::BannerSize;
use crate::analyze::{AnalysisResult, SiteSummary};
use crate::compose::{COMPOSE_COLLAGE_PATH, COMPOSE_PATH, ComposeQuery, Composition, render_svg};
use crate::copywrite::CopyOptions;
use crate::error::{WizardError, WizardResult};
use crate::wizard::Wizard;

type Shared = State<Arc<Wizard>>;
type Reply = Result<Json<Value>, WizardError>;

impl IntoResponse for WizardError {
    fn into_response(self) -> Response {
        let status = match self {
            WizardError::Validation(_) => StatusCode::BAD_REQUEST,
            WizardError::Upstream(_) | WizardError::Shape(_) => {
                error!("Request failed: {self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(json!({ "success": false, "error": self.to_string() })),
        )
            .into_response()
    }
}

/// Build the router with all wizard endpoints.
pub fn router(wizard: Arc<Wizard>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/scrape", post(scrape))
        .route("/api/analyze/colors", post(colors))
        .route("/api/analyze/marketing", post(marketing))
        .route("/api/generate/copies", post(copies))
        .route("/api/refine/copy", post(refine))
        .route("/api/generate/background", post(background))
        .route(COMPOSE_PATH, get(compose_banner))
        .route(COMPOSE_COLLAGE_PATH, get(compose_collage))
        .layer(cors)
        .with_state(wizard)
}

/// Serve the wizard API on `addr` until the process stops.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or serving fails.
pub async fn start(addr: SocketAddr, wizard: Arc<Wizard>) -> anyhow::Result<()> {
    let app = router(wizard);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Wizard API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> WizardResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| WizardError::validation(rejection.body_text()))
}

fn required(value: Option<String>, message: &str) -> WizardResult<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| WizardError::validation(message))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Deserialize)]
struct ScrapeRequest {
    url: Option<String>,
}

async fn scrape(State(wizard): Shared, payload: Result<Json<ScrapeRequest>, JsonRejection>) -> Reply {
    let url = required(body(payload)?.url, "URL is required")?;
    let site = wizard.scrape(&url).await?;

    Ok(Json(json!({
        "success": true,
        "data": site.value,
        "fallback": site.fallback,
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColorsRequest {
    image_url: Option<String>,
}

async fn colors(State(wizard): Shared, payload: Result<Json<ColorsRequest>, JsonRejection>) -> Reply {
    let image_url = required(body(payload)?.image_url, "Image URL is required")?;
    let colors = wizard.colors(&image_url).await;

    Ok(Json(json!({
        "success": true,
        "colors": colors.value,
        "fallback": colors.fallback,
    })))
}

async fn marketing(
    State(wizard): Shared,
    payload: Result<Json<SiteSummary>, JsonRejection>,
) -> Reply {
    let summary = body(payload)?;
    let analysis = wizard.marketing(&summary).await?;

    Ok(Json(json!({
        "success": true,
        "analysis": analysis.value,
        "fallback": analysis.fallback,
    })))
}

#[derive(Deserialize)]
struct CopiesRequest {
    analysis: Option<AnalysisResult>,
    #[serde(flatten)]
    options: CopyOptions,
}

async fn copies(State(wizard): Shared, payload: Result<Json<CopiesRequest>, JsonRejection>) -> Reply {
    let request = body(payload)?;
    let analysis = request
        .analysis
        .ok_or_else(|| WizardError::validation("Analysis data is required"))?;
    let copies = wizard.copies(&analysis, &request.options).await?;

    Ok(Json(json!({
        "success": true,
        "copies": copies.value,
        "fallback": copies.fallback,
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefineRequest {
    original_copy: Option<String>,
    feedback: Option<String>,
    #[serde(default)]
    analysis: AnalysisResult,
}

async fn refine(State(wizard): Shared, payload: Result<Json<RefineRequest>, JsonRejection>) -> Reply {
    let request = body(payload)?;
    let message = "originalCopy and feedback are required";
    let original = required(request.original_copy, message)?;
    let feedback = required(request.feedback, message)?;
    let copy = wizard.refine(&original, &feedback, &request.analysis).await?;

    Ok(Json(json!({
        "success": true,
        "copy": copy.value,
        "fallback": copy.fallback,
    })))
}

#[derive(Deserialize)]
struct BackgroundRequest {
    category: Option<String>,
    tone: Option<String>,
    size: Option<String>,
}

async fn background(
    State(wizard): Shared,
    payload: Result<Json<BackgroundRequest>, JsonRejection>,
) -> Reply {
    let request = body(payload)?;
    let message = "Category, tone, and size are required";
    let category = required(request.category, message)?;
    let tone = required(request.tone, message)?;
    let size: BannerSize = required(request.size, message)?
        .parse()
        .map_err(WizardError::Validation)?;
    let image = wizard.background(&category, &tone, size).await?;

    Ok(Json(json!({
        "success": true,
        "imageUrl": image.value,
        "fallback": image.fallback,
    })))
}

fn svg_response(query: ComposeQuery, collage: bool) -> Result<Response, WizardError> {
    let composition = Composition::from_query(query, collage)?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], render_svg(&composition)).into_response())
}

async fn compose_banner(Query(query): Query<ComposeQuery>) -> Result<Response, WizardError> {
    svg_response(query, false)
}

async fn compose_collage(Query(query): Query<ComposeQuery>) -> Result<Response, WizardError> {
    svg_response(query, true)
}
