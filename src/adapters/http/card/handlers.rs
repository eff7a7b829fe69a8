//! HTTP handlers for card endpoints.
//!
//! These handlers connect Axum routes to the flow controller and the export
//! service. All state changes go through `FlowController`; handlers only
//! parse input and shape output.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use crate::application::{CardError, ExportService, FlowController};
use crate::domain::card::EditorError;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::profile::{Category, ImageDatum, Language, ProfileField};
use crate::ports::{ExportError, ExportFormat, ExportedFile};

use super::dto::{
    CategoryOption, EditRequest, ErrorResponse, ImageRequest, LanguageOption, LanguageRequest,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for card endpoints.
#[derive(Clone)]
pub struct CardAppState {
    pub flow: Arc<FlowController>,
    pub exports: Arc<ExportService>,
}

impl CardAppState {
    pub fn new(flow: Arc<FlowController>, exports: Arc<ExportService>) -> Self {
        Self { flow, exports }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Session
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/card - Current session snapshot
pub async fn get_card(State(state): State<CardAppState>) -> impl IntoResponse {
    Json(state.flow.snapshot())
}

/// POST /api/card/image - Upload a photo and start over
pub async fn upload_image(
    State(state): State<CardAppState>,
    Json(req): Json<ImageRequest>,
) -> Result<impl IntoResponse, CardApiError> {
    let image = parse_image(req)?;
    let snapshot = state.flow.upload_image(image)?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// PUT /api/card/image - Swap the photo, keeping the card
pub async fn replace_image(
    State(state): State<CardAppState>,
    Json(req): Json<ImageRequest>,
) -> Result<impl IntoResponse, CardApiError> {
    let image = parse_image(req)?;
    Ok(Json(state.flow.replace_image(image)))
}

/// POST /api/card/process - Run inference on the uploaded photo
pub async fn process_image(
    State(state): State<CardAppState>,
) -> Result<impl IntoResponse, CardApiError> {
    Ok(Json(state.flow.process_image().await?))
}

/// POST /api/card/reset - Back to an empty session
pub async fn reset(State(state): State<CardAppState>) -> impl IntoResponse {
    Json(state.flow.reset())
}

// ════════════════════════════════════════════════════════════════════════════════
// Editing and language
// ════════════════════════════════════════════════════════════════════════════════

/// PATCH /api/card/fields - Edit the canonical record
pub async fn edit_fields(
    State(state): State<CardAppState>,
    Json(req): Json<EditRequest>,
) -> Result<impl IntoResponse, CardApiError> {
    Ok(Json(state.flow.edit(&req.edit)?))
}

/// POST /api/card/editing/:field - Open or close a field editor
pub async fn toggle_editing(
    State(state): State<CardAppState>,
    Path(field): Path<String>,
) -> Result<impl IntoResponse, CardApiError> {
    let field: ProfileField = field
        .parse()
        .map_err(|e| CardError::Editor(EditorError::Validation(e)))?;
    Ok(Json(state.flow.toggle_editing(field)?))
}

/// POST /api/card/language - Show the card in another language
pub async fn switch_language(
    State(state): State<CardAppState>,
    Json(req): Json<LanguageRequest>,
) -> Result<impl IntoResponse, CardApiError> {
    Ok(Json(state.flow.switch_language(req.language).await?))
}

// ════════════════════════════════════════════════════════════════════════════════
// Preview and export
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/card/preview - The card as HTML
pub async fn preview(State(state): State<CardAppState>) -> Result<impl IntoResponse, CardApiError> {
    let card = state.flow.displayed_card()?;
    Ok(Html(state.exports.render_preview(&card).html))
}

/// GET /api/card/export/:format - Download the displayed card as json, pdf or html
pub async fn export_card(
    State(state): State<CardAppState>,
    Path(format): Path<String>,
) -> Result<impl IntoResponse, CardApiError> {
    let format: ExportFormat = format.parse().map_err(CardError::from)?;
    let card = state.flow.displayed_card()?;
    let file = state.exports.export(&card, format).await.map_err(CardError::from)?;
    Ok(download(file))
}

fn download(file: ExportedFile) -> Response {
    let disposition = file.content_disposition();
    (
        [
            (header::CONTENT_TYPE, file.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.content,
    )
        .into_response()
}

// ════════════════════════════════════════════════════════════════════════════════
// Selector data
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/languages - Languages offered by the selector
pub async fn list_languages() -> impl IntoResponse {
    let options: Vec<LanguageOption> = Language::all().iter().copied().map(Into::into).collect();
    Json(options)
}

/// GET /api/categories - Categories offered by the selector
pub async fn list_categories() -> impl IntoResponse {
    let options: Vec<CategoryOption> = Category::all().iter().copied().map(Into::into).collect();
    Json(options)
}

fn parse_image(req: ImageRequest) -> Result<ImageDatum, CardError> {
    ImageDatum::from_data_uri(req.image).map_err(CardError::InvalidImage)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts card errors to HTTP responses.
#[derive(Debug)]
pub struct CardApiError(CardError);

impl From<CardError> for CardApiError {
    fn from(err: CardError) -> Self {
        Self(err)
    }
}

impl CardApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            CardError::Export(ExportError::ServiceUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            CardError::Export(ExportError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            err => match err.code() {
                ErrorCode::ValidationFailed | ErrorCode::InvalidImage => StatusCode::BAD_REQUEST,
                ErrorCode::NoImage
                | ErrorCode::NoProfile
                | ErrorCode::InvalidStateTransition
                | ErrorCode::AlreadyProcessing
                | ErrorCode::ReadOnlyView
                | ErrorCode::TranslationInFlight
                | ErrorCode::ExportInProgress => StatusCode::CONFLICT,
                ErrorCode::InferenceFailed
                | ErrorCode::TranslationFailed
                | ErrorCode::ExportFailed => StatusCode::BAD_GATEWAY,
                ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for CardApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self.0, status = %status, "card request failed");
        }

        let body = ErrorResponse::from(DomainError::from(self.0));
        (status, Json(body)).into_response()
    }
}
