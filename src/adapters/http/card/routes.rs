//! Axum router configuration for card endpoints.

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers::{
    edit_fields, export_card, get_card, list_categories, list_languages, preview,
    process_image, replace_image, reset, switch_language, toggle_editing, upload_image,
    CardAppState,
};

/// Create the card API router, mounted at `/api/card`.
///
/// # Routes
///
/// - `GET /` - Session snapshot
/// - `POST /image` - Upload a photo (starts over)
/// - `PUT /image` - Replace the photo
/// - `POST /process` - Run inference
/// - `PATCH /fields` - Edit the canonical record
/// - `POST /editing/:field` - Toggle a field editor
/// - `POST /language` - Switch display language
/// - `GET /preview` - Rendered HTML card
/// - `GET /export/:format` - `json`, `pdf` or `html` download
/// - `POST /reset` - Reset the session
pub fn card_routes() -> Router<CardAppState> {
    Router::new()
        .route("/", get(get_card))
        .route("/image", post(upload_image).put(replace_image))
        .route("/process", post(process_image))
        .route("/fields", patch(edit_fields))
        .route("/editing/:field", post(toggle_editing))
        .route("/language", post(switch_language))
        .route("/preview", get(preview))
        .route("/export/:format", get(export_card))
        .route("/reset", post(reset))
}

/// Create the complete card API with selector data, bound to `state`.
///
/// - `/api/card/...` - see [`card_routes`]
/// - `GET /api/languages` - Language selector entries
/// - `GET /api/categories` - Category selector entries
pub fn card_router(state: CardAppState) -> Router {
    Router::new()
        .nest("/api/card", card_routes())
        .route("/api/languages", get(list_languages))
        .route("/api/categories", get(list_categories))
        .with_state(state)
}
