//! HTTP adapter for card endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CategoryOption, EditRequest, ErrorResponse, ImageRequest, LanguageOption, LanguageRequest,
};
pub use handlers::{CardApiError, CardAppState};
pub use routes::{card_router, card_routes};
