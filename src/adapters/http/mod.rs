//! HTTP adapters - REST API implementations.

pub mod card;

pub use card::{card_router, CardAppState};
