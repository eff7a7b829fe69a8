//! Application layer - Orchestrates the card session and its exports.
//!
//! - `FlowController` drives Idle -> Processing -> Success/Error, owns the
//!   card editor and runs inference and translation through the ports.
//! - `ExportService` turns the displayed card into JSON, HTML or PDF files.

mod error;
mod export_service;
mod flow_controller;

pub use error::CardError;
pub use export_service::{ExportService, DEFAULT_FILE_PREFIX};
pub use flow_controller::{
    CardSnapshot, DisplayedCard, FlowController, LanguageChange, SessionSnapshot,
};
