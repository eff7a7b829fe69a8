//! Export configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::ports::{DocumentOptions, Orientation, PageSize};

/// Card export configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Prefix of every downloaded filename (`<prefix>-<slug>.<ext>`)
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    #[serde(default = "default_page_size")]
    pub page_size: PageSize,

    #[serde(default = "default_orientation")]
    pub orientation: Orientation,

    /// Page margin in millimetres
    #[serde(default = "default_margin")]
    pub margin_mm: u32,

    /// Capture resolution multiplier
    #[serde(default = "default_scale")]
    pub scale: f32,

    /// Upper bound on one PDF capture, in seconds
    #[serde(default = "default_image_timeout")]
    pub image_timeout_secs: u64,

    /// Path to the wkhtmltopdf executable; PATH lookup if unset
    pub renderer_path: Option<String>,
}

impl ExportConfig {
    /// Page setup handed to the document renderer
    pub fn document_options(&self) -> DocumentOptions {
        DocumentOptions {
            page_size: self.page_size,
            orientation: self.orientation,
            margin_mm: self.margin_mm,
            scale: self.scale,
            image_timeout: Duration::from_secs(self.image_timeout_secs),
        }
    }

    /// Validate export configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let prefix_ok = !self.file_prefix.is_empty()
            && self
                .file_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !prefix_ok {
            return Err(ValidationError::InvalidFilePrefix);
        }
        if self.margin_mm > 50 {
            return Err(ValidationError::InvalidMargin);
        }
        if !(1.0..=8.0).contains(&self.scale) {
            return Err(ValidationError::InvalidScale);
        }
        if self.image_timeout_secs == 0 || self.image_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: default_file_prefix(),
            page_size: default_page_size(),
            orientation: default_orientation(),
            margin_mm: default_margin(),
            scale: default_scale(),
            image_timeout_secs: default_image_timeout(),
            renderer_path: None,
        }
    }
}

fn default_file_prefix() -> String {
    crate::application::DEFAULT_FILE_PREFIX.to_string()
}

fn default_page_size() -> PageSize {
    PageSize::A4
}

fn default_orientation() -> Orientation {
    Orientation::Portrait
}

fn default_margin() -> u32 {
    15
}

fn default_scale() -> f32 {
    4.0
}

fn default_image_timeout() -> u64 {
    15
}
