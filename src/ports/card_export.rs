//! Card Export Ports - Rendering a card and turning it into a document.
//!
//! `CardRenderer` builds the visual surface of a card (a self-contained HTML
//! page). `DocumentRenderer` hands that surface to an external engine which
//! captures it as a fixed-page document. Adapters (like `WkhtmltopdfRenderer`)
//! provide the implementation.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::domain::profile::{ImageDatum, Language, ProfileRecord};

/// Message shown to the user when a document export fails.
pub const EXPORT_USER_MESSAGE: &str =
    "Waan ka xunnahay, qalad ayaa dhacay xilligii PDF-ka la samaynayay.";

/// Message shown when the document engine is missing altogether.
pub const RENDERER_MISSING_USER_MESSAGE: &str =
    "Nidaamka PDF lama helin. Fadlan bogga dib u cusboonaysii.";

/// What a card shows: the displayed record, the photo and the language the
/// record is written in.
#[derive(Debug, Clone, Copy)]
pub struct CardContent<'a> {
    pub record: &'a ProfileRecord,
    pub image: Option<&'a ImageDatum>,
    pub language: Language,
}

/// The rendered visual surface of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCard {
    /// Complete HTML document.
    pub html: String,
    pub language: Language,
    /// Document title, used by engines that set PDF metadata.
    pub title: String,
}

/// Port for building a card's visual surface.
pub trait CardRenderer: Send + Sync {
    fn render(&self, content: CardContent<'_>) -> RenderedCard;
}

/// Port for capturing a rendered card as a document.
///
/// # Contract
///
/// Implementations must:
/// - Produce exactly one document per call, or fail
/// - Give up once `options.image_timeout` has elapsed
/// - Report a missing engine as `ExportError::ServiceUnavailable`
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Capture the card as PDF bytes.
    async fn render_pdf(
        &self,
        card: &RenderedCard,
        options: &DocumentOptions,
    ) -> Result<Vec<u8>, ExportError>;

    /// Check if the engine is installed and runnable.
    async fn is_available(&self) -> bool;
}

/// Page setup for document capture.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentOptions {
    pub page_size: PageSize,
    pub orientation: Orientation,
    /// Margin on every side, in millimetres.
    pub margin_mm: u32,
    /// Resolution multiplier for the capture.
    pub scale: f32,
    /// Upper bound on the whole capture, image loading included.
    pub image_timeout: Duration,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            margin_mm: 15,
            scale: 4.0,
            image_timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageSize {
    #[serde(alias = "a4")]
    A4,
    #[serde(alias = "letter")]
    Letter,
}

impl PageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::Letter => "Letter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "Portrait",
            Orientation::Landscape => "Landscape",
        }
    }
}

/// Export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Pretty-printed profile record.
    Json,
    /// Captured card.
    Pdf,
    /// Rendered card page.
    Html,
}

impl ExportFormat {
    /// Get the MIME content type for this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Html => "text/html; charset=utf-8",
        }
    }

    /// Get the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Html => "html",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "pdf" => Ok(ExportFormat::Pdf),
            "html" | "htm" => Ok(ExportFormat::Html),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// RFC 5987 `attr-char`: everything else is percent-encoded.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// An exported file ready for download.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub content: Vec<u8>,
    pub content_type: String,
    /// `<prefix>-<slug>.<extension>`
    pub filename: String,
    pub format: ExportFormat,
}

impl ExportedFile {
    pub fn new(content: Vec<u8>, format: ExportFormat, prefix: &str, slug: &str) -> Self {
        Self {
            content,
            content_type: format.content_type().to_string(),
            filename: format!("{}-{}.{}", prefix, slug, format.extension()),
            format,
        }
    }

    /// `Content-Disposition` header value for a download.
    ///
    /// Names come from model output and may hold quotes, control characters
    /// or non-Latin script. The quoted `filename` is a printable-ASCII
    /// fallback; `filename*` carries the exact name as UTF-8.
    pub fn content_disposition(&self) -> String {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            ascii_filename(&self.filename),
            utf8_percent_encode(&self.filename, ATTR_CHAR)
        )
    }
}

fn ascii_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect()
}

/// Errors that can occur during export.
#[derive(Debug, Clone, Error)]
pub enum ExportError {
    /// Another export has not finished yet.
    #[error("An export is already in progress")]
    AlreadyInProgress,

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// The document engine is not installed or cannot be started.
    #[error("Export service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Document rendering failed: {0}")]
    RenderFailed(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Export timed out after {0} seconds")]
    Timeout(u64),

    #[error("I/O error during export: {0}")]
    IoError(String),
}

impl ExportError {
    pub fn service_unavailable(reason: impl Into<String>) -> Self {
        Self::ServiceUnavailable(reason.into())
    }

    pub fn render_failed(reason: impl Into<String>) -> Self {
        Self::RenderFailed(reason.into())
    }

    pub fn io_error(reason: impl Into<String>) -> Self {
        Self::IoError(reason.into())
    }

    /// Text to show the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ExportError::ServiceUnavailable(_) => RENDERER_MISSING_USER_MESSAGE,
            _ => EXPORT_USER_MESSAGE,
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_format_content_types_are_correct() {
        assert_eq!(ExportFormat::Json.content_type(), "application/json");
        assert_eq!(ExportFormat::Pdf.content_type(), "application/pdf");
        assert_eq!(ExportFormat::Html.content_type(), "text/html; charset=utf-8");
    }

    #[test]
    fn export_format_parses_from_string() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("htm".parse::<ExportFormat>().unwrap(), ExportFormat::Html);
        assert!(matches!(
            "docx".parse::<ExportFormat>(),
            Err(ExportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn exported_file_name_uses_prefix_and_slug() {
        let file = ExportedFile::new(b"{}".to_vec(), ExportFormat::Json, "somalipin", "ali-xasan");
        assert_eq!(file.filename, "somalipin-ali-xasan.json");
        assert_eq!(file.content_type, "application/json");
        assert_eq!(
            file.content_disposition(),
            "attachment; filename=\"somalipin-ali-xasan.json\"; filename*=UTF-8''somalipin-ali-xasan.json"
        );
    }

    #[test]
    fn quotes_and_backslashes_stay_out_of_quoted_filename() {
        let file = ExportedFile::new(vec![], ExportFormat::Json, "somalipin", "cali-\"dheere\"-x\\");
        assert_eq!(
            file.content_disposition(),
            "attachment; filename=\"somalipin-cali-dheere-x.json\"; \
             filename*=UTF-8''somalipin-cali-%22dheere%22-x%5C.json"
        );
    }

    #[test]
    fn control_characters_are_dropped() {
        let file = ExportedFile::new(vec![], ExportFormat::Pdf, "somalipin", "cali\u{7f}xasan\t");
        let header = file.content_disposition();
        assert!(header.starts_with("attachment; filename=\"somalipin-calixasan.pdf\";"));
        assert!(header.ends_with("filename*=UTF-8''somalipin-cali%7Fxasan%09.pdf"));
        assert!(header.bytes().all(|b| (0x20..0x7f).contains(&b)));
    }

    #[test]
    fn non_latin_names_are_percent_encoded() {
        let file = ExportedFile::new(vec![], ExportFormat::Json, "somalipin", "阿米娜-阿里");
        assert_eq!(
            file.content_disposition(),
            "attachment; filename=\"somalipin-___-__.json\"; \
             filename*=UTF-8''somalipin-%E9%98%BF%E7%B1%B3%E5%A8%9C-%E9%98%BF%E9%87%8C.json"
        );
    }

    #[test]
    fn default_document_options_match_card_layout() {
        let options = DocumentOptions::default();
        assert_eq!(options.page_size, PageSize::A4);
        assert_eq!(options.orientation, Orientation::Portrait);
        assert_eq!(options.margin_mm, 15);
        assert_eq!(options.scale, 4.0);
        assert_eq!(options.image_timeout, Duration::from_secs(15));
    }

    #[test]
    fn user_messages_distinguish_missing_engine() {
        assert_eq!(
            ExportError::service_unavailable("wkhtmltopdf not found").user_message(),
            RENDERER_MISSING_USER_MESSAGE
        );
        assert_eq!(ExportError::Timeout(15).user_message(), EXPORT_USER_MESSAGE);
        assert_eq!(ExportError::AlreadyInProgress.user_message(), EXPORT_USER_MESSAGE);
    }

    #[test]
    fn export_error_displays_correctly() {
        assert_eq!(ExportError::Timeout(15).to_string(), "Export timed out after 15 seconds");
        assert_eq!(
            ExportError::AlreadyInProgress.to_string(),
            "An export is already in progress"
        );
    }

    #[test]
    fn ports_are_object_safe() {
        fn _renderer(_r: &dyn DocumentRenderer) {}
        fn _card(_c: &dyn CardRenderer) {}
    }
}
