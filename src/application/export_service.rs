//! ExportService - JSON and PDF downloads of the displayed card.
//!
//! PDF capture is single-flight: while one capture runs, further requests
//! fail fast with `AlreadyInProgress` instead of queueing. The guard is
//! released when the capture finishes, fails or is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::DisplayedCard;
use crate::ports::{
    CardContent, CardRenderer, DocumentOptions, DocumentRenderer, ExportError, ExportFormat,
    ExportedFile, RenderedCard,
};

/// Filename prefix of every download.
pub const DEFAULT_FILE_PREFIX: &str = "somalipin";

/// Slack on top of the renderer's own image timeout before giving up.
const CAPTURE_GRACE: Duration = Duration::from_secs(5);

/// Renders and packages card downloads.
pub struct ExportService {
    card_renderer: Arc<dyn CardRenderer>,
    document_renderer: Arc<dyn DocumentRenderer>,
    options: DocumentOptions,
    file_prefix: String,
    in_progress: AtomicBool,
}

/// Clears the in-progress flag on drop.
struct CaptureGuard<'a>(&'a AtomicBool);

impl<'a> CaptureGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, ExportError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::AlreadyInProgress)?;
        Ok(Self(flag))
    }
}

impl Drop for CaptureGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ExportService {
    pub fn new(
        card_renderer: Arc<dyn CardRenderer>,
        document_renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            card_renderer,
            document_renderer,
            options: DocumentOptions::default(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            in_progress: AtomicBool::new(false),
        }
    }

    pub fn with_options(mut self, options: DocumentOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    /// Whether a PDF capture is running.
    pub fn is_exporting(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// The displayed record as pretty-printed JSON with wire keys.
    pub fn export_json(&self, card: &DisplayedCard) -> Result<ExportedFile, ExportError> {
        let json = serde_json::to_string_pretty(&card.record)?;
        let file = ExportedFile::new(
            json.into_bytes(),
            ExportFormat::Json,
            &self.file_prefix,
            &card.record.slug(),
        );
        tracing::info!(card_id = %card.card_id, filename = %file.filename, "json exported");
        Ok(file)
    }

    /// The card page shown as the live preview.
    pub fn render_preview(&self, card: &DisplayedCard) -> RenderedCard {
        self.card_renderer.render(CardContent {
            record: &card.record,
            image: card.image.as_ref(),
            language: card.language,
        })
    }

    /// The card page as a standalone HTML download.
    pub fn export_html(&self, card: &DisplayedCard) -> ExportedFile {
        let page = self.render_preview(card);
        ExportedFile::new(
            page.html.into_bytes(),
            ExportFormat::Html,
            &self.file_prefix,
            &card.record.slug(),
        )
    }

    /// Captures the card page as a PDF.
    ///
    /// # Errors
    ///
    /// - `AlreadyInProgress` while another capture runs
    /// - `Timeout` when the capture overruns
    /// - renderer failures as reported
    #[tracing::instrument(skip(self, card), fields(card_id = %card.card_id, language = %card.language))]
    pub async fn export_pdf(&self, card: &DisplayedCard) -> Result<ExportedFile, ExportError> {
        let _guard = CaptureGuard::acquire(&self.in_progress)?;

        let page = self.render_preview(card);
        let limit = self.options.image_timeout + CAPTURE_GRACE;
        let pdf = tokio::time::timeout(limit, self.document_renderer.render_pdf(&page, &self.options))
            .await
            .map_err(|_| ExportError::Timeout(limit.as_secs()))??;

        let file = ExportedFile::new(pdf, ExportFormat::Pdf, &self.file_prefix, &card.record.slug());
        tracing::info!(filename = %file.filename, bytes = file.content.len(), "pdf exported");
        Ok(file)
    }

    /// Exports in the requested format.
    pub async fn export(
        &self,
        card: &DisplayedCard,
        format: ExportFormat,
    ) -> Result<ExportedFile, ExportError> {
        match format {
            ExportFormat::Json => self.export_json(card),
            ExportFormat::Html => Ok(self.export_html(card)),
            ExportFormat::Pdf => self.export_pdf(card).await,
        }
    }

    pub async fn renderer_available(&self) -> bool {
        self.document_renderer.is_available().await
    }
}
