//! wkhtmltopdf based document renderer.
//!
//! Pipes the rendered card into `wkhtmltopdf - -` and reads the PDF from
//! stdout. The whole capture is bounded by the configured image timeout; on
//! expiry the child process is killed.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::ports::{DocumentOptions, DocumentRenderer, ExportError, RenderedCard};

/// Pixel density wkhtmltopdf assumes at scale 1.
const BASE_DPI: f32 = 96.0;

/// Renders PDFs with an external `wkhtmltopdf` binary.
#[derive(Debug, Clone)]
pub struct WkhtmltopdfRenderer {
    /// Path to the executable. If None, will search PATH.
    binary_path: Option<String>,
}

impl Default for WkhtmltopdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl WkhtmltopdfRenderer {
    pub fn new() -> Self {
        Self { binary_path: None }
    }

    /// Set a custom path to the executable.
    pub fn with_binary_path(mut self, path: impl Into<String>) -> Self {
        self.binary_path = Some(path.into());
        self
    }

    fn command(&self) -> &str {
        self.binary_path.as_deref().unwrap_or("wkhtmltopdf")
    }

    /// Command-line arguments for one capture.
    fn args(card: &RenderedCard, options: &DocumentOptions) -> Vec<String> {
        let margin = format!("{}mm", options.margin_mm);
        let dpi = (BASE_DPI * options.scale).round().max(BASE_DPI) as u32;
        vec![
            "--quiet".to_string(),
            "--encoding".to_string(),
            "utf-8".to_string(),
            "--title".to_string(),
            card.title.clone(),
            "--page-size".to_string(),
            options.page_size.as_str().to_string(),
            "--orientation".to_string(),
            options.orientation.as_str().to_string(),
            "--margin-top".to_string(),
            margin.clone(),
            "--margin-right".to_string(),
            margin.clone(),
            "--margin-bottom".to_string(),
            margin.clone(),
            "--margin-left".to_string(),
            margin,
            "--dpi".to_string(),
            dpi.to_string(),
            "--image-quality".to_string(),
            "100".to_string(),
            "-".to_string(),
            "-".to_string(),
        ]
    }
}

#[async_trait]
impl DocumentRenderer for WkhtmltopdfRenderer {
    #[tracing::instrument(skip(self, card, options), fields(language = %card.language))]
    async fn render_pdf(
        &self,
        card: &RenderedCard,
        options: &DocumentOptions,
    ) -> Result<Vec<u8>, ExportError> {
        let mut child = Command::new(self.command())
            .args(Self::args(card, options))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ExportError::service_unavailable(format!(
                        "{} is not installed. PDF export requires wkhtmltopdf.",
                        self.command()
                    ))
                } else {
                    ExportError::render_failed(format!("Failed to start {}: {}", self.command(), e))
                }
            })?;

        let timeout = options.image_timeout;
        let html = card.html.as_bytes();
        let capture = async {
            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(html)
                    .await
                    .map_err(|e| ExportError::io_error(format!("Failed to write card: {}", e)))?;
            }
            child
                .wait_with_output()
                .await
                .map_err(|e| ExportError::render_failed(format!("wkhtmltopdf execution failed: {}", e)))
        };

        let output = tokio::time::timeout(timeout, capture)
            .await
            .map_err(|_| ExportError::Timeout(timeout_secs(timeout)))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExportError::render_failed(format!(
                "wkhtmltopdf returned error: {}",
                stderr.trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(ExportError::render_failed("wkhtmltopdf produced no output"));
        }

        tracing::debug!(bytes = output.stdout.len(), "pdf rendered");
        Ok(output.stdout)
    }

    async fn is_available(&self) -> bool {
        let output = Command::new(self.command())
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await;

        output.map(|o| o.status.success()).unwrap_or(false)
    }
}

fn timeout_secs(timeout: Duration) -> u64 {
    timeout.as_secs().max(1)
}
