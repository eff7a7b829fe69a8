//! Export adapters - Card rendering and PDF capture.
//!
//! - `HtmlCardRenderer` - Self-contained HTML page for a card (preview and capture input)
//! - `WkhtmltopdfRenderer` - PDF capture through the `wkhtmltopdf` binary

mod html_card;
mod wkhtmltopdf;

pub use html_card::HtmlCardRenderer;
pub use wkhtmltopdf::WkhtmltopdfRenderer;
