//! HTML card renderer.
//!
//! Builds a self-contained page for one card: banner, embedded photo, name,
//! tagline, category badge, summary, numbered achievements, quote and source
//! note. The same page is served as the live preview and handed to the PDF
//! engine, so what the user sees is what gets captured.

use std::fmt::Write as _;

use crate::domain::profile::Language;
use crate::ports::{CardContent, CardRenderer, RenderedCard};

/// Renders cards as HTML.
#[derive(Debug, Clone, Default)]
pub struct HtmlCardRenderer;

impl HtmlCardRenderer {
    pub fn new() -> Self {
        Self
    }
}

struct Headings {
    summary: &'static str,
    achievements: &'static str,
    quote: &'static str,
}

fn headings(language: Language) -> Headings {
    if language.is_source() {
        Headings {
            summary: "Sooyaal Kooban",
            achievements: "Guulaha &amp; Saameynta",
            quote: "Xigasho",
        }
    } else {
        Headings {
            summary: "Summary",
            achievements: "Achievements",
            quote: "Quote",
        }
    }
}

fn or_placeholder<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    if text.trim().is_empty() {
        placeholder
    } else {
        text
    }
}

impl CardRenderer for HtmlCardRenderer {
    fn render(&self, content: CardContent<'_>) -> RenderedCard {
        let record = content.record;
        let language = content.language;
        let labels = headings(language);

        let name = or_placeholder(&record.name, "Magaca lama helin");
        let summary = or_placeholder(
            &record.summary,
            "Sooyaalka qofka laguma guuleysan in la soo saaro.",
        );
        let quote = or_placeholder(&record.quote, "Guusha waxay ku timaadaa dedaal joogto ah.");
        let attestation = or_placeholder(&record.source_attestation, "Source verified by Somalipin AI");

        let photo = match content.image {
            Some(image) => format!(
                r#"<img class="photo" src="{}" alt="Profile">"#,
                html_escape(image.data_uri())
            ),
            None => r#"<div class="photo placeholder"></div>"#.to_string(),
        };

        let mut achievements = String::new();
        for (index, item) in record.achievements.iter().enumerate() {
            // Writing to a String cannot fail.
            let _ = write!(
                achievements,
                "\n        <li><span class=\"number\">{}</span>{}</li>",
                index + 1,
                html_escape(item)
            );
        }

        let direction = if language.is_rtl() { "rtl" } else { "ltr" };
        let title = format!("Somalipin - {}", name);

        let html = format!(
            r#"<!DOCTYPE html>
<html lang="{lang}" dir="{dir}">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body>
<article class="card">
    <header class="banner">{photo}</header>
    <section class="identity">
        <h1 class="name">{name}</h1>
        <p class="tagline">{tagline}</p>
        <span class="category">{category}</span>
    </section>
    <section class="summary">
        <h2>{summary_heading}</h2>
        <p>{summary}</p>
    </section>
    <section class="achievements">
        <h2>{achievements_heading}</h2>
        <ol>{achievements}
        </ol>
    </section>
    <blockquote class="quote">
        <span class="label">{quote_heading}</span>
        <p>&quot;{quote}&quot;</p>
    </blockquote>
    <footer>
        <span class="attestation">{attestation}</span>
        <span class="engine">SOMALIPIN AI ENGINE - {lang_upper}</span>
    </footer>
</article>
</body>
</html>"#,
            lang = language.code(),
            dir = direction,
            title = html_escape(&title),
            css = CARD_CSS,
            photo = photo,
            name = html_escape(name),
            tagline = html_escape(&record.tagline),
            category = html_escape(&record.category),
            summary_heading = labels.summary,
            summary = html_escape(summary),
            achievements_heading = labels.achievements,
            achievements = achievements,
            quote_heading = labels.quote,
            quote = html_escape(quote),
            attestation = html_escape(attestation),
            lang_upper = language.code().to_uppercase(),
        );

        RenderedCard {
            html,
            language,
            title,
        }
    }
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const CARD_CSS: &str = r#"
* { box-sizing: border-box; }
body { margin: 0; font-family: 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif; color: #1f2937; background: #ffffff; }
.card { max-width: 42rem; margin: 0 auto; border: 1px solid #dbeafe; border-radius: 1.5rem; overflow: hidden; }
.banner { height: 8rem; background: linear-gradient(to right, #1d4ed8, #3b82f6); position: relative; }
.photo { position: absolute; bottom: -3rem; left: 2rem; width: 8rem; height: 8rem; border: 4px solid #ffffff; border-radius: 1rem; object-fit: cover; background: #f3f4f6; }
[dir="rtl"] .photo { left: auto; right: 2rem; }
.identity { padding: 4rem 2rem 0; }
.name { font-size: 1.875rem; font-weight: 800; margin: 0; }
.tagline { color: #2563eb; font-weight: 600; margin: 0.5rem 0; }
.category { display: inline-block; padding: 0.375rem 1rem; background: #eff6ff; color: #1d4ed8; border: 1px solid #dbeafe; border-radius: 9999px; font-size: 0.875rem; font-weight: 700; text-transform: uppercase; }
section, blockquote, footer { padding: 0 2rem; }
h2 { font-size: 0.875rem; color: #9ca3af; text-transform: uppercase; letter-spacing: 0.1em; margin-top: 2rem; }
.summary p { white-space: pre-line; line-height: 1.6; }
ol { list-style: none; padding: 0; }
li { display: flex; margin-bottom: 0.75rem; }
.number { flex-shrink: 0; width: 1.5rem; height: 1.5rem; margin: 0 0.75rem; border-radius: 9999px; background: #dbeafe; color: #2563eb; font-size: 0.75rem; text-align: center; line-height: 1.5rem; }
.quote { margin: 2rem; padding: 1.5rem; background: #eff6ff; border-radius: 1rem; font-style: italic; }
.quote .label { font-size: 0.75rem; font-weight: 700; color: #60a5fa; text-transform: uppercase; font-style: normal; }
footer { display: flex; justify-content: space-between; padding-bottom: 2rem; font-size: 0.75rem; color: #9ca3af; }
"#;
