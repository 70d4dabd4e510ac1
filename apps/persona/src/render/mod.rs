//! Renderers: two independent projections of the same normalized persona.
//! Text works for every persona; the PDF document needs a structured one.

pub mod document;
pub mod pdf;
pub mod text;

use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::Config;
use crate::errors::AppError;
use crate::persona::models::Persona;
use crate::persona::storage::{persona_path, write_output};

pub use document::{render_html, DocumentContext, DEFAULT_TEMPLATE};
pub use pdf::PdfConverter;
pub use text::render_text;

/// Writes `<output_dir>/<username>_persona.txt`.
pub fn write_text_report(
    config: &Config,
    username: &str,
    persona: &Persona,
) -> Result<PathBuf, AppError> {
    let report = render_text(username, persona);
    let path = write_output(&config.output_dir, username, "txt", report.as_bytes())?;
    info!("Text persona saved to {}", path.display());
    Ok(path)
}

/// Renders `<output_dir>/<username>_persona.pdf`.
/// Returns `None` for a fallback persona, which has nothing to lay out.
pub fn write_pdf_document(
    config: &Config,
    converter: &PdfConverter,
    username: &str,
    persona: &Persona,
) -> Result<Option<PathBuf>, AppError> {
    let Some(profile) = persona.as_profile() else {
        warn!("Persona for u/{username} is unparsed model output; skipping PDF rendering");
        return Ok(None);
    };

    let template = load_template(config)?;
    let context = DocumentContext::from_profile(username, profile);

    info!("Rendering HTML...");
    let html = render_html(&template, &context)?;

    fs::create_dir_all(&config.output_dir)
        .map_err(|e| AppError::storage(&config.output_dir, e))?;
    let path = persona_path(&config.output_dir, username, "pdf");
    info!("Generating PDF at {}...", path.display());
    converter.convert(&html, &path)?;

    Ok(Some(path))
}

fn load_template(config: &Config) -> Result<String, AppError> {
    match &config.template_path {
        Some(path) => fs::read_to_string(path).map_err(|e| AppError::storage(path, e)),
        None => Ok(DEFAULT_TEMPLATE.to_string()),
    }
}
