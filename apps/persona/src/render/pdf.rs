//! HTML → PDF through the external `wkhtmltopdf` converter.

use std::io::Write;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::errors::AppError;

#[derive(Debug, Clone)]
pub struct PdfConverter {
    binary: String,
}

impl PdfConverter {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Converts `html` into a PDF at `output`. Blocks until the converter exits.
    pub fn convert(&self, html: &str, output: &Path) -> Result<(), AppError> {
        let mut input = tempfile::Builder::new()
            .prefix("persona-")
            .suffix(".html")
            .tempfile()
            .map_err(|e| AppError::storage(std::env::temp_dir(), e))?;
        input
            .write_all(html.as_bytes())
            .and_then(|_| input.flush())
            .map_err(|e| AppError::storage(input.path(), e))?;

        let mut cmd = Command::new(&self.binary);
        cmd.arg("--quiet")
            .arg("--encoding")
            .arg("utf-8")
            .arg(input.path())
            .arg(output);
        debug!("Running {cmd:?}");

        let result = cmd.output().map_err(|e| {
            AppError::Render(format!("Failed to execute '{}': {e}", self.binary))
        })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(AppError::Render(format!(
                "'{}' exited with {}: {}",
                self.binary,
                result.status,
                stderr.trim()
            )));
        }

        info!("PDF saved to {}", output.display());
        Ok(())
    }
}
