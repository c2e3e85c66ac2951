//! Text previews of inbound documents.
//!
//! Extraction never fails from the caller's point of view: problems are
//! rendered into the preview text itself so the UI can show them inline.

use std::path::Path;
use std::process::Command;

use crate::config::settings::ExtractConfig;

/// Produces a text preview for a document.
pub trait TextExtractor: Send + Sync {
    /// Returns the preview text, or a diagnostic message if extraction failed.
    fn extract_preview(&self, path: &Path) -> String;
}

/// Runs `pdftotext` (or a compatible program) over a page range and captures stdout.
#[derive(Debug, Clone)]
pub struct PdfToText {
    program: String,
    first_page: u32,
    last_page: u32,
    empty_placeholder: String,
}

impl PdfToText {
    pub fn new(config: &ExtractConfig) -> Self {
        Self {
            program: config.program.clone(),
            first_page: config.first_page,
            last_page: config.last_page.max(config.first_page),
            empty_placeholder: config.empty_placeholder.clone(),
        }
    }

    fn render(&self, status_ok: bool, output: &[u8], failure: Option<String>) -> String {
        let text = String::from_utf8_lossy(output);
        if !status_ok {
            return format!(
                "could not get preview:\n\n{}\n\n{}",
                text.trim_end(),
                failure.unwrap_or_default()
            );
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.empty_placeholder.clone()
        } else {
            trimmed.to_string()
        }
    }
}

impl Default for PdfToText {
    fn default() -> Self {
        Self::new(&ExtractConfig::default())
    }
}

impl TextExtractor for PdfToText {
    fn extract_preview(&self, path: &Path) -> String {
        let result = Command::new(&self.program)
            .arg("-f")
            .arg(self.first_page.to_string())
            .arg("-l")
            .arg(self.last_page.to_string())
            .arg(path)
            .arg("-")
            .output();

        match result {
            // stderr only carries warnings on success
            Ok(out) if out.status.success() => self.render(true, &out.stdout, None),
            Ok(out) => {
                let mut combined = out.stdout;
                combined.extend_from_slice(&out.stderr);
                self.render(false, &combined, Some(out.status.to_string()))
            }
            Err(e) => {
                tracing::debug!("failed to launch {}: {e}", self.program);
                self.render(false, &[], Some(e.to_string()))
            }
        }
    }
}
