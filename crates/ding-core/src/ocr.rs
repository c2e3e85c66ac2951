//! Adding a text layer to scanned inbound documents.

use std::path::Path;
use std::process::Command;

use tokio::sync::mpsc::UnboundedSender;

use crate::config::settings::OcrConfig;
use crate::error::{CoreError, CoreResult};
use crate::index::DocIndex;

/// Runs OCR on one file, rewriting it in place.
pub trait OcrProcessor: Send + Sync {
    fn process(&self, path: &Path) -> CoreResult<()>;
}

/// [`OcrProcessor`] backed by `ocrmypdf`.
#[derive(Debug, Clone)]
pub struct OcrMyPdf {
    program: String,
    language: String,
}

impl OcrMyPdf {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            program: config.program.clone(),
            language: config.language.clone(),
        }
    }
}

impl Default for OcrMyPdf {
    fn default() -> Self {
        Self::new(&OcrConfig::default())
    }
}

impl OcrProcessor for OcrMyPdf {
    fn process(&self, path: &Path) -> CoreResult<()> {
        let output = Command::new(&self.program)
            .arg("-q")
            .arg("-l")
            .arg(&self.language)
            .arg(path)
            .arg(path)
            .output()
            .map_err(|e| CoreError::Tool {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoreError::Tool {
                program: self.program.clone(),
                message: format!("{} ({})", stderr.trim(), output.status),
            });
        }
        Ok(())
    }
}

/// Progress of a running OCR batch.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrProgress {
    /// Share of files started, from `0.0` to `1.0`.
    pub fraction: f32,
    /// The file being processed, `None` once the batch is done.
    pub current: Option<String>,
}

/// What a finished batch did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OcrSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Runs OCR over every inbound file, reporting progress on `progress`.
///
/// Blocks until the whole batch is done. A failing file is logged and
/// counted, and the batch moves on. The inbound listing warms nothing; each
/// file gets its preview refreshed in the background once OCR has rewritten
/// it. A closed `progress` receiver is ignored.
///
/// # Errors
///
/// Only listing the inbound root can fail the batch.
pub fn run_ocr_batch(
    index: &DocIndex,
    processor: &dyn OcrProcessor,
    progress: &UnboundedSender<OcrProgress>,
) -> CoreResult<OcrSummary> {
    let files: Vec<String> = index
        .inbound_files()?
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    let total = files.len();
    let mut summary = OcrSummary::default();

    for (i, name) in files.iter().enumerate() {
        let _ = progress.send(OcrProgress {
            fraction: i as f32 / total as f32,
            current: Some(name.clone()),
        });
        match index.ocr_one(name, processor) {
            Ok(_) => summary.processed += 1,
            Err(e) => {
                tracing::warn!("ocr failed for {name}: {e}");
                summary.failed += 1;
            }
        }
    }

    let _ = progress.send(OcrProgress {
        fraction: 1.0,
        current: None,
    });
    tracing::info!(
        "ocr batch finished: {} processed, {} failed",
        summary.processed,
        summary.failed
    );
    Ok(summary)
}
