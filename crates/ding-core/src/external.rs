//! External programs ding relies on.

use std::path::Path;
use std::process::Command;

use crate::error::{CoreError, CoreResult};

/// An external program and what it is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub program: &'static str,
    pub purpose: &'static str,
}

/// Every program ding can make use of.
pub const DEPENDENCIES: &[Dependency] = &[
    Dependency {
        program: "pdftotext",
        purpose: "display textual preview of pdf",
    },
    Dependency {
        program: "xdg-open",
        purpose: "open pdf in your default viewer",
    },
    Dependency {
        program: "ocrmypdf",
        purpose: "run ocr on pdf",
    },
    Dependency {
        program: "img2pdf",
        purpose: "convert image to pdf",
    },
    Dependency {
        program: "ag",
        purpose: "list your documents very fast",
    },
    Dependency {
        program: "fzf",
        purpose: "fuzzy search through your documents",
    },
    Dependency {
        program: "rga",
        purpose: "search inside your documents together with fzf",
    },
];

/// Dependencies split by whether they were found on `PATH`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyReport {
    pub available: Vec<Dependency>,
    pub missing: Vec<Dependency>,
}

impl DependencyReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Looks up every entry of [`DEPENDENCIES`] on `PATH`.
pub fn check_dependencies() -> DependencyReport {
    check(DEPENDENCIES, |program| which::which(program).is_ok())
}

fn check(deps: &[Dependency], found: impl Fn(&str) -> bool) -> DependencyReport {
    let mut report = DependencyReport::default();
    for dep in deps {
        if found(dep.program) {
            report.available.push(*dep);
        } else {
            tracing::debug!("dependency missing: {}", dep.program);
            report.missing.push(*dep);
        }
    }
    report
}

/// Opens `path` in an external viewer.
///
/// With an empty `viewer` the platform's default application is used.
///
/// # Errors
///
/// [`CoreError::Tool`] if the viewer cannot be started or exits unsuccessfully.
pub fn open_external(path: &Path, viewer: &str) -> CoreResult<()> {
    if viewer.is_empty() {
        return open::that(path).map_err(|e| CoreError::Tool {
            program: "default viewer".to_string(),
            message: e.to_string(),
        });
    }

    let status = Command::new(viewer)
        .arg(path)
        .status()
        .map_err(|e| CoreError::Tool {
            program: viewer.to_string(),
            message: e.to_string(),
        })?;
    if !status.success() {
        return Err(CoreError::Tool {
            program: viewer.to_string(),
            message: format!("could not open {}: {status}", path.display()),
        });
    }
    Ok(())
}
