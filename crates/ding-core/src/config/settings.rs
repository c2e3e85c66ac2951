//! Application configuration loaded from a TOML file.
//!
//! Every field has a default, so ding runs without a config file. Command
//! line flags override the loaded values in the binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub warmup: WarmupConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
}

impl Config {
    /// Loads configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(e),
        })?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> CoreResult<Self> {
        match Self::load(path) {
            Err(CoreError::NotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    /// `<config_dir>/ding/config.toml`, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ding").join("config.toml"))
    }
}

/// Inbound and destination roots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_inbound")]
    pub inbound: PathBuf,
    #[serde(default = "default_destination")]
    pub destination: PathBuf,
}

impl PathsConfig {
    /// The inbound root with a leading `~` expanded.
    pub fn inbound_root(&self) -> PathBuf {
        expand_home(&self.inbound)
    }

    /// The destination root with a leading `~` expanded.
    pub fn destination_root(&self) -> PathBuf {
        expand_home(&self.destination)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            inbound: default_inbound(),
            destination: default_destination(),
        }
    }
}

/// Background cache population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarmupConfig {
    /// Maximum number of refreshes running at once.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

/// Preview extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default = "default_extract_program")]
    pub program: String,
    #[serde(default = "default_page")]
    pub first_page: u32,
    #[serde(default = "default_page")]
    pub last_page: u32,
    /// Shown when a document has no text layer yet.
    #[serde(default = "default_empty_placeholder")]
    pub empty_placeholder: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            program: default_extract_program(),
            first_page: default_page(),
            last_page: default_page(),
            empty_placeholder: default_empty_placeholder(),
        }
    }
}

/// OCR settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_ocr_program")]
    pub program: String,
    #[serde(default = "default_ocr_language")]
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            program: default_ocr_program(),
            language: default_ocr_language(),
        }
    }
}

/// External document viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Program to launch. Empty means the platform default opener.
    #[serde(default = "default_viewer_program")]
    pub program: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            program: default_viewer_program(),
        }
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

fn default_inbound() -> PathBuf {
    PathBuf::from(".")
}

fn default_destination() -> PathBuf {
    PathBuf::from("~/Documents")
}

fn default_workers() -> usize {
    4
}

fn default_extract_program() -> String {
    "pdftotext".to_string()
}

fn default_page() -> u32 {
    1
}

fn default_empty_placeholder() -> String {
    "- no OCR content -".to_string()
}

fn default_ocr_program() -> String {
    "ocrmypdf".to_string()
}

fn default_ocr_language() -> String {
    "deu".to_string()
}

fn default_viewer_program() -> String {
    "xdg-open".to_string()
}
