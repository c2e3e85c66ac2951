//! Command-line arguments.

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use ding_core::{Config, CoreError};

/// ding - triage scanned documents into your archive
///
/// Lists an inbound folder, shows text previews and moves documents into
/// destination directories under a new name.
#[derive(Parser, Debug, Clone)]
#[command(name = "ding")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Inbound directory holding new scans (overrides the config file)
    #[arg(long = "in", value_name = "DIR", global = true)]
    pub inbound: Option<PathBuf>,

    /// Destination root holding one directory per category
    #[arg(long = "out", value_name = "DIR", global = true)]
    pub destination: Option<PathBuf>,

    /// Configuration file (defaults to <config dir>/ding/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, action = ArgAction::SetTrue, global = true)]
    pub verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List inbound files with the first line of their preview
    Inbound,
    /// List destination directories with their file counts
    Dirs,
    /// Print the text preview of an inbound file
    Preview { name: String },
    /// List a destination directory, newest first
    Files { dir: String },
    /// Move an inbound file into a destination directory
    Move {
        /// Inbound file name
        name: String,
        /// New name; the extension is added when missing
        new_name: String,
        /// Destination directory name
        dir: String,
        /// Prefix the new name with the current timestamp
        #[arg(long, action = ArgAction::SetTrue)]
        stamp: bool,
    },
    /// Suggest names already used in a destination directory
    Suggest {
        dir: String,
        #[arg(default_value = "")]
        prefix: String,
    },
    /// Run OCR over every inbound file
    Ocr,
    /// Open an inbound file in the external viewer
    Open { name: String },
    /// Check which external programs are installed
    CheckDeps,
}

impl Cli {
    /// Loads the configuration and applies the path overrides.
    ///
    /// An explicitly given config file must exist; the default one may be
    /// missing.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("could not load config {}", path.display()))?,
            None => match Config::default_path() {
                Some(path) => Config::load_or_default(&path)
                    .with_context(|| format!("could not load config {}", path.display()))?,
                None => Config::default(),
            },
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(inbound) = &self.inbound {
            config.paths.inbound = inbound.clone();
        }
        if let Some(destination) = &self.destination {
            config.paths.destination = destination.clone();
        }
    }
}

/// Fails unless both roots are existing directories.
pub fn validate_roots(config: &Config) -> anyhow::Result<()> {
    for (label, path) in [
        ("inbound", config.paths.inbound_root()),
        ("destination", config.paths.destination_root()),
    ] {
        if !path.exists() {
            return Err(CoreError::NotFound(path)).context(format!("{label} directory"));
        }
        if !path.is_dir() {
            return Err(CoreError::NotADirectory(path)).context(format!("{label} directory"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn parses_move_with_stamp() {
        let cli = parse(&["ding", "move", "scan.pdf", "invoice", "taxes", "--stamp"]);
        assert_eq!(
            cli.command,
            Command::Move {
                name: "scan.pdf".to_string(),
                new_name: "invoice".to_string(),
                dir: "taxes".to_string(),
                stamp: true,
            }
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["ding", "inbound", "--in", "/scans", "-v"]);
        assert_eq!(cli.inbound, Some(PathBuf::from("/scans")));
        assert!(cli.verbose);
        assert_eq!(cli.command, Command::Inbound);
    }

    #[test]
    fn suggest_prefix_defaults_to_empty() {
        let cli = parse(&["ding", "suggest", "bank"]);
        assert_eq!(
            cli.command,
            Command::Suggest {
                dir: "bank".to_string(),
                prefix: String::new(),
            }
        );
    }

    #[test]
    fn check_deps_is_kebab_case() {
        assert_eq!(parse(&["ding", "check-deps"]).command, Command::CheckDeps);
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["ding"]).is_err());
    }

    #[test]
    fn overrides_replace_config_paths() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        fs::write(&config_path, "[paths]\ninbound = \"/a\"\ndestination = \"/b\"\n").unwrap();
        let config_arg = config_path.to_string_lossy().to_string();
        let cli = parse(&["ding", "--config", &config_arg, "--out", "/archive", "dirs"]);

        let config = cli.load_config().unwrap();

        assert_eq!(config.paths.inbound, PathBuf::from("/a"));
        assert_eq!(config.paths.destination, PathBuf::from("/archive"));
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let cli = parse(&["ding", "--config", "/nonexistent/ding.toml", "dirs"]);
        assert!(cli.load_config().is_err());
    }

    #[test]
    fn validate_roots_rejects_missing_and_files() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        let mut config = Config::default();
        config.paths.inbound = tmp.path().to_path_buf();

        config.paths.destination = tmp.path().join("missing");
        assert!(validate_roots(&config).is_err());

        config.paths.destination = file;
        let err = validate_roots(&config).unwrap_err();
        assert!(format!("{err:#}").contains("not a directory"));

        config.paths.destination = tmp.path().to_path_buf();
        assert!(validate_roots(&config).is_ok());
    }
}
