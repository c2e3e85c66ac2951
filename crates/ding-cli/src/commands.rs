//! Subcommand implementations.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::{bail, Context};
use chrono::{DateTime, Local};
use crossterm::style::Stylize;
use ding_core::config::settings::OcrConfig;
use ding_core::external::DEPENDENCIES;
use ding_core::{
    check_dependencies, open_external, run_ocr_batch, timestamp_prefix_now, Config, Dependency,
    DocIndex, LocalFs, OcrMyPdf, OcrProgress, PdfToText,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::cli::Command;

const SUGGEST_EXTENSIONS: &[&str] = &[".pdf"];

pub async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    let index = || build_index(&config);
    match command {
        Command::Inbound => inbound(&index()).await,
        Command::Dirs => dirs(&index()).await,
        Command::Preview { name } => preview(&index(), &name).await,
        Command::Files { dir } => files(&index(), &dir).await,
        Command::Move {
            name,
            new_name,
            dir,
            stamp,
        } => move_document(&index(), &name, &new_name, &dir, stamp).await,
        Command::Suggest { dir, prefix } => suggest(&index(), &dir, &prefix).await,
        Command::Ocr => ocr(index(), &config.ocr).await,
        Command::Open { name } => open(&index(), &name, &config.viewer.program),
        Command::CheckDeps => {
            print_dependencies();
            Ok(())
        }
    }
}

fn build_index(config: &Config) -> DocIndex {
    DocIndex::new(
        config,
        Arc::new(LocalFs),
        Arc::new(PdfToText::new(&config.extract)),
        Handle::current(),
    )
}

async fn inbound(index: &DocIndex) -> anyhow::Result<()> {
    let listing = index.list_inbound()?;
    listing.warmup.wait().await;

    for entry in listing.entries.iter().filter(|e| !e.is_dir()) {
        let preview = index.get_preview(entry.name());
        println!(
            "{:<40} {:>10}  {}",
            entry.name(),
            format_size(entry.size()),
            first_line(&preview)
        );
    }
    Ok(())
}

async fn dirs(index: &DocIndex) -> anyhow::Result<()> {
    let listing = index.list_destination_directories()?;
    for entry in &listing.entries {
        println!("{:<30} {:>5}", entry.name(), index.count_files(entry.name()));
    }
    listing.warmup.wait().await;
    Ok(())
}

async fn preview(index: &DocIndex, name: &str) -> anyhow::Result<()> {
    if !index.inbound_files()?.iter().any(|e| e.name() == name) {
        bail!("{name} is not in the inbound directory");
    }
    index.refresh_preview(name).wait().await;
    println!("{}", index.get_preview(name));
    Ok(())
}

async fn files(index: &DocIndex, dir: &str) -> anyhow::Result<()> {
    index.list_destination_directories()?.warmup.wait().await;
    let Some(entries) = index.get_directory_listing(dir) else {
        bail!("{dir} is not a readable destination directory");
    };
    for entry in entries.iter().filter(|e| !e.is_dir() && !e.is_hidden()) {
        println!(
            "{}  {:>10}  {}",
            format_modified(entry.modified()),
            format_size(entry.size()),
            entry.name()
        );
    }
    Ok(())
}

async fn move_document(
    index: &DocIndex,
    name: &str,
    new_name: &str,
    dir: &str,
    stamp: bool,
) -> anyhow::Result<()> {
    let requested = if stamp {
        format!("{}{new_name}", timestamp_prefix_now())
    } else {
        new_name.to_string()
    };

    let mover = index.clone();
    let (source, target) = (name.to_string(), dir.to_string());
    let result = tokio::task::spawn_blocking(move || {
        mover.move_file(&source, &requested, &target)
    })
    .await
    .context("move task panicked")?;

    match result {
        Ok(outcome) => {
            println!("moved {name} to {dir}/{}", outcome.final_name);
            outcome.refresh.wait().await;
            Ok(())
        }
        Err(e) if e.is_partial_move() => {
            eprintln!("{} {e}", "WARNING:".red().bold());
            Err(e.into())
        }
        Err(e) => Err(e).with_context(|| format!("could not move {name}")),
    }
}

async fn suggest(index: &DocIndex, dir: &str, prefix: &str) -> anyhow::Result<()> {
    index.list_destination_directories()?.warmup.wait().await;
    for name in index.suggest_names(dir, prefix, SUGGEST_EXTENSIONS) {
        println!("{name}");
    }
    Ok(())
}

async fn ocr(index: DocIndex, settings: &OcrConfig) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<OcrProgress>();
    let processor = OcrMyPdf::new(settings);
    let batch = tokio::task::spawn_blocking(move || run_ocr_batch(&index, &processor, &tx));

    while let Some(update) = rx.recv().await {
        if let Some(line) = progress_line(&update) {
            println!("{line}");
        }
    }

    let summary = batch.await.context("ocr task panicked")??;
    println!(
        "ocr finished: {} processed, {} failed",
        summary.processed, summary.failed
    );
    if summary.failed > 0 {
        bail!("{} file(s) could not be processed", summary.failed);
    }
    Ok(())
}

fn open(index: &DocIndex, name: &str, viewer: &str) -> anyhow::Result<()> {
    let path = index.inbound_path(name);
    if !path.is_file() {
        bail!("{name} is not in the inbound directory");
    }
    open_external(&path, viewer)?;
    Ok(())
}

fn print_dependencies() {
    let report = check_dependencies();
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "Running dependency check for 'ding'...");
    for dep in DEPENDENCIES {
        let found = report.available.contains(dep);
        let _ = writeln!(out, "{}", dependency_line(dep, found));
    }
}

fn dependency_line(dep: &Dependency, found: bool) -> String {
    if found {
        format!(
            "{}: {:<10} - You can {}.",
            "FOUND".green(),
            dep.program,
            dep.purpose
        )
    } else {
        format!(
            "{}: {:<10} - You won't be able to {}.",
            "MISSING".red(),
            dep.program,
            dep.purpose
        )
    }
}

fn progress_line(update: &OcrProgress) -> Option<String> {
    let percent = (update.fraction * 100.0).round() as u32;
    update
        .current
        .as_ref()
        .map(|name| format!("[{percent:>3}%] {name}"))
}

fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

fn format_modified(modified: Option<SystemTime>) -> String {
    match modified {
        Some(time) => DateTime::<Local>::from(time)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => "????-??-?? ??:??".to_string(),
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
