//! Autoproj - command-line entry point
//!
//! Loads the configuration, sets up logging and runs the project build
//! against the JSON-persisted project document.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use autoproj_core::assets::{load_rename_map, rename_media, RenameReport};
use autoproj_core::config::{ConfigManager, Settings, DEFAULT_CONFIG_PATH};
use autoproj_core::host::{FfprobeMediaProbe, LocalFileSystem, MemoryHost};
use autoproj_core::logging::{init_tracing_with_file, ConsoleCallback, LogLevel, RunLogger};
use autoproj_core::manifest::load_manifest;
use autoproj_core::orchestrator::{Orchestrator, RunReport};

/// Command-line arguments for autoproj
#[derive(Parser, Debug)]
#[command(name = "autoproj")]
#[command(about = "Build an editing project from a sequence manifest")]
#[command(version)]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, env = "AUTOPROJ_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import media and build every sequence in the manifest
    Build,
    /// Load and validate the manifest without touching the project
    Validate,
    /// Rename source videos according to a JSON mapping
    Rename {
        /// Mapping file (defaults to paths.rename_map)
        #[arg(short, long)]
        map: Option<PathBuf>,
    },
    /// Write the default configuration file
    InitConfig {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Command::InitConfig { force } = args.command {
        return init_config(&args.config, force);
    }

    let mut manager = ConfigManager::new(&args.config);
    manager
        .load_or_create()
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;
    let settings = manager.into_settings();

    // Run lines are echoed to stdout; keep stderr for problems only.
    let diagnostics_level = if settings.logging.echo_console {
        LogLevel::Warning
    } else {
        settings.logging.level
    };
    let _guard = init_tracing_with_file(diagnostics_level, &settings.logs_folder());
    tracing::debug!(
        "autoproj {} using config {}",
        autoproj_core::version(),
        args.config.display()
    );

    match args.command {
        Command::Build => build(settings),
        Command::Validate => validate(&settings),
        Command::Rename { map } => rename(&settings, map),
        Command::InitConfig { .. } => Ok(()),
    }
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!(
            "Config already exists: {} (use --force to replace it)",
            path.display()
        );
        return Ok(());
    }

    let mut manager = ConfigManager::new(path);
    *manager.settings_mut() = Settings::default();
    manager
        .save()
        .with_context(|| format!("Failed to write config {}", path.display()))?;
    println!("Wrote default config: {}", path.display());
    Ok(())
}

fn build(settings: Settings) -> Result<()> {
    let console: Option<ConsoleCallback> = if settings.logging.echo_console {
        Some(Box::new(|line: &str| println!("{}", line)))
    } else {
        None
    };
    let logger = Arc::new(RunLogger::new(
        settings.log_file(),
        settings.logging.log_config(),
        console,
    ));

    let mut host = MemoryHost::new(FfprobeMediaProbe::new(settings.sequences.still_duration()));
    let orchestrator = Orchestrator::new(settings, Arc::clone(&logger));

    let report = orchestrator.run(&mut host).context("Project build failed")?;
    print_report(&report);
    Ok(())
}

fn validate(settings: &Settings) -> Result<()> {
    let path = settings.manifest_file();
    let manifest = load_manifest(&LocalFileSystem, &path)?;

    println!("Manifest OK: {}", path.display());
    for section in &manifest.sections {
        println!("  {} ({} sequences)", section.name, section.sequences.len());
        for spec in &section.sequences {
            println!(
                "    {:<30} {} | {} | {}",
                spec.sequence_name, spec.start_slide, spec.video, spec.end_slide
            );
        }
    }
    Ok(())
}

fn rename(settings: &Settings, map: Option<PathBuf>) -> Result<()> {
    let map_path = map.unwrap_or_else(|| settings.rename_map());
    let mapping = load_rename_map(&LocalFileSystem, &map_path)?;
    let folder = settings.video_folder();

    let report = rename_media(&LocalFileSystem, &folder, &mapping)
        .with_context(|| format!("Failed to rename media in {}", folder.display()))?;
    print_rename_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    println!();
    println!("Run {}", report.run_id);
    println!(
        "Videos: {} imported, {} missing, {} failed",
        report.video_import.imported.len(),
        report.video_import.missing.len(),
        report.video_import.failed.len()
    );
    println!(
        "Slides: {} imported, {} missing, {} failed",
        report.slide_import.imported.len(),
        report.slide_import.missing.len(),
        report.slide_import.failed.len()
    );
    println!();
    println!("{:<20} {:<30} STATUS", "SECTION", "SEQUENCE");
    for outcome in &report.outcomes {
        println!(
            "{:<20} {:<30} {}",
            outcome.section, outcome.sequence_name, outcome.status
        );
    }
    println!();
    println!("{}", report.summary());
}

fn print_rename_report(report: &RenameReport) {
    for (from, to) in &report.renamed {
        println!("renamed   {} -> {}", from, to);
    }
    for name in &report.missing {
        println!("missing   {}", name);
    }
    for (from, to) in &report.conflicts {
        println!("conflict  {} -> {} (target exists)", from, to);
    }
    for (name, error) in &report.failed {
        println!("failed    {}: {}", name, error);
    }
    println!(
        "{} renamed, {} unchanged, {} missing, {} conflicts, {} failed",
        report.renamed.len(),
        report.unchanged.len(),
        report.missing.len(),
        report.conflicts.len(),
        report.failed.len()
    );
}
