///
/// This module implements the CLI interface for tsw-bundle: command parsing,
/// argument defaults and user-visible output.
///
/// All pipeline logic lives in [`crate::bundle`]; this module only wires
/// configuration, the 7-Zip archiver and the console together.
///
/// ## How To Use
/// - From the command line: run `tsw-bundle bundle` inside the directory to archive.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
use crate::archive::SevenZip;
use crate::bundle::{bundle_workspace, plan_workspace};
use crate::load_config::load_config;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI for tsw-bundle: package model description files into encrypted archives.
#[derive(Parser)]
#[clap(
    name = "tsw-bundle",
    version,
    about = "Create password protected 7-Zip archives from the model description files in a directory"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Archive every description file in the workspace
    Bundle(WorkspaceArgs),
    /// Show what would be archived, without touching any file
    Scan(WorkspaceArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct WorkspaceArgs {
    /// Path to an optional YAML config file
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// Directory holding the description files (defaults to the current directory)
    #[clap(long)]
    pub workspace: Option<PathBuf>,
}

impl WorkspaceArgs {
    fn resolve_workspace(&self) -> Result<PathBuf> {
        match &self.workspace {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("Failed to determine current directory"),
        }
    }
}

/// Extracted CLI logic entrypoint for integration tests and main()
pub fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Bundle(args) => {
            let workspace = args.resolve_workspace()?;
            let config = load_config(args.config.as_deref(), workspace)?;

            println!("------------------------------------------------------------------");
            println!(">> RUNNING tsw-bundle in {}", config.workspace.display());
            println!("------------------------------------------------------------------");

            let archiver = SevenZip::new(config.seven_zip.clone());
            match bundle_workspace(&config, &archiver) {
                Ok(report) => {
                    tracing::info!(command = "bundle", archives = report.archives.len(), "Bundling complete");
                    println!("Bundling complete: {} archive(s) created.", report.archives.len());
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "bundle", error = %e, "Bundling failed");
                    Err(anyhow::Error::new(e).context("Bundling failed"))
                }
            }
        }
        Commands::Scan(args) => {
            let workspace = args.resolve_workspace()?;
            let config = load_config(args.config.as_deref(), workspace)?;

            let plan = plan_workspace(&config).context("Scan failed")?;
            if plan.is_empty() {
                println!(
                    "No *.{} files found in {}",
                    config.extensions.description_extension,
                    config.workspace.display()
                );
            }
            for planned in &plan {
                match &planned.archive {
                    Ok(name) => println!("{} -> {}", planned.description.file_name(), name),
                    Err(e) => println!("{} -> ERROR: {}", planned.description.file_name(), e),
                }
                for file in planned.files.file_names() {
                    println!("    {file}");
                }
            }
            tracing::info!(command = "scan", descriptions = plan.len(), "Scan complete");
            Ok(())
        }
    }
}
