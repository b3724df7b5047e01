//! # sdf
//!
//! Command-line front end for testing chisel slice definitions: installs every
//! slice of the given definition files, concurrently.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, warn};

use chisel_sdf::archive::ArchiveError;
use chisel_sdf::chisel::{parse_slices, Slice};
use chisel_sdf::config::InstallerConfig;
use chisel_sdf::constants::CROSS;
use chisel_sdf::logging::{init_structured_logging, LogFormat};
use chisel_sdf::orchestration::{InstallOptions, SliceOrchestrator};
use chisel_sdf::SdfError;

#[derive(Parser)]
#[command(name = "sdf")]
#[command(about = "Slice definition file tooling for chisel releases")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install all slices from the specified files
    Install(InstallArgs),

    /// Print the install plan as JSON without installing anything
    Plan(InstallArgs),
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Chisel release path
    #[arg(short, long)]
    release: PathBuf,

    /// Package architecture
    #[arg(short, long)]
    arch: Option<String>,

    /// Number of concurrent workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Install all slices in one go
    #[arg(long)]
    combine: bool,

    /// Install only the top level slices
    #[arg(long)]
    prune: bool,

    /// Continue on installation errors
    #[arg(short, long = "continue-on-error")]
    continue_on_error: bool,

    /// Ignore missing packages for an arch
    #[arg(long)]
    ignore_missing: bool,

    /// Ensure package existence for at least one arch
    #[arg(long)]
    ensure_existence: bool,

    /// Slice definition files
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,
}

impl InstallArgs {
    fn options(&self, config: &InstallerConfig) -> InstallOptions {
        let mut options = InstallOptions::from_config(config, &self.release);
        if let Some(arch) = &self.arch {
            options.arch = arch.clone();
        }
        if let Some(workers) = self.workers {
            options.workers = workers;
        }
        options.combine = self.combine;
        options.prune = self.prune;
        options.continue_on_error = self.continue_on_error;
        options.ignore_missing = self.ignore_missing;
        options.ensure_existence = self.ensure_existence;
        options
    }

    fn load_slices(&self) -> Result<Vec<Slice>> {
        let mut slices = Vec::new();
        for file in &self.files {
            let parsed = parse_slices(file)
                .with_context(|| format!("cannot parse slices from file {}", file.display()))?;
            slices.extend(parsed);
        }
        Ok(slices)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_structured_logging(if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    });

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = InstallerConfig::from_env().context("cannot load configuration")?;

    match cli.command {
        Commands::Install(args) => install(&config, args).await,
        Commands::Plan(args) => plan(&config, args).await,
    }
}

async fn install(config: &InstallerConfig, args: InstallArgs) -> Result<()> {
    let options = args.options(config);
    options.validate()?;
    if args.files.is_empty() {
        info!("No slice definition files given, nothing to do");
        return Ok(());
    }
    let slices = args.load_slices()?;

    let orchestrator = SliceOrchestrator::from_config(config);
    let cancellation = orchestrator.cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping installs");
            cancellation.cancel();
        }
    });

    match orchestrator.run(slices, &options).await {
        Err(SdfError::Archive(e @ ArchiveError::MissingPackage(_))) => {
            Err(anyhow::anyhow!("{} Could not ensure packages: {}", CROSS, e))
        }
        other => other.map_err(Into::into),
    }
}

async fn plan(config: &InstallerConfig, args: InstallArgs) -> Result<()> {
    let options = args.options(config);
    let slices = args.load_slices()?;

    let plan = SliceOrchestrator::from_config(config)
        .plan(slices, &options)
        .await?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
