//! readout - detector readout stream tools
//!
//! Usage:
//!   readout monitor --address tcp://daq07:5556 --interval 10000 --prefix link0
//!   readout monitor --input run042.rdout --stdout
//!   readout publish --pattern counter --count 100000 --checksum
//!   readout publish --pattern index --output run042.rdout

mod commands;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{monitor::MonitorArgs, publish::PublishArgs};
use readout_config::MonitorConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "readout")]
#[command(about = "Detector readout stream monitor and test publisher")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides [logging] level
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a record stream and report integrity errors
    Monitor(MonitorArgs),
    /// Generate or replay records and publish them
    Publish(PublishArgs),
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = MonitorConfig::load(cli.config.as_deref())?;
    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    logging::init_logging(level, cli.json_logs || config.logging.json)?;

    info!("Starting readout {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Monitor(args) => commands::monitor::run(&args, &config),
        Command::Publish(args) => commands::publish::run(&args, &config),
    }
}
