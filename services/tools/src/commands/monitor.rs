//! `readout monitor`: the driver loop
//!
//! Pulls records from a subscriber or a record file until end-of-stream,
//! feeds each one to the stream analyzer, and reports final statistics.
//! Exits non-zero when any record failed validation.

use anyhow::{Context, Result};
use clap::Args;
use readout_codec::{AnalyzerConfig, AnalyzerStats, LineSink, StreamAnalyzer, TracingSink, WriterSink};
use readout_config::MonitorConfig;
use readout_network::{RecordSubscriber, SubscriberConfig};
use readout_types::{RecordFileReader, RecordSource};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Args, Debug, Default)]
pub struct MonitorArgs {
    /// Publisher endpoint, overrides [subscriber] address
    #[arg(short, long)]
    pub address: Option<String>,

    /// Read records from a file instead of subscribing
    #[arg(short, long, conflicts_with = "address")]
    pub input: Option<PathBuf>,

    /// Statistics cadence in records, overrides [analyzer] output_interval
    #[arg(long)]
    pub interval: Option<u64>,

    /// Output line prefix, overrides [analyzer] output_prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Receive high-water mark, overrides [subscriber] high_water_mark
    #[arg(long)]
    pub hwm: Option<u32>,

    /// Write analyzer lines to stdout instead of the log
    #[arg(long)]
    pub stdout: bool,
}

impl MonitorArgs {
    fn analyzer_config(&self, config: &MonitorConfig) -> AnalyzerConfig {
        let mut analyzer = config.analyzer.clone();
        if let Some(interval) = self.interval {
            analyzer.output_interval = interval;
        }
        if let Some(prefix) = &self.prefix {
            analyzer.output_prefix = prefix.clone();
        }
        analyzer
    }

    fn subscriber_config(&self, config: &MonitorConfig) -> SubscriberConfig {
        let mut subscriber = config.subscriber.clone();
        if let Some(address) = &self.address {
            subscriber.address = address.clone();
        }
        if let Some(hwm) = self.hwm {
            subscriber.high_water_mark = hwm;
        }
        subscriber
    }
}

pub fn run(args: &MonitorArgs, config: &MonitorConfig) -> Result<ExitCode> {
    let analyzer_config = args.analyzer_config(config);
    let sink: Box<dyn LineSink> = if args.stdout {
        Box::new(WriterSink::stdout())
    } else {
        Box::new(TracingSink)
    };

    let mut source: Box<dyn RecordSource> = match &args.input {
        Some(path) => {
            info!("Reading records from {:?}", path);
            Box::new(
                RecordFileReader::open(path)
                    .with_context(|| format!("Failed to open record file {:?}", path))?,
            )
        }
        None => {
            let subscriber_config = args.subscriber_config(config);
            Box::new(
                RecordSubscriber::connect(&subscriber_config)
                    .with_context(|| format!("Failed to subscribe to {}", subscriber_config.address))?,
            )
        }
    };

    let stats = monitor(source.as_mut(), &analyzer_config, sink)?;
    Ok(exit_code(&stats))
}

/// Run the analyzer over `source` until end-of-stream
pub fn monitor<S: LineSink>(
    source: &mut dyn RecordSource,
    analyzer_config: &AnalyzerConfig,
    sink: S,
) -> Result<AnalyzerStats> {
    let mut analyzer =
        StreamAnalyzer::new(analyzer_config, sink).context("Invalid analyzer configuration")?;
    analyzer.run(source);
    let (stats, _) = analyzer.finish();

    if stats.error_count > 0 {
        warn!(
            records = stats.record_count,
            errors = stats.error_count,
            truncated = stats.truncated_count,
            "❌ Stream had integrity errors"
        );
    } else {
        info!(
            records = stats.record_count,
            truncated = stats.truncated_count,
            "✅ Stream passed all checks"
        );
    }
    Ok(stats)
}

fn exit_code(stats: &AnalyzerStats) -> ExitCode {
    if stats.error_count > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
