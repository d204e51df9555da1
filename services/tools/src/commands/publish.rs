//! `readout publish`: test pattern generator and record replay
//!
//! Produces records either from a [`ContentGenerator`] or from a record
//! file, then publishes them to subscribers (ending with the stream
//! terminator) or writes them to a record file.

use anyhow::{Context, Result};
use clap::Args;
use readout_codec::{create_generator, ChecksumEngine, ContentGenerator};
use readout_config::MonitorConfig;
use readout_network::{PublisherConfig, RecordPublisher, DEFAULT_LINGER};
use readout_types::{PatternFormat, Record, RecordFileReader, RecordFileWriter, RecordFlags, RecordSource, SourceTag};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const PROGRESS_INTERVAL: u64 = 100_000;

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Listen endpoint, overrides [publisher] bind_address
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Content pattern: counter, index or ramp
    #[arg(short, long, default_value = "counter", value_parser = parse_pattern)]
    pub pattern: PatternFormat,

    /// Number of records to generate
    #[arg(short = 'n', long, default_value_t = 10_000)]
    pub count: u64,

    /// Content bytes per record
    #[arg(short, long, default_value_t = 4096)]
    pub size: usize,

    /// Index of the first record
    #[arg(long, default_value_t = 0)]
    pub start_index: u64,

    /// Index increment between records
    #[arg(long, default_value_t = 1)]
    pub delta: u64,

    /// Stamp a CRC-32C checksum into every record
    #[arg(long)]
    pub checksum: bool,

    /// Subscribers to wait for before publishing
    #[arg(long, default_value_t = 1)]
    pub wait_subscribers: usize,

    /// Seconds to wait for subscribers
    #[arg(long, default_value_t = 30)]
    pub wait_timeout: u64,

    /// Records per second; unlimited when absent
    #[arg(long)]
    pub rate: Option<u64>,

    /// Replay records from a file instead of generating them
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Write records to a file instead of publishing
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn parse_pattern(name: &str) -> std::result::Result<PatternFormat, String> {
    PatternFormat::from_name(name)
        .ok_or_else(|| format!("unknown pattern '{}' (expected counter, index or ramp)", name))
}

/// Finite stream of generated pattern records
pub struct PatternSource {
    generator: Box<dyn ContentGenerator>,
    tag: SourceTag,
    next_index: u64,
    delta: u64,
    size: usize,
    remaining: u64,
    checksum: Option<ChecksumEngine>,
}

impl PatternSource {
    pub fn new(format: PatternFormat, start_index: u64, delta: u64, size: usize, count: u64) -> Self {
        Self {
            generator: create_generator(format),
            tag: SourceTag::pattern(format),
            next_index: start_index,
            delta,
            size,
            remaining: count,
            checksum: None,
        }
    }

    pub fn with_checksum(mut self) -> Self {
        self.checksum = Some(ChecksumEngine::new());
        self
    }
}

impl RecordSource for PatternSource {
    fn next_record(&mut self) -> Option<Record> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let index = self.next_index;
        self.next_index = index.wrapping_add(self.delta);
        let content = self.generator.generate(index, self.size);
        let mut record = Record::from_parts(index, self.tag, RecordFlags::empty(), content);
        if let Some(engine) = &self.checksum {
            engine.stamp_record(&mut record);
        }
        Some(record)
    }

    fn is_end_of_stream(&self) -> bool {
        self.remaining == 0
    }
}

/// Spaces records evenly to hold a target rate
struct Pacer {
    period: Option<Duration>,
    next: Instant,
}

impl Pacer {
    fn new(rate: Option<u64>) -> Self {
        Self {
            period: rate
                .filter(|&r| r > 0)
                .map(|r| Duration::from_secs_f64(1.0 / r as f64)),
            next: Instant::now(),
        }
    }

    fn wait(&mut self) {
        if let Some(period) = self.period {
            let now = Instant::now();
            if self.next > now {
                thread::sleep(self.next - now);
            }
            self.next += period;
        }
    }
}

pub fn run(args: &PublishArgs, config: &MonitorConfig) -> Result<ExitCode> {
    let mut source: Box<dyn RecordSource> = match &args.input {
        Some(path) => {
            info!("Replaying records from {:?}", path);
            Box::new(
                RecordFileReader::open(path)
                    .with_context(|| format!("Failed to open record file {:?}", path))?,
            )
        }
        None => {
            info!(
                pattern = args.pattern.name(),
                count = args.count,
                size = args.size,
                delta = args.delta,
                "Generating pattern records"
            );
            let source =
                PatternSource::new(args.pattern, args.start_index, args.delta, args.size, args.count);
            Box::new(if args.checksum { source.with_checksum() } else { source })
        }
    };
    let restamp = args.input.is_some() && args.checksum;

    let written = match &args.output {
        Some(path) => write_file(source.as_mut(), path, restamp)?,
        None => publish(source.as_mut(), &publisher_config(args, config), args, restamp)?,
    };
    info!(records = written, "Done");
    Ok(ExitCode::SUCCESS)
}

fn publisher_config(args: &PublishArgs, config: &MonitorConfig) -> PublisherConfig {
    let mut publisher = config.publisher.clone();
    if let Some(bind) = &args.bind {
        publisher.bind_address = bind.clone();
    }
    publisher
}

fn next_record(source: &mut dyn RecordSource, restamp: bool) -> Option<Record> {
    let mut record = source.next_record()?;
    if restamp {
        ChecksumEngine::new().stamp_record(&mut record);
    }
    Some(record)
}

/// Write every record from `source` to a record file
pub fn write_file(source: &mut dyn RecordSource, path: &Path, restamp: bool) -> Result<u64> {
    let mut writer = RecordFileWriter::create(path)
        .with_context(|| format!("Failed to create record file {:?}", path))?;
    while let Some(record) = next_record(source, restamp) {
        writer
            .write(&record)
            .with_context(|| format!("Failed to write record {}", record.index()))?;
    }
    let written = writer.records_written();
    writer.finish().context("Failed to flush record file")?;
    info!(records = written, "Wrote record file {:?}", path);
    Ok(written)
}

fn publish(
    source: &mut dyn RecordSource,
    config: &PublisherConfig,
    args: &PublishArgs,
    restamp: bool,
) -> Result<u64> {
    let mut publisher = RecordPublisher::bind(config)
        .with_context(|| format!("Failed to bind publisher to {}", config.bind_address))?;

    if args.wait_subscribers > 0 {
        info!(
            address = %publisher.local_addr(),
            count = args.wait_subscribers,
            "Waiting for subscribers"
        );
        if !publisher.wait_for_subscribers(args.wait_subscribers, Duration::from_secs(args.wait_timeout)) {
            warn!(
                connected = publisher.subscriber_count(),
                expected = args.wait_subscribers,
                "Timed out waiting for subscribers, publishing anyway"
            );
        }
    }

    let mut pacer = Pacer::new(args.rate);
    while let Some(record) = next_record(source, restamp) {
        pacer.wait();
        let delivered = publisher
            .publish(&record)
            .with_context(|| format!("Failed to publish record {}", record.index()))?;
        let published = publisher.records_published();
        if published % PROGRESS_INTERVAL == 0 {
            info!(records = published, subscribers = delivered, "Publishing");
        } else {
            debug!(index = record.index(), subscribers = delivered, "Published record");
        }
    }

    let published = publisher.records_published();
    let stats = publisher.finish(DEFAULT_LINGER)?;
    if stats.dropped > 0 {
        warn!(dropped = stats.dropped, "Frames dropped at subscriber high-water mark");
    }
    Ok(published)
}
