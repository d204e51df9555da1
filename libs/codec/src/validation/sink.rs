//! Output sinks for analyzer lines
//!
//! The analyzer writes one line of text per event and never assumes where it
//! ends up. Sinks must not fail the caller: write errors are logged and
//! dropped.

use std::io::Write;
use tracing::{info, warn};

/// Receives one complete line of analyzer output
pub trait LineSink {
    fn write_line(&mut self, line: &str);
}

impl<S: LineSink + ?Sized> LineSink for &mut S {
    fn write_line(&mut self, line: &str) {
        (**self).write_line(line)
    }
}

impl<S: LineSink + ?Sized> LineSink for Box<S> {
    fn write_line(&mut self, line: &str) {
        (**self).write_line(line)
    }
}

/// Collects lines in memory
impl LineSink for Vec<String> {
    fn write_line(&mut self, line: &str) {
        self.push(line.to_owned());
    }
}

/// Forwards lines to `tracing` at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LineSink for TracingSink {
    fn write_line(&mut self, line: &str) {
        info!(target: "readout::analyzer", "{}", line);
    }
}

/// Writes newline-terminated lines to any `io::Write`
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
    failed_writes: u64,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed_writes: 0,
        }
    }

    pub fn failed_writes(&self) -> u64 {
        self.failed_writes
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> LineSink for WriterSink<W> {
    fn write_line(&mut self, line: &str) {
        let result = writeln!(self.writer, "{}", line).and_then(|_| self.writer.flush());
        if let Err(e) = result {
            self.failed_writes += 1;
            if self.failed_writes == 1 {
                warn!(error = %e, "Analyzer output write failed, dropping lines");
            }
        }
    }
}
