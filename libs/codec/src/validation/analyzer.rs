//! # Stream Analyzer
//!
//! Checks one record at a time, in arrival order, for sequencing, truncation,
//! pattern and checksum consistency, and keeps running totals for the stream.
//!
//! ## Check Pipeline
//!
//! ```text
//! Record → Sequencing → Truncation → Pattern → Checksum → Totals → pass/fail
//!            ↓              ↓           ↓          ↓
//!       start / delta   counted,    checker     only with
//!       mismatch        not failed  verdict     CHECKSUM_VALID
//! ```
//!
//! ## Sequencing
//!
//! The first record fixes `reference_index`, the second fixes
//! `reference_delta`. Every later record must advance the index by exactly
//! `reference_delta` relative to its predecessor. The reference is never
//! re-derived, so a single jump produces one mismatch and the stream is
//! measured against the new position from then on.
//!
//! A failed record counts as one error no matter how many checks it failed.

use super::checksum::ChecksumEngine;
use super::config::AnalyzerConfig;
use super::event::AnalyzerEvent;
use super::pattern::{create_pattern_checker, PatternChecker};
use super::sink::{LineSink, TracingSink};
use crate::error::CodecResult;
use crate::format::human_readable_count;
use readout_types::{Record, RecordSource};
use std::num::NonZeroU64;
use tracing::debug;

/// Snapshot of the analyzer's running state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzerStats {
    /// Records checked so far
    pub record_count: u64,
    /// Records that failed sequencing, pattern or checksum checks
    pub error_count: u64,
    /// Records flagged as truncated by the readout hardware
    pub truncated_count: u64,
    /// Sum of content sizes
    pub content_bytes_total: u64,
    /// Index of the first record, once seen
    pub reference_index: Option<u64>,
    /// Index step fixed by the first two records, once seen
    pub reference_delta: Option<u64>,
}

impl AnalyzerStats {
    /// Human-readable summary; mentions errors only when there are some
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "records checked: {} ({})",
            self.record_count,
            human_readable_count(self.content_bytes_total)
        );
        if self.error_count > 0 {
            summary.push_str(&format!(" [{} errors]", self.error_count));
        }
        summary
    }
}

/// Per-stream sequencing state
#[derive(Debug, Default)]
struct SequenceState {
    reference_index: u64,
    reference_delta: u64,
    previous_index: u64,
}

/// Sequential integrity checker for one record stream
pub struct StreamAnalyzer<S: LineSink = TracingSink> {
    output_interval: NonZeroU64,
    output_prefix: String,
    sink: S,
    checksum: ChecksumEngine,
    checker: Option<Box<dyn PatternChecker>>,
    sequence: SequenceState,
    stats: AnalyzerStats,
}

impl<S: LineSink> StreamAnalyzer<S> {
    /// Build an analyzer; fails if the statistics interval is zero
    ///
    /// The pattern checker is chosen from the first record's source tag.
    pub fn new(config: &AnalyzerConfig, sink: S) -> CodecResult<Self> {
        let output_interval = config.output_interval()?;
        Ok(Self {
            output_interval,
            output_prefix: config.output_prefix.clone(),
            sink,
            checksum: ChecksumEngine::new(),
            checker: None,
            sequence: SequenceState::default(),
            stats: AnalyzerStats::default(),
        })
    }

    /// Build an analyzer with a fixed pattern checker instead of tag-based selection
    pub fn with_pattern_checker(
        config: &AnalyzerConfig,
        sink: S,
        checker: Box<dyn PatternChecker>,
    ) -> CodecResult<Self> {
        let mut analyzer = Self::new(config, sink)?;
        analyzer.checker = Some(checker);
        Ok(analyzer)
    }

    /// Check one record and update the running totals
    ///
    /// Returns `false` if sequencing, pattern or checksum failed. Does not
    /// reset the pattern checker; [`StreamAnalyzer::ingest`] does that.
    pub fn validate(&mut self, record: &Record) -> bool {
        let ordinal = self.stats.record_count;
        let descriptor = record.descriptor();
        let mut passed = true;

        match ordinal {
            0 => {
                self.sequence.reference_index = descriptor.index;
                self.stats.reference_index = Some(descriptor.index);
                self.select_checker(record);
                self.emit(AnalyzerEvent::StreamStart {
                    index: descriptor.index,
                });
            }
            1 => {
                let delta = descriptor.index.wrapping_sub(self.sequence.previous_index);
                self.sequence.reference_delta = delta;
                self.stats.reference_delta = Some(delta);
                self.emit(AnalyzerEvent::ReferenceDelta { delta });
            }
            _ => {
                let delta = descriptor.index.wrapping_sub(self.sequence.previous_index);
                if delta != self.sequence.reference_delta {
                    self.emit(AnalyzerEvent::SequencingMismatch { delta, ordinal });
                    passed = false;
                }
            }
        }

        if descriptor.flags.is_overflow_truncated() {
            self.stats.truncated_count += 1;
            self.emit(AnalyzerEvent::Truncated { ordinal });
        }

        let pattern_ok = match self.checker.as_mut() {
            Some(checker) => checker.check(record),
            None => true,
        };
        if !pattern_ok {
            self.emit(AnalyzerEvent::PatternError { ordinal });
            passed = false;
        }

        if descriptor.flags.is_checksum_valid() {
            let computed = self.checksum.compute(record.content());
            if computed != descriptor.checksum {
                self.emit(AnalyzerEvent::ChecksumFailure {
                    ordinal,
                    stored: descriptor.checksum,
                    computed,
                });
                passed = false;
            }
        }

        self.stats.record_count += 1;
        self.stats.content_bytes_total = self
            .stats
            .content_bytes_total
            .wrapping_add(descriptor.size);
        self.sequence.previous_index = descriptor.index;

        if !passed {
            self.stats.error_count += 1;
        }

        passed
    }

    /// Validate, reset the checker on failure, and emit periodic statistics
    ///
    /// Statistics are emitted for records at ordinal 0, N, 2N, ... where N is
    /// the configured output interval.
    pub fn ingest(&mut self, record: &Record) -> bool {
        let ordinal = self.stats.record_count;
        let passed = self.validate(record);
        if !passed {
            self.reset_checker();
        }
        if ordinal % self.output_interval.get() == 0 {
            self.emit(AnalyzerEvent::Statistics(self.statistics()));
        }
        passed
    }

    /// Drain `source` until end-of-stream, returning the final snapshot
    pub fn run<R: RecordSource + ?Sized>(&mut self, source: &mut R) -> AnalyzerStats {
        while let Some(record) = source.next_record() {
            self.ingest(&record);
        }
        debug!(
            records = self.stats.record_count,
            errors = self.stats.error_count,
            "Record source reached end of stream"
        );
        self.stats
    }

    /// Human-readable summary of the stream so far
    pub fn statistics(&self) -> String {
        self.stats.summary()
    }

    pub fn stats(&self) -> AnalyzerStats {
        self.stats
    }

    pub fn output_prefix(&self) -> &str {
        &self.output_prefix
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Name of the active pattern checker, once selected
    pub fn checker_name(&self) -> Option<&'static str> {
        self.checker.as_ref().map(|c| c.name())
    }

    /// Emit a final statistics line and return the snapshot and sink
    pub fn finish(mut self) -> (AnalyzerStats, S) {
        let summary = self.statistics();
        self.emit(AnalyzerEvent::Statistics(summary));
        (self.stats, self.sink)
    }

    fn select_checker(&mut self, record: &Record) {
        if self.checker.is_none() {
            let tag = record.descriptor().source_tag();
            let checker = create_pattern_checker(tag);
            debug!(source = %tag, checker = checker.name(), "Selected pattern checker");
            self.checker = Some(checker);
        }
    }

    fn reset_checker(&mut self) {
        if let Some(checker) = self.checker.as_mut() {
            checker.reset();
        }
    }

    fn emit(&mut self, event: AnalyzerEvent) {
        let line = if self.output_prefix.is_empty() {
            event.to_string()
        } else {
            format!("{} {}", self.output_prefix, event)
        };
        self.sink.write_line(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::pattern::{create_generator, ContentGenerator};
    use readout_types::{PatternFormat, RecordFlags, SourceTag};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn plain(index: u64) -> Record {
        Record::from_parts(index, SourceTag::new(0x10, 1), RecordFlags::empty(), vec![0; 8])
    }

    fn analyzer(interval: u64) -> StreamAnalyzer<Vec<String>> {
        StreamAnalyzer::new(&AnalyzerConfig::new(interval, ""), Vec::new()).unwrap()
    }

    fn count(lines: &[String], needle: &str) -> usize {
        lines.iter().filter(|l| l.contains(needle)).count()
    }

    /// Checker with a scripted verdict that records how often it was reset
    struct Scripted {
        verdicts: Vec<bool>,
        calls: usize,
        resets: Arc<AtomicUsize>,
    }

    impl PatternChecker for Scripted {
        fn check(&mut self, _record: &Record) -> bool {
            let verdict = self.verdicts.get(self.calls).copied().unwrap_or(true);
            self.calls += 1;
            verdict
        }

        fn reset(&mut self) {
            self.resets.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    #[test]
    fn test_well_formed_stream_passes() {
        let mut generator = create_generator(PatternFormat::Counter);
        let engine = ChecksumEngine::new();
        let mut analyzer = analyzer(1000);

        for i in 0..20u64 {
            let mut record = Record::from_parts(
                i * 64,
                SourceTag::pattern(PatternFormat::Counter),
                RecordFlags::empty(),
                generator.generate(i * 64, 128),
            );
            if i % 2 == 0 {
                engine.stamp_record(&mut record);
            }
            assert!(analyzer.ingest(&record), "record {} failed", i);
        }

        let stats = analyzer.stats();
        assert_eq!(stats.record_count, 20);
        assert_eq!(stats.error_count, 0);
        assert_eq!(stats.content_bytes_total, 20 * 128);
        assert_eq!(analyzer.checker_name(), Some("counter"));
    }

    #[test]
    fn test_start_and_reference_delta_events() {
        let mut analyzer = analyzer(1000);
        for index in [1000, 1100, 1200, 1300, 1400] {
            assert!(analyzer.validate(&plain(index)));
        }

        let lines = analyzer.sink();
        assert_eq!(count(lines, "start="), 1);
        assert_eq!(count(lines, "start=1000"), 1);
        assert_eq!(lines.iter().filter(|l| l.as_str() == "delta_t=100").count(), 1);
        assert_eq!(count(lines, " in record "), 0);

        let stats = analyzer.stats();
        assert_eq!(stats.record_count, 5);
        assert_eq!(stats.reference_index, Some(1000));
        assert_eq!(stats.reference_delta, Some(100));
    }

    #[test]
    fn test_index_jump_reports_once() {
        let mut analyzer = analyzer(1000);
        let results: Vec<bool> = [0, 100, 205, 300]
            .iter()
            .map(|&i| analyzer.validate(&plain(i)))
            .collect();

        assert_eq!(results, vec![true, true, false, false]);
        let lines = analyzer.sink();
        assert_eq!(count(lines, "delta_t=105 in record 2"), 1);
        assert_eq!(count(lines, "delta_t=95 in record 3"), 1);
        assert_eq!(analyzer.stats().error_count, 2);
    }

    #[test]
    fn test_realigned_stream_produces_single_mismatch() {
        let mut analyzer = analyzer(1000);
        for index in [0, 100, 205, 305, 405] {
            analyzer.validate(&plain(index));
        }
        let lines = analyzer.sink();
        assert_eq!(count(lines, " in record "), 1);
        assert_eq!(count(lines, "delta_t=105 in record 2"), 1);
        assert_eq!(analyzer.stats().error_count, 1);
    }

    #[test]
    fn test_truncation_is_counted_but_not_failed() {
        let mut analyzer = analyzer(1000);
        let record = Record::from_parts(0, SourceTag::new(0x10, 1), RecordFlags::OVERFLOW_TRUNCATED, vec![1]);
        assert!(analyzer.validate(&record));
        let stats = analyzer.stats();
        assert_eq!(stats.truncated_count, 1);
        assert_eq!(stats.error_count, 0);
        assert_eq!(count(analyzer.sink(), "data truncated by readout in record 0"), 1);
    }

    #[test]
    fn test_checksum_checked_only_when_flagged() {
        let mut analyzer = analyzer(1000);

        let mut unflagged = plain(0);
        unflagged.set_checksum(0xBAD0_BAD0);
        assert!(analyzer.validate(&unflagged));

        let mut flagged = plain(10);
        flagged.set_checksum(0xBAD0_BAD0);
        flagged.flags_mut().insert(RecordFlags::CHECKSUM_VALID);
        assert!(!analyzer.validate(&flagged));

        assert_eq!(analyzer.stats().error_count, 1);
        assert_eq!(count(analyzer.sink(), "crc failure in record 1"), 1);
    }

    #[test]
    fn test_multiple_failures_count_once() {
        let resets = Arc::new(AtomicUsize::new(0));
        let checker = Scripted {
            verdicts: vec![true, true, false],
            calls: 0,
            resets: resets.clone(),
        };
        let mut analyzer = StreamAnalyzer::with_pattern_checker(
            &AnalyzerConfig::new(1000, ""),
            Vec::new(),
            Box::new(checker),
        )
        .unwrap();

        analyzer.ingest(&plain(0));
        analyzer.ingest(&plain(100));
        let mut bad = plain(250);
        bad.set_checksum(1);
        bad.flags_mut().insert(RecordFlags::CHECKSUM_VALID);
        assert!(!analyzer.ingest(&bad));

        let lines = analyzer.sink();
        assert_eq!(count(lines, "delta_t=150 in record 2"), 1);
        assert_eq!(count(lines, "pattern error in record 2"), 1);
        assert_eq!(count(lines, "crc failure in record 2"), 1);
        assert_eq!(analyzer.stats().error_count, 1);
        assert_eq!(resets.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reset_only_after_failed_records() {
        let resets = Arc::new(AtomicUsize::new(0));
        let verdicts = vec![true, false, true, true, false, true];
        let checker = Scripted {
            verdicts: verdicts.clone(),
            calls: 0,
            resets: resets.clone(),
        };
        let mut analyzer = StreamAnalyzer::with_pattern_checker(
            &AnalyzerConfig::new(1000, ""),
            Vec::new(),
            Box::new(checker),
        )
        .unwrap();

        for (i, expected) in verdicts.iter().enumerate() {
            let before = resets.load(Ordering::SeqCst);
            let passed = analyzer.ingest(&plain(i as u64 * 10));
            assert_eq!(passed, *expected);
            let after = resets.load(Ordering::SeqCst);
            assert_eq!(after - before, usize::from(!passed));
        }
        assert_eq!(resets.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_validate_alone_never_resets() {
        let resets = Arc::new(AtomicUsize::new(0));
        let checker = Scripted {
            verdicts: vec![false, false],
            calls: 0,
            resets: resets.clone(),
        };
        let mut analyzer = StreamAnalyzer::with_pattern_checker(
            &AnalyzerConfig::default(),
            Vec::new(),
            Box::new(checker),
        )
        .unwrap();
        assert!(!analyzer.validate(&plain(0)));
        assert!(!analyzer.validate(&plain(1)));
        assert_eq!(resets.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_checker_reset_stops_cascade() {
        let mut generator = create_generator(PatternFormat::Counter);
        let mut analyzer = analyzer(1000);
        let tag = SourceTag::pattern(PatternFormat::Counter);

        let first = generator.generate(0, 16);
        let _skipped = generator.generate(1, 16);
        let third = generator.generate(2, 16);
        let fourth = generator.generate(3, 16);

        assert!(analyzer.ingest(&Record::from_parts(0, tag, RecordFlags::empty(), first)));
        assert!(analyzer.ingest(&Record::from_parts(1, tag, RecordFlags::empty(), Vec::new())));
        assert!(!analyzer.ingest(&Record::from_parts(2, tag, RecordFlags::empty(), third)));
        assert!(analyzer.ingest(&Record::from_parts(3, tag, RecordFlags::empty(), fourth)));
        assert_eq!(analyzer.stats().error_count, 1);
    }

    #[test]
    fn test_statistics_cadence_includes_first_record() {
        let mut analyzer = analyzer(3);
        for i in 0..7u64 {
            analyzer.ingest(&plain(i));
        }
        let stats_lines: Vec<&String> = analyzer
            .sink()
            .iter()
            .filter(|l| l.starts_with("records checked:"))
            .collect();
        assert_eq!(stats_lines.len(), 3);
        assert!(stats_lines[0].starts_with("records checked: 1 "));
        assert!(stats_lines[1].starts_with("records checked: 4 "));
        assert!(stats_lines[2].starts_with("records checked: 7 "));
    }

    #[test]
    fn test_statistics_mentions_errors_only_when_present() {
        let mut analyzer = analyzer(1000);
        analyzer.validate(&plain(0));
        analyzer.validate(&plain(1));
        assert_eq!(analyzer.statistics(), "records checked: 2 (16 B)");
        assert!(!analyzer.statistics().contains("error"));

        analyzer.validate(&plain(5));
        assert_eq!(analyzer.statistics(), "records checked: 3 (24 B) [1 errors]");
    }

    #[test]
    fn test_prefix_is_applied_to_every_line() {
        let mut analyzer =
            StreamAnalyzer::new(&AnalyzerConfig::new(1, "ch7"), Vec::new()).unwrap();
        analyzer.ingest(&plain(0));
        analyzer.ingest(&plain(2));
        let (_, lines) = analyzer.finish();
        assert!(!lines.is_empty());
        assert!(lines.iter().all(|l| l.starts_with("ch7 ")));
        assert_eq!(lines.last().unwrap(), "ch7 records checked: 2 (16 B)");
    }

    #[test]
    fn test_zero_interval_rejected_at_construction() {
        let result = StreamAnalyzer::new(&AnalyzerConfig::new(0, "x"), Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_source_uses_permissive_checker() {
        let mut analyzer = analyzer(1000);
        let record = Record::from_parts(0, SourceTag::new(0xABCD, 9), RecordFlags::empty(), vec![0xFF; 3]);
        assert!(analyzer.validate(&record));
        assert_eq!(analyzer.checker_name(), Some("permissive"));
    }

    #[test]
    fn test_index_wraparound_keeps_delta() {
        let mut analyzer = analyzer(1000);
        for index in [u64::MAX - 3, u64::MAX - 1, 0, 2, 4] {
            assert!(analyzer.validate(&plain(index)));
        }
        assert_eq!(analyzer.stats().reference_delta, Some(2));
        assert_eq!(analyzer.stats().error_count, 0);

        // a unit step after the wrap breaks the step of 2
        assert!(!analyzer.validate(&plain(5)));
        assert_eq!(analyzer.stats().error_count, 1);
    }
}
