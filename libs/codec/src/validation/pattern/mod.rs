//! # Content pattern checkers
//!
//! Each source tag `(source_id, source_version)` implies a content layout.
//! A [`PatternChecker`] validates record content against that layout and may
//! carry state across records (a running counter, for instance); `reset()`
//! drops that state so one bad record does not fail every later one.
//!
//! Checkers are selected once per stream by [`create_pattern_checker`].
//! Selection is total: tags without a known layout get
//! [`PermissiveChecker`], which accepts everything.
//!
//! Every checker has a matching [`ContentGenerator`] that produces content
//! the checker accepts.

mod counter;
mod index;
mod ramp;

pub use counter::{CounterChecker, CounterGenerator};
pub use index::{IndexChecker, IndexGenerator};
pub use ramp::{RampChecker, RampGenerator};

use readout_types::{PatternFormat, Record, SourceTag};

/// Validates record content against the pattern expected for a source
pub trait PatternChecker: Send {
    /// True when `record` content matches the expected pattern
    fn check(&mut self, record: &Record) -> bool;

    /// Forget any expectation accumulated from earlier records
    fn reset(&mut self);

    /// Short name for logs
    fn name(&self) -> &'static str;
}

impl<C: PatternChecker + ?Sized> PatternChecker for Box<C> {
    fn check(&mut self, record: &Record) -> bool {
        (**self).check(record)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Fallback for sources without a known content layout: always passes
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveChecker;

impl PatternChecker for PermissiveChecker {
    fn check(&mut self, _record: &Record) -> bool {
        true
    }

    fn reset(&mut self) {}

    fn name(&self) -> &'static str {
        "permissive"
    }
}

/// Select the checker for a stream's source tag
pub fn create_pattern_checker(tag: SourceTag) -> Box<dyn PatternChecker> {
    match tag.pattern_format() {
        Some(PatternFormat::Counter) => Box::new(CounterChecker::new()),
        Some(PatternFormat::Index) => Box::new(IndexChecker),
        Some(PatternFormat::Ramp) => Box::new(RampChecker),
        None => Box::new(PermissiveChecker),
    }
}

/// Produces record content in a given pattern
pub trait ContentGenerator: Send {
    /// Content for the record at `index`, at most `size` bytes long
    ///
    /// Word-based patterns round `size` down to a whole number of words.
    fn generate(&mut self, index: u64, size: usize) -> Vec<u8>;

    fn format(&self) -> PatternFormat;
}

/// Generator producing content accepted by the checker for `format`
pub fn create_generator(format: PatternFormat) -> Box<dyn ContentGenerator> {
    match format {
        PatternFormat::Counter => Box::new(CounterGenerator::new(0)),
        PatternFormat::Index => Box::new(IndexGenerator),
        PatternFormat::Ramp => Box::new(RampGenerator),
    }
}
