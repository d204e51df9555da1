//! Running-counter pattern
//!
//! Content is a sequence of u32 LE words. Across the whole stream the words
//! form a single counter incremented by one per word (wrapping), so the first
//! word of a record continues from the last word of the previous record.

use super::{ContentGenerator, PatternChecker};
use readout_types::{PatternFormat, Record};

const WORD: usize = 4;

/// Checks the running counter; seeded by the first word it sees
#[derive(Debug, Clone, Default)]
pub struct CounterChecker {
    expected: Option<u32>,
}

impl CounterChecker {
    pub fn new() -> Self {
        Self { expected: None }
    }

    /// Next counter value expected, if seeded
    pub fn expected(&self) -> Option<u32> {
        self.expected
    }
}

impl PatternChecker for CounterChecker {
    fn check(&mut self, record: &Record) -> bool {
        let content = record.content();
        if content.len() % WORD != 0 {
            return false;
        }
        for word in content.chunks_exact(WORD) {
            let value = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
            if let Some(expected) = self.expected {
                if value != expected {
                    return false;
                }
            }
            self.expected = Some(value.wrapping_add(1));
        }
        true
    }

    fn reset(&mut self) {
        self.expected = None;
    }

    fn name(&self) -> &'static str {
        "counter"
    }
}

/// Emits the running counter starting at a chosen value
#[derive(Debug, Clone)]
pub struct CounterGenerator {
    next: u32,
}

impl CounterGenerator {
    pub fn new(start: u32) -> Self {
        Self { next: start }
    }
}

impl ContentGenerator for CounterGenerator {
    fn generate(&mut self, _index: u64, size: usize) -> Vec<u8> {
        let words = size / WORD;
        let mut content = Vec::with_capacity(words * WORD);
        for _ in 0..words {
            content.extend_from_slice(&self.next.to_le_bytes());
            self.next = self.next.wrapping_add(1);
        }
        content
    }

    fn format(&self) -> PatternFormat {
        PatternFormat::Counter
    }
}
