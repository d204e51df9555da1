//! Index-tagged pattern
//!
//! Content is a sequence of u64 LE words where word `i` equals the record's
//! descriptor index plus `i` (wrapping). Ties content to its header, so a
//! descriptor paired with the wrong content fails even if both look sane.

use super::{ContentGenerator, PatternChecker};
use readout_types::{PatternFormat, Record};

const WORD: usize = 8;

/// Stateless check of index-tagged words
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexChecker;

impl PatternChecker for IndexChecker {
    fn check(&mut self, record: &Record) -> bool {
        let content = record.content();
        if content.len() % WORD != 0 {
            return false;
        }
        let base = record.index();
        content.chunks_exact(WORD).enumerate().all(|(i, word)| {
            let mut bytes = [0u8; WORD];
            bytes.copy_from_slice(word);
            u64::from_le_bytes(bytes) == base.wrapping_add(i as u64)
        })
    }

    fn reset(&mut self) {}

    fn name(&self) -> &'static str {
        "index"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IndexGenerator;

impl ContentGenerator for IndexGenerator {
    fn generate(&mut self, index: u64, size: usize) -> Vec<u8> {
        (0..(size / WORD) as u64)
            .flat_map(|i| index.wrapping_add(i).to_le_bytes())
            .collect()
    }

    fn format(&self) -> PatternFormat {
        PatternFormat::Index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readout_types::{RecordFlags, SourceTag};

    fn record(index: u64, content: Vec<u8>) -> Record {
        Record::from_parts(index, SourceTag::pattern(PatternFormat::Index), RecordFlags::empty(), content)
    }

    #[test]
    fn test_words_follow_index() {
        let content = IndexGenerator.generate(500, 32);
        assert_eq!(content.len(), 32);
        assert!(IndexChecker.check(&record(500, content.clone())));
        assert!(!IndexChecker.check(&record(501, content)));
    }

    #[test]
    fn test_index_wraps() {
        let content = IndexGenerator.generate(u64::MAX, 16);
        assert!(IndexChecker.check(&record(u64::MAX, content)));
    }

    #[test]
    fn test_partial_word_fails() {
        let mut content = IndexGenerator.generate(3, 16);
        content.push(0);
        assert!(!IndexChecker.check(&record(3, content)));
    }
}
