//! Whitespace tokenization and the frozen feature vocabulary.

use std::collections::HashSet;

use crate::error::{ClassifyError, Result};

/// Split text on runs of whitespace. This is the only tokenization
/// rule in the pipeline: no case folding, no stemming, no punctuation
/// handling.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

/// The set of distinct words extracted from the email being
/// classified. Built once and frozen for the rest of the run; words
/// appearing only in training collections are never tracked, which
/// keeps the evidence space fixed to the email being judged.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    words: HashSet<String>,
}

impl Vocabulary {
    /// Extract the vocabulary from one email. An email with no
    /// extractable words cannot be classified.
    pub fn from_email(text: &str) -> Result<Self> {
        let words: HashSet<String> = tokenize(text).map(str::to_owned).collect();
        if words.is_empty() {
            return Err(ClassifyError::EmptyVocabulary);
        }
        Ok(Self { words })
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_tokens_collapse() {
        let vocabulary = Vocabulary::from_email("hello world hello hello world").unwrap();
        assert_eq!(vocabulary.len(), 2);
        assert!(vocabulary.contains("hello"));
        assert!(vocabulary.contains("world"));
    }

    #[test]
    fn tokenizes_on_any_whitespace_run() {
        let vocabulary = Vocabulary::from_email("a\tb\n c   d").unwrap();
        assert_eq!(vocabulary.len(), 4);
        for word in ["a", "b", "c", "d"] {
            assert!(vocabulary.contains(word));
        }
    }

    #[test]
    fn tokens_are_literal() {
        // No case folding or punctuation stripping.
        let vocabulary = Vocabulary::from_email("Hello hello hello,").unwrap();
        assert_eq!(vocabulary.len(), 3);
    }

    #[test]
    fn empty_email_fails() {
        assert!(matches!(
            Vocabulary::from_email(""),
            Err(ClassifyError::EmptyVocabulary)
        ));
        assert!(matches!(
            Vocabulary::from_email("  \n\t  "),
            Err(ClassifyError::EmptyVocabulary)
        ));
    }
}
