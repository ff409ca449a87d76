//! Word-level Vocabulary
//!
//! Skip-gram models learn one vector per vocabulary entry, so the first step
//! is mapping raw text to integer token IDs. This module does that at the word
//! level:
//!
//! 1. **Split into words**: lowercase the text and cut on anything that is not
//!    a letter, digit, or an apostrophe inside a word ("don't" stays whole)
//! 2. **Count**: tally word frequencies across the corpus
//! 3. **Assign IDs**: ID 0 is reserved for `<unk>`; the remaining IDs go to
//!    words in order of descending frequency
//!
//! ## Example
//!
//! ```text
//! Corpus: "the cat sat on the mat"
//!
//! Counts: the=2, cat=1, mat=1, on=1, sat=1
//! IDs:    <unk>=0, the=1, cat=2, mat=3, on=4, sat=5
//!
//! encode("the dog sat") -> [1, 0, 5]
//! ```
//!
//! Ties in frequency are broken alphabetically, so building twice from the
//! same text always yields the same IDs.
//!
//! ## Filtering
//!
//! - `min_count` drops rare words (they encode as `<unk>`)
//! - `max_size` caps the vocabulary, including the `<unk>` slot
//!
//! Word counting and encoding run line-by-line in parallel with Rayon.

use crate::error::{Result, SkipGramError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Token used for words that are not in the vocabulary
pub const UNK_TOKEN: &str = "<unk>";

/// ID of [`UNK_TOKEN`]
pub const UNK_ID: usize = 0;

/// Split text into lowercase words
///
/// # Example
///
/// ```rust
/// # use skipgram::tokenize_words;
/// assert_eq!(tokenize_words("Don't panic, Arthur!"), vec!["don't", "panic", "arthur"]);
/// ```
pub fn tokenize_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '\'' {
            current.extend(ch.to_lowercase());
        } else if !current.is_empty() {
            push_word(&mut words, &current);
            current.clear();
        }
    }
    if !current.is_empty() {
        push_word(&mut words, &current);
    }

    words
}

// Apostrophes only count inside a word: 'tis -> tis, dogs' -> dogs
fn push_word(words: &mut Vec<String>, raw: &str) {
    let word = raw.trim_matches('\'');
    if !word.is_empty() {
        words.push(word.to_string());
    }
}

/// Split text into sentences of lowercase words
///
/// Sentences end at `.`, `!`, `?` and newlines. Empty sentences are dropped.
pub fn split_sentences(text: &str) -> Vec<Vec<String>> {
    text.split(['.', '!', '?', '\n'])
        .map(tokenize_words)
        .filter(|words| !words.is_empty())
        .collect()
}

/// A mapping between words and integer token IDs
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vocabulary {
    /// ID -> word, with `<unk>` at index 0
    words: Vec<String>,

    /// Word -> ID, the inverse of `words`; rebuilt from `words` on load
    #[serde(skip)]
    word_to_id: HashMap<String, usize>,

    /// Corpus frequency of each ID; `<unk>` holds the total of filtered words
    counts: Vec<usize>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

impl Vocabulary {
    /// Create a vocabulary containing only `<unk>`
    pub fn new() -> Self {
        let mut word_to_id = HashMap::new();
        word_to_id.insert(UNK_TOKEN.to_string(), UNK_ID);
        Self {
            words: vec![UNK_TOKEN.to_string()],
            word_to_id,
            counts: vec![0],
        }
    }

    /// Build a vocabulary from a text corpus
    ///
    /// # Arguments
    ///
    /// * `text` - Training corpus
    /// * `min_count` - Words seen fewer times than this map to `<unk>`
    /// * `max_size` - Optional cap on the vocabulary size, `<unk>` included
    ///
    /// # Errors
    ///
    /// [`SkipGramError::InvalidArgument`] if `max_size` is `Some(0)`, since
    /// there must always be room for `<unk>`.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use skipgram::Vocabulary;
    /// let vocab = Vocabulary::build("the cat sat on the mat", 1, None).unwrap();
    /// assert_eq!(vocab.vocab_size(), 6);
    /// assert_eq!(vocab.id("the"), Some(1));
    /// assert_eq!(vocab.encode("the dog"), vec![1, 0]);
    /// ```
    pub fn build(text: &str, min_count: usize, max_size: Option<usize>) -> Result<Self> {
        if max_size == Some(0) {
            return Err(SkipGramError::invalid(
                "max_size must leave room for the <unk> token",
            ));
        }

        // === PARALLEL WORD COUNTING ===
        let word_counts: HashMap<String, usize> = text
            .par_lines()
            .fold(HashMap::new, |mut local, line| {
                for word in tokenize_words(line) {
                    *local.entry(word).or_insert(0) += 1;
                }
                local
            })
            .reduce(HashMap::new, |mut a, b| {
                for (word, count) in b {
                    *a.entry(word).or_insert(0) += count;
                }
                a
            });

        let total_words: usize = word_counts.values().sum();

        // Count descending, then word ascending for determinism
        let mut ranked: Vec<(String, usize)> = word_counts
            .into_iter()
            .filter(|(_, count)| *count >= min_count)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        if let Some(max) = max_size {
            ranked.truncate(max - 1);
        }

        let mut vocab = Self::new();
        for (word, count) in ranked {
            vocab.word_to_id.insert(word.clone(), vocab.words.len());
            vocab.words.push(word);
            vocab.counts.push(count);
        }
        let kept: usize = vocab.counts.iter().sum();
        vocab.counts[UNK_ID] = total_words - kept;

        log::info!(
            "built vocabulary: {} entries from {} words ({} mapped to {})",
            vocab.vocab_size(),
            total_words,
            vocab.counts[UNK_ID],
            UNK_TOKEN
        );

        Ok(vocab)
    }

    /// Number of entries, `<unk>` included
    pub fn vocab_size(&self) -> usize {
        self.words.len()
    }

    /// Look up a word's ID
    pub fn id(&self, word: &str) -> Option<usize> {
        self.word_to_id.get(word).copied()
    }

    /// Look up a word's ID, falling back to `<unk>`
    pub fn id_or_unk(&self, word: &str) -> usize {
        self.id(word).unwrap_or(UNK_ID)
    }

    /// Look up the word for an ID
    pub fn word(&self, id: usize) -> Option<&str> {
        self.words.get(id).map(String::as_str)
    }

    /// Corpus frequency of a word (0 if unknown)
    pub fn count(&self, word: &str) -> usize {
        self.id(word).map_or(0, |id| self.counts[id])
    }

    /// Encode text to token IDs
    ///
    /// Lines are encoded in parallel and concatenated in order.
    pub fn encode(&self, text: &str) -> Vec<usize> {
        let lines: Vec<Vec<usize>> = text
            .par_lines()
            .map(|line| self.encode_words(&tokenize_words(line)))
            .collect();
        lines.concat()
    }

    /// Encode text as one ID sequence per sentence
    ///
    /// Use this with [`crate::generate_corpus_pairs`] so that context windows
    /// stay inside sentences.
    pub fn encode_sentences(&self, text: &str) -> Vec<Vec<usize>> {
        split_sentences(text)
            .iter()
            .map(|words| self.encode_words(words))
            .collect()
    }

    fn encode_words(&self, words: &[String]) -> Vec<usize> {
        words.iter().map(|w| self.id_or_unk(w)).collect()
    }

    /// Decode token IDs to space-separated words
    ///
    /// IDs outside the vocabulary decode as `<unk>`.
    pub fn decode(&self, ids: &[usize]) -> String {
        ids.iter()
            .map(|&id| self.word(id).unwrap_or(UNK_TOKEN))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Save the vocabulary to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a vocabulary from a JSON file
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON, or when the stored words and counts do not
    /// describe a valid vocabulary (see [`Vocabulary::from_json`]).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read(path)?;
        Self::from_json(&json)
    }

    /// Parse a vocabulary from JSON bytes and rebuild its word index
    ///
    /// The word -> ID map is never read from disk; it is derived from the
    /// stored word list, so every ID it hands out is in range.
    ///
    /// # Errors
    ///
    /// - [`SkipGramError::ShapeMismatch`] if `words` and `counts` differ in length
    /// - [`SkipGramError::InvalidArgument`] if ID 0 is not `<unk>` or a word
    ///   appears twice
    pub(crate) fn from_json(json: &[u8]) -> Result<Self> {
        let mut vocab: Vocabulary = serde_json::from_slice(json)?;
        vocab.rebuild_index()?;
        Ok(vocab)
    }

    fn rebuild_index(&mut self) -> Result<()> {
        if self.words.len() != self.counts.len() {
            return Err(SkipGramError::ShapeMismatch {
                expected: self.words.len(),
                found: self.counts.len(),
            });
        }
        if self.words.first().map(String::as_str) != Some(UNK_TOKEN) {
            return Err(SkipGramError::invalid(format!(
                "vocabulary must start with {}",
                UNK_TOKEN
            )));
        }

        let mut word_to_id = HashMap::with_capacity(self.words.len());
        for (id, word) in self.words.iter().enumerate() {
            if word_to_id.insert(word.clone(), id).is_some() {
                return Err(SkipGramError::invalid(format!(
                    "duplicate vocabulary entry '{}'",
                    word
                )));
            }
        }
        self.word_to_id = word_to_id;
        Ok(())
    }

    /// Get statistics about the vocabulary
    pub fn stats(&self) -> VocabularyStats {
        VocabularyStats {
            vocab_size: self.words.len(),
            total_words: self.counts.iter().sum(),
            unknown_words: self.counts[UNK_ID],
        }
    }

    /// The `n` most frequent words with their counts (excluding `<unk>`)
    pub fn most_common(&self, n: usize) -> Vec<(&str, usize)> {
        // IDs are already in frequency order
        self.words
            .iter()
            .zip(&self.counts)
            .skip(1)
            .take(n)
            .map(|(w, &c)| (w.as_str(), c))
            .collect()
    }
}

/// Statistics about a vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyStats {
    /// Entries including `<unk>`
    pub vocab_size: usize,
    /// Words seen in the corpus
    pub total_words: usize,
    /// Corpus words that map to `<unk>`
    pub unknown_words: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        assert_eq!(
            tokenize_words("The quick, brown FOX."),
            vec!["the", "quick", "brown", "fox"]
        );
    }

    #[test]
    fn test_tokenize_apostrophes() {
        assert_eq!(
            tokenize_words("'Tis the dogs' bone, isn't it?"),
            vec!["tis", "the", "dogs", "bone", "isn't", "it"]
        );
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize_words("").is_empty());
        assert!(tokenize_words(" ,.;' ").is_empty());
    }

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("The cat sat. The dog ran!\n\nWhy?");
        assert_eq!(
            sentences,
            vec![
                vec!["the", "cat", "sat"],
                vec!["the", "dog", "ran"],
                vec!["why"],
            ]
        );
    }

    #[test]
    fn test_build_orders_by_frequency_then_word() {
        let vocab = Vocabulary::build("b a c a b a", 1, None).unwrap();
        assert_eq!(vocab.word(0), Some(UNK_TOKEN));
        assert_eq!(vocab.word(1), Some("a"));
        assert_eq!(vocab.word(2), Some("b"));
        assert_eq!(vocab.word(3), Some("c"));
        assert_eq!(vocab.count("a"), 3);
    }

    #[test]
    fn test_build_is_deterministic() {
        let text = "one two three two three three\nfour five six four";
        let a = Vocabulary::build(text, 1, None).unwrap();
        let b = Vocabulary::build(text, 1, None).unwrap();
        for id in 0..a.vocab_size() {
            assert_eq!(a.word(id), b.word(id));
        }
    }

    #[test]
    fn test_min_count_filters_rare_words() {
        let vocab = Vocabulary::build("a a b", 2, None).unwrap();
        assert_eq!(vocab.vocab_size(), 2);
        assert_eq!(vocab.encode("a b"), vec![1, UNK_ID]);
        assert_eq!(vocab.stats().unknown_words, 1);
    }

    #[test]
    fn test_max_size_caps_vocabulary() {
        let vocab = Vocabulary::build("a a a b b c", 1, Some(3)).unwrap();
        assert_eq!(vocab.vocab_size(), 3);
        assert_eq!(vocab.id("c"), None);
        assert!(Vocabulary::build("a", 1, Some(0)).is_err());
    }

    #[test]
    fn test_encode_decode() {
        let vocab = Vocabulary::build("the cat sat on the mat", 1, None).unwrap();
        let ids = vocab.encode("The mat, the CAT");
        assert_eq!(vocab.decode(&ids), "the mat the cat");
        assert_eq!(vocab.decode(&[999]), UNK_TOKEN);
    }

    #[test]
    fn test_encode_multiline_preserves_order() {
        let vocab = Vocabulary::build("x y z", 1, None).unwrap();
        let ids = vocab.encode("x\ny\nz\nx");
        assert_eq!(vocab.decode(&ids), "x y z x");
    }

    #[test]
    fn test_encode_sentences() {
        let vocab = Vocabulary::build("a b. c", 1, None).unwrap();
        let sentences = vocab.encode_sentences("a b. c a");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].len(), 2);
        assert_eq!(sentences[1].len(), 2);
    }

    #[test]
    fn test_stats_and_most_common() {
        let vocab = Vocabulary::build("x x x y y z", 1, None).unwrap();
        let stats = vocab.stats();
        assert_eq!(stats.vocab_size, 4);
        assert_eq!(stats.total_words, 6);
        assert_eq!(stats.unknown_words, 0);
        assert_eq!(vocab.most_common(2), vec![("x", 3), ("y", 2)]);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let vocab = Vocabulary::build("alpha beta beta gamma", 1, None).unwrap();
        let path = std::env::temp_dir().join(format!("skipgram_vocab_{}.json", std::process::id()));

        vocab.save(&path).unwrap();
        let loaded = Vocabulary::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.vocab_size(), vocab.vocab_size());
        assert_eq!(loaded.id("beta"), vocab.id("beta"));
        assert_eq!(loaded.count("beta"), 2);
    }

    #[test]
    fn test_load_ignores_stored_index() {
        let path = std::env::temp_dir().join(format!("skipgram_vocab_index_{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"words":["<unk>","x"],"word_to_id":{"<unk>":0,"x":5},"counts":[0,3]}"#,
        )
        .unwrap();
        let vocab = Vocabulary::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(vocab.vocab_size(), 2);
        assert_eq!(vocab.id("x"), Some(1));
        assert_eq!(vocab.count("x"), 3);
    }

    #[test]
    fn test_from_json_rejects_inconsistent_vocabularies() {
        let cases: [&[u8]; 3] = [
            br#"{"words":["<unk>","x"],"counts":[0]}"#,
            br#"{"words":["x","<unk>"],"counts":[3,0]}"#,
            br#"{"words":["<unk>","x","x"],"counts":[0,1,1]}"#,
        ];
        for json in cases {
            assert!(Vocabulary::from_json(json).is_err());
        }
        assert!(matches!(
            Vocabulary::from_json(cases[0]),
            Err(SkipGramError::ShapeMismatch { expected: 2, found: 1 })
        ));
    }
}
