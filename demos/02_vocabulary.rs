//! Vocabulary Demonstration
//!
//! Builds a word-level vocabulary, encodes text to token IDs, and shows how
//! `min_count` trades vocabulary size against `<unk>` tokens.
//!
//! Run with: `cargo run --example 02_vocabulary [path/to/corpus.txt]`

use skipgram::{split_sentences, Vocabulary};
use std::fs;

const SAMPLE: &str = "The quick brown fox jumps over the lazy dog. \
The dog sleeps while the fox runs. A quick dog chases a lazy fox!\n\
The king rules the land. The queen rules the land. \
A man walks to the castle. A woman walks to the castle.";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    stderrlog::new().verbosity(2usize).init()?;

    println!("=== Building a Vocabulary ===\n");

    let text = match std::env::args().nth(1) {
        Some(path) => fs::read_to_string(path)?,
        None => SAMPLE.to_string(),
    };
    println!("Corpus: {} characters\n", text.len());

    // ========================================================================
    // 1. Words and sentences
    // ========================================================================
    println!("{}", "=".repeat(70));
    println!("1. Splitting text");
    println!("{}", "=".repeat(70));
    println!();

    let sentences = split_sentences(&text);
    println!("  {} sentences", sentences.len());
    for sentence in sentences.iter().take(3) {
        println!("  {:?}", sentence);
    }

    // ========================================================================
    // 2. Frequency-ordered IDs
    // ========================================================================
    println!("\n{}", "=".repeat(70));
    println!("2. Vocabulary (min_count=1)");
    println!("{}", "=".repeat(70));
    println!();

    let vocab = Vocabulary::build(&text, 1, None)?;
    println!("  {:?}", vocab.stats());
    println!("\n  Most common words:");
    for (word, count) in vocab.most_common(10) {
        println!("    [{:3}] {:10} x{}", vocab.id_or_unk(word), word, count);
    }

    // ========================================================================
    // 3. Encoding
    // ========================================================================
    println!("\n{}", "=".repeat(70));
    println!("3. Encoding text");
    println!("{}", "=".repeat(70));
    println!();

    for example in ["The lazy fox", "The dragon sleeps"] {
        let ids = vocab.encode(example);
        println!("  {:20} -> {:?} -> \"{}\"", example, ids, vocab.decode(&ids));
    }

    // ========================================================================
    // 4. Rare words
    // ========================================================================
    println!("\n{}", "=".repeat(70));
    println!("4. Effect of min_count");
    println!("{}", "=".repeat(70));
    println!();

    for min_count in [1, 2, 3, 5] {
        let stats = Vocabulary::build(&text, min_count, None)?.stats();
        println!(
            "  min_count={} -> {:4} entries, {:4} of {} words become <unk>",
            min_count, stats.vocab_size, stats.unknown_words, stats.total_words
        );
    }

    Ok(())
}
