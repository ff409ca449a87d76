//! Batching Demonstration
//!
//! Shows the data pipeline without training: sentence-aware pair generation,
//! train/validation split, shuffled batches and the random-guess baseline
//! loss.
//!
//! Run with: `cargo run --example 03_batching`

use skipgram::{
    compute_dataset_loss, generate_corpus_pairs, train_val_split, PairDataLoader, SkipGram,
    Vocabulary,
};

const SAMPLE: &str = "The king rules the land. The queen rules the land. \
A man walks to the castle. A woman walks to the castle. \
The king and the queen walk to the castle.";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Batching Context Pairs ===\n");

    let vocab = Vocabulary::build(SAMPLE, 1, None)?;
    let sentences = vocab.encode_sentences(SAMPLE);
    println!("Vocabulary: {} entries, {} sentences\n", vocab.vocab_size(), sentences.len());

    // ========================================================================
    // 1. Pairs stay inside sentences
    // ========================================================================
    println!("{}", "=".repeat(70));
    println!("1. Sentence-aware pairs (window=2)");
    println!("{}", "=".repeat(70));
    println!();

    let pairs = generate_corpus_pairs(&sentences, 2)?;
    println!("  {} pairs in total", pairs.len());
    for pair in pairs.iter().take(6) {
        println!(
            "    {:>8} -> {}",
            vocab.word(pair.center).unwrap_or("?"),
            vocab.word(pair.context).unwrap_or("?")
        );
    }

    // ========================================================================
    // 2. Train/validation split
    // ========================================================================
    println!("\n{}", "=".repeat(70));
    println!("2. Train/Validation Split");
    println!("{}", "=".repeat(70));
    println!();

    let (train, val) = train_val_split(&pairs, 0.1);
    println!("  Training pairs:   {}", train.len());
    println!("  Validation pairs: {}", val.len());

    // ========================================================================
    // 3. Shuffled batches
    // ========================================================================
    println!("\n{}", "=".repeat(70));
    println!("3. Shuffled Batches");
    println!("{}", "=".repeat(70));
    println!();

    let mut loader = PairDataLoader::new(train.to_vec(), 8, 42)?;
    println!("  Batch size: {}", loader.batch_size());
    println!("  Batches per epoch: {}\n", loader.num_batches());

    if let Some((centers, contexts)) = loader.next_batch() {
        println!("  First batch:");
        println!("    centers:  {:?}", centers);
        println!("    contexts: {:?}", contexts);
    }
    let mut remaining = 0;
    while loader.next_batch().is_some() {
        remaining += 1;
    }
    println!("  ...and {} more batches before the epoch ends", remaining);

    // ========================================================================
    // 4. Baseline loss
    // ========================================================================
    println!("\n{}", "=".repeat(70));
    println!("4. Untrained Model Loss");
    println!("{}", "=".repeat(70));
    println!();

    let model = SkipGram::new(vocab.vocab_size(), 16, 42)?;
    let loss = compute_dataset_loss(&model, val, 8)?;
    println!("  Validation loss: {:.4}", loss);
    println!(
        "  Random guessing:  {:.4} (ln {})",
        (vocab.vocab_size() as f32).ln(),
        vocab.vocab_size()
    );

    Ok(())
}
