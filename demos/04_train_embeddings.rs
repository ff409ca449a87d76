//! Train Skip-gram Embeddings
//!
//! End-to-end training: vocabulary, sentence-aware pairs, shuffled batches,
//! AdamW, CSV logging, checkpointing and nearest-neighbour queries.
//!
//! ## Usage
//!
//! ```bash
//! # Built-in sample corpus with the tiny preset
//! cargo run --release --example 04_train_embeddings
//!
//! # Your own corpus, with overrides
//! cargo run --release --example 04_train_embeddings -- \
//!     --data corpus.txt --preset small --window 3 --epochs 5
//!
//! # Load hyperparameters from JSON
//! cargo run --release --example 04_train_embeddings -- --config run.json
//! ```
//!
//! A few epochs on a small corpus will not produce meaningful embeddings;
//! the point is to watch the loss fall and see the pipeline work.
//!
//! Output is written to: `data/skipgram_<timestamp>/`

use clap::Parser;
use skipgram::{
    generate_corpus_pairs, train_skipgram, Checkpoint, SkipGram, SkipGramConfig, TrainingLogger,
    Vocabulary,
};
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

const SAMPLE: &str = "The king rules the land. The queen rules the land. \
The king and the queen live in the castle. A man walks to the village. \
A woman walks to the village. The man and the woman work in the village. \
The prince is the son of the king. The princess is the daughter of the queen. \
The dog runs in the field. The cat sleeps in the house. \
The dog and the cat play in the garden. A boy walks the dog. A girl feeds the cat.";

#[derive(Parser)]
#[command(name = "04_train_embeddings", about = "Train skip-gram word embeddings")]
struct Args {
    /// Path to a training text file (defaults to a built-in sample)
    #[arg(long)]
    data: Option<String>,

    /// Hyperparameter preset: tiny, small or default
    #[arg(long, default_value = "tiny")]
    preset: String,

    /// Load hyperparameters from a JSON file instead of a preset
    #[arg(long)]
    config: Option<String>,

    /// Context window radius
    #[arg(long, allow_negative_numbers = true)]
    window: Option<i64>,

    /// Embedding dimension
    #[arg(long)]
    dim: Option<usize>,

    /// Number of epochs
    #[arg(long)]
    epochs: Option<usize>,

    /// Learning rate
    #[arg(long)]
    lr: Option<f32>,

    /// Words to show nearest neighbours for
    #[arg(long, value_delimiter = ',', default_value = "king,queen,dog,cat")]
    query: Vec<String>,

    /// Log verbosity (0 = errors only, 3 = debug)
    #[arg(short, long, default_value_t = 2)]
    verbose: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    stderrlog::new().verbosity(args.verbose).init()?;

    println!("=== Training Skip-gram Embeddings ===\n");

    let mut config = match &args.config {
        Some(path) => SkipGramConfig::from_file(path)?,
        None => match args.preset.as_str() {
            "tiny" => SkipGramConfig::tiny(),
            "small" => SkipGramConfig::small(),
            "default" => SkipGramConfig::default(),
            other => return Err(format!("unknown preset '{}'", other).into()),
        },
    };
    if let Some(window) = args.window {
        config.window_size = window;
    }
    if let Some(dim) = args.dim {
        config.embedding_dim = dim;
    }
    if let Some(epochs) = args.epochs {
        config.num_epochs = epochs;
    }
    if let Some(lr) = args.lr {
        config.learning_rate = lr;
    }
    config.validate()?;

    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let run_dir = format!("data/skipgram_{}", timestamp);
    fs::create_dir_all(&run_dir)?;
    println!("📁 Output directory: {}/\n", run_dir);
    config.save(format!("{}/config.json", run_dir))?;

    // ========================================================================
    // 1. Vocabulary
    // ========================================================================
    println!("{}", "=".repeat(70));
    println!("1. Building Vocabulary");
    println!("{}", "=".repeat(70));
    println!();

    let text = match &args.data {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("could not read {}: {}", path, e))?,
        None => SAMPLE.to_string(),
    };

    let vocab = Vocabulary::build(&text, config.min_count, config.max_vocab)?;
    let stats = vocab.stats();
    println!("  Vocabulary size: {}", stats.vocab_size);
    println!("  Corpus words: {}", stats.total_words);
    println!("  Mapped to <unk>: {}", stats.unknown_words);

    // ========================================================================
    // 2. Context Pairs
    // ========================================================================
    println!("\n{}", "=".repeat(70));
    println!("2. Generating Context Pairs");
    println!("{}", "=".repeat(70));
    println!();

    let sentences = vocab.encode_sentences(&text);
    let pairs = generate_corpus_pairs(&sentences, config.window_size)?;
    println!("  Sentences: {}", sentences.len());
    println!("  Window size: {}", config.window_size);
    println!("  Training pairs: {}", pairs.len());

    // ========================================================================
    // 3. Training
    // ========================================================================
    println!("\n{}", "=".repeat(70));
    println!("3. Training");
    println!("{}", "=".repeat(70));
    println!();

    let mut model = SkipGram::new(vocab.vocab_size(), config.embedding_dim, config.seed)?;
    println!("  Parameters: {}", model.count_parameters());
    println!("  Epochs: {}", config.num_epochs);
    println!("  Batch size: {}", config.batch_size);
    println!("  Learning rate: {}\n", config.learning_rate);

    let mut logger = TrainingLogger::new(format!("{}/training_log.csv", run_dir))?;
    let report = train_skipgram(&mut model, &pairs, &config, Some(&mut logger))?;

    println!("\n  Steps: {}", report.steps);
    if let (Some(first), Some(last)) = (report.epoch_losses.first(), report.final_train_loss()) {
        println!("  Train loss: {:.4} -> {:.4}", first, last);
    }
    if let Some(best) = report.best_val_loss {
        println!("  Best validation loss: {:.4}", best);
    }

    // ========================================================================
    // 4. Nearest Neighbours
    // ========================================================================
    println!("\n{}", "=".repeat(70));
    println!("4. Nearest Neighbours");
    println!("{}", "=".repeat(70));
    println!();

    for word in &args.query {
        let Some(id) = vocab.id(word) else {
            println!("  {:>10}: not in vocabulary", word);
            continue;
        };
        let neighbours: Vec<String> = model
            .most_similar(id, 5)?
            .into_iter()
            .map(|(other, score)| format!("{} ({:.2})", vocab.word(other).unwrap_or("?"), score))
            .collect();
        println!("  {:>10}: {}", word, neighbours.join(", "));
    }

    // ========================================================================
    // 5. Checkpoint
    // ========================================================================
    let checkpoint_path = format!("{}/checkpoint.bin", run_dir);
    let checkpoint = Checkpoint {
        config,
        vocab: Some(vocab),
        model,
    };
    checkpoint.save(&checkpoint_path)?;
    println!("\n✅ Checkpoint saved to: {}", checkpoint_path);
    println!("   Training log: {}/training_log.csv", run_dir);

    Ok(())
}
