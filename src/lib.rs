//! skipgram: Word Embeddings From Scratch
//!
//! A small, readable implementation of skip-gram word embeddings in Rust,
//! for learning how distributional embeddings are trained end to end.
//!
//! # Modules
//!
//! - [`pairs`] - Context-pair generation with a symmetric window
//! - [`vocab`] - Word-level vocabulary: text to token IDs
//! - [`loader`] - Shuffled batching of context pairs
//! - [`model`] - Embedding + linear classifier with explicit backward pass
//! - [`optimizer`] - SGD and AdamW updates
//! - [`gradients`] - Gradient norm and clipping
//! - [`train`] - Training loop and dataset loss
//! - [`training_logger`] - CSV and console metrics
//! - [`checkpoint`] - Saving and loading trained models
//! - [`config`] - Hyperparameters and presets
//!
//! # Example
//!
//! ```rust
//! use skipgram::{generate_corpus_pairs, train_skipgram, SkipGram, SkipGramConfig, Vocabulary};
//!
//! let text = "the cat sat on the mat. the dog sat on the log.";
//! let config = SkipGramConfig { num_epochs: 3, ..SkipGramConfig::tiny() };
//!
//! let vocab = Vocabulary::build(text, config.min_count, config.max_vocab).unwrap();
//! let sentences = vocab.encode_sentences(text);
//! let pairs = generate_corpus_pairs(&sentences, config.window_size).unwrap();
//!
//! let mut model = SkipGram::new(vocab.vocab_size(), config.embedding_dim, config.seed).unwrap();
//! let report = train_skipgram(&mut model, &pairs, &config, None).unwrap();
//! assert_eq!(report.epoch_losses.len(), 3);
//!
//! let cat = vocab.id("cat").unwrap();
//! let neighbours = model.most_similar(cat, 3).unwrap();
//! assert_eq!(neighbours.len(), 3);
//! ```

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod gradients;
pub mod loader;
pub mod model;
pub mod optimizer;
pub mod pairs;
pub mod train;
pub mod training_logger;
pub mod vocab;

// Re-export main types for convenience
pub use checkpoint::Checkpoint;
pub use config::SkipGramConfig;
pub use error::{Result, SkipGramError};
pub use gradients::{clip_gradients, compute_grad_norm};
pub use loader::{Batch, PairDataLoader};
pub use model::{cosine_similarity, Logits, SkipGram, SkipGramCache, SkipGramGradients};
pub use optimizer::{adamw_update, sgd_update, AdamWOptimizer};
pub use pairs::{
    context_pairs, generate_corpus_pairs, generate_pairs, pair_count, ContextPair, ContextPairs,
    ContextWindow,
};
pub use train::{compute_dataset_loss, train_skipgram, train_val_split, TrainingReport};
pub use training_logger::{StepMetrics, TrainingLogger};
pub use vocab::{split_sentences, tokenize_words, Vocabulary, VocabularyStats, UNK_ID, UNK_TOKEN};
