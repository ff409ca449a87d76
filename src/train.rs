//! Training Loop
//!
//! Ties the pieces together:
//!
//! ```text
//! pairs ──► train/val split ──► PairDataLoader (shuffled batches)
//!                                   │
//!                                   ▼
//!        forward ─► loss ─► backward ─► clip ─► AdamW update
//!                                   │
//!                                   ▼
//!                        TrainingLogger (CSV + console)
//! ```
//!
//! The validation pairs are taken from the end of the pair list. Pairs are
//! generated in corpus order, so this holds out the tail of the text rather
//! than a random sample, keeping train and validation contexts apart.
//!
//! ## Example
//!
//! ```rust
//! use skipgram::{generate_pairs, train_skipgram, SkipGram, SkipGramConfig};
//!
//! let tokens: Vec<usize> = (0..40).map(|i| i % 4).collect();
//! let pairs = generate_pairs(&tokens, 1).unwrap();
//!
//! let config = SkipGramConfig { num_epochs: 2, ..SkipGramConfig::tiny() };
//! let mut model = SkipGram::new(4, config.embedding_dim, config.seed).unwrap();
//! let report = train_skipgram(&mut model, &pairs, &config, None).unwrap();
//! assert_eq!(report.epoch_losses.len(), 2);
//! ```

use crate::config::SkipGramConfig;
use crate::error::{Result, SkipGramError};
use crate::gradients::clip_gradients;
use crate::loader::PairDataLoader;
use crate::model::SkipGram;
use crate::optimizer::{adamw_update, AdamWOptimizer};
use crate::pairs::ContextPair;
use crate::training_logger::{StepMetrics, TrainingLogger};

/// Split items into training and validation sets
///
/// The validation set is taken from the end.
///
/// # Example
///
/// ```rust
/// # use skipgram::train_val_split;
/// let items = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
/// let (train, val) = train_val_split(&items, 0.2);
/// assert_eq!(train.len(), 8);
/// assert_eq!(val.len(), 2);
/// ```
pub fn train_val_split<T>(items: &[T], val_fraction: f32) -> (&[T], &[T]) {
    let fraction = val_fraction.clamp(0.0, 1.0);
    let split_idx = ((items.len() as f32) * (1.0 - fraction)) as usize;
    items.split_at(split_idx.min(items.len()))
}

/// Mean loss over every pair in a dataset
///
/// Evaluates in batches of `batch_size`. An empty dataset has loss 0.
pub fn compute_dataset_loss(
    model: &SkipGram,
    pairs: &[ContextPair],
    batch_size: usize,
) -> Result<f32> {
    if batch_size == 0 {
        return Err(SkipGramError::invalid("batch_size must be positive"));
    }
    if pairs.is_empty() {
        return Ok(0.0);
    }

    let mut total = 0.0;
    for chunk in pairs.chunks(batch_size) {
        let (centers, contexts): (Vec<usize>, Vec<usize>) =
            chunk.iter().map(ContextPair::as_tuple).unzip();
        total += model.batch_loss(&centers, &contexts)? * chunk.len() as f32;
    }

    Ok(total / pairs.len() as f32)
}

fn validation_loss(
    model: &SkipGram,
    val_pairs: &[ContextPair],
    batch_size: usize,
) -> Result<Option<f32>> {
    if val_pairs.is_empty() {
        Ok(None)
    } else {
        compute_dataset_loss(model, val_pairs, batch_size).map(Some)
    }
}

/// Summary of a training run
#[derive(Clone, Debug)]
pub struct TrainingReport {
    /// Optimizer steps taken
    pub steps: usize,
    /// Mean training loss of each epoch
    pub epoch_losses: Vec<f32>,
    /// Validation loss after the last epoch (None without a validation set)
    pub final_val_loss: Option<f32>,
    /// Lowest validation loss seen at an epoch boundary
    pub best_val_loss: Option<f32>,
}

impl TrainingReport {
    /// Mean training loss of the last epoch
    pub fn final_train_loss(&self) -> Option<f32> {
        self.epoch_losses.last().copied()
    }
}

/// Train a skip-gram model on context pairs
///
/// # Arguments
///
/// * `model` - Model to train (updated in place)
/// * `pairs` - Training pairs, in corpus order
/// * `config` - Hyperparameters; validated before training starts
/// * `logger` - Optional CSV logger, written every `print_every` steps and
///   at the end of each epoch
///
/// # Errors
///
/// - [`SkipGramError::InvalidArgument`] for an invalid config or when the
///   split leaves no training pairs
/// - [`SkipGramError::TokenOutOfRange`] if a pair uses an id outside the model
/// - I/O errors from the logger
pub fn train_skipgram(
    model: &mut SkipGram,
    pairs: &[ContextPair],
    config: &SkipGramConfig,
    mut logger: Option<&mut TrainingLogger>,
) -> Result<TrainingReport> {
    config.validate()?;

    let (train_pairs, val_pairs) = train_val_split(pairs, config.val_fraction);
    if train_pairs.is_empty() {
        return Err(SkipGramError::invalid(format!(
            "no training pairs left after holding out {:.0}% of {} pairs",
            config.val_fraction * 100.0,
            pairs.len()
        )));
    }

    log::info!(
        "training skip-gram: {} train pairs, {} validation pairs, {} parameters",
        train_pairs.len(),
        val_pairs.len(),
        model.count_parameters()
    );

    let mut loader = PairDataLoader::new(train_pairs.to_vec(), config.batch_size, config.seed)?;
    let mut optimizer = AdamWOptimizer::new(model);

    let mut step = 0;
    let mut epoch_losses = Vec::with_capacity(config.num_epochs);
    let mut best_val_loss: Option<f32> = None;
    let mut final_val_loss = None;

    for epoch in 1..=config.num_epochs {
        let mut epoch_total = 0.0;
        let mut window_total = 0.0;
        let mut window_pairs = 0;
        let mut grad_norm = 0.0;

        while let Some((centers, contexts)) = loader.next_batch() {
            let (logits, cache) = model.forward(&centers)?;
            let loss = model.compute_loss(&logits, &contexts)?;
            let mut grads = model.backward(&logits, &contexts, &cache)?;
            grad_norm = clip_gradients(&mut grads, config.grad_clip);
            adamw_update(
                model,
                &grads,
                &mut optimizer,
                config.learning_rate,
                config.weight_decay,
            );

            step += 1;
            let batch_loss = loss * centers.len() as f32;
            epoch_total += batch_loss;
            window_total += batch_loss;
            window_pairs += centers.len();

            if config.print_every > 0 && step % config.print_every == 0 {
                let metrics = StepMetrics {
                    step,
                    epoch,
                    learning_rate: config.learning_rate,
                    train_loss: window_total / window_pairs as f32,
                    val_loss: validation_loss(model, val_pairs, config.batch_size)?,
                    grad_norm,
                };
                log::debug!("step {}: train loss {:.4}", step, metrics.train_loss);
                if let Some(logger) = logger.as_deref_mut() {
                    logger.log(&metrics)?;
                }
                window_total = 0.0;
                window_pairs = 0;
            }
        }

        let epoch_loss = epoch_total / train_pairs.len() as f32;
        epoch_losses.push(epoch_loss);

        let val = validation_loss(model, val_pairs, config.batch_size)?;
        if let Some(v) = val {
            best_val_loss = Some(best_val_loss.map_or(v, |best| best.min(v)));
        }
        final_val_loss = val;

        log::info!(
            "epoch {}/{}: train loss {:.4}, val loss {}",
            epoch,
            config.num_epochs,
            epoch_loss,
            val.map_or_else(|| "n/a".to_string(), |v| format!("{:.4}", v))
        );
        if let Some(logger) = logger.as_deref_mut() {
            logger.log(&StepMetrics {
                step,
                epoch,
                learning_rate: config.learning_rate,
                train_loss: epoch_loss,
                val_loss: val,
                grad_norm,
            })?;
        }
    }

    Ok(TrainingReport {
        steps: step,
        epoch_losses,
        final_val_loss,
        best_val_loss,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairs::generate_pairs;

    /// A corpus where every token has a fixed set of neighbours
    fn cyclic_pairs(vocab: usize, len: usize) -> Vec<ContextPair> {
        let tokens: Vec<usize> = (0..len).map(|i| i % vocab).collect();
        generate_pairs(&tokens, 1).unwrap()
    }

    #[test]
    fn test_train_val_split_edges() {
        let items = [1, 2, 3];
        assert_eq!(train_val_split(&items, 0.0), (&items[..], &items[3..]));
        let (train, val) = train_val_split(&items, 1.0);
        assert!(train.is_empty());
        assert_eq!(val.len(), 3);
        let empty: [u8; 0] = [];
        assert_eq!(train_val_split(&empty, 0.5).0.len(), 0);
    }

    #[test]
    fn test_dataset_loss_matches_batch_loss() {
        let model = SkipGram::new(4, 3, 0).unwrap();
        let pairs = cyclic_pairs(4, 12);
        let (centers, contexts): (Vec<usize>, Vec<usize>) =
            pairs.iter().map(ContextPair::as_tuple).unzip();

        let whole = model.batch_loss(&centers, &contexts).unwrap();
        let batched = compute_dataset_loss(&model, &pairs, 5).unwrap();
        assert!((whole - batched).abs() < 1e-4);
        assert_eq!(compute_dataset_loss(&model, &[], 5).unwrap(), 0.0);
        assert!(compute_dataset_loss(&model, &pairs, 0).is_err());
    }

    #[test]
    fn test_loss_decreases() {
        let pairs = cyclic_pairs(6, 120);
        let config = SkipGramConfig {
            num_epochs: 15,
            print_every: 0,
            ..SkipGramConfig::tiny()
        };
        let mut model = SkipGram::new(6, config.embedding_dim, config.seed).unwrap();

        let report = train_skipgram(&mut model, &pairs, &config, None).unwrap();

        assert_eq!(report.epoch_losses.len(), 15);
        let first = report.epoch_losses[0];
        let last = report.final_train_loss().unwrap();
        assert!(last < first * 0.8, "loss did not fall: {} -> {}", first, last);
        // Each token has exactly two neighbours, so ln(2) is the floor
        assert!(last > (2.0f32).ln() - 0.05);
        assert!(report.final_val_loss.is_some());
        assert!(report.best_val_loss.unwrap() <= report.final_val_loss.unwrap());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let pairs = cyclic_pairs(4, 10);
        let mut model = SkipGram::new(4, 4, 0).unwrap();
        let config = SkipGramConfig { batch_size: 0, ..SkipGramConfig::tiny() };
        assert!(matches!(
            train_skipgram(&mut model, &pairs, &config, None),
            Err(SkipGramError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rejects_empty_training_set() {
        let mut model = SkipGram::new(4, 4, 0).unwrap();
        assert!(train_skipgram(&mut model, &[], &SkipGramConfig::tiny(), None).is_err());
    }

    #[test]
    fn test_rejects_out_of_vocabulary_pairs() {
        let pairs = vec![ContextPair::new(0, 9); 20];
        let mut model = SkipGram::new(4, 4, 0).unwrap();
        assert!(matches!(
            train_skipgram(&mut model, &pairs, &SkipGramConfig::tiny(), None),
            Err(SkipGramError::TokenOutOfRange { .. })
        ));
    }

    #[test]
    fn test_logger_receives_rows() {
        let path = std::env::temp_dir().join(format!("skipgram_train_log_{}.csv", std::process::id()));
        let pairs = cyclic_pairs(4, 40);
        let config = SkipGramConfig {
            num_epochs: 2,
            batch_size: 8,
            print_every: 2,
            ..SkipGramConfig::tiny()
        };
        let mut model = SkipGram::new(4, config.embedding_dim, 0).unwrap();
        let mut logger = TrainingLogger::new(&path).unwrap();

        let report = train_skipgram(&mut model, &pairs, &config, Some(&mut logger)).unwrap();
        drop(logger);

        let rows = std::fs::read_to_string(&path).unwrap().lines().count() - 1;
        std::fs::remove_file(&path).ok();
        assert_eq!(rows, report.steps / 2 + 2);
    }
}
