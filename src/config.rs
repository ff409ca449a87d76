//! Training Configuration
//!
//! Hyperparameters for building a vocabulary, generating pairs and training a
//! skip-gram model. Configurations serialize to JSON so a run can be repeated
//! exactly, and are stored inside checkpoints.
//!
//! ## Presets
//!
//! - **tiny**: seconds on a paragraph of text; good for tests and lessons
//! - **small**: a few minutes on a novel-sized corpus
//!
//! ## Example
//!
//! ```rust
//! use skipgram::SkipGramConfig;
//!
//! let mut config = SkipGramConfig::tiny();
//! config.window_size = 3;
//! assert!(config.validate().is_ok());
//!
//! config.window_size = -1;
//! assert!(config.validate().is_err());
//! ```

use crate::error::{Result, SkipGramError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkipGramConfig {
    /// Length of each word vector
    pub embedding_dim: usize,
    /// Context window radius (signed so invalid configs can be reported)
    pub window_size: i64,
    /// Words rarer than this map to `<unk>`
    pub min_count: usize,
    /// Optional cap on vocabulary size
    pub max_vocab: Option<usize>,
    /// Pairs per optimizer step
    pub batch_size: usize,
    /// Passes over the training pairs
    pub num_epochs: usize,
    pub learning_rate: f32,
    /// Decoupled weight decay on the output matrix
    pub weight_decay: f32,
    /// Maximum gradient norm; 0 disables clipping
    pub grad_clip: f32,
    /// Fraction of pairs held out for validation
    pub val_fraction: f32,
    /// Seed for weight init and shuffling
    pub seed: u64,
    /// Log metrics every N steps
    pub print_every: usize,
}

impl Default for SkipGramConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 100,
            window_size: 5,
            min_count: 5,
            max_vocab: Some(30_000),
            batch_size: 256,
            num_epochs: 5,
            learning_rate: 1e-3,
            weight_decay: 0.0,
            grad_clip: 1.0,
            val_fraction: 0.05,
            seed: 42,
            print_every: 500,
        }
    }
}

impl SkipGramConfig {
    /// Tiny configuration for quick experiments
    ///
    /// A handful of epochs on a small corpus will not produce meaningful
    /// embeddings, but the loss visibly drops.
    pub fn tiny() -> Self {
        Self {
            embedding_dim: 16,
            window_size: 2,
            min_count: 1,
            max_vocab: None,
            batch_size: 16,
            num_epochs: 10,
            learning_rate: 1e-2,
            weight_decay: 0.0,
            grad_clip: 5.0,
            val_fraction: 0.1,
            seed: 42,
            print_every: 20,
        }
    }

    /// Small configuration for medium experiments
    pub fn small() -> Self {
        Self {
            embedding_dim: 64,
            window_size: 4,
            min_count: 3,
            max_vocab: Some(10_000),
            batch_size: 128,
            num_epochs: 3,
            learning_rate: 3e-3,
            weight_decay: 0.01,
            grad_clip: 1.0,
            val_fraction: 0.05,
            seed: 42,
            print_every: 200,
        }
    }

    /// Check every field is in range
    ///
    /// # Errors
    ///
    /// [`SkipGramError::InvalidArgument`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.embedding_dim == 0 {
            return Err(SkipGramError::invalid("embedding_dim must be positive"));
        }
        if self.window_size < 0 {
            return Err(SkipGramError::invalid(format!(
                "window_size must be non-negative, got {}",
                self.window_size
            )));
        }
        if self.batch_size == 0 {
            return Err(SkipGramError::invalid("batch_size must be positive"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(SkipGramError::invalid(format!(
                "learning_rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        if !(self.weight_decay.is_finite() && self.weight_decay >= 0.0) {
            return Err(SkipGramError::invalid("weight_decay must be non-negative"));
        }
        if !(self.grad_clip.is_finite() && self.grad_clip >= 0.0) {
            return Err(SkipGramError::invalid("grad_clip must be non-negative"));
        }
        if !(0.0..1.0).contains(&self.val_fraction) {
            return Err(SkipGramError::invalid(format!(
                "val_fraction must be in [0, 1), got {}",
                self.val_fraction
            )));
        }
        if self.max_vocab == Some(0) {
            return Err(SkipGramError::invalid("max_vocab must be positive"));
        }
        Ok(())
    }

    /// Load and validate a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config: SkipGramConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(SkipGramConfig::default().validate().is_ok());
        assert!(SkipGramConfig::tiny().validate().is_ok());
        assert!(SkipGramConfig::small().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = [
            SkipGramConfig { embedding_dim: 0, ..SkipGramConfig::tiny() },
            SkipGramConfig { window_size: -2, ..SkipGramConfig::tiny() },
            SkipGramConfig { batch_size: 0, ..SkipGramConfig::tiny() },
            SkipGramConfig { learning_rate: 0.0, ..SkipGramConfig::tiny() },
            SkipGramConfig { learning_rate: f32::NAN, ..SkipGramConfig::tiny() },
            SkipGramConfig { val_fraction: 1.0, ..SkipGramConfig::tiny() },
            SkipGramConfig { grad_clip: -1.0, ..SkipGramConfig::tiny() },
            SkipGramConfig { max_vocab: Some(0), ..SkipGramConfig::tiny() },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(SkipGramError::InvalidArgument(_))),
                "{:?}",
                config
            );
        }
    }

    #[test]
    fn test_zero_window_is_valid() {
        let config = SkipGramConfig { window_size: 0, ..SkipGramConfig::tiny() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip() {
        let path = std::env::temp_dir().join(format!("skipgram_config_{}.json", std::process::id()));
        let config = SkipGramConfig::small();
        config.save(&path).unwrap();
        let loaded = SkipGramConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_from_file_validates() {
        let path = std::env::temp_dir().join(format!("skipgram_bad_config_{}.json", std::process::id()));
        let config = SkipGramConfig { window_size: -1, ..SkipGramConfig::tiny() };
        config.save(&path).unwrap();
        let result = SkipGramConfig::from_file(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }
}
