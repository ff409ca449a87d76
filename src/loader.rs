//! Shuffled Batching of Context Pairs
//!
//! Training on pairs in generation order would show the model every pair
//! for one center word back-to-back, which makes gradient steps highly
//! correlated. The loader shuffles the pair order once per epoch and hands
//! out fixed-size batches:
//!
//! ```text
//! Pairs:      (10,11) (11,10) (11,12) (12,11) (12,13)
//! Batch size: 2
//!
//! Epoch 1 (shuffled):
//!   Batch 1: centers [12, 10]  contexts [13, 11]
//!   Batch 2: centers [11, 11]  contexts [12, 10]
//!   Batch 3: centers [12]      contexts [11]      (final partial batch)
//!   None  -> reshuffle for epoch 2
//! ```
//!
//! Every pair appears exactly once per epoch. The shuffle is driven by a
//! seeded RNG, so runs are reproducible.
//!
//! ## Example
//!
//! ```rust
//! # use skipgram::{generate_pairs, PairDataLoader};
//! let pairs = generate_pairs(&[1, 2, 3, 4], 1).unwrap();
//! let mut loader = PairDataLoader::new(pairs, 4, 42).unwrap();
//!
//! let mut seen = 0;
//! while let Some((centers, contexts)) = loader.next_batch() {
//!     assert_eq!(centers.len(), contexts.len());
//!     seen += centers.len();
//! }
//! assert_eq!(seen, 6);
//! ```

use crate::error::{Result, SkipGramError};
use crate::pairs::ContextPair;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// A batch of `(center ids, context ids)`, both of the same length
pub type Batch = (Vec<usize>, Vec<usize>);

/// Data loader yielding shuffled batches of context pairs
///
/// # Fields
///
/// - `pairs`: All training pairs, in generation order
/// - `order`: Current epoch's permutation of pair indices
/// - `batch_size`: Pairs per batch
/// - `position`: Index into `order` of the next pair to hand out
pub struct PairDataLoader {
    pairs: Vec<ContextPair>,
    order: Vec<usize>,
    batch_size: usize,
    position: usize,
    epoch: usize,
    rng: StdRng,
}

impl PairDataLoader {
    /// Create a loader and shuffle for the first epoch
    ///
    /// # Errors
    ///
    /// [`SkipGramError::InvalidArgument`] if `batch_size` is zero.
    pub fn new(pairs: Vec<ContextPair>, batch_size: usize, seed: u64) -> Result<Self> {
        if batch_size == 0 {
            return Err(SkipGramError::invalid("batch_size must be positive"));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut order: Vec<usize> = (0..pairs.len()).collect();
        order.shuffle(&mut rng);

        Ok(Self {
            pairs,
            order,
            batch_size,
            position: 0,
            epoch: 0,
            rng,
        })
    }

    /// Get the next batch of training pairs
    ///
    /// Returns `None` once every pair of the current epoch has been handed
    /// out, and reshuffles so the next call starts a new epoch. The last
    /// batch of an epoch may be smaller than `batch_size`.
    pub fn next_batch(&mut self) -> Option<Batch> {
        if self.position >= self.order.len() {
            self.position = 0;
            self.epoch += 1;
            self.order.shuffle(&mut self.rng);
            return None;
        }

        let end = (self.position + self.batch_size).min(self.order.len());
        let (centers, contexts): Batch = self.order[self.position..end]
            .iter()
            .map(|&idx| self.pairs[idx].as_tuple())
            .unzip();

        self.position = end;
        Some((centers, contexts))
    }

    /// Restart the current epoch from its first batch
    ///
    /// Keeps the current shuffle order.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Number of batches per epoch, counting a final partial batch
    pub fn num_batches(&self) -> usize {
        self.pairs.len().div_ceil(self.batch_size)
    }

    /// Number of completed epochs
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// Number of training pairs (one epoch)
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when the loader holds no pairs
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs per full batch
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairs::generate_pairs;

    fn sorted_epoch(loader: &mut PairDataLoader) -> Vec<(usize, usize)> {
        let mut seen = Vec::new();
        while let Some((centers, contexts)) = loader.next_batch() {
            seen.extend(centers.into_iter().zip(contexts));
        }
        seen.sort();
        seen
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(PairDataLoader::new(Vec::new(), 0, 1).is_err());
    }

    #[test]
    fn test_every_pair_once_per_epoch() {
        let pairs = generate_pairs(&[1, 2, 3, 4, 5, 6, 7], 2).unwrap();
        let mut expected: Vec<(usize, usize)> = pairs.iter().map(|p| p.as_tuple()).collect();
        expected.sort();

        let mut loader = PairDataLoader::new(pairs, 5, 3).unwrap();
        assert_eq!(sorted_epoch(&mut loader), expected);
        assert_eq!(loader.epoch(), 1);
        assert_eq!(sorted_epoch(&mut loader), expected);
        assert_eq!(loader.epoch(), 2);
    }

    #[test]
    fn test_batch_sizes_and_partial_batch() {
        let pairs = generate_pairs(&[1, 2, 3, 4], 1).unwrap(); // 6 pairs
        let mut loader = PairDataLoader::new(pairs, 4, 0).unwrap();
        assert_eq!(loader.num_batches(), 2);

        let (c1, x1) = loader.next_batch().unwrap();
        assert_eq!((c1.len(), x1.len()), (4, 4));
        let (c2, _) = loader.next_batch().unwrap();
        assert_eq!(c2.len(), 2);
        assert!(loader.next_batch().is_none());
    }

    #[test]
    fn test_same_seed_same_order() {
        let pairs = generate_pairs(&[1, 2, 3, 4, 5, 6, 7, 8], 3).unwrap();
        let mut a = PairDataLoader::new(pairs.clone(), 8, 99).unwrap();
        let mut b = PairDataLoader::new(pairs, 8, 99).unwrap();
        assert_eq!(a.next_batch(), b.next_batch());
    }

    #[test]
    fn test_reset_restarts_epoch() {
        let pairs = generate_pairs(&[1, 2, 3], 1).unwrap();
        let mut loader = PairDataLoader::new(pairs, 2, 5).unwrap();
        let first = loader.next_batch();
        loader.reset();
        assert_eq!(loader.next_batch(), first);
    }

    #[test]
    fn test_empty_loader() {
        let mut loader = PairDataLoader::new(Vec::new(), 4, 0).unwrap();
        assert!(loader.is_empty());
        assert_eq!(loader.num_batches(), 0);
        assert!(loader.next_batch().is_none());
    }
}
