//! Skip-gram Model
//!
//! The classic skip-gram network is two matrices:
//!
//! ```text
//! center id ──► Embedding [vocab, dim] ──► h [dim]
//!          h ──► Linear [dim, vocab] + b ──► logits [vocab]
//!     logits ──► softmax ──► P(context | center)
//! ```
//!
//! Training maximizes the probability of the observed context word for each
//! (center, context) pair. Nothing about the embedding is specified directly:
//! words that appear in similar contexts end up with similar rows because
//! they have to produce similar output distributions.
//!
//! ## Forward Pass
//!
//! ```text
//! h      = E[center]           (row lookup)
//! logits = h @ W + b
//! loss   = -log softmax(logits)[context]   (mean over the batch)
//! ```
//!
//! ## Backward Pass
//!
//! Softmax and cross-entropy combine into a simple gradient:
//!
//! ```text
//! d_logits = (softmax(logits) - one_hot(context)) / batch
//! grad_b   = Σ_rows d_logits
//! grad_W   = h^T @ d_logits
//! grad_h   = d_logits @ W^T
//! grad_E[center] += grad_h        (scatter-add, centers may repeat)
//! ```
//!
//! These two matrices are small enough that the gradients are written out by
//! hand; there is no general autograd machinery here.
//!
//! ## Inspecting Embeddings
//!
//! After training, [`SkipGram::most_similar`] ranks words by cosine
//! similarity of their embedding rows. On a small corpus with a few epochs
//! the neighbours are mostly noise; this is a teaching model.

use crate::error::{Result, SkipGramError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;

/// Standard deviation of the embedding initialization
const EMBEDDING_INIT_STD: f32 = 0.02;

/// Embedding + linear classifier over the vocabulary
///
/// All matrices are stored row-major in flat vectors.
#[derive(Clone, Debug)]
pub struct SkipGram {
    pub vocab_size: usize,
    pub embedding_dim: usize,
    /// Input embeddings: [vocab_size, embedding_dim]
    pub embedding: Vec<f32>,
    /// Output projection: [embedding_dim, vocab_size]
    pub output_weight: Vec<f32>,
    /// Output bias: [vocab_size]
    pub output_bias: Vec<f32>,
}

/// Raw classifier scores for a batch: [rows, vocab_size]
#[derive(Clone, Debug)]
pub struct Logits {
    pub data: Vec<f32>,
    pub rows: usize,
    pub cols: usize,
}

impl Logits {
    /// Scores for one batch row
    pub fn row(&self, r: usize) -> &[f32] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }
}

/// Values saved by the forward pass for the backward pass
pub struct SkipGramCache {
    pub centers: Vec<usize>,
    /// Gathered embedding rows: [batch, embedding_dim]
    pub hidden: Vec<f32>,
}

/// Gradients for every model parameter, shaped like the parameters
#[derive(Clone, Debug)]
pub struct SkipGramGradients {
    pub embedding: Vec<f32>,
    pub output_weight: Vec<f32>,
    pub output_bias: Vec<f32>,
}

impl SkipGramGradients {
    /// All-zero gradients shaped like `model`
    pub fn zeros_like(model: &SkipGram) -> Self {
        Self {
            embedding: vec![0.0; model.embedding.len()],
            output_weight: vec![0.0; model.output_weight.len()],
            output_bias: vec![0.0; model.output_bias.len()],
        }
    }
}

impl SkipGram {
    /// Create a model with random initialization
    ///
    /// # Arguments
    ///
    /// * `vocab_size` - Number of tokens, typically [`crate::Vocabulary::vocab_size`]
    /// * `embedding_dim` - Length of each word vector
    /// * `seed` - Seed for reproducible initialization
    ///
    /// # Initialization
    ///
    /// - Embeddings: N(0, 0.02)
    /// - Output weight: uniform in ±√(2/embedding_dim) (He scale)
    /// - Output bias: zeros
    pub fn new(vocab_size: usize, embedding_dim: usize, seed: u64) -> Result<Self> {
        if vocab_size == 0 || embedding_dim == 0 {
            return Err(SkipGramError::invalid(format!(
                "model dimensions must be positive, got vocab_size={} embedding_dim={}",
                vocab_size, embedding_dim
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0f32, EMBEDDING_INIT_STD)
            .map_err(|e| SkipGramError::invalid(e.to_string()))?;
        let embedding: Vec<f32> = (0..vocab_size * embedding_dim)
            .map(|_| normal.sample(&mut rng))
            .collect();

        let scale = (2.0 / embedding_dim as f32).sqrt();
        let output_weight: Vec<f32> = (0..embedding_dim * vocab_size)
            .map(|_| rng.random_range(-scale..scale))
            .collect();

        Ok(Self {
            vocab_size,
            embedding_dim,
            embedding,
            output_weight,
            output_bias: vec![0.0; vocab_size],
        })
    }

    fn check_ids(&self, ids: &[usize]) -> Result<()> {
        match ids.iter().find(|&&id| id >= self.vocab_size) {
            Some(&id) => Err(SkipGramError::TokenOutOfRange {
                id,
                vocab_size: self.vocab_size,
            }),
            None => Ok(()),
        }
    }

    /// Forward pass
    ///
    /// Looks up the embedding row of each center id and projects it to
    /// vocabulary logits.
    ///
    /// # Returns
    ///
    /// `(logits, cache)` where logits has shape [centers.len(), vocab_size]
    ///
    /// # Errors
    ///
    /// [`SkipGramError::TokenOutOfRange`] if any center id is not in the vocabulary.
    pub fn forward(&self, centers: &[usize]) -> Result<(Logits, SkipGramCache)> {
        self.check_ids(centers)?;
        let dim = self.embedding_dim;
        let vocab = self.vocab_size;

        let mut hidden = Vec::with_capacity(centers.len() * dim);
        for &c in centers {
            hidden.extend_from_slice(&self.embedding[c * dim..(c + 1) * dim]);
        }

        let mut logits = vec![0.0f32; centers.len() * vocab];
        logits
            .par_chunks_mut(vocab)
            .zip(hidden.par_chunks(dim))
            .for_each(|(out, h)| {
                out.copy_from_slice(&self.output_bias);
                for (d, &h_d) in h.iter().enumerate() {
                    let w_row = &self.output_weight[d * vocab..(d + 1) * vocab];
                    for (o, &w) in out.iter_mut().zip(w_row) {
                        *o += h_d * w;
                    }
                }
            });

        Ok((
            Logits {
                data: logits,
                rows: centers.len(),
                cols: vocab,
            },
            SkipGramCache {
                centers: centers.to_vec(),
                hidden,
            },
        ))
    }

    fn check_targets(&self, logits: &Logits, targets: &[usize]) -> Result<()> {
        if targets.len() != logits.rows {
            return Err(SkipGramError::ShapeMismatch {
                expected: logits.rows,
                found: targets.len(),
            });
        }
        self.check_ids(targets)
    }

    /// Mean softmax cross-entropy of `targets` under `logits`
    ///
    /// An empty batch has loss 0.
    pub fn compute_loss(&self, logits: &Logits, targets: &[usize]) -> Result<f32> {
        self.check_targets(logits, targets)?;
        if targets.is_empty() {
            return Ok(0.0);
        }

        let total: f32 = targets
            .par_iter()
            .enumerate()
            .map(|(r, &t)| {
                let row = logits.row(r);
                log_sum_exp(row) - row[t]
            })
            .sum();

        Ok(total / targets.len() as f32)
    }

    /// Backward pass
    ///
    /// # Arguments
    ///
    /// * `logits` - Output of [`SkipGram::forward`]
    /// * `targets` - Context id for each row
    /// * `cache` - Cache from the same forward call
    pub fn backward(
        &self,
        logits: &Logits,
        targets: &[usize],
        cache: &SkipGramCache,
    ) -> Result<SkipGramGradients> {
        self.check_targets(logits, targets)?;
        let dim = self.embedding_dim;
        let vocab = self.vocab_size;
        let batch = targets.len();
        let mut grads = SkipGramGradients::zeros_like(self);
        if batch == 0 {
            return Ok(grads);
        }

        // d_logits = (softmax - one_hot) / batch
        let mut d_logits = logits.data.clone();
        d_logits
            .par_chunks_mut(vocab)
            .zip(targets.par_iter())
            .for_each(|(row, &t)| {
                softmax_in_place(row);
                row[t] -= 1.0;
                for v in row.iter_mut() {
                    *v /= batch as f32;
                }
            });

        // grad_b = Σ_rows d_logits
        for row in d_logits.chunks(vocab) {
            for (g, &d) in grads.output_bias.iter_mut().zip(row) {
                *g += d;
            }
        }

        // grad_W[d, :] = Σ_rows h[r, d] * d_logits[r, :]
        grads
            .output_weight
            .par_chunks_mut(vocab)
            .enumerate()
            .for_each(|(d, g_row)| {
                for (h, dl) in cache.hidden.chunks(dim).zip(d_logits.chunks(vocab)) {
                    let h_d = h[d];
                    for (g, &x) in g_row.iter_mut().zip(dl) {
                        *g += h_d * x;
                    }
                }
            });

        // grad_h[r, d] = d_logits[r, :] · W[d, :]
        let grad_hidden: Vec<f32> = d_logits
            .par_chunks(vocab)
            .flat_map_iter(|dl| {
                (0..dim).map(move |d| {
                    let w_row = &self.output_weight[d * vocab..(d + 1) * vocab];
                    dl.iter().zip(w_row).map(|(&a, &b)| a * b).sum::<f32>()
                })
            })
            .collect();

        // Scatter-add into embedding rows; centers may repeat within a batch
        for (&c, gh) in cache.centers.iter().zip(grad_hidden.chunks(dim)) {
            let row = &mut grads.embedding[c * dim..(c + 1) * dim];
            for (g, &x) in row.iter_mut().zip(gh) {
                *g += x;
            }
        }

        Ok(grads)
    }

    /// Forward pass and loss in one call
    pub fn batch_loss(&self, centers: &[usize], contexts: &[usize]) -> Result<f32> {
        let (logits, _) = self.forward(centers)?;
        self.compute_loss(&logits, contexts)
    }

    /// Embedding row for a token id
    pub fn embedding(&self, id: usize) -> Option<&[f32]> {
        if id < self.vocab_size {
            Some(&self.embedding[id * self.embedding_dim..(id + 1) * self.embedding_dim])
        } else {
            None
        }
    }

    /// The `k` tokens whose embeddings are closest to `id` by cosine similarity
    ///
    /// The query token itself is excluded. Results are sorted by descending
    /// similarity; ties keep ascending id order.
    pub fn most_similar(&self, id: usize, k: usize) -> Result<Vec<(usize, f32)>> {
        let query = self.embedding(id).ok_or(SkipGramError::TokenOutOfRange {
            id,
            vocab_size: self.vocab_size,
        })?;

        let mut scores: Vec<(usize, f32)> = self
            .embedding
            .par_chunks(self.embedding_dim)
            .enumerate()
            .filter(|(other, _)| *other != id)
            .map(|(other, row)| (other, cosine_similarity(query, row)))
            .collect();

        scores.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scores.truncate(k);
        Ok(scores)
    }

    /// The `k` most probable context tokens for a center token
    pub fn predict_context(&self, center: usize, k: usize) -> Result<Vec<(usize, f32)>> {
        let (mut logits, _) = self.forward(&[center])?;
        softmax_in_place(&mut logits.data);

        let mut probs: Vec<(usize, f32)> = logits.data.into_iter().enumerate().collect();
        probs.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        probs.truncate(k);
        Ok(probs)
    }

    /// Total number of trainable parameters
    pub fn count_parameters(&self) -> usize {
        self.embedding.len() + self.output_weight.len() + self.output_bias.len()
    }
}

/// Cosine similarity of two vectors; 0 if either has zero length
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

fn log_sum_exp(row: &[f32]) -> f32 {
    let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    max + row.iter().map(|&x| (x - max).exp()).sum::<f32>().ln()
}

fn softmax_in_place(row: &mut [f32]) {
    let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0;
    for x in row.iter_mut() {
        *x = (*x - max).exp();
        sum += *x;
    }
    for x in row.iter_mut() {
        *x /= sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Model with large random parameters so finite differences are well above f32 noise
    fn test_model() -> SkipGram {
        let mut model = SkipGram::new(5, 3, 11).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for p in model
            .embedding
            .iter_mut()
            .chain(model.output_weight.iter_mut())
            .chain(model.output_bias.iter_mut())
        {
            *p = rng.random_range(-1.0..1.0);
        }
        model
    }

    #[test]
    fn test_new_shapes() {
        let model = SkipGram::new(10, 4, 0).unwrap();
        assert_eq!(model.embedding.len(), 40);
        assert_eq!(model.output_weight.len(), 40);
        assert_eq!(model.output_bias.len(), 10);
        assert_eq!(model.count_parameters(), 90);
        assert!(SkipGram::new(0, 4, 0).is_err());
        assert!(SkipGram::new(4, 0, 0).is_err());
    }

    #[test]
    fn test_same_seed_same_weights() {
        let a = SkipGram::new(6, 3, 7).unwrap();
        let b = SkipGram::new(6, 3, 7).unwrap();
        assert_eq!(a.embedding, b.embedding);
        assert_eq!(a.output_weight, b.output_weight);
    }

    #[test]
    fn test_forward_matches_manual_computation() {
        let model = test_model();
        let (logits, cache) = model.forward(&[2]).unwrap();
        assert_eq!((logits.rows, logits.cols), (1, 5));
        assert_eq!(cache.hidden, model.embedding(2).unwrap());

        for v in 0..5 {
            let mut expected = model.output_bias[v];
            for d in 0..3 {
                expected += model.embedding[2 * 3 + d] * model.output_weight[d * 5 + v];
            }
            assert!((logits.data[v] - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_uniform_logits_loss_is_ln_vocab() {
        let mut model = SkipGram::new(8, 2, 0).unwrap();
        model.output_weight.iter_mut().for_each(|w| *w = 0.0);
        let loss = model.batch_loss(&[1, 2], &[3, 4]).unwrap();
        assert!((loss - (8.0f32).ln()).abs() < 1e-5);
    }

    #[test]
    fn test_out_of_range_ids() {
        let model = SkipGram::new(4, 2, 0).unwrap();
        assert!(matches!(
            model.forward(&[4]),
            Err(SkipGramError::TokenOutOfRange { id: 4, vocab_size: 4 })
        ));
        let (logits, _) = model.forward(&[0]).unwrap();
        assert!(model.compute_loss(&logits, &[9]).is_err());
        assert!(model.compute_loss(&logits, &[0, 1]).is_err());
    }

    #[test]
    fn test_gradients_match_finite_differences() {
        let model = test_model();
        let centers = [0, 2, 2];
        let contexts = [1, 4, 3];

        let (logits, cache) = model.forward(&centers).unwrap();
        let grads = model.backward(&logits, &contexts, &cache).unwrap();

        let eps = 1e-2;
        let numeric = |perturb: &dyn Fn(&mut SkipGram, f32)| {
            let mut plus = model.clone();
            perturb(&mut plus, eps);
            let mut minus = model.clone();
            perturb(&mut minus, -eps);
            (plus.batch_loss(&centers, &contexts).unwrap()
                - minus.batch_loss(&centers, &contexts).unwrap())
                / (2.0 * eps)
        };

        for i in 0..model.embedding.len() {
            let n = numeric(&|m: &mut SkipGram, e: f32| m.embedding[i] += e);
            assert!((n - grads.embedding[i]).abs() < 2e-3, "embedding[{}]: {} vs {}", i, n, grads.embedding[i]);
        }
        for i in 0..model.output_weight.len() {
            let n = numeric(&|m: &mut SkipGram, e: f32| m.output_weight[i] += e);
            assert!((n - grads.output_weight[i]).abs() < 2e-3, "output_weight[{}]", i);
        }
        for i in 0..model.output_bias.len() {
            let n = numeric(&|m: &mut SkipGram, e: f32| m.output_bias[i] += e);
            assert!((n - grads.output_bias[i]).abs() < 2e-3, "output_bias[{}]", i);
        }
    }

    #[test]
    fn test_unused_embedding_rows_get_no_gradient() {
        let model = test_model();
        let (logits, cache) = model.forward(&[1]).unwrap();
        let grads = model.backward(&logits, &[0], &cache).unwrap();
        for id in [0, 2, 3, 4] {
            assert!(grads.embedding[id * 3..(id + 1) * 3].iter().all(|&g| g == 0.0));
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_most_similar() {
        let mut model = SkipGram::new(4, 2, 0).unwrap();
        model.embedding = vec![
            1.0, 0.0, // 0
            0.9, 0.1, // 1
            0.0, 1.0, // 2
            -1.0, 0.0, // 3
        ];
        let similar = model.most_similar(0, 2).unwrap();
        assert_eq!(similar[0].0, 1);
        assert_eq!(similar[1].0, 2);
        assert!(similar.iter().all(|(id, _)| *id != 0));
        assert!(model.most_similar(4, 1).is_err());
    }

    #[test]
    fn test_predict_context_probabilities() {
        let model = test_model();
        let probs = model.predict_context(1, 5).unwrap();
        let total: f32 = probs.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-5);
        assert!(probs.windows(2).all(|w| w[0].1 >= w[1].1));
    }
}
