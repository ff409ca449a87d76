//! Skip-gram Context Pairs
//!
//! Skip-gram training turns a sequence of token IDs into (center, context)
//! examples: every token is paired with each neighbour that lies within a
//! symmetric window around it. A classifier is then trained to predict the
//! context token from the center token, and the embedding it learns along the
//! way is the word vector.
//!
//! ## How Pairs Are Generated
//!
//! ```text
//! Tokens: [10, 11, 12, 13]
//! Window: 1
//!
//! i=0 (10): j in [-1, 1] -> skip -1, skip 0 (self) -> (10,11)
//! i=1 (11): j in [ 0, 2] -> (11,10) (11,12)
//! i=2 (12): j in [ 1, 3] -> (12,11) (12,13)
//! i=3 (13): j in [ 2, 4] -> (13,12), skip 4 (past the end)
//! ```
//!
//! Pairs come out ordered by center position, then by increasing context
//! position. The self-pair is never emitted, and positions outside the
//! sequence are skipped rather than padded.
//!
//! ## Edge Cases
//!
//! - Empty or single-token sequences produce no pairs
//! - A window of 0 produces no pairs
//! - A negative window is rejected with [`SkipGramError::InvalidArgument`]
//!
//! ## Example
//!
//! ```rust
//! use skipgram::{generate_pairs, ContextPair};
//!
//! let pairs = generate_pairs(&[10, 11, 12], 1).unwrap();
//! assert_eq!(
//!     pairs,
//!     vec![
//!         ContextPair::new(10, 11),
//!         ContextPair::new(11, 10),
//!         ContextPair::new(11, 12),
//!         ContextPair::new(12, 11),
//!     ]
//! );
//! ```

use crate::error::{Result, SkipGramError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One skip-gram training example
///
/// Associates a focal (center) token with one of its neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextPair {
    pub center: usize,
    pub context: usize,
}

impl ContextPair {
    /// Create a pair from a center token and one of its neighbours
    pub fn new(center: usize, context: usize) -> Self {
        Self { center, context }
    }

    /// The pair as `(center, context)`
    pub fn as_tuple(&self) -> (usize, usize) {
        (self.center, self.context)
    }
}

impl From<(usize, usize)> for ContextPair {
    fn from((center, context): (usize, usize)) -> Self {
        Self { center, context }
    }
}

impl From<ContextPair> for (usize, usize) {
    fn from(pair: ContextPair) -> Self {
        pair.as_tuple()
    }
}

/// A validated context window radius
///
/// The window is symmetric and inclusive: a radius of 2 reaches two positions
/// to the left and two to the right of the center.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextWindow(usize);

impl ContextWindow {
    /// Validate a window size
    ///
    /// # Errors
    ///
    /// Returns [`SkipGramError::InvalidArgument`] if `window_size` is negative.
    pub fn new(window_size: i64) -> Result<Self> {
        if window_size < 0 {
            return Err(SkipGramError::invalid(format!(
                "window size must be non-negative, got {}",
                window_size
            )));
        }
        // Radii wider than the address space behave the same as usize::MAX
        Ok(Self(usize::try_from(window_size).unwrap_or(usize::MAX)))
    }

    /// Build a window from an already non-negative radius
    pub fn from_radius(radius: usize) -> Self {
        Self(radius)
    }

    /// How many positions the window reaches on each side of the center
    pub fn radius(&self) -> usize {
        self.0
    }

    /// Closed range of positions `[lo, hi]` this window covers around `center`,
    /// clamped to a sequence of length `len` (`len` must be non-zero)
    fn bounds(&self, center: usize, len: usize) -> (usize, usize) {
        let lo = center.saturating_sub(self.0);
        let hi = center.saturating_add(self.0).min(len - 1);
        (lo, hi)
    }
}

/// Lazy iterator over the context pairs of one sequence
///
/// Produces exactly the pairs [`generate_pairs`] returns, in the same order,
/// without materializing them.
pub struct ContextPairs<'a> {
    sequence: &'a [usize],
    window: ContextWindow,
    center: usize,
    next_context: usize,
    hi: usize,
    remaining: usize,
}

impl<'a> ContextPairs<'a> {
    fn new(sequence: &'a [usize], window: ContextWindow) -> Self {
        let (next_context, hi) = if sequence.is_empty() {
            (0, 0)
        } else {
            window.bounds(0, sequence.len())
        };
        Self {
            sequence,
            window,
            center: 0,
            next_context,
            hi,
            remaining: pair_count(sequence.len(), window),
        }
    }
}

impl Iterator for ContextPairs<'_> {
    type Item = ContextPair;

    fn next(&mut self) -> Option<ContextPair> {
        let len = self.sequence.len();
        while self.center < len {
            if self.next_context > self.hi {
                self.center += 1;
                if self.center < len {
                    let (lo, hi) = self.window.bounds(self.center, len);
                    self.next_context = lo;
                    self.hi = hi;
                }
                continue;
            }

            let j = self.next_context;
            self.next_context += 1;
            if j == self.center {
                continue;
            }

            self.remaining -= 1;
            return Some(ContextPair::new(self.sequence[self.center], self.sequence[j]));
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ContextPairs<'_> {}

/// Iterate the context pairs of `sequence` lazily
pub fn context_pairs(sequence: &[usize], window: ContextWindow) -> ContextPairs<'_> {
    ContextPairs::new(sequence, window)
}

/// Generate every (center, context) pair within a symmetric window
///
/// For each index `i`, every index `j` in `[i - window_size, i + window_size]`
/// with `j != i` and `0 <= j < sequence.len()` yields
/// `(sequence[i], sequence[j])`. Output is ordered by `i`, then by increasing `j`.
///
/// # Arguments
///
/// * `sequence` - Token IDs, typically from [`crate::Vocabulary::encode`]
/// * `window_size` - How far from the center a context token may be drawn
///
/// # Errors
///
/// [`SkipGramError::InvalidArgument`] if `window_size` is negative. No pairs
/// are produced in that case.
///
/// # Example
///
/// ```rust
/// # use skipgram::generate_pairs;
/// let pairs = generate_pairs(&[10, 11, 12, 13], 2).unwrap();
/// assert_eq!(pairs.len(), 10);
/// assert!(generate_pairs(&[10, 11], -1).is_err());
/// ```
pub fn generate_pairs(sequence: &[usize], window_size: i64) -> Result<Vec<ContextPair>> {
    let window = ContextWindow::new(window_size)?;
    Ok(context_pairs(sequence, window).collect())
}

/// Number of pairs a sequence of `len` tokens yields for `window`
///
/// Sums `min(i + w, len - 1) - max(i - w, 0)` over every position, i.e. the
/// window width at each position minus the excluded self-pair.
pub fn pair_count(len: usize, window: ContextWindow) -> usize {
    if len == 0 {
        return 0;
    }
    (0..len)
        .map(|i| {
            let (lo, hi) = window.bounds(i, len);
            hi - lo
        })
        .sum()
}

/// Generate pairs for a corpus split into sentences
///
/// Windows never cross sentence boundaries. Sentences are processed in
/// parallel, and the result is concatenated in sentence order, so the output
/// is identical to calling [`generate_pairs`] on each sentence in turn.
///
/// # Errors
///
/// [`SkipGramError::InvalidArgument`] if `window_size` is negative.
pub fn generate_corpus_pairs<S>(sentences: &[S], window_size: i64) -> Result<Vec<ContextPair>>
where
    S: AsRef<[usize]> + Sync,
{
    let window = ContextWindow::new(window_size)?;

    let per_sentence: Vec<Vec<ContextPair>> = sentences
        .par_iter()
        .map(|sentence| context_pairs(sentence.as_ref(), window).collect())
        .collect();

    Ok(per_sentence.concat())
}
