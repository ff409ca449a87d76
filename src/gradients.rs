//! Gradient Utilities
//!
//! Gradient norm monitoring and clipping.
//!
//! ## Algorithm
//!
//! ```text
//! norm = √(Σ gradient²)  // L2 norm over every parameter
//! if norm > max_norm:
//!     gradients *= (max_norm / norm)
//! ```
//!
//! All gradients are scaled by the same factor, so their relative
//! magnitudes are preserved.

use crate::model::SkipGramGradients;
use rayon::prelude::*;

/// Compute the L2 norm of all gradients
pub fn compute_grad_norm(grads: &SkipGramGradients) -> f32 {
    (sum_sq(&grads.embedding) + sum_sq(&grads.output_weight) + sum_sq(&grads.output_bias)).sqrt()
}

fn sum_sq(data: &[f32]) -> f32 {
    data.par_iter().map(|&g| g * g).sum()
}

/// Clip gradients to a maximum L2 norm
///
/// Scales all gradients in place if their norm exceeds `max_norm`. A
/// `max_norm` of 0 disables clipping.
///
/// # Returns
///
/// The gradient norm before clipping
pub fn clip_gradients(grads: &mut SkipGramGradients, max_norm: f32) -> f32 {
    let norm = compute_grad_norm(grads);

    if max_norm > 0.0 && norm > max_norm {
        let scale = max_norm / norm;
        for data in [
            &mut grads.embedding,
            &mut grads.output_weight,
            &mut grads.output_bias,
        ] {
            data.par_iter_mut().for_each(|g| *g *= scale);
        }
    }

    norm
}
