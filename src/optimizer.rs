//! Optimizers: SGD and AdamW
//!
//! Two update rules for [`SkipGram`] parameters.
//!
//! ## SGD
//!
//! ```text
//! θ = θ - α * g
//! ```
//!
//! The simplest possible optimizer. It works for skip-gram but needs a
//! carefully chosen learning rate.
//!
//! ## AdamW
//!
//! ```text
//! θ = θ * (1 - α * λ)              # Weight decay (output matrix only)
//! m = β₁ * m + (1 - β₁) * g        # First moment (momentum)
//! v = β₂ * v + (1 - β₂) * g²       # Second moment (variance)
//! m_hat = m / (1 - β₁^t)           # Bias correction
//! v_hat = v / (1 - β₂^t)           # Bias correction
//! θ = θ - α * m_hat / (√v_hat + ε) # Parameter update
//! ```
//!
//! Decay is applied to the output weight matrix only. Embedding rows and the
//! bias are left undecayed: a rare word's embedding only receives gradient
//! when it appears in a batch, and decaying it every step would shrink it
//! toward zero between appearances.
//!
//! ## Example
//!
//! ```rust
//! use skipgram::{adamw_update, AdamWOptimizer, SkipGram};
//!
//! let mut model = SkipGram::new(10, 4, 0).unwrap();
//! let mut optimizer = AdamWOptimizer::new(&model);
//!
//! let (logits, cache) = model.forward(&[1, 2]).unwrap();
//! let grads = model.backward(&logits, &[2, 1], &cache).unwrap();
//! adamw_update(&mut model, &grads, &mut optimizer, 1e-3, 0.0);
//! assert_eq!(optimizer.step, 1);
//! ```
//!
//! ## References
//!
//! - Loshchilov & Hutter (2019): "Decoupled Weight Decay Regularization"
//! - Kingma & Ba (2014): "Adam: A Method for Stochastic Optimization"

use crate::model::{SkipGram, SkipGramGradients};
use rayon::prelude::*;

/// Plain gradient descent step
pub fn sgd_update(model: &mut SkipGram, grads: &SkipGramGradients, lr: f32) {
    for (param, grad) in [
        (&mut model.embedding, &grads.embedding),
        (&mut model.output_weight, &grads.output_weight),
        (&mut model.output_bias, &grads.output_bias),
    ] {
        for (p, &g) in param.iter_mut().zip(grad.iter()) {
            *p -= lr * g;
        }
    }
}

/// AdamW optimizer state
///
/// First and second moment estimates for each model parameter, shaped like
/// the parameters.
#[derive(Clone, Debug)]
pub struct AdamWOptimizer {
    pub m_embedding: Vec<f32>,
    pub m_output_weight: Vec<f32>,
    pub m_output_bias: Vec<f32>,

    pub v_embedding: Vec<f32>,
    pub v_output_weight: Vec<f32>,
    pub v_output_bias: Vec<f32>,

    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    pub step: usize,
}

impl AdamWOptimizer {
    /// Create an optimizer with zeroed moments and standard hyperparameters
    /// (β₁=0.9, β₂=0.999, ε=1e-8)
    pub fn new(model: &SkipGram) -> Self {
        Self {
            m_embedding: vec![0.0; model.embedding.len()],
            m_output_weight: vec![0.0; model.output_weight.len()],
            m_output_bias: vec![0.0; model.output_bias.len()],
            v_embedding: vec![0.0; model.embedding.len()],
            v_output_weight: vec![0.0; model.output_weight.len()],
            v_output_bias: vec![0.0; model.output_bias.len()],
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            step: 0,
        }
    }
}

/// AdamW parameter update
///
/// # Arguments
///
/// * `model` - Model to update (modified in place)
/// * `grads` - Gradients from [`SkipGram::backward`]
/// * `optimizer` - Optimizer state (moments updated in place)
/// * `lr` - Learning rate
/// * `weight_decay` - Decoupled decay coefficient for the output matrix
///
/// # Performance
///
/// Parameters with more than 1000 elements are updated in parallel.
pub fn adamw_update(
    model: &mut SkipGram,
    grads: &SkipGramGradients,
    optimizer: &mut AdamWOptimizer,
    lr: f32,
    weight_decay: f32,
) {
    optimizer.step += 1;
    let step = optimizer.step as f32;

    let bias_correction1 = 1.0 - optimizer.beta1.powf(step);
    let bias_correction2 = 1.0 - optimizer.beta2.powf(step);
    let beta1 = optimizer.beta1;
    let beta2 = optimizer.beta2;
    let epsilon = optimizer.epsilon;

    // One AdamW step for a single value
    let update = |param: &mut f32, grad: f32, m: &mut f32, v: &mut f32, decay: bool| {
        if decay {
            *param *= 1.0 - lr * weight_decay;
        }
        *m = beta1 * *m + (1.0 - beta1) * grad;
        *v = beta2 * *v + (1.0 - beta2) * grad * grad;
        let m_hat = *m / bias_correction1;
        let v_hat = *v / bias_correction2;
        *param -= lr * m_hat / (v_hat.sqrt() + epsilon);
    };

    macro_rules! adamw_update_param {
        ($param:expr, $grad:expr, $m:expr, $v:expr, $apply_decay:expr) => {
            if $param.len() > 1000 {
                $param
                    .par_iter_mut()
                    .zip($grad.par_iter())
                    .zip($m.par_iter_mut().zip($v.par_iter_mut()))
                    .for_each(|((p, &g), (m, v))| update(p, g, m, v, $apply_decay));
            } else {
                for (((p, &g), m), v) in $param
                    .iter_mut()
                    .zip($grad.iter())
                    .zip($m.iter_mut())
                    .zip($v.iter_mut())
                {
                    update(p, g, m, v, $apply_decay);
                }
            }
        };
    }

    adamw_update_param!(
        model.embedding,
        grads.embedding,
        optimizer.m_embedding,
        optimizer.v_embedding,
        false
    );
    adamw_update_param!(
        model.output_weight,
        grads.output_weight,
        optimizer.m_output_weight,
        optimizer.v_output_weight,
        true
    );
    adamw_update_param!(
        model.output_bias,
        grads.output_bias,
        optimizer.m_output_bias,
        optimizer.v_output_bias,
        false
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_grads(model: &SkipGram) -> SkipGramGradients {
        let mut grads = SkipGramGradients::zeros_like(model);
        grads.embedding.iter_mut().for_each(|g| *g = 1.0);
        grads.output_weight.iter_mut().for_each(|g| *g = 1.0);
        grads.output_bias.iter_mut().for_each(|g| *g = 1.0);
        grads
    }

    #[test]
    fn test_sgd_moves_against_gradient() {
        let mut model = SkipGram::new(3, 2, 0).unwrap();
        let before = model.clone();
        let grads = unit_grads(&model);
        sgd_update(&mut model, &grads, 0.5);
        for (a, b) in model.embedding.iter().zip(&before.embedding) {
            assert!((a - (b - 0.5)).abs() < 1e-6);
        }
        assert!(model.output_bias.iter().all(|&b| (b + 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_adamw_first_step_is_lr_sized() {
        // With bias correction, the first step moves each parameter by ~lr
        let mut model = SkipGram::new(3, 2, 0).unwrap();
        let before = model.clone();
        let grads = unit_grads(&model);
        let mut optimizer = AdamWOptimizer::new(&model);

        adamw_update(&mut model, &grads, &mut optimizer, 0.01, 0.0);

        assert_eq!(optimizer.step, 1);
        for (a, b) in model.embedding.iter().zip(&before.embedding) {
            assert!((b - a - 0.01).abs() < 1e-5);
        }
    }

    #[test]
    fn test_adamw_decay_only_touches_output_weight() {
        let mut model = SkipGram::new(3, 2, 0).unwrap();
        let before = model.clone();
        let grads = SkipGramGradients::zeros_like(&model);
        let mut optimizer = AdamWOptimizer::new(&model);

        adamw_update(&mut model, &grads, &mut optimizer, 0.1, 0.5);

        assert_eq!(model.embedding, before.embedding);
        assert_eq!(model.output_bias, before.output_bias);
        for (a, b) in model.output_weight.iter().zip(&before.output_weight) {
            assert!((a - b * 0.95).abs() < 1e-6);
        }
    }

    #[test]
    fn test_adamw_parallel_path_matches_sequential() {
        // 40 * 30 = 1200 elements takes the parallel branch
        let mut large = SkipGram::new(40, 30, 1).unwrap();
        let mut reference = large.clone();
        let grads = unit_grads(&large);

        let mut opt = AdamWOptimizer::new(&large);
        adamw_update(&mut large, &grads, &mut opt, 0.01, 0.0);

        for p in reference.embedding.iter_mut() {
            *p -= 0.01 * 1.0 / (1.0 + 1e-8);
        }
        for (a, b) in large.embedding.iter().zip(&reference.embedding) {
            assert!((a - b).abs() < 1e-5);
        }
    }
}
