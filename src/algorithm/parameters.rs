//! Candidate parameter sets proposed by an optimizer
//!
//! Each transform layer is described by three matrices. The effective weight
//! matrix combines them as `base + scale ⊙ gate`, so the optimizer can move
//! weights both additively and multiplicatively.

use crate::io::error::{BlackoutError, Result};
use ndarray::Array2;
use rand::Rng;

/// The three matrices that define one transform layer
#[derive(Clone, Debug, PartialEq)]
pub struct LayerParameters {
    /// Additive weight term
    pub base: Array2<f64>,
    /// Left factor of the bilinear term
    pub scale: Array2<f64>,
    /// Right factor of the bilinear term
    pub gate: Array2<f64>,
}

impl LayerParameters {
    /// Create a layer of zero matrices with `rows` outputs and `cols` inputs
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            base: Array2::zeros((rows, cols)),
            scale: Array2::zeros((rows, cols)),
            gate: Array2::zeros((rows, cols)),
        }
    }

    /// Create a layer with every entry drawn uniformly from `[-spread, spread)`
    pub fn random<R: Rng>(rng: &mut R, rows: usize, cols: usize, spread: f64) -> Self {
        let mut draw = || {
            Array2::from_shape_fn((rows, cols), |_| {
                rng.random::<f64>().mul_add(2.0 * spread, -spread)
            })
        };
        let base = draw();
        let scale = draw();
        let gate = draw();
        Self { base, scale, gate }
    }

    /// Effective weight matrix `base + scale ⊙ gate`
    ///
    /// # Errors
    ///
    /// Returns an error if the three matrices don't share one shape
    pub fn weights(&self) -> Result<Array2<f64>> {
        let expected = self.base.dim();
        for (what, matrix) in [("scale matrix", &self.scale), ("gate matrix", &self.gate)] {
            if matrix.dim() != expected {
                return Err(BlackoutError::ShapeMismatch {
                    what,
                    expected,
                    found: matrix.dim(),
                });
            }
        }
        Ok(&self.base + &(&self.scale * &self.gate))
    }

    /// Shape shared by the layer's matrices as (outputs, inputs)
    pub fn dim(&self) -> (usize, usize) {
        self.base.dim()
    }
}

/// One candidate: an ordered list of layers plus the cost assigned to it
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSample {
    /// Layer parameters in evaluation order
    pub layers: Vec<LayerParameters>,
    /// Cost written by the evaluator, `None` until evaluated
    pub cost: Option<f64>,
}

impl ParameterSample {
    /// Wrap a list of layers as an unevaluated candidate
    pub const fn new(layers: Vec<LayerParameters>) -> Self {
        Self { layers, cost: None }
    }

    /// Create a candidate of `layer_count` randomly initialised layers
    pub fn random<R: Rng>(
        rng: &mut R,
        layer_count: usize,
        rows: usize,
        cols: usize,
        spread: f64,
    ) -> Self {
        let layers = (0..layer_count)
            .map(|_| LayerParameters::random(rng, rows, cols, spread))
            .collect();
        Self::new(layers)
    }

    /// Cost, or positive infinity if the candidate hasn't been evaluated
    pub fn cost_or_infinity(&self) -> f64 {
        self.cost.unwrap_or(f64::INFINITY)
    }
}

/// Index and cost of the lowest-cost evaluated candidate in a batch
pub fn best_candidate(samples: &[ParameterSample]) -> Option<(usize, f64)> {
    samples
        .iter()
        .enumerate()
        .filter_map(|(index, sample)| sample.cost.map(|cost| (index, cost)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}
