//! Seam between the reconstruction objective and an external optimizer
//!
//! The optimizer is a black box: it proposes batches of candidates, asks a
//! [`CostEvaluator`] to fill in their costs, and reports its best candidate.

use crate::algorithm::parameters::ParameterSample;
use crate::io::configuration::DEFAULT_COST_THRESHOLD;
use crate::io::error::Result;
use tracing::debug;

/// Assigns a cost to every candidate in a batch
pub trait CostEvaluator {
    /// Write exactly one cost into each sample, returning once all are set
    ///
    /// # Errors
    ///
    /// Returns an error if any candidate cannot be evaluated
    fn evaluate_batch(&mut self, samples: &mut [ParameterSample]) -> Result<()>;
}

/// Gradient-free search over candidate parameter sets
pub trait Optimizer {
    /// Advance one generation and return the current best candidate
    ///
    /// # Errors
    ///
    /// Propagates failures from the cost evaluator
    fn iterate(&mut self, evaluator: &mut dyn CostEvaluator) -> Result<ParameterSample>;

    /// Iterate until the best cost changes by less than `threshold` between generations
    ///
    /// The first generation never stops the search on its own.
    ///
    /// # Errors
    ///
    /// Propagates failures from [`Optimizer::iterate`]
    fn optimize(
        &mut self,
        evaluator: &mut dyn CostEvaluator,
        threshold: f64,
    ) -> Result<ParameterSample> {
        let mut last: Option<f64> = None;
        let mut generation = 0_usize;
        loop {
            let best = self.iterate(evaluator)?;
            let cost = best.cost_or_infinity();
            generation += 1;
            debug!(generation, cost, "generation complete");

            if let Some(previous) = last
                && (previous - cost).abs() < threshold
            {
                return Ok(best);
            }
            last = Some(cost);
        }
    }

    /// [`Optimizer::optimize`] with the default stop threshold
    ///
    /// # Errors
    ///
    /// Propagates failures from [`Optimizer::iterate`]
    fn optimize_until_settled(
        &mut self,
        evaluator: &mut dyn CostEvaluator,
    ) -> Result<ParameterSample> {
        self.optimize(evaluator, DEFAULT_COST_THRESHOLD)
    }
}
