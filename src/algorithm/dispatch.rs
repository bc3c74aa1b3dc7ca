//! Bounded-concurrency batch evaluation
//!
//! A fixed pool of workers evaluates every candidate of a batch and writes
//! each candidate's cost in place. Noise seeds are drawn from the caller's
//! random source in candidate order before anything is spawned, so the costs
//! don't depend on scheduling or on the number of workers.

use crate::algorithm::forward::ForwardEvaluator;
use crate::algorithm::loss::{TargetImage, quadratic_loss};
use crate::algorithm::optimizer::CostEvaluator;
use crate::algorithm::parameters::{ParameterSample, best_candidate};
use crate::io::error::{BlackoutError, Result, evaluation_error, invalid_parameter};
use indicatif::ProgressBar;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Summary of one dispatched batch
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatchReport {
    /// Number of candidates evaluated
    pub evaluated: usize,
    /// Worker count of the pool that ran the batch
    pub workers: usize,
    /// Index and cost of the best candidate, if the batch was non-empty
    pub best: Option<(usize, f64)>,
    /// Wall-clock time from first dispatch to the completion barrier
    pub elapsed: Duration,
}

/// Evaluates batches of candidates on a fixed-size worker pool
pub struct Dispatcher {
    pool: ThreadPool,
    workers: usize,
    progress: Option<ProgressBar>,
}

impl Dispatcher {
    /// Create a dispatcher running at most `workers` evaluations at once
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `workers` is zero
    /// - The thread pool cannot be started
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(invalid_parameter(
                "workers",
                &workers,
                &"at least one worker is required",
            ));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("blackout-worker-{index}"))
            .build()
            .map_err(|source| BlackoutError::WorkerPool { workers, source })?;

        Ok(Self {
            pool,
            workers,
            progress: None,
        })
    }

    /// Create a dispatcher with one worker per available processing unit
    ///
    /// # Errors
    ///
    /// Returns an error if the thread pool cannot be started
    pub fn with_available_parallelism() -> Result<Self> {
        let workers = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self::new(workers)
    }

    /// Advance a progress bar as candidates complete
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Maximum number of concurrent evaluations
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Evaluate every candidate and write its cost, returning after all have finished
    ///
    /// Each candidate's cost is reset before dispatch and set exactly once by
    /// the task that evaluates it. One seed per candidate is drawn from `rng`
    /// in index order before the first task starts.
    ///
    /// # Errors
    ///
    /// Returns the failure of the lowest-indexed candidate that could not be
    /// evaluated. Every other candidate still runs to completion.
    pub fn dispatch<R: Rng>(
        &self,
        evaluator: &ForwardEvaluator<'_>,
        target: &TargetImage,
        samples: &mut [ParameterSample],
        rng: &mut R,
    ) -> Result<BatchReport> {
        let start = Instant::now();
        let seeds: Vec<u64> = samples.iter().map(|_| rng.random()).collect();
        let mut failures: Vec<Option<BlackoutError>> =
            std::iter::repeat_with(|| None).take(samples.len()).collect();

        if let Some(bar) = &self.progress {
            bar.set_length(samples.len() as u64);
            bar.set_position(0);
        }
        let progress = self.progress.as_ref();

        self.pool.scope(|scope| {
            for (index, ((sample, seed), failure)) in samples
                .iter_mut()
                .zip(seeds)
                .zip(failures.iter_mut())
                .enumerate()
            {
                sample.cost = None;
                scope.spawn(move |_| {
                    match evaluate_candidate(evaluator, target, sample, seed) {
                        Ok(cost) => {
                            debug!(candidate = index, seed, cost, "candidate evaluated");
                            sample.cost = Some(cost);
                        }
                        Err(error) => {
                            warn!(candidate = index, %error, "candidate evaluation failed");
                            *failure = Some(evaluation_error(index, error));
                        }
                    }
                    if let Some(bar) = progress {
                        bar.inc(1);
                    }
                });
            }
        });

        if let Some(error) = failures.into_iter().flatten().next() {
            return Err(error);
        }

        let report = BatchReport {
            evaluated: samples.len(),
            workers: self.workers,
            best: best_candidate(samples),
            elapsed: start.elapsed(),
        };
        info!(
            evaluated = report.evaluated,
            workers = report.workers,
            best_cost = report.best.map(|(_, cost)| cost),
            elapsed_secs = report.elapsed.as_secs_f64(),
            "batch evaluated"
        );
        Ok(report)
    }
}

/// Forward evaluation followed by quadratic loss against the target
///
/// # Errors
///
/// Returns an error if the candidate doesn't fit the evaluator layout
pub fn evaluate_candidate(
    evaluator: &ForwardEvaluator<'_>,
    target: &TargetImage,
    sample: &ParameterSample,
    seed: u64,
) -> Result<f64> {
    let reconstruction = evaluator.evaluate(sample, seed)?;
    quadratic_loss(target, &reconstruction)
}

/// Cost callback handed to an optimizer
///
/// Binds a dispatcher, an evaluator and a target to a single top-level random
/// source, so a fixed seed reproduces the same sequence of batch costs.
pub struct BatchObjective<'a> {
    dispatcher: Dispatcher,
    evaluator: ForwardEvaluator<'a>,
    target: TargetImage,
    rng: StdRng,
    last_report: Option<BatchReport>,
}

impl<'a> BatchObjective<'a> {
    /// Create an objective seeded with `seed`
    pub fn new(
        dispatcher: Dispatcher,
        evaluator: ForwardEvaluator<'a>,
        target: TargetImage,
        seed: u64,
    ) -> Self {
        Self {
            dispatcher,
            evaluator,
            target,
            rng: StdRng::seed_from_u64(seed),
            last_report: None,
        }
    }

    /// Evaluator used for every candidate
    pub const fn evaluator(&self) -> &ForwardEvaluator<'a> {
        &self.evaluator
    }

    /// Target every candidate is compared against
    pub const fn target(&self) -> &TargetImage {
        &self.target
    }

    /// Report of the most recent batch
    pub const fn last_report(&self) -> Option<BatchReport> {
        self.last_report
    }
}

impl CostEvaluator for BatchObjective<'_> {
    fn evaluate_batch(&mut self, samples: &mut [ParameterSample]) -> Result<()> {
        let report =
            self.dispatcher
                .dispatch(&self.evaluator, &self.target, samples, &mut self.rng)?;
        self.last_report = Some(report);
        Ok(())
    }
}
