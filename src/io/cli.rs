//! Command-line interface evaluating one generation of candidates against a target image

use crate::algorithm::dispatch::{BatchObjective, Dispatcher};
use crate::algorithm::forward::{EvaluatorConfig, ForwardEvaluator, default_layers};
use crate::algorithm::loss::{TargetImage, difference};
use crate::algorithm::optimizer::CostEvaluator;
use crate::algorithm::parameters::{ParameterSample, best_candidate};
use crate::io::configuration::{
    DEFAULT_CANDIDATES, DEFAULT_IMAGE_SIZE, DEFAULT_LAYER_COUNT, DEFAULT_NOISE_STEPS,
    DEFAULT_PARAMETER_SPREAD, DEFAULT_SEED, DIFF_SUFFIX, NOISE_PREVIEW_DRAWS,
    NOISE_PREVIEW_TIMES, NOISE_PREVIEW_TRIALS, RECONSTRUCTION_SUFFIX, REPLAY_SEED, TARGET_SUFFIX,
};
use crate::io::error::{Result, computation_error, invalid_parameter};
use crate::io::image::{export_grayscale, grayscale_pixels, load_target, save_png};
use crate::io::progress::{candidate_bar, finish_bar};
use crate::math::binomial::BinomialCache;
use crate::math::sampling::{BinomialSampler, ExhaustedScan};
use clap::{Parser, ValueEnum};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Sampler behaviour when the cumulative scan never passes the uniform draw
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FallbackArg {
    /// Return zero
    Zero,
    /// Return the trial count
    TrialCount,
}

impl From<FallbackArg> for ExhaustedScan {
    fn from(arg: FallbackArg) -> Self {
        match arg {
            FallbackArg::Zero => Self::Zero,
            FallbackArg::TrialCount => Self::TrialCount,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "blackout")]
#[command(
    author,
    version,
    about = "Score candidate transforms that rebuild an image through binomial noise"
)]
/// Command-line arguments for the evaluation probe
// Flags mirror independent evaluator switches
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input image to reconstruct
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Random seed for candidates and noise
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Number of noisy transform steps per evaluation
    #[arg(short = 'n', long, default_value_t = DEFAULT_NOISE_STEPS)]
    pub steps: usize,

    /// Edge length the target is resized to
    #[arg(short = 'S', long, default_value_t = DEFAULT_IMAGE_SIZE)]
    pub size: usize,

    /// Candidates evaluated in the generation
    #[arg(short, long, default_value_t = DEFAULT_CANDIDATES)]
    pub candidates: usize,

    /// Concurrent evaluations (defaults to available parallelism)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Number of transform layers
    #[arg(short, long, default_value_t = DEFAULT_LAYER_COUNT)]
    pub layers: usize,

    /// Apply the sigmoid to the output layer as well
    #[arg(long)]
    pub squash_output: bool,

    /// Drop the normalized time slot from the pixel buffer
    #[arg(long)]
    pub no_time_feature: bool,

    /// Sampler result when the cumulative scan is exhausted
    #[arg(long, value_enum, default_value_t = FallbackArg::Zero)]
    pub fallback: FallbackArg,

    /// Log a handful of noise draws before evaluating
    #[arg(long)]
    pub noise_preview: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Evaluator configuration described by the flags
    pub fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig::new(self.size * self.size, self.steps)
            .with_layers(default_layers(self.layers, self.squash_output))
            .with_time_feature(!self.no_time_feature)
            .with_fallback(self.fallback.into())
    }
}

/// Install the tracing subscriber, honouring `RUST_LOG` when set
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .map_err(|error| computation_error("tracing setup", &error))
}

/// Result of one evaluation probe
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeOutcome {
    /// Cost of every candidate, in candidate order
    pub costs: Vec<f64>,
    /// Index of the lowest-cost candidate
    pub best_index: usize,
    /// Cost of the lowest-cost candidate
    pub best_cost: f64,
    /// Sum of absolute pixel differences of the replayed best candidate
    pub diff_magnitude: f64,
    /// Where the reconstruction was written
    pub reconstruction_path: PathBuf,
}

/// Draw preview noise magnitudes with the configured fallback
///
/// # Errors
///
/// Returns an error if the preview time markers are rejected
pub fn preview_noise(
    cache: &BinomialCache,
    fallback: ExhaustedScan,
    seed: u64,
) -> Result<Vec<u8>> {
    let sampler = BinomialSampler::new(cache, fallback);
    let mut rng = StdRng::seed_from_u64(seed);
    let (t1, t2) = NOISE_PREVIEW_TIMES;
    (0..NOISE_PREVIEW_DRAWS)
        .map(|_| sampler.sample(&mut rng, NOISE_PREVIEW_TRIALS, t1, t2))
        .collect()
}

/// Loads the target, evaluates a generation of random candidates and exports the best
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a runner for the given CLI arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the probe end to end
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A size, step, layer or candidate count is zero
    /// - The target cannot be loaded or outputs cannot be written
    /// - Any candidate fails to evaluate
    pub fn run(&self) -> Result<ProbeOutcome> {
        self.validate()?;
        let config = self.cli.evaluator_config();
        let (rows, cols) = config.layer_shape();

        let cache = BinomialCache::new();
        debug!("binomial coefficient table precomputed");

        if self.cli.noise_preview {
            let draws = preview_noise(&cache, config.fallback, self.cli.seed)?;
            info!(?draws, "noise preview");
        }

        let gray = load_target(&self.cli.target, self.cli.size)?;
        save_png(&gray, output_path(&self.cli.target, TARGET_SUFFIX))?;
        let target = TargetImage::from_pixels(&grayscale_pixels(&gray), &config)?;

        let evaluator = ForwardEvaluator::new(&cache, config)?;
        let dispatcher = match self.cli.workers {
            Some(workers) => Dispatcher::new(workers)?,
            None => Dispatcher::with_available_parallelism()?,
        };
        let bar = candidate_bar(self.cli.candidates, self.cli.should_show_progress());
        let dispatcher = dispatcher.with_progress(bar.clone());
        info!(
            image = %self.cli.target.display(),
            candidates = self.cli.candidates,
            workers = dispatcher.workers(),
            steps = self.cli.steps,
            "evaluating generation"
        );

        let mut rng = StdRng::seed_from_u64(self.cli.seed);
        let mut samples: Vec<ParameterSample> = (0..self.cli.candidates)
            .map(|_| {
                ParameterSample::random(&mut rng, self.cli.layers, rows, cols, DEFAULT_PARAMETER_SPREAD)
            })
            .collect();

        let mut objective = BatchObjective::new(dispatcher, evaluator, target, rng.random());
        objective.evaluate_batch(&mut samples)?;

        let (best_index, best_cost) = best_candidate(&samples)
            .ok_or_else(|| computation_error("probe", &"no candidate received a cost"))?;
        finish_bar(&bar, Some(best_cost));

        let best = samples
            .get(best_index)
            .ok_or_else(|| computation_error("probe", &"best candidate index out of range"))?;
        let reconstruction = objective.evaluator().evaluate(best, REPLAY_SEED)?;
        let diff = difference(objective.target(), &reconstruction)?;
        let diff_magnitude: f64 = diff.iter().map(|value| value.abs()).sum();

        let reconstruction_path = output_path(&self.cli.target, RECONSTRUCTION_SUFFIX);
        let pixels = reconstruction
            .as_slice()
            .and_then(|all| all.get(..objective.target().image_area()))
            .ok_or_else(|| computation_error("probe", &"reconstruction buffer is not contiguous"))?;
        export_grayscale(pixels, self.cli.size, &reconstruction_path)?;

        let absolute: Vec<f64> = diff.iter().map(|value| value.abs()).collect();
        export_grayscale(&absolute, self.cli.size, output_path(&self.cli.target, DIFF_SUFFIX))?;

        info!(best_index, best_cost, diff_magnitude, "generation complete");

        Ok(ProbeOutcome {
            costs: samples.iter().map(ParameterSample::cost_or_infinity).collect(),
            best_index,
            best_cost,
            diff_magnitude,
            reconstruction_path,
        })
    }

    fn validate(&self) -> Result<()> {
        let counts = [
            ("size", self.cli.size),
            ("steps", self.cli.steps),
            ("layers", self.cli.layers),
            ("candidates", self.cli.candidates),
        ];
        for (parameter, value) in counts {
            if value == 0 {
                return Err(invalid_parameter(parameter, &value, &"must be positive"));
            }
        }
        Ok(())
    }
}

/// Output path next to the input, `<stem><suffix>.png`
pub fn output_path(input_path: &Path, suffix: &str) -> PathBuf {
    let stem = input_path.file_stem().unwrap_or_default();
    let output_name = format!("{}{suffix}.png", stem.to_string_lossy());

    if let Some(parent) = input_path.parent() {
        parent.join(output_name)
    } else {
        PathBuf::from(output_name)
    }
}
