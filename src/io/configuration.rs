//! Reconstruction constants and runtime configuration defaults

// Coefficient table bounds
/// Number of rows and columns in the binomial coefficient table
pub const COEFFICIENT_TABLE_SIZE: usize = 256;
/// Largest trial count the coefficient table covers
pub const MAX_TRIALS: usize = COEFFICIENT_TABLE_SIZE - 1;

/// Brightest representable pixel value
pub const PIXEL_MAX: f64 = 255.0;

// Buffer layout sentinels
/// Value stamped into the bias slot of every pixel buffer
pub const BIAS_VALUE: f64 = 1.0;

// Default values for configurable parameters
/// Fixed seed for reproducible evaluation
pub const DEFAULT_SEED: u64 = 1;

/// Seed used when re-running the best candidate for export
pub const REPLAY_SEED: u64 = 1;

/// Default number of noisy transform steps per forward evaluation
pub const DEFAULT_NOISE_STEPS: usize = 64;

/// Default target edge length in pixels
pub const DEFAULT_IMAGE_SIZE: usize = 16;

/// Default number of candidates per generation
pub const DEFAULT_CANDIDATES: usize = 8;

/// Default number of transform layers
pub const DEFAULT_LAYER_COUNT: usize = 3;

/// Half-width of the uniform range used for random parameter initialisation
pub const DEFAULT_PARAMETER_SPREAD: f64 = 0.1;

/// Stop threshold on the change in best cost between generations
pub const DEFAULT_COST_THRESHOLD: f64 = 1e-6;

// Noise preview settings
/// Number of preview draws logged by `--noise-preview`
pub const NOISE_PREVIEW_DRAWS: usize = 16;
/// Trial count used for preview draws
pub const NOISE_PREVIEW_TRIALS: u8 = 128;
/// Time markers used for preview draws
pub const NOISE_PREVIEW_TIMES: (f64, f64) = (0.1, 0.5);

// Output settings
/// Suffix added to the resized target image
pub const TARGET_SUFFIX: &str = "_target";
/// Suffix added to the reconstructed image
pub const RECONSTRUCTION_SUFFIX: &str = "_reconstruction";
/// Suffix added to the difference image
pub const DIFF_SUFFIX: &str = "_diff";

/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;
