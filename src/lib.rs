//! Binomial noise image reconstruction objective
//!
//! A candidate parameter set drives a small stack of transforms that rebuilds
//! an image step by step, each step adding noise drawn from a binomial
//! distribution whose success probability decays over time. The crate scores
//! batches of candidates against a target image in parallel so an external
//! black-box optimizer can search for the parameters that reconstruct it best.

#![forbid(unsafe_code)]

/// Forward evaluation, loss, batch dispatch and the optimizer seam
pub mod algorithm;
/// Input/output operations, configuration and error handling
pub mod io;
/// Binomial coefficients, mixing probability and noise sampling
pub mod math;

pub use io::error::{BlackoutError, Result};
