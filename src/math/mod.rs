//! Mathematical building blocks for the binomial noise process

/// Memoized binomial coefficient table
pub mod binomial;
/// Exponential-decay mixing probability between two time markers
pub mod probability;
/// Inverse-CDF binomial sampling
pub mod sampling;
