//! Inverse-CDF sampling from the binomial noise distribution

use crate::io::error::Result;
use crate::math::binomial::BinomialCache;
use crate::math::probability::mixing_probability;
use rand::Rng;

/// What the sampler returns when the cumulative mass never exceeds the uniform draw
///
/// Rounding in the running pmf sum can leave it just below a draw close to 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExhaustedScan {
    /// Return 0, matching the historical behaviour of the program
    #[default]
    Zero,
    /// Return the trial count, the outcome the scan was about to reach
    TrialCount,
}

/// Draws binomial noise magnitudes using a shared coefficient table
#[derive(Clone, Copy, Debug)]
pub struct BinomialSampler<'a> {
    cache: &'a BinomialCache,
    fallback: ExhaustedScan,
}

impl<'a> BinomialSampler<'a> {
    /// Create a sampler reading from a precomputed table
    pub const fn new(cache: &'a BinomialCache, fallback: ExhaustedScan) -> Self {
        Self { cache, fallback }
    }

    /// Draw from Binomial(n, p) with p = `mixing_probability(t1, t2)`
    ///
    /// # Errors
    ///
    /// Returns an error if the time markers are rejected by
    /// [`mixing_probability`]
    pub fn sample<R: Rng>(
        &self,
        rng: &mut R,
        n: u8,
        t1: f64,
        t2: f64,
    ) -> Result<u8> {
        let p = mixing_probability(t1, t2)?;
        Ok(self.sample_with_probability(rng, n, p))
    }

    /// Draw from Binomial(n, p) for a probability computed once per step
    ///
    /// Walks k = 0..=n accumulating C(n,k) p^k (1-p)^(n-k) and returns the
    /// first k whose running sum exceeds a uniform draw from `rng`.
    pub fn sample_with_probability<R: Rng>(&self, rng: &mut R, n: u8, p: f64) -> u8 {
        let threshold = rng.random::<f64>();
        let trials = i32::from(n);
        let mut sum = 0.0;

        for (k, coefficient) in (0..=n).zip(self.cache.row(n)) {
            let successes = i32::from(k);
            sum += coefficient * p.powi(successes) * (1.0 - p).powi(trials - successes);
            if sum > threshold {
                return k;
            }
        }

        match self.fallback {
            ExhaustedScan::Zero => 0,
            ExhaustedScan::TrialCount => n,
        }
    }

    /// Fallback policy in effect
    pub const fn fallback(&self) -> ExhaustedScan {
        self.fallback
    }
}
