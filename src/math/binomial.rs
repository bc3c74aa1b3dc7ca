//! Memoized binomial coefficient table for trial counts up to 255
//!
//! The table is filled row by row with Pascal's recurrence, so every cell only
//! reads cells of the previous row that are already populated. Once built it is
//! shared by reference across evaluation workers and never written again.

use crate::io::configuration::{COEFFICIENT_TABLE_SIZE, MAX_TRIALS};
use crate::io::error::{BlackoutError, Result};
use ndarray::Array2;

/// A single memoized coefficient
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Coefficient {
    /// Value of C(n, k) once `valid` is set
    pub value: f64,
    /// Whether `value` has been computed
    pub valid: bool,
}

/// Write-once table of binomial coefficients indexed by (n, k)
#[derive(Clone, Debug, PartialEq)]
pub struct BinomialCache {
    table: Array2<Coefficient>,
}

impl Default for BinomialCache {
    fn default() -> Self {
        Self::new()
    }
}

impl BinomialCache {
    /// Create a fully precomputed table
    pub fn new() -> Self {
        let mut cache = Self::empty();
        cache.precompute();
        cache
    }

    /// Create a table with every cell unpopulated
    pub fn empty() -> Self {
        Self {
            table: Array2::from_elem(
                (COEFFICIENT_TABLE_SIZE, COEFFICIENT_TABLE_SIZE),
                Coefficient::default(),
            ),
        }
    }

    /// Populate every cell with n in increasing order and k in 0..=n
    ///
    /// Cells with k > n stay at zero and are marked valid. Running this on an
    /// already populated table leaves it unchanged.
    pub fn precompute(&mut self) {
        for n in 0..COEFFICIENT_TABLE_SIZE {
            for k in 0..COEFFICIENT_TABLE_SIZE {
                let value = if k > n {
                    0.0
                } else if k == 0 || k == n {
                    1.0
                } else {
                    self.populated(n - 1, k - 1) + self.populated(n - 1, k)
                };
                if let Some(cell) = self.table.get_mut([n, k]) {
                    *cell = Coefficient { value, valid: true };
                }
            }
        }
    }

    // Only called for cells of the previous row, which precompute has already filled
    fn populated(&self, n: usize, k: usize) -> f64 {
        self.table
            .get([n, k])
            .filter(|cell| cell.valid)
            .map_or(0.0, |cell| cell.value)
    }

    /// Look up C(n, k)
    ///
    /// Returns 0 for k > n and 1 for k = 0 or k = n.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `n` or `k` exceeds 255
    /// - The cell has not been populated by [`BinomialCache::precompute`]
    pub fn coefficient(&self, n: usize, k: usize) -> Result<f64> {
        if n > MAX_TRIALS || k > MAX_TRIALS {
            return Err(BlackoutError::CoefficientOutOfRange { n, k });
        }
        self.table
            .get([n, k])
            .filter(|cell| cell.valid)
            .map(|cell| cell.value)
            .ok_or(BlackoutError::TableNotPopulated { n, k })
    }

    /// Row of coefficients C(n, 0..=n) for a trial count that fits the table
    ///
    /// Used by the sampler's inner loop, where `n` is a `u8` and therefore always
    /// in range.
    pub fn row(&self, n: u8) -> impl Iterator<Item = f64> + '_ {
        let n = usize::from(n);
        self.table
            .row(n)
            .into_iter()
            .take(n + 1)
            .map(|cell| cell.value)
    }

    /// First cell, in (n, k) order, that has not been populated yet
    pub fn first_unpopulated(&self) -> Option<(usize, usize)> {
        self.table
            .indexed_iter()
            .find(|(_, cell)| !cell.valid)
            .map(|(index, _)| index)
    }

    /// Whether every cell has been populated
    pub fn is_complete(&self) -> bool {
        self.first_unpopulated().is_none()
    }
}
