//! Multi-step noisy forward evaluation of a candidate parameter set
//!
//! A pixel buffer holds the image area followed by the feature slots: an
//! optional time slot and a bias slot fixed at 1. Every step runs the buffer
//! through the configured layers, scales the output to pixel range, and adds
//! binomial noise bounded so that no pixel ever exceeds 255.

use crate::algorithm::parameters::ParameterSample;
use crate::io::configuration::{BIAS_VALUE, DEFAULT_LAYER_COUNT, PIXEL_MAX};
use crate::io::error::{BlackoutError, Result, invalid_parameter};
use crate::math::binomial::BinomialCache;
use crate::math::probability::mixing_probability;
use crate::math::sampling::{BinomialSampler, ExhaustedScan};
use ndarray::{Array1, Array2};
use rand::{SeedableRng, rngs::StdRng};

/// Flat buffer of pixel values followed by feature slots
pub type PixelBuffer = Array1<f64>;

/// Output transform applied after a layer's weight product
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    /// Logistic sigmoid squashing into (0, 1)
    Sigmoid,
    /// Identity, leaving the linear output untouched
    Linear,
}

impl Activation {
    /// Apply the activation to every element in place
    pub fn apply(self, values: &mut Array1<f64>) {
        if self == Self::Sigmoid {
            values.mapv_inplace(sigmoid);
        }
    }
}

/// Logistic sigmoid
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Shape of the noise process and the transform stack
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluatorConfig {
    /// Number of pixels in the image area
    pub image_area: usize,
    /// Number of noisy transform steps
    pub noise_steps: usize,
    /// Whether the buffer carries a normalized time slot
    pub time_feature: bool,
    /// Activation of each layer, in evaluation order
    pub layers: Vec<Activation>,
    /// Sampler behaviour when the cumulative scan is exhausted
    pub fallback: ExhaustedScan,
}

impl EvaluatorConfig {
    /// Default stack: sigmoid hidden layers with a linear output layer and a time slot
    pub fn new(image_area: usize, noise_steps: usize) -> Self {
        Self {
            image_area,
            noise_steps,
            time_feature: true,
            layers: default_layers(DEFAULT_LAYER_COUNT, false),
            fallback: ExhaustedScan::default(),
        }
    }

    /// Replace the layer activations
    #[must_use]
    pub fn with_layers(mut self, layers: Vec<Activation>) -> Self {
        self.layers = layers;
        self
    }

    /// Enable or disable the time slot
    #[must_use]
    pub const fn with_time_feature(mut self, time_feature: bool) -> Self {
        self.time_feature = time_feature;
        self
    }

    /// Choose the sampler fallback policy
    #[must_use]
    pub const fn with_fallback(mut self, fallback: ExhaustedScan) -> Self {
        self.fallback = fallback;
        self
    }

    /// Number of feature slots after the image area
    pub const fn slot_count(&self) -> usize {
        if self.time_feature { 2 } else { 1 }
    }

    /// Total buffer length including feature slots
    pub const fn buffer_len(&self) -> usize {
        self.image_area + self.slot_count()
    }

    /// Index of the time slot, if present
    pub const fn time_slot(&self) -> Option<usize> {
        if self.time_feature {
            Some(self.image_area)
        } else {
            None
        }
    }

    /// Index of the bias slot
    pub const fn bias_slot(&self) -> usize {
        self.buffer_len() - 1
    }

    /// Matrix shape every layer must have, as (outputs, inputs)
    pub const fn layer_shape(&self) -> (usize, usize) {
        (self.image_area, self.buffer_len())
    }

    /// Check that the configuration describes a runnable process
    ///
    /// # Errors
    ///
    /// Returns an error if the image area, step count or layer list is empty
    pub fn validate(&self) -> Result<()> {
        if self.image_area == 0 {
            return Err(invalid_parameter(
                "image_area",
                &self.image_area,
                &"must be positive",
            ));
        }
        if self.noise_steps == 0 {
            return Err(invalid_parameter(
                "noise_steps",
                &self.noise_steps,
                &"must be positive",
            ));
        }
        if self.layers.is_empty() {
            return Err(invalid_parameter(
                "layers",
                &0,
                &"at least one layer is required",
            ));
        }
        Ok(())
    }

    /// Write the time and bias sentinels into a buffer
    pub fn stamp_slots(&self, buffer: &mut PixelBuffer, t: f64) {
        if let Some(slot) = self.time_slot().and_then(|index| buffer.get_mut(index)) {
            *slot = t;
        }
        if let Some(slot) = buffer.get_mut(self.bias_slot()) {
            *slot = BIAS_VALUE;
        }
    }

    /// Zero the feature slots so only pixels take part in comparisons
    pub fn clear_slots(&self, buffer: &mut PixelBuffer) {
        buffer
            .iter_mut()
            .skip(self.image_area)
            .for_each(|slot| *slot = 0.0);
    }
}

/// Sigmoid on every layer except the last, which is linear unless `squash_output`
pub fn default_layers(count: usize, squash_output: bool) -> Vec<Activation> {
    (0..count)
        .map(|index| {
            if index + 1 == count && !squash_output {
                Activation::Linear
            } else {
                Activation::Sigmoid
            }
        })
        .collect()
}

/// Runs the noisy transform process for one candidate at a time
///
/// Holds only shared read-only state, so one evaluator can serve every worker
/// of a batch concurrently.
#[derive(Clone, Debug)]
pub struct ForwardEvaluator<'a> {
    cache: &'a BinomialCache,
    config: EvaluatorConfig,
}

impl<'a> ForwardEvaluator<'a> {
    /// Create an evaluator over a precomputed coefficient table
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration fails [`EvaluatorConfig::validate`]
    /// - The coefficient table has unpopulated cells
    pub fn new(cache: &'a BinomialCache, config: EvaluatorConfig) -> Result<Self> {
        config.validate()?;
        if let Some((n, k)) = cache.first_unpopulated() {
            return Err(BlackoutError::TableNotPopulated { n, k });
        }
        Ok(Self { cache, config })
    }

    /// Configuration in effect
    pub const fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Effective weight matrices of a candidate, checked against the layout
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The candidate has a different number of layers than configured
    /// - Any matrix shape differs from [`EvaluatorConfig::layer_shape`]
    pub fn layer_weights(&self, sample: &ParameterSample) -> Result<Vec<Array2<f64>>> {
        if sample.layers.len() != self.config.layers.len() {
            return Err(invalid_parameter(
                "layers",
                &sample.layers.len(),
                &format!("expected {} layers", self.config.layers.len()),
            ));
        }

        let expected = self.config.layer_shape();
        sample
            .layers
            .iter()
            .map(|layer| {
                if layer.dim() != expected {
                    return Err(BlackoutError::ShapeMismatch {
                        what: "layer weights",
                        expected,
                        found: layer.dim(),
                    });
                }
                layer.weights()
            })
            .collect()
    }

    /// Reconstruct an image from a candidate with a fixed noise seed
    ///
    /// The same candidate and seed always produce the same buffer. Feature
    /// slots of the returned buffer are zeroed.
    ///
    /// # Errors
    ///
    /// Returns an error if the candidate doesn't match the configured layout
    pub fn evaluate(&self, sample: &ParameterSample, seed: u64) -> Result<PixelBuffer> {
        let weights = self.layer_weights(sample)?;
        let sampler = BinomialSampler::new(self.cache, self.config.fallback);
        let mut rng = StdRng::seed_from_u64(seed);
        let steps = self.config.noise_steps as f64;
        let area = self.config.image_area;

        let mut accumulator = PixelBuffer::zeros(self.config.buffer_len());

        for step in 0..self.config.noise_steps {
            let t = step as f64 / steps;
            let t_next = (step + 1) as f64 / steps;
            self.config.stamp_slots(&mut accumulator, t);

            let output = self.transform(&weights, &accumulator, t);
            let p = mixing_probability(t, t_next)?;

            for (pixel, value) in accumulator.iter_mut().take(area).zip(output.iter())
            {
                let headroom = PIXEL_MAX - *pixel;
                let scaled = value * PIXEL_MAX;
                let bounded = if scaled < 0.0 {
                    0.0
                } else if scaled > headroom {
                    headroom
                } else {
                    scaled
                };
                let trials = (bounded + 0.5) as u8;
                *pixel += f64::from(sampler.sample_with_probability(&mut rng, trials, p));
            }
        }

        self.config.clear_slots(&mut accumulator);
        Ok(accumulator)
    }

    // Runs the layer stack; every layer after the first reads a fresh hidden
    // buffer holding the previous output with the feature slots re-stamped.
    fn transform(&self, weights: &[Array2<f64>], input: &PixelBuffer, t: f64) -> Array1<f64> {
        let mut output = Array1::zeros(self.config.image_area);

        for (index, (matrix, activation)) in weights.iter().zip(&self.config.layers).enumerate() {
            output = if index == 0 {
                matrix.dot(input)
            } else {
                let mut hidden = PixelBuffer::zeros(self.config.buffer_len());
                hidden
                    .iter_mut()
                    .zip(output.iter())
                    .for_each(|(slot, value)| *slot = *value);
                self.config.stamp_slots(&mut hidden, t);
                matrix.dot(&hidden)
            };
            activation.apply(&mut output);
        }

        output
    }
}
