//! Target image and quadratic reconstruction loss

use crate::algorithm::forward::{EvaluatorConfig, PixelBuffer};
use crate::io::error::{BlackoutError, Result};

/// Immutable target laid out like an evaluator buffer, feature slots zeroed
#[derive(Clone, Debug, PartialEq)]
pub struct TargetImage {
    pixels: PixelBuffer,
    image_area: usize,
}

impl TargetImage {
    /// Pad grayscale pixel values to the evaluator's buffer layout
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pixel count differs from the configured image area
    /// - Any value lies outside [0, 255] or is not finite
    pub fn from_pixels(pixels: &[f64], config: &EvaluatorConfig) -> Result<Self> {
        if pixels.len() != config.image_area {
            return Err(BlackoutError::InvalidTarget {
                reason: format!(
                    "expected {} pixels, found {}",
                    config.image_area,
                    pixels.len()
                ),
            });
        }
        if let Some(value) = pixels
            .iter()
            .find(|value| !(0.0..=255.0).contains(*value))
        {
            return Err(BlackoutError::InvalidTarget {
                reason: format!("pixel value {value} is outside [0, 255]"),
            });
        }

        let mut buffer = PixelBuffer::zeros(config.buffer_len());
        buffer
            .iter_mut()
            .zip(pixels)
            .for_each(|(slot, value)| *slot = *value);

        Ok(Self {
            pixels: buffer,
            image_area: config.image_area,
        })
    }

    /// Full buffer including the zeroed feature slots
    pub const fn buffer(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// Pixel values of the image area only
    pub fn pixels(&self) -> &[f64] {
        self.pixels
            .as_slice()
            .and_then(|all| all.get(..self.image_area))
            .unwrap_or_default()
    }

    /// Number of pixels in the image area
    pub const fn image_area(&self) -> usize {
        self.image_area
    }
}

/// Sum of squared differences between a reconstruction and the target
///
/// Feature slots are excluded: the target stores them as zero and the
/// reconstruction's slots are zeroed before comparing.
///
/// # Errors
///
/// Returns an error if the buffers have different lengths
pub fn quadratic_loss(target: &TargetImage, output: &PixelBuffer) -> Result<f64> {
    let expected = target.buffer().len();
    if output.len() != expected {
        return Err(BlackoutError::ShapeMismatch {
            what: "reconstruction buffer",
            expected: (expected, 1),
            found: (output.len(), 1),
        });
    }

    Ok(target
        .buffer()
        .iter()
        .zip(output.iter())
        .take(target.image_area())
        .map(|(expected, actual)| (expected - actual).powi(2))
        .sum())
}

/// Per-pixel signed difference `target - output` over the image area
///
/// # Errors
///
/// Returns an error if the buffers have different lengths
pub fn difference(target: &TargetImage, output: &PixelBuffer) -> Result<Vec<f64>> {
    let expected = target.buffer().len();
    if output.len() != expected {
        return Err(BlackoutError::ShapeMismatch {
            what: "reconstruction buffer",
            expected: (expected, 1),
            found: (output.len(), 1),
        });
    }

    Ok(target
        .pixels()
        .iter()
        .zip(output.iter())
        .map(|(expected, actual)| expected - actual)
        .collect())
}
