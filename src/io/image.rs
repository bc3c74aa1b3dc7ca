//! Target loading and grayscale PNG export

use crate::io::configuration::PIXEL_MAX;
use crate::io::error::{BlackoutError, Result, invalid_parameter};
use image::imageops::FilterType;
use image::{GrayImage, Luma};
use std::path::Path;

/// Load an image, resize it to `size`x`size` with nearest-neighbour sampling,
/// and reduce it to grayscale by averaging the RGB channels
///
/// # Errors
///
/// Returns an error if:
/// - `size` is zero or doesn't fit in `u32`
/// - The file cannot be opened or decoded
pub fn load_target<P: AsRef<Path>>(path: P, size: usize) -> Result<GrayImage> {
    let edge = u32::try_from(size)
        .ok()
        .filter(|edge| *edge > 0)
        .ok_or_else(|| invalid_parameter("size", &size, &"must be between 1 and u32::MAX"))?;

    let path = path.as_ref();
    let decoded = image::open(path).map_err(|source| BlackoutError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    let rgb = decoded
        .resize_exact(edge, edge, FilterType::Nearest)
        .to_rgb8();

    let mut gray = GrayImage::new(edge, edge);
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let mean = (f64::from(r) + f64::from(g) + f64::from(b)) / 3.0;
        gray.put_pixel(x, y, Luma([mean.round() as u8]));
    }
    Ok(gray)
}

/// Row-major pixel values of a grayscale image in [0, 255]
pub fn grayscale_pixels(image: &GrayImage) -> Vec<f64> {
    image.pixels().map(|pixel| f64::from(pixel.0[0])).collect()
}

/// Build a grayscale image from row-major values, clamping them to [0, 255]
///
/// # Errors
///
/// Returns an error if the value count doesn't match `width * height`
pub fn pixels_to_image(pixels: &[f64], width: u32, height: u32) -> Result<GrayImage> {
    let bytes: Vec<u8> = pixels
        .iter()
        .map(|value| value.clamp(0.0, PIXEL_MAX).round() as u8)
        .collect();
    let count = bytes.len();
    GrayImage::from_raw(width, height, bytes).ok_or_else(|| BlackoutError::InvalidTarget {
        reason: format!("{count} pixels cannot fill a {width}x{height} image"),
    })
}

/// Save a grayscale image as PNG, creating the parent directory if needed
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be encoded or written
pub fn save_png<P: AsRef<Path>>(image: &GrayImage, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| BlackoutError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source,
        })?;
    }

    image.save(path).map_err(|source| BlackoutError::ImageExport {
        path: path.to_path_buf(),
        source,
    })
}

/// Save row-major values as a square grayscale PNG of edge `size`
///
/// # Errors
///
/// Returns an error if the values don't fill the image or the file cannot be written
pub fn export_grayscale<P: AsRef<Path>>(pixels: &[f64], size: usize, path: P) -> Result<()> {
    let edge = u32::try_from(size)
        .ok()
        .ok_or_else(|| invalid_parameter("size", &size, &"must fit in u32"))?;
    save_png(&pixels_to_image(pixels, edge, edge)?, path)
}
