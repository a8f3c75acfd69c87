//! Bilateral filter for interleaved 2D images.
//!
//! ## Supported Formats
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | Grayscale | (H, W, 1) | u8 / f32 | Single channel |
//! | RGB | (H, W, 3) | u8 / f32 | Color distance over R, G, B |
//! | RGBA | (H, W, 4) | u8 / f32 | RGB filtered, alpha preserved |
//!
//! Other channel counts are filtered as one joint channel vector.
//! f32 values are expected in 0.0-1.0, so `color_sigma` is in the same unit
//! for both bit depths (0.1 = a tenth of the full range).
//!
//! The image is handed to the N-D filter as a `(1, channels, H, W)` view of
//! the same memory; nothing is transposed up front.

use ndarray::{s, Array3, ArrayView3, Axis, Ix4};

use super::bilateral::{BilateralFilter, BilateralParams};
use super::convert::{f32_to_u8, u8_to_f32};
use crate::error::FilterResult;

/// Apply a prepared filter to an f32 image.
///
/// # Arguments
/// * `filter` - Bilateral filter (sigmas and execution mode)
/// * `input` - Image (height, width, channels), values 0.0-1.0
///
/// # Returns
/// Filtered image with the same shape; alpha untouched for 4 channels
pub fn filter_image_f32(filter: &BilateralFilter, input: ArrayView3<f32>) -> FilterResult<Array3<f32>> {
    let (_, _, channels) = input.dim();
    let color_channels = if channels == 4 { 3 } else { channels };

    // (height, width, channel) -> (batch, channel, height, width)
    let color = input.slice(s![.., .., ..color_channels]);
    let batched = color.insert_axis(Axis(0)).permuted_axes([0, 3, 1, 2]);

    let filtered = filter.apply(batched.into_dyn())?.into_dimensionality::<Ix4>()?;
    let filtered = filtered.index_axis_move(Axis(0), 0).permuted_axes([1, 2, 0]);

    let mut output = Array3::<f32>::zeros(input.dim());
    output.slice_mut(s![.., .., ..color_channels]).assign(&filtered);
    if channels == 4 {
        output
            .slice_mut(s![.., .., 3..])
            .assign(&input.slice(s![.., .., 3..]));
    }

    Ok(output)
}

/// Bilateral filter - f32 version.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels), values 0.0-1.0
/// * `spatial_sigma` - Spatial standard deviation in pixels
/// * `color_sigma` - Color standard deviation (0.0-1.0 scale)
///
/// # Returns
/// Filtered image with same channel count
pub fn bilateral_image_f32(
    input: ArrayView3<f32>,
    spatial_sigma: f32,
    color_sigma: f32,
) -> FilterResult<Array3<f32>> {
    let filter = BilateralFilter::new(BilateralParams::new(spatial_sigma, color_sigma))?;
    filter_image_f32(&filter, input)
}

/// Bilateral filter - u8 version.
///
/// Filters in f32 (0.0-1.0) and rounds back to 0-255.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `spatial_sigma` - Spatial standard deviation in pixels
/// * `color_sigma` - Color standard deviation (0.0-1.0 scale, i.e. 25.5 levels = 0.1)
///
/// # Returns
/// Filtered image with same channel count
pub fn bilateral_image_u8(
    input: ArrayView3<u8>,
    spatial_sigma: f32,
    color_sigma: f32,
) -> FilterResult<Array3<u8>> {
    let filtered = bilateral_image_f32(u8_to_f32(input).view(), spatial_sigma, color_sigma)?;
    Ok(f32_to_u8(filtered.view()))
}
