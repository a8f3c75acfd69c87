//! Bit depth conversion for interleaved images.
//!
//! - **u8 (8-bit)**: Values 0-255
//! - **f32 (float)**: Values 0.0-1.0

use ndarray::{Array3, ArrayView3};

/// Convert u8 image (0-255) to f32 (0.0-1.0)
pub fn u8_to_f32(input: ArrayView3<u8>) -> Array3<f32> {
    input.mapv(|v| v as f32 / 255.0)
}

/// Convert f32 image (0.0-1.0) to u8 (0-255), rounding to nearest.
///
/// Rounding keeps a u8 -> f32 -> u8 trip lossless even when filtering
/// leaves values a hair below the original level.
pub fn f32_to_u8(input: ArrayView3<f32>) -> Array3<u8> {
    input.mapv(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8_roundtrip_is_lossless() {
        let img = Array3::from_shape_fn((1, 256, 1), |(_, x, _)| x as u8);
        let back = f32_to_u8(u8_to_f32(img.view()).view());
        assert_eq!(back, img);
    }

    #[test]
    fn test_f32_to_u8_clamps_and_rounds() {
        let img = Array3::from_shape_vec((1, 4, 1), vec![-0.5, 0.4999, 0.50196, 2.0]).unwrap();
        let result = f32_to_u8(img.view());
        assert_eq!(result[[0, 0, 0]], 0);
        assert_eq!(result[[0, 1, 0]], 127);
        assert_eq!(result[[0, 2, 0]], 128);
        assert_eq!(result[[0, 3, 0]], 255);
    }
}
