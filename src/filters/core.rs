//! Core utilities shared by the bilateral filter:
//! - Sigma validation
//! - Gaussian window geometry and the 1D spatial weight table
//! - Color (range) weight constant

use crate::error::{FilterError, FilterResult};

/// Check that a sigma is usable as a Gaussian standard deviation.
///
/// Besides being finite and positive, `2 * sigma^2` must not underflow:
/// a zero denominator would turn the home element's own weight into NaN.
pub fn validate_sigma(name: &'static str, value: f32) -> FilterResult<f32> {
    if value.is_finite() && value > 0.0 && gaussian_exp_constant(value).is_finite() {
        Ok(value)
    } else {
        Err(FilterError::InvalidSigma { name, value })
    }
}

/// Exponent factor `-1 / (2 * sigma^2)` of a Gaussian.
///
/// Multiplying a squared distance by this and taking `exp` gives the
/// unnormalized Gaussian weight.
#[inline]
pub fn gaussian_exp_constant(sigma: f32) -> f32 {
    -1.0 / (2.0 * sigma * sigma)
}

/// 1D spatial Gaussian sampled at the integer positions of a filter window.
///
/// The window spans `ceil(3 * sigma)` samples. Its center sits at
/// `floor(window_size / 2)`, so even windows reach one sample further on the
/// negative side than on the positive side.
///
/// Weights are *not* normalized: the bilateral filter divides by the sum of
/// the combined weights it actually used.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianWindow {
    half_window_size: usize,
    weights: Vec<f32>,
}

impl GaussianWindow {
    /// Build the weight table for `sigma`.
    ///
    /// # Errors
    /// * [`FilterError::InvalidSigma`] if `sigma` is not finite and positive
    /// * [`FilterError::ShapeOverflow`] if `ceil(3 * sigma)` exceeds `isize::MAX`
    /// * [`FilterError::Allocation`] if the table cannot be allocated
    pub fn new(sigma: f32) -> FilterResult<Self> {
        let sigma = validate_sigma("spatial_sigma", sigma)?;

        let window_size = window_size_for(sigma)?;
        // Floor, not round: decides which side gets the extra sample.
        let half_window_size = window_size / 2;
        let exp_constant = gaussian_exp_constant(sigma);

        let mut weights = Vec::new();
        weights.try_reserve_exact(window_size)?;
        weights.extend((0..window_size).map(|i| {
            let distance = i as f32 - half_window_size as f32;
            (distance * distance * exp_constant).exp()
        }));

        Ok(GaussianWindow {
            half_window_size,
            weights,
        })
    }

    /// Number of samples per axis.
    #[inline]
    pub fn window_size(&self) -> usize {
        self.weights.len()
    }

    /// Window position of the home element.
    #[inline]
    pub fn half_window_size(&self) -> usize {
        self.half_window_size
    }

    /// Weight at window position `i` (signed offset `i - half_window_size`).
    #[inline]
    pub fn weight(&self, i: usize) -> f32 {
        self.weights[i]
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Signed offsets covered by the window, from first to last position.
    pub fn offsets(&self) -> std::ops::RangeInclusive<isize> {
        let half = self.half_window_size as isize;
        -half..=(self.window_size() as isize - 1 - half)
    }
}

/// `ceil(3 * sigma)` as a sample count. Window offsets are signed, so the
/// count must fit in `isize`.
fn window_size_for(sigma: f32) -> FilterResult<usize> {
    let extent = (3.0 * sigma).ceil();
    if extent >= isize::MAX as f32 {
        return Err(FilterError::ShapeOverflow);
    }
    Ok(extent as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_geometry_sigma_one() {
        let window = GaussianWindow::new(1.0).unwrap();
        assert_eq!(window.window_size(), 3);
        assert_eq!(window.half_window_size(), 1);
        assert_eq!(window.offsets(), -1..=1);
    }

    #[test]
    fn test_window_size_rounds_up() {
        // 3 * 1.1 = 3.3 -> 4
        let window = GaussianWindow::new(1.1).unwrap();
        assert_eq!(window.window_size(), 4);
        assert_eq!(window.half_window_size(), 2);

        // Tiny sigmas still give a one-sample window.
        let window = GaussianWindow::new(0.01).unwrap();
        assert_eq!(window.window_size(), 1);
        assert_eq!(window.half_window_size(), 0);
        assert_eq!(window.weights(), &[1.0f32][..]);
    }

    #[test]
    fn test_even_window_is_asymmetric() {
        // 3 * 0.5 = 1.5 -> 2 samples, center at position 1: offsets -1 and 0.
        let window = GaussianWindow::new(0.5).unwrap();
        assert_eq!(window.window_size(), 2);
        assert_eq!(window.offsets(), -1..=0);
        assert_eq!(window.weight(1), 1.0);
        assert!((window.weight(0) - (-2.0f32).exp()).abs() < 1e-7);
    }

    #[test]
    fn test_weights_follow_squared_distance() {
        let sigma = 2.0f32;
        let window = GaussianWindow::new(sigma).unwrap();
        assert_eq!(window.window_size(), 6);
        assert_eq!(window.half_window_size(), 3);

        for (i, &w) in window.weights().iter().enumerate() {
            let d = i as f32 - 3.0;
            let expected = (-d * d / (2.0 * sigma * sigma)).exp();
            assert!((w - expected).abs() < 1e-6, "position {}: {} vs {}", i, w, expected);
        }
        // Peak at the center.
        assert_eq!(window.weight(3), 1.0);
    }

    #[test]
    fn test_invalid_sigma_rejected() {
        for sigma in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            match GaussianWindow::new(sigma) {
                Err(FilterError::InvalidSigma { name, .. }) => assert_eq!(name, "spatial_sigma"),
                other => panic!("sigma {} should be rejected, got {:?}", sigma, other),
            }
        }
    }

    #[test]
    fn test_underflowing_sigma_rejected() {
        // 2 * sigma^2 is 0 in f32, the exponent constant would be -inf.
        assert!(!gaussian_exp_constant(1e-30).is_finite());
        assert!(matches!(
            validate_sigma("color_sigma", 1e-30),
            Err(FilterError::InvalidSigma { name: "color_sigma", .. })
        ));
        assert!(matches!(
            GaussianWindow::new(1e-30),
            Err(FilterError::InvalidSigma { name: "spatial_sigma", .. })
        ));

        // Just above the cutoff: one sample of weight 1.
        let window = GaussianWindow::new(1e-19).unwrap();
        assert_eq!(window.weights(), &[1.0f32][..]);
    }

    #[test]
    fn test_huge_sigma_returns_error() {
        // Window count does not fit in isize.
        assert!(matches!(GaussianWindow::new(1e30), Err(FilterError::ShapeOverflow)));
        assert!(matches!(GaussianWindow::new(f32::MAX), Err(FilterError::ShapeOverflow)));

        // Fits in isize, but the table would exceed isize::MAX bytes.
        assert!(matches!(GaussianWindow::new(1e18), Err(FilterError::Allocation(_))));
    }

    #[test]
    fn test_exp_constant() {
        assert_eq!(gaussian_exp_constant(1.0), -0.5);
        assert_eq!(gaussian_exp_constant(0.5), -2.0);
    }
}
