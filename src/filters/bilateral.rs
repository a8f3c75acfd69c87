//! N-dimensional bilateral filter.
//!
//! Edge-preserving smoothing: every output element is a weighted average of
//! its window neighbors, with weights that fall off with spatial distance
//! (Gaussian, `spatial_sigma`) and with color distance between the channel
//! vectors (Gaussian, `color_sigma`).
//!
//! ## Input Layout
//!
//! Arrays are `[batch, channel, spatial...]` with any number of spatial axes.
//! Color distance is the Euclidean distance across all channels, so channels
//! of one element are filtered jointly.
//!
//! ## Window
//!
//! The window spans `ceil(3 * spatial_sigma)` samples on every spatial axis.
//! Samples falling outside the array replicate the border element; their
//! spatial weight is still the one of their window position.
//!
//! ```
//! use bilateral_rust::filters::bilateral::bilateral_filter;
//! use ndarray::Array3;
//!
//! // 1 batch, 1 channel, 5 samples with a step edge.
//! let input = Array3::from_shape_vec((1, 1, 5), vec![0.0, 0.0, 0.0, 10.0, 10.0]).unwrap();
//! let output = bilateral_filter(input.view().into_dyn(), 1.0, 1.0).unwrap();
//!
//! assert_eq!(output.shape(), &[1, 1, 5]);
//! assert!(output[[0, 0, 2]].abs() < 1e-6);
//! assert!((output[[0, 0, 3]] - 10.0).abs() < 1e-4);
//! ```

use log::{debug, trace};
use ndarray::{ArrayD, ArrayViewD, IxDyn};
use rayon::prelude::*;

use super::core::{gaussian_exp_constant, validate_sigma, GaussianWindow};
use super::layout::{element_count, validate_shape, StridedTensor, StridedTensorMut, TensorLayout};
use super::multi_index::MultiIndex;
use crate::error::{FilterError, FilterResult};

// ============================================================================
// Parameters
// ============================================================================

/// How home elements are scheduled.
///
/// Both modes visit every window in the same order, so their outputs are
/// bit-identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Execution {
    /// Single thread, batch by batch.
    #[default]
    Sequential,
    /// Home elements of all batches spread over the rayon thread pool.
    Parallel,
}

/// Bilateral filter settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BilateralParams {
    /// Standard deviation of the spatial Gaussian, in elements.
    pub spatial_sigma: f32,
    /// Standard deviation of the color Gaussian, in value units.
    pub color_sigma: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub execution: Execution,
}

impl BilateralParams {
    pub fn new(spatial_sigma: f32, color_sigma: f32) -> Self {
        BilateralParams {
            spatial_sigma,
            color_sigma,
            execution: Execution::default(),
        }
    }

    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    /// Both sigmas must be finite, greater than zero, and large enough that
    /// `2 * sigma^2` does not underflow.
    pub fn validate(&self) -> FilterResult<()> {
        validate_sigma("spatial_sigma", self.spatial_sigma)?;
        validate_sigma("color_sigma", self.color_sigma)?;
        Ok(())
    }
}

// ============================================================================
// Neighborhood Aggregation
// ============================================================================

/// Per-home accumulators and the window walk that fills them.
///
/// One instance per thread; reused across home elements.
pub(crate) struct Neighborhood<'a> {
    input: &'a StridedTensor<'a>,
    window: &'a GaussianWindow,
    color_exp_constant: f32,
    window_sizes: Vec<usize>,
    home_values: Vec<f32>,
    value_sum: Vec<f32>,
    weight_sum: f32,
}

impl<'a> Neighborhood<'a> {
    pub(crate) fn new(
        input: &'a StridedTensor<'a>,
        window: &'a GaussianWindow,
        color_exp_constant: f32,
    ) -> Self {
        let layout = input.layout();
        let channels = layout.channel().size;
        Neighborhood {
            input,
            window,
            color_exp_constant,
            window_sizes: vec![window.window_size(); layout.spatial().len()],
            home_values: vec![0.0; channels],
            value_sum: vec![0.0; channels],
            weight_sum: 0.0,
        }
    }

    /// Filtered channel vector of the element at `home` in the batch starting
    /// at `batch_offset`.
    pub(crate) fn filter_home(&mut self, batch_offset: isize, home: &[usize]) -> &[f32] {
        let input = self.input;
        let window = self.window;
        let layout = input.layout();
        let channel = layout.channel();
        let half = window.half_window_size() as isize;

        let home_offset = layout.home_offset(batch_offset, home);
        for (c, value) in self.home_values.iter_mut().enumerate() {
            *value = input.get(home_offset + channel.offset(c));
        }

        self.value_sum.fill(0.0);
        self.weight_sum = 0.0;

        let mut kernel_index = MultiIndex::new(&self.window_sizes);
        loop {
            // Neighbor position, clamped to the border on every axis.
            let mut neighbor_offset = batch_offset;
            let mut spatial_weight = 1.0f32;
            for ((axis, &h), &k) in layout.spatial().iter().zip(home).zip(kernel_index.coords()) {
                let neighbor = axis.clamp(h as isize + k as isize - half);
                neighbor_offset += axis.offset(neighbor);
                // Window position, not the clamped coordinate.
                spatial_weight *= window.weight(k);
            }

            let mut color_distance_sq = 0.0f32;
            for (c, &home_value) in self.home_values.iter().enumerate() {
                let diff = home_value - input.get(neighbor_offset + channel.offset(c));
                color_distance_sq += diff * diff;
            }

            let color_weight = (color_distance_sq * self.color_exp_constant).exp();
            let total_weight = spatial_weight * color_weight;

            for (c, sum) in self.value_sum.iter_mut().enumerate() {
                *sum += input.get(neighbor_offset + channel.offset(c)) * total_weight;
            }
            self.weight_sum += total_weight;

            if !kernel_index.advance() {
                break;
            }
        }

        // The home element itself contributes weight 1, so this never divides by 0.
        for sum in self.value_sum.iter_mut() {
            *sum /= self.weight_sum;
        }
        &self.value_sum
    }

    /// Total weight gathered by the last [`filter_home`](Self::filter_home).
    #[cfg(test)]
    pub(crate) fn weight_sum(&self) -> f32 {
        self.weight_sum
    }
}

// ============================================================================
// Filter
// ============================================================================

/// Bilateral filter with its spatial weight table built once.
///
/// Can be applied to any number of arrays; the table is shared read-only.
#[derive(Debug, Clone)]
pub struct BilateralFilter {
    params: BilateralParams,
    window: GaussianWindow,
    color_exp_constant: f32,
}

impl BilateralFilter {
    /// Validate `params` and precompute the spatial Gaussian.
    ///
    /// # Errors
    /// * [`FilterError::InvalidSigma`] if either sigma is non-finite, not
    ///   strictly positive, or underflows
    /// * [`FilterError::ShapeOverflow`] / [`FilterError::Allocation`] if the
    ///   spatial window is too large
    pub fn new(params: BilateralParams) -> FilterResult<Self> {
        params.validate()?;
        let window = GaussianWindow::new(params.spatial_sigma)?;
        let color_exp_constant = gaussian_exp_constant(params.color_sigma);

        debug!(
            "bilateral filter: spatial_sigma={}, color_sigma={}, window_size={}, half_window_size={}",
            params.spatial_sigma,
            params.color_sigma,
            window.window_size(),
            window.half_window_size()
        );

        Ok(BilateralFilter {
            params,
            window,
            color_exp_constant,
        })
    }

    pub fn params(&self) -> &BilateralParams {
        &self.params
    }

    pub fn window(&self) -> &GaussianWindow {
        &self.window
    }

    /// Filter an `ndarray` view into a newly allocated array of the same shape.
    ///
    /// Views that are dense in memory are read in place through their strides.
    /// Views with gaps are copied into standard layout first.
    ///
    /// # Errors
    /// * [`FilterError::RankTooLow`] / [`FilterError::EmptyAxis`] for unusable shapes
    /// * [`FilterError::Allocation`] if the output cannot be allocated
    pub fn apply(&self, input: ArrayViewD<f32>) -> FilterResult<ArrayD<f32>> {
        let shape = input.shape().to_vec();
        validate_shape(&shape)?;

        let standard;
        let standard_view;
        let tensor = match StridedTensor::from_view(&input)? {
            Some(tensor) => tensor,
            None => {
                debug!("input view {:?} has gaps, filtering a standard-layout copy", input.strides());
                standard = input.as_standard_layout();
                standard_view = standard.view();
                StridedTensor::from_view(&standard_view)?.ok_or(FilterError::UnsupportedLayout)?
            }
        };

        let mut data = try_zeroed(element_count(&shape)?)?;
        let mut output = StridedTensorMut::new(&mut data, TensorLayout::contiguous(&shape)?)?;
        self.apply_strided(&tensor, &mut output)?;

        Ok(ArrayD::from_shape_vec(IxDyn(&shape), data)?)
    }

    /// Filter `input` into `output`, both addressed through their own strides.
    ///
    /// # Errors
    /// [`FilterError::ShapeMismatch`] if the two shapes differ.
    pub fn apply_strided(
        &self,
        input: &StridedTensor,
        output: &mut StridedTensorMut,
    ) -> FilterResult<()> {
        let shape = input.layout().shape();
        let output_shape = output.layout().shape();
        if shape != output_shape {
            return Err(FilterError::ShapeMismatch {
                input: shape,
                output: output_shape,
            });
        }

        debug!(
            "bilateral filter over shape {:?} ({:?})",
            shape, self.params.execution
        );

        match self.params.execution {
            Execution::Sequential => self.run_sequential(input, output),
            Execution::Parallel => self.run_parallel(input, output)?,
        }
        Ok(())
    }

    fn run_sequential(&self, input: &StridedTensor, output: &mut StridedTensorMut) {
        let layout = input.layout();
        let spatial_sizes = layout.spatial_sizes();
        let mut neighborhood = Neighborhood::new(input, &self.window, self.color_exp_constant);

        for b in 0..layout.batch().size {
            trace!("batch {}/{}", b + 1, layout.batch().size);
            let batch_offset = layout.batch_offset(b);

            let mut home = MultiIndex::new(&spatial_sizes);
            loop {
                let values = neighborhood.filter_home(batch_offset, home.coords());
                output.write_channels(b, home.coords(), values);

                if !home.advance() {
                    break;
                }
            }
        }
    }

    /// Filter every home element into a scratch slot on the thread pool, then
    /// scatter the slots into `output` in enumeration order.
    fn run_parallel(&self, input: &StridedTensor, output: &mut StridedTensorMut) -> FilterResult<()> {
        let layout = input.layout();
        let spatial_sizes = layout.spatial_sizes();
        let channels = layout.channel().size;
        let homes_per_batch = element_count(&spatial_sizes)?;
        let len = element_count(&[layout.batch().size, homes_per_batch, channels])?;

        let mut scratch = try_zeroed(len)?;
        scratch.par_chunks_mut(channels).enumerate().for_each_init(
            || Neighborhood::new(input, &self.window, self.color_exp_constant),
            |neighborhood, (i, slot)| {
                let batch_offset = layout.batch_offset(i / homes_per_batch);
                let home = MultiIndex::at(&spatial_sizes, i % homes_per_batch);
                slot.copy_from_slice(neighborhood.filter_home(batch_offset, home.coords()));
            },
        );

        // Slot i holds home i % homes_per_batch of batch i / homes_per_batch.
        for (b, batch) in scratch.chunks_exact(homes_per_batch * channels).enumerate() {
            let mut home = MultiIndex::new(&spatial_sizes);
            for values in batch.chunks_exact(channels) {
                output.write_channels(b, home.coords(), values);
                home.advance();
            }
        }
        Ok(())
    }
}

/// Filter `input` (`[batch, channel, spatial...]`) with a one-off filter.
///
/// # Arguments
/// * `input` - Array with at least one spatial axis
/// * `spatial_sigma` - Spatial Gaussian standard deviation, in elements
/// * `color_sigma` - Color Gaussian standard deviation, in value units
///
/// # Returns
/// Filtered array with the same shape as `input`
pub fn bilateral_filter(
    input: ArrayViewD<f32>,
    spatial_sigma: f32,
    color_sigma: f32,
) -> FilterResult<ArrayD<f32>> {
    BilateralFilter::new(BilateralParams::new(spatial_sigma, color_sigma))?.apply(input)
}

/// Zero-filled buffer, reporting allocation failure instead of aborting.
fn try_zeroed(len: usize) -> FilterResult<Vec<f32>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)?;
    data.resize(len, 0.0);
    Ok(data)
}
