//! Bilateral Filter
//!
//! Edge-preserving smoothing for batched, multi-channel arrays with any
//! number of spatial axes (1D signals, 2D images, 3D volumes, ...).
//!
//! ## Array Format
//! The N-D filter works on `f32` arrays laid out as
//! `[batch, channel, spatial...]`:
//! - **Batch**: independent images, filtered one after another
//! - **Channel**: values compared jointly for color similarity
//! - **Spatial**: one or more axes the window slides over
//!
//! Any strides are accepted, including permuted and reversed views.
//!
//! ## Interleaved Images
//! [`filters::image`] wraps the N-D filter for `(height, width, channels)`
//! images in u8 (0-255) and f32 (0.0-1.0), preserving alpha for RGBA.
//!
//! ## Example
//! ```
//! use bilateral_rust::{BilateralFilter, BilateralParams, Execution};
//! use ndarray::ArrayD;
//! use ndarray::IxDyn;
//!
//! let volume = ArrayD::<f32>::zeros(IxDyn(&[1, 2, 8, 8, 8]));
//! let filter = BilateralFilter::new(
//!     BilateralParams::new(1.0, 0.1).with_execution(Execution::Parallel),
//! )
//! .unwrap();
//! let smoothed = filter.apply(volume.view()).unwrap();
//! assert_eq!(smoothed.shape(), volume.shape());
//! ```

pub mod error;
pub mod filters;

pub use error::{FilterError, FilterResult};
pub use filters::bilateral::{bilateral_filter, BilateralFilter, BilateralParams, Execution};
pub use filters::image::{bilateral_image_f32, bilateral_image_u8};
pub use filters::layout::{StridedAxis, StridedTensor, StridedTensorMut, TensorLayout};
