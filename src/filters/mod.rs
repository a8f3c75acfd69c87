//! Filter modules.
//!
//! ## Architecture
//!
//! Leaf first:
//! - **multi_index** - Mixed-radix enumeration of N-D coordinates
//! - **core** - Sigma validation and the 1D spatial Gaussian table
//! - **layout** - Size + stride per axis, strided buffers
//! - **bilateral** - Window aggregation and the filter driver
//! - **image** - `(height, width, channels)` wrappers, u8 and f32
//! - **convert** - u8 <-> f32 conversion
//!
//! All filters are pure: the input is never modified and every call
//! allocates (or is given) its own output.

pub mod bilateral;
pub mod convert;
pub mod core;
pub mod image;
pub mod layout;
pub mod multi_index;
