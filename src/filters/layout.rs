//! Strided addressing for batched multi-channel N-D arrays.
//!
//! ## Axis Convention
//!
//! | Axis | Meaning |
//! |------|---------|
//! | 0 | batch |
//! | 1 | channel |
//! | 2.. | spatial (any number, at least one) |
//!
//! Strides count elements, not bytes, and may be negative. Every offset is
//! measured from the *origin*: the buffer position of the element whose
//! coordinates are all zero.

use ndarray::ArrayViewD;

use crate::error::{FilterError, FilterResult};

/// Extent and stride of a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StridedAxis {
    pub size: usize,
    pub stride: isize,
}

impl StridedAxis {
    pub fn new(size: usize, stride: isize) -> Self {
        StridedAxis { size, stride }
    }

    /// Buffer offset contributed by coordinate `index` on this axis.
    #[inline]
    pub fn offset(&self, index: usize) -> isize {
        index as isize * self.stride
    }

    /// Replicate the border: map a signed coordinate into `[0, size - 1]`.
    #[inline]
    pub fn clamp(&self, index: isize) -> usize {
        index.clamp(0, self.size as isize - 1) as usize
    }

    /// Lowest and highest offset reachable on this axis, relative to 0.
    fn extent(&self) -> FilterResult<(isize, isize)> {
        let last = isize::try_from(self.size - 1)
            .ok()
            .and_then(|last| last.checked_mul(self.stride))
            .ok_or(FilterError::ShapeOverflow)?;
        Ok((last.min(0), last.max(0)))
    }
}

/// Reject shapes the bilateral filter cannot process.
///
/// A valid shape has a batch axis, a channel axis and at least one spatial
/// axis, all non-empty.
pub fn validate_shape(shape: &[usize]) -> FilterResult<()> {
    if shape.len() < 3 {
        return Err(FilterError::RankTooLow { rank: shape.len() });
    }
    if let Some(axis) = shape.iter().position(|&s| s == 0) {
        return Err(FilterError::EmptyAxis { axis });
    }
    Ok(())
}

/// Number of elements in `shape`, with overflow checking.
pub fn element_count(shape: &[usize]) -> FilterResult<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &s| acc.checked_mul(s))
        .ok_or(FilterError::ShapeOverflow)
}

/// Batch, channel and spatial axes of an array plus its origin offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorLayout {
    batch: StridedAxis,
    channel: StridedAxis,
    spatial: Vec<StridedAxis>,
    origin: isize,
}

impl TensorLayout {
    /// Describe an array from per-axis sizes and strides.
    ///
    /// # Arguments
    /// * `sizes` - Axis lengths, `[batch, channel, spatial...]`
    /// * `strides` - Element strides in the same axis order
    /// * `origin` - Buffer position of the all-zero coordinate
    pub fn new(sizes: &[usize], strides: &[isize], origin: usize) -> FilterResult<Self> {
        if sizes.len() != strides.len() {
            return Err(FilterError::StrideCountMismatch {
                sizes: sizes.len(),
                strides: strides.len(),
            });
        }
        validate_shape(sizes)?;

        let mut axes = sizes
            .iter()
            .zip(strides)
            .map(|(&size, &stride)| StridedAxis::new(size, stride));
        // validate_shape guarantees at least three axes.
        let (Some(batch), Some(channel)) = (axes.next(), axes.next()) else {
            return Err(FilterError::RankTooLow { rank: sizes.len() });
        };

        Ok(TensorLayout {
            batch,
            channel,
            spatial: axes.collect(),
            origin: isize::try_from(origin).map_err(|_| FilterError::ShapeOverflow)?,
        })
    }

    /// Row-major (C order) layout starting at buffer position 0.
    pub fn contiguous(sizes: &[usize]) -> FilterResult<Self> {
        let mut strides = vec![0isize; sizes.len()];
        let mut stride = 1usize;
        for (s, &size) in strides.iter_mut().zip(sizes).rev() {
            *s = isize::try_from(stride).map_err(|_| FilterError::ShapeOverflow)?;
            stride = stride.checked_mul(size).ok_or(FilterError::ShapeOverflow)?;
        }
        Self::new(sizes, &strides, 0)
    }

    pub fn batch(&self) -> StridedAxis {
        self.batch
    }

    pub fn channel(&self) -> StridedAxis {
        self.channel
    }

    pub fn spatial(&self) -> &[StridedAxis] {
        &self.spatial
    }

    pub fn spatial_sizes(&self) -> Vec<usize> {
        self.spatial.iter().map(|axis| axis.size).collect()
    }

    pub fn rank(&self) -> usize {
        self.spatial.len() + 2
    }

    pub fn shape(&self) -> Vec<usize> {
        self.axes().map(|axis| axis.size).collect()
    }

    pub fn strides(&self) -> Vec<isize> {
        self.axes().map(|axis| axis.stride).collect()
    }

    fn axes(&self) -> impl Iterator<Item = &StridedAxis> {
        [&self.batch, &self.channel].into_iter().chain(&self.spatial)
    }

    /// Offset of channel 0 at the spatial origin of batch `b`.
    #[inline]
    pub fn batch_offset(&self, b: usize) -> isize {
        self.origin + self.batch.offset(b)
    }

    /// Offset of channel 0 of the element at spatial coordinates `home`.
    #[inline]
    pub fn home_offset(&self, batch_offset: isize, home: &[usize]) -> isize {
        self.spatial
            .iter()
            .zip(home)
            .fold(batch_offset, |offset, (axis, &i)| offset + axis.offset(i))
    }

    /// Lowest and highest buffer position this layout addresses.
    pub fn bounds(&self) -> FilterResult<(isize, isize)> {
        self.axes().try_fold((self.origin, self.origin), |(lo, hi), axis| {
            let (min, max) = axis.extent()?;
            Ok((
                lo.checked_add(min).ok_or(FilterError::ShapeOverflow)?,
                hi.checked_add(max).ok_or(FilterError::ShapeOverflow)?,
            ))
        })
    }

    fn check_fits(&self, len: usize) -> FilterResult<()> {
        let (min, max) = self.bounds()?;
        if min < 0 || max < 0 || max as usize >= len {
            return Err(FilterError::OutOfBounds { min, max, len });
        }
        Ok(())
    }
}

/// Read-only `f32` buffer addressed through a [`TensorLayout`].
#[derive(Debug, Clone)]
pub struct StridedTensor<'a> {
    data: &'a [f32],
    layout: TensorLayout,
}

impl<'a> StridedTensor<'a> {
    /// Wrap a raw buffer.
    ///
    /// # Errors
    /// [`FilterError::OutOfBounds`] if the layout reaches outside `data`.
    pub fn new(data: &'a [f32], layout: TensorLayout) -> FilterResult<Self> {
        layout.check_fits(data.len())?;
        Ok(StridedTensor { data, layout })
    }

    /// Address an `ndarray` view in place.
    ///
    /// Works for any view whose elements form one dense block of memory,
    /// whatever the axis order or stride signs. Returns `Ok(None)` for views
    /// with gaps (step slicing, broadcasting), which must be copied first.
    pub fn from_view(view: &'a ArrayViewD<'_, f32>) -> FilterResult<Option<Self>> {
        validate_shape(view.shape())?;

        let Some(data) = view.as_slice_memory_order() else {
            return Ok(None);
        };

        // The slice starts at the lowest address; walk back up to the
        // logical origin along every reversed axis.
        let origin = view
            .shape()
            .iter()
            .zip(view.strides())
            .filter(|&(_, &stride)| stride < 0)
            .map(|(&size, &stride)| (size - 1) * stride.unsigned_abs())
            .sum::<usize>();

        let layout = TensorLayout::new(view.shape(), view.strides(), origin)?;
        Self::new(data, layout).map(Some)
    }

    pub fn layout(&self) -> &TensorLayout {
        &self.layout
    }

    #[inline]
    pub fn get(&self, offset: isize) -> f32 {
        self.data[offset as usize]
    }
}

/// Writable `f32` buffer addressed through a [`TensorLayout`].
#[derive(Debug)]
pub struct StridedTensorMut<'a> {
    data: &'a mut [f32],
    layout: TensorLayout,
}

impl<'a> StridedTensorMut<'a> {
    /// Wrap a raw output buffer.
    ///
    /// # Errors
    /// * [`FilterError::OutOfBounds`] if the layout reaches outside `data`
    /// * [`FilterError::OverlappingOutput`] if an axis longer than one has
    ///   stride 0
    pub fn new(data: &'a mut [f32], layout: TensorLayout) -> FilterResult<Self> {
        if let Some(axis) = layout
            .axes()
            .position(|axis| axis.size > 1 && axis.stride == 0)
        {
            return Err(FilterError::OverlappingOutput { axis });
        }
        layout.check_fits(data.len())?;
        Ok(StridedTensorMut { data, layout })
    }

    pub fn layout(&self) -> &TensorLayout {
        &self.layout
    }

    /// Store one value per channel at spatial coordinates `home` of batch `b`.
    #[inline]
    pub fn write_channels(&mut self, b: usize, home: &[usize], values: &[f32]) {
        let offset = self.layout.home_offset(self.layout.batch_offset(b), home);
        let channel = self.layout.channel;
        for (c, &value) in values.iter().enumerate() {
            self.data[(offset + channel.offset(c)) as usize] = value;
        }
    }
}
