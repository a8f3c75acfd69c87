//! Rank-generic coordinate enumeration.
//!
//! [`MultiIndex`] walks every coordinate of an N-dimensional box in
//! mixed-radix order with axis 0 varying fastest. It is driven as a
//! do-while loop: the body runs on the current coordinate first, then
//! [`MultiIndex::advance`] decides whether another coordinate follows.
//!
//! ```
//! use bilateral_rust::filters::multi_index::MultiIndex;
//!
//! let mut index = MultiIndex::new(&[2, 3]);
//! let mut visited = Vec::new();
//! loop {
//!     visited.push(index.coords().to_vec());
//!     if !index.advance() {
//!         break;
//!     }
//! }
//! assert_eq!(visited.len(), 6);
//! assert_eq!(visited[1], vec![1, 0]);
//! ```

/// Coordinate within an N-dimensional box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiIndex {
    sizes: Vec<usize>,
    coords: Vec<usize>,
    exhausted: bool,
}

impl MultiIndex {
    /// Start at the all-zero coordinate of a box with the given extents.
    ///
    /// A box with any zero-length axis holds no coordinates and starts
    /// exhausted. A zero-dimensional box holds exactly one (empty) coordinate.
    pub fn new(sizes: &[usize]) -> Self {
        MultiIndex {
            sizes: sizes.to_vec(),
            coords: vec![0; sizes.len()],
            exhausted: sizes.iter().any(|&s| s == 0),
        }
    }

    /// Position at the `linear`-th coordinate of the enumeration order.
    ///
    /// `MultiIndex::at(sizes, 0)` equals `MultiIndex::new(sizes)`. Positions
    /// past the end yield an exhausted index.
    pub fn at(sizes: &[usize], linear: usize) -> Self {
        let mut index = Self::new(sizes);
        if index.exhausted {
            return index;
        }
        if linear >= index.len() {
            index.exhausted = true;
            return index;
        }

        let mut rest = linear;
        for (coord, &size) in index.coords.iter_mut().zip(&index.sizes) {
            *coord = rest % size;
            rest /= size;
        }
        index
    }

    /// Step to the next coordinate.
    ///
    /// Returns `false` once every axis has overflowed; the coordinates are
    /// then back at zero and [`is_exhausted`](Self::is_exhausted) reports
    /// `true`. Further calls keep returning `false`.
    pub fn advance(&mut self) -> bool {
        if self.exhausted {
            return false;
        }

        for (coord, &size) in self.coords.iter_mut().zip(&self.sizes) {
            *coord += 1;
            if *coord < size {
                return true;
            }
            *coord = 0;
        }

        self.exhausted = true;
        false
    }

    /// Current coordinate on `axis`.
    #[inline]
    pub fn index(&self, axis: usize) -> usize {
        self.coords[axis]
    }

    #[inline]
    pub fn coords(&self) -> &[usize] {
        &self.coords
    }

    /// Number of coordinates in the box.
    pub fn len(&self) -> usize {
        self.sizes.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
