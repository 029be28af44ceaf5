//! Vector construction parameters.

use crate::error::VecError;

/// Parameters for creating a vector.
///
/// `length` is not a parameter: new vectors always start empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VectorParams {
    /// Initial number of element slots. `0` selects
    /// [`DEFAULT_CAPACITY`](Self::DEFAULT_CAPACITY).
    pub capacity: u32,
    /// Width of one element in bytes. Must be non-zero.
    pub stride: u32,
}

impl VectorParams {
    /// Capacity used when none is given.
    pub const DEFAULT_CAPACITY: u32 = 512;

    /// Capacity multiplier applied when a full vector grows.
    pub const GROWTH_FACTOR: u32 = 2;

    /// Parameters for `stride`-byte elements with the default capacity.
    pub fn new(stride: u32) -> Self {
        Self {
            capacity: 0,
            stride,
        }
    }

    /// Override the initial capacity.
    pub fn with_capacity(self, capacity: u32) -> Self {
        Self { capacity, ..self }
    }

    /// Capacity after applying the default for `0`.
    pub fn resolved_capacity(&self) -> u32 {
        if self.capacity == 0 {
            Self::DEFAULT_CAPACITY
        } else {
            self.capacity
        }
    }

    /// Check the parameters.
    pub fn validate(&self) -> Result<(), VecError> {
        if self.stride == 0 {
            return Err(VecError::InvalidStride);
        }
        Ok(())
    }
}
