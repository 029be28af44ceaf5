//! Vector error types.

use std::error::Error;
use std::fmt;

use tessel_alloc::AllocError;

/// Errors that can occur during vector operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VecError {
    /// Element width of zero (or a zero-sized element type).
    InvalidStride,
    /// An element slice does not match the vector's stride.
    ElementSize {
        /// The vector's stride in bytes.
        expected: u32,
        /// Length of the supplied element.
        actual: usize,
    },
    /// Access past the live elements.
    IndexOutOfBounds {
        /// The requested index.
        index: u32,
        /// Number of live elements.
        length: u32,
    },
    /// Removal from an empty vector.
    Empty,
    /// A caller-supplied output buffer cannot hold the result.
    InvalidResult {
        /// Bytes the result needs.
        expected: usize,
        /// Bytes the buffer provides.
        actual: usize,
    },
    /// `capacity × stride` does not fit in memory.
    CapacityOverflow {
        /// Requested capacity in elements.
        capacity: u32,
        /// Element width in bytes.
        stride: u32,
    },
    /// The backing allocator failed.
    Alloc(AllocError),
}

impl fmt::Display for VecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStride => write!(f, "vector stride must be non-zero"),
            Self::ElementSize { expected, actual } => {
                write!(f, "element is {actual} bytes, vector stride is {expected}")
            }
            Self::IndexOutOfBounds { index, length } => {
                write!(f, "index {index} out of bounds for length {length}")
            }
            Self::Empty => write!(f, "vector is empty"),
            Self::InvalidResult { expected, actual } => {
                write!(f, "result needs {expected} bytes, buffer holds {actual}")
            }
            Self::CapacityOverflow { capacity, stride } => {
                write!(f, "capacity {capacity} × stride {stride} overflows")
            }
            Self::Alloc(e) => write!(f, "allocation: {e}"),
        }
    }
}

impl Error for VecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Alloc(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AllocError> for VecError {
    fn from(e: AllocError) -> Self {
        Self::Alloc(e)
    }
}
