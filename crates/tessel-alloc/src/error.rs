//! Allocation error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur while obtaining or releasing a [`Block`](crate::Block).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The arena does not have enough room left for the request.
    ///
    /// The arena cursor is left unchanged.
    OutOfSpace {
        /// Number of bytes requested.
        requested: usize,
        /// Bytes already handed out when the request was made.
        used: usize,
        /// Total arena capacity in bytes.
        capacity: usize,
    },
    /// The strategy does not implement this operation
    /// (e.g. `realloc` or `free` on an arena).
    UnsupportedOperation {
        /// The rejected operation.
        operation: &'static str,
        /// Name of the strategy that rejected it.
        strategy: &'static str,
    },
    /// The general-purpose allocator could not satisfy the request.
    AllocationFailed {
        /// Number of bytes requested.
        requested: usize,
    },
    /// The block was not issued by this allocator, or was already released.
    ForeignBlock,
    /// The requested size cannot be described by a valid memory layout.
    SizeOverflow {
        /// Number of bytes requested.
        requested: usize,
    },
    /// An allocator configuration failed validation.
    InvalidConfig {
        /// Description of the violated constraint.
        reason: String,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfSpace {
                requested,
                used,
                capacity,
            } => {
                write!(
                    f,
                    "arena out of space: requested {requested} bytes, {used} of {capacity} bytes used"
                )
            }
            Self::UnsupportedOperation {
                operation,
                strategy,
            } => {
                write!(f, "{operation} is not supported by the {strategy} allocator")
            }
            Self::AllocationFailed { requested } => {
                write!(f, "allocation of {requested} bytes failed")
            }
            Self::ForeignBlock => write!(f, "block was not issued by this allocator"),
            Self::SizeOverflow { requested } => {
                write!(f, "size {requested} exceeds the maximum layout size")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid allocator config: {reason}"),
        }
    }
}

impl Error for AllocError {}
