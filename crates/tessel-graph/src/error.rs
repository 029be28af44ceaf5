//! Graph error types and their stable status codes.

use std::error::Error;
use std::fmt;

use tessel_alloc::AllocError;

use crate::node::NodeId;

/// Stable integer status for graph operations.
///
/// `Success` = 0, errors are positive. Values never change between
/// releases.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphStatus {
    /// The operation completed.
    Success = 0,
    /// An argument names no node, repeats a node, or is otherwise invalid.
    InvalidArgument = 1,
    /// The node that should receive the result does not exist.
    InvalidResult = 2,
    /// The allocator could not provide memory.
    AllocFailed = 3,
}

impl From<&GraphError> for GraphStatus {
    fn from(e: &GraphError) -> Self {
        match e {
            GraphError::InvalidArgument { .. } => GraphStatus::InvalidArgument,
            GraphError::InvalidResult { .. } => GraphStatus::InvalidResult,
            GraphError::AllocFailed(_) => GraphStatus::AllocFailed,
        }
    }
}

impl<T> From<&Result<T, GraphError>> for GraphStatus {
    fn from(r: &Result<T, GraphError>) -> Self {
        match r {
            Ok(_) => GraphStatus::Success,
            Err(e) => e.into(),
        }
    }
}

/// Errors from graph construction and queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphError {
    /// An argument was rejected before anything was modified.
    InvalidArgument {
        /// What was wrong with it.
        reason: String,
    },
    /// The target node does not belong to this graph.
    InvalidResult {
        /// The unknown node.
        node: NodeId,
    },
    /// The allocator refused a request. No node was modified.
    AllocFailed(AllocError),
}

impl GraphError {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Stable integer code for this error (never `0`).
    pub fn code(&self) -> i32 {
        GraphStatus::from(self) as i32
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            Self::InvalidResult { node } => write!(f, "node {node} is not part of this graph"),
            Self::AllocFailed(e) => write!(f, "allocation failed: {e}"),
        }
    }
}

impl Error for GraphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AllocFailed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AllocError> for GraphError {
    fn from(e: AllocError) -> Self {
        Self::AllocFailed(e)
    }
}
