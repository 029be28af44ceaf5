//! Index error types and status codes.

use std::error::Error;
use std::fmt;

use tessel_vec::VecError;

use crate::config::ConfigError;

/// Stable integer status for index operations, with a fixed label.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexStatus {
    /// The operation completed.
    Success = 0,
    /// The operation could not be carried out.
    Failure = 1,
    /// A node's storage was initialised twice.
    RedundantInit = 2,
    /// The node has no room for another key.
    Full = 3,
}

impl IndexStatus {
    /// Upper-case label for logs and diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::RedundantInit => "REDUNDANT_INIT",
            Self::Full => "FULL",
        }
    }
}

impl fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&IndexError> for IndexStatus {
    fn from(e: &IndexError) -> Self {
        match e {
            IndexError::Failure { .. } | IndexError::Config(_) | IndexError::Vector(_) => {
                IndexStatus::Failure
            }
            IndexError::RedundantInit => IndexStatus::RedundantInit,
            IndexError::Full { .. } => IndexStatus::Full,
        }
    }
}

/// Errors from the partial index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexError {
    /// The request was refused (e.g. a key that is already present).
    Failure {
        /// What went wrong.
        reason: String,
    },
    /// The node's child/key/value storage already exists.
    RedundantInit,
    /// The node already holds `max_keys` keys and cannot split.
    Full {
        /// Keys per node.
        max_keys: u32,
    },
    /// The index configuration is invalid.
    Config(ConfigError),
    /// A backing vector operation failed.
    Vector(VecError),
}

impl IndexError {
    /// Stable integer code for this error (never `0`).
    pub fn code(&self) -> i32 {
        IndexStatus::from(self) as i32
    }

    /// Upper-case label of this error's status.
    pub fn label(&self) -> &'static str {
        IndexStatus::from(self).label()
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failure { reason } => write!(f, "{}: {reason}", self.label()),
            Self::RedundantInit => write!(f, "{}: node already initialised", self.label()),
            Self::Full { max_keys } => {
                write!(f, "{}: node holds {max_keys} keys", self.label())
            }
            Self::Config(e) => write!(f, "{}: config: {e}", self.label()),
            Self::Vector(e) => write!(f, "{}: vector: {e}", self.label()),
        }
    }
}

impl Error for IndexError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Vector(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for IndexError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<VecError> for IndexError {
    fn from(e: VecError) -> Self {
        Self::Vector(e)
    }
}
