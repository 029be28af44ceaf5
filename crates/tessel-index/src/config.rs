//! Index configuration and its validation errors.

use std::error::Error;
use std::fmt;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`IndexConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_children` is below the minimum of 2.
    MaxChildrenTooSmall {
        /// The configured value that was too small.
        configured: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxChildrenTooSmall { configured } => {
                write!(f, "max_children {configured} is below minimum of 2")
            }
        }
    }
}

impl Error for ConfigError {}

// ── IndexConfig ────────────────────────────────────────────────────

/// Shape of an index node.
///
/// A node has room for `max_children` child links and `max_children - 1`
/// keys, with one value per key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexConfig {
    /// Maximum number of children per node.
    pub max_children: u32,
}

impl IndexConfig {
    /// Default fan-out.
    pub const DEFAULT_MAX_CHILDREN: u32 = 8;

    /// Smallest fan-out that leaves room for a key.
    pub const MIN_MAX_CHILDREN: u32 = 2;

    /// A config with the given fan-out.
    pub fn new(max_children: u32) -> Self {
        Self { max_children }
    }

    /// Keys a single node can hold.
    pub fn max_keys(&self) -> u32 {
        self.max_children.saturating_sub(1)
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_children < Self::MIN_MAX_CHILDREN {
            return Err(ConfigError::MaxChildrenTooSmall {
                configured: self.max_children,
            });
        }
        Ok(())
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_CHILDREN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let c = IndexConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.max_keys(), 7);
    }

    #[test]
    fn fan_out_below_two_rejected() {
        for n in [0, 1] {
            assert_eq!(
                IndexConfig::new(n).validate(),
                Err(ConfigError::MaxChildrenTooSmall { configured: n })
            );
        }
        assert!(IndexConfig::new(2).validate().is_ok());
    }
}
