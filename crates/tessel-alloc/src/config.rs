//! Arena configuration parameters.

use crate::error::AllocError;

/// Configuration for a [`StackAllocator`](crate::StackAllocator).
///
/// Validated at construction against the length of the caller's buffer.
#[derive(Clone, Debug)]
pub struct ArenaConfig {
    /// Number of bytes of the buffer the arena may hand out.
    ///
    /// `None` uses the whole buffer. Must not exceed the buffer length.
    pub capacity: Option<usize>,

    /// Zero the used prefix of the buffer on reset.
    ///
    /// Default: `false`. A reset only rewinds the cursor; stale bytes stay
    /// in place and are visible through the next blocks handed out.
    pub zero_on_reset: bool,
}

impl ArenaConfig {
    /// Create a config that uses the whole buffer and does not zero on reset.
    pub fn new() -> Self {
        Self {
            capacity: None,
            zero_on_reset: false,
        }
    }

    /// Limit the arena to the first `capacity` bytes of its buffer.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::new()
        }
    }

    /// Effective capacity for a buffer of `buffer_len` bytes.
    pub fn resolved_capacity(&self, buffer_len: usize) -> usize {
        self.capacity.unwrap_or(buffer_len)
    }

    /// Check the config against a buffer of `buffer_len` bytes.
    pub fn validate(&self, buffer_len: usize) -> Result<(), AllocError> {
        if let Some(capacity) = self.capacity {
            if capacity > buffer_len {
                return Err(AllocError::InvalidConfig {
                    reason: format!(
                        "capacity {capacity} exceeds buffer length {buffer_len}"
                    ),
                });
            }
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_whole_buffer() {
        let config = ArenaConfig::default();
        assert_eq!(config.resolved_capacity(8192), 8192);
        assert!(config.validate(8192).is_ok());
    }

    #[test]
    fn capacity_beyond_buffer_is_rejected() {
        let config = ArenaConfig::with_capacity(100);
        assert!(config.validate(100).is_ok());
        assert!(matches!(
            config.validate(99),
            Err(AllocError::InvalidConfig { .. })
        ));
    }
}
