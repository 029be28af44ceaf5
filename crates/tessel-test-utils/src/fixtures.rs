//! Arena buffers and sample element types shared across crate tests.

use bytemuck::{Pod, Zeroable};

/// Arena size used by the graph demo and the end-to-end scenarios.
pub const ARENA_SIZE: usize = 8192;

/// A zeroed byte buffer of `size` bytes to back a `StackAllocator`.
pub fn arena_buffer(size: usize) -> Vec<u8> {
    vec![0u8; size]
}

/// A 24-byte record used to exercise stride migration between a 4-byte
/// element and a wider struct.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Sample {
    pub a: u32,
    pub b: u32,
    pub c: f64,
    pub d: f32,
    pub pad: u32,
}

impl Sample {
    /// The widening conversion: every field derived from `x`.
    pub fn from_u32(x: u32) -> Self {
        Self {
            a: x,
            b: x.wrapping_mul(2),
            c: f64::from(x) * 0.5,
            d: x as f32,
            pad: 0,
        }
    }

    /// The narrowing conversion: `a + 10`.
    pub fn shifted_a(self) -> u32 {
        self.a + 10
    }
}
