//! Bump ("stack") allocation over a caller-owned buffer.
//!
//! [`StackAllocator`] hands out consecutive ranges of a fixed byte buffer and
//! advances a single cursor. Individual blocks are never reclaimed; the only
//! way to get memory back is to rewind the cursor to zero, which invalidates
//! every block issued since the last rewind.

#![allow(unsafe_code)]

use std::cell::Cell;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::allocator::{Allocator, Capabilities};
use crate::block::Block;
use crate::config::ArenaConfig;
use crate::error::AllocError;

/// Bump allocator over a borrowed byte buffer.
///
/// Blocks are returned at `base + end` with no alignment padding, in
/// allocation order. The buffer stays mutably borrowed for `'buf`, so it
/// outlives every block the arena issues.
///
/// `realloc` and `free` are unsupported and fail with
/// [`AllocError::UnsupportedOperation`]; use
/// [`Allocator::resize`] to relocate a block inside the arena.
pub struct StackAllocator<'buf> {
    /// Start of the buffer. All blocks are derived from this pointer.
    base: NonNull<u8>,
    /// Number of bytes the arena may hand out.
    capacity: usize,
    /// Bump cursor: offset of the next block.
    end: Cell<usize>,
    zero_on_reset: bool,
    _buffer: PhantomData<&'buf mut [u8]>,
}

impl<'buf> StackAllocator<'buf> {
    const STRATEGY: &'static str = "stack";

    /// Wrap the whole of `buffer` with the default configuration.
    pub fn new(buffer: &'buf mut [u8]) -> Self {
        let capacity = buffer.len();
        Self::from_parts(buffer, capacity, false)
    }

    /// Wrap `buffer` according to `config`.
    pub fn with_config(buffer: &'buf mut [u8], config: &ArenaConfig) -> Result<Self, AllocError> {
        config.validate(buffer.len())?;
        let capacity = config.resolved_capacity(buffer.len());
        Ok(Self::from_parts(buffer, capacity, config.zero_on_reset))
    }

    fn from_parts(buffer: &'buf mut [u8], capacity: usize, zero_on_reset: bool) -> Self {
        Self {
            base: NonNull::from(buffer).cast::<u8>(),
            capacity,
            end: Cell::new(0),
            zero_on_reset,
            _buffer: PhantomData,
        }
    }

    /// Bytes handed out since the last reset (the cursor position).
    pub fn used(&self) -> usize {
        self.end.get()
    }

    /// Total bytes the arena may hand out.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.capacity - self.end.get()
    }

    /// Address of the first byte of the arena.
    pub fn base_ptr(&self) -> *const u8 {
        self.base.as_ptr()
    }

    /// Whether `block` lies inside this arena's buffer.
    pub fn contains(&self, block: &Block<'_>) -> bool {
        let start = self.base.as_ptr() as usize;
        let addr = block.as_ptr() as usize;
        addr >= start && addr + block.len() <= start + self.capacity
    }

    /// Rewind the cursor to zero.
    ///
    /// Requires `&mut self`, so no block from this arena can still be alive.
    pub fn reset(&mut self) {
        self.rewind();
    }

    fn rewind(&self) {
        let used = self.end.replace(0);
        if self.zero_on_reset {
            // SAFETY: `base..base + used` lies inside the borrowed buffer
            // (`used <= capacity <= buffer.len()`).
            unsafe { std::ptr::write_bytes(self.base.as_ptr(), 0, used) };
        }
        tracing::debug!(reclaimed = used, capacity = self.capacity, "arena reset");
    }
}

impl Allocator for StackAllocator<'_> {
    fn strategy(&self) -> &'static str {
        Self::STRATEGY
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::ARENA
    }

    fn alloc(&self, size: usize) -> Result<Block<'_>, AllocError> {
        let used = self.end.get();
        let out_of_space = AllocError::OutOfSpace {
            requested: size,
            used,
            capacity: self.capacity,
        };
        let new_end = match used.checked_add(size) {
            Some(end) if end <= self.capacity => end,
            _ => {
                tracing::warn!(
                    requested = size,
                    used,
                    capacity = self.capacity,
                    "arena overflow"
                );
                return Err(out_of_space);
            }
        };
        tracing::trace!(requested = size, used, capacity = self.capacity, "arena alloc");

        // SAFETY: `used <= capacity <= buffer.len()`, so the offset stays
        // within (or one past the end of) the buffer.
        let ptr = unsafe { self.base.add(used) };
        self.end.set(new_end);
        // SAFETY: `used..new_end` was never handed out since the last rewind,
        // so it overlaps no live block; the buffer is initialised and
        // borrowed for `'buf`, which outlives the `&self` borrow.
        Ok(unsafe { Block::from_raw_parts(ptr, size) })
    }

    fn realloc<'a>(&'a self, _block: &mut Block<'a>, _new_size: usize) -> Result<(), AllocError> {
        Err(AllocError::UnsupportedOperation {
            operation: "realloc",
            strategy: Self::STRATEGY,
        })
    }

    fn free<'a>(&'a self, _block: Block<'a>) -> Result<(), AllocError> {
        Err(AllocError::UnsupportedOperation {
            operation: "free",
            strategy: Self::STRATEGY,
        })
    }

    unsafe fn free_all(&self) -> Result<(), AllocError> {
        self.rewind();
        Ok(())
    }
}
