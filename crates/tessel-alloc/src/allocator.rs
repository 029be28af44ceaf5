//! The [`Allocator`] capability interface.

use crate::block::Block;
use crate::error::AllocError;

/// Which optional operations an allocation strategy implements.
///
/// `alloc` is always supported. Callers that must work over any strategy
/// (containers, graphs) consult this instead of provoking
/// [`AllocError::UnsupportedOperation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// `realloc` can grow or shrink a block, possibly moving it.
    pub realloc: bool,
    /// Individual blocks can be returned with `free`.
    pub free: bool,
    /// Every outstanding block can be reclaimed at once with `free_all`.
    pub free_all: bool,
}

impl Capabilities {
    /// Bump arena: allocate and bulk-reset only.
    pub const ARENA: Self = Self {
        realloc: false,
        free: false,
        free_all: true,
    };

    /// General heap: every operation.
    pub const HEAP: Self = Self {
        realloc: true,
        free: true,
        free_all: true,
    };
}

/// A strategy for obtaining and releasing raw byte ranges.
///
/// Methods take `&self`; strategies keep their bookkeeping in `Cell` /
/// `RefCell`, which makes every implementation `!Sync`. Allocators are
/// single-threaded and perform no internal locking.
///
/// An allocator never reads or writes a block's bytes after handing it out,
/// except to copy the preserved prefix during `realloc`/[`resize`](Self::resize).
pub trait Allocator {
    /// Short, stable name of the strategy (used in errors and logs).
    fn strategy(&self) -> &'static str;

    /// The optional operations this strategy supports.
    fn capabilities(&self) -> Capabilities;

    /// Reserve `size` bytes.
    ///
    /// A zero-size request succeeds with a zero-length block.
    fn alloc(&self, size: usize) -> Result<Block<'_>, AllocError>;

    /// Grow or shrink `block` to `new_size` bytes, possibly relocating it.
    ///
    /// The first `min(old, new)` bytes are preserved. On success `block`
    /// refers to the new range; on failure it is left untouched.
    fn realloc<'a>(&'a self, block: &mut Block<'a>, new_size: usize) -> Result<(), AllocError>;

    /// Return a single block.
    ///
    /// The block is consumed even on failure; a rejected block is leaked
    /// until the allocator's bulk release.
    fn free<'a>(&'a self, block: Block<'a>) -> Result<(), AllocError>;

    /// Reclaim every block this allocator has issued and return it to its
    /// initial state.
    ///
    /// # Safety
    ///
    /// Every outstanding [`Block`] from this allocator becomes invalid. The
    /// caller must not read, write, resize or free any of them afterwards.
    /// Nothing checks this; prefer the strategy's `&mut self` reset, which
    /// the borrow checker proves sound.
    #[allow(unsafe_code)]
    unsafe fn free_all(&self) -> Result<(), AllocError>;

    /// Resize `block` by whatever means the strategy supports.
    ///
    /// Uses [`realloc`](Self::realloc) when available. Otherwise allocates
    /// a fresh block, copies the preserved prefix and releases the old block
    /// if the strategy supports `free` (an arena simply abandons it until
    /// its next reset). On failure `block` is left untouched.
    fn resize<'a>(&'a self, block: &mut Block<'a>, new_size: usize) -> Result<(), AllocError> {
        let caps = self.capabilities();
        if caps.realloc {
            return self.realloc(block, new_size);
        }

        let mut moved = self.alloc(new_size)?;
        let keep = block.len().min(new_size);
        moved.as_bytes_mut()[..keep].copy_from_slice(&block.as_bytes()[..keep]);
        let old = std::mem::replace(block, moved);
        if caps.free {
            if let Err(e) = self.free(old) {
                tracing::warn!(strategy = self.strategy(), error = %e, "failed to release relocated block");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HeapAllocator, StackAllocator};

    #[test]
    fn capability_sets_match_strategies() {
        let mut buf = [0u8; 16];
        let arena = StackAllocator::new(&mut buf);
        let heap = HeapAllocator::new();
        assert_eq!(arena.capabilities(), Capabilities::ARENA);
        assert_eq!(heap.capabilities(), Capabilities::HEAP);
    }

    #[test]
    fn resize_relocates_within_arena() {
        let mut buf = [0u8; 64];
        let arena = StackAllocator::new(&mut buf);
        let mut block = arena.alloc(4).unwrap();
        block.as_bytes_mut().copy_from_slice(&[1, 2, 3, 4]);
        let before = block.as_ptr();

        arena.resize(&mut block, 8).unwrap();
        assert_eq!(block.len(), 8);
        assert_ne!(block.as_ptr(), before);
        assert_eq!(&block.as_bytes()[..4], &[1, 2, 3, 4]);
        // Old block is abandoned, not reclaimed.
        assert_eq!(arena.used(), 12);
    }

    #[test]
    fn resize_failure_leaves_block_untouched() {
        let mut buf = [0u8; 8];
        let arena = StackAllocator::new(&mut buf);
        let mut block = arena.alloc(4).unwrap();
        block.as_bytes_mut().fill(9);
        let before = block.as_ptr();

        let err = arena.resize(&mut block, 16).unwrap_err();
        assert!(matches!(err, AllocError::OutOfSpace { .. }));
        assert_eq!(block.as_ptr(), before);
        assert_eq!(block.as_bytes(), &[9, 9, 9, 9]);
        assert_eq!(arena.used(), 4);
    }

    #[test]
    fn resize_uses_realloc_on_heap() {
        let heap = HeapAllocator::new();
        let mut block = heap.alloc(4).unwrap();
        block.as_bytes_mut().copy_from_slice(&[5, 6, 7, 8]);
        heap.resize(&mut block, 32).unwrap();
        assert_eq!(block.len(), 32);
        assert_eq!(&block.as_bytes()[..4], &[5, 6, 7, 8]);
        assert_eq!(heap.live_blocks(), 1);
        heap.free(block).unwrap();
    }

    #[test]
    fn trait_objects_are_usable() {
        let heap = HeapAllocator::new();
        let dyn_alloc: &dyn Allocator = &heap;
        let block = dyn_alloc.alloc(10).unwrap();
        assert_eq!(block.len(), 10);
        dyn_alloc.free(block).unwrap();
        assert_eq!(heap.live_blocks(), 0);
    }
}
