//! General-purpose allocation through the global allocator.
//!
//! [`HeapAllocator`] forwards to `std::alloc` and keeps a registry of every
//! live block (address to layout). The registry is what lets `free` reject
//! blocks it never issued, and what lets [`HeapAllocator::release_all`] and
//! `Drop` return everything still outstanding.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::cell::RefCell;
use std::ptr::NonNull;

use indexmap::IndexMap;

use crate::allocator::{Allocator, Capabilities};
use crate::block::Block;
use crate::error::AllocError;

/// Alignment of every heap block, large enough for any primitive type.
pub const HEAP_ALIGN: usize = 16;

/// Allocator backed by the process-wide global allocator.
///
/// Memory is zero-initialised on `alloc` and on the grown tail of a
/// `realloc`, so block bytes are always initialised. Zero-length requests
/// are served without touching the global allocator.
pub struct HeapAllocator {
    /// Live blocks keyed by start address.
    live: RefCell<IndexMap<usize, Layout>>,
}

impl HeapAllocator {
    const STRATEGY: &'static str = "heap";

    /// Create an allocator with no live blocks.
    pub fn new() -> Self {
        Self {
            live: RefCell::new(IndexMap::new()),
        }
    }

    /// Number of blocks currently outstanding.
    pub fn live_blocks(&self) -> usize {
        self.live.borrow().len()
    }

    /// Total bytes currently outstanding.
    pub fn live_bytes(&self) -> usize {
        self.live.borrow().values().map(Layout::size).sum()
    }

    /// Release every outstanding block.
    ///
    /// Requires `&mut self`, so no block from this allocator can still be
    /// alive.
    pub fn release_all(&mut self) {
        self.release_registered();
    }

    fn layout_for(size: usize) -> Result<Layout, AllocError> {
        Layout::from_size_align(size, HEAP_ALIGN)
            .map_err(|_| AllocError::SizeOverflow { requested: size })
    }

    fn release_registered(&self) {
        let drained: Vec<(usize, Layout)> = self.live.borrow_mut().drain(..).collect();
        let count = drained.len();
        for (addr, layout) in drained {
            // SAFETY: every registry entry was produced by `alloc_zeroed` or
            // `realloc` with exactly this layout and has not been freed.
            unsafe { alloc::dealloc(addr as *mut u8, layout) };
        }
        tracing::debug!(released = count, "heap release all");
    }
}

impl Default for HeapAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for HeapAllocator {
    fn drop(&mut self) {
        self.release_registered();
    }
}

impl Allocator for HeapAllocator {
    fn strategy(&self) -> &'static str {
        Self::STRATEGY
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::HEAP
    }

    fn alloc(&self, size: usize) -> Result<Block<'_>, AllocError> {
        if size == 0 {
            return Ok(Block::empty());
        }
        let layout = Self::layout_for(size)?;
        // SAFETY: `layout` has non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or(AllocError::AllocationFailed { requested: size })?;
        self.live.borrow_mut().insert(ptr.as_ptr() as usize, layout);
        tracing::trace!(
            requested = size,
            used = self.live_bytes(),
            live = self.live_blocks(),
            "heap alloc"
        );
        // SAFETY: fresh, zeroed allocation of `size` bytes, owned by nobody
        // else; it stays valid until freed through this allocator, which
        // outlives the returned block.
        Ok(unsafe { Block::from_raw_parts(ptr, size) })
    }

    fn realloc<'a>(&'a self, block: &mut Block<'a>, new_size: usize) -> Result<(), AllocError> {
        if block.is_empty() {
            *block = self.alloc(new_size)?;
            return Ok(());
        }

        let old_addr = block.addr();
        let old_layout = *self
            .live
            .borrow()
            .get(&old_addr)
            .ok_or(AllocError::ForeignBlock)?;
        if new_size == 0 {
            let old = std::mem::replace(block, Block::empty());
            return self.free(old);
        }
        let new_layout = Self::layout_for(new_size)?;

        // SAFETY: the block was allocated by us with `old_layout` (registry
        // lookup above) and `new_size` is non-zero and fits a valid layout.
        let raw = unsafe { alloc::realloc(block.non_null().as_ptr(), old_layout, new_size) };
        let ptr = NonNull::new(raw).ok_or(AllocError::AllocationFailed {
            requested: new_size,
        })?;
        let old_size = old_layout.size();
        if new_size > old_size {
            // SAFETY: `ptr..ptr + new_size` is ours; zero the uninitialised tail.
            unsafe { std::ptr::write_bytes(ptr.as_ptr().add(old_size), 0, new_size - old_size) };
        }

        {
            let mut live = self.live.borrow_mut();
            live.swap_remove(&old_addr);
            live.insert(ptr.as_ptr() as usize, new_layout);
        }
        tracing::trace!(old_size, new_size, moved = (ptr.as_ptr() as usize != old_addr), "heap realloc");
        // SAFETY: `ptr` covers `new_size` initialised bytes, now registered
        // as a single live block; the previous range is gone.
        *block = unsafe { Block::from_raw_parts(ptr, new_size) };
        Ok(())
    }

    fn free<'a>(&'a self, block: Block<'a>) -> Result<(), AllocError> {
        if block.is_empty() {
            return Ok(());
        }
        let layout = self
            .live
            .borrow_mut()
            .swap_remove(&block.addr())
            .ok_or(AllocError::ForeignBlock)?;
        // SAFETY: the registry entry proves this allocator produced the
        // block with `layout`; removing it first prevents a second release.
        unsafe { alloc::dealloc(block.non_null().as_ptr(), layout) };
        tracing::trace!(
            size = layout.size(),
            used = self.live_bytes(),
            live = self.live_blocks(),
            "heap free"
        );
        Ok(())
    }

    unsafe fn free_all(&self) -> Result<(), AllocError> {
        self.release_registered();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_is_zeroed_and_aligned() {
        let heap = HeapAllocator::new();
        let b = heap.alloc(33).unwrap();
        assert_eq!(b.len(), 33);
        assert!(b.as_bytes().iter().all(|&v| v == 0));
        assert_eq!(b.as_ptr() as usize % HEAP_ALIGN, 0);
        assert_eq!(heap.live_blocks(), 1);
        assert_eq!(heap.live_bytes(), 33);
        heap.free(b).unwrap();
        assert_eq!(heap.live_blocks(), 0);
    }

    #[test]
    fn zero_size_alloc_is_not_registered() {
        let heap = HeapAllocator::new();
        let b = heap.alloc(0).unwrap();
        assert!(b.is_empty());
        assert_eq!(heap.live_blocks(), 0);
        heap.free(b).unwrap();
    }

    #[test]
    fn realloc_preserves_prefix_and_zeroes_tail() {
        let heap = HeapAllocator::new();
        let mut b = heap.alloc(4).unwrap();
        b.as_bytes_mut().copy_from_slice(&[1, 2, 3, 4]);
        heap.realloc(&mut b, 4096).unwrap();
        assert_eq!(&b.as_bytes()[..4], &[1, 2, 3, 4]);
        assert!(b.as_bytes()[4..].iter().all(|&v| v == 0));
        assert_eq!(heap.live_blocks(), 1);
        assert_eq!(heap.live_bytes(), 4096);
    }

    #[test]
    fn realloc_shrink_keeps_prefix() {
        let heap = HeapAllocator::new();
        let mut b = heap.alloc(8).unwrap();
        b.as_bytes_mut().copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        heap.realloc(&mut b, 3).unwrap();
        assert_eq!(b.as_bytes(), &[1, 2, 3]);
        assert_eq!(heap.live_bytes(), 3);
    }

    #[test]
    fn realloc_from_and_to_empty() {
        let heap = HeapAllocator::new();
        let mut b = Block::empty();
        heap.realloc(&mut b, 16).unwrap();
        assert_eq!(b.len(), 16);
        assert_eq!(heap.live_blocks(), 1);
        heap.realloc(&mut b, 0).unwrap();
        assert!(b.is_empty());
        assert_eq!(heap.live_blocks(), 0);
    }

    #[test]
    fn free_of_foreign_block_is_rejected() {
        let heap = HeapAllocator::new();
        let other = HeapAllocator::new();
        let b = other.alloc(8).unwrap();
        assert_eq!(heap.free(b), Err(AllocError::ForeignBlock));
        // `other` still owns the leaked block and releases it on drop.
        assert_eq!(other.live_blocks(), 1);
    }

    #[test]
    fn realloc_to_zero_of_foreign_block_leaves_it_untouched() {
        let heap = HeapAllocator::new();
        let other = HeapAllocator::new();
        let mut b = other.alloc(8).unwrap();
        b.as_bytes_mut().fill(7);
        assert_eq!(heap.realloc(&mut b, 0), Err(AllocError::ForeignBlock));
        assert_eq!(b.len(), 8);
        assert!(b.as_bytes().iter().all(|&v| v == 7));
        other.free(b).unwrap();
        assert_eq!(other.live_blocks(), 0);
    }

    #[test]
    fn freeing_out_of_order_keeps_registry_consistent() {
        let heap = HeapAllocator::new();
        let mut blocks: Vec<_> = [8, 16, 32, 64]
            .into_iter()
            .map(|n| heap.alloc(n).unwrap())
            .collect();
        heap.free(blocks.remove(0)).unwrap();
        assert_eq!(heap.live_blocks(), 3);
        assert_eq!(heap.live_bytes(), 16 + 32 + 64);
        for b in blocks.into_iter().rev() {
            heap.free(b).unwrap();
        }
        assert_eq!(heap.live_blocks(), 0);
    }

    #[test]
    fn oversized_request_is_size_overflow() {
        let heap = HeapAllocator::new();
        let err = heap.alloc(usize::MAX).unwrap_err();
        assert_eq!(err, AllocError::SizeOverflow { requested: usize::MAX });
    }

    #[test]
    fn release_all_empties_registry() {
        let mut heap = HeapAllocator::new();
        for size in [8, 16, 32] {
            let _leaked = heap.alloc(size).unwrap();
        }
        assert_eq!(heap.live_blocks(), 3);
        heap.release_all();
        assert_eq!(heap.live_blocks(), 0);
    }

    #[test]
    fn free_all_empties_registry() {
        let heap = HeapAllocator::new();
        drop(heap.alloc(8).unwrap());
        // SAFETY: the only block was dropped above.
        unsafe { heap.free_all().unwrap() };
        assert_eq!(heap.live_blocks(), 0);
    }
}
