//! Owned handles to allocator-issued byte ranges.

#![allow(unsafe_code)]

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

/// A range of bytes issued by an [`Allocator`](crate::Allocator).
///
/// Blocks are move-only: handing one to `free` consumes it, so the same
/// block cannot be released twice. A block borrows its allocator for `'a`
/// and therefore cannot outlive it.
///
/// Invariant: while a `Block` is live, `ptr..ptr + len` is initialised
/// memory that no other live block overlaps. Only `unsafe`
/// [`Allocator::free_all`](crate::Allocator::free_all) can break this, and
/// its contract forbids touching outstanding blocks afterwards.
///
/// Dropping a block without passing it back to its allocator leaks it until
/// the allocator's bulk release (or the allocator's own drop).
#[must_use]
pub struct Block<'a> {
    ptr: NonNull<u8>,
    len: usize,
    _owner: PhantomData<&'a ()>,
}

impl<'a> Block<'a> {
    /// Wrap a raw range.
    ///
    /// # Safety
    ///
    /// `ptr` must point to `len` initialised bytes that stay valid and
    /// unaliased by any other live block for `'a`.
    pub(crate) unsafe fn from_raw_parts(ptr: NonNull<u8>, len: usize) -> Self {
        Self {
            ptr,
            len,
            _owner: PhantomData,
        }
    }

    /// A zero-length block that owns no memory.
    pub fn empty() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            _owner: PhantomData,
        }
    }

    /// Length of the block in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the block is zero-length.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Start address of the block.
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// The block's bytes.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: type invariant, `ptr` covers `len` initialised bytes owned
        // by this block alone (dangling + 0 is valid for the empty block).
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The block's bytes, mutably.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as for `as_bytes`; `&mut self` guarantees exclusivity.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    pub(crate) fn non_null(&self) -> NonNull<u8> {
        self.ptr
    }

    pub(crate) fn addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }
}

impl fmt::Debug for Block<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}
