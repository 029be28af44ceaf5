//! Test utilities and instrumented allocators for Tessel development.
//!
//! Provides wrappers around any [`Allocator`] that count calls
//! ([`CountingAllocator`]) or inject failures ([`FailingAllocator`]), plus
//! buffer fixtures in [`fixtures`].

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::Cell;

use tessel_alloc::{AllocError, Allocator, Block, Capabilities};

/// Per-operation call counts recorded by [`CountingAllocator`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocStats {
    pub allocs: usize,
    pub reallocs: usize,
    pub frees: usize,
    pub free_alls: usize,
}

/// Delegating allocator that counts every call, successful or not.
pub struct CountingAllocator<A> {
    inner: A,
    stats: Cell<AllocStats>,
}

impl<A: Allocator> CountingAllocator<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            stats: Cell::new(AllocStats::default()),
        }
    }

    pub fn stats(&self) -> AllocStats {
        self.stats.get()
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    fn record(&self, update: impl FnOnce(&mut AllocStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }
}

impl<A: Allocator> Allocator for CountingAllocator<A> {
    fn strategy(&self) -> &'static str {
        self.inner.strategy()
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }

    fn alloc(&self, size: usize) -> Result<Block<'_>, AllocError> {
        self.record(|s| s.allocs += 1);
        self.inner.alloc(size)
    }

    fn realloc<'a>(&'a self, block: &mut Block<'a>, new_size: usize) -> Result<(), AllocError> {
        self.record(|s| s.reallocs += 1);
        self.inner.realloc(block, new_size)
    }

    fn free<'a>(&'a self, block: Block<'a>) -> Result<(), AllocError> {
        self.record(|s| s.frees += 1);
        self.inner.free(block)
    }

    #[allow(unsafe_code)]
    unsafe fn free_all(&self) -> Result<(), AllocError> {
        self.record(|s| s.free_alls += 1);
        // SAFETY: forwarded contract; the caller upholds it for our blocks,
        // which are exactly the inner allocator's blocks.
        unsafe { self.inner.free_all() }
    }
}

/// Delegating allocator whose `alloc` succeeds `budget` times and then
/// fails with [`AllocError::AllocationFailed`].
///
/// `realloc` draws from the same budget; `free` and `free_all` always
/// delegate.
pub struct FailingAllocator<A> {
    inner: A,
    budget: Cell<usize>,
}

impl<A: Allocator> FailingAllocator<A> {
    pub fn new(inner: A, budget: usize) -> Self {
        Self {
            inner,
            budget: Cell::new(budget),
        }
    }

    /// Allocations left before failures start.
    pub fn remaining_budget(&self) -> usize {
        self.budget.get()
    }

    /// Refill the budget.
    pub fn set_budget(&self, budget: usize) {
        self.budget.set(budget);
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    fn take(&self, requested: usize) -> Result<(), AllocError> {
        match self.budget.get() {
            0 => Err(AllocError::AllocationFailed { requested }),
            n => {
                self.budget.set(n - 1);
                Ok(())
            }
        }
    }
}

impl<A: Allocator> Allocator for FailingAllocator<A> {
    fn strategy(&self) -> &'static str {
        self.inner.strategy()
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }

    fn alloc(&self, size: usize) -> Result<Block<'_>, AllocError> {
        self.take(size)?;
        self.inner.alloc(size)
    }

    fn realloc<'a>(&'a self, block: &mut Block<'a>, new_size: usize) -> Result<(), AllocError> {
        self.take(new_size)?;
        self.inner.realloc(block, new_size)
    }

    fn free<'a>(&'a self, block: Block<'a>) -> Result<(), AllocError> {
        self.inner.free(block)
    }

    #[allow(unsafe_code)]
    unsafe fn free_all(&self) -> Result<(), AllocError> {
        // SAFETY: forwarded contract.
        unsafe { self.inner.free_all() }
    }
}
