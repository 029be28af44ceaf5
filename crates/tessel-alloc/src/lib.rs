//! Pluggable allocation strategies for Tessel containers.
//!
//! An [`Allocator`] hands out [`Block`]s: owned, move-only views of raw byte
//! ranges. Two strategies are provided:
//!
//! ```text
//! Allocator (trait, &self + interior mutability, single-threaded)
//! ├── StackAllocator<'buf>  bump cursor over a caller-owned &mut [u8]
//! │                         alloc + free_all only
//! └── HeapAllocator         global allocator + live-block registry
//!                           alloc + realloc + free + free_all
//! ```
//!
//! # Block lifetimes
//!
//! Every [`Block`] borrows the allocator that issued it, so a block can never
//! outlive its allocator (and, for the arena, the arena's buffer). Bulk
//! reclamation comes in two flavours:
//!
//! - [`StackAllocator::reset`] / [`HeapAllocator::release_all`] take
//!   `&mut self`, which the borrow checker only grants once every block is
//!   gone. These are safe.
//! - [`Allocator::free_all`] takes `&self` and is `unsafe`: the caller
//!   promises that no outstanding block is used afterwards.
//!
//! # Unsafe policy
//!
//! `unsafe` is confined to [`block`], [`stack`] and [`heap`], each with a
//! module-level allow and a `// SAFETY:` comment per block.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod allocator;
pub mod block;
pub mod config;
pub mod error;
pub mod heap;
pub mod stack;

pub use allocator::{Allocator, Capabilities};
pub use block::Block;
pub use config::ArenaConfig;
pub use error::AllocError;
pub use heap::HeapAllocator;
pub use stack::StackAllocator;
