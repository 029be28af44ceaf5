//! Allocator-backed growable vectors.
//!
//! A vector is a single [`Block`](tessel_alloc::Block) holding a fixed-size
//! header followed by the element storage:
//!
//! ```text
//! ┌──────────────────────────────┬─────────────────────────────────────┐
//! │ VectorHeader (16 bytes)      │ capacity × stride bytes             │
//! │ length │ capacity │ stride │ │ slot 0 │ slot 1 │ ... │ (reserved)  │
//! └──────────────────────────────┴─────────────────────────────────────┘
//! ```
//!
//! Header and storage are obtained, resized and released together through
//! the allocator the vector was created with. There is no global default
//! allocator: every constructor takes one explicitly.
//!
//! # Layers
//!
//! - [`RawVector`]: type-erased, element width (`stride`) is a runtime
//!   value. Elements are byte slices.
//! - [`Vector<T>`]: typed wrapper for [`bytemuck::Pod`] element types.
//!   Elements are read and written by value, so storage never needs to be
//!   aligned for `T`.
//! - [`transcode`]: the in-place element-width migration used by
//!   `map_in_place`, operating on a raw byte buffer.
//!
//! Operations that may relocate storage take `&mut self` (or `self` when
//! the element type changes), so a stale handle cannot be used afterwards.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod header;
pub mod raw;
pub mod transcode;
pub mod typed;

pub use config::VectorParams;
pub use error::VecError;
pub use header::{VectorHeader, HEADER_BYTES};
pub use raw::RawVector;
pub use transcode::Direction;
pub use typed::Vector;
