//! Tessel: pluggable allocation strategies and the containers built on them.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Tessel sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use tessel::prelude::*;
//!
//! let mut buf = vec![0u8; 4096];
//! let arena = StackAllocator::new(&mut buf);
//!
//! let mut v: Vector<'_, u32, _> = Vector::with_capacity(&arena, 4).unwrap();
//! for x in 0..5 {
//!     v.push(x).unwrap();
//! }
//! assert_eq!(v.capacity(), 8);
//!
//! // Re-encode in place as (u32, u32) pairs, then back.
//! let pairs = v.map_in_place(|x| [x, x * x]).unwrap();
//! assert_eq!(pairs.get(4).unwrap(), [4, 16]);
//! let squares = pairs.map_in_place(|[_, sq]: [u32; 2]| sq).unwrap();
//! assert_eq!(squares.iter().collect::<Vec<_>>(), vec![0, 1, 4, 9, 16]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`alloc`] | `tessel-alloc` | `Allocator`, `StackAllocator`, `HeapAllocator`, `Block` |
//! | [`vec`] | `tessel-vec` | `RawVector`, `Vector<T>`, stride migration |
//! | [`graph`] | `tessel-graph` | Adjacency-list `Graph` with status codes |
//! | [`index`] | `tessel-index` | Partial sorted-key index |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Allocation strategies (`tessel-alloc`).
///
/// [`alloc::StackAllocator`] bumps through a caller-owned buffer;
/// [`alloc::HeapAllocator`] wraps the global allocator with a live-block
/// registry.
pub use tessel_alloc as alloc;

/// Allocator-backed vectors (`tessel-vec`).
///
/// [`vec::Vector`] for `Pod` element types, [`vec::RawVector`] when the
/// element width is only known at runtime.
pub use tessel_vec as vec;

/// Adjacency-list graph (`tessel-graph`).
pub use tessel_graph as graph;

/// Partial sorted-key index (`tessel-index`).
pub use tessel_index as index;

/// Common imports for typical Tessel usage.
///
/// ```rust
/// use tessel::prelude::*;
/// ```
pub mod prelude {
    // Allocation
    pub use tessel_alloc::{
        AllocError, Allocator, ArenaConfig, Block, Capabilities, HeapAllocator, StackAllocator,
    };

    // Vectors
    pub use tessel_vec::{Direction, RawVector, VecError, Vector, VectorParams};

    // Graph
    pub use tessel_graph::{Graph, GraphError, GraphStatus, NodeId};

    // Index
    pub use tessel_index::{IndexConfig, IndexError, IndexStatus, PartialIndex};
}
