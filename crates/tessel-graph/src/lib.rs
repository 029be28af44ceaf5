//! Adjacency-list graph on top of Tessel allocators.
//!
//! Each node is a 16-byte [`NodeRecord`] plus a packed array of neighbor
//! [`NodeId`]s, both allocated from the [`Allocator`](tessel_alloc::Allocator)
//! the [`Graph`] was created with:
//!
//! ```text
//! Graph ──► slot n0: [record 16 B] [n1 n3       ]
//!           slot n1: [record 16 B] [n0          ]
//!           slot n2: [record 16 B] [            ]
//!           slot n3: [record 16 B] [n0          ]
//! ```
//!
//! Building a node is a two-step affair: [`Graph::new_neighbors`] copies a
//! list of ids into allocator memory, and [`Graph::new_node`] attaches it
//! and registers the node with each neighbor in turn. Failures are
//! reported as [`GraphError`], each with a stable integer
//! [`code`](GraphError::code).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod error;
pub mod graph;
pub mod node;

pub use error::{GraphError, GraphStatus};
pub use graph::{Graph, NodeDisplay};
pub use node::{NeighborIter, NeighborList, NodeId, NodeRecord, NODE_RECORD_BYTES};
