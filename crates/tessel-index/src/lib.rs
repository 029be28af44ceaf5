//! A partial sorted-key index built on Tessel vectors.
//!
//! This is the working fragment of a B-tree: one node whose child, key and
//! value storage are [`Vector`](tessel_vec::Vector)s in a caller-supplied
//! allocator. Keys are inserted in sorted position with `insert`-at
//! shifting; nodes never split or rebalance, so the index holds at most
//! `max_children - 1` keys.
//!
//! Errors carry the status codes and labels `SUCCESS`, `FAILURE`,
//! `REDUNDANT_INIT` and `FULL` (see [`IndexStatus`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod index;
pub mod node;

pub use config::{ConfigError, IndexConfig};
pub use error::{IndexError, IndexStatus};
pub use index::PartialIndex;
pub use node::IndexNode;
