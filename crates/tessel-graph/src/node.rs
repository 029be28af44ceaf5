//! Node identifiers, the in-allocator node record, and neighbor arrays.

use std::fmt;

use bytemuck::{Pod, Zeroable};
use tessel_alloc::Block;

/// Identifies a node within one [`Graph`](crate::Graph).
///
/// Nodes are numbered in creation order; `NodeId(n)` is the n-th node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Bytes one [`NodeId`] occupies inside a neighbor array.
pub const NODE_ID_BYTES: usize = std::mem::size_of::<u32>();

/// The 16-byte record stored in the allocator for every node.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct NodeRecord {
    /// The node's own id.
    pub id: u32,
    /// Number of entries in the node's neighbor array.
    pub degree: u32,
    /// Bumped every time the neighbor array is replaced.
    pub revision: u32,
    reserved: u32,
}

/// Size of a [`NodeRecord`] in bytes.
pub const NODE_RECORD_BYTES: usize = std::mem::size_of::<NodeRecord>();

const _: () = assert!(NODE_RECORD_BYTES == 16);

impl NodeRecord {
    pub(crate) fn new(id: u32) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub(crate) fn read(block: &Block<'_>) -> Self {
        bytemuck::pod_read_unaligned(&block.as_bytes()[..NODE_RECORD_BYTES])
    }

    pub(crate) fn write(&self, block: &mut Block<'_>) {
        block.as_bytes_mut()[..NODE_RECORD_BYTES].copy_from_slice(bytemuck::bytes_of(self));
    }
}

/// An allocator-backed array of neighbor ids, not yet attached to a node.
///
/// Produced by [`Graph::new_neighbors`](crate::Graph::new_neighbors) and
/// consumed by [`Graph::new_node`](crate::Graph::new_node).
#[must_use]
pub struct NeighborList<'a> {
    pub(crate) block: Block<'a>,
}

impl<'a> NeighborList<'a> {
    pub(crate) fn from_block(block: Block<'a>) -> Self {
        Self { block }
    }

    /// Number of ids in the list.
    pub fn len(&self) -> usize {
        self.block.len() / NODE_ID_BYTES
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    /// The ids, in order.
    pub fn ids(&self) -> NeighborIter<'_> {
        NeighborIter::new(self.block.as_bytes())
    }

    /// Size of the backing block in bytes.
    pub fn byte_len(&self) -> usize {
        self.block.len()
    }
}

impl fmt::Debug for NeighborList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

/// Iterator over the ids packed in a neighbor array.
#[derive(Clone)]
pub struct NeighborIter<'b> {
    chunks: std::slice::ChunksExact<'b, u8>,
}

impl<'b> NeighborIter<'b> {
    pub(crate) fn new(bytes: &'b [u8]) -> Self {
        Self {
            chunks: bytes.chunks_exact(NODE_ID_BYTES),
        }
    }
}

impl Iterator for NeighborIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.chunks
            .next()
            .map(|c| NodeId(bytemuck::pod_read_unaligned(c)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for NeighborIter<'_> {}

pub(crate) fn write_ids(dst: &mut [u8], ids: impl IntoIterator<Item = NodeId>) {
    for (slot, id) in dst.chunks_exact_mut(NODE_ID_BYTES).zip(ids) {
        slot.copy_from_slice(&id.0.to_ne_bytes());
    }
}
