//! The adjacency-list graph.

use std::fmt;

use smallvec::SmallVec;
use tessel_alloc::{AllocError, Allocator, Block};

use crate::error::GraphError;
use crate::node::{
    write_ids, NeighborIter, NeighborList, NodeId, NodeRecord, NODE_ID_BYTES, NODE_RECORD_BYTES,
};

/// Neighbor lists up to this length are staged on the stack during `new_node`.
const INLINE_NEIGHBORS: usize = 8;

struct Slot<'a> {
    record: Block<'a>,
    neighbors: Block<'a>,
}

/// An undirected-by-construction graph whose node records and neighbor
/// arrays are allocated from `A`.
///
/// Every node owns a 16-byte [`NodeRecord`] and a packed array of
/// [`NodeId`]s. Adding a neighbor allocates a fresh array one entry longer,
/// copies the old entries and releases the old array when the strategy
/// supports `free` (an arena keeps it until its next reset).
///
/// The graph borrows its allocator for `'a`; all of its blocks are
/// returned when the graph is dropped.
pub struct Graph<'a, A: Allocator + ?Sized> {
    alloc: &'a A,
    slots: Vec<Slot<'a>>,
}

impl<'a, A: Allocator + ?Sized> Graph<'a, A> {
    /// An empty graph drawing memory from `alloc`.
    pub fn new(alloc: &'a A) -> Self {
        Self {
            alloc,
            slots: Vec::new(),
        }
    }

    /// The allocator backing this graph.
    pub fn allocator(&self) -> &'a A {
        self.alloc
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether `node` belongs to this graph.
    pub fn contains(&self, node: NodeId) -> bool {
        (node.0 as usize) < self.slots.len()
    }

    /// Ids of every node, in creation order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.slots.len() as u32).map(NodeId)
    }

    /// Allocate a node record with no neighbors.
    pub fn new_empty_node(&mut self) -> Result<NodeId, GraphError> {
        let id = u32::try_from(self.slots.len())
            .map_err(|_| GraphError::invalid_argument("node id space exhausted"))?;
        let mut record = self.alloc.alloc(NODE_RECORD_BYTES)?;
        NodeRecord::new(id).write(&mut record);
        self.slots.push(Slot {
            record,
            neighbors: Block::empty(),
        });
        tracing::trace!(node = id, strategy = self.alloc.strategy(), "node allocated");
        Ok(NodeId(id))
    }

    /// Copy `ids` into a freshly allocated neighbor array.
    ///
    /// Every id must name an existing node. Repeats are allowed here and
    /// rejected later by [`new_node`](Self::new_node).
    pub fn new_neighbors(&self, ids: &[NodeId]) -> Result<NeighborList<'a>, GraphError> {
        if let Some(missing) = ids.iter().find(|id| !self.contains(**id)) {
            return Err(GraphError::invalid_argument(format!(
                "neighbor {missing} does not exist"
            )));
        }
        let size = ids
            .len()
            .checked_mul(NODE_ID_BYTES)
            .ok_or(AllocError::SizeOverflow {
                requested: usize::MAX,
            })?;
        let mut block = self.alloc.alloc(size)?;
        write_ids(block.as_bytes_mut(), ids.iter().copied());
        Ok(NeighborList::from_block(block))
    }

    /// Attach `neighbors` to `node` and register `node` with every one of
    /// them.
    ///
    /// All-or-nothing: a longer array is prepared for each neighbor before
    /// any node is touched. If a preparation fails, the prepared arrays and
    /// `neighbors` are released and the graph is left exactly as it was.
    /// `node` must not have neighbors yet; its edges could not be removed
    /// from the other side.
    ///
    /// # Errors
    ///
    /// - [`GraphError::InvalidResult`] if `node` is not in the graph.
    /// - [`GraphError::InvalidArgument`] if `node` already has neighbors, or
    ///   if a neighbor is unknown, is `node` itself, or is listed twice.
    /// - [`GraphError::AllocFailed`] if a neighbor array cannot be grown.
    pub fn new_node(&mut self, node: NodeId, neighbors: NeighborList<'a>) -> Result<(), GraphError> {
        let ids: SmallVec<[NodeId; INLINE_NEIGHBORS]> = neighbors.ids().collect();
        if let Err(e) = self.check_new_node(node, &ids) {
            self.discard(neighbors.block);
            return Err(e);
        }

        let mut prepared: SmallVec<[(usize, Block<'a>); INLINE_NEIGHBORS]> = SmallVec::new();
        for id in &ids {
            let target = id.0 as usize;
            match self.extended(target, node) {
                Ok(block) => prepared.push((target, block)),
                Err(e) => {
                    tracing::debug!(
                        %node,
                        failed_at = %id,
                        prepared = prepared.len(),
                        error = %e,
                        "node construction rolled back"
                    );
                    for (_, block) in prepared {
                        self.discard(block);
                    }
                    self.discard(neighbors.block);
                    return Err(e);
                }
            }
        }

        for (target, block) in prepared {
            self.replace_neighbors(target, block);
        }
        self.replace_neighbors(node.0 as usize, neighbors.block);
        tracing::debug!(%node, degree = ids.len(), "node constructed");
        Ok(())
    }

    /// Append `neighbor` to `node`'s neighbor array (one direction only).
    pub fn add_neighbor(&mut self, node: NodeId, neighbor: NodeId) -> Result<(), GraphError> {
        if !self.contains(node) {
            return Err(GraphError::InvalidResult { node });
        }
        if !self.contains(neighbor) {
            return Err(GraphError::invalid_argument(format!(
                "neighbor {neighbor} does not exist"
            )));
        }
        let block = self.extended(node.0 as usize, neighbor)?;
        self.replace_neighbors(node.0 as usize, block);
        tracing::debug!(%node, %neighbor, "neighbor registered");
        Ok(())
    }

    /// The neighbors of `node`, in registration order.
    pub fn neighbors(&self, node: NodeId) -> Result<NeighborIter<'_>, GraphError> {
        let slot = self.slot(node)?;
        Ok(NeighborIter::new(slot.neighbors.as_bytes()))
    }

    /// Number of neighbors of `node`.
    pub fn degree(&self, node: NodeId) -> Result<u32, GraphError> {
        Ok(self.record(node)?.degree)
    }

    /// A copy of `node`'s in-allocator record.
    pub fn record(&self, node: NodeId) -> Result<NodeRecord, GraphError> {
        Ok(NodeRecord::read(&self.slot(node)?.record))
    }

    /// A [`Display`](fmt::Display) view of `node` and its neighbors.
    pub fn display(&self, node: NodeId) -> Result<NodeDisplay<'_, 'a, A>, GraphError> {
        self.slot(node)?;
        Ok(NodeDisplay { graph: self, node })
    }

    fn slot(&self, node: NodeId) -> Result<&Slot<'a>, GraphError> {
        self.slots
            .get(node.0 as usize)
            .ok_or(GraphError::InvalidResult { node })
    }

    fn check_new_node(&self, node: NodeId, ids: &[NodeId]) -> Result<(), GraphError> {
        if !self.contains(node) {
            return Err(GraphError::InvalidResult { node });
        }
        if !self.slots[node.0 as usize].neighbors.is_empty() {
            return Err(GraphError::invalid_argument(format!(
                "node {node} already has neighbors"
            )));
        }
        if let Some(missing) = ids.iter().find(|id| !self.contains(**id)) {
            return Err(GraphError::invalid_argument(format!(
                "neighbor {missing} does not exist"
            )));
        }
        if ids.contains(&node) {
            return Err(GraphError::invalid_argument(format!(
                "node {node} cannot neighbor itself"
            )));
        }
        let mut sorted: SmallVec<[NodeId; INLINE_NEIGHBORS]> = ids.iter().copied().collect();
        sorted.sort_unstable();
        if let Some(pair) = sorted.windows(2).find(|w| w[0] == w[1]) {
            return Err(GraphError::invalid_argument(format!(
                "neighbor {} listed twice",
                pair[0]
            )));
        }
        Ok(())
    }

    /// A copy of `index`'s neighbor array with `added` appended.
    fn extended(&self, index: usize, added: NodeId) -> Result<Block<'a>, GraphError> {
        let current = &self.slots[index].neighbors;
        let old = current.len();
        let size = old
            .checked_add(NODE_ID_BYTES)
            .ok_or(AllocError::SizeOverflow { requested: old })?;
        let mut block = self.alloc.alloc(size)?;
        let bytes = block.as_bytes_mut();
        bytes[..old].copy_from_slice(current.as_bytes());
        write_ids(&mut bytes[old..], [added]);
        Ok(block)
    }

    fn replace_neighbors(&mut self, index: usize, block: Block<'a>) {
        let slot = &mut self.slots[index];
        let old = std::mem::replace(&mut slot.neighbors, block);
        let mut record = NodeRecord::read(&slot.record);
        record.degree = (slot.neighbors.len() / NODE_ID_BYTES) as u32;
        record.revision = record.revision.wrapping_add(1);
        record.write(&mut slot.record);
        self.discard(old);
    }

    fn discard(&self, block: Block<'a>) {
        if block.is_empty() || !self.alloc.capabilities().free {
            return;
        }
        if let Err(e) = self.alloc.free(block) {
            tracing::warn!(error = %e, "graph block not released");
        }
    }
}

impl<A: Allocator + ?Sized> Drop for Graph<'_, A> {
    fn drop(&mut self) {
        for slot in std::mem::take(&mut self.slots) {
            self.discard(slot.neighbors);
            self.discard(slot.record);
        }
    }
}

impl<A: Allocator + ?Sized> fmt::Debug for Graph<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.slots.len())
            .field("strategy", &self.alloc.strategy())
            .finish()
    }
}

/// Renders one node as
///
/// ```text
/// node n4 has 3 neighbors
///     -> [ n1 n2 n3 ]
/// ```
///
/// The second line is omitted for a node without neighbors.
pub struct NodeDisplay<'g, 'a, A: Allocator + ?Sized> {
    graph: &'g Graph<'a, A>,
    node: NodeId,
}

impl<A: Allocator + ?Sized> fmt::Display for NodeDisplay<'_, '_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(neighbors) = self.graph.neighbors(self.node) else {
            return write!(f, "node {} is not part of this graph", self.node);
        };
        write!(f, "node {} has {} neighbors", self.node, neighbors.len())?;
        if neighbors.len() > 0 {
            write!(f, "\n\t-> [")?;
            for id in neighbors {
                write!(f, " {id}")?;
            }
            write!(f, " ]")?;
        }
        Ok(())
    }
}
