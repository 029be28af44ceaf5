//! Benchmark workloads for the Tessel allocators and containers.
//!
//! - [`arena_bytes_for`]: arena size that fits a vector through its growth
//!   sequence without running out of space
//! - [`fill_u32`]: append `0..count` to a typed vector
//! - [`star_graph`]: a hub node with `spokes` neighbors, built edge by edge

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tessel_alloc::Allocator;
use tessel_graph::{Graph, GraphError, NodeId};
use tessel_vec::{VecError, Vector, HEADER_BYTES};

/// Arena bytes needed to grow a vector of `stride`-byte elements from
/// `initial` slots until it holds `count`, keeping every abandoned block.
pub fn arena_bytes_for(initial: u32, count: u32, stride: usize) -> usize {
    let mut capacity = initial.max(1);
    let mut total = HEADER_BYTES + capacity as usize * stride;
    while capacity < count {
        capacity *= 2;
        total += HEADER_BYTES + capacity as usize * stride;
    }
    total
}

/// Append `0..count` to `v`.
pub fn fill_u32<A: Allocator + ?Sized>(v: &mut Vector<'_, u32, A>, count: u32) -> Result<(), VecError> {
    for x in 0..count {
        v.push(x)?;
    }
    Ok(())
}

/// Build a star: node 0 plus `spokes` nodes, each registered with the hub.
pub fn star_graph<'a, A: Allocator + ?Sized>(
    alloc: &'a A,
    spokes: u32,
) -> Result<Graph<'a, A>, GraphError> {
    let mut graph = Graph::new(alloc);
    let hub: NodeId = graph.new_empty_node()?;
    for _ in 0..spokes {
        let spoke = graph.new_empty_node()?;
        let list = graph.new_neighbors(&[hub])?;
        graph.new_node(spoke, list)?;
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_alloc::{HeapAllocator, StackAllocator};

    #[test]
    fn arena_sizing_covers_growth() {
        let mut buf = vec![0u8; arena_bytes_for(4, 100, 4)];
        let arena = StackAllocator::new(&mut buf);
        let mut v = Vector::with_capacity(&arena, 4).unwrap();
        fill_u32(&mut v, 100).unwrap();
        assert_eq!(v.len(), 100);
    }

    #[test]
    fn star_hub_sees_every_spoke() {
        let heap = HeapAllocator::new();
        let g = star_graph(&heap, 10).unwrap();
        assert_eq!(g.degree(NodeId(0)).unwrap(), 10);
    }
}
