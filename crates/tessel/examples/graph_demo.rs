//! Build a four-node graph inside an 8 KiB arena and print every node.
//!
//! ```text
//! RUST_LOG=tessel_graph=debug,tessel_alloc=trace cargo run --example graph_demo
//! ```

use std::error::Error;

use tessel::prelude::*;
use tracing_subscriber::EnvFilter;

const ARENA_SIZE: usize = 8192;

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut arena_buf = vec![0u8; ARENA_SIZE];
    let arena = StackAllocator::new(&mut arena_buf);
    let mut graph = Graph::new(&arena);

    let n1 = graph.new_empty_node()?;
    let n2 = graph.new_empty_node()?;
    let n3 = graph.new_empty_node()?;
    let n4 = graph.new_empty_node()?;

    let wiring: [(NodeId, &[NodeId]); 4] = [
        (n1, &[]),
        (n2, &[n1]),
        (n3, &[n1]),
        (n4, &[n1, n2, n3]),
    ];
    for (node, neighbors) in wiring {
        let list = graph.new_neighbors(neighbors)?;
        if let Err(e) = graph.new_node(node, list) {
            tracing::error!(%node, code = e.code(), error = %e, "error creating new node");
            return Err(e.into());
        }
    }

    for node in graph.node_ids() {
        println!("{}", graph.display(node)?);
    }
    tracing::info!(
        nodes = graph.len(),
        used = arena.used(),
        capacity = arena.capacity(),
        "graph built"
    );
    Ok(())
}
