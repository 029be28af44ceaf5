//! The single-node partial index.

use tessel_alloc::Allocator;

use crate::config::IndexConfig;
use crate::error::IndexError;
use crate::node::IndexNode;

/// A sorted key → value index consisting of one root [`IndexNode`].
///
/// The root's storage is created on the first insert. Once the root holds
/// `max_children - 1` keys further inserts fail with
/// [`IndexError::Full`]; there is no splitting, so this is not a B-tree.
pub struct PartialIndex<'a, A: Allocator + ?Sized> {
    alloc: &'a A,
    config: IndexConfig,
    root: IndexNode<'a, A>,
}

impl<'a, A: Allocator + ?Sized> PartialIndex<'a, A> {
    /// An empty index. The config is validated up front.
    pub fn new(alloc: &'a A, config: IndexConfig) -> Result<Self, IndexError> {
        config.validate()?;
        Ok(Self {
            alloc,
            config,
            root: IndexNode::new(),
        })
    }

    /// The index shape.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// The root node.
    pub fn root(&self) -> &IndexNode<'a, A> {
        &self.root
    }

    /// Number of keys stored.
    pub fn len(&self) -> u32 {
        self.root.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Insert `key` with `value`, returning its sorted position.
    pub fn insert(&mut self, key: u32, value: u64) -> Result<u32, IndexError> {
        if !self.root.is_initialised() {
            self.root.init(self.alloc, &self.config)?;
        }
        let max_keys = self.config.max_keys();
        if self.root.len() >= max_keys {
            tracing::debug!(key, max_keys, "index node full");
            return Err(IndexError::Full { max_keys });
        }
        let at = self.root.insert_key_sorted(key, value)?;
        tracing::trace!(key, position = at, "key inserted");
        Ok(at)
    }

    /// Value stored for `key`.
    pub fn get(&self, key: u32) -> Option<u64> {
        self.root.get(key)
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        self.root.keys()
    }
}
