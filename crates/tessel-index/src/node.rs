//! A single index node: parallel child, key and value vectors.

use std::fmt;

use tessel_alloc::Allocator;
use tessel_vec::Vector;

use crate::config::IndexConfig;
use crate::error::IndexError;

/// One node of the index.
///
/// `keys` is kept sorted ascending; `values[i]` belongs to `keys[i]`.
/// `children` holds node links, sized for `max_children`, but stays empty:
/// nodes never split.
///
/// All three vectors are created together by [`init`](Self::init) and are
/// absent before that.
pub struct IndexNode<'a, A: Allocator + ?Sized> {
    children: Option<Vector<'a, u32, A>>,
    keys: Option<Vector<'a, u32, A>>,
    values: Option<Vector<'a, u64, A>>,
}

impl<'a, A: Allocator + ?Sized> IndexNode<'a, A> {
    /// A node without storage.
    pub fn new() -> Self {
        Self {
            children: None,
            keys: None,
            values: None,
        }
    }

    /// Whether [`init`](Self::init) has run.
    pub fn is_initialised(&self) -> bool {
        self.children.is_some() || self.keys.is_some() || self.values.is_some()
    }

    /// Create the child, key and value vectors in `alloc`.
    ///
    /// Fails with [`IndexError::RedundantInit`] if any of them already
    /// exists; existing storage is never overwritten.
    pub fn init(&mut self, alloc: &'a A, config: &IndexConfig) -> Result<(), IndexError> {
        if self.is_initialised() {
            return Err(IndexError::RedundantInit);
        }
        config.validate()?;
        let max_keys = config.max_keys();
        let children = Vector::with_capacity(alloc, config.max_children)?;
        let keys = Vector::with_capacity(alloc, max_keys)?;
        let values = Vector::with_capacity(alloc, max_keys)?;
        self.children = Some(children);
        self.keys = Some(keys);
        self.values = Some(values);
        tracing::debug!(
            max_children = config.max_children,
            strategy = alloc.strategy(),
            "index node initialised"
        );
        Ok(())
    }

    /// Number of keys.
    pub fn len(&self) -> u32 {
        self.keys.as_ref().map_or(0, |k| k.len())
    }

    /// Whether the node holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of child links (always `0`: nodes never split).
    pub fn child_count(&self) -> u32 {
        self.children.as_ref().map_or(0, |c| c.len())
    }

    /// The keys, ascending.
    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        self.keys.iter().flat_map(|k| k.iter())
    }

    /// Position of the first key `>= key`, i.e. where `key` belongs.
    pub fn search(&self, key: u32) -> u32 {
        self.keys().take_while(|k| *k < key).count() as u32
    }

    /// Value stored for `key`.
    pub fn get(&self, key: u32) -> Option<u64> {
        let at = self.search(key);
        let keys = self.keys.as_ref()?;
        if keys.get(at).ok()? != key {
            return None;
        }
        self.values.as_ref()?.get(at).ok()
    }

    /// Insert `key` at its sorted position, shifting larger keys right, and
    /// store `value` at the same position.
    ///
    /// Returns the position. The node must be initialised; duplicate keys
    /// are refused with [`IndexError::Failure`].
    pub fn insert_key_sorted(&mut self, key: u32, value: u64) -> Result<u32, IndexError> {
        let at = self.search(key);
        let (Some(keys), Some(values)) = (self.keys.as_mut(), self.values.as_mut()) else {
            return Err(IndexError::Failure {
                reason: "node is not initialised".into(),
            });
        };
        if keys.get(at).is_ok_and(|k| k == key) {
            return Err(IndexError::Failure {
                reason: format!("key {key} already present"),
            });
        }
        keys.insert(at, key)?;
        if let Err(e) = values.insert(at, value) {
            // Keep the parallel vectors the same length.
            remove_at(keys, at)?;
            return Err(e.into());
        }
        Ok(at)
    }
}

impl<A: Allocator + ?Sized> Default for IndexNode<'_, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator + ?Sized> fmt::Debug for IndexNode<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexNode")
            .field("initialised", &self.is_initialised())
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Remove the element at `at` by shifting the tail left and popping.
fn remove_at<A: Allocator + ?Sized>(v: &mut Vector<'_, u32, A>, at: u32) -> Result<(), IndexError> {
    for i in at..v.len().saturating_sub(1) {
        let next = v.get(i + 1)?;
        v.set(i, next)?;
    }
    v.pop()?;
    Ok(())
}
