use smallvec::SmallVec;

use super::handle::Handle;

// Test builds shrink the thresholds so property tests reach deep,
// split-heavy trees with a few hundred operations.
#[cfg(test)]
pub(crate) const INITIAL_CONTAINERS: usize = 2;
#[cfg(not(test))]
pub(crate) const INITIAL_CONTAINERS: usize = 8;

/// A node holding this many containers must split.
#[cfg(test)]
pub(crate) const CONTAINER_THRESHOLD: usize = 4;
#[cfg(not(test))]
pub(crate) const CONTAINER_THRESHOLD: usize = 16;

/// A container holding more than this many payloads must push down to its
/// child or split.
#[cfg(test)]
pub(crate) const PAYLOAD_THRESHOLD: usize = 4;
#[cfg(not(test))]
pub(crate) const PAYLOAD_THRESHOLD: usize = 64;

/// A growable, ordered array of containers sharing a parent.
///
/// Containers are ordered by their first payload's key. The parent link is
/// a non-owning handle; owning edges always run container → child node.
pub(crate) struct Node {
    parent: Option<Handle>,
    containers: SmallVec<[Handle; INITIAL_CONTAINERS]>,
}

impl Node {
    pub(crate) const fn new(parent: Option<Handle>) -> Self {
        Self {
            parent,
            containers: SmallVec::new_const(),
        }
    }

    #[inline]
    pub(crate) const fn parent(&self) -> Option<Handle> {
        self.parent
    }

    #[inline]
    pub(crate) const fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) fn container_count(&self) -> usize {
        self.containers.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Returns the container handle at the given position.
    #[inline]
    pub(crate) fn container(&self, index: usize) -> Handle {
        self.containers[index]
    }

    /// Inserts a container immediately after the anchor position. An empty
    /// node takes the container as its first element, anchor ignored; this
    /// is the single insertion convention for the whole crate.
    pub(crate) fn insert_after(&mut self, anchor: usize, container: Handle) {
        if self.containers.is_empty() {
            self.containers.push(container);
        } else {
            self.containers.insert(anchor + 1, container);
        }
    }

    /// Appends a container at the end.
    pub(crate) fn push(&mut self, container: Handle) {
        self.containers.push(container);
    }

    /// Removes and returns the container at the given position.
    pub(crate) fn remove(&mut self, index: usize) -> Handle {
        self.containers.remove(index)
    }

    /// Splits off and returns the containers from `at` onward.
    pub(crate) fn split_off(&mut self, at: usize) -> SmallVec<[Handle; INITIAL_CONTAINERS]> {
        self.containers.drain(at..).collect()
    }
}
