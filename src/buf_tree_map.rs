//! An ordered key-value index built on a buffered tree.

use core::borrow::Borrow;
use core::fmt;

use crate::raw::RawBufTree;

/// An ordered key-value index that buffers its writes.
///
/// Given a key type with a [total order], a `BufTreeMap` stores `Put` and
/// `Del` records — *payloads* — in a tree of nodes whose key ranges are
/// partitioned into containers. An update is absorbed into the first
/// container responsible for its key, close to the root, and only migrates
/// toward the leaves in batches once a container outgrows its payload
/// threshold. Reads walk the same path and stop at the topmost record for
/// the key, so a freshly buffered update (or delete) always wins over
/// whatever older state is still parked below it.
///
/// This layout trades read work for write throughput: `put` and `del` touch
/// exactly one payload list and never fail, while the structural
/// maintenance — container splits, push-downs, node splits — happens
/// occasionally and in bulk. Deletes are *tombstones*: they shadow older
/// values rather than chasing them down, and are dropped opportunistically
/// during migration once tombstones outnumber live insertions.
///
/// The index grows monotonically under churn; there is no rebalancing on
/// underflow, no sorted iteration, and no range queries.
///
/// # Examples
///
/// ```
/// use buf_tree::BufTreeMap;
///
/// let mut reviews = BufTreeMap::new();
///
/// reviews.put("Office Space", "Deals with real issues in the workplace.");
/// reviews.put("Pulp Fiction", "Masterpiece.");
/// reviews.put("The Godfather", "Very enjoyable.");
///
/// // Reads borrow the live value.
/// assert_eq!(reviews.get("Pulp Fiction"), Some(&"Masterpiece."));
///
/// // A second put replaces in place; the old value is dropped.
/// reviews.put("Pulp Fiction", "Still a masterpiece.");
/// assert_eq!(reviews.get("Pulp Fiction"), Some(&"Still a masterpiece."));
///
/// // A delete shadows the key, even for keys that were never inserted.
/// reviews.del("The Godfather");
/// reviews.del("Les Miserables");
/// assert_eq!(reviews.get("The Godfather"), None);
/// assert_eq!(reviews.get("Les Miserables"), None);
/// ```
///
/// Keys and values are owned by the index from the moment they are handed
/// to [`put`](Self::put) or [`del`](Self::del); they are dropped exactly
/// once, either when replaced, when an elided tombstone is discarded, or
/// when the whole index is dropped.
///
/// It is a logic error for a key to be modified in such a way that its
/// ordering relative to any other key, as determined by the [`Ord`] trait,
/// changes while it is in the index.
///
/// [total order]: https://en.wikipedia.org/wiki/Total_order
pub struct BufTreeMap<K, V> {
    raw: RawBufTree<K, V>,
}

impl<K, V> BufTreeMap<K, V> {
    /// Creates an empty index.
    ///
    /// # Examples
    ///
    /// ```
    /// use buf_tree::BufTreeMap;
    ///
    /// let mut index: BufTreeMap<&str, i32> = BufTreeMap::new();
    /// index.put("a", 1);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            raw: RawBufTree::new(),
        }
    }

    /// Returns the number of node levels from the root to the deepest
    /// leaf. Height only ever grows: it starts at 1 and increases by one
    /// each time the root splits.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns the number of live `Put` payloads across the whole tree.
    ///
    /// This counts buffered records, not distinct visible keys: a value
    /// shadowed by a higher tombstone still counts until migration
    /// physically replaces it.
    #[must_use]
    pub const fn put_count(&self) -> usize {
        self.raw.put_count()
    }

    /// Returns the number of live `Del` payloads (tombstones) across the
    /// whole tree.
    #[must_use]
    pub const fn del_count(&self) -> usize {
        self.raw.del_count()
    }

    /// Returns `true` if the index holds no live `Put` records, in which
    /// case no key is visible.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.put_count() == 0
    }
}

impl<K: Ord, V> BufTreeMap<K, V> {
    /// Inserts a key-value pair, replacing any record already buffered for
    /// the key at the insertion point. The index takes ownership of both;
    /// a displaced value is dropped immediately.
    ///
    /// # Examples
    ///
    /// ```
    /// use buf_tree::BufTreeMap;
    ///
    /// let mut index = BufTreeMap::new();
    /// index.put(37, "a");
    /// index.put(37, "b");
    /// assert_eq!(index.get(&37), Some(&"b"));
    /// ```
    pub fn put(&mut self, key: K, value: V) {
        self.raw.put(key, value);
    }

    /// Returns a reference to the live value for the key, or `None` if the
    /// key is absent or tombstoned.
    ///
    /// The key may be any borrowed form of the index's key type, with
    /// matching `Ord` behavior.
    ///
    /// # Examples
    ///
    /// ```
    /// use buf_tree::BufTreeMap;
    ///
    /// let mut index = BufTreeMap::new();
    /// index.put(1, "a");
    /// assert_eq!(index.get(&1), Some(&"a"));
    /// assert_eq!(index.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(key)
    }

    /// Inserts a tombstone for the key. The tombstone shadows any value
    /// still buffered below it; deleting an absent key is benign. The
    /// index takes ownership of the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use buf_tree::BufTreeMap;
    ///
    /// let mut index = BufTreeMap::new();
    /// index.put(1, "a");
    /// index.del(1);
    /// assert_eq!(index.get(&1), None);
    /// ```
    pub fn del(&mut self, key: K) {
        self.raw.del(key);
    }
}

impl<K, V> Default for BufTreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for BufTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufTreeMap")
            .field("height", &self.height())
            .field("put_count", &self.put_count())
            .field("del_count", &self.del_count())
            .finish()
    }
}
