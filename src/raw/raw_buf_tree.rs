use core::borrow::Borrow;
use core::cmp::Ordering;

use alloc::vec::Vec;
use smallvec::SmallVec;

use super::arena::Arena;
use super::container::Container;
use super::handle::Handle;
use super::node::{CONTAINER_THRESHOLD, Node, PAYLOAD_THRESHOLD};
use super::payload::{Payload, PayloadKind};

/// The core buffered tree backing `BufTreeMap`.
///
/// Updates are buffered near the root: `put` and `del` append a payload to
/// the responsible container of the root node and return. Structural work
/// happens in batches — a container that outgrows `PAYLOAD_THRESHOLD`
/// either pushes half of its payloads into its child or splits in place,
/// and a node that accumulates `CONTAINER_THRESHOLD` containers splits,
/// promoting a separator container into its parent.
pub(crate) struct RawBufTree<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node>,
    /// Arena storing all containers.
    containers: Arena<Container>,
    /// Arena storing all payloads; slots recycle on replace and elision.
    payloads: Arena<Payload<K, V>>,
    root: Handle,
    /// Length of the longest root-to-leaf path, in nodes. Grows only when
    /// the root splits; never shrinks.
    height: usize,
    /// Live `Put` payloads across the whole tree.
    put_count: usize,
    /// Live `Del` payloads across the whole tree.
    del_count: usize,
    /// Nodes whose container count may have crossed the split threshold.
    /// Splitting re-sorts container arrays, so it is deferred until the
    /// payload-level work of the current operation has finished.
    pending_splits: Vec<Handle>,
}

/// Result of walking a container's payload list for a key.
enum ListSearch {
    /// A payload with an equal key, plus its predecessor in the list.
    Found { prev: Option<Handle>, hit: Handle },
    /// No equal key; `prev` is the last payload with a smaller key, absent
    /// when the probe key sorts before the whole list.
    NotFound { prev: Option<Handle> },
}

impl<K, V> RawBufTree<K, V> {
    pub(crate) fn new() -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::new(None));
        Self {
            nodes,
            containers: Arena::new(),
            payloads: Arena::new(),
            root,
            height: 1,
            put_count: 0,
            del_count: 0,
            pending_splits: Vec::new(),
        }
    }

    pub(crate) const fn height(&self) -> usize {
        self.height
    }

    pub(crate) const fn put_count(&self) -> usize {
        self.put_count
    }

    pub(crate) const fn del_count(&self) -> usize {
        self.del_count
    }

    fn payload_create(&mut self, payload: Payload<K, V>) -> Handle {
        match payload.kind() {
            PayloadKind::Put => self.put_count += 1,
            PayloadKind::Del => self.del_count += 1,
        }
        self.payloads.alloc(payload)
    }

    /// Destroys a payload, dropping its key and any value it still owns.
    /// The payload must already be unlinked from every list.
    fn payload_free(&mut self, payload: Handle) {
        let payload = self.payloads.take(payload);
        match payload.kind() {
            PayloadKind::Put => self.put_count -= 1,
            PayloadKind::Del => self.del_count -= 1,
        }
    }

    /// Replaces a resident payload's value and kind with the incoming
    /// payload's, then destroys the incoming payload together with the
    /// displaced value. Swapping the kind along with the value keeps the
    /// Put/Del counters exact when an update flips a key between the two.
    fn payload_replace(&mut self, resident: Handle, incoming: Handle) {
        let mut incoming = self.payloads.take(incoming);
        self.payloads.get_mut(resident).swap_val_and_kind(&mut incoming);
        match incoming.kind() {
            PayloadKind::Put => self.put_count -= 1,
            PayloadKind::Del => self.del_count -= 1,
        }
        // `incoming` drops here, releasing its key and the displaced value.
    }

    /// First payload key of a container; the container's separator within
    /// its node. Containers are never observably empty.
    fn container_first_key(&self, container: Handle) -> &K {
        let head = self.containers.get(container).payload_first().expect("container has no payloads");
        self.payloads.get(head).key()
    }

    fn reparent_child(&mut self, container: Handle, parent: Handle) {
        if let Some(child) = self.containers.get(container).child() {
            self.nodes.get_mut(child).set_parent(Some(parent));
        }
    }
}

impl<K: Ord, V> RawBufTree<K, V> {
    /// Walks a payload list for `key`, keeping the predecessor.
    fn locate<Q>(&self, head: Option<Handle>, key: &Q) -> ListSearch
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut prev = None;
        let mut curr = head;

        while let Some(h) = curr {
            let payload = self.payloads.get(h);
            match payload.key().borrow().cmp(key) {
                Ordering::Equal => return ListSearch::Found { prev, hit: h },
                Ordering::Greater => return ListSearch::NotFound { prev },
                Ordering::Less => {
                    prev = Some(h);
                    curr = payload.next();
                }
            }
        }

        ListSearch::NotFound { prev }
    }

    /// Index of the container responsible for `key` within `node`: the
    /// largest index `i >= start` whose first payload key is `<= key`. The
    /// leftmost container owns everything below its own first key. The
    /// scan is linear; container counts stay near `CONTAINER_THRESHOLD`.
    fn find_container<Q>(&self, node: Handle, key: &Q, start: usize) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let count = self.nodes.get(node).container_count();
        let mut i = start.min(count);

        while i < count {
            let container = self.nodes.get(node).container(i);
            if self.container_first_key(container).borrow() > key {
                break;
            }
            i += 1;
        }

        if i == 0 { 0 } else { i - 1 }
    }

    pub(crate) fn put(&mut self, key: K, val: V) {
        let payload = self.payload_create(Payload::put(key, val));
        let idx = {
            let key = self.payloads.get(payload).key();
            self.find_container(self.root, key, 0)
        };
        self.container_insert(self.root, idx, payload, false);
        self.drain_pending_splits();
    }

    pub(crate) fn del(&mut self, key: K) {
        let payload = self.payload_create(Payload::del(key));
        let idx = {
            let key = self.payloads.get(payload).key();
            self.find_container(self.root, key, 0)
        };
        self.container_insert(self.root, idx, payload, false);
        self.drain_pending_splits();
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let idx = self.find_container(self.root, key, 0);
        self.container_get(self.root, idx, key)
    }

    fn container_get<Q>(&self, node: Handle, idx: usize, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if idx >= self.nodes.get(node).container_count() {
            return None;
        }

        let container = self.nodes.get(node).container(idx);
        match self.locate(self.containers.get(container).payload_first(), key) {
            ListSearch::Found { hit, .. } => {
                let payload = self.payloads.get(hit);
                match payload.kind() {
                    PayloadKind::Put => payload.val(),
                    // A tombstone shadows anything still buffered below.
                    PayloadKind::Del => None,
                }
            }
            ListSearch::NotFound { .. } => {
                let child = self.containers.get(container).child()?;
                let idx = self.find_container(child, key, 0);
                self.container_get(child, idx, key)
            }
        }
    }

    /// Inserts a payload into `node`'s container at `idx`, replacing in
    /// place on a duplicate key. With `defer_overflow` the container is
    /// allowed to exceed `PAYLOAD_THRESHOLD`; that mode is used while a
    /// node split re-sorts payloads between siblings, where structural
    /// changes underneath the re-sort would corrupt it. Overweight
    /// containers are picked up again by the next insert that lands on
    /// them with overflow handling enabled.
    fn container_insert(&mut self, node: Handle, idx: usize, new_payload: Handle, defer_overflow: bool) {
        let (target, target_idx) = if self.nodes.get(node).is_empty() {
            // First insert into a fresh node; the probe index is a don't-care.
            let container = self.containers.alloc(Container::new());
            self.nodes.get_mut(node).insert_after(0, container);
            (container, 0)
        } else {
            debug_assert!(idx < self.nodes.get(node).container_count());
            (self.nodes.get(node).container(idx), idx)
        };

        let search = {
            let key = self.payloads.get(new_payload).key();
            self.locate(self.containers.get(target).payload_first(), key)
        };

        match search {
            ListSearch::Found { hit, .. } => {
                self.payload_replace(hit, new_payload);
            }
            ListSearch::NotFound { prev } => {
                match prev {
                    Some(prev) => {
                        let next = self.payloads.get(prev).next();
                        self.payloads.get_mut(new_payload).set_next(next);
                        self.payloads.get_mut(prev).set_next(Some(new_payload));
                    }
                    None => {
                        let head = self.containers.get(target).payload_first();
                        self.payloads.get_mut(new_payload).set_next(head);
                        self.containers.get_mut(target).set_payload_first(Some(new_payload));
                    }
                }
                self.containers.get_mut(target).inc_payload_size();
            }
        }

        if defer_overflow {
            return;
        }
        if self.containers.get(target).payload_size() > PAYLOAD_THRESHOLD {
            if self.containers.get(target).child().is_some() {
                self.push_to_child(node, target_idx);
            } else {
                self.split_container(node, target_idx);
            }
        }
    }

    /// Migrates half of a container's payloads into its child node. The
    /// container's first payload stays put — it pins the separator key —
    /// so everything that moves is strictly greater than it.
    fn push_to_child(&mut self, node: Handle, cont_idx: usize) {
        let container = self.nodes.get(node).container(cont_idx);
        let child = self.containers.get(container).child().expect("push_to_child requires a child");
        let size = self.containers.get(container).payload_size();
        let push_count = size / 2;

        // Detach the moving run up front; reinserting while still walking
        // the parent list would alias the links being rewritten.
        let head = self.containers.get(container).payload_first().expect("container has no payloads");
        let mut moving: SmallVec<[Handle; PAYLOAD_THRESHOLD / 2]> = SmallVec::new();
        let mut curr = self.payloads.get(head).next();
        for _ in 0..push_count {
            let h = curr.expect("payload_size overstates the list");
            curr = self.payloads.get(h).next();
            moving.push(h);
        }
        self.payloads.get_mut(head).set_next(curr);
        self.containers.get_mut(container).set_payload_size(size - push_count);

        // Sampled once at the start of the push: while tombstones dominate,
        // pushing a Del further down is pointless and it is dropped instead.
        let elide_tombstones = self.del_count > self.put_count;

        // The moving payloads are in ascending order, so each search can
        // resume from the previous container index.
        let mut child_idx = 0;
        for h in moving {
            self.payloads.get_mut(h).set_next(None);
            if elide_tombstones && self.payloads.get(h).kind() == PayloadKind::Del {
                self.payload_free(h);
                continue;
            }
            child_idx = {
                let key = self.payloads.get(h).key();
                self.find_container(child, key, child_idx)
            };
            self.container_insert(child, child_idx, h, false);
        }
    }

    /// Splits an overweight container with no child: a new sibling
    /// container takes the upper half of the payload list and slots in
    /// immediately after. The node is queued for a split check.
    fn split_container(&mut self, node: Handle, cont_idx: usize) {
        let target = self.nodes.get(node).container(cont_idx);
        let size = self.containers.get(target).payload_size();
        let keep = size / 2;

        let mut tail = self.containers.get(target).payload_first().expect("container has no payloads");
        for _ in 0..keep - 1 {
            tail = self.payloads.get(tail).next().expect("payload_size overstates the list");
        }
        let moved = self.payloads.get(tail).next();
        self.payloads.get_mut(tail).set_next(None);

        let sibling = self.containers.alloc(Container::with_payloads(moved, size - keep));
        self.nodes.get_mut(node).insert_after(cont_idx, sibling);
        self.containers.get_mut(target).set_payload_size(keep);

        self.pending_splits.push(node);
    }

    fn drain_pending_splits(&mut self) {
        while let Some(node) = self.pending_splits.pop() {
            self.try_split_node(node);
        }
    }

    /// True if the container can yield a separator one level up: either by
    /// giving up its first payload, or by moving wholesale when it has
    /// nothing else to keep and no subtree to strand.
    fn can_promote(&self, container: Handle) -> bool {
        let container = self.containers.get(container);
        container.payload_size() >= 2 || container.child().is_none()
    }

    /// Detaches the first payload of `container` into a fresh one-payload
    /// container that can act as a separator one level up. Returns `None`
    /// when there is only one payload and the caller must promote the
    /// container wholesale.
    fn detach_separator(&mut self, container: Handle) -> Option<Handle> {
        let size = self.containers.get(container).payload_size();
        if size < 2 {
            return None;
        }

        let head = self.containers.get(container).payload_first().expect("container has no payloads");
        let rest = self.payloads.get(head).next();
        self.payloads.get_mut(head).set_next(None);

        let container = self.containers.get_mut(container);
        container.set_payload_first(rest);
        container.set_payload_size(size - 1);

        Some(self.containers.alloc(Container::with_payloads(Some(head), 1)))
    }

    /// Splits a node that reached `CONTAINER_THRESHOLD`: a separator for
    /// the middle container is promoted into the parent and the upper
    /// containers move to a fresh sibling node hanging off the separator.
    /// The split container itself stays with the sibling as its leftmost
    /// run, keeping its own subtree reachable; a one-payload childless
    /// container is promoted wholesale instead. Splitting the root rehomes
    /// the old root under a promoted leftmost separator and grows the tree
    /// by one level.
    fn try_split_node(&mut self, node: Handle) {
        let count = self.nodes.get(node).container_count();
        if count < CONTAINER_THRESHOLD {
            return;
        }

        // A leftmost child covers its parent's unbounded low range, so a
        // separator promoted out of it must still sort above the parent's
        // own leftmost separator or the parent's ordering breaks.
        let parent = self.nodes.get(node).parent();
        let parent_bound = parent.and_then(|p| {
            let first = self.nodes.get(p).container(0);
            (self.containers.get(first).child() == Some(node)).then(|| self.container_first_key(first))
        });

        // Prefer the midpoint, shifting outward when the candidate cannot
        // yield a separator. No candidate at all leaves the node
        // overweight until later traffic changes its shape.
        let mid = count / 2;
        let Some(split_at) = (1..count)
            .filter(|&i| {
                let container = self.nodes.get(node).container(i);
                self.can_promote(container)
                    && parent_bound.is_none_or(|bound| self.container_first_key(container) > bound)
            })
            .min_by_key(|&i| i.abs_diff(mid))
        else {
            return;
        };
        let is_root = node == self.root;
        if is_root && !self.can_promote(self.nodes.get(node).container(0)) && !self.refill_leftmost(node) {
            return;
        }

        let sibling = self.nodes.alloc(Node::new(parent));
        let split_cont = self.nodes.get(node).container(split_at);
        let (promoted, keep_split_cont) = match self.detach_separator(split_cont) {
            Some(separator) => (separator, true),
            // Single payload, no child: the reference move, safe here.
            None => (split_cont, false),
        };

        let moved = self.nodes.get_mut(node).split_off(split_at);
        let into_sibling = if keep_split_cont { &moved[..] } else { &moved[1..] };
        for &container in into_sibling {
            self.nodes.get_mut(sibling).push(container);
            self.reparent_child(container, sibling);
        }
        self.containers.get_mut(promoted).set_child(Some(sibling));

        if is_root {
            let new_root = self.nodes.alloc(Node::new(None));
            let first = self.nodes.get(node).container(0);
            let leftmost = match self.detach_separator(first) {
                Some(separator) => separator,
                None => self.nodes.get_mut(node).remove(0),
            };
            self.containers.get_mut(leftmost).set_child(Some(node));
            self.nodes.get_mut(new_root).push(leftmost);
            self.nodes.get_mut(new_root).push(promoted);
            self.nodes.get_mut(node).set_parent(Some(new_root));
            self.nodes.get_mut(sibling).set_parent(Some(new_root));
            self.root = new_root;
            self.height += 1;
        } else {
            let parent = parent.expect("non-root node has a parent");
            let at = {
                let key = self.container_first_key(promoted);
                self.find_container(parent, key, 0)
            };
            self.nodes.get_mut(parent).insert_after(at, promoted);
            self.order_container_payload(parent, at, at + 1);
            self.try_split_node(parent);
        }
    }

    /// Tops up a one-payload leftmost container that cannot yield a root
    /// separator without stranding its subtree: the head of its child's
    /// leftmost run moves up one level, giving the container a second
    /// payload to detach. A quiet leftmost separator would otherwise block
    /// every future root split. Returns `false` when no donor payload is
    /// available; the split is skipped for this round.
    fn refill_leftmost(&mut self, node: Handle) -> bool {
        let first = self.nodes.get(node).container(0);
        let Some(child) = self.containers.get(first).child() else {
            return false;
        };
        if self.nodes.get(child).is_empty() {
            return false;
        }

        let donor = self.nodes.get(child).container(0);
        if self.containers.get(donor).payload_size() < 2 {
            return false;
        }

        let first_head = self.containers.get(first).payload_first().expect("container has no payloads");
        let donor_head = self.containers.get(donor).payload_first().expect("container has no payloads");
        // The same key one level down would be a shadowed duplicate, not a
        // second payload.
        if self.payloads.get(donor_head).key() == self.payloads.get(first_head).key() {
            return false;
        }

        let rest = self.payloads.get(donor_head).next();
        self.containers.get_mut(donor).set_payload_first(rest);
        self.containers.get_mut(donor).dec_payload_size();

        // Two-element splice; the donor key has no fixed order against the
        // resident one, since a leftmost run is unbounded below.
        if self.payloads.get(donor_head).key() < self.payloads.get(first_head).key() {
            self.payloads.get_mut(donor_head).set_next(Some(first_head));
            self.containers.get_mut(first).set_payload_first(Some(donor_head));
        } else {
            self.payloads.get_mut(donor_head).set_next(None);
            self.payloads.get_mut(first_head).set_next(Some(donor_head));
        }
        self.containers.get_mut(first).inc_payload_size();

        true
    }

    /// Re-sorts payloads after a separator container lands between two
    /// siblings: everything in `left` at or above the separator key moves
    /// into the new `right` container so adjacent ranges stay disjoint.
    /// A payload equal to the separator key is absorbed by `right`'s head
    /// (the left copy is the newer overlay; its value and kind win).
    fn order_container_payload(&mut self, node: Handle, left_idx: usize, right_idx: usize) {
        let left = self.nodes.get(node).container(left_idx);
        let right = self.nodes.get(node).container(right_idx);
        let right_head = self.containers.get(right).payload_first().expect("container has no payloads");

        let search = {
            let key = self.payloads.get(right_head).key();
            self.locate(self.containers.get(left).payload_first(), key)
        };

        let cut = match search {
            ListSearch::Found { prev, hit } => {
                // The separator key is strictly above left's first key, so
                // the duplicate always has a predecessor.
                debug_assert!(prev.is_some(), "separator duplicate cannot be the container head");
                let next = self.payloads.get(hit).next();
                match prev {
                    Some(prev) => self.payloads.get_mut(prev).set_next(next),
                    None => self.containers.get_mut(left).set_payload_first(next),
                }
                self.payload_replace(right_head, hit);
                self.containers.get_mut(left).dec_payload_size();
                prev
            }
            ListSearch::NotFound { prev } => prev,
        };

        let Some(cut) = cut else { return };

        // Snapshot the detached run before reinserting anything: an insert
        // rewrites `next` links, so chasing them afterwards would walk the
        // destination list instead of the remainder of this one.
        let mut chain: SmallVec<[Handle; PAYLOAD_THRESHOLD / 2]> = SmallVec::new();
        let mut curr = self.payloads.get(cut).next();
        while let Some(h) = curr {
            curr = self.payloads.get(h).next();
            chain.push(h);
        }
        self.payloads.get_mut(cut).set_next(None);

        for h in chain {
            self.payloads.get_mut(h).set_next(None);
            self.containers.get_mut(left).dec_payload_size();
            self.container_insert(node, right_idx, h, true);
        }
    }
}
