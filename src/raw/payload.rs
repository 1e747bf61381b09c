use super::handle::Handle;

/// Whether a payload records an insertion or a deletion.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum PayloadKind {
    Put,
    Del,
}

/// A single buffered update: an owned key, the value for `Put` records, and
/// a forward link to the next payload in the same container.
///
/// Payloads form strictly ascending singly-linked runs, one per container;
/// a key appears at most once in any run. Dropping a payload drops the key
/// and any value it still owns, which is how host teardown happens.
pub(crate) struct Payload<K, V> {
    key: K,
    val: Option<V>,
    kind: PayloadKind,
    next: Option<Handle>,
}

impl<K, V> Payload<K, V> {
    pub(crate) const fn put(key: K, val: V) -> Self {
        Self {
            key,
            val: Some(val),
            kind: PayloadKind::Put,
            next: None,
        }
    }

    pub(crate) const fn del(key: K) -> Self {
        Self {
            key,
            val: None,
            kind: PayloadKind::Del,
            next: None,
        }
    }

    #[inline]
    pub(crate) const fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) const fn val(&self) -> Option<&V> {
        self.val.as_ref()
    }

    #[inline]
    pub(crate) const fn kind(&self) -> PayloadKind {
        self.kind
    }

    #[inline]
    pub(crate) const fn next(&self) -> Option<Handle> {
        self.next
    }

    #[inline]
    pub(crate) const fn set_next(&mut self, next: Option<Handle>) {
        self.next = next;
    }

    /// Exchanges value and kind with another payload, leaving both keys in
    /// place. Used when an incoming update lands on a resident duplicate:
    /// the resident absorbs the newer value and kind, and the other payload
    /// walks away holding whatever must be destroyed.
    pub(crate) fn swap_val_and_kind(&mut self, other: &mut Self) {
        core::mem::swap(&mut self.val, &mut other.val);
        core::mem::swap(&mut self.kind, &mut other.kind);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn swap_moves_value_and_kind_together() {
        let mut resident: Payload<u32, u32> = Payload::put(1, 10);
        let mut incoming: Payload<u32, u32> = Payload::del(1);

        resident.swap_val_and_kind(&mut incoming);

        assert_eq!(resident.kind(), PayloadKind::Del);
        assert_eq!(resident.val(), None);
        assert_eq!(incoming.kind(), PayloadKind::Put);
        assert_eq!(incoming.val(), Some(&10));
    }
}
