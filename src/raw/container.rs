use super::handle::Handle;

/// An ordered, deduplicated run of payloads plus an optional child subtree.
///
/// Within a node, a container is responsible for the key range from its
/// first payload's key up to (but excluding) the next container's first
/// payload key; the leftmost container of a node has no lower bound. The
/// child, when present, holds older updates for the same range.
pub(crate) struct Container {
    payload_first: Option<Handle>,
    payload_size: usize,
    child: Option<Handle>,
}

impl Container {
    /// A fresh container with no payloads. Only the split machinery and the
    /// first insert into an empty node see a container in this state; it is
    /// populated before anything else can observe it.
    pub(crate) const fn new() -> Self {
        Self {
            payload_first: None,
            payload_size: 0,
            child: None,
        }
    }

    /// A container adopting a detached, already-ordered payload run.
    pub(crate) const fn with_payloads(payload_first: Option<Handle>, payload_size: usize) -> Self {
        Self {
            payload_first,
            payload_size,
            child: None,
        }
    }

    #[inline]
    pub(crate) const fn payload_first(&self) -> Option<Handle> {
        self.payload_first
    }

    #[inline]
    pub(crate) const fn set_payload_first(&mut self, payload_first: Option<Handle>) {
        self.payload_first = payload_first;
    }

    #[inline]
    pub(crate) const fn payload_size(&self) -> usize {
        self.payload_size
    }

    #[inline]
    pub(crate) const fn set_payload_size(&mut self, payload_size: usize) {
        self.payload_size = payload_size;
    }

    #[inline]
    pub(crate) const fn inc_payload_size(&mut self) {
        self.payload_size += 1;
    }

    #[inline]
    pub(crate) const fn dec_payload_size(&mut self) {
        self.payload_size -= 1;
    }

    #[inline]
    pub(crate) const fn child(&self) -> Option<Handle> {
        self.child
    }

    #[inline]
    pub(crate) const fn set_child(&mut self, child: Option<Handle>) {
        self.child = child;
    }
}
