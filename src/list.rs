//! An intrusive, index-linked doubly-linked list.
//!
//! Records embed their own [`Links`], and a [`SiblingList`] only stores the ids of its first and
//! last members, so linking never allocates. Ids index into the slice of records that owns the
//! links; the same list type chains a node's children and an element's attributes.
use crate::node::NodeId;

/// An id that indexes a record in its owning table.
pub(crate) trait ListIndex: Copy + Eq {
    fn index(self) -> usize;
}

/// A record that can be a member of a [`SiblingList`].
pub(crate) trait Linked {
    type Id: ListIndex;

    fn links(&self) -> &Links<Self::Id>;
    fn links_mut(&mut self) -> &mut Links<Self::Id>;
}

/// Link fields embedded in every listable record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Links<I> {
    pub prev: Option<I>,
    pub next: Option<I>,

    /// Back-reference to the owning node; never an ownership edge.
    pub parent: Option<NodeId>,
}
impl<I> Default for Links<I> {
    fn default() -> Self {
        Self {
            prev: None,
            next: None,
            parent: None,
        }
    }
}

/// The head of an intrusive list: ids of the first and last members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SiblingList<I> {
    first: Option<I>,
    last: Option<I>,
}
impl<I> Default for SiblingList<I> {
    fn default() -> Self {
        Self {
            first: None,
            last: None,
        }
    }
}
impl<I: ListIndex> SiblingList<I> {
    pub fn first(&self) -> Option<I> {
        self.first
    }

    pub fn last(&self) -> Option<I> {
        self.last
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// Links `child` at the tail of the list and points it at `parent`.
    /// The child must not currently be linked anywhere.
    pub fn append<T: Linked<Id = I>>(&mut self, store: &mut [T], parent: NodeId, child: I) {
        debug_assert!(store[child.index()].links().parent.is_none());

        *store[child.index()].links_mut() = Links {
            prev: self.last,
            next: None,
            parent: Some(parent),
        };

        match self.last {
            Some(last) => store[last.index()].links_mut().next = Some(child),
            None => self.first = Some(child),
        }
        self.last = Some(child);
    }

    /// Links `child` immediately before `reference`, which must be a member of this list.
    /// The child must not currently be linked anywhere.
    pub fn insert_before<T: Linked<Id = I>>(&mut self, store: &mut [T], child: I, reference: I) {
        debug_assert!(store[child.index()].links().parent.is_none());
        let Links { prev, parent, .. } = *store[reference.index()].links();
        debug_assert!(parent.is_some());

        *store[child.index()].links_mut() = Links {
            prev,
            next: Some(reference),
            parent,
        };

        match prev {
            Some(prev) => store[prev.index()].links_mut().next = Some(child),
            None => self.first = Some(child),
        }
        store[reference.index()].links_mut().prev = Some(child);
    }

    /// Unlinks `child`, which must be a member of this list, and clears its links.
    pub fn remove<T: Linked<Id = I>>(&mut self, store: &mut [T], child: I) {
        let Links { prev, next, .. } = *store[child.index()].links();

        match prev {
            Some(prev) => store[prev.index()].links_mut().next = next,
            None => self.first = next,
        }
        match next {
            Some(next) => store[next.index()].links_mut().prev = prev,
            None => self.last = prev,
        }

        *store[child.index()].links_mut() = Links::default();
    }

    /// Iterates the ids of the members, first to last.
    pub fn iter<'s, T: Linked<Id = I>>(&self, store: &'s [T]) -> Siblings<'s, T> {
        Siblings::new(store, self.first)
    }
}

/// Forward iterator over a chain of siblings.
pub(crate) struct Siblings<'s, T: Linked> {
    store: &'s [T],
    next: Option<T::Id>,
}
impl<'s, T: Linked> Siblings<'s, T> {
    pub fn new(store: &'s [T], first: Option<T::Id>) -> Self {
        Self { store, next: first }
    }
}
impl<T: Linked> Iterator for Siblings<'_, T> {
    type Item = T::Id;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.store.get(current.index()).and_then(|r| r.links().next);
        Some(current)
    }
}
