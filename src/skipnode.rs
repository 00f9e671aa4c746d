use std::iter::FusedIterator;
use std::ops;

// ////////////////////////////////////////////////////////////////////////////
// SkipNode
// ////////////////////////////////////////////////////////////////////////////

/// Stable handle to a node stored in an [`Arena`].
///
/// A handle stays valid until the node it refers to is released; released
/// slots are recycled by later insertions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What a node carries.
#[derive(Clone, Debug)]
pub enum Payload<T> {
    /// Head nodes carry nothing.
    Sentinel,
    /// The level-1 node of a tower owns the element.
    Element(T),
    /// Nodes above level 1 refer back to the level-1 node of their tower, so
    /// that there is a single copy of every element.
    Express {
        /// The level-1 node of the tower.
        base: NodeId,
    },
}

/// One node of one level of the skiplist.
///
/// Every logical element is a *tower*: one node per level from level 1 up to
/// the height it was given on insertion, chained through `up` and `down`.
/// Within a level, nodes are chained through `next` and `prev`, starting at
/// the level's sentinel.
#[derive(Clone, Debug)]
pub struct SkipNode<T> {
    pub value: Payload<T>,
    // The row this node occupies, starting at 1.
    pub level: usize,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
    pub up: Option<NodeId>,
    pub down: Option<NodeId>,
}

impl<T> SkipNode<T> {
    /// Create a new head node for the given level.
    pub fn sentinel(level: usize) -> Self {
        Self::new(Payload::Sentinel, level)
    }

    /// Create an unlinked node.
    pub fn new(value: Payload<T>, level: usize) -> Self {
        SkipNode {
            value,
            level,
            prev: None,
            next: None,
            up: None,
            down: None,
        }
    }

    /// Returns `true` if the node is a head-node.
    pub fn is_sentinel(&self) -> bool {
        matches!(self.value, Payload::Sentinel)
    }

    /// Consumes the node returning the element it owns, if any.
    pub fn into_inner(self) -> Option<T> {
        match self.value {
            Payload::Element(value) => Some(value),
            Payload::Sentinel | Payload::Express { .. } => None,
        }
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Arena
// ////////////////////////////////////////////////////////////////////////////

/// Backing storage for every node of a skiplist.
///
/// Nodes link to one another by [`NodeId`] rather than by pointer. Releasing a
/// node empties its slot, so a stale handle is caught on its next use instead
/// of silently aliasing another node.
#[derive(Clone, Debug)]
pub struct Arena<T> {
    slots: Vec<Option<SkipNode<T>>>,
    free: Vec<NodeId>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of live nodes, sentinels included.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Release every node at once.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// Store a node, returning its handle.
    pub fn insert(&mut self, node: SkipNode<T>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id.0] = Some(node);
            id
        } else {
            self.slots.push(Some(node));
            NodeId(self.slots.len() - 1)
        }
    }

    /// Remove a node from the arena without touching its neighbours' links.
    pub fn release(&mut self, id: NodeId) -> SkipNode<T> {
        let node = self
            .slots
            .get_mut(id.0)
            .and_then(Option::take)
            .unwrap_or_else(|| panic!("{id:?} has already been released"));
        self.free.push(id);
        node
    }

    pub fn get(&self, id: NodeId) -> Option<&SkipNode<T>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// The element a node stands for, following express nodes down to the
    /// level-1 node that owns it. `None` for sentinels.
    pub fn value(&self, id: NodeId) -> Option<&T> {
        match self.get(id)?.value {
            Payload::Element(ref value) => Some(value),
            Payload::Express { base } => match self.get(base)?.value {
                Payload::Element(ref value) => Some(value),
                Payload::Sentinel | Payload::Express { .. } => None,
            },
            Payload::Sentinel => None,
        }
    }

    /// Mutable access to the element a node stands for.
    pub fn value_mut(&mut self, id: NodeId) -> Option<&mut T> {
        let owner = match self.get(id)?.value {
            Payload::Express { base } => base,
            Payload::Element(_) | Payload::Sentinel => id,
        };
        match self.slots.get_mut(owner.0)?.as_mut()?.value {
            Payload::Element(ref mut value) => Some(value),
            Payload::Sentinel | Payload::Express { .. } => None,
        }
    }

    // /////////////////////////////
    // Link Manipulations
    // /////////////////////////////

    /// Insert `node` on the level of `prev`, immediately after it.
    pub fn splice_after(&mut self, prev: NodeId, node: SkipNode<T>) -> NodeId {
        let next = self[prev].next;
        let id = self.insert(SkipNode {
            prev: Some(prev),
            next,
            ..node
        });
        self[prev].next = Some(id);
        if let Some(next) = next {
            self[next].prev = Some(id);
        }
        id
    }

    /// Take a node out of its level, joining its neighbours directly, and
    /// release it.
    pub fn unsplice(&mut self, id: NodeId) -> SkipNode<T> {
        let node = self.release(id);
        if let Some(prev) = node.prev {
            self[prev].next = node.next;
        }
        if let Some(next) = node.next {
            self[next].prev = node.prev;
        }
        node
    }

    /// Make `above` sit directly on top of `below`.
    pub fn stack(&mut self, below: NodeId, above: NodeId) {
        self[below].up = Some(above);
        self[above].down = Some(below);
    }

    /// Keep moving along the level of `start` as long as the next node's
    /// element satisfies `pred`, returning the node the walk stopped on.
    pub fn advance_while(&self, start: NodeId, mut pred: impl FnMut(&T) -> bool) -> NodeId {
        let mut node = start;
        while let Some(next) = self[node].next {
            match self.value(next) {
                Some(value) if pred(value) => node = next,
                _ => break,
            }
        }
        node
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ops::Index<NodeId> for Arena<T> {
    type Output = SkipNode<T>;

    fn index(&self, id: NodeId) -> &SkipNode<T> {
        self.get(id)
            .unwrap_or_else(|| panic!("{id:?} has been released"))
    }
}

impl<T> ops::IndexMut<NodeId> for Arena<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut SkipNode<T> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("{id:?} has been released"))
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Iterators
// ////////////////////////////////////////////////////////////////////////////

/// Iterator over the elements of a skiplist, in order.
pub struct Iter<'a, T> {
    pub(crate) nodes: &'a Arena<T>,
    pub(crate) first: Option<NodeId>,
    pub(crate) last: Option<NodeId>,
    pub(crate) size: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let current = self.first?;
        if self.first == self.last {
            self.first = None;
            self.last = None;
        } else {
            self.first = self.nodes[current].next;
        }
        self.size -= 1;
        self.nodes.value(current)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.size, Some(self.size))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let current = self.last?;
        if self.first == self.last {
            self.first = None;
            self.last = None;
        } else {
            self.last = self.nodes[current].prev;
        }
        self.size -= 1;
        self.nodes.value(current)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        Iter {
            nodes: self.nodes,
            first: self.first,
            last: self.last,
            size: self.size,
        }
    }
}

/// Consuming iterator over the elements of a skiplist, in order.
pub struct IntoIter<T> {
    pub(crate) nodes: Arena<T>,
    pub(crate) first: Option<NodeId>,
    pub(crate) last: Option<NodeId>,
    pub(crate) size: usize,
}

impl<T> IntoIter<T> {
    fn pop(&mut self, current: NodeId, forward: bool) -> Option<T> {
        let node = self.nodes.release(current);
        if self.first == self.last {
            self.first = None;
            self.last = None;
        } else if forward {
            self.first = node.next;
        } else {
            self.last = node.prev;
        }
        self.size -= 1;
        node.into_inner()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        let current = self.first?;
        self.pop(current, true)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.size, Some(self.size))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        let current = self.last?;
        self.pop(current, false)
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Arena, NodeId, Payload, SkipNode};

    /// A level-1 list `head -> 1 -> 2 -> 3`.
    fn list() -> (Arena<i32>, NodeId, Vec<NodeId>) {
        let mut arena = Arena::new();
        let head = arena.insert(SkipNode::sentinel(1));
        let mut prev = head;
        let mut ids = Vec::new();
        for i in 1..=3 {
            prev = arena.splice_after(prev, SkipNode::new(Payload::Element(i), 1));
            ids.push(prev);
        }
        (arena, head, ids)
    }

    fn collect(arena: &Arena<i32>, head: NodeId) -> Vec<i32> {
        let mut out = Vec::new();
        let mut node = arena[head].next;
        while let Some(id) = node {
            out.extend(arena.value(id).copied());
            node = arena[id].next;
        }
        out
    }

    #[test]
    fn splice_and_unsplice() {
        let (mut arena, head, ids) = list();
        assert_eq!(collect(&arena, head), vec![1, 2, 3]);
        assert_eq!(arena.len(), 4);

        let removed = arena.unsplice(ids[1]);
        assert_eq!(removed.into_inner(), Some(2));
        assert_eq!(collect(&arena, head), vec![1, 3]);
        assert_eq!(arena[ids[2]].prev, Some(ids[0]));
        assert_eq!(arena.len(), 3);

        arena.unsplice(ids[2]);
        assert_eq!(arena[ids[0]].next, None);
        assert_eq!(collect(&arena, head), vec![1]);
    }

    #[test]
    fn released_slots_are_recycled() {
        let (mut arena, _head, ids) = list();
        arena.unsplice(ids[0]);
        assert!(arena.get(ids[0]).is_none());
        assert_eq!(arena.len(), 3);
        let id = arena.insert(SkipNode::new(Payload::Element(10), 1));
        assert_eq!(id, ids[0]);
        assert_eq!(arena.value(id), Some(&10));
        assert_eq!(arena.len(), 4);

        arena.clear();
        assert_eq!(arena.len(), 0);
    }

    #[test]
    #[should_panic(expected = "has been released")]
    fn stale_handle() {
        let (mut arena, _head, ids) = list();
        arena.unsplice(ids[0]);
        let _ = &arena[ids[0]];
    }

    #[test]
    fn express_nodes_share_the_element() {
        let (mut arena, _head, ids) = list();
        let upper_head = arena.insert(SkipNode::sentinel(2));
        let express = arena.splice_after(
            upper_head,
            SkipNode::new(Payload::Express { base: ids[1] }, 2),
        );
        arena.stack(ids[1], express);
        assert_eq!(arena.value(express), Some(&2));
        assert_eq!(arena[express].down, Some(ids[1]));
        assert_eq!(arena[ids[1]].up, Some(express));

        if let Some(value) = arena.value_mut(express) {
            *value = 20;
        }
        assert_eq!(arena.value(ids[1]), Some(&20));
        assert_eq!(arena.value(upper_head), None);
        assert!(arena[upper_head].is_sentinel());
    }

    #[test]
    fn advance_while() {
        let (arena, head, ids) = list();
        assert_eq!(arena.advance_while(head, |&v| v < 3), ids[1]);
        assert_eq!(arena.advance_while(head, |&v| v < 0), head);
        assert_eq!(arena.advance_while(head, |_| true), ids[2]);
        assert_eq!(arena.advance_while(ids[2], |_| true), ids[2]);
    }
}
