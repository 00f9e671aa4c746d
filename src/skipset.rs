//! An always-ordered skiplist of unique elements.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::{fmt, iter, mem};

use crate::error::{Error, Result};
use crate::level_generator::{
    CoinFlipper, CoinFlips, FairCoin, LevelGenerator, MAX_LEVEL, levels_required,
};
use crate::skipnode::{Arena, IntoIter, Iter, NodeId, Payload, SkipNode};

// ////////////////////////////////////////////////////////////////////////////
// SkipSet
// ////////////////////////////////////////////////////////////////////////////

/// A set of unique elements kept in ascending order, stored as a skiplist.
///
/// Every element is a *tower* of nodes reaching from level 1 up to a height
/// picked at random when it is inserted. Level 1 links every element in
/// order; each level above links a random subset of the one below, which is
/// what lets a search skip ahead. The top of the structure always holds at
/// least one element: levels left empty by a removal are dropped straight
/// away.
///
/// Ordering and equality come from `T`'s [`Ord`] implementation. Inserting
/// an element equal to one already present overwrites it in place.
///
/// By default, heights come from flipping a [`FairCoin`], capped at
/// [`MAX_LEVEL`] levels; see [`SkipSet::with_coin`] and
/// [`SkipSet::with_level_generator`] to change this.
///
/// # Examples
///
/// ```
/// use skiptower::SkipSet;
///
/// let mut set: SkipSet<i32> = [5, 3, 8, 1].into_iter().collect();
/// assert_eq!(set.first(), Ok(&1));
/// assert_eq!(set.last(), Ok(&8));
/// assert_eq!(set.remove(&3), Ok(3));
/// assert!(!set.contains(&3));
/// ```
#[derive(Clone)]
pub struct SkipSet<T, G = CoinFlips<FairCoin>> {
    nodes: Arena<T>,
    // Sentinel of every level in use; `heads[0]` is level 1.
    heads: Vec<NodeId>,
    len: usize,
    level_generator: G,
}

// ///////////////////////////////////////////////
// Constructors
// ///////////////////////////////////////////////

impl<T> SkipSet<T> {
    /// Create an empty set whose towers are grown by flipping a fair coin,
    /// up to [`MAX_LEVEL`] levels.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiptower::SkipSet;
    ///
    /// let set: SkipSet<i64> = SkipSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::with_level_generator(CoinFlips::new(FairCoin::new()))
    }

    /// Create an empty set with the number of levels suited to the intended
    /// capacity. Specifically, it allows as many levels as there are bits in
    /// `capacity`, so that only *a few* elements reach the highest level.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiptower::SkipSet;
    ///
    /// let mut set = SkipSet::with_capacity(100);
    /// set.extend(0..100);
    /// assert!(set.levels() <= 7);
    /// ```
    #[must_use]
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_level_generator(CoinFlips::clamped(
            levels_required(capacity),
            FairCoin::new(),
        ))
    }
}

impl<T, C: CoinFlipper> SkipSet<T, CoinFlips<C>> {
    /// Create an empty set whose towers are grown by flipping `coin`.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiptower::{Coin, SkipSet};
    ///
    /// // A coin that never lands on heads keeps every element on level 1.
    /// let mut set = SkipSet::with_coin(|| Coin::Tails);
    /// set.extend([3, 1, 2]);
    /// assert_eq!(set.levels(), 1);
    /// assert_eq!(set.get(&2), Ok(&2));
    /// ```
    #[must_use]
    #[inline]
    pub fn with_coin(coin: C) -> Self {
        Self::with_level_generator(CoinFlips::new(coin))
    }
}

impl<T, G> SkipSet<T, G> {
    /// Create an empty set using the given level generator.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiptower::{Geometric, SkipSet};
    ///
    /// let generator = Geometric::new(8, 0.25).expect("valid parameters");
    /// let mut set = SkipSet::with_level_generator(generator);
    /// set.extend(0..100);
    /// assert_eq!(set.len(), 100);
    /// ```
    #[inline]
    pub fn with_level_generator(level_generator: G) -> Self {
        let mut nodes = Arena::new();
        let head = nodes.insert(SkipNode::sentinel(1));
        SkipSet {
            nodes,
            heads: vec![head],
            len: 0,
            level_generator,
        }
    }

    /// Clears the set, removing all values and every level above the first.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiptower::SkipSet;
    ///
    /// let mut set = SkipSet::new();
    /// set.extend(0..10);
    /// set.clear();
    /// assert!(set.is_empty());
    /// assert_eq!(set.levels(), 1);
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
        self.nodes.clear();
        self.heads.clear();
        self.heads.push(self.nodes.insert(SkipNode::sentinel(1)));
    }

    /// Returns the number of elements in the set.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the set contains no elements.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of levels currently in use.
    ///
    /// This is the height of the tallest tower, or 1 for an empty set.
    #[must_use]
    #[inline]
    pub fn levels(&self) -> usize {
        self.heads.len()
    }

    /// Returns the smallest element.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyStructure`] if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiptower::{Error, SkipSet};
    ///
    /// let mut set = SkipSet::new();
    /// assert_eq!(set.first(), Err(Error::EmptyStructure));
    /// set.extend([2, 1]);
    /// assert_eq!(set.first(), Ok(&1));
    /// ```
    #[inline]
    pub fn first(&self) -> Result<&T> {
        self.first_node()
            .and_then(|id| self.nodes.value(id))
            .ok_or(Error::EmptyStructure)
    }

    /// Returns the largest element.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyStructure`] if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiptower::{Error, SkipSet};
    ///
    /// let mut set = SkipSet::new();
    /// assert_eq!(set.last(), Err(Error::EmptyStructure));
    /// set.extend([2, 1]);
    /// assert_eq!(set.last(), Ok(&2));
    /// ```
    #[inline]
    pub fn last(&self) -> Result<&T> {
        self.last_node()
            .and_then(|id| self.nodes.value(id))
            .ok_or(Error::EmptyStructure)
    }

    /// Removes and returns the smallest element, or `None` if the set is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiptower::SkipSet;
    ///
    /// let mut set: SkipSet<_> = (1..3).collect();
    /// assert_eq!(set.pop_first(), Some(1));
    /// assert_eq!(set.pop_first(), Some(2));
    /// assert_eq!(set.pop_first(), None);
    /// ```
    #[inline]
    pub fn pop_first(&mut self) -> Option<T> {
        let base = self.first_node()?;
        let top = self.tower_top(base);
        self.remove_tower(top)
    }

    /// Removes and returns the largest element, or `None` if the set is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiptower::SkipSet;
    ///
    /// let mut set: SkipSet<_> = (1..3).collect();
    /// assert_eq!(set.pop_last(), Some(2));
    /// assert_eq!(set.pop_last(), Some(1));
    /// assert_eq!(set.pop_last(), None);
    /// ```
    #[inline]
    pub fn pop_last(&mut self) -> Option<T> {
        let base = self.last_node()?;
        let top = self.tower_top(base);
        self.remove_tower(top)
    }

    /// Creates a double-ended iterator over the elements, in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiptower::SkipSet;
    ///
    /// let set: SkipSet<_> = [3, 1, 2].into_iter().collect();
    /// assert!(set.iter().copied().eq([1, 2, 3]));
    /// assert!(set.iter().rev().copied().eq([3, 2, 1]));
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            first: self.first_node(),
            last: self.last_node(),
            size: self.len,
        }
    }

    /// Collects every element into a [`BTreeSet`], walking level 1 from the
    /// first element to the last.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeSet;
    /// use skiptower::SkipSet;
    ///
    /// let set: SkipSet<_> = [5, 3, 8, 1].into_iter().collect();
    /// assert_eq!(set.to_ordered_set(), BTreeSet::from([1, 3, 5, 8]));
    /// ```
    #[must_use]
    #[inline]
    pub fn to_ordered_set(&self) -> BTreeSet<T>
    where
        T: Clone + Ord,
    {
        self.iter().cloned().collect()
    }

    /// Returns a [`Display`][fmt::Display] rendering of every level, from the
    /// top down.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiptower::{Coin, SkipSet};
    ///
    /// let mut set = SkipSet::with_coin(|| Coin::Tails);
    /// set.extend([2, 1, 3]);
    /// assert_eq!(set.structure().to_string(), "L1: 1 -> 2 -> 3");
    /// ```
    #[inline]
    pub fn structure(&self) -> Structure<'_, T> {
        Structure {
            nodes: &self.nodes,
            heads: &self.heads,
        }
    }
}

// ///////////////////////////////////////////////
// Ordered operations
// ///////////////////////////////////////////////

impl<T, G> SkipSet<T, G>
where
    T: Ord,
    G: LevelGenerator,
{
    /// Insert `value`, or overwrite the element equal to it.
    ///
    /// Returns `None` if `value` was not present yet, and the element it
    /// replaced otherwise. An overwrite leaves the length and the shape of the
    /// skiplist untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiptower::SkipSet;
    ///
    /// let mut set = SkipSet::new();
    /// assert_eq!(set.put(1), None);
    /// assert_eq!(set.put(1), Some(1));
    /// assert_eq!(set.len(), 1);
    /// ```
    #[inline]
    pub fn put(&mut self, value: T) -> Option<T> {
        let level = self.level_generator.level().clamp(1, MAX_LEVEL);

        // Predecessors on every level, from the top down.
        let mut path = Vec::with_capacity(self.heads.len().max(level));
        if let Some(found) = self.locate(&value, |node| path.push(node)) {
            return match self.nodes.value_mut(found) {
                Some(slot) => Some(mem::replace(slot, value)),
                None => unreachable!("a located node always stands for an element"),
            };
        }
        path.reverse();

        while self.heads.len() < level {
            let below = self.top();
            let head = self.nodes.insert(SkipNode::sentinel(self.heads.len() + 1));
            self.nodes.stack(below, head);
            self.heads.push(head);
            path.push(head);
        }

        let mut path = path.into_iter().take(level);
        let Some(bottom) = path.next() else {
            unreachable!("a skip set always has a level-1 sentinel")
        };
        let base = self
            .nodes
            .splice_after(bottom, SkipNode::new(Payload::Element(value), 1));
        let mut below = base;
        for (prev, level) in path.zip(2..) {
            let node = self
                .nodes
                .splice_after(prev, SkipNode::new(Payload::Express { base }, level));
            self.nodes.stack(below, node);
            below = node;
        }

        self.len += 1;
        None
    }

    /// Removes and returns the element equal to `value`.
    ///
    /// Every level the element's tower reaches is unlinked, and levels left
    /// empty at the top are dropped.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if no element is equal to `value`; the set is left
    /// untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiptower::{Error, SkipSet};
    ///
    /// let mut set: SkipSet<_> = (0..10).collect();
    /// assert_eq!(set.remove(&4), Ok(4));
    /// assert_eq!(set.remove(&4), Err(Error::NotFound));
    /// ```
    #[inline]
    pub fn remove<Q>(&mut self, value: &Q) -> Result<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let top = self.locate(value, |_| {}).ok_or(Error::NotFound)?;
        self.remove_tower(top).ok_or(Error::NotFound)
    }

    /// Returns the element equal to `value`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if no element is equal to `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiptower::{Error, SkipSet};
    ///
    /// let set: SkipSet<_> = (1..=3).collect();
    /// assert_eq!(set.get(&2), Ok(&2));
    /// assert_eq!(set.get(&99), Err(Error::NotFound));
    /// ```
    #[inline]
    pub fn get<Q>(&self, value: &Q) -> Result<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate(value, |_| {})
            .and_then(|id| self.nodes.value(id))
            .ok_or(Error::NotFound)
    }

    /// Returns `true` if an element equal to `value` is in the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiptower::SkipSet;
    ///
    /// let set: SkipSet<String> = ["apple", "pear"].map(String::from).into_iter().collect();
    /// assert!(set.contains("pear"));
    /// assert!(!set.contains("plum"));
    /// ```
    #[inline]
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate(value, |_| {}).is_some()
    }

    /// Returns the number of levels spanned by the tower of the element equal
    /// to `value`, or `None` if there is no such element.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiptower::{Coin, SkipSet};
    ///
    /// // Heads twice, then tails: the first tower reaches level 3.
    /// let mut flips = [Coin::Heads, Coin::Heads].into_iter();
    /// let mut set = SkipSet::with_coin(move || flips.next().unwrap_or(Coin::Tails));
    /// set.extend([1, 2]);
    /// assert_eq!(set.height(&1), Some(3));
    /// assert_eq!(set.height(&2), Some(1));
    /// assert_eq!(set.height(&3), None);
    /// ```
    #[inline]
    pub fn height<Q>(&self, value: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate(value, |_| {}).map(|id| self.nodes[id].level)
    }
}

// ///////////////////////////////////////////////
// Internal methods
// ///////////////////////////////////////////////

/// Compares an element against a borrowed form of another.
fn compare<T, Q>(element: &T, value: &Q) -> Ordering
where
    T: Borrow<Q>,
    Q: Ord + ?Sized,
{
    Borrow::<Q>::borrow(element).cmp(value)
}

impl<T, G> SkipSet<T, G> {
    /// Sentinel of the highest level.
    fn top(&self) -> NodeId {
        match self.heads.last() {
            Some(&head) => head,
            None => unreachable!("a skip set always has a level-1 sentinel"),
        }
    }

    /// Level-1 node of the smallest element.
    fn first_node(&self) -> Option<NodeId> {
        let bottom = self.heads.first()?;
        self.nodes[*bottom].next
    }

    /// Level-1 node of the largest element.
    ///
    /// Walks each level to its end before dropping down, as only level 1 is
    /// sure to reach the last element.
    fn last_node(&self) -> Option<NodeId> {
        if self.is_empty() {
            return None;
        }
        let mut node = self.top();
        loop {
            node = self.nodes.advance_while(node, |_| true);
            match self.nodes[node].down {
                Some(down) => node = down,
                None => return Some(node),
            }
        }
    }

    /// Climbs from any node of a tower to its highest node.
    fn tower_top(&self, mut node: NodeId) -> NodeId {
        while let Some(up) = self.nodes[node].up {
            node = up;
        }
        node
    }

    /// Unlinks every node of the tower whose highest node is `top`, from the
    /// top down, and returns the element it held.
    fn remove_tower(&mut self, top: NodeId) -> Option<T> {
        let mut current = Some(top);
        let mut element = None;
        while let Some(id) = current {
            let node = self.nodes.unsplice(id);
            current = node.down;
            if let Some(value) = node.into_inner() {
                element = Some(value);
            }
        }
        self.len -= 1;
        self.collapse();
        element
    }

    /// Retires empty levels at the top, one at a time. Level 1 is always kept.
    fn collapse(&mut self) {
        while self.heads.len() > 1 {
            let top = self.top();
            if self.nodes[top].next.is_some() {
                break;
            }
            self.heads.pop();
            let retired = self.nodes.release(top);
            debug_assert!(retired.is_sentinel(), "heads must only hold sentinels");
            if let Some(below) = retired.down {
                self.nodes[below].up = None;
            }
        }
    }

    /// Descends from the top looking for `value`.
    ///
    /// On every level, the walk moves right while the next element is smaller
    /// than `value`. If the next element is equal, its node (the highest node
    /// of its tower) is returned. Otherwise `visit` is called with the node the
    /// walk stopped on, and the walk drops to the level below.
    fn locate<Q>(&self, value: &Q, mut visit: impl FnMut(NodeId)) -> Option<NodeId>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self.top();
        loop {
            node = self
                .nodes
                .advance_while(node, |next| compare(next, value) == Ordering::Less);
            if let Some(next) = self.nodes[node].next {
                if self
                    .nodes
                    .value(next)
                    .is_some_and(|next| compare(next, value) == Ordering::Equal)
                {
                    return Some(next);
                }
            }
            visit(node);
            node = self.nodes[node].down?;
        }
    }
}

// ///////////////////////////////////////////////
// Structure rendering
// ///////////////////////////////////////////////

/// Renders every level of a [`SkipSet`], top level first.
///
/// Created by [`SkipSet::structure`].
pub struct Structure<'a, T> {
    nodes: &'a Arena<T>,
    heads: &'a [NodeId],
}

impl<T: fmt::Display> fmt::Display for Structure<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, &head) in self.heads.iter().enumerate().rev() {
            write!(f, "L{}:", index + 1)?;
            let mut node = self.nodes[head].next;
            let mut separator = "";
            while let Some(id) = node {
                if let Some(value) = self.nodes.value(id) {
                    write!(f, "{separator} {value}")?;
                }
                separator = " ->";
                node = self.nodes[id].next;
            }
            if index > 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// ///////////////////////////////////////////////
// Trait implementation
// ///////////////////////////////////////////////

impl<T> Default for SkipSet<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// This only compares the elements, in order; the level generators and the
/// shape of the towers are ignored.
impl<T, G, H> PartialEq<SkipSet<T, H>> for SkipSet<T, G>
where
    T: PartialEq,
{
    #[inline]
    fn eq(&self, other: &SkipSet<T, H>) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq, G> Eq for SkipSet<T, G> {}

impl<T: fmt::Debug, G> fmt::Debug for SkipSet<T, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, G> Extend<T> for SkipSet<T, G>
where
    T: Ord,
    G: LevelGenerator,
{
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iterable: I) {
        for element in iterable {
            self.put(element);
        }
    }
}

impl<T: Ord> iter::FromIterator<T> for SkipSet<T> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = T>>(iterable: I) -> Self {
        let mut set = SkipSet::new();
        set.extend(iterable);
        set
    }
}

impl<T, G> IntoIterator for SkipSet<T, G> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    #[inline]
    fn into_iter(self) -> IntoIter<T> {
        let first = self.first_node();
        let last = self.last_node();
        IntoIter {
            nodes: self.nodes,
            first,
            last,
            size: self.len,
        }
    }
}

impl<'a, T, G> IntoIterator for &'a SkipSet<T, G> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
impl<T: Ord, G> SkipSet<T, G> {
    /// Checks the integrity of the skiplist.
    #[expect(clippy::panic, reason = "Integrity checks are test-only")]
    fn check(&self) {
        assert!(!self.heads.is_empty(), "level 1 is missing");
        let mut live = 0;

        for (index, &head) in self.heads.iter().enumerate() {
            let level = index + 1;
            let sentinel = &self.nodes[head];
            assert!(sentinel.is_sentinel(), "level {level} head holds a value");
            assert_eq!(sentinel.level, level);
            assert_eq!(sentinel.prev, None);
            assert_eq!(
                sentinel.down,
                index.checked_sub(1).map(|below| self.heads[below])
            );
            assert_eq!(sentinel.up, self.heads.get(level).copied());

            let mut count = 0;
            let mut prev = head;
            let mut prev_value: Option<&T> = None;
            while let Some(id) = self.nodes[prev].next {
                let node = &self.nodes[id];
                assert_eq!(node.prev, Some(prev), "broken back link on level {level}");
                assert_eq!(node.level, level);
                let value = self
                    .nodes
                    .value(id)
                    .unwrap_or_else(|| panic!("empty node on level {level}"));
                if let Some(prev_value) = prev_value {
                    assert!(prev_value < value, "level {level} is out of order");
                }

                match (node.down, &node.value) {
                    (None, Payload::Element(_)) => assert_eq!(level, 1),
                    (Some(down), &Payload::Express { base }) => {
                        assert_eq!(self.nodes[down].up, Some(id));
                        assert_eq!(self.nodes[down].level + 1, level);
                        let mut bottom = down;
                        while let Some(below) = self.nodes[bottom].down {
                            bottom = below;
                        }
                        assert_eq!(bottom, base, "tower on level {level} is not contiguous");
                    }
                    _ => panic!("malformed node on level {level}"),
                }
                if let Some(up) = node.up {
                    assert_eq!(self.nodes[up].down, Some(id));
                }

                prev_value = Some(value);
                prev = id;
                count += 1;
            }

            if level == 1 {
                assert_eq!(count, self.len, "length does not match level 1");
            } else if level == self.heads.len() {
                assert!(count > 0, "empty top level {level} was kept");
            }
            live += count + 1;
        }

        assert_eq!(live, self.nodes.len(), "unreachable nodes left in the arena");
    }
}
