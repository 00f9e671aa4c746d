//! Skiplists use a probabilistic distribution of nodes over the internal
//! levels, whereby the lowest level (level 1) contains all the nodes, and each
//! level $n > 1$ will contain a random subset of the nodes on level `n - 1`.
//!
//! The classic way of choosing a node's height is to flip a fair coin until it
//! lands on tails: a node with `k` heads before the first tails reaches level
//! `k + 1`, so level `k` is reached with probability $2^{-(k-1)}$. This is what
//! [`CoinFlips`] does. [`Geometric`] generalises it to any promotion
//! probability $p$.
//!
//! Both are truncated at [`total`][LevelGenerator::total] levels, which can
//! never exceed [`MAX_LEVEL`].

pub mod coin;
pub mod geometric;

pub use coin::{Coin, CoinFlipper, CoinFlips, FairCoin};
pub use geometric::{Geometric, GeometricError};

/// Hard cap on the height of any tower.
///
/// With a fair coin, $2^{32}$ elements are needed before a level above this is
/// expected to be populated, so truncating here costs nothing in practice and
/// bounds the work done by a single insertion.
pub const MAX_LEVEL: usize = 32;

/// Minimum number of levels for a list expected to hold `n` elements.
///
/// This is the number of bits needed to represent `n`, clamped to
/// `1..=MAX_LEVEL`.
#[must_use]
#[inline]
pub fn levels_required(n: usize) -> usize {
    let bits = usize::BITS - n.leading_zeros();
    usize::try_from(bits).map_or(MAX_LEVEL, |bits| bits.clamp(1, MAX_LEVEL))
}

// ////////////////////////////////////////////////////////////////////////////
// Level Generator
// ////////////////////////////////////////////////////////////////////////////

/// Upon the insertion of a new node in the list, the node is replicated to
/// higher levels with a certain probability as determined by a
/// [`LevelGenerator`].
pub trait LevelGenerator {
    /// The total number of levels that are assumed to exist.
    #[must_use]
    fn total(&self) -> usize;
    /// Generate a random level for a new node in the range `[1, total]`.
    ///
    /// This function should _never_ return zero or a level greater than
    /// [`total`][LevelGenerator::total].
    #[must_use]
    fn level(&mut self) -> usize;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{MAX_LEVEL, levels_required};

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(2, 2)]
    #[case(3, 2)]
    #[case(4, 3)]
    #[case(1023, 10)]
    #[case(1024, 11)]
    #[case(usize::MAX, MAX_LEVEL)]
    fn required(#[case] n: usize, #[case] expected: usize) {
        assert_eq!(levels_required(n), expected);
    }
}
