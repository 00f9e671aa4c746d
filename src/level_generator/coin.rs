//! Coin-flip level generation.

use rand::prelude::*;
use rand::rngs::SmallRng;

use crate::error::{Error, Result};
use crate::level_generator::{LevelGenerator, MAX_LEVEL};

/// The two outcomes of a coin flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coin {
    /// Keep promoting the node to the next level.
    Heads,
    /// Stop; the node's height is settled.
    Tails,
}

/// A source of coin flips.
///
/// The expected `O(log n)` bounds of the skip set only hold if both outcomes
/// are equally likely. Biased or scripted flippers are still correct, just
/// slower; a flipper that always returns [`Coin::Tails`] degenerates the set
/// into a single sorted linked list.
///
/// Any `FnMut() -> Coin` closure is a flipper.
pub trait CoinFlipper {
    /// Flip the coin once.
    fn flip(&mut self) -> Coin;
}

impl<F> CoinFlipper for F
where
    F: FnMut() -> Coin,
{
    #[inline]
    fn flip(&mut self) -> Coin {
        self()
    }
}

/// An unbiased coin backed by a fast, non-cryptographic generator.
#[derive(Debug, Clone)]
pub struct FairCoin {
    rng: SmallRng,
}

impl FairCoin {
    /// A coin seeded from the thread-local generator.
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        FairCoin {
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }

    /// A coin with a fixed seed, producing the same flips on every run.
    #[must_use]
    #[inline]
    pub fn seeded(seed: u64) -> Self {
        FairCoin {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for FairCoin {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl CoinFlipper for FairCoin {
    #[inline]
    fn flip(&mut self) -> Coin {
        if self.rng.random::<bool>() {
            Coin::Heads
        } else {
            Coin::Tails
        }
    }
}

/// Level generator which flips a coin until it lands on tails.
///
/// A node whose coin came up heads `k` times before the first tails is given
/// level `k + 1`, truncated at [`total`][LevelGenerator::total].
#[derive(Debug, Clone)]
pub struct CoinFlips<C> {
    total: usize,
    coin: C,
}

impl<C: CoinFlipper> CoinFlips<C> {
    /// Flip `coin` for every new node, allowing up to [`MAX_LEVEL`] levels.
    #[must_use]
    #[inline]
    pub fn new(coin: C) -> Self {
        CoinFlips {
            total: MAX_LEVEL,
            coin,
        }
    }

    /// Flip `coin` for every new node, allowing up to `total` levels.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `total` is zero or above [`MAX_LEVEL`].
    #[inline]
    pub fn with_total(total: usize, coin: C) -> Result<Self> {
        if total == 0 {
            return Err(Error::InvalidArgument("total must be non-zero"));
        }
        if total > MAX_LEVEL {
            return Err(Error::InvalidArgument(
                "total must not exceed the maximum level",
            ));
        }
        Ok(Self::clamped(total, coin))
    }

    /// Flip `coin` for every new node, with `total` forced into
    /// `1..=MAX_LEVEL`.
    pub(crate) fn clamped(total: usize, coin: C) -> Self {
        CoinFlips {
            total: total.clamp(1, MAX_LEVEL),
            coin,
        }
    }

    /// The underlying coin.
    #[must_use]
    #[inline]
    pub fn coin(&self) -> &C {
        &self.coin
    }
}

impl<C: CoinFlipper> LevelGenerator for CoinFlips<C> {
    #[inline]
    fn total(&self) -> usize {
        self.total
    }

    /// Counts heads until the first tails. Once the cap is reached the coin is
    /// no longer flipped.
    #[inline]
    fn level(&mut self) -> usize {
        let mut level = 1;
        while level < self.total && self.coin.flip() == Coin::Heads {
            level += 1;
        }
        level
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{Coin, CoinFlipper, CoinFlips, FairCoin};
    use crate::error::Error;
    use crate::level_generator::{LevelGenerator, MAX_LEVEL};

    /// Replays `heads` heads followed by a tails, forever.
    fn streak(heads: usize) -> impl FnMut() -> Coin {
        let mut i = 0;
        move || {
            let coin = if i < heads { Coin::Heads } else { Coin::Tails };
            i = if i == heads { 0 } else { i + 1 };
            coin
        }
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 2)]
    #[case(4, 5)]
    fn heads_then_tails(#[case] heads: usize, #[case] expected: usize) {
        let mut generator = CoinFlips::new(streak(heads));
        for _ in 0..10 {
            assert_eq!(generator.level(), expected);
        }
    }

    #[test]
    fn truncated_at_total() -> anyhow::Result<()> {
        let mut generator = CoinFlips::with_total(3, || Coin::Heads)?;
        assert_eq!(generator.total(), 3);
        assert_eq!(generator.level(), 3);

        let mut generator = CoinFlips::new(|| Coin::Heads);
        assert_eq!(generator.level(), MAX_LEVEL);
        Ok(())
    }

    #[test]
    fn stops_flipping_at_cap() -> anyhow::Result<()> {
        let mut flips = 0;
        let mut generator = CoinFlips::with_total(4, || {
            flips += 1;
            Coin::Heads
        })?;
        assert_eq!(generator.level(), 4);
        drop(generator);
        assert_eq!(flips, 3);
        Ok(())
    }

    #[rstest]
    #[case(0)]
    #[case(MAX_LEVEL + 1)]
    fn invalid_total(#[case] total: usize) {
        assert!(matches!(
            CoinFlips::with_total(total, || Coin::Tails),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn seeded_is_reproducible() {
        let mut a = FairCoin::seeded(0x1234_abcd);
        let mut b = FairCoin::seeded(0x1234_abcd);
        for _ in 0..1000 {
            assert_eq!(a.flip(), b.flip());
        }
    }

    #[test]
    fn fair_coin_is_roughly_fair() {
        let mut coin = FairCoin::seeded(7);
        let heads = (0..100_000).filter(|_| coin.flip() == Coin::Heads).count();
        assert!((45_000..55_000).contains(&heads), "heads = {heads}");
    }

    #[test]
    fn fair_levels_halve() {
        let mut generator = CoinFlips::new(FairCoin::seeded(42));
        let mut counts = [0_usize; MAX_LEVEL + 1];
        for _ in 0..100_000 {
            let level = generator.level();
            assert!((1..=MAX_LEVEL).contains(&level));
            counts[level] += 1;
        }
        // Roughly half of the nodes should stop at every level.
        assert!((45_000..55_000).contains(&counts[1]), "{counts:?}");
        assert!((20_000..30_000).contains(&counts[2]), "{counts:?}");
        assert!((10_000..15_000).contains(&counts[3]), "{counts:?}");
    }
}
