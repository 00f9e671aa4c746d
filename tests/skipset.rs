//! Exercises [`SkipSet`] through its public interface only.

use std::collections::BTreeSet;

use anyhow::Result;
use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use rstest::rstest;
use skiptower::{
    Coin, CoinFlipper, CoinFlips, Error, FairCoin, Geometric, LevelGenerator, SkipSet,
};

/// Alternates between a tower of `height` and a tower of height 1.
struct Alternating {
    height: usize,
    flips: usize,
}

impl CoinFlipper for Alternating {
    fn flip(&mut self) -> Coin {
        self.flips += 1;
        if self.flips < self.height {
            Coin::Heads
        } else {
            // Every other tower stays on level 1.
            if self.flips > self.height {
                self.flips = 0;
            }
            Coin::Tails
        }
    }
}

fn scenario_5_3_8_1<G: LevelGenerator>(mut set: SkipSet<i32, G>) {
    for x in [5, 3, 8, 1] {
        assert_eq!(set.put(x), None);
    }
    assert_eq!(set.first(), Ok(&1));
    assert_eq!(set.last(), Ok(&8));
    assert_eq!(set.len(), 4);
    assert_eq!(set.to_ordered_set(), BTreeSet::from([1, 3, 5, 8]));
}

#[test]
fn scenario_with_fair_coin() {
    scenario_5_3_8_1(SkipSet::with_coin(FairCoin::seeded(1)));
}

#[test]
fn scenario_with_flat_list() {
    scenario_5_3_8_1(SkipSet::with_coin(|| Coin::Tails));
}

#[test]
fn insert_then_remove_only_element() {
    let mut set = SkipSet::new();
    set.put(10);
    assert_eq!(set.remove(&10), Ok(10));
    assert_eq!(set.len(), 0);
    assert!(set.is_empty());
    assert_eq!(set.first(), Err(Error::EmptyStructure));
    assert_eq!(set.last(), Err(Error::EmptyStructure));
    assert_eq!(set.remove(&10), Err(Error::NotFound));
}

#[test]
fn get_absent_value() {
    let set: SkipSet<i32> = (1..=3).collect();
    assert_eq!(set.get(&99), Err(Error::NotFound));
    assert_eq!(set.get(&99).map_err(|err| err.to_string()), Err("element not found".into()));
}

#[test]
fn alternating_towers() {
    let mut set = SkipSet::with_coin(Alternating {
        height: 3,
        flips: 0,
    });
    set.extend(1..=6);
    assert_eq!(set.levels(), 3);
    assert_snapshot!(set.structure(), @r"
    L3: 1 -> 3 -> 5
    L2: 1 -> 3 -> 5
    L1: 1 -> 2 -> 3 -> 4 -> 5 -> 6
    ");

    for x in [1, 3] {
        assert_eq!(set.remove(&x), Ok(x));
    }
    assert_eq!(set.levels(), 3);
    assert_eq!(set.remove(&5), Ok(5));
    assert_eq!(set.levels(), 1);
    assert_snapshot!(set.structure(), @"L1: 2 -> 4 -> 6");
}

#[test]
fn capped_height() -> Result<()> {
    let mut set = SkipSet::with_level_generator(CoinFlips::with_total(4, || Coin::Heads)?);
    set.extend(0..10);
    assert_eq!(set.levels(), 4);
    for x in 0..10 {
        assert_eq!(set.height(&x), Some(4));
    }
    Ok(())
}

#[test]
fn invalid_generators() {
    assert!(matches!(
        CoinFlips::with_total(0, || Coin::Tails),
        Err(Error::InvalidArgument(_))
    ));
    let err: Error = Geometric::new(4, 1.5).map(|_| ()).map_err(Error::from).unwrap_err();
    assert_eq!(err, Error::InvalidArgument("p must be in (0, 1)"));
}

#[rstest]
fn stays_ordered(#[values(0, 1, 2, 3)] seed: u64) {
    let mut set = SkipSet::with_coin(FairCoin::seeded(seed));
    let mut values: Vec<u32> = (0..2000).map(|i| (i * 7919) % 2003).collect();
    set.extend(values.iter().copied());
    values.sort_unstable();
    values.dedup();
    assert_eq!(set.len(), values.len());
    assert!(set.iter().eq(values.iter()));
    assert!(set.iter().zip(set.iter().skip(1)).all(|(a, b)| a < b));

    for x in values.iter().filter(|&&x| x % 3 == 0) {
        assert_eq!(set.remove(x), Ok(*x));
    }
    assert!(set.iter().all(|x| x % 3 != 0));
    assert!(set.iter().zip(set.iter().skip(1)).all(|(a, b)| a < b));
}
