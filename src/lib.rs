//! A skiplist is a way of storing elements in such a way that elements can be
//! efficiently accessed, inserted and removed, all in `O(log(n))` on average.
//!
//! Conceptually, a skiplist resembles something like:
//!
//! ```text
//! <head> ----------> [2] --------------------------------------------------> [9]
//! <head> ----------> [2] ------------------------------------[7] ----------> [9]
//! <head> ----------> [2] ----------> [4] ------------------> [7] ----------> [9] --> [10]
//! <head> --> [1] --> [2] --> [3] --> [4] --> [5] --> [6] --> [7] --> [8] --> [9] --> [10]
//! ```
//!
//! where each element `[x]` is a *tower* of nodes, one per level it reaches,
//! allowing a search to skip ahead on the higher levels before dropping down.
//! The height of each tower is decided by flipping a coin when the element is
//! inserted, so no rebalancing is ever needed.
//!
//! This crate provides [`SkipSet`], an ordered set built this way. Its nodes
//! live in an arena and link to each other by index, every level has its own
//! head sentinel, and levels are added and retired one at a time as towers
//! grow past the top or the top level empties.
//!
//! ```
//! use skiptower::{Error, SkipSet};
//!
//! let mut set: SkipSet<i32> = [5, 3, 8, 1].into_iter().collect();
//! assert_eq!(set.first(), Ok(&1));
//! assert_eq!(set.last(), Ok(&8));
//! assert_eq!(set.get(&99), Err(Error::NotFound));
//! ```
//!
//! The source of randomness can be swapped out through [`CoinFlipper`] (any
//! `FnMut() -> Coin` closure will do) or, more generally, [`LevelGenerator`].

mod error;
pub mod level_generator;
mod skipnode;
mod skipset;

pub use error::{Error, Result};
pub use level_generator::{
    Coin, CoinFlipper, CoinFlips, FairCoin, Geometric, GeometricError, LevelGenerator, MAX_LEVEL,
};
pub use skipnode::{IntoIter, Iter};
pub use skipset::{SkipSet, Structure};
