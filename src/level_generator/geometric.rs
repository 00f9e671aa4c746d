//! Geometric level generator.

use rand::prelude::*;
use rand::rngs::SmallRng;
use thiserror::Error;

use crate::level_generator::{LevelGenerator, MAX_LEVEL};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
/// Errors that can occur when creating a [`Geometric`] level generator.
#[expect(
    clippy::module_name_repetitions,
    reason = "Using 'Error' would be too generic and may cause confusion."
)]
#[non_exhaustive]
pub enum GeometricError {
    /// The maximum number of levels must be non-zero.
    #[error("max must be non-zero.")]
    ZeroMax,
    /// The maximum number of levels must not exceed [`MAX_LEVEL`].
    #[error("max must not exceed MAX_LEVEL.")]
    MaxTooLarge,
    /// The probability `$p$` must be in the range `$(0, 1)$`.
    #[error("p must be in (0, 1).")]
    InvalidProbability,
}

/// A level generator using a geometric distribution.
///
/// This distribution assumes that if a node is present at some level `$n$`,
/// then the probability that it is also present at level `$n+1$` is some
/// constant `$p \in (0, 1)$`. With `$p = 1/2$` this is the same distribution
/// as [`CoinFlips`][crate::level_generator::CoinFlips] with a fair coin, but
/// it only draws a single random number per node.
#[derive(Debug, Clone)]
pub struct Geometric {
    /// The total number of levels that are assumed to exist.
    total: usize,
    /// The probability that a node is promoted to the next level.
    p: f64,
    /// `$1 - p^{total}$`, the normalisation of the truncated distribution.
    mass: f64,
    /// The random number generator.
    rng: SmallRng,
}

impl Geometric {
    /// Create a new geometric level generator with `total` number of levels,
    /// and `p` as the probability that a given node is present in the next
    /// level.
    ///
    /// # Errors
    ///
    /// `p` must be strictly between 0 and 1, and `total` must be in
    /// `1..=MAX_LEVEL`.
    #[inline]
    pub fn new(total: usize, p: f64) -> Result<Self, GeometricError> {
        Self::with_rng(total, p, SmallRng::from_rng(&mut rand::rng()))
    }

    /// Same as [`Geometric::new`], but with a fixed seed so that the sequence
    /// of levels is reproducible.
    ///
    /// # Errors
    ///
    /// See [`Geometric::new`].
    #[inline]
    pub fn seeded(total: usize, p: f64, seed: u64) -> Result<Self, GeometricError> {
        Self::with_rng(total, p, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(total: usize, p: f64, rng: SmallRng) -> Result<Self, GeometricError> {
        if total == 0 {
            return Err(GeometricError::ZeroMax);
        }
        if total > MAX_LEVEL {
            return Err(GeometricError::MaxTooLarge);
        }
        if !(0.0 < p && p < 1.0) {
            return Err(GeometricError::InvalidProbability);
        }
        let exponent = i32::try_from(total).map_err(|_err| GeometricError::MaxTooLarge)?;
        #[expect(clippy::float_arithmetic, reason = "Normalising the distribution")]
        let mass = 1.0 - p.powi(exponent);
        Ok(Geometric {
            total,
            p,
            mass,
            rng,
        })
    }
}

impl LevelGenerator for Geometric {
    #[inline]
    fn total(&self) -> usize {
        self.total
    }

    /// Generate a level for a new node using a geometric distribution.
    ///
    /// The number of levels `$n$` a node is promoted past its first follows a
    /// geometric distribution truncated at `$t = \text{total}$`, whose CDF is
    ///
    /// ```math
    /// \text{CDF}(n) = \frac{1 - p^n}{1 - p^t}
    /// ```
    ///
    /// Inverting it for a uniform variate `$u \in [0, 1)$` gives
    ///
    /// ```math
    /// n = \left\lfloor \log_p\left(1 - (1 - p^t) \cdot u\right) \right\rfloor
    /// ```
    ///
    /// and the returned level is `$n + 1$`.
    #[inline]
    #[expect(clippy::float_arithmetic, reason = "Computing inverse CDF")]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "CDF domain is [0, total) so the cast is safe"
    )]
    #[expect(clippy::as_conversions, reason = "No other way to do this")]
    fn level(&mut self) -> usize {
        let u = self.rng.random::<f64>();
        let n = (1.0 - self.mass * u).log(self.p).floor() as usize;
        n.saturating_add(1).min(self.total)
    }
}
