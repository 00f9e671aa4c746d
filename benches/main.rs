//! Benchmarks comparing [`skiptower::SkipSet`] with the Standard Library's
//! ordered set.

use criterion::{criterion_group, criterion_main};


criterion_group!(
    benches,
    skipset::put,
    skipset::get,
    skipset::put_remove,
    skipset::flat_get,
    skipset::iter,
    btreeset::put,
    btreeset::get,
    btreeset::iter,
);
criterion_main!(benches);
