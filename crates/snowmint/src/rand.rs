use ::rand::{Rng, rng};

/// A source of random integers used to pick the starting sequence of a new
/// millisecond bucket.
///
/// The values need not be cryptographically strong. Swap in a fixed source in
/// tests to make randomized sequences deterministic.
///
/// # Example
/// ```
/// use snowmint::RandSource;
///
/// struct FixedRand;
/// impl RandSource for FixedRand {
///     fn rand_below(&self, bound: u64) -> u64 {
///         7 % bound
///     }
/// }
///
/// assert_eq!(FixedRand.rand_below(5), 2);
/// ```
pub trait RandSource {
    /// Returns a uniformly distributed integer in `[0, bound)`.
    ///
    /// Callers never pass a `bound` of zero.
    fn rand_below(&self, bound: u64) -> u64;
}

/// A `RandSource` backed by the thread-local RNG (`rand::rng()`).
///
/// Each OS thread has its own RNG instance, so calls from multiple threads are
/// contention-free. This type does **not** store the RNG itself; it accesses
/// the thread-local generator on each call, which keeps it `Send + Sync`.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource for ThreadRandom {
    fn rand_below(&self, bound: u64) -> u64 {
        rng().random_range(0..bound)
    }
}
