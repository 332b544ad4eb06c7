use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
};

use crate::{
    RandSource, Result, Snowflake, SnowflakeConfig, SystemClock, ThreadRandom, TimeSource,
    generator::{Mutex, lock},
};

/// Hands out one shared [`Snowflake`] per (worker, data center) pair.
///
/// Every generator is built from a template configuration with the pair
/// substituted in, and from clones of the registry's time and randomness
/// sources. The first request for a pair builds the generator; later
/// requests, including concurrent ones, get the same [`Arc`].
///
/// Own a registry wherever generators must be shared; code that needs a
/// single generator can construct a [`Snowflake`] directly.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use snowmint::SnowflakeRegistry;
///
/// let registry = SnowflakeRegistry::new();
/// let a = registry.get(1, 2)?;
/// let b = registry.get(1, 2)?;
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(registry.len()?, 1);
/// # Ok::<(), snowmint::Error>(())
/// ```
#[derive(Debug)]
pub struct SnowflakeRegistry<T = SystemClock, R = ThreadRandom> {
    template: SnowflakeConfig,
    time: T,
    rng: R,
    generators: Mutex<HashMap<(u64, u64), Arc<Snowflake<T, R>>>>,
}

impl SnowflakeRegistry {
    /// A registry producing default generators on the system clock.
    pub fn new() -> Self {
        Self::with_sources(SnowflakeConfig::default(), SystemClock, ThreadRandom)
    }
}

impl Default for SnowflakeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, R> SnowflakeRegistry<T, R>
where
    T: TimeSource + Clone,
    R: RandSource + Clone,
{
    /// Creates a registry whose generators share `template`'s tolerance,
    /// epoch and random sequence limit. The template's own worker and
    /// data-center IDs are ignored.
    pub fn with_sources(template: SnowflakeConfig, time: T, rng: R) -> Self {
        Self {
            template,
            time,
            rng,
            generators: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the generator for the pair, building it on first use.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfiguration`] if either ID is out of range. Nothing
    ///   is stored in that case.
    /// - [`Error::LockPoisoned`] if the registry lock is poisoned (std mutex
    ///   only).
    ///
    /// [`Error::InvalidConfiguration`]: crate::Error::InvalidConfiguration
    /// [`Error::LockPoisoned`]: crate::Error::LockPoisoned
    pub fn get(&self, worker_id: i64, data_center_id: i64) -> Result<Arc<Snowflake<T, R>>> {
        let config = self
            .template
            .clone()
            .with_worker_id(worker_id)
            .with_data_center_id(data_center_id);
        config.validate()?;

        let mut generators = lock(&self.generators)?;
        match generators.entry((worker_id as u64, data_center_id as u64)) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(worker_id, data_center_id, "creating snowflake generator");
                let generator = Snowflake::with_sources(config, self.time.clone(), self.rng.clone())?;
                Ok(Arc::clone(entry.insert(Arc::new(generator))))
            }
        }
    }

    /// Number of generators built so far.
    ///
    /// # Errors
    ///
    /// [`Error::LockPoisoned`] if the registry lock is poisoned (std mutex
    /// only).
    ///
    /// [`Error::LockPoisoned`]: crate::Error::LockPoisoned
    pub fn len(&self) -> Result<usize> {
        Ok(lock(&self.generators)?.len())
    }

    /// # Errors
    ///
    /// Same as [`len`](Self::len).
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
