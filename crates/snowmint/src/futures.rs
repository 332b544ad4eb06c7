use core::{future::Future, time::Duration};

use crate::{IdGenStatus, RandSource, Result, Snowflake, SnowflakeId, TimeSource};

/// A trait that abstracts over how to sleep for a given [`Duration`] in async
/// contexts.
pub trait SleepProvider {
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send;
}

/// An implementation of [`SleepProvider`] using Tokio's timer.
///
/// This is the default provider for use in async applications built on Tokio.
pub struct TokioSleep;

impl SleepProvider for TokioSleep {
    async fn sleep_for(dur: Duration) {
        tokio::time::sleep(dur).await;
    }
}

/// An implementation of [`SleepProvider`] using Tokio's yield.
///
/// This avoids timer-based delays by yielding to the scheduler immediately.
/// It reacts faster at low concurrency but polls more often under load, where
/// [`TokioSleep`] is usually cheaper.
pub struct TokioYield;

impl SleepProvider for TokioYield {
    async fn sleep_for(_dur: Duration) {
        tokio::task::yield_now().await;
    }
}

/// Extension trait for generating IDs without blocking an async executor.
///
/// Instead of spinning while holding the generator lock, the futures poll
/// [`Snowflake::try_poll_id`] and sleep for the suggested interval whenever
/// the current millisecond is exhausted. Clock regressions are re-checked on
/// every retry, so a pinned timestamp resumes once the clock catches up.
pub trait SnowflakeAsyncExt {
    /// Returns a future that resolves to the next ID, sleeping with `S` while
    /// the generator is pending.
    ///
    /// # Errors
    ///
    /// Returns any error raised by [`Snowflake::try_poll_id`].
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<SnowflakeId>> + Send
    where
        S: SleepProvider;

    /// Like [`try_next_id_async`](Self::try_next_id_async) with
    /// [`TokioSleep`].
    ///
    /// # Errors
    ///
    /// Returns any error raised by [`Snowflake::try_poll_id`].
    fn next_id_async(&self) -> impl Future<Output = Result<SnowflakeId>> + Send {
        self.try_next_id_async::<TokioSleep>()
    }
}

impl<T, R> SnowflakeAsyncExt for Snowflake<T, R>
where
    T: TimeSource + Send + Sync,
    R: RandSource + Send + Sync,
{
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<SnowflakeId>> + Send
    where
        S: SleepProvider,
    {
        async move {
            loop {
                let dur = match self.try_poll_id()? {
                    IdGenStatus::Ready { id } => return Ok(id),
                    IdGenStatus::Pending { yield_for } => Duration::from_millis(yield_for),
                };
                S::sleep_for(dur).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
    };

    use futures::future::try_join_all;

    use super::*;
    use crate::{MonotonicClock, SnowflakeConfig, ThreadRandom};

    const TOTAL_IDS: usize = 4096;
    const NUM_TASKS: usize = 8;
    // Enough to hit at least a few pending cycles per task.
    const IDS_PER_TASK: usize = TOTAL_IDS * 4;

    #[derive(Clone)]
    struct SharedMockTime(Arc<AtomicU64>);

    impl TimeSource for SharedMockTime {
        fn current_millis(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn shared_generator() -> Arc<Snowflake<MonotonicClock, ThreadRandom>> {
        Arc::new(
            Snowflake::with_sources(
                SnowflakeConfig::new(2, 3),
                MonotonicClock::default(),
                ThreadRandom,
            )
            .unwrap(),
        )
    }

    async fn many_unique_ids<S: SleepProvider + 'static>() -> Result<()> {
        let generator = shared_generator();

        let tasks = (0..NUM_TASKS).map(|_| {
            let generator = Arc::clone(&generator);
            tokio::spawn(async move {
                let mut ids = Vec::with_capacity(IDS_PER_TASK);
                for _ in 0..IDS_PER_TASK {
                    ids.push(generator.try_next_id_async::<S>().await?);
                }
                Ok::<_, crate::Error>(ids)
            })
        });

        let mut seen = HashSet::with_capacity(NUM_TASKS * IDS_PER_TASK);
        for batch in try_join_all(tasks).await.unwrap() {
            for id in batch? {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), NUM_TASKS * IDS_PER_TASK);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn can_call_next_id_async() -> Result<()> {
        let generator = Snowflake::new(1, 1)?;
        let id = generator.next_id_async().await?;
        assert_eq!(generator.decode_worker_id(id), 1);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn generates_many_unique_ids_sleep() -> Result<()> {
        many_unique_ids::<TokioSleep>().await
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn generates_many_unique_ids_yield() -> Result<()> {
        many_unique_ids::<TokioYield>().await
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn pending_bucket_resolves_after_clock_advances() -> Result<()> {
        let millis = Arc::new(AtomicU64::new(1_700_000_000_000));
        let generator = Snowflake::with_sources(
            SnowflakeConfig::default(),
            SharedMockTime(Arc::clone(&millis)),
            ThreadRandom,
        )?;

        for _ in 0..TOTAL_IDS {
            generator.next_id_async().await?;
        }

        let advance = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            millis.fetch_add(1, Ordering::SeqCst);
        });

        let id = generator.next_id_async().await?;
        assert_eq!(id.sequence(), 0);
        assert_eq!(generator.decode_timestamp(id), 1_700_000_000_001);
        advance.await.unwrap();
        Ok(())
    }
}
