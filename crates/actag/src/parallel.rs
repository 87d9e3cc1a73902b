use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::AcTagError;

/// Controls how the candidate quads of a frame are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionStrategy {
    /// Decode the quads one after the other on the current thread.
    #[default]
    Serial,

    /// Decode the quads in parallel on the global Rayon thread pool.
    ParallelQuads,

    /// Decode the quads on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    Fixed(usize),
}

/// Applies `f` to every item, following `strategy`.
///
/// The results are returned in the order of `items` whatever the strategy.
pub fn map_items<I, R, F>(
    items: &[I],
    strategy: ExecutionStrategy,
    f: F,
) -> Result<Vec<R>, AcTagError>
where
    I: Sync,
    R: Send,
    F: Fn(&I) -> R + Sync + Send,
{
    match strategy {
        ExecutionStrategy::Serial => Ok(items.iter().map(f).collect()),
        ExecutionStrategy::ParallelQuads => Ok(items.par_iter().map(f).collect()),
        ExecutionStrategy::Fixed(num_threads) => {
            if num_threads == 0 {
                return Err(AcTagError::ThreadPool(
                    "thread count must be > 0".to_string(),
                ));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build()
                .map_err(|e| AcTagError::ThreadPool(e.to_string()))?;

            Ok(pool.install(|| items.par_iter().map(f).collect()))
        }
    }
}
