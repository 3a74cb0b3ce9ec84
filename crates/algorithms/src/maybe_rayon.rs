//! Row-parallel execution with a sequential fallback.
//!
//! With the `parallel` feature, rows are processed on rayon's pool; without
//! it they run in a plain loop. Either way results come
//! back in row order and the first error aborts the whole run.

use trackfuse_core::Result;

/// Apply `f` to every row index in `0..rows`, keeping row order.
#[cfg(feature = "parallel")]
pub(crate) fn map_rows<T, F>(rows: usize, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Send + Sync,
{
    use rayon::prelude::*;

    (0..rows).into_par_iter().map(f).collect()
}

/// Apply `f` to every row index in `0..rows`, keeping row order.
#[cfg(not(feature = "parallel"))]
pub(crate) fn map_rows<T, F>(rows: usize, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Send + Sync,
{
    (0..rows).map(f).collect()
}
