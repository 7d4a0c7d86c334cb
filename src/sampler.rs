// src/sampler.rs

use crate::error::SampleError;

/// Picks `k` evenly spaced 1-based positions out of `total`, always including
/// the first position and, for `k >= 2`, the last one.
///
/// Sample `i` lands on `round(1 + i * (total - 1) / (k - 1))`, rounding halves
/// up. Asking for at least as many samples as there are positions returns
/// every position.
pub fn sample_positions(total: usize, k: usize) -> Result<Vec<usize>, SampleError> {
    if k == 0 {
        return Err(SampleError::ZeroSampleSize);
    }
    if total == 0 {
        return Err(SampleError::EmptyHistory);
    }

    if k >= total {
        return Ok((1..=total).collect());
    }
    if k == 1 {
        return Ok(vec![1]);
    }

    let span = total - 1;
    let steps = k - 1;
    let mut positions: Vec<usize> = (0..k)
        .map(|i| 1 + (2 * i * span + steps) / (2 * steps))
        .collect();
    positions.dedup();
    Ok(positions)
}

/// Applies [`sample_positions`] to an ordered slice, returning the chosen items in order.
pub fn select<T: Clone>(items: &[T], k: usize) -> Result<Vec<T>, SampleError> {
    let positions = sample_positions(items.len(), k)?;
    Ok(positions.into_iter().map(|p| items[p - 1].clone()).collect())
}
