//! Sampling engine.
//!
//! With a sort active the sample is the first `n` rows ("top N"). Without
//! one it is a uniform random draw without replacement; the drawn rows keep
//! their relative order.

use crate::types::Record;
use rand::seq::index;
use rand::Rng;

/// Reduce `rows` to at most `sample_size` rows using the thread RNG.
pub fn apply_sampling(rows: Vec<Record>, sample_size: Option<usize>, sort_active: bool) -> Vec<Record> {
    apply_sampling_with_rng(rows, sample_size, sort_active, &mut rand::thread_rng())
}

/// [`apply_sampling`] with a caller-supplied RNG, for reproducible draws.
pub fn apply_sampling_with_rng<R: Rng + ?Sized>(
    mut rows: Vec<Record>,
    sample_size: Option<usize>,
    sort_active: bool,
    rng: &mut R,
) -> Vec<Record> {
    let n = match sample_size {
        Some(n) if n > 0 && n < rows.len() => n,
        _ => return rows,
    };

    if sort_active {
        rows.truncate(n);
        return rows;
    }

    let mut picked = index::sample(rng, rows.len(), n).into_vec();
    picked.sort_unstable();

    let mut keep = vec![false; rows.len()];
    for i in picked {
        keep[i] = true;
    }
    rows.into_iter()
        .zip(keep)
        .filter_map(|(row, kept)| kept.then_some(row))
        .collect()
}
