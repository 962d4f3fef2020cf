//! Mean resampling to a coarser calendar frequency.

use std::collections::BTreeMap;

use crate::domain::{Frequency, Observation};

/// Aggregate `points` into one row per calendar bucket present in the input.
///
/// Each bucket is labelled with its period-end date and carries the mean of its
/// non-null values, or `None` when every value in it is null. Buckets with no
/// input rows are not emitted (no interpolation). Output is sorted ascending.
pub fn resample_mean(points: &[Observation], freq: Frequency) -> Vec<Observation> {
    // bucket end -> (sum, count of non-null values)
    let mut buckets: BTreeMap<chrono::NaiveDate, (f64, usize)> = BTreeMap::new();

    for p in points {
        let Some(key) = freq.bucket_end(p.date) else {
            continue;
        };
        let entry = buckets.entry(key).or_insert((0.0, 0));
        if let Some(v) = p.value {
            entry.0 += v;
            entry.1 += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(date, (sum, n))| {
            let value = if n > 0 { Some(sum / n as f64) } else { None };
            Observation::new(date, value)
        })
        .collect()
}
