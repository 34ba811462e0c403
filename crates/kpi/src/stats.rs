//! Null-safe aggregates.

/// Arithmetic mean of the finite values, or `None` if there are none.
///
/// NaN and infinities are dropped silently rather than poisoning the mean.
pub fn average<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// `count / total` as a whole percentage, rounded half away from zero.
///
/// `None` when `total` is zero.
pub fn percentage(count: usize, total: usize) -> Option<i64> {
    (total > 0).then(|| (count as f64 / total as f64 * 100.0).round() as i64)
}
