//! Plain summary statistics.

use acquisitions_analytics_models::NeighborStat;

/// Mean and population standard deviation of `values`, or `None` when
/// `values` is empty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_std_dev(values: &[f64]) -> Option<NeighborStat> {
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Some(NeighborStat {
        count,
        mean,
        std_dev: variance.sqrt(),
    })
}
