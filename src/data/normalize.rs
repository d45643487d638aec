use statrs::statistics::Statistics;

use super::Dataset;

/// Deviations below this are treated as constant features.
pub const MIN_STD: f64 = 1e-10;

/// Per-feature mean and population standard deviation.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureStats {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl FeatureStats {
    /// Fit on every sample of `dataset`. Near-constant features get a
    /// deviation of 1 so normalization only centers them.
    pub fn fit(dataset: &Dataset) -> Self {
        let rows = dataset.features();
        let mut means = Vec::with_capacity(dataset.feature_count());
        let mut stds = Vec::with_capacity(dataset.feature_count());
        for j in 0..dataset.feature_count() {
            let column: Vec<f64> = rows.iter().map(|r| r[j]).collect();
            let mean: f64 = column.iter().mean();
            means.push(mean);
            let std: f64 = column.iter().population_std_dev();
            stds.push(if std < MIN_STD || std.is_nan() { 1.0 } else { std });
        }
        Self { means, stds }
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    pub(crate) fn apply(&self, rows: &mut [Vec<f64>]) {
        for row in rows {
            for ((x, mean), std) in row.iter_mut().zip(&self.means).zip(&self.stds) {
                *x = (*x - mean) / std;
            }
        }
    }
}
