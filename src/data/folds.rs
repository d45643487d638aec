//! Seeded k-fold assignment.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::Dataset;
use crate::error::{Error, Result};

/// Fold index per sample.
///
/// Sample indices are shuffled with a seeded RNG; the sample at shuffled
/// position `i` lands in fold `i % k`, so fold sizes differ by at most one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Folds {
    assignment: Vec<usize>,
    k: usize,
}

/// One train/test partition. Both sides keep dataset order.
#[derive(Clone, Debug, Default)]
pub struct Split {
    pub train_x: Vec<Vec<f64>>,
    pub train_y: Vec<usize>,
    pub test_x: Vec<Vec<f64>>,
    pub test_y: Vec<usize>,
}

impl Folds {
    pub fn new(n_samples: usize, k: usize, seed: u64) -> Result<Self> {
        if k < 2 {
            return Err(Error::Dataset(format!("need at least 2 folds, got {}", k)));
        }
        if k > n_samples {
            return Err(Error::Dataset(format!(
                "cannot split {} samples into {} folds",
                n_samples, k
            )));
        }
        let mut indices: Vec<usize> = (0..n_samples).collect();
        indices.shuffle(&mut StdRng::seed_from_u64(seed));

        let mut assignment = vec![0; n_samples];
        for (position, &sample) in indices.iter().enumerate() {
            assignment[sample] = position % k;
        }
        tracing::debug!(samples = n_samples, folds = k, seed, "fold assignment created");
        Ok(Self { assignment, k })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.assignment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }

    pub fn fold_of(&self, sample: usize) -> usize {
        self.assignment[sample]
    }

    /// Number of samples in each fold.
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for &f in &self.assignment {
            sizes[f] += 1;
        }
        sizes
    }

    /// Hold out `test_fold`, train on the rest.
    pub fn split(&self, dataset: &Dataset, test_fold: usize) -> Result<Split> {
        if test_fold >= self.k {
            return Err(Error::Dataset(format!(
                "fold {} out of range for {} folds",
                test_fold, self.k
            )));
        }
        if dataset.len() != self.assignment.len() {
            return Err(Error::Dataset(format!(
                "fold assignment covers {} samples but the dataset has {}",
                self.assignment.len(),
                dataset.len()
            )));
        }
        let mut split = Split::default();
        for ((x, &y), &fold) in dataset
            .features()
            .iter()
            .zip(dataset.labels())
            .zip(&self.assignment)
        {
            if fold == test_fold {
                split.test_x.push(x.clone());
                split.test_y.push(y);
            } else {
                split.train_x.push(x.clone());
                split.train_y.push(y);
            }
        }
        Ok(split)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> Dataset {
        Dataset::from_parts(
            (0..n).map(|i| i.to_string()).collect(),
            (0..n).map(|i| vec![i as f64]).collect(),
            (0..n).map(|i| i % 2).collect(),
        )
        .unwrap()
    }

    #[test]
    fn balanced_sizes() {
        let folds = Folds::new(23, 5, 42).unwrap();
        let sizes = folds.sizes();
        assert_eq!(sizes.iter().sum::<usize>(), 23);
        assert!(sizes.iter().all(|&s| s == 4 || s == 5));
        assert_eq!(sizes.iter().filter(|&&s| s == 5).count(), 3);
    }

    #[test]
    fn deterministic_per_seed() {
        assert_eq!(Folds::new(50, 10, 42).unwrap(), Folds::new(50, 10, 42).unwrap());
        assert_ne!(Folds::new(50, 10, 42).unwrap(), Folds::new(50, 10, 43).unwrap());
    }

    #[test]
    fn rejects_bad_k() {
        assert!(matches!(Folds::new(10, 1, 0), Err(Error::Dataset(_))));
        assert!(matches!(Folds::new(3, 4, 0), Err(Error::Dataset(_))));
        assert!(Folds::new(4, 4, 0).is_ok());
    }

    #[test]
    fn splits_partition_the_dataset() {
        let ds = dataset(20);
        let folds = Folds::new(20, 4, 7).unwrap();
        let mut seen = Vec::new();
        for f in 0..4 {
            let split = folds.split(&ds, f).unwrap();
            assert_eq!(split.train_x.len() + split.test_x.len(), 20);
            assert_eq!(split.test_x.len(), split.test_y.len());
            // Dataset order is preserved.
            assert!(split.test_x.windows(2).all(|w| w[0][0] < w[1][0]));
            for (x, &y) in split.test_x.iter().zip(&split.test_y) {
                assert_eq!(y, (x[0] as usize) % 2);
                seen.push(x[0] as usize);
            }
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn split_rejects_bad_fold_and_dataset() {
        let folds = Folds::new(10, 2, 1).unwrap();
        assert!(folds.split(&dataset(10), 2).is_err());
        assert!(folds.split(&dataset(12), 0).is_err());
    }
}
