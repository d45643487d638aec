//! Multi-architecture, multi-run cross-validation experiments.

pub mod config;
pub mod cv;
pub mod metrics;
pub mod results;

pub use config::ExperimentConfig;
pub use cv::{fold_seed, CrossValidation, FoldResult};
pub use metrics::ClassificationMetrics;
pub use results::{ExperimentResult, ResultsTable};

use crate::data::{Dataset, Folds};
use crate::error::Result;

/// Every configured architecture, `runs` times each.
pub struct Experiment<'c> {
    config: &'c ExperimentConfig,
}

impl<'c> Experiment<'c> {
    pub fn new(config: &'c ExperimentConfig) -> Self {
        Self { config }
    }

    /// Cross-validation settings for one architecture and run. Run `r` uses
    /// seed `experiment.seed + r`.
    pub fn cross_validation(&self, hidden: &[usize], run: usize) -> CrossValidation {
        CrossValidation::new(
            hidden.to_vec(),
            self.config.network.activation,
            self.config.ga().clone(),
        )
        .with_seed(self.config.experiment.seed.wrapping_add(run as u64))
        .with_parallel(self.config.experiment.parallel)
    }

    pub fn run(&self, dataset: &Dataset, folds: &Folds) -> Result<ResultsTable> {
        self.run_with(dataset, folds, |_| {})
    }

    /// Like [`Experiment::run`], calling `on_result` after every completed
    /// cross-validation.
    pub fn run_with(
        &self,
        dataset: &Dataset,
        folds: &Folds,
        mut on_result: impl FnMut(&ExperimentResult),
    ) -> Result<ResultsTable> {
        let mut table = ResultsTable::new();
        let runs = self.config.experiment.runs;
        for hidden in &self.config.network.hidden {
            for run in 0..runs {
                let cv = self.cross_validation(hidden, run);
                let topology = cv.topology(dataset.feature_count())?;
                tracing::info!(
                    architecture = %topology,
                    run = run + 1,
                    runs,
                    seed = cv.seed,
                    "cross-validating"
                );
                let fold_results = cv.run(dataset, folds)?;
                let result = ExperimentResult::from_folds(topology, run + 1, cv.seed, fold_results);
                tracing::info!(
                    architecture = %result.architecture,
                    mean_test = result.mean_test_accuracy,
                    std_test = result.std_test_accuracy,
                    "cross-validation complete"
                );
                on_result(&result);
                table.push(result);
            }
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        let n = 24;
        Dataset::from_parts(
            (0..n).map(|i| format!("s{}", i)).collect(),
            (0..n)
                .map(|i| {
                    let c = if i % 2 == 0 { -1.0 } else { 1.0 };
                    vec![c, c * 0.5, (i as f64).cos()]
                })
                .collect(),
            (0..n).map(|i| i % 2).collect(),
        )
        .unwrap()
    }

    fn config() -> ExperimentConfig {
        ExperimentConfig::parse(
            "[data]\nfolds = 3\n[network]\nhidden = [[2], [3, 2]]\n[ga]\npopulation_size = 8\nmax_generations = 4\nverbose = false\n[experiment]\nruns = 2\nseed = 10\n",
            "test",
        )
        .unwrap()
    }

    #[test]
    fn architectures_times_runs() {
        let config = config();
        let ds = dataset();
        let folds = Folds::new(ds.len(), config.data.folds, config.data.fold_seed).unwrap();
        let mut seen = Vec::new();
        let table = Experiment::new(&config)
            .run_with(&ds, &folds, |r| seen.push((r.architecture.to_string(), r.run, r.seed)))
            .unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(
            seen,
            vec![
                ("3-2-1".to_string(), 1, 10),
                ("3-2-1".to_string(), 2, 11),
                ("3-3-2-1".to_string(), 1, 10),
                ("3-3-2-1".to_string(), 2, 11),
            ]
        );
        assert!(table.experiments().iter().all(|e| e.folds.len() == 3));
    }

    #[test]
    fn runs_are_reproducible() {
        let config = config();
        let ds = dataset();
        let folds = Folds::new(ds.len(), 3, 42).unwrap();
        let a = Experiment::new(&config).run(&ds, &folds).unwrap();
        let b = Experiment::new(&config).run(&ds, &folds).unwrap();
        for (x, y) in a.experiments().iter().zip(b.experiments()) {
            assert_eq!(x.mean_test_accuracy, y.mean_test_accuracy);
            let gx: Vec<_> = x.folds.iter().map(|f| f.genome).collect();
            let gy: Vec<_> = y.folds.iter().map(|f| f.genome).collect();
            assert_eq!(gx, gy);
        }
    }
}
