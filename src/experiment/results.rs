//! Aggregated cross-validation results, console reports, CSV export.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use statrs::statistics::Statistics;

use super::cv::FoldResult;
use super::metrics::ClassificationMetrics;
use crate::error::{Error, Result};
use crate::network::Topology;

pub const ALL_RESULTS_HEADER: &str = "Architecture,Run,Seed,Fold,Train_Accuracy,Test_Accuracy,Generations,Best_Fitness,\
Train_TP,Train_TN,Train_FP,Train_FN,Train_Precision,Train_Recall,Train_F1,\
Test_TP,Test_TN,Test_FP,Test_FN,Test_Precision,Test_Recall,Test_F1,Genome";

pub const SUMMARY_HEADER: &str = "Architecture,Run,Seed,Mean_Test_Accuracy,Std_Test_Accuracy,\
Mean_Train_Accuracy,Std_Train_Accuracy,Min_Test_Acc,Max_Test_Acc,Median_Test_Acc,\
Mean_Precision,Mean_Recall,Mean_F1";

/// One cross-validated architecture run.
#[derive(Clone, Debug)]
pub struct ExperimentResult {
    pub architecture: Topology,
    pub run: usize,
    pub seed: u64,
    pub folds: Vec<FoldResult>,
    pub mean_test_accuracy: f64,
    pub std_test_accuracy: f64,
    pub mean_train_accuracy: f64,
    pub std_train_accuracy: f64,
}

/// Mean and sample standard deviation; `(0, 0)` when empty, deviation 0
/// for a single value.
fn mean_std(values: &[f64]) -> (f64, f64) {
    match values.len() {
        0 => (0.0, 0.0),
        1 => (values[0], 0.0),
        _ => (values.iter().mean(), values.iter().std_dev()),
    }
}

fn mean_of(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        0.0
    } else {
        values.iter().mean()
    }
}

impl ExperimentResult {
    pub fn from_folds(architecture: Topology, run: usize, seed: u64, folds: Vec<FoldResult>) -> Self {
        let test: Vec<f64> = folds.iter().map(|f| f.test_accuracy).collect();
        let train: Vec<f64> = folds.iter().map(|f| f.train_accuracy).collect();
        let (mean_test_accuracy, std_test_accuracy) = mean_std(&test);
        let (mean_train_accuracy, std_train_accuracy) = mean_std(&train);
        Self {
            architecture,
            run,
            seed,
            folds,
            mean_test_accuracy,
            std_test_accuracy,
            mean_train_accuracy,
            std_train_accuracy,
        }
    }

    pub fn test_accuracies(&self) -> Vec<f64> {
        self.folds.iter().map(|f| f.test_accuracy).collect()
    }

    pub fn min_test_accuracy(&self) -> f64 {
        if self.folds.is_empty() {
            return 0.0;
        }
        Statistics::min(self.test_accuracies().iter())
    }

    pub fn max_test_accuracy(&self) -> f64 {
        if self.folds.is_empty() {
            return 0.0;
        }
        Statistics::max(self.test_accuracies().iter())
    }

    /// Upper-middle value of the sorted test accuracies; no averaging for
    /// an even fold count.
    pub fn median_test_accuracy(&self) -> f64 {
        let mut sorted = self.test_accuracies();
        if sorted.is_empty() {
            return 0.0;
        }
        sorted.sort_by(f64::total_cmp);
        sorted[sorted.len() / 2]
    }

    pub fn mean_test_precision(&self) -> f64 {
        mean_of(self.folds.iter().map(|f| f.test_metrics.precision))
    }

    pub fn mean_test_recall(&self) -> f64 {
        mean_of(self.folds.iter().map(|f| f.test_metrics.recall))
    }

    pub fn mean_test_f1(&self) -> f64 {
        mean_of(self.folds.iter().map(|f| f.test_metrics.f1))
    }

    /// Test confusion counts summed over folds.
    pub fn aggregated_test_metrics(&self) -> ClassificationMetrics {
        self.folds.iter().map(|f| &f.test_metrics).sum()
    }

    /// Per-fold table, cross-validation summary, aggregated test metrics.
    pub fn render(&self) -> String {
        let rule = "-".repeat(70);
        let mut out = String::new();
        let _ = writeln!(out, "{}", "=".repeat(70));
        let _ = writeln!(
            out,
            "Network Structure: {} (run {}, seed {})",
            self.architecture, self.run, self.seed
        );
        let _ = writeln!(out, "{}", "=".repeat(70));
        let _ = writeln!(out, "\nPer-Fold Results:");
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Fold | Train Acc  | Test Acc   | Generations | Best Fitness | Genome");
        let _ = writeln!(out, "{}", rule);
        for f in &self.folds {
            let _ = writeln!(
                out,
                "{:>4} | {:>9.4}% | {:>9.4}% | {:>11} | {:>12.4} | {}",
                f.fold,
                f.train_accuracy * 100.0,
                f.test_accuracy * 100.0,
                f.generations,
                f.best_fitness,
                f.genome
            );
        }
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "\nCross-Validation Summary:");
        let _ = writeln!(
            out,
            "  Mean Train Accuracy: {:.4}% (\u{b1}{:.4}%)",
            self.mean_train_accuracy * 100.0,
            self.std_train_accuracy * 100.0
        );
        let _ = writeln!(
            out,
            "  Mean Test Accuracy:  {:.4}% (\u{b1}{:.4}%)",
            self.mean_test_accuracy * 100.0,
            self.std_test_accuracy * 100.0
        );
        let _ = writeln!(out, "\nAggregated Test Metrics:");
        let _ = writeln!(out, "{}", self.aggregated_test_metrics());
        out
    }
}

/// All experiment results of a session.
#[derive(Clone, Debug, Default)]
pub struct ResultsTable {
    experiments: Vec<ExperimentResult>,
}

impl ResultsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: ExperimentResult) {
        self.experiments.push(result);
    }

    pub fn experiments(&self) -> &[ExperimentResult] {
        &self.experiments
    }

    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    /// Highest mean test accuracy; the earliest experiment wins ties.
    pub fn best(&self) -> Option<&ExperimentResult> {
        let mut best: Option<&ExperimentResult> = None;
        for e in &self.experiments {
            if best.map_or(true, |b| e.mean_test_accuracy > b.mean_test_accuracy) {
                best = Some(e);
            }
        }
        best
    }

    /// Architecture comparison table.
    pub fn comparison(&self) -> String {
        let Some(best) = self.best() else {
            return "No experiments to compare.\n".into();
        };
        let rule = "-".repeat(80);
        let mut out = String::new();
        let _ = writeln!(out, "{}", "=".repeat(80));
        let _ = writeln!(out, "COMPARISON OF ALL NETWORK ARCHITECTURES");
        let _ = writeln!(out, "{}\n", "=".repeat(80));
        let _ = writeln!(
            out,
            "{:<17} | {:>3} | Mean Test Acc | Std Dev  | Mean Train Acc",
            "Architecture", "Run"
        );
        let _ = writeln!(out, "{}", rule);
        for e in &self.experiments {
            let _ = writeln!(
                out,
                "{:<17} | {:>3} | {:>12.4}% | {:>7.4}% | {:>13.4}%",
                e.architecture.to_string(),
                e.run,
                e.mean_test_accuracy * 100.0,
                e.std_test_accuracy * 100.0,
                e.mean_train_accuracy * 100.0
            );
        }
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(
            out,
            "\nBest Architecture: {} (run {}, {:.4}%)",
            best.architecture,
            best.run,
            best.mean_test_accuracy * 100.0
        );
        out
    }

    /// Per-fold CSV.
    pub fn write_all(&self, path: &Path) -> Result<()> {
        write_csv(path, |w| {
            writeln!(w, "{}", ALL_RESULTS_HEADER)?;
            for e in &self.experiments {
                for f in &e.folds {
                    let (tr, te) = (&f.train_metrics, &f.test_metrics);
                    writeln!(
                        w,
                        "{},{},{},{},{:.6},{:.6},{},{:.6},{},{},{},{},{:.6},{:.6},{:.6},{},{},{},{},{:.6},{:.6},{:.6},{}",
                        e.architecture,
                        e.run,
                        e.seed,
                        f.fold,
                        f.train_accuracy,
                        f.test_accuracy,
                        f.generations,
                        f.best_fitness,
                        tr.true_positive,
                        tr.true_negative,
                        tr.false_positive,
                        tr.false_negative,
                        tr.precision,
                        tr.recall,
                        tr.f1,
                        te.true_positive,
                        te.true_negative,
                        te.false_positive,
                        te.false_negative,
                        te.precision,
                        te.recall,
                        te.f1,
                        f.genome.to_hex()
                    )?;
                }
            }
            Ok(())
        })?;
        tracing::info!(path = %path.display(), "detailed results written");
        Ok(())
    }

    /// Per-experiment summary CSV.
    pub fn write_summary(&self, path: &Path) -> Result<()> {
        write_csv(path, |w| {
            writeln!(w, "{}", SUMMARY_HEADER)?;
            for e in &self.experiments {
                writeln!(
                    w,
                    "{},{},{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
                    e.architecture,
                    e.run,
                    e.seed,
                    e.mean_test_accuracy,
                    e.std_test_accuracy,
                    e.mean_train_accuracy,
                    e.std_train_accuracy,
                    e.min_test_accuracy(),
                    e.max_test_accuracy(),
                    e.median_test_accuracy(),
                    e.mean_test_precision(),
                    e.mean_test_recall(),
                    e.mean_test_f1()
                )?;
            }
            Ok(())
        })?;
        tracing::info!(path = %path.display(), "summary written");
        Ok(())
    }
}

fn write_csv(
    path: &Path,
    body: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut w = BufWriter::new(file);
    body(&mut w).map_err(|e| Error::io(path, e))?;
    w.flush().map_err(|e| Error::io(path, e))
}
