//! k-fold cross-validation of one architecture.

use super::metrics::ClassificationMetrics;
use crate::data::{Dataset, Folds, Split};
use crate::error::Result;
use crate::evolve::{GaConfig, GeneticAlgorithm, GenomeHash};
use crate::network::fitness::NetworkFitness;
use crate::network::{Activation, Network, Topology};

/// Outcome of evolving and scoring one fold.
#[derive(Clone, Debug)]
pub struct FoldResult {
    /// 1-based fold number.
    pub fold: usize,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub train_metrics: ClassificationMetrics,
    pub test_metrics: ClassificationMetrics,
    pub generations: usize,
    pub best_fitness: f64,
    pub genome: GenomeHash,
}

/// Seed for the optimizer of one fold.
pub fn fold_seed(seed: u64, fold: usize) -> u64 {
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(fold as u64)
}

/// Cross-validation settings for one hidden-layer architecture.
#[derive(Clone, Debug)]
pub struct CrossValidation {
    pub hidden: Vec<usize>,
    pub activation: Activation,
    pub ga: GaConfig,
    pub seed: u64,
    pub parallel: bool,
}

impl CrossValidation {
    pub fn new(hidden: Vec<usize>, activation: Activation, ga: GaConfig) -> Self {
        Self {
            hidden,
            activation,
            ga,
            seed: 42,
            parallel: false,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// `[features, hidden.., 1]`.
    pub fn topology(&self, features: usize) -> Result<Topology> {
        Topology::binary(features, &self.hidden)
    }

    /// Evolve a fresh network per fold, in fold order.
    pub fn run(&self, dataset: &Dataset, folds: &Folds) -> Result<Vec<FoldResult>> {
        let topology = self.topology(dataset.feature_count())?;
        let mut results = Vec::with_capacity(folds.k());
        for fold in 0..folds.k() {
            let split = folds.split(dataset, fold)?;
            results.push(self.run_fold(&topology, &split, fold)?);
        }
        Ok(results)
    }

    /// Evolve on the training side of `split`, score both sides with the
    /// best-ever genome.
    pub fn run_fold(&self, topology: &Topology, split: &Split, fold: usize) -> Result<FoldResult> {
        let network = Network::from_topology(topology.clone(), self.activation);
        let genome_len = network.param_count();
        tracing::info!(
            network = %network.summary(),
            fold = fold + 1,
            train = split.train_x.len(),
            test = split.test_x.len(),
            "evolving fold"
        );
        let mut fitness = NetworkFitness::new(network, &split.train_x, &split.train_y)?
            .with_parallel(self.parallel);

        let (best, generations) = {
            let mut ga = GeneticAlgorithm::new(genome_len, self.ga.clone(), fold_seed(self.seed, fold))?;
            ga.set_fitness(&mut fitness);
            ga.evolve()?;
            (ga.best_individual().clone(), ga.best_fitness_history().len())
        };

        let mut network = fitness.into_network();
        network.decode(&best.genome)?;
        let train_accuracy = network.evaluate_accuracy(&split.train_x, &split.train_y)?;
        let test_accuracy = network.evaluate_accuracy(&split.test_x, &split.test_y)?;
        let train_pred = network.predict_all(&split.train_x)?;
        let test_pred = network.predict_all(&split.test_x)?;

        let result = FoldResult {
            fold: fold + 1,
            train_accuracy,
            test_accuracy,
            train_metrics: ClassificationMetrics::from_predictions(&train_pred, &split.train_y),
            test_metrics: ClassificationMetrics::from_predictions(&test_pred, &split.test_y),
            generations,
            best_fitness: best.fitness,
            genome: GenomeHash::of(&best.genome),
        };
        tracing::info!(
            fold = result.fold,
            train = result.train_accuracy,
            test = result.test_accuracy,
            best = result.best_fitness,
            genome = %result.genome,
            "fold complete"
        );
        Ok(result)
    }
}
