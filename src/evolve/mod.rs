//! Generational genetic algorithm over fixed-length real genomes.
//!
//! Tournament selection, rate-gated uniform crossover, per-gene uniform
//! mutation, elitist replacement. The loop always runs `max_generations`
//! generations. No gradients required.
//!
//! The optimizer keeps a best-ever individual outside the population.
//! Elitism only protects the top `floor(N * elitism_rate)` ranks, so the
//! population itself may lose its best member; the reported best never
//! regresses.

pub mod config;
pub mod fingerprint;
pub mod operators;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Error, Result};
pub use config::GaConfig;
pub use fingerprint::GenomeHash;

/// Range of the initial uniform genomes.
pub const INIT_LOW: f64 = -1.0;
pub const INIT_HIGH: f64 = 1.0;
/// Mutated genes are clamped into this range.
pub const GENE_MIN: f64 = -5.0;
pub const GENE_MAX: f64 = 5.0;
/// Fitness of an individual that has not been evaluated yet.
pub const UNEVALUATED: f64 = f64::NEG_INFINITY;

/// An individual in the population: genome + fitness.
#[derive(Clone, Debug, PartialEq)]
pub struct Individual {
    pub genome: Vec<f64>,
    pub fitness: f64,
}

impl Individual {
    pub fn new(genome: Vec<f64>) -> Self {
        Self {
            genome,
            fitness: UNEVALUATED,
        }
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness != UNEVALUATED
    }
}

/// Scores genomes for the optimizer. Higher is better.
pub trait FitnessFunction {
    fn evaluate(&mut self, genome: &[f64]) -> Result<f64>;

    /// Genome length this function expects, if it knows one.
    fn genome_len(&self) -> Option<usize> {
        None
    }

    /// Score a batch in place. The default walks the batch in order.
    fn evaluate_all(&mut self, individuals: &mut [Individual]) -> Result<()> {
        for individual in individuals.iter_mut() {
            individual.fitness = self.evaluate(&individual.genome)?;
        }
        Ok(())
    }
}

impl<F> FitnessFunction for F
where
    F: FnMut(&[f64]) -> f64,
{
    fn evaluate(&mut self, genome: &[f64]) -> Result<f64> {
        Ok(self(genome))
    }
}

/// Genetic algorithm state for one run.
///
/// Owns its RNG; two optimizers built with the same seed, configuration,
/// and fitness function produce identical runs.
pub struct GeneticAlgorithm<'f> {
    config: GaConfig,
    genome_len: usize,
    population: Vec<Individual>,
    best: Individual,
    best_history: Vec<f64>,
    avg_history: Vec<f64>,
    fitness: Option<&'f mut dyn FitnessFunction>,
    rng: StdRng,
}

impl<'f> GeneticAlgorithm<'f> {
    pub fn new(genome_len: usize, config: GaConfig, seed: u64) -> Result<Self> {
        Self::with_rng(genome_len, config, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(genome_len: usize, config: GaConfig, rng: StdRng) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            genome_len,
            population: Vec::new(),
            best: Individual::new(Vec::new()),
            best_history: Vec::new(),
            avg_history: Vec::new(),
            fitness: None,
            rng,
        })
    }

    /// Bind the fitness function. It stays exclusively borrowed by the
    /// optimizer until the optimizer is dropped.
    pub fn set_fitness(&mut self, fitness: &'f mut dyn FitnessFunction) {
        self.fitness = Some(fitness);
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    pub fn genome_len(&self) -> usize {
        self.genome_len
    }

    /// Current population. Unordered between generations.
    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    /// Best individual seen in any evaluation pass.
    pub fn best_individual(&self) -> &Individual {
        &self.best
    }

    pub fn best_fitness(&self) -> f64 {
        self.best.fitness
    }

    /// Best-ever fitness after each generation.
    pub fn best_fitness_history(&self) -> &[f64] {
        &self.best_history
    }

    /// Population mean fitness after each generation.
    pub fn avg_fitness_history(&self) -> &[f64] {
        &self.avg_history
    }

    /// Run the full search: initialize, evaluate, then `max_generations`
    /// rounds of breed, evaluate, replace.
    ///
    /// Fails before touching the population if no fitness function is bound
    /// or the bound function expects a different genome length.
    pub fn evolve(&mut self) -> Result<()> {
        let fitness = self.fitness.take().ok_or_else(|| {
            Error::Configuration("evolve() called without a fitness function".into())
        })?;
        if let Some(expected) = fitness.genome_len() {
            if expected != self.genome_len {
                let err = Error::Configuration(format!(
                    "fitness function expects {} genes but the optimizer evolves {}",
                    expected, self.genome_len
                ));
                self.fitness = Some(fitness);
                return Err(err);
            }
        }

        let result = self.run(&mut *fitness);
        self.fitness = Some(fitness);
        result
    }

    fn run(&mut self, fitness: &mut dyn FitnessFunction) -> Result<()> {
        let n = self.config.population_size;
        self.best = Individual::new(Vec::new());
        self.best_history.clear();
        self.avg_history.clear();

        let mut population = Vec::with_capacity(n);
        for _ in 0..n {
            let genome = operators::random_genome(&mut self.rng, self.genome_len, INIT_LOW, INIT_HIGH);
            population.push(Individual::new(genome));
        }
        fitness.evaluate_all(&mut population)?;
        self.population = population;
        track_best(&mut self.best, &self.population);

        if self.config.verbose {
            tracing::info!(
                population = n,
                generations = self.config.max_generations,
                genome_len = self.genome_len,
                initial_best = self.best.fitness,
                "starting genetic search"
            );
        }

        let generations = self.config.max_generations;
        for generation in 0..generations {
            let mut offspring = self.breed();
            fitness.evaluate_all(&mut offspring)?;
            track_best(&mut self.best, &offspring);
            self.replace(offspring);

            let mean = self.population.iter().map(|i| i.fitness).sum::<f64>()
                / self.population.len() as f64;
            self.best_history.push(self.best.fitness);
            self.avg_history.push(mean);

            if self.config.verbose && (generation % 10 == 0 || generation + 1 == generations) {
                tracing::info!(generation, best = self.best.fitness, mean, "generation");
            } else {
                tracing::debug!(generation, best = self.best.fitness, mean, "generation");
            }
        }

        if self.config.verbose {
            tracing::info!(
                best = self.best.fitness,
                generations = self.best_history.len(),
                "genetic search complete"
            );
        }
        Ok(())
    }

    /// Fill an offspring buffer of exactly `population_size` children.
    ///
    /// Per pair: two tournaments, crossover, then mutation of both children.
    /// The second child of the last pair is mutated and then dropped when
    /// the buffer is already full.
    fn breed(&mut self) -> Vec<Individual> {
        let n = self.config.population_size;
        let cfg = &self.config;
        let mut offspring = Vec::with_capacity(n);
        while offspring.len() < n {
            let a = operators::tournament(&self.population, cfg.tournament_size, &mut self.rng);
            let b = operators::tournament(&self.population, cfg.tournament_size, &mut self.rng);
            let (mut first, mut second) =
                operators::crossover(a, b, cfg.crossover_rate, &mut self.rng);
            operators::mutate(
                &mut first.genome,
                cfg.mutation_rate,
                cfg.mutation_strength,
                &mut self.rng,
            );
            operators::mutate(
                &mut second.genome,
                cfg.mutation_rate,
                cfg.mutation_strength,
                &mut self.rng,
            );
            offspring.push(first);
            if offspring.len() < n {
                offspring.push(second);
            }
        }
        offspring
    }

    /// Elitist replacement: top-ranked parents first, then the best
    /// offspring until the population is full again.
    fn replace(&mut self, mut offspring: Vec<Individual>) {
        let n = self.config.population_size;
        let mut parents = std::mem::take(&mut self.population);
        sort_by_fitness(&mut parents);
        sort_by_fitness(&mut offspring);

        let mut next = Vec::with_capacity(n);
        next.extend(parents.into_iter().take(self.config.elite_count()));
        let room = n - next.len();
        next.extend(offspring.into_iter().take(room));
        self.population = next;
    }
}

/// Stable sort, fittest first.
fn sort_by_fitness(individuals: &mut [Individual]) {
    individuals.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
}

/// Replace `best` with a copy of the fittest member of `evaluated` if it is
/// strictly better.
fn track_best(best: &mut Individual, evaluated: &[Individual]) {
    let mut top: Option<&Individual> = None;
    for individual in evaluated {
        if top.map_or(true, |t| individual.fitness > t.fitness) {
            top = Some(individual);
        }
    }
    if let Some(top) = top {
        if top.fitness > best.fitness {
            *best = top.clone();
        }
    }
}
