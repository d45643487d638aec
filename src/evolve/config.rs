use serde::Deserialize;

use crate::error::{Error, Result};

/// Genetic algorithm parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GaConfig {
    /// Individuals per generation, constant across the run.
    pub population_size: usize,
    /// Generations to run. There is no early exit.
    pub max_generations: usize,
    /// Probability that a parent pair recombines instead of passing through.
    pub crossover_rate: f64,
    /// Per-gene probability of perturbation.
    pub mutation_rate: f64,
    /// Half-width of the uniform mutation noise.
    pub mutation_strength: f64,
    /// Fraction of the population carried over unchanged, by rank.
    pub elitism_rate: f64,
    /// Draws per tournament.
    pub tournament_size: usize,
    /// Emit progress events at `info` level.
    pub verbose: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 100,
            crossover_rate: 0.8,
            mutation_rate: 0.1,
            mutation_strength: 0.3,
            elitism_rate: 0.1,
            tournament_size: 3,
            verbose: true,
        }
    }
}

impl GaConfig {
    /// Number of elites carried into each new generation.
    pub fn elite_count(&self) -> usize {
        (self.population_size as f64 * self.elitism_rate).floor() as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(Error::Configuration(
                "population_size must be at least 1".into(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(Error::Configuration(
                "tournament_size must be at least 1".into(),
            ));
        }
        for (name, rate) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
            ("elitism_rate", self.elitism_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(Error::Configuration(format!(
                    "{} must be within [0, 1], got {}",
                    name, rate
                )));
            }
        }
        if !(self.mutation_strength.is_finite() && self.mutation_strength > 0.0) {
            return Err(Error::Configuration(format!(
                "mutation_strength must be positive, got {}",
                self.mutation_strength
            )));
        }
        Ok(())
    }
}
