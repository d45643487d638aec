//! Genetic-algorithm weight search for feed-forward binary classifiers,
//! measured with k-fold cross-validation.
//!
//! The core is [`network::Network`] (topology, forward pass, flat genome
//! codec) and [`evolve::GeneticAlgorithm`] (tournament selection, uniform
//! crossover, clamped mutation, elitist replacement). [`data`] and
//! [`experiment`] supply datasets, folds, and reports around them.

pub mod data;
pub mod diagnostic;
pub mod error;
pub mod evolve;
pub mod experiment;
pub mod network;
pub mod span;

pub use error::{Error, Result};
pub use evolve::{FitnessFunction, GaConfig, GeneticAlgorithm, Individual};
pub use network::fitness::NetworkFitness;
pub use network::{Activation, Network, Topology};
