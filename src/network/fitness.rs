//! Training-set accuracy as a fitness function.

use rayon::prelude::*;

use super::Network;
use crate::error::{Error, Result};
use crate::evolve::{FitnessFunction, Individual};

/// Scores a genome by loading it into a network and measuring accuracy on
/// a fixed training partition.
///
/// The network is scratch space: every evaluation overwrites its
/// parameters. In parallel mode each rayon worker gets its own clone, so
/// evaluations never share buffers.
pub struct NetworkFitness<'a> {
    network: Network,
    samples: &'a [Vec<f64>],
    labels: &'a [usize],
    parallel: bool,
}

impl<'a> NetworkFitness<'a> {
    pub fn new(network: Network, samples: &'a [Vec<f64>], labels: &'a [usize]) -> Result<Self> {
        if samples.len() != labels.len() {
            return Err(Error::SizeMismatch {
                samples: samples.len(),
                labels: labels.len(),
            });
        }
        Ok(Self {
            network,
            samples,
            labels,
            parallel: false,
        })
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Recover the network. Its parameters are whatever was decoded last.
    pub fn into_network(self) -> Network {
        self.network
    }
}

impl FitnessFunction for NetworkFitness<'_> {
    fn evaluate(&mut self, genome: &[f64]) -> Result<f64> {
        self.network.decode(genome)?;
        self.network.evaluate_accuracy(self.samples, self.labels)
    }

    fn genome_len(&self) -> Option<usize> {
        Some(self.network.param_count())
    }

    fn evaluate_all(&mut self, individuals: &mut [Individual]) -> Result<()> {
        if !self.parallel {
            for individual in individuals.iter_mut() {
                individual.fitness = self.evaluate(&individual.genome)?;
            }
            return Ok(());
        }

        let template = &self.network;
        let samples = self.samples;
        let labels = self.labels;
        individuals
            .par_iter_mut()
            .map_init(
                || template.clone(),
                |net, individual| -> Result<()> {
                    net.decode(&individual.genome)?;
                    individual.fitness = net.evaluate_accuracy(samples, labels)?;
                    Ok(())
                },
            )
            .collect::<Result<()>>()
    }
}
