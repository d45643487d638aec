//! Fully-connected feed-forward classifier whose parameters travel as a
//! flat genome.
//!
//! The network owns one weight matrix and one bias vector per layer
//! transition, plus per-layer activation buffers reused across forward
//! passes. [`Network::encode`] and [`Network::decode`] move parameters to and
//! from the genome using a [`ParamLayout`] computed once at construction.

pub mod activation;
pub mod fitness;
pub mod layout;

use rand::Rng;

use crate::error::{Error, Result};
pub use activation::Activation;
use activation::sigmoid;
pub use layout::{ParamLayout, Segment, SegmentKind};

/// Layer widths `[inputs, hidden.., outputs]`, immutable after validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology(Vec<usize>);

impl Topology {
    pub fn new(widths: Vec<usize>) -> Result<Self> {
        if widths.len() < 2 {
            return Err(Error::InvalidTopology {
                layers: widths,
                reason: "at least an input and an output layer are required".into(),
            });
        }
        if widths.iter().any(|&w| w == 0) {
            return Err(Error::InvalidTopology {
                layers: widths,
                reason: "every layer needs at least one neuron".into(),
            });
        }
        Ok(Self(widths))
    }

    /// Input layer, hidden layers, then a single output neuron.
    pub fn binary(inputs: usize, hidden: &[usize]) -> Result<Self> {
        let mut widths = Vec::with_capacity(hidden.len() + 2);
        widths.push(inputs);
        widths.extend_from_slice(hidden);
        widths.push(1);
        Self::new(widths)
    }

    pub fn widths(&self) -> &[usize] {
        &self.0
    }

    pub fn inputs(&self) -> usize {
        self.0[0]
    }

    pub fn outputs(&self) -> usize {
        self.0[self.0.len() - 1]
    }
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, w) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "-")?;
            }
            write!(f, "{}", w)?;
        }
        Ok(())
    }
}

/// One layer transition.
#[derive(Clone, Debug)]
struct Dense {
    fan_out: usize,
    /// Row-major `[fan_in][fan_out]`.
    weights: Vec<f64>,
    biases: Vec<f64>,
}

impl Dense {
    fn zeros(fan_in: usize, fan_out: usize) -> Self {
        Self {
            fan_out,
            weights: vec![0.0; fan_in * fan_out],
            biases: vec![0.0; fan_out],
        }
    }

    fn slot(&self, kind: SegmentKind) -> &[f64] {
        match kind {
            SegmentKind::Weights => &self.weights,
            SegmentKind::Biases => &self.biases,
        }
    }

    fn slot_mut(&mut self, kind: SegmentKind) -> &mut [f64] {
        match kind {
            SegmentKind::Weights => &mut self.weights,
            SegmentKind::Biases => &mut self.biases,
        }
    }
}

/// Feed-forward network. Cloning deep-copies parameters and scratch buffers.
#[derive(Clone, Debug)]
pub struct Network {
    topology: Topology,
    activation: Activation,
    layout: ParamLayout,
    layers: Vec<Dense>,
    /// Activation buffer per layer; index 0 holds the last input.
    outputs: Vec<Vec<f64>>,
}

impl Network {
    /// Allocate a zero-initialized network.
    pub fn new(widths: &[usize], activation: Activation) -> Result<Self> {
        let topology = Topology::new(widths.to_vec())?;
        Ok(Self::from_topology(topology, activation))
    }

    pub fn from_topology(topology: Topology, activation: Activation) -> Self {
        let widths = topology.widths();
        let layout = ParamLayout::new(widths);
        let layers = widths
            .windows(2)
            .map(|pair| Dense::zeros(pair[0], pair[1]))
            .collect();
        let outputs = widths.iter().map(|&w| vec![0.0; w]).collect();
        Self {
            topology,
            activation,
            layout,
            layers,
            outputs,
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn layout(&self) -> &ParamLayout {
        &self.layout
    }

    /// Number of weights and biases; the genome length.
    pub fn param_count(&self) -> usize {
        self.layout.total()
    }

    /// One-line description for logs.
    pub fn summary(&self) -> String {
        format!(
            "{} | {} params | {}",
            self.topology,
            self.param_count(),
            self.activation
        )
    }

    /// Flatten all parameters in canonical genome order.
    pub fn encode(&self) -> Vec<f64> {
        let mut genome = Vec::with_capacity(self.layout.total());
        for seg in self.layout.segments() {
            genome.extend_from_slice(self.layers[seg.layer].slot(seg.kind));
        }
        genome
    }

    /// Overwrite all parameters from a genome.
    ///
    /// The length is checked before anything is written, so a rejected
    /// genome leaves the network untouched.
    pub fn decode(&mut self, genome: &[f64]) -> Result<()> {
        if genome.len() != self.layout.total() {
            return Err(Error::GenomeSizeMismatch {
                expected: self.layout.total(),
                found: genome.len(),
            });
        }
        for seg in self.layout.segments() {
            self.layers[seg.layer]
                .slot_mut(seg.kind)
                .copy_from_slice(&genome[seg.range()]);
        }
        Ok(())
    }

    /// Fill every parameter uniformly from `[low, high]`, in genome order.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R, low: f64, high: f64) {
        for layer in &mut self.layers {
            for w in layer.weights.iter_mut() {
                *w = rng.gen_range(low..=high);
            }
            for b in layer.biases.iter_mut() {
                *b = rng.gen_range(low..=high);
            }
        }
    }

    /// Propagate one sample and return the output layer's activations.
    ///
    /// Hidden layers use the configured activation; the output layer always
    /// uses the logistic sigmoid.
    pub fn forward(&mut self, input: &[f64]) -> Result<&[f64]> {
        if input.len() != self.topology.inputs() {
            return Err(Error::InputSizeMismatch {
                expected: self.topology.inputs(),
                found: input.len(),
            });
        }
        self.outputs[0].copy_from_slice(input);

        let last = self.layers.len() - 1;
        for (l, layer) in self.layers.iter().enumerate() {
            let (done, pending) = self.outputs.split_at_mut(l + 1);
            let src = &done[l];
            let dst = &mut pending[0];
            for (j, out) in dst.iter_mut().enumerate() {
                let mut sum = layer.biases[j];
                for (i, &x) in src.iter().enumerate() {
                    sum += x * layer.weights[i * layer.fan_out + j];
                }
                *out = if l == last {
                    sigmoid(sum)
                } else {
                    self.activation.apply(sum)
                };
            }
        }

        Ok(&self.outputs[last + 1])
    }

    /// Class index for one sample.
    pub fn predict(&mut self, input: &[f64]) -> Result<usize> {
        let output = self.forward(input)?;
        Ok(classify(output))
    }

    /// Class index for every sample, in order.
    pub fn predict_all(&mut self, samples: &[Vec<f64>]) -> Result<Vec<usize>> {
        samples.iter().map(|x| self.predict(x)).collect()
    }

    /// Fraction of samples whose prediction equals the paired label.
    ///
    /// `samples` must be non-empty; the ratio is undefined otherwise.
    pub fn evaluate_accuracy(&mut self, samples: &[Vec<f64>], labels: &[usize]) -> Result<f64> {
        if samples.len() != labels.len() {
            return Err(Error::SizeMismatch {
                samples: samples.len(),
                labels: labels.len(),
            });
        }
        let mut correct = 0usize;
        for (x, &y) in samples.iter().zip(labels) {
            if self.predict(x)? == y {
                correct += 1;
            }
        }
        Ok(correct as f64 / samples.len() as f64)
    }
}

/// Map an output vector to a class index.
///
/// A single unit thresholds at 0.5 inclusive. Several units take the
/// arg-max; the first maximum wins.
pub fn classify(output: &[f64]) -> usize {
    if output.len() == 1 {
        return usize::from(output[0] >= 0.5);
    }
    let mut best = 0;
    for (i, &v) in output.iter().enumerate().skip(1) {
        if v > output[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn random_genome(len: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..len).map(|_| rng.gen_range(-2.0..2.0)).collect()
    }

    #[test]
    fn rejects_single_layer() {
        let err = Network::new(&[4], Activation::Sigmoid).unwrap_err();
        assert!(matches!(err, Error::InvalidTopology { .. }));
    }

    #[test]
    fn rejects_empty_layer() {
        let err = Network::new(&[4, 0, 1], Activation::Sigmoid).unwrap_err();
        assert!(matches!(err, Error::InvalidTopology { .. }));
    }

    #[test]
    fn param_count_matches_formula() {
        let net = Network::new(&[2, 2, 1], Activation::Sigmoid).unwrap();
        assert_eq!(net.param_count(), 9);
        let net = Network::new(&[30, 20, 10, 1], Activation::Tanh).unwrap();
        assert_eq!(net.param_count(), 30 * 20 + 20 + 20 * 10 + 10 + 10 + 1);
    }

    #[test]
    fn new_network_is_zeroed() {
        let net = Network::new(&[3, 4, 2], Activation::Relu).unwrap();
        assert!(net.encode().iter().all(|&g| g == 0.0));
    }

    #[test]
    fn genome_roundtrip() {
        for (i, widths) in [vec![2, 2, 1], vec![5, 1], vec![30, 15, 5, 1], vec![4, 7, 3]]
            .iter()
            .enumerate()
        {
            let mut net = Network::new(widths, Activation::Sigmoid).unwrap();
            let genome = random_genome(net.param_count(), i as u64);
            net.decode(&genome).unwrap();
            assert_eq!(net.encode(), genome, "topology {:?}", widths);
        }
    }

    #[test]
    fn decode_wrong_length_leaves_params_untouched() {
        let mut net = Network::new(&[2, 2, 1], Activation::Sigmoid).unwrap();
        let genome = random_genome(9, 7);
        net.decode(&genome).unwrap();

        for bad in [8, 10, 0] {
            let err = net.decode(&vec![1.0; bad]).unwrap_err();
            assert!(matches!(
                err,
                Error::GenomeSizeMismatch {
                    expected: 9,
                    found
                } if found == bad
            ));
            assert_eq!(net.encode(), genome);
        }
    }

    #[test]
    fn weights_are_source_major() {
        // W0 = [[1, 2], [0, 0]], b0 = 0, W1 = [1, 0], b1 = 0.
        let mut net = Network::new(&[2, 2, 1], Activation::Relu).unwrap();
        net.decode(&[1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0])
            .unwrap();
        let out = net.forward(&[1.0, 5.0]).unwrap()[0];
        // hidden = [1*1 + 5*0, 1*2 + 5*0] = [1, 2]; output = sigmoid(1)
        assert!((out - sigmoid(1.0)).abs() < 1e-12, "got {}", out);
    }

    #[test]
    fn output_layer_is_always_sigmoid() {
        let mut net = Network::new(&[1, 1], Activation::Relu).unwrap();
        net.decode(&[-10.0, 0.0]).unwrap();
        let out = net.forward(&[1.0]).unwrap()[0];
        assert!(out > 0.0 && out < 0.5);
        assert!((out - sigmoid(-10.0)).abs() < 1e-15);
    }

    #[test]
    fn hidden_layer_uses_configured_activation() {
        // hidden = relu(-2) = 0, output = sigmoid(0)
        let mut net = Network::new(&[1, 1, 1], Activation::Relu).unwrap();
        net.decode(&[1.0, 0.0, 1.0, 0.0]).unwrap();
        assert_eq!(net.forward(&[-2.0]).unwrap()[0], 0.5);

        let mut net = Network::new(&[1, 1, 1], Activation::Tanh).unwrap();
        net.decode(&[1.0, 0.0, 1.0, 0.0]).unwrap();
        let out = net.forward(&[-2.0]).unwrap()[0];
        assert!((out - sigmoid((-2.0f64).tanh())).abs() < 1e-12);
    }

    #[test]
    fn forward_rejects_wrong_input_length() {
        let mut net = Network::new(&[3, 2, 1], Activation::Sigmoid).unwrap();
        let err = net.forward(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::InputSizeMismatch {
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn forward_output_in_open_unit_interval() {
        let mut net = Network::new(&[4, 6, 3], Activation::Tanh).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        net.randomize(&mut rng, -1.0, 1.0);
        for k in 0..20 {
            let x: Vec<f64> = (0..4).map(|i| (i as f64 - k as f64) * 0.3).collect();
            let out = net.forward(&x).unwrap();
            assert_eq!(out.len(), 3);
            assert!(out.iter().all(|&v| v > 0.0 && v < 1.0), "{:?}", out);
        }
    }

    #[test]
    fn forward_is_stateless() {
        let mut net = Network::new(&[2, 3, 1], Activation::Sigmoid).unwrap();
        net.decode(&random_genome(net.param_count(), 3)).unwrap();
        let a = net.forward(&[0.4, -1.2]).unwrap().to_vec();
        net.forward(&[9.0, 9.0]).unwrap();
        let b = net.forward(&[0.4, -1.2]).unwrap().to_vec();
        assert_eq!(a, b);
    }

    #[test]
    fn predict_threshold_is_inclusive() {
        // All-zero parameters give a raw output of exactly sigmoid(0) = 0.5.
        let mut net = Network::new(&[2, 2, 1], Activation::Sigmoid).unwrap();
        assert_eq!(net.forward(&[0.3, 0.7]).unwrap()[0], 0.5);
        assert_eq!(net.predict(&[0.3, 0.7]).unwrap(), 1);
    }

    #[test]
    fn classify_first_maximum_wins() {
        assert_eq!(classify(&[0.2, 0.9, 0.9]), 1);
        assert_eq!(classify(&[0.7, 0.1, 0.7]), 0);
        assert_eq!(classify(&[0.1, 0.2, 0.3]), 2);
        assert_eq!(classify(&[0.49]), 0);
        assert_eq!(classify(&[0.5]), 1);
    }

    #[test]
    fn accuracy_three_of_four() {
        // Zero network predicts class 1 everywhere.
        let mut net = Network::new(&[2, 1], Activation::Sigmoid).unwrap();
        let x = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![2.0, 2.0], vec![-1.0, 3.0]];
        let y = vec![1, 1, 1, 0];
        assert_eq!(net.evaluate_accuracy(&x, &y).unwrap(), 0.75);
    }

    #[test]
    fn accuracy_rejects_mismatched_lengths() {
        let mut net = Network::new(&[2, 1], Activation::Sigmoid).unwrap();
        let err = net
            .evaluate_accuracy(&[vec![0.0, 0.0]], &[1, 0])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::SizeMismatch {
                samples: 1,
                labels: 2
            }
        ));
    }

    #[test]
    fn randomize_respects_bounds_and_seed() {
        let mut a = Network::new(&[5, 4, 1], Activation::Sigmoid).unwrap();
        let mut b = a.clone();
        a.randomize(&mut StdRng::seed_from_u64(5), -0.5, 0.5);
        b.randomize(&mut StdRng::seed_from_u64(5), -0.5, 0.5);
        assert_eq!(a.encode(), b.encode());
        assert!(a.encode().iter().all(|g| (-0.5..=0.5).contains(g)));
    }

    #[test]
    fn topology_display() {
        let t = Topology::binary(30, &[15, 5]).unwrap();
        assert_eq!(t.to_string(), "30-15-5-1");
        let net = Network::from_topology(t, Activation::Sigmoid);
        assert_eq!(net.summary(), "30-15-5-1 | 551 params | sigmoid");
    }
}
