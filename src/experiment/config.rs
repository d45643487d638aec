//! Experiment file (`evonet.toml`).
//!
//! Every table and every key is optional. A missing `[ga]` key takes the
//! [`GaConfig`] default, except `mutation_rate`, which defaults to
//! [`EXPERIMENT_MUTATION_RATE`] for experiments.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::data::{DatasetFormat, LabelMap};
use crate::error::{Error, Result};
use crate::evolve::GaConfig;
use crate::network::Activation;

pub const EXPERIMENT_MUTATION_RATE: f64 = 0.15;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    pub data: DataSection,
    pub network: NetworkSection,
    #[serde(deserialize_with = "experiment_ga")]
    pub ga: ExperimentGa,
    pub experiment: RunSection,
}

/// `[ga]` with the experiment-level mutation default.
#[derive(Clone, Debug, PartialEq)]
pub struct ExperimentGa(pub GaConfig);

impl Default for ExperimentGa {
    fn default() -> Self {
        Self(GaConfig {
            mutation_rate: EXPERIMENT_MUTATION_RATE,
            ..GaConfig::default()
        })
    }
}

fn experiment_ga<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<ExperimentGa, D::Error> {
    let mut table = toml::Table::deserialize(deserializer)?;
    table
        .entry("mutation_rate")
        .or_insert(toml::Value::Float(EXPERIMENT_MUTATION_RATE));
    GaConfig::deserialize(toml::Value::Table(table))
        .map(ExperimentGa)
        .map_err(serde::de::Error::custom)
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataSection {
    /// Dataset file; the command line may supply it instead.
    pub path: Option<PathBuf>,
    pub positive_label: String,
    pub negative_label: String,
    /// Feature columns per line; `0` infers them from the first good line.
    pub features: usize,
    pub folds: usize,
    pub fold_seed: u64,
}

impl Default for DataSection {
    fn default() -> Self {
        let labels = LabelMap::default();
        Self {
            path: None,
            positive_label: labels.positive,
            negative_label: labels.negative,
            features: 30,
            folds: 10,
            fold_seed: 42,
        }
    }
}

impl DataSection {
    pub fn format(&self) -> DatasetFormat {
        DatasetFormat {
            labels: LabelMap::new(self.positive_label.clone(), self.negative_label.clone()),
            features: (self.features > 0).then_some(self.features),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkSection {
    pub activation: Activation,
    /// Hidden-layer widths per architecture; input and output layers are
    /// implied.
    pub hidden: Vec<Vec<usize>>,
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            activation: Activation::Sigmoid,
            hidden: vec![vec![10], vec![20], vec![15, 5], vec![20, 10], vec![30, 15]],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSection {
    /// Repetitions of every architecture.
    pub runs: usize,
    pub seed: u64,
    pub parallel: bool,
    pub output_dir: PathBuf,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            runs: 1,
            seed: 42,
            parallel: false,
            output_dir: PathBuf::from("."),
        }
    }
}

impl ExperimentConfig {
    /// Read, parse, and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse and validate TOML text. `source_name` appears in errors.
    pub fn parse(content: &str, source_name: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::ConfigParse {
            path: source_name.to_string(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn ga(&self) -> &GaConfig {
        &self.ga.0
    }

    pub fn ga_mut(&mut self) -> &mut GaConfig {
        &mut self.ga.0
    }

    pub fn validate(&self) -> Result<()> {
        self.ga().validate()?;
        if self.data.folds < 2 {
            return Err(Error::Configuration(format!(
                "data.folds must be at least 2, got {}",
                self.data.folds
            )));
        }
        if self.experiment.runs == 0 {
            return Err(Error::Configuration("experiment.runs must be at least 1".into()));
        }
        if self.network.hidden.is_empty() {
            return Err(Error::Configuration(
                "network.hidden must list at least one architecture".into(),
            ));
        }
        if let Some(bad) = self.network.hidden.iter().find(|h| h.contains(&0)) {
            return Err(Error::Configuration(format!(
                "network.hidden entry {:?} has a zero-width layer",
                bad
            )));
        }
        if self.data.positive_label == self.data.negative_label {
            return Err(Error::Configuration(format!(
                "positive and negative labels are both '{}'",
                self.data.positive_label
            )));
        }
        Ok(())
    }
}
