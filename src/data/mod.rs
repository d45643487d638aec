//! Dataset ingestion, normalization, and fold assignment.

pub mod dataset;
pub mod folds;
pub mod normalize;

pub use dataset::{ClassDistribution, Dataset, DatasetFormat, LabelMap};
pub use folds::{Folds, Split};
pub use normalize::FeatureStats;
