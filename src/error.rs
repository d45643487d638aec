use std::path::PathBuf;

/// Errors surfaced by the network, the optimizer, and the experiment driver.
///
/// Every variant is a precondition violation or an I/O failure. Nothing is
/// retried and nothing is coerced: a wrong-length genome is never padded or
/// truncated.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid topology {layers:?}: {reason}")]
    InvalidTopology { layers: Vec<usize>, reason: String },

    #[error("genome size mismatch: expected {expected} genes, found {found}")]
    GenomeSizeMismatch { expected: usize, found: usize },

    #[error("input size mismatch: expected {expected} features, found {found}")]
    InputSizeMismatch { expected: usize, found: usize },

    #[error("size mismatch: {samples} samples but {labels} labels")]
    SizeMismatch { samples: usize, labels: usize },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("cannot parse '{path}': {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
