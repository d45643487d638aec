pub mod inspect;
pub mod run;

use std::path::Path;
use std::process;

use evonet::data::{Dataset, DatasetFormat};
use evonet::diagnostic::render_diagnostics;
use evonet::experiment::ExperimentConfig;

/// Print `error: ...` and exit with status 1.
pub fn fail(err: impl std::fmt::Display) -> ! {
    eprintln!("error: {}", err);
    process::exit(1);
}

/// Load the experiment file, or the built-in defaults without one.
pub fn load_config(path: Option<&Path>) -> ExperimentConfig {
    match path {
        Some(path) => ExperimentConfig::load(path).unwrap_or_else(|e| fail(e)),
        None => ExperimentConfig::default(),
    }
}

/// Read and parse a dataset, rendering every skipped line.
pub fn load_dataset(path: &Path, format: &DatasetFormat) -> Dataset {
    let (dataset, warnings, source) =
        Dataset::load_with_source(path, format).unwrap_or_else(|e| fail(e));
    if !warnings.is_empty() {
        let filename = path.display().to_string();
        if let Err(e) = render_diagnostics(&warnings, &filename, &source) {
            eprintln!("warning: cannot render diagnostics: {}", e);
        }
        eprintln!("Skipped {} malformed line(s)", warnings.len());
    }
    dataset
}

/// Class balance and shape, to stderr.
pub fn print_dataset_summary(path: &Path, dataset: &Dataset) {
    let d = dataset.distribution();
    eprintln!(
        "Dataset: {} ({} samples, {} features)",
        path.display(),
        dataset.len(),
        dataset.feature_count()
    );
    eprintln!(
        "  Negative (0): {} ({:.2}%)  Positive (1): {} ({:.2}%)",
        d.negative,
        d.negative_pct(),
        d.positive,
        d.positive_pct()
    );
}
