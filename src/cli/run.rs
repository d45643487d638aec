use std::path::PathBuf;

use clap::Args;

use evonet::data::Folds;
use evonet::experiment::Experiment;
use evonet::network::Activation;

use super::{fail, load_config, load_dataset, print_dataset_summary};

#[derive(Args)]
pub struct RunArgs {
    /// Dataset file (overrides data.path from the config)
    pub data: Option<PathBuf>,
    /// Experiment file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Repetitions of every architecture
    #[arg(long)]
    pub runs: Option<usize>,
    /// Generations per evolutionary run
    #[arg(long)]
    pub generations: Option<usize>,
    /// Population size
    #[arg(long)]
    pub population: Option<usize>,
    /// Base seed for the optimizers
    #[arg(long)]
    pub seed: Option<u64>,
    /// Number of cross-validation folds
    #[arg(long)]
    pub folds: Option<usize>,
    /// Hidden-layer activation (sigmoid, tanh, relu)
    #[arg(long)]
    pub activation: Option<Activation>,
    /// Evaluate offspring on all cores
    #[arg(long)]
    pub parallel: bool,
    /// Only log warnings; suppress optimizer progress
    #[arg(short, long)]
    pub quiet: bool,
    /// Directory for all_results.csv and results_summary.csv
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

pub fn cmd_run(args: RunArgs) {
    let mut config = load_config(args.config.as_deref());

    if let Some(runs) = args.runs {
        config.experiment.runs = runs;
    }
    if let Some(generations) = args.generations {
        config.ga_mut().max_generations = generations;
    }
    if let Some(population) = args.population {
        config.ga_mut().population_size = population;
    }
    if let Some(seed) = args.seed {
        config.experiment.seed = seed;
    }
    if let Some(folds) = args.folds {
        config.data.folds = folds;
    }
    if let Some(activation) = args.activation {
        config.network.activation = activation;
    }
    if args.parallel {
        config.experiment.parallel = true;
    }
    if args.quiet {
        config.ga_mut().verbose = false;
    }
    if let Some(dir) = args.output_dir {
        config.experiment.output_dir = dir;
    }
    if let Err(e) = config.validate() {
        fail(e);
    }

    let Some(data_path) = args.data.or_else(|| config.data.path.clone()) else {
        fail("no dataset given; pass a path or set data.path in the config");
    };

    let mut dataset = load_dataset(&data_path, &config.data.format());
    print_dataset_summary(&data_path, &dataset);
    dataset.normalize();

    let folds = Folds::new(dataset.len(), config.data.folds, config.data.fold_seed)
        .unwrap_or_else(|e| fail(e));
    eprintln!(
        "Created {}-fold cross validation splits (fold seed {})",
        folds.k(),
        config.data.fold_seed
    );

    let out_dir = &config.experiment.output_dir;
    if let Err(e) = std::fs::create_dir_all(out_dir) {
        fail(format!("cannot create directory '{}': {}", out_dir.display(), e));
    }

    let table = Experiment::new(&config)
        .run_with(&dataset, &folds, |result| println!("{}", result.render()))
        .unwrap_or_else(|e| fail(e));

    println!("{}", table.comparison());

    let all = out_dir.join("all_results.csv");
    let summary = out_dir.join("results_summary.csv");
    if let Err(e) = table.write_all(&all) {
        fail(e);
    }
    if let Err(e) = table.write_summary(&summary) {
        fail(e);
    }
    eprintln!("Detailed results saved to {}", all.display());
    eprintln!("Summary saved to {}", summary.display());
}
