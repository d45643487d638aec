use std::path::PathBuf;

use clap::Args;

use evonet::data::FeatureStats;

use super::{load_config, load_dataset, print_dataset_summary};

#[derive(Args)]
pub struct InspectArgs {
    /// Dataset file
    pub data: PathBuf,
    /// Experiment file supplying label tokens and feature count
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

pub fn cmd_inspect(args: InspectArgs) {
    let config = load_config(args.config.as_deref());
    let dataset = load_dataset(&args.data, &config.data.format());
    print_dataset_summary(&args.data, &dataset);

    let stats = FeatureStats::fit(&dataset);
    println!("{:>7} | {:>14} | {:>14}", "Feature", "Mean", "Std");
    println!("{}", "-".repeat(41));
    for (i, (mean, std)) in stats.means.iter().zip(&stats.stds).enumerate() {
        println!("{:>7} | {:>14.6} | {:>14.6}", i + 1, mean, std);
    }
}
