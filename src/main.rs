use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::inspect::{cmd_inspect, InspectArgs};
use cli::run::{cmd_run, RunArgs};

#[derive(Parser)]
#[command(
    name = "evonet",
    version,
    about = "Evolve classifier weights with a genetic algorithm and cross-validate them"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Cross-validate every configured architecture and write CSV reports
    Run(RunArgs),
    /// Print dataset statistics
    Inspect(InspectArgs),
}

fn main() {
    let cli = Cli::parse();

    let quiet = matches!(&cli.command, Command::Run(args) if args.quiet);
    init_tracing(quiet);

    match cli.command {
        Command::Run(args) => cmd_run(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

/// Log to stderr. `RUST_LOG` wins over the default level.
fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    if let Err(e) = result {
        eprintln!("warning: logging disabled: {}", e);
    }
}
