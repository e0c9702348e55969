//! Spikerate CLI - offline harness for the mean spike rate estimator.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "spikerate")]
#[command(author, version, about = "Mean spike rate estimation harness", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a recorded spike event file into rate traces
    Process(commands::process::ProcessArgs),

    /// Run a synthetic steady-rate spike train and report convergence
    Simulate(commands::simulate::SimulateArgs),

    /// Inspect or toggle a persisted electrode selection
    Electrodes(commands::electrodes::ElectrodesArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Electrodes(args) => commands::electrodes::run(args),
    }
}
