use clap::Parser;
use log::error;
use std::path::PathBuf;

use traffic_flow::simulation;

#[derive(Parser)]
#[command(name = "traffic_flow")]
#[command(about = "Road traffic flow simulation over a key=value store")]
struct Cli {
    /// Path to the key=value store file
    #[arg(long, default_value = "TRAFFIC_MIB.txt")]
    store: PathBuf,

    /// Number of simulation steps to run
    #[arg(long, default_value = "60")]
    steps: u32,

    /// Write updated values back to the store
    #[arg(long)]
    write_back: bool,

    /// Only log warnings and errors
    #[arg(long)]
    quiet: bool,

    /// Create a sample store at --store first if none exists
    #[arg(long)]
    init: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if cli.init {
        simulation::init_store(&cli.store)?;
    }

    simulation::run_store_file(&cli.store, cli.steps, cli.write_back)?;
    Ok(())
}
