use anyhow::Result;
use clap::Parser;
use coldet_testbed::{load_config, run_headless};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "coldet-testbed")]
#[command(about = "Headless run of boxes and spheres dropped on procedural terrain", long_about = None)]
struct Args {
    /// Path to the TOML configuration
    #[arg(long, default_value = "crates/testbed/config.toml")]
    config: PathBuf,

    /// Number of frames to simulate (overrides run.steps)
    #[arg(long)]
    steps: Option<u32>,

    /// Seed for terrain and spawn positions (overrides world.seed and world.terrain.seed)
    #[arg(long)]
    seed: Option<u32>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("coldet-testbed v{}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(&args.config)?;
    if let Some(steps) = args.steps {
        config.run.steps = steps;
    }
    if let Some(seed) = args.seed {
        config.world.seed = u64::from(seed);
        config.world.terrain.seed = seed;
    }

    run_headless(&config)?;
    Ok(())
}
