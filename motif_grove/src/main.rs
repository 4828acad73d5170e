// Motif Grove: CLI entry point.
//
// Seeds a tree with the default motif, evolves it for N generations and
// prints the resulting melody. Progress goes through `tracing`; set RUST_LOG
// to override the level chosen by --verbose.
//
// Usage:
//   cargo run -p motif_grove -- [--generations N] [--seed N] [--config FILE]
//     [--verbose] [--output run.json]

use clap::Parser;
use motif_grove::config::EvolutionConfig;
use motif_grove::evolution::{EvolutionReport, MusicalTree};
use motif_grove::note::{Note, format_motif};
use motif_grove::prng::GroveRng;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "evolve")]
#[command(about = "Evolve a melody from a seed motif", long_about = None)]
struct Cli {
    /// Number of generations after the pre-evolve phase
    #[arg(long, default_value = "10")]
    generations: usize,
    /// PRNG seed; omit for a clock-seeded run
    #[arg(long)]
    seed: Option<u64>,
    /// JSON config file; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log every selection and reproduction
    #[arg(long)]
    verbose: bool,
    /// Write the melody and the run report as JSON to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Contents of the --output file.
#[derive(Serialize)]
struct RunOutput<'a> {
    seed: Option<u64>,
    melody: &'a [Note],
    report: &'a EvolutionReport,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => EvolutionConfig::load(path)?,
        None => EvolutionConfig::default(),
    };
    config.verbose |= cli.verbose;

    let mut rng = match cli.seed {
        Some(seed) => GroveRng::new(seed),
        None => GroveRng::from_entropy(),
    };

    let mut tree = MusicalTree::new(config, &mut rng);
    info!(generations = cli.generations, seed = ?cli.seed, "evolving");

    let report = tree.run_evolution(cli.generations, &mut rng)?;
    for stats in &report.generations {
        info!(
            generation = stats.generation,
            grown = stats.grown_size,
            pruned = stats.pruned_size,
            passes = stats.prune_passes,
            "generation done"
        );
    }
    info!(
        final_size = report.final_size,
        threshold = report.final_threshold,
        "evolution finished"
    );

    let melody = tree.generate_melody();
    println!("Melody ({} notes):", melody.len());
    println!("{}", format_motif(&melody));

    if let Some(path) = &cli.output {
        let output = RunOutput {
            seed: cli.seed,
            melody: &melody,
            report: &report,
        };
        std::fs::write(path, serde_json::to_string_pretty(&output)?)?;
        info!(path = %path.display(), "melody and report written");
    }
    Ok(())
}
