use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

mod catalog;
mod composer;
mod decorate;
mod notes;
mod population;
mod rules;
mod strategy;
mod weights;

use catalog::Catalogs;
use population::{ConsoleProgress, EngineConfig, Population};
use rules::{Evaluator, RuleKind};

/// Evolves two-voice counterpoint with a genetic algorithm.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Number of composers in the population.
    #[arg(long, default_value_t = 25)]
    population_count: usize,

    /// Number of top-ranked composers that breed each generation.
    #[arg(long, default_value_t = 10)]
    crossover_count: usize,

    /// Number of generations to run.
    #[arg(long, default_value_t = 100)]
    generation_count: usize,

    /// Fraction of the population mutated after each generation.
    #[arg(long, default_value_t = 0.05)]
    mutation_rate: f64,

    /// Note pairs per composition.
    #[arg(long, default_value_t = composer::TRAINING_NOTE_COUNT)]
    notes: usize,

    /// Voice-leading rule to enforce; may be repeated. Defaults to all rules.
    #[arg(long = "rule", value_enum)]
    rules: Vec<RuleKind>,

    /// Seed for reproducible runs. Uses OS entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Write the final composition as JSON to this path.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let config = EngineConfig {
        population_count: args.population_count,
        crossover_count: args.crossover_count,
        generation_count: args.generation_count,
        mutation_rate: args.mutation_rate,
        notes: args.notes,
    };
    config.validate()?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let catalogs = Catalogs::new();
    let evaluator = Evaluator::new(&args.rules);

    let mut population = Population::new(config);
    population.initialize(&catalogs, &mut rng);
    population.run(&catalogs, &evaluator, &mut ConsoleProgress, &mut rng);

    let mut composition = population.final_composition(&catalogs, &evaluator, &mut rng);
    decorate::decorate_composition(&mut composition, &mut rng);

    println!();
    println!("Best final composition:\n");
    print!("{composition}");

    if let Some(path) = &args.output {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, &composition)?;
        println!("\nWrote composition to {}", path.display());
    }

    Ok(())
}
