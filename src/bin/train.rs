use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use clap::{ArgAction, Parser};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;

use bankbot::{Checkpoint, Trainer, TrainerConfig};

/// Default master seed for deterministic runs.
const DEFAULT_SEED: u64 = 0xBA2E_5EED_F00D_u64;

#[derive(Parser, Debug)]
#[command(
    name = "train",
    about = "Evolve heuristic weights through seeded self-play tournaments."
)]
struct Args {
    /// Number of generations to run
    #[arg(long)]
    generations: Option<u32>,

    /// Population size
    #[arg(long)]
    population: Option<usize>,

    /// Evaluation games per side against the baseline
    #[arg(long = "evaluations")]
    evaluations: Option<usize>,

    /// Per-key mutation probability
    #[arg(long = "mutation")]
    mutation: Option<f64>,

    /// Mutation step as a fraction of each weight's interval
    #[arg(long = "strength")]
    strength: Option<f64>,

    /// Checkpoint every N generations
    #[arg(long = "checkpoint")]
    checkpoint: Option<u32>,

    /// Output directory (created on demand; resumes from DIR/checkpoint.json
    /// when present)
    #[arg(long = "output", default_value = "training")]
    output: PathBuf,

    /// Master RNG seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Print per-generation progress
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Small smoke-test run (a few generations of a small population)
    #[arg(long, action = ArgAction::SetTrue)]
    quick: bool,

    /// Long unattended run
    #[arg(long, action = ArgAction::SetTrue)]
    overnight: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn build_config(args: &Args) -> TrainerConfig {
    let mut config = TrainerConfig {
        master_seed: args.seed,
        ..TrainerConfig::default()
    };
    if args.quick {
        config.generations = 5;
        config.population_size = 8;
        config.games_per_evaluation = 3;
        config.checkpoint_interval = 2;
    }
    if args.overnight {
        config.generations = 500;
        config.population_size = 40;
        config.games_per_evaluation = 20;
        config.checkpoint_interval = 10;
    }
    if let Some(generations) = args.generations {
        config.generations = generations;
    }
    if let Some(population) = args.population {
        config.population_size = population.max(2);
    }
    if let Some(evaluations) = args.evaluations {
        config.games_per_evaluation = evaluations.max(1);
    }
    if let Some(mutation) = args.mutation {
        config.mutation_rate = mutation.clamp(0.0, 1.0);
    }
    if let Some(strength) = args.strength {
        config.mutation_strength = strength;
    }
    if let Some(checkpoint) = args.checkpoint {
        config.checkpoint_interval = checkpoint;
    }
    config
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let shutdown = Arc::new(AtomicBool::new(false));
    // First signal requests a graceful stop at the generation boundary; a
    // second one terminates immediately.
    for signal in [SIGINT, SIGTERM] {
        flag::register_conditional_shutdown(signal, 1, Arc::clone(&shutdown))?;
        flag::register(signal, Arc::clone(&shutdown))?;
    }

    fs::create_dir_all(&args.output)?;
    let checkpoint_path = args.output.join("checkpoint.json");

    let mut trainer = if checkpoint_path.exists() {
        let checkpoint = Checkpoint::load(&checkpoint_path)?;
        println!(
            "Resuming from {} (generation {}, {} games played so far).",
            checkpoint_path.display(),
            checkpoint.current_generation,
            checkpoint.total_games_played
        );
        let mut trainer = Trainer::resume(
            checkpoint,
            args.output.clone(),
            Arc::clone(&shutdown),
            args.verbose,
        );
        // A resumed run may be asked to train further than the original one.
        if args.generations.is_some() {
            trainer = trainer.with_generations(build_config(&args).generations);
        }
        trainer
    } else {
        let config = build_config(&args);
        println!(
            "Training {} generations, population {}, {} evaluation games per side.",
            config.generations, config.population_size, config.games_per_evaluation
        );
        Trainer::new(
            config,
            args.output.clone(),
            Arc::clone(&shutdown),
            args.verbose,
        )
    };

    trainer.run()?;

    let best = trainer.all_time_best();
    println!(
        "Done after generation {}: best fitness {:.3} over {} games ({} weights off reference).",
        trainer.generation(),
        best.fitness,
        trainer.total_games_played(),
        best.weights.diff(&bankbot::Weights::reference()).len()
    );
    println!(
        "Best weights written to {}.",
        args.output.join("best_weights.json").display()
    );
    Ok(())
}
