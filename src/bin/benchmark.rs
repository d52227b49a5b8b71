use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser};
use plotters::prelude::*;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use bankbot::{HeuristicConfig, Player, Weights, WeightsFile, play_game};

const DEFAULT_SEED: u64 = 0xC0FFEE_5EED_u64;

#[derive(Parser, Debug)]
#[command(
    name = "benchmark",
    about = "Pit a weights file against the reference weights and report win rates."
)]
struct Args {
    /// Weights file to evaluate (reference weights when omitted)
    #[arg(long = "weights")]
    weights: Option<PathBuf>,

    /// Number of games (sides alternate game by game)
    #[arg(short = 'g', long = "games", default_value_t = 100)]
    games: usize,

    /// Base RNG seed for deal generation
    #[arg(short = 's', long = "seed", default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Safety cap on turns per game
    #[arg(long = "max-turns", default_value_t = 300)]
    max_turns: usize,

    /// Output chart file (png)
    #[arg(short = 'o', long = "out", default_value = "benchmark.png")]
    out: PathBuf,

    /// Print the textual summary only
    #[arg(long = "no-chart", action = ArgAction::SetTrue)]
    no_chart: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    if args.games == 0 {
        return Err("--games must be positive".into());
    }

    let candidate = match &args.weights {
        Some(path) => {
            let file = WeightsFile::load(path)?;
            println!(
                "Evaluating {} (recorded fitness {:.3}).",
                path.display(),
                file.fitness
            );
            file.weights
        }
        None => {
            println!("Evaluating the reference weights against themselves.");
            Weights::reference()
        }
    };
    let reference = Weights::reference();
    let config = HeuristicConfig::default();

    let mut seed_rng = StdRng::seed_from_u64(args.seed);
    let mut wins = 0usize;
    let mut losses = 0usize;
    let mut draws = 0usize;
    let mut wins_as_first = 0usize;
    let mut total_moves = 0u64;

    for game_index in 0..args.games {
        let deal_seed = seed_rng.next_u32();
        let candidate_seat = if game_index % 2 == 0 {
            Player::One
        } else {
            Player::Two
        };
        let sides = match candidate_seat {
            Player::One => [&candidate, &reference],
            Player::Two => [&reference, &candidate],
        };
        let record = play_game(deal_seed, sides, &config, args.max_turns);
        total_moves += u64::from(record.moves);
        match record.winner {
            Some(winner) if winner == candidate_seat => {
                wins += 1;
                if candidate_seat == Player::One {
                    wins_as_first += 1;
                }
            }
            Some(_) => losses += 1,
            None => draws += 1,
        }
    }

    let win_rate = wins as f64 / args.games as f64;
    println!(
        "Results over {} games: {wins} wins / {losses} losses / {draws} draws  ({:.1}% win rate)",
        args.games,
        win_rate * 100.0
    );
    println!(
        "  {} of the wins came as the opening player; average game length {:.0} moves.",
        wins_as_first,
        total_moves as f64 / args.games as f64
    );

    if !args.no_chart {
        render_bar_chart(&args.out, &[("wins", wins), ("losses", losses), ("draws", draws)])?;
        println!("Chart written to {}.", args.out.display());
    }
    Ok(())
}

fn render_bar_chart(out: &PathBuf, data: &[(&str, usize)]) -> Result<(), Box<dyn Error>> {
    let max_value = data.iter().map(|(_, count)| *count).max().unwrap_or(1).max(1);

    let root = BitMapBackend::new(out, (640, 480)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| format!("{e}"))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Benchmark vs reference weights", ("sans-serif", 24).into_font())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0..data.len(), 0..(max_value + max_value / 10 + 1))
        .map_err(|e| format!("{e}"))?;

    chart
        .configure_mesh()
        .y_desc("Games")
        .x_labels(data.len())
        .x_label_formatter(&|index| {
            data.get(*index)
                .map(|(label, _)| (*label).to_string())
                .unwrap_or_default()
        })
        .draw()
        .map_err(|e| format!("{e}"))?;

    for (index, (_, count)) in data.iter().enumerate() {
        let bar = Rectangle::new([(index, 0), (index, *count)], BLUE.filled());
        chart
            .draw_series(std::iter::once(bar))
            .map_err(|e| format!("{e}"))?;
    }

    root.present().map_err(|e| format!("{e}"))?;
    Ok(())
}
