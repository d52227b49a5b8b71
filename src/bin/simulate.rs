use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::process;

use bankbot::{
    GameState, HeuristicConfig, PatternWindow, Phase, Player, Weights, WeightsFile, compute_turn,
    describe_decision, render_state,
};

const DEFAULT_SEED: u32 = 0x5EED_CA2D;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let mut visualize = false;
    let mut seed = DEFAULT_SEED;
    let mut max_turns = 300usize;
    let mut weights_path: Option<PathBuf> = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--visualize" => visualize = true,
            "--seed" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--seed requires a value".to_string())?;
                seed = value
                    .parse::<u32>()
                    .map_err(|_| format!("invalid seed value: {value}"))?;
            }
            "--max-turns" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--max-turns requires a value".to_string())?;
                max_turns = value
                    .parse::<usize>()
                    .map_err(|_| format!("invalid max-turns value: {value}"))?;
            }
            "--weights" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--weights requires a path".to_string())?;
                weights_path = Some(PathBuf::from(value));
            }
            "--help" => {
                print_usage();
                return Ok(());
            }
            other => return Err(format!("unrecognized argument: {other}").into()),
        }
    }

    let weights = match &weights_path {
        Some(path) => WeightsFile::load(path)?.weights,
        None => Weights::reference(),
    };
    let config = HeuristicConfig::default();

    let mut state = GameState::new(Some(seed));
    println!("Simulating seed {seed} ({max_turns} turn cap).\n");
    if visualize {
        println!("{}", render_state(&state));
    }

    let mut windows = [
        PatternWindow::new(config.pattern_memory),
        PatternWindow::new(config.pattern_memory),
    ];
    let mut turns = 0usize;
    while state.phase == Phase::Playing && turns < max_turns {
        let seat = state.current_turn;
        let steps = compute_turn(&state, &weights, &config, &mut windows[seat.index()]);
        if steps.is_empty() {
            println!("Player {} has no move and nothing to draw.", seat.index() + 1);
            break;
        }
        if visualize {
            for step in &steps {
                println!(
                    "Player {}: {}",
                    seat.index() + 1,
                    describe_decision(&step.decision)
                );
            }
        }
        state = steps
            .into_iter()
            .next_back()
            .map(|step| step.state)
            .unwrap_or(state);
        if visualize {
            println!("\n{}", render_state(&state));
        }
        turns += 1;
    }

    match (state.phase, state.winner) {
        (Phase::Ended, Some(Player::One)) => println!("Game finished. Player 1 wins."),
        (Phase::Ended, Some(Player::Two)) => println!("Game finished. Player 2 wins."),
        (Phase::Ended, None) => println!("Game finished in a draw (move limit)."),
        _ => println!("Simulation stopped after {turns} turns."),
    }
    println!("Moves played: {}  (notation entries: {})", state.move_count, state.notation_log.len());
    Ok(())
}

fn print_usage() {
    println!("Usage: simulate [OPTIONS]");
    println!("  --visualize           Show the board and each decision");
    println!("  --seed <u32>          Deal seed (default: {DEFAULT_SEED})");
    println!("  --max-turns <usize>   Stop after the specified number of turns");
    println!("  --weights <path>      Weights file for both players (default: reference)");
    println!("  --help                Show this help message");
}
