use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::bot::PatternWindow;
use crate::bots::{HeuristicConfig, compute_turn};
use crate::card::Player;
use crate::error::TrainError;
use crate::evolution::checkpoint::Checkpoint;
use crate::evolution::individual::{Individual, initialize_population};
use crate::state::{GameState, Phase};
use crate::weights::{Feature, WEIGHT_SPECS, Weights, WeightsFile};

/// Moves without foundation progress before the exploration boost kicks in.
pub const STAGNATION_THRESHOLD: u32 = 50;
/// Moves past the threshold over which the boost ramps to its maximum.
const STAGNATION_RAMP: f64 = 200.0;
const STAGNATION_EXPLORATION_BOOST: f64 = 0.45;
const STAGNATION_PENALTY_SCALE: f64 = 3.0;

/// Seed offset between the two games of a seed pair (the same deal with
/// sides swapped would favor whoever moves first; a fixed offset keeps the
/// pairing reproducible instead).
const SIDE_SWAP_SEED_OFFSET: u32 = 1_000_000;

/// Everything the training loop needs to be restarted from a checkpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    pub generations: u32,
    pub population_size: usize,
    pub games_per_evaluation: usize,
    pub elite_count: usize,
    pub tournament_size: usize,
    pub mutation_rate: f64,
    pub mutation_strength: f64,
    pub checkpoint_interval: u32,
    pub max_turns_per_game: usize,
    pub master_seed: u64,
    pub heuristic: HeuristicConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            generations: 50,
            population_size: 20,
            games_per_evaluation: 10,
            elite_count: 2,
            tournament_size: 3,
            mutation_rate: 0.15,
            mutation_strength: 0.2,
            checkpoint_interval: 5,
            max_turns_per_game: 300,
            master_seed: 0xBA2E_5EED,
            heuristic: HeuristicConfig::default(),
        }
    }
}

/// Per-generation progress record appended to the history log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub number: u32,
    pub best_fitness: f64,
    pub avg_fitness: f64,
    /// Best individual's weights as deltas from the reference vector.
    pub best_weights_diff: BTreeMap<String, i32>,
}

/// Outcome of one self-play game.
#[derive(Clone, Copy, Debug)]
pub struct GameRecord {
    pub winner: Option<Player>,
    pub moves: u32,
    pub turns: u32,
}

/// Tracks foundation progress for one player and scales exploration and the
/// shuffle penalty once the game stalls.
struct StagnationAdapter {
    base: HeuristicConfig,
    moves_since_progress: u32,
    last_foundation_total: usize,
    last_move_count: u32,
}

impl StagnationAdapter {
    fn new(base: HeuristicConfig) -> Self {
        Self {
            base,
            moves_since_progress: 0,
            last_foundation_total: 0,
            last_move_count: 0,
        }
    }

    fn observe(&mut self, state: &GameState) {
        let total: usize = state.foundations.iter().map(Vec::len).sum();
        if total > self.last_foundation_total {
            self.moves_since_progress = 0;
        } else {
            self.moves_since_progress += state.move_count.saturating_sub(self.last_move_count);
        }
        self.last_foundation_total = total;
        self.last_move_count = state.move_count;
    }

    fn adapted(&self) -> HeuristicConfig {
        if self.moves_since_progress <= STAGNATION_THRESHOLD {
            return self.base.clone();
        }
        let excess = f64::from(self.moves_since_progress - STAGNATION_THRESHOLD);
        let ramp = (excess / STAGNATION_RAMP).min(1.0);
        let mut config = self.base.clone();
        config.exploration_rate =
            (config.exploration_rate + STAGNATION_EXPLORATION_BOOST * ramp).min(1.0);
        config.shuffle_penalty *= 1.0 + (STAGNATION_PENALTY_SCALE - 1.0) * ramp;
        config
    }
}

/// Plays one seeded game to completion, player one under `weights[0]` and
/// player two under `weights[1]`, with per-player cross-turn pattern windows
/// and stagnation adaptation.
pub fn play_game(
    seed: u32,
    weights: [&Weights; 2],
    base_config: &HeuristicConfig,
    max_turns: usize,
) -> GameRecord {
    let mut state = GameState::new(Some(seed));
    let mut windows = [
        PatternWindow::new(base_config.pattern_memory),
        PatternWindow::new(base_config.pattern_memory),
    ];
    let mut adapters = [
        StagnationAdapter::new(base_config.clone()),
        StagnationAdapter::new(base_config.clone()),
    ];
    let mut turns = 0u32;
    while state.phase == Phase::Playing && (turns as usize) < max_turns {
        let seat = state.current_turn.index();
        let config = adapters[seat].adapted();
        let steps = compute_turn(&state, weights[seat], &config, &mut windows[seat]);
        let Some(last) = steps.into_iter().last() else {
            // Neither a move nor a draw was possible: the game cannot
            // continue, score it as a draw.
            break;
        };
        state = last.state;
        adapters[seat].observe(&state);
        turns += 1;
    }
    GameRecord {
        winner: if state.phase == Phase::Ended {
            state.winner
        } else {
            None
        },
        moves: state.move_count,
        turns,
    }
}

/// Plays the seed-paired evaluation games of one individual against the
/// baseline (one game per seed on each side) and sets its fitness. Returns
/// the number of games played.
pub fn evaluate_individual(
    individual: &mut Individual,
    baseline: &Weights,
    seeds: &[u32],
    config: &TrainerConfig,
) -> u32 {
    individual.reset_counters();
    for &seed in seeds {
        let record = play_game(
            seed,
            [&individual.weights, baseline],
            &config.heuristic,
            config.max_turns_per_game,
        );
        individual.record_game(record.winner, Player::One);

        let record = play_game(
            seed.wrapping_add(SIDE_SWAP_SEED_OFFSET),
            [baseline, &individual.weights],
            &config.heuristic,
            config.max_turns_per_game,
        );
        individual.record_game(record.winner, Player::Two);
    }
    let games = 2 * seeds.len() as u32;
    individual.fitness = if games > 0 {
        f64::from(individual.wins) / f64::from(games)
    } else {
        0.0
    };
    games
}

/// Uniform per-key crossover: 40% parent one, 40% parent two, 20% rounded
/// average.
pub fn crossover(parent_one: &Weights, parent_two: &Weights, rng: &mut StdRng) -> Weights {
    let mut child = Weights::reference();
    for feature in Feature::ALL {
        let roll: f64 = rng.gen_range(0.0..1.0);
        let value = if roll < 0.4 {
            parent_one.get(feature)
        } else if roll < 0.8 {
            parent_two.get(feature)
        } else {
            let sum = f64::from(parent_one.get(feature)) + f64::from(parent_two.get(feature));
            (sum / 2.0).round() as i32
        };
        child.set(feature, value);
    }
    child
}

/// Independent per-key mutation: with probability `rate`, nudge by a uniform
/// fraction of the key's interval width, round, clamp.
pub fn mutate(weights: &mut Weights, rate: f64, strength: f64, rng: &mut StdRng) {
    for spec in &WEIGHT_SPECS {
        if rng.gen_bool(rate.clamp(0.0, 1.0)) {
            let step: f64 = rng.gen_range(-1.0..1.0) * f64::from(spec.range()) * strength;
            let value = (f64::from(weights.get(spec.feature)) + step).round() as i32;
            weights.set(spec.feature, spec.clamp(value));
        }
    }
}

/// The evolutionary loop: evaluate, rank, checkpoint, reproduce.
pub struct Trainer {
    config: TrainerConfig,
    population: Vec<Individual>,
    history: Vec<GenerationSummary>,
    all_time_best: Individual,
    generation: u32,
    start_time: u64,
    total_games_played: u64,
    rng: StdRng,
    output_dir: PathBuf,
    shutdown: Arc<AtomicBool>,
    verbose: bool,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

impl Trainer {
    pub fn new(
        config: TrainerConfig,
        output_dir: PathBuf,
        shutdown: Arc<AtomicBool>,
        verbose: bool,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(config.master_seed);
        let population = initialize_population(config.population_size, &mut rng);
        let all_time_best = population[0].clone();
        Self {
            config,
            population,
            history: Vec::new(),
            all_time_best,
            generation: 0,
            start_time: unix_now(),
            total_games_played: 0,
            rng,
            output_dir,
            shutdown,
            verbose,
        }
    }

    /// Restores a run from a checkpoint. The RNG is re-seeded from the
    /// master seed offset by the generation so a resumed run does not replay
    /// the seeds of completed generations.
    pub fn resume(
        checkpoint: Checkpoint,
        output_dir: PathBuf,
        shutdown: Arc<AtomicBool>,
        verbose: bool,
    ) -> Self {
        let rng = StdRng::seed_from_u64(
            checkpoint
                .config
                .master_seed
                .wrapping_add(u64::from(checkpoint.current_generation)),
        );
        Self {
            config: checkpoint.config,
            population: checkpoint.population,
            history: checkpoint.generation_history,
            all_time_best: checkpoint.all_time_best,
            generation: checkpoint.current_generation,
            start_time: checkpoint.start_time,
            total_games_played: checkpoint.total_games_played,
            rng,
            output_dir,
            shutdown,
            verbose,
        }
    }

    /// Raises (or lowers) the generation target, e.g. when a resumed run is
    /// asked to train further.
    pub fn with_generations(mut self, generations: u32) -> Self {
        self.config.generations = generations;
        self
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn all_time_best(&self) -> &Individual {
        &self.all_time_best
    }

    pub fn history(&self) -> &[GenerationSummary] {
        &self.history
    }

    pub fn total_games_played(&self) -> u64 {
        self.total_games_played
    }

    fn checkpoint_path(&self) -> PathBuf {
        self.output_dir.join("checkpoint.json")
    }

    fn best_weights_path(&self) -> PathBuf {
        self.output_dir.join("best_weights.json")
    }

    fn save_checkpoint(&self) -> Result<(), TrainError> {
        let checkpoint = Checkpoint::from_trainer(
            &self.config,
            self.generation,
            &self.population,
            &self.all_time_best,
            &self.history,
            self.start_time,
            self.total_games_played,
        );
        checkpoint.save(&self.checkpoint_path())
    }

    fn run_generation(&mut self) {
        let baseline = Weights::reference();
        // One seed set per generation, shared by every individual so their
        // fitness figures compare like for like.
        let seeds: Vec<u32> = (0..self.config.games_per_evaluation)
            .map(|_| self.rng.next_u32())
            .collect();

        for individual in &mut self.population {
            let games = evaluate_individual(individual, &baseline, &seeds, &self.config);
            self.total_games_played += u64::from(games);
        }

        self.population.sort_by(|a, b| {
            b.fitness
                .partial_cmp(&a.fitness)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        if self.population[0].fitness > self.all_time_best.fitness {
            self.all_time_best = self.population[0].clone();
        }

        let avg_fitness = self
            .population
            .iter()
            .map(|individual| individual.fitness)
            .sum::<f64>()
            / self.population.len() as f64;
        let summary = GenerationSummary {
            number: self.generation + 1,
            best_fitness: self.population[0].fitness,
            avg_fitness,
            best_weights_diff: self.population[0].weights.diff(&baseline),
        };
        if self.verbose {
            println!(
                "generation {:>4}  best {:.3}  avg {:.3}  ({} weights off reference)",
                summary.number,
                summary.best_fitness,
                summary.avg_fitness,
                summary.best_weights_diff.len()
            );
        }
        self.history.push(summary);
        self.generation += 1;
    }

    fn tournament_pick(&mut self) -> Individual {
        let size = self.config.tournament_size.max(1);
        let mut best: Option<usize> = None;
        for _ in 0..size {
            let index = self.rng.gen_range(0..self.population.len());
            match best {
                Some(current) if self.population[index].fitness <= self.population[current].fitness => {}
                _ => best = Some(index),
            }
        }
        self.population[best.unwrap_or(0)].clone()
    }

    fn reproduce(&mut self) {
        let mut next = Vec::with_capacity(self.config.population_size);
        let elite_count = self.config.elite_count.min(self.population.len());
        for elite in &self.population[..elite_count] {
            let mut carried = elite.clone();
            carried.reset_counters();
            next.push(carried);
        }
        while next.len() < self.config.population_size {
            let parent_one = self.tournament_pick();
            let parent_two = self.tournament_pick();
            let mut weights = crossover(&parent_one.weights, &parent_two.weights, &mut self.rng);
            mutate(
                &mut weights,
                self.config.mutation_rate,
                self.config.mutation_strength,
                &mut self.rng,
            );
            next.push(Individual::from_weights(weights));
        }
        self.population = next;
    }

    /// Runs to the configured generation count or the first shutdown
    /// request, whichever comes first, then persists the final checkpoint
    /// and the best weights file.
    pub fn run(&mut self) -> Result<(), TrainError> {
        while self.generation < self.config.generations {
            self.run_generation();

            let at_interval = self.config.checkpoint_interval > 0
                && self.generation % self.config.checkpoint_interval == 0;
            let interrupted = self.shutdown.load(Ordering::Relaxed);
            if at_interval || interrupted {
                // A failed save aborts this save only; the next interval
                // retries.
                if let Err(err) = self.save_checkpoint() {
                    eprintln!("checkpoint save failed: {err}");
                }
            }
            if interrupted {
                if self.verbose {
                    println!("shutdown requested, stopping after generation {}", self.generation);
                }
                break;
            }
            if self.generation < self.config.generations {
                self.reproduce();
            }
        }

        self.save_checkpoint()?;
        WeightsFile::new(self.all_time_best.weights, self.all_time_best.fitness)
            .save(&self.best_weights_path())?;
        Ok(())
    }
}
