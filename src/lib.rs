//! Russian Bank (two-deck competitive solitaire) decision core: a pure
//! rules engine, a weighted-heuristic turn planner with anti-cycling and
//! bounded look-ahead, and an evolutionary trainer that tunes the planner's
//! weights through seeded self-play.

pub mod bot;
pub mod bots;
pub mod card;
pub mod error;
pub mod evolution;
pub mod game;
pub mod location;
pub mod notation;
pub mod rng;
pub mod state;
pub mod visualize;
pub mod weights;

pub use crate::bot::{Decision, MovePattern, PatternWindow, Step, TurnPolicy};
pub use crate::bots::{
    HeuristicConfig, HeuristicPolicy, MAX_TURN_OPERATIONS, compute_turn, get_best_decision,
};
pub use crate::card::{Card, Color, Player, Suit};
pub use crate::error::{GameError, NotationError, TrainError};
pub use crate::evolution::{
    CHECKPOINT_VERSION, Checkpoint, GameRecord, GenerationSummary, Individual,
    STAGNATION_THRESHOLD, Trainer, TrainerConfig, initialize_population, play_game,
};
pub use crate::game::{
    MOVE_LIMIT, can_play_on_foundation, can_play_on_opponent_pile, can_play_on_tableau,
};
pub use crate::location::{Move, PileLocation};
pub use crate::notation::parse_notation;
pub use crate::state::{DrawOutcome, GameState, Phase, PlayerState};
pub use crate::visualize::{describe_decision, render_state};
pub use crate::weights::{Feature, Weights, WeightsFile};
