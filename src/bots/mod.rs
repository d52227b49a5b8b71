pub mod heuristic;

pub use heuristic::{
    HeuristicConfig, HeuristicPolicy, MAX_TURN_OPERATIONS, compute_turn, get_best_decision,
};
