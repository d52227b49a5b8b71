pub mod checkpoint;
pub mod individual;
pub mod trainer;

pub use checkpoint::{CHECKPOINT_VERSION, Checkpoint};
pub use individual::{Individual, initialize_population};
pub use trainer::{
    GameRecord, GenerationSummary, STAGNATION_THRESHOLD, Trainer, TrainerConfig, crossover,
    evaluate_individual, mutate, play_game,
};
