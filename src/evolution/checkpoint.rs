use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TrainError;
use crate::evolution::individual::Individual;
use crate::evolution::trainer::{GenerationSummary, TrainerConfig};

pub const CHECKPOINT_VERSION: u32 = 1;

/// Whole-run training snapshot. Saved atomically (temp file + rename) so a
/// crash mid-write never leaves a torn checkpoint behind.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    pub config: TrainerConfig,
    pub current_generation: u32,
    pub best_individual: Individual,
    pub all_time_best: Individual,
    pub population: Vec<Individual>,
    pub generation_history: Vec<GenerationSummary>,
    pub start_time: u64,
    pub total_games_played: u64,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl Checkpoint {
    #[allow(clippy::too_many_arguments)]
    pub fn from_trainer(
        config: &TrainerConfig,
        current_generation: u32,
        population: &[Individual],
        all_time_best: &Individual,
        generation_history: &[GenerationSummary],
        start_time: u64,
        total_games_played: u64,
    ) -> Self {
        let best_individual = population
            .first()
            .cloned()
            .unwrap_or_else(|| all_time_best.clone());
        Self {
            version: CHECKPOINT_VERSION,
            config: config.clone(),
            current_generation,
            best_individual,
            all_time_best: all_time_best.clone(),
            population: population.to_vec(),
            generation_history: generation_history.to_vec(),
            start_time,
            total_games_played,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), TrainError> {
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, serde_json::to_vec_pretty(self)?)?;
        fs::rename(&temp, path)?;
        Ok(())
    }

    /// Loads a checkpoint, rejecting any schema version other than the one
    /// this build writes.
    pub fn load(path: &Path) -> Result<Self, TrainError> {
        let bytes = fs::read(path)?;
        let probe: VersionProbe = serde_json::from_slice(&bytes)?;
        if probe.version != CHECKPOINT_VERSION {
            return Err(TrainError::UnsupportedCheckpointVersion {
                found: probe.version,
                expected: CHECKPOINT_VERSION,
            });
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}
