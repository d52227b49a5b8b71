use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::card::Player;
use crate::weights::{WEIGHT_SPECS, Weights};

/// One member of the evolving population: a weight vector plus the results
/// of its latest evaluation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Individual {
    pub weights: Weights,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub games_played: u32,
    pub fitness: f64,
}

impl Individual {
    pub fn from_weights(weights: Weights) -> Self {
        Self {
            weights,
            wins: 0,
            losses: 0,
            draws: 0,
            games_played: 0,
            fitness: 0.0,
        }
    }

    /// The reference weights, untouched.
    pub fn baseline() -> Self {
        Self::from_weights(Weights::reference())
    }

    /// Random individual: every weight is the reference value scaled by a
    /// uniform factor in [0.7, 1.3], rounded, clamped to its interval.
    pub fn random(rng: &mut StdRng) -> Self {
        let mut weights = Weights::reference();
        for spec in &WEIGHT_SPECS {
            let factor: f64 = rng.gen_range(0.7..1.3);
            let value = (f64::from(spec.default) * factor).round() as i32;
            weights.set(spec.feature, spec.clamp(value));
        }
        Self::from_weights(weights)
    }

    pub fn reset_counters(&mut self) {
        self.wins = 0;
        self.losses = 0;
        self.draws = 0;
        self.games_played = 0;
        self.fitness = 0.0;
    }

    /// Tallies one finished game, given which seat this individual held.
    pub fn record_game(&mut self, winner: Option<Player>, seat: Player) {
        self.games_played += 1;
        match winner {
            Some(player) if player == seat => self.wins += 1,
            Some(_) => self.losses += 1,
            None => self.draws += 1,
        }
    }
}

/// Seeds a population: the baseline verbatim in slot zero, randoms after.
pub fn initialize_population(size: usize, rng: &mut StdRng) -> Vec<Individual> {
    let mut population = Vec::with_capacity(size);
    population.push(Individual::baseline());
    while population.len() < size {
        population.push(Individual::random(rng));
    }
    population
}
