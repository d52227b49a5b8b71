use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::TrainError;

/// The closed feature schema the heuristic scores moves with. The trainer
/// mutates weights through this enum so the schema stays a fixed-field
/// record rather than a string-keyed map.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Feature {
    ToFoundation,
    PlaysAce,
    PlaysTwo,
    AttackReserve,
    AttackWaste,
    ToOwnTableau,
    ToOpponentTableau,
    FromReserve,
    EmptiesReserve,
    FromWaste,
    FromTableau,
    PointlessTableauShuffle,
    CreatesUsefulEmpty,
    CreatesEmptyTableau,
    TableauMoveNoBenefit,
    StackHeightBonus,
    SpreadPenalty,
}

pub const FEATURE_COUNT: usize = 17;

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::ToFoundation,
        Feature::PlaysAce,
        Feature::PlaysTwo,
        Feature::AttackReserve,
        Feature::AttackWaste,
        Feature::ToOwnTableau,
        Feature::ToOpponentTableau,
        Feature::FromReserve,
        Feature::EmptiesReserve,
        Feature::FromWaste,
        Feature::FromTableau,
        Feature::PointlessTableauShuffle,
        Feature::CreatesUsefulEmpty,
        Feature::CreatesEmptyTableau,
        Feature::TableauMoveNoBenefit,
        Feature::StackHeightBonus,
        Feature::SpreadPenalty,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::ToFoundation => "TO_FOUNDATION",
            Feature::PlaysAce => "PLAYS_ACE",
            Feature::PlaysTwo => "PLAYS_TWO",
            Feature::AttackReserve => "ATTACK_RESERVE",
            Feature::AttackWaste => "ATTACK_WASTE",
            Feature::ToOwnTableau => "TO_OWN_TABLEAU",
            Feature::ToOpponentTableau => "TO_OPPONENT_TABLEAU",
            Feature::FromReserve => "FROM_RESERVE",
            Feature::EmptiesReserve => "EMPTIES_RESERVE",
            Feature::FromWaste => "FROM_WASTE",
            Feature::FromTableau => "FROM_TABLEAU",
            Feature::PointlessTableauShuffle => "POINTLESS_TABLEAU_SHUFFLE",
            Feature::CreatesUsefulEmpty => "CREATES_USEFUL_EMPTY",
            Feature::CreatesEmptyTableau => "CREATES_EMPTY_TABLEAU",
            Feature::TableauMoveNoBenefit => "TABLEAU_MOVE_NO_BENEFIT",
            Feature::StackHeightBonus => "STACK_HEIGHT_BONUS",
            Feature::SpreadPenalty => "SPREAD_PENALTY",
        }
    }
}

/// Reference value and clamp interval for one weight.
#[derive(Copy, Clone, Debug)]
pub struct WeightSpec {
    pub feature: Feature,
    pub default: i32,
    pub min: i32,
    pub max: i32,
}

impl WeightSpec {
    const fn new(feature: Feature, default: i32, min: i32, max: i32) -> Self {
        Self {
            feature,
            default,
            min,
            max,
        }
    }

    /// Interval width, used to scale mutation steps.
    pub fn range(&self) -> i32 {
        self.max - self.min
    }

    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }
}

pub const WEIGHT_SPECS: [WeightSpec; FEATURE_COUNT] = [
    WeightSpec::new(Feature::ToFoundation, 100, 20, 300),
    WeightSpec::new(Feature::PlaysAce, 60, 0, 200),
    WeightSpec::new(Feature::PlaysTwo, 30, 0, 150),
    WeightSpec::new(Feature::AttackReserve, 70, 0, 250),
    WeightSpec::new(Feature::AttackWaste, 45, 0, 250),
    WeightSpec::new(Feature::ToOwnTableau, 12, 0, 100),
    WeightSpec::new(Feature::ToOpponentTableau, 6, 0, 100),
    WeightSpec::new(Feature::FromReserve, 35, 0, 150),
    WeightSpec::new(Feature::EmptiesReserve, 90, 0, 300),
    WeightSpec::new(Feature::FromWaste, 18, 0, 100),
    WeightSpec::new(Feature::FromTableau, 6, 0, 100),
    WeightSpec::new(Feature::PointlessTableauShuffle, -60, -200, 0),
    WeightSpec::new(Feature::CreatesUsefulEmpty, 28, 0, 150),
    WeightSpec::new(Feature::CreatesEmptyTableau, 32, 0, 150),
    WeightSpec::new(Feature::TableauMoveNoBenefit, -18, -150, 0),
    WeightSpec::new(Feature::StackHeightBonus, 9, 0, 60),
    WeightSpec::new(Feature::SpreadPenalty, -14, -100, 0),
];

pub fn spec_for(feature: Feature) -> &'static WeightSpec {
    // Feature::ALL and WEIGHT_SPECS share one ordering.
    &WEIGHT_SPECS[Feature::ALL
        .iter()
        .position(|&f| f == feature)
        .unwrap_or(0)]
}

/// One weight per feature. Serialized under the canonical feature names so
/// weights files read the same across implementations.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Weights {
    pub to_foundation: i32,
    pub plays_ace: i32,
    pub plays_two: i32,
    pub attack_reserve: i32,
    pub attack_waste: i32,
    pub to_own_tableau: i32,
    pub to_opponent_tableau: i32,
    pub from_reserve: i32,
    pub empties_reserve: i32,
    pub from_waste: i32,
    pub from_tableau: i32,
    pub pointless_tableau_shuffle: i32,
    pub creates_useful_empty: i32,
    pub creates_empty_tableau: i32,
    pub tableau_move_no_benefit: i32,
    pub stack_height_bonus: i32,
    pub spread_penalty: i32,
}

impl Default for Weights {
    fn default() -> Self {
        Self::reference()
    }
}

impl Weights {
    /// The hand-tuned baseline every trained vector is measured against.
    pub fn reference() -> Self {
        let mut weights = Self {
            to_foundation: 0,
            plays_ace: 0,
            plays_two: 0,
            attack_reserve: 0,
            attack_waste: 0,
            to_own_tableau: 0,
            to_opponent_tableau: 0,
            from_reserve: 0,
            empties_reserve: 0,
            from_waste: 0,
            from_tableau: 0,
            pointless_tableau_shuffle: 0,
            creates_useful_empty: 0,
            creates_empty_tableau: 0,
            tableau_move_no_benefit: 0,
            stack_height_bonus: 0,
            spread_penalty: 0,
        };
        for spec in &WEIGHT_SPECS {
            weights.set(spec.feature, spec.default);
        }
        weights
    }

    pub fn get(&self, feature: Feature) -> i32 {
        match feature {
            Feature::ToFoundation => self.to_foundation,
            Feature::PlaysAce => self.plays_ace,
            Feature::PlaysTwo => self.plays_two,
            Feature::AttackReserve => self.attack_reserve,
            Feature::AttackWaste => self.attack_waste,
            Feature::ToOwnTableau => self.to_own_tableau,
            Feature::ToOpponentTableau => self.to_opponent_tableau,
            Feature::FromReserve => self.from_reserve,
            Feature::EmptiesReserve => self.empties_reserve,
            Feature::FromWaste => self.from_waste,
            Feature::FromTableau => self.from_tableau,
            Feature::PointlessTableauShuffle => self.pointless_tableau_shuffle,
            Feature::CreatesUsefulEmpty => self.creates_useful_empty,
            Feature::CreatesEmptyTableau => self.creates_empty_tableau,
            Feature::TableauMoveNoBenefit => self.tableau_move_no_benefit,
            Feature::StackHeightBonus => self.stack_height_bonus,
            Feature::SpreadPenalty => self.spread_penalty,
        }
    }

    pub fn set(&mut self, feature: Feature, value: i32) {
        match feature {
            Feature::ToFoundation => self.to_foundation = value,
            Feature::PlaysAce => self.plays_ace = value,
            Feature::PlaysTwo => self.plays_two = value,
            Feature::AttackReserve => self.attack_reserve = value,
            Feature::AttackWaste => self.attack_waste = value,
            Feature::ToOwnTableau => self.to_own_tableau = value,
            Feature::ToOpponentTableau => self.to_opponent_tableau = value,
            Feature::FromReserve => self.from_reserve = value,
            Feature::EmptiesReserve => self.empties_reserve = value,
            Feature::FromWaste => self.from_waste = value,
            Feature::FromTableau => self.from_tableau = value,
            Feature::PointlessTableauShuffle => self.pointless_tableau_shuffle = value,
            Feature::CreatesUsefulEmpty => self.creates_useful_empty = value,
            Feature::CreatesEmptyTableau => self.creates_empty_tableau = value,
            Feature::TableauMoveNoBenefit => self.tableau_move_no_benefit = value,
            Feature::StackHeightBonus => self.stack_height_bonus = value,
            Feature::SpreadPenalty => self.spread_penalty = value,
        }
    }

    /// Features where `self` differs from `other`, as name -> delta.
    pub fn diff(&self, other: &Weights) -> BTreeMap<String, i32> {
        let mut out = BTreeMap::new();
        for feature in Feature::ALL {
            let delta = self.get(feature) - other.get(feature);
            if delta != 0 {
                out.insert(feature.name().to_string(), delta);
            }
        }
        out
    }
}

pub const WEIGHTS_FILE_VERSION: u32 = 1;

/// Self-describing persisted weight vector.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeightsFile {
    pub version: u32,
    pub timestamp: u64,
    pub fitness: f64,
    pub weights: Weights,
}

impl WeightsFile {
    pub fn new(weights: Weights, fitness: f64) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);
        Self {
            version: WEIGHTS_FILE_VERSION,
            timestamp,
            fitness,
            weights,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), TrainError> {
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, TrainError> {
        let bytes = fs::read(path)?;
        let file: WeightsFile = serde_json::from_slice(&bytes)?;
        if file.version != WEIGHTS_FILE_VERSION {
            return Err(TrainError::UnsupportedWeightsVersion {
                found: file.version,
                expected: WEIGHTS_FILE_VERSION,
            });
        }
        Ok(file)
    }
}
