use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::location::{Move, PileLocation};
use crate::state::GameState;

/// What the decision maker chose at one point in a turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Play { mv: Move, reasoning: String },
    Draw { reasoning: String },
}

/// One step of a computed turn: the decision taken and the snapshot it
/// produced.
#[derive(Clone, Debug)]
pub struct Step {
    pub state: GameState,
    pub decision: Decision,
}

/// Interface for turn-planning policies. The weighted heuristic is the
/// shipped implementation; an alternative (e.g. a learned policy) plugs in
/// here with the same turn contract.
pub trait TurnPolicy {
    fn compute_turn(
        &mut self,
        state: &GameState,
        recent_patterns: &mut PatternWindow,
    ) -> Vec<Step>;
}

/// Source/destination shape of a move with the card identity stripped, used
/// to spot repetitive shuffling.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct MovePattern {
    pub from: PileLocation,
    pub to: PileLocation,
}

impl From<&Move> for MovePattern {
    fn from(mv: &Move) -> Self {
        Self {
            from: mv.from,
            to: mv.to,
        }
    }
}

/// Bounded sliding window over the most recent move patterns. Flows across
/// turn boundaries as an explicit parameter, never as shared state.
#[derive(Clone, Debug)]
pub struct PatternWindow {
    entries: VecDeque<MovePattern>,
    capacity: usize,
}

impl PatternWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, pattern: MovePattern) {
        self.entries.push_back(pattern);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn count(&self, pattern: &MovePattern) -> usize {
        self.entries.iter().filter(|entry| *entry == pattern).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
