use serde::{Deserialize, Serialize};

use crate::card::{Card, Player};

/// Tagged reference to a pile on the board.
///
/// Foundations are shared and addressed by index alone; tableau piles need an
/// owner and an index; the remaining kinds are per-player singletons. `Drawn`
/// is the ephemeral slot holding a just-drawn card (physically the top of the
/// owner's waste) that must be played before any other source.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PileLocation {
    Foundation(usize),
    Tableau(Player, usize),
    Reserve(Player),
    Waste(Player),
    Hand(Player),
    Drawn(Player),
}

impl PileLocation {
    /// Owner of a per-player pile; `None` for shared foundations.
    pub fn owner(self) -> Option<Player> {
        match self {
            PileLocation::Foundation(_) => None,
            PileLocation::Tableau(owner, _)
            | PileLocation::Reserve(owner)
            | PileLocation::Waste(owner)
            | PileLocation::Hand(owner)
            | PileLocation::Drawn(owner) => Some(owner),
        }
    }

    #[inline]
    pub fn is_foundation(self) -> bool {
        matches!(self, PileLocation::Foundation(_))
    }

    #[inline]
    pub fn is_tableau(self) -> bool {
        matches!(self, PileLocation::Tableau(..))
    }
}

/// A single card transfer. `card` is redundant with the top of `from` but
/// kept for logging, notation, and validation symmetry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: PileLocation,
    pub to: PileLocation,
    pub card: Card,
}

impl Move {
    pub fn new(from: PileLocation, to: PileLocation, card: Card) -> Self {
        Self { from, to, card }
    }
}
