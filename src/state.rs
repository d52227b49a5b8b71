use serde::{Deserialize, Serialize};

use crate::card::{Card, FOUNDATION_COUNT, Player, TABLEAU_COUNT};
use crate::location::PileLocation;

/// Whether the game is still being played.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Playing,
    Ended,
}

/// Everything one player owns. The last element of each pile is its top.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub reserve: Vec<Card>,
    pub waste: Vec<Card>,
    pub tableau: [Vec<Card>; TABLEAU_COUNT],
    pub hand: Vec<Card>,
    /// Present exactly while a just-drawn card (also the top of `waste`)
    /// still must be played.
    pub drawn_card: Option<Card>,
}

impl PlayerState {
    pub fn empty() -> Self {
        Self {
            reserve: Vec::new(),
            waste: Vec::new(),
            tableau: std::array::from_fn(|_| Vec::new()),
            hand: Vec::new(),
            drawn_card: None,
        }
    }

    /// Win condition: reserve, waste, and hand all played out.
    pub fn has_emptied_stock(&self) -> bool {
        self.reserve.is_empty() && self.waste.is_empty() && self.hand.is_empty()
    }
}

/// Full game snapshot. Engine operations never mutate in place: they clone,
/// edit the clone, and hand it back, so callers can retain old snapshots for
/// undo and cycle detection.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub players: [PlayerState; 2],
    pub foundations: [Vec<Card>; FOUNDATION_COUNT],
    pub current_turn: Player,
    pub phase: Phase,
    pub move_count: u32,
    pub winner: Option<Player>,
    /// Seed the deal was produced from, kept for reproducibility.
    pub seed: u32,
    pub notation_log: Vec<String>,
}

/// Result of a successful `draw_from_hand`.
#[derive(Clone, Debug)]
pub struct DrawOutcome {
    pub state: GameState,
    /// True when the drawn card had no legal destination and the turn passed
    /// to the opponent (or the move limit ended the game).
    pub turn_ended: bool,
}

impl GameState {
    #[inline]
    pub fn player(&self, player: Player) -> &PlayerState {
        &self.players[player.index()]
    }

    #[inline]
    pub fn player_mut(&mut self, player: Player) -> &mut PlayerState {
        &mut self.players[player.index()]
    }

    /// Top card of the referenced pile, if any. The drawn slot reports the
    /// pending drawn card.
    pub fn top_card(&self, location: PileLocation) -> Option<Card> {
        match location {
            PileLocation::Foundation(index) => self.foundations[index].last().copied(),
            PileLocation::Tableau(owner, index) => {
                self.player(owner).tableau[index].last().copied()
            }
            PileLocation::Reserve(owner) => self.player(owner).reserve.last().copied(),
            PileLocation::Waste(owner) => self.player(owner).waste.last().copied(),
            PileLocation::Hand(owner) => self.player(owner).hand.last().copied(),
            PileLocation::Drawn(owner) => self.player(owner).drawn_card,
        }
    }

    /// Total cards across every pile. Stays at 104 through every legal
    /// operation; the drawn slot is not counted because the card sits on the
    /// owner's waste.
    pub fn total_cards(&self) -> usize {
        let mut total = 0;
        for player in &self.players {
            total += player.reserve.len() + player.waste.len() + player.hand.len();
            total += player.tableau.iter().map(Vec::len).sum::<usize>();
        }
        total + self.foundations.iter().map(Vec::len).sum::<usize>()
    }
}
