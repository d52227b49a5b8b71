use serde::{Deserialize, Serialize};

/// One of the two players at the table. Doubles as the origin tag on cards,
/// since every physical card came from one of the two 52-card decks.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// Returns the other player.
    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Zero-based index into per-player arrays.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    /// The `1` / `2` digit used in move notation.
    #[inline]
    pub fn digit(self) -> char {
        match self {
            Player::One => '1',
            Player::Two => '2',
        }
    }
}

/// Card suit. Hearts and diamonds are red, clubs and spades are black.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

/// Card color derived from the suit.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Color {
    Red,
    Black,
}

impl Suit {
    #[inline]
    pub fn color(self) -> Color {
        match self {
            Suit::Hearts | Suit::Diamonds => Color::Red,
            Suit::Clubs | Suit::Spades => Color::Black,
        }
    }

    /// The `H`/`D`/`C`/`S` letter used in move notation.
    #[inline]
    pub fn letter(self) -> char {
        match self {
            Suit::Hearts => 'H',
            Suit::Diamonds => 'D',
            Suit::Clubs => 'C',
            Suit::Spades => 'S',
        }
    }

    /// Display glyph for board rendering.
    #[inline]
    pub fn symbol(self) -> char {
        match self {
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
            Suit::Spades => '♠',
        }
    }
}

/// Suit order shared by deck construction and the foundation mapping.
pub const SUITS: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

pub const RANK_ACE: u8 = 1;
pub const RANK_KING: u8 = 13;
/// Rank letters indexed by `rank - 1`.
pub const RANK_LETTERS: [char; 13] = [
    'A', '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K',
];

pub const FOUNDATION_COUNT: usize = 8;
pub const TABLEAU_COUNT: usize = 4;
pub const RESERVE_SIZE: usize = 12;
pub const HAND_SIZE: usize = 36;
pub const DECK_SIZE: usize = 52;
pub const TOTAL_CARDS: usize = 104;

/// Suit a foundation pile accepts. Slots 0-3 and 4-7 repeat the same cycle,
/// so each suit owns two interchangeable foundation slots.
#[inline]
pub fn foundation_suit(index: usize) -> Suit {
    SUITS[index % SUITS.len()]
}

/// One physical playing card. Compared by all three fields: the same face
/// from the other deck is a different card.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: u8,
    pub origin: Player,
}

impl Card {
    #[inline]
    pub fn new(suit: Suit, rank: u8, origin: Player) -> Self {
        debug_assert!((RANK_ACE..=RANK_KING).contains(&rank));
        Self { suit, rank, origin }
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.suit.color()
    }
}

/// Builds one 52-card deck tagged with its owner, in deterministic order
/// (suits in `SUITS` order, ranks ascending).
pub fn full_deck(origin: Player) -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in SUITS {
        for rank in RANK_ACE..=RANK_KING {
            deck.push(Card::new(suit, rank, origin));
        }
    }
    deck
}
