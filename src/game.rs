use crate::card::{
    Card, FOUNDATION_COUNT, HAND_SIZE, Player, RANK_ACE, RESERVE_SIZE, TABLEAU_COUNT, foundation_suit,
    full_deck,
};
use crate::error::GameError;
use crate::location::{Move, PileLocation};
use crate::notation;
use crate::rng::Lcg;
use crate::state::{DrawOutcome, GameState, Phase, PlayerState};

/// Hard cap on total operations in one game; reaching it ends the game as a
/// draw.
pub const MOVE_LIMIT: u32 = 1000;

/// A card goes on a foundation when its suit matches the slot's suit and it
/// continues the Ace-up run.
pub fn can_play_on_foundation(card: Card, index: usize, pile: &[Card]) -> bool {
    if card.suit != foundation_suit(index) {
        return false;
    }
    match pile.last() {
        None => card.rank == RANK_ACE,
        Some(top) => top.suit == card.suit && top.rank + 1 == card.rank,
    }
}

/// Tableau piles build down in alternating colors and accept anything when
/// empty.
pub fn can_play_on_tableau(card: Card, pile: &[Card]) -> bool {
    match pile.last() {
        None => true,
        Some(top) => top.color() != card.color() && top.rank == card.rank + 1,
    }
}

/// Attack rule: an opponent's waste or reserve takes a card of the same suit
/// one rank above or below its top. An empty pile cannot be attacked.
pub fn can_play_on_opponent_pile(card: Card, pile: &[Card]) -> bool {
    match pile.last() {
        None => false,
        Some(top) => top.suit == card.suit && top.rank.abs_diff(card.rank) == 1,
    }
}

fn deal_player(deck: Vec<Card>) -> PlayerState {
    debug_assert_eq!(deck.len(), RESERVE_SIZE + TABLEAU_COUNT + HAND_SIZE);
    let mut cards = deck.into_iter();
    let mut player = PlayerState::empty();
    player.reserve.extend(cards.by_ref().take(RESERVE_SIZE));
    for pile in &mut player.tableau {
        pile.extend(cards.by_ref().take(1));
    }
    player.hand.extend(cards);
    player
}

impl GameState {
    /// Deals a fresh game. Both decks are shuffled by one seeded LCG so a
    /// given seed always produces the identical layout; when no seed is
    /// supplied a system-random one is drawn and recorded on the state.
    pub fn new(seed: Option<u32>) -> Self {
        let seed = seed.unwrap_or_else(rand::random::<u32>);
        let mut rng = Lcg::new(seed);

        let mut deck_one = full_deck(Player::One);
        rng.shuffle(&mut deck_one);
        let mut deck_two = full_deck(Player::Two);
        rng.shuffle(&mut deck_two);

        let players = [deal_player(deck_one), deal_player(deck_two)];
        let current_turn = if rng.next_unit() < 0.5 {
            Player::One
        } else {
            Player::Two
        };

        Self {
            players,
            foundations: std::array::from_fn(|_| Vec::new()),
            current_turn,
            phase: Phase::Playing,
            move_count: 0,
            winner: None,
            seed,
            notation_log: Vec::new(),
        }
    }

    /// Enumerates every legal move for the player to act.
    ///
    /// While a drawn card is pending it is the only legal source
    /// (immediate-play rule). Otherwise sources are the top of the player's
    /// own reserve and the top of every tableau pile on the board. The
    /// enumeration includes singleton-to-empty tableau shuffles; suppressing
    /// those is the decision maker's business, not the engine's.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.phase == Phase::Ended {
            return Vec::new();
        }
        let me = self.current_turn;
        let mut sources: Vec<(PileLocation, Card)> = Vec::new();
        if let Some(card) = self.player(me).drawn_card {
            sources.push((PileLocation::Drawn(me), card));
        } else {
            if let Some(card) = self.player(me).reserve.last().copied() {
                sources.push((PileLocation::Reserve(me), card));
            }
            for owner in [me, me.opponent()] {
                for index in 0..TABLEAU_COUNT {
                    if let Some(card) = self.player(owner).tableau[index].last().copied() {
                        sources.push((PileLocation::Tableau(owner, index), card));
                    }
                }
            }
        }

        let mut moves = Vec::new();
        for (from, card) in sources {
            self.push_destinations(from, card, &mut moves);
        }
        moves
    }

    fn push_destinations(&self, from: PileLocation, card: Card, out: &mut Vec<Move>) {
        let me = self.current_turn;
        for index in 0..FOUNDATION_COUNT {
            if can_play_on_foundation(card, index, &self.foundations[index]) {
                out.push(Move::new(from, PileLocation::Foundation(index), card));
            }
        }
        for owner in [me, me.opponent()] {
            for index in 0..TABLEAU_COUNT {
                let to = PileLocation::Tableau(owner, index);
                if to == from {
                    continue;
                }
                if can_play_on_tableau(card, &self.player(owner).tableau[index]) {
                    out.push(Move::new(from, to, card));
                }
            }
        }
        let opponent = me.opponent();
        if can_play_on_opponent_pile(card, &self.player(opponent).waste) {
            out.push(Move::new(from, PileLocation::Waste(opponent), card));
        }
        if can_play_on_opponent_pile(card, &self.player(opponent).reserve) {
            out.push(Move::new(from, PileLocation::Reserve(opponent), card));
        }
    }

    /// Validates the move against `legal_moves` and returns the successor
    /// snapshot. Applying a move never passes the turn; only an unplayable
    /// draw does that.
    pub fn apply_move(&self, mv: &Move) -> Result<GameState, GameError> {
        if !self.legal_moves().contains(mv) {
            return Err(GameError::InvalidMove);
        }
        let mut next = self.clone();
        let card = next.take_from(mv.from).ok_or(GameError::InvalidMove)?;
        debug_assert_eq!(card, mv.card);
        next.place_on(mv.to, card)?;
        next.notation_log.push(notation::format_move(mv));
        next.move_count += 1;
        next.refresh_termination();
        Ok(next)
    }

    /// Draws the next card from hand onto waste.
    ///
    /// An empty hand first recycles: the waste flips over in place to become
    /// the new hand. If the drawn card has any legal destination the turn
    /// continues and the drawn slot becomes the only legal source; otherwise
    /// the slot is cleared and the turn passes (`turn_ended`).
    pub fn draw_from_hand(&self) -> Result<DrawOutcome, GameError> {
        if self.phase == Phase::Ended {
            return Err(GameError::InvalidMove);
        }
        let me = self.current_turn;
        if self.player(me).drawn_card.is_some() {
            // A pending drawn card must be played before drawing again.
            return Err(GameError::InvalidMove);
        }
        let mut next = self.clone();
        {
            let player = next.player_mut(me);
            if player.hand.is_empty() {
                player.waste.reverse();
                player.hand = std::mem::take(&mut player.waste);
            }
            let card = match player.hand.pop() {
                Some(card) => card,
                None => return Err(GameError::NoCardsToDraw),
            };
            player.waste.push(card);
            player.drawn_card = Some(card);
        }
        next.notation_log.push(notation::format_draw(me));
        next.move_count += 1;
        next.refresh_termination();
        if next.phase == Phase::Ended {
            return Ok(DrawOutcome {
                state: next,
                turn_ended: true,
            });
        }
        let turn_ended = next.legal_moves().is_empty();
        if turn_ended {
            next.player_mut(me).drawn_card = None;
            next.current_turn = me.opponent();
        }
        Ok(DrawOutcome {
            state: next,
            turn_ended,
        })
    }

    fn take_from(&mut self, from: PileLocation) -> Option<Card> {
        match from {
            PileLocation::Reserve(owner) => self.player_mut(owner).reserve.pop(),
            PileLocation::Tableau(owner, index) => self.player_mut(owner).tableau[index].pop(),
            PileLocation::Drawn(owner) => {
                let player = self.player_mut(owner);
                player.drawn_card.take()?;
                player.waste.pop()
            }
            // Waste, hand, and foundations never release a card via a move.
            PileLocation::Waste(_) | PileLocation::Hand(_) | PileLocation::Foundation(_) => None,
        }
    }

    fn place_on(&mut self, to: PileLocation, card: Card) -> Result<(), GameError> {
        match to {
            PileLocation::Foundation(index) => self.foundations[index].push(card),
            PileLocation::Tableau(owner, index) => {
                self.player_mut(owner).tableau[index].push(card);
            }
            PileLocation::Reserve(owner) => self.player_mut(owner).reserve.push(card),
            PileLocation::Waste(owner) => self.player_mut(owner).waste.push(card),
            PileLocation::Hand(_) | PileLocation::Drawn(_) => return Err(GameError::InvalidMove),
        }
        Ok(())
    }

    fn refresh_termination(&mut self) {
        for player in [Player::One, Player::Two] {
            if self.player(player).has_emptied_stock() {
                self.winner = Some(player);
                self.phase = Phase::Ended;
                return;
            }
        }
        if self.move_count >= MOVE_LIMIT {
            self.phase = Phase::Ended;
        }
    }
}
