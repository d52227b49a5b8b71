//! Compact symbolic game record.
//!
//! Every applied move appends `<card>:<from>-<to>` and every draw appends
//! `D{1|2}`. A card is rank letter (`A23456789TJQK`), suit letter (`HDCS`),
//! deck digit (`1|2`); a location is `R{1|2}`, `W{1|2}`, `T{1|2}{a-d}`,
//! `G{1|2}` (the drawn slot) or `F{1-8}`. The log is bit-stable: the same
//! seed and move sequence always produce the same text.

use crate::card::{Card, FOUNDATION_COUNT, Player, RANK_LETTERS, Suit, TABLEAU_COUNT};
use crate::error::NotationError;
use crate::location::{Move, PileLocation};
use crate::state::GameState;

const TABLEAU_LETTERS: [char; TABLEAU_COUNT] = ['a', 'b', 'c', 'd'];

pub fn format_card(card: Card) -> String {
    format!(
        "{}{}{}",
        RANK_LETTERS[(card.rank - 1) as usize],
        card.suit.letter(),
        card.origin.digit()
    )
}

pub fn format_location(location: PileLocation) -> String {
    match location {
        PileLocation::Foundation(index) => format!("F{}", index + 1),
        PileLocation::Tableau(owner, index) => {
            format!("T{}{}", owner.digit(), TABLEAU_LETTERS[index])
        }
        PileLocation::Reserve(owner) => format!("R{}", owner.digit()),
        PileLocation::Waste(owner) => format!("W{}", owner.digit()),
        PileLocation::Hand(owner) => format!("H{}", owner.digit()),
        PileLocation::Drawn(owner) => format!("G{}", owner.digit()),
    }
}

pub fn format_move(mv: &Move) -> String {
    format!(
        "{}:{}-{}",
        format_card(mv.card),
        format_location(mv.from),
        format_location(mv.to)
    )
}

pub fn format_draw(player: Player) -> String {
    format!("D{}", player.digit())
}

fn malformed(entry: &str) -> NotationError {
    NotationError::Malformed(entry.to_string())
}

fn parse_player(digit: char, entry: &str) -> Result<Player, NotationError> {
    match digit {
        '1' => Ok(Player::One),
        '2' => Ok(Player::Two),
        _ => Err(malformed(entry)),
    }
}

fn parse_card(text: &str, entry: &str) -> Result<Card, NotationError> {
    let mut chars = text.chars();
    let (Some(rank_ch), Some(suit_ch), Some(deck_ch), None) =
        (chars.next(), chars.next(), chars.next(), chars.next())
    else {
        return Err(malformed(entry));
    };
    let rank = RANK_LETTERS
        .iter()
        .position(|&letter| letter == rank_ch)
        .ok_or_else(|| malformed(entry))? as u8
        + 1;
    let suit = match suit_ch {
        'H' => Suit::Hearts,
        'D' => Suit::Diamonds,
        'C' => Suit::Clubs,
        'S' => Suit::Spades,
        _ => return Err(malformed(entry)),
    };
    let origin = parse_player(deck_ch, entry)?;
    Ok(Card::new(suit, rank, origin))
}

fn parse_location(text: &str, entry: &str) -> Result<PileLocation, NotationError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or_else(|| malformed(entry))?;
    match kind {
        'F' => {
            let digit = chars.next().ok_or_else(|| malformed(entry))?;
            if chars.next().is_some() {
                return Err(malformed(entry));
            }
            let index = digit.to_digit(10).ok_or_else(|| malformed(entry))? as usize;
            if !(1..=FOUNDATION_COUNT).contains(&index) {
                return Err(malformed(entry));
            }
            Ok(PileLocation::Foundation(index - 1))
        }
        'T' => {
            let (Some(owner_ch), Some(pile_ch), None) = (chars.next(), chars.next(), chars.next())
            else {
                return Err(malformed(entry));
            };
            let owner = parse_player(owner_ch, entry)?;
            let index = TABLEAU_LETTERS
                .iter()
                .position(|&letter| letter == pile_ch)
                .ok_or_else(|| malformed(entry))?;
            Ok(PileLocation::Tableau(owner, index))
        }
        'R' | 'W' | 'G' | 'H' => {
            let owner_ch = chars.next().ok_or_else(|| malformed(entry))?;
            if chars.next().is_some() {
                return Err(malformed(entry));
            }
            let owner = parse_player(owner_ch, entry)?;
            Ok(match kind {
                'R' => PileLocation::Reserve(owner),
                'W' => PileLocation::Waste(owner),
                'G' => PileLocation::Drawn(owner),
                _ => PileLocation::Hand(owner),
            })
        }
        _ => Err(malformed(entry)),
    }
}

fn apply_entry(state: &GameState, entry: &str) -> Result<GameState, NotationError> {
    if let Some(rest) = entry.strip_prefix('D') {
        let mut chars = rest.chars();
        let (Some(digit), None) = (chars.next(), chars.next()) else {
            return Err(malformed(entry));
        };
        let player = parse_player(digit, entry)?;
        if state.current_turn != player {
            return Err(NotationError::Replay {
                entry: entry.to_string(),
                source: crate::error::GameError::InvalidMove,
            });
        }
        return state
            .draw_from_hand()
            .map(|outcome| outcome.state)
            .map_err(|source| NotationError::Replay {
                entry: entry.to_string(),
                source,
            });
    }
    let (card_text, rest) = entry.split_once(':').ok_or_else(|| malformed(entry))?;
    let (from_text, to_text) = rest.split_once('-').ok_or_else(|| malformed(entry))?;
    let mv = Move::new(
        parse_location(from_text, entry)?,
        parse_location(to_text, entry)?,
        parse_card(card_text, entry)?,
    );
    state.apply_move(&mv).map_err(|source| NotationError::Replay {
        entry: entry.to_string(),
        source,
    })
}

/// Replays a notation log from an initial state, yielding the final state.
/// The replayed piles match the state the log was recorded from.
pub fn parse_notation(log: &[String], initial: GameState) -> Result<GameState, NotationError> {
    let mut state = initial;
    for entry in log {
        state = apply_entry(&state, entry)?;
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_moves_and_draws() {
        let card = Card::new(Suit::Hearts, 1, Player::One);
        let mv = Move::new(
            PileLocation::Reserve(Player::One),
            PileLocation::Foundation(0),
            card,
        );
        assert_eq!(format_move(&mv), "AH1:R1-F1");
        assert_eq!(format_draw(Player::Two), "D2");

        let ten = Card::new(Suit::Spades, 10, Player::Two);
        let mv = Move::new(
            PileLocation::Tableau(Player::Two, 3),
            PileLocation::Waste(Player::One),
            ten,
        );
        assert_eq!(format_move(&mv), "TS2:T2d-W1");
    }

    #[test]
    fn parses_what_it_formats() {
        let card = Card::new(Suit::Clubs, 12, Player::Two);
        let mv = Move::new(
            PileLocation::Drawn(Player::Two),
            PileLocation::Tableau(Player::One, 1),
            card,
        );
        let text = format_move(&mv);
        assert_eq!(text, "QC2:G2-T1b");
        let (card_text, rest) = text.split_once(':').unwrap();
        let (from_text, to_text) = rest.split_once('-').unwrap();
        assert_eq!(parse_card(card_text, &text).unwrap(), card);
        assert_eq!(parse_location(from_text, &text).unwrap(), mv.from);
        assert_eq!(parse_location(to_text, &text).unwrap(), mv.to);
    }

    #[test]
    fn rejects_malformed_entries() {
        assert!(parse_card("A", "A").is_err());
        assert!(parse_location("F9", "F9").is_err());
        assert!(parse_location("T3a", "T3a").is_err());
        assert!(parse_location("X1", "X1").is_err());
    }
}
