use std::fmt::Write;

use crate::bot::Decision;
use crate::card::{Card, Player, RANK_LETTERS};
use crate::notation::{format_card, format_location};
use crate::state::{GameState, Phase};

fn pretty_card(card: Card) -> String {
    format!(
        "{}{}",
        RANK_LETTERS[(card.rank - 1) as usize],
        card.suit.symbol()
    )
}

fn pretty_top(pile: &[Card]) -> String {
    match pile.last() {
        Some(card) => format!("{} ({})", pretty_card(*card), pile.len()),
        None => String::from("-"),
    }
}

fn player_label(player: Player) -> &'static str {
    match player {
        Player::One => "Player 1",
        Player::Two => "Player 2",
    }
}

/// Renders a board snapshot as a small text block for CLI output.
pub fn render_state(state: &GameState) -> String {
    let mut out = String::new();
    let status = match (state.phase, state.winner) {
        (Phase::Playing, _) => format!("playing, {} to act", player_label(state.current_turn)),
        (Phase::Ended, Some(winner)) => format!("ended, {} wins", player_label(winner)),
        (Phase::Ended, None) => String::from("ended, draw"),
    };
    let _ = writeln!(out, "Game: {status}  (move {})", state.move_count);

    let foundations = state
        .foundations
        .iter()
        .map(|pile| match pile.last() {
            Some(card) => pretty_card(*card),
            None => String::from("--"),
        })
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(out, "Foundations: {foundations}");

    for player in [Player::One, Player::Two] {
        let side = state.player(player);
        let tableau = side
            .tableau
            .iter()
            .map(|pile| pretty_top(pile))
            .collect::<Vec<_>>()
            .join("  ");
        let drawn = match side.drawn_card {
            Some(card) => format!("  drawn: {}", pretty_card(card)),
            None => String::new(),
        };
        let _ = writeln!(
            out,
            "{}: reserve {}  waste {}  hand {}{}",
            player_label(player),
            pretty_top(&side.reserve),
            pretty_top(&side.waste),
            side.hand.len(),
            drawn
        );
        let _ = writeln!(out, "  tableau: {tableau}");
    }
    out
}

/// One-line human description of a decision.
pub fn describe_decision(decision: &Decision) -> String {
    match decision {
        Decision::Play { mv, reasoning } => format!(
            "play {} from {} to {}  [{}]",
            format_card(mv.card),
            format_location(mv.from),
            format_location(mv.to),
            reasoning
        ),
        Decision::Draw { reasoning } => format!("draw  [{reasoning}]"),
    }
}
