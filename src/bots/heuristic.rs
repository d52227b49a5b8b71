//! Weighted-heuristic turn planner.
//!
//! Candidate moves are filtered (pointless shuffles always; position and
//! state cycles unless a drawn card forces play), scored against the weight
//! vector with a repetition penalty and an optional shallow look-ahead, then
//! picked greedily with a small seeded exploration chance. When nothing
//! playable remains the planner draws, preferring an empty-creating
//! consolidation over the draw when one exists.

use std::collections::HashSet;
use std::hash::{DefaultHasher, Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::bot::{Decision, MovePattern, PatternWindow, Step, TurnPolicy};
use crate::card::{Card, Player, RANK_ACE};
use crate::game::{can_play_on_foundation, can_play_on_opponent_pile};
use crate::location::{Move, PileLocation};
use crate::rng::Lcg;
use crate::state::{GameState, Phase};
use crate::weights::Weights;

/// Safety cap on engine operations per computed turn.
pub const MAX_TURN_OPERATIONS: usize = 100;

/// Tunables of the heuristic that are not part of the evolved weight vector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeuristicConfig {
    /// Probability of picking a uniformly random candidate instead of the
    /// top-scored one.
    pub exploration_rate: f64,
    /// Sliding-window length for the shuffle-pattern penalty.
    pub pattern_memory: usize,
    /// Penalty per prior occurrence of a tableau-to-tableau pattern.
    pub shuffle_penalty: f64,
    /// Look-ahead recursion depth; 0 disables look-ahead.
    pub look_ahead_depth: u32,
    /// Moves expanded per level beyond the first.
    pub look_ahead_branch_factor: usize,
    pub look_ahead_foundation_bonus: f64,
    pub look_ahead_empty_bonus: f64,
    pub look_ahead_attack_bonus: f64,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            exploration_rate: 0.05,
            pattern_memory: 10,
            shuffle_penalty: 15.0,
            look_ahead_depth: 1,
            look_ahead_branch_factor: 3,
            look_ahead_foundation_bonus: 20.0,
            look_ahead_empty_bonus: 10.0,
            look_ahead_attack_bonus: 8.0,
        }
    }
}

/// The shipped `TurnPolicy`: a weight vector plus heuristic tunables.
#[derive(Clone, Debug)]
pub struct HeuristicPolicy {
    pub weights: Weights,
    pub config: HeuristicConfig,
}

impl HeuristicPolicy {
    pub fn new(weights: Weights, config: HeuristicConfig) -> Self {
        Self { weights, config }
    }
}

impl TurnPolicy for HeuristicPolicy {
    fn compute_turn(
        &mut self,
        state: &GameState,
        recent_patterns: &mut PatternWindow,
    ) -> Vec<Step> {
        compute_turn(state, &self.weights, &self.config, recent_patterns)
    }
}

/// Hash of the board position: per-player reserve, waste, tableau and drawn
/// slot, plus foundations, in a fixed order. Two states collide exactly when
/// their piles match, which is what the state-cycle filter needs.
fn canonical_hash(state: &GameState) -> u64 {
    let mut hasher = DefaultHasher::new();
    for player in &state.players {
        player.reserve.hash(&mut hasher);
        player.waste.hash(&mut hasher);
        for pile in &player.tableau {
            pile.hash(&mut hasher);
        }
        player.drawn_card.hash(&mut hasher);
    }
    for pile in &state.foundations {
        pile.hash(&mut hasher);
    }
    hasher.finish()
}

/// Records the tops of every accessible pile and the canonical hash of a
/// newly observed state.
fn observe(
    state: &GameState,
    seen_positions: &mut HashSet<(Card, PileLocation)>,
    seen_states: &mut HashSet<u64>,
) {
    for (index, pile) in state.foundations.iter().enumerate() {
        if let Some(card) = pile.last() {
            seen_positions.insert((*card, PileLocation::Foundation(index)));
        }
    }
    for owner in [Player::One, Player::Two] {
        let player = state.player(owner);
        if let Some(card) = player.reserve.last() {
            seen_positions.insert((*card, PileLocation::Reserve(owner)));
        }
        if let Some(card) = player.waste.last() {
            seen_positions.insert((*card, PileLocation::Waste(owner)));
        }
        for (index, pile) in player.tableau.iter().enumerate() {
            if let Some(card) = pile.last() {
                seen_positions.insert((*card, PileLocation::Tableau(owner, index)));
            }
        }
    }
    seen_states.insert(canonical_hash(state));
}

/// Singleton tableau pile moved onto an empty tableau: legal but pointless,
/// removed before scoring.
fn is_pointless_shuffle(state: &GameState, mv: &Move) -> bool {
    let PileLocation::Tableau(from_owner, from_index) = mv.from else {
        return false;
    };
    let PileLocation::Tableau(to_owner, to_index) = mv.to else {
        return false;
    };
    state.player(from_owner).tableau[from_index].len() == 1
        && state.player(to_owner).tableau[to_index].is_empty()
}

/// Singleton tableau pile moved onto a non-empty tableau, freeing a slot.
fn is_empty_creating(state: &GameState, mv: &Move) -> bool {
    let PileLocation::Tableau(from_owner, from_index) = mv.from else {
        return false;
    };
    let PileLocation::Tableau(to_owner, to_index) = mv.to else {
        return false;
    };
    state.player(from_owner).tableau[from_index].len() == 1
        && !state.player(to_owner).tableau[to_index].is_empty()
}

fn is_attack(me: Player, mv: &Move) -> bool {
    matches!(
        mv.to,
        PileLocation::Waste(owner) | PileLocation::Reserve(owner) if owner != me
    )
}

/// Whether `card` could go to a foundation or attack the opponent of `me`
/// right now. Used to judge if uncovering it is worth anything.
fn has_foundation_or_attack_play(state: &GameState, me: Player, card: Card) -> bool {
    for (index, pile) in state.foundations.iter().enumerate() {
        if can_play_on_foundation(card, index, pile) {
            return true;
        }
    }
    let opponent = state.player(me.opponent());
    can_play_on_opponent_pile(card, &opponent.waste)
        || can_play_on_opponent_pile(card, &opponent.reserve)
}

fn look_ahead_priority(me: Player, mv: &Move) -> u8 {
    if mv.to.is_foundation() {
        0
    } else if is_attack(me, mv) {
        1
    } else {
        2
    }
}

/// Counts promising follow-ups after a simulated move; each recursion level
/// contributes at half the weight of the one above.
fn look_ahead_bonus(state: &GameState, depth: u32, config: &HeuristicConfig) -> f64 {
    let me = state.current_turn;
    let legal = state.legal_moves();
    let mut bonus = 0.0;
    for mv in &legal {
        if mv.to.is_foundation() {
            bonus += config.look_ahead_foundation_bonus;
        }
        if is_empty_creating(state, mv) {
            bonus += config.look_ahead_empty_bonus;
        }
        if is_attack(me, mv) {
            bonus += config.look_ahead_attack_bonus;
        }
    }
    if depth > 1 {
        let mut ordered: Vec<&Move> = legal.iter().collect();
        ordered.sort_by_key(|mv| look_ahead_priority(me, mv));
        for mv in ordered.into_iter().take(config.look_ahead_branch_factor) {
            if let Ok(next) = state.apply_move(mv) {
                bonus += 0.5 * look_ahead_bonus(&next, depth - 1, config);
            }
        }
    }
    bonus
}

/// Weighted feature sum for one candidate move, including the repetition
/// penalty and the look-ahead bonus.
fn score_move(
    state: &GameState,
    mv: &Move,
    weights: &Weights,
    config: &HeuristicConfig,
    window: &PatternWindow,
) -> f64 {
    let me = state.current_turn;
    let mut score = 0.0;

    match mv.to {
        PileLocation::Foundation(_) => {
            score += f64::from(weights.to_foundation);
            if mv.card.rank == RANK_ACE {
                score += f64::from(weights.plays_ace);
            }
            if mv.card.rank == RANK_ACE + 1 {
                score += f64::from(weights.plays_two);
            }
        }
        PileLocation::Reserve(owner) if owner != me => {
            score += f64::from(weights.attack_reserve);
        }
        PileLocation::Waste(owner) if owner != me => {
            score += f64::from(weights.attack_waste);
        }
        PileLocation::Tableau(owner, _) => {
            score += if owner == me {
                f64::from(weights.to_own_tableau)
            } else {
                f64::from(weights.to_opponent_tableau)
            };
        }
        _ => {}
    }

    match mv.from {
        PileLocation::Reserve(owner) => {
            score += f64::from(weights.from_reserve);
            if state.player(owner).reserve.len() == 1 {
                score += f64::from(weights.empties_reserve);
            }
        }
        PileLocation::Waste(_) | PileLocation::Drawn(_) => {
            score += f64::from(weights.from_waste);
        }
        PileLocation::Tableau(owner, index) => {
            score += f64::from(weights.from_tableau);
            let pile = &state.player(owner).tableau[index];
            if pile.len() == 1 {
                if is_pointless_shuffle(state, mv) {
                    score += f64::from(weights.pointless_tableau_shuffle);
                } else if is_empty_creating(state, mv) {
                    score += f64::from(weights.creates_useful_empty);
                } else if mv.to.is_foundation() || is_attack(me, mv) {
                    score += f64::from(weights.creates_empty_tableau);
                }
            } else if pile.len() >= 2 {
                let exposed = pile[pile.len() - 2];
                if !has_foundation_or_attack_play(state, me, exposed) {
                    score += f64::from(weights.tableau_move_no_benefit);
                }
            }
        }
        _ => {}
    }

    if let PileLocation::Tableau(owner, to_index) = mv.to {
        if owner == me {
            let mut heights: [usize; 4] = std::array::from_fn(|i| state.player(me).tableau[i].len());
            let max_before = heights.iter().copied().max().unwrap_or(0);
            let nonempty_before = heights.iter().filter(|&&h| h > 0).count() as i64;
            heights[to_index] += 1;
            if let PileLocation::Tableau(from_owner, from_index) = mv.from {
                if from_owner == me {
                    heights[from_index] -= 1;
                }
            }
            let max_after = heights.iter().copied().max().unwrap_or(0);
            let nonempty_after = heights.iter().filter(|&&h| h > 0).count() as i64;
            let height_gain = max_after as i64 - max_before as i64;
            if height_gain > 0 {
                score += f64::from(weights.stack_height_bonus) * height_gain as f64;
            }
            let spread_change = nonempty_after - nonempty_before;
            score += f64::from(weights.spread_penalty) * spread_change as f64;
        }
    }

    if mv.from.is_tableau() && mv.to.is_tableau() {
        let repeats = window.count(&MovePattern::from(mv));
        score -= config.shuffle_penalty * repeats as f64;
    }

    if config.look_ahead_depth > 0 && !mv.to.is_foundation() {
        if let Ok(next) = state.apply_move(mv) {
            score += look_ahead_bonus(&next, config.look_ahead_depth, config);
        }
    }

    score
}

enum Selection {
    Play { mv: Move, reasoning: String },
    Consolidate { mv: Move },
    Draw,
}

/// One decision for the current state. Filters in fixed order, then stable
/// score-descending selection with a seeded exploration chance.
fn select(
    state: &GameState,
    weights: &Weights,
    config: &HeuristicConfig,
    window: &PatternWindow,
    seen_positions: &HashSet<(Card, PileLocation)>,
    seen_states: &HashSet<u64>,
    rng: &mut Lcg,
) -> Selection {
    let me = state.current_turn;
    let legal = state.legal_moves();
    let drawn_pending = state.player(me).drawn_card.is_some();

    let candidates: Vec<&Move> = legal
        .iter()
        .filter(|mv| {
            if is_pointless_shuffle(state, mv) {
                return false;
            }
            if drawn_pending {
                // The drawn card must be played; cycle filters are off.
                return true;
            }
            if seen_positions.contains(&(mv.card, mv.to)) {
                return false;
            }
            match state.apply_move(mv) {
                Ok(next) => !seen_states.contains(&canonical_hash(&next)),
                Err(_) => false,
            }
        })
        .collect();

    if candidates.is_empty() {
        if let Some(mv) = legal.iter().find(|mv| is_empty_creating(state, mv)) {
            return Selection::Consolidate { mv: *mv };
        }
        return Selection::Draw;
    }

    let scored: Vec<f64> = candidates
        .iter()
        .map(|mv| score_move(state, mv, weights, config, window))
        .collect();
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        scored[b]
            .partial_cmp(&scored[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let explore = rng.next_unit() < config.exploration_rate;
    let picked = if explore {
        rng.pick(candidates.len())
    } else {
        order[0]
    };
    let reasoning = if explore {
        format!(
            "exploration pick ({} candidates, score {:.1})",
            candidates.len(),
            scored[picked]
        )
    } else {
        format!(
            "best of {} candidates, score {:.1}",
            candidates.len(),
            scored[picked]
        )
    };
    Selection::Play {
        mv: *candidates[picked],
        reasoning,
    }
}

/// Plans one full turn of the active player.
///
/// Each returned step's state is the result of applying its decision to the
/// previous step's state. The sequence ends when the turn passes, the game
/// ends, the operation cap is reached, or there is nothing left to draw.
/// Deterministic for fixed inputs: the internal RNG is seeded from
/// `state.seed + state.move_count`.
pub fn compute_turn(
    state: &GameState,
    weights: &Weights,
    config: &HeuristicConfig,
    recent_patterns: &mut PatternWindow,
) -> Vec<Step> {
    let mut steps = Vec::new();
    if state.phase == Phase::Ended {
        return steps;
    }
    let me = state.current_turn;
    let mut rng = Lcg::new(state.seed.wrapping_add(state.move_count));
    let mut seen_positions: HashSet<(Card, PileLocation)> = HashSet::new();
    let mut seen_states: HashSet<u64> = HashSet::new();
    let mut current = state.clone();
    observe(&current, &mut seen_positions, &mut seen_states);

    for _ in 0..MAX_TURN_OPERATIONS {
        if current.phase == Phase::Ended || current.current_turn != me {
            break;
        }
        match select(
            &current,
            weights,
            config,
            recent_patterns,
            &seen_positions,
            &seen_states,
            &mut rng,
        ) {
            Selection::Play { mv, reasoning } => {
                let Ok(next) = current.apply_move(&mv) else {
                    break;
                };
                recent_patterns.record(MovePattern::from(&mv));
                observe(&next, &mut seen_positions, &mut seen_states);
                steps.push(Step {
                    state: next.clone(),
                    decision: Decision::Play { mv, reasoning },
                });
                current = next;
            }
            Selection::Consolidate { mv } => {
                let Ok(next) = current.apply_move(&mv) else {
                    break;
                };
                recent_patterns.record(MovePattern::from(&mv));
                observe(&next, &mut seen_positions, &mut seen_states);
                steps.push(Step {
                    state: next.clone(),
                    decision: Decision::Play {
                        mv,
                        reasoning: String::from("consolidation to delay drawing"),
                    },
                });
                current = next;
            }
            Selection::Draw => match current.draw_from_hand() {
                Ok(outcome) => {
                    seen_positions.clear();
                    seen_states.clear();
                    observe(&outcome.state, &mut seen_positions, &mut seen_states);
                    let reasoning = if outcome.turn_ended {
                        String::from("drew an unplayable card, turn passes")
                    } else {
                        String::from("no playable candidates, drawing")
                    };
                    steps.push(Step {
                        state: outcome.state.clone(),
                        decision: Decision::Draw { reasoning },
                    });
                    if outcome.turn_ended {
                        return steps;
                    }
                    current = outcome.state;
                }
                Err(_) => break,
            },
        }
    }
    steps
}

/// Single-decision adapter for consumers that want a hint rather than a full
/// turn (same filters and scoring as the first step of `compute_turn`).
pub fn get_best_decision(
    state: &GameState,
    weights: &Weights,
    config: &HeuristicConfig,
) -> Option<Decision> {
    if state.phase == Phase::Ended {
        return None;
    }
    let mut rng = Lcg::new(state.seed.wrapping_add(state.move_count));
    let mut seen_positions = HashSet::new();
    let mut seen_states = HashSet::new();
    observe(state, &mut seen_positions, &mut seen_states);
    let window = PatternWindow::new(config.pattern_memory);
    match select(
        state,
        weights,
        config,
        &window,
        &seen_positions,
        &seen_states,
        &mut rng,
    ) {
        Selection::Play { mv, reasoning } => Some(Decision::Play { mv, reasoning }),
        Selection::Consolidate { mv } => Some(Decision::Play {
            mv,
            reasoning: String::from("consolidation to delay drawing"),
        }),
        Selection::Draw => match state.draw_from_hand() {
            Ok(outcome) => {
                let reasoning = if outcome.turn_ended {
                    String::from("drew an unplayable card, turn passes")
                } else {
                    String::from("no playable candidates, drawing")
                };
                Some(Decision::Draw { reasoning })
            }
            Err(_) => None,
        },
    }
}
