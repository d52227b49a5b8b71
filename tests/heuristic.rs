use bankbot::{
    Card, Decision, GameState, HeuristicConfig, HeuristicPolicy, MAX_TURN_OPERATIONS, MovePattern,
    PatternWindow, Phase, PileLocation, Player, PlayerState, Suit, TurnPolicy, Weights,
    compute_turn, get_best_decision,
};

fn card(suit: Suit, rank: u8, origin: Player) -> Card {
    Card::new(suit, rank, origin)
}

fn empty_state(current: Player) -> GameState {
    GameState {
        players: [PlayerState::empty(), PlayerState::empty()],
        foundations: std::array::from_fn(|_| Vec::new()),
        current_turn: current,
        phase: Phase::Playing,
        move_count: 0,
        winner: None,
        seed: 13,
        notation_log: Vec::new(),
    }
}

#[test]
fn computed_turns_respect_the_operation_cap() {
    let weights = Weights::reference();
    let config = HeuristicConfig::default();
    for seed in [3u32, 550, 8181, 90210] {
        let state = GameState::new(Some(seed));
        let mut window = PatternWindow::new(config.pattern_memory);
        let steps = compute_turn(&state, &weights, &config, &mut window);
        assert!(steps.len() <= MAX_TURN_OPERATIONS, "seed {seed}");
        assert!(!steps.is_empty(), "a fresh deal always has something to do");
        for step in &steps {
            assert_eq!(step.state.total_cards(), 104);
        }
    }
}

#[test]
fn compute_turn_is_deterministic_for_fixed_inputs() {
    let weights = Weights::reference();
    let config = HeuristicConfig::default();
    let state = GameState::new(Some(777));

    let mut window_a = PatternWindow::new(config.pattern_memory);
    let steps_a = compute_turn(&state, &weights, &config, &mut window_a);
    let mut window_b = PatternWindow::new(config.pattern_memory);
    let steps_b = compute_turn(&state, &weights, &config, &mut window_b);

    assert_eq!(steps_a.len(), steps_b.len());
    for (a, b) in steps_a.iter().zip(&steps_b) {
        assert_eq!(a.decision, b.decision);
        assert_eq!(a.state, b.state);
    }
}

#[test]
fn turn_ends_with_the_turn_changing_hands_or_game_over() {
    let weights = Weights::reference();
    let config = HeuristicConfig::default();
    let state = GameState::new(Some(31337));
    let mut window = PatternWindow::new(config.pattern_memory);
    let steps = compute_turn(&state, &weights, &config, &mut window);
    let last = steps.last().expect("fresh deals produce steps");
    assert!(
        last.state.current_turn != state.current_turn
            || last.state.phase == Phase::Ended
            || steps.len() == MAX_TURN_OPERATIONS
    );
}

#[test]
fn pointless_tableau_shuffles_are_never_played() {
    let mut state = empty_state(Player::One);
    {
        let me = state.player_mut(Player::One);
        // Only a lone tableau card and empty slots around it: every legal
        // move is a pointless shuffle, so the planner must draw instead.
        me.tableau[0] = vec![card(Suit::Hearts, 5, Player::One)];
        me.hand = vec![card(Suit::Spades, 4, Player::One)];
    }
    let weights = Weights::reference();
    let config = HeuristicConfig::default();
    let mut window = PatternWindow::new(config.pattern_memory);
    let steps = compute_turn(&state, &weights, &config, &mut window);

    assert!(matches!(
        steps.first().map(|step| &step.decision),
        Some(Decision::Draw { .. })
    ));
    for step in &steps {
        if let Decision::Play { mv, .. } = &step.decision {
            assert!(
                !(mv.from.is_tableau() && mv.to.is_tableau()),
                "played a tableau shuffle from a dead position"
            );
        }
    }
}

#[test]
fn pending_drawn_card_is_played_first() {
    let mut state = empty_state(Player::One);
    let drawn = card(Suit::Spades, 3, Player::One);
    {
        let me = state.player_mut(Player::One);
        me.waste = vec![drawn];
        me.drawn_card = Some(drawn);
        me.tableau[0] = vec![card(Suit::Diamonds, 4, Player::One)];
        me.reserve = vec![card(Suit::Hearts, 1, Player::One)];
    }
    let weights = Weights::reference();
    let config = HeuristicConfig::default();
    let mut window = PatternWindow::new(config.pattern_memory);
    let steps = compute_turn(&state, &weights, &config, &mut window);

    let first = steps.first().expect("the drawn card must be played");
    match &first.decision {
        Decision::Play { mv, .. } => assert_eq!(mv.from, PileLocation::Drawn(Player::One)),
        other => panic!("expected a drawn-card play, got {other:?}"),
    }
}

#[test]
fn foundation_plays_outrank_tableau_plays() {
    let mut state = empty_state(Player::One);
    {
        let me = state.player_mut(Player::One);
        me.reserve = vec![
            card(Suit::Clubs, 8, Player::One),
            card(Suit::Hearts, 1, Player::One),
        ];
        me.tableau[0] = vec![card(Suit::Spades, 2, Player::One)];
        me.hand = vec![card(Suit::Diamonds, 11, Player::One)];
    }
    let weights = Weights::reference();
    // Disable exploration so the top-scored move is always taken.
    let config = HeuristicConfig {
        exploration_rate: 0.0,
        ..HeuristicConfig::default()
    };
    let mut window = PatternWindow::new(config.pattern_memory);
    let steps = compute_turn(&state, &weights, &config, &mut window);

    match &steps.first().expect("moves exist").decision {
        Decision::Play { mv, .. } => {
            assert!(mv.to.is_foundation(), "ace to foundation should win the scoring");
            assert_eq!(mv.card, card(Suit::Hearts, 1, Player::One));
        }
        other => panic!("expected a play, got {other:?}"),
    }
}

#[test]
fn get_best_decision_matches_the_first_turn_step() {
    let weights = Weights::reference();
    let config = HeuristicConfig::default();
    for seed in [12u32, 345, 6789] {
        let state = GameState::new(Some(seed));
        let mut window = PatternWindow::new(config.pattern_memory);
        let steps = compute_turn(&state, &weights, &config, &mut window);
        let hint = get_best_decision(&state, &weights, &config);
        assert_eq!(hint.as_ref(), steps.first().map(|step| &step.decision));
    }
}

#[test]
fn pattern_window_is_bounded_and_counts_repeats() {
    let from = PileLocation::Tableau(Player::One, 0);
    let to = PileLocation::Tableau(Player::One, 1);
    let pattern = MovePattern { from, to };
    let other = MovePattern { from: to, to: from };

    let mut window = PatternWindow::new(3);
    window.record(pattern);
    window.record(other);
    window.record(pattern);
    assert_eq!(window.count(&pattern), 2);
    assert_eq!(window.count(&other), 1);

    // A fourth record evicts the oldest entry.
    window.record(other);
    assert_eq!(window.len(), 3);
    assert_eq!(window.count(&pattern), 1);
    assert_eq!(window.count(&other), 2);
}

#[test]
fn heuristic_policy_matches_the_free_function_through_the_trait() {
    let weights = Weights::reference();
    let config = HeuristicConfig::default();
    let state = GameState::new(Some(808));

    let mut policy = HeuristicPolicy::new(weights, config.clone());
    let mut policy_window = PatternWindow::new(config.pattern_memory);
    let via_trait = policy.compute_turn(&state, &mut policy_window);

    let mut window = PatternWindow::new(config.pattern_memory);
    let direct = compute_turn(&state, &weights, &config, &mut window);

    assert_eq!(via_trait.len(), direct.len());
    for (a, b) in via_trait.iter().zip(&direct) {
        assert_eq!(a.decision, b.decision);
    }
}

#[test]
fn ended_games_produce_no_steps() {
    let mut state = empty_state(Player::One);
    state.phase = Phase::Ended;
    state.winner = Some(Player::Two);
    let weights = Weights::reference();
    let config = HeuristicConfig::default();
    let mut window = PatternWindow::new(config.pattern_memory);
    assert!(compute_turn(&state, &weights, &config, &mut window).is_empty());
    assert!(get_best_decision(&state, &weights, &config).is_none());
}

#[test]
fn stuck_player_with_nothing_to_draw_produces_no_steps() {
    let mut state = empty_state(Player::One);
    // A lone reserve nine with no hand and no waste, every tableau capped by
    // a king: nothing moves and nothing draws.
    {
        let me = state.player_mut(Player::One);
        me.reserve = vec![card(Suit::Hearts, 9, Player::One)];
        me.tableau[0] = vec![card(Suit::Hearts, 13, Player::One)];
        me.tableau[1] = vec![card(Suit::Spades, 13, Player::One)];
        me.tableau[2] = vec![card(Suit::Diamonds, 13, Player::One)];
        me.tableau[3] = vec![card(Suit::Clubs, 13, Player::One)];
    }
    {
        let opponent = state.player_mut(Player::Two);
        opponent.reserve = vec![card(Suit::Clubs, 2, Player::Two)];
        opponent.tableau[0] = vec![card(Suit::Hearts, 13, Player::Two)];
        opponent.tableau[1] = vec![card(Suit::Spades, 13, Player::Two)];
        opponent.tableau[2] = vec![card(Suit::Diamonds, 13, Player::Two)];
        opponent.tableau[3] = vec![card(Suit::Clubs, 13, Player::Two)];
    }
    let weights = Weights::reference();
    let config = HeuristicConfig::default();
    let mut window = PatternWindow::new(config.pattern_memory);
    let steps = compute_turn(&state, &weights, &config, &mut window);
    assert!(steps.is_empty());
}
