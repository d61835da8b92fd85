use flipseven_core::{
    ActionError, Bonus, Card, CardKind, Deck, Event, EventBus, Game, GameRules, Pending, Phase,
};

fn conn(name: &str) -> String {
    name.to_lowercase()
}

fn id(name: &str) -> String {
    format!("id-{name}")
}

fn table_with(rules: GameRules, cards: &[CardKind], names: &[&str]) -> (Game, EventBus) {
    let deck = Deck::fixed(cards.iter().copied().map(Card::new).collect()).expect("deck");
    let mut game = Game::with_deck(id(names[0]), rules, deck, 7).expect("game");
    let mut events = EventBus::default();
    for name in names {
        game.add_player(name, &conn(name), Some(id(name).as_str()), &mut events)
            .expect("join");
    }
    game.start(&conn(names[0]), &mut events).expect("start");
    (game, events)
}

fn table(cards: &[CardKind], names: &[&str]) -> (Game, EventBus) {
    table_with(GameRules::default(), cards, names)
}

fn numbers(game: &Game, idx: usize) -> Vec<u8> {
    game.players[idx].numbers.iter().copied().collect()
}

#[test]
fn duplicate_number_busts_single_player() {
    let (mut game, mut events) = table(&[CardKind::Number(2), CardKind::Number(2)], &["P"]);
    game.hit("p", &mut events).expect("first hit");
    assert_eq!(numbers(&game, 0), vec![2]);
    assert!(!game.players[0].busted);

    game.hit("p", &mut events).expect("second hit");
    let p = &game.players[0];
    assert!(p.busted && p.finished);
    assert_eq!(p.total_score, 0);
    assert!(game.pending_round_reset);
    assert_eq!(game.phase(), Phase::RoundOver);
    assert!(events.drain().any(|e| e == Event::Busted { player: id("P") }));
}

#[test]
fn flip_three_cascades_three_draws() {
    let (mut game, mut events) = table(
        &[
            CardKind::FlipThree,
            CardKind::Number(1),
            CardKind::Number(2),
            CardKind::Number(3),
        ],
        &["A", "B"],
    );
    let frames = game.hit("a", &mut events).expect("hit");
    assert_eq!(frames.len(), 1);
    assert_eq!(game.turn, 0);
    assert_eq!(game.phase(), Phase::Resolving);
    assert_eq!(
        game.stack.top(),
        Some(&Pending::FlipThree {
            initiator: id("A"),
            card: 0
        })
    );
    assert_eq!(game.hit("a", &mut events), Err(ActionError::ResolutionPending));

    let frames = game.apply_flip3("a", "b", &mut events).expect("flip three");
    assert_eq!(numbers(&game, 1), vec![1, 2, 3]);
    assert_eq!(game.players[1].round_score(&game.rules), 6);
    assert_eq!(game.turn, 1);
    assert!(game.stack.is_empty());
    assert_eq!(game.players[0].cards[0].target.as_deref(), Some("B"));

    assert!(frames.len() >= 4);
    assert_eq!(frames[1].players[1].numbers, vec![1]);
    assert_eq!(frames[2].players[1].numbers, vec![1, 2]);
    assert_eq!(frames[3].players[1].numbers, vec![1, 2, 3]);
    assert_eq!(frames.last(), Some(&game.snapshot()));
}

#[test]
fn nested_flip_three_resumes_outer_draws() {
    let (mut game, mut events) = table(
        &[
            CardKind::FlipThree,
            CardKind::Number(1),
            CardKind::FlipThree,
            CardKind::Number(5),
            CardKind::Number(6),
            CardKind::Number(7),
            CardKind::Number(2),
            CardKind::Number(12),
        ],
        &["A", "B"],
    );
    game.hit("a", &mut events).expect("hit");
    game.apply_flip3("a", "b", &mut events).expect("outer");
    assert_eq!(numbers(&game, 1), vec![1]);
    assert_eq!(game.stack.len(), 2);
    assert_eq!(
        game.stack.iter().next(),
        Some(&Pending::Draw3 {
            target: id("B"),
            remaining: 1
        })
    );
    assert_eq!(
        game.apply_flip3("a", "b", &mut events),
        Err(ActionError::WrongInitiator)
    );

    let frames = game.apply_flip3("b", "a", &mut events).expect("inner");
    assert_eq!(numbers(&game, 0), vec![5, 6, 7]);
    assert_eq!(numbers(&game, 1), vec![1, 2]);
    assert!(game.stack.is_empty());
    assert_eq!(game.turn, 1);
    assert_eq!(game.players[1].cards[1].target.as_deref(), Some("A"));
    assert_eq!(frames.last(), Some(&game.snapshot()));
}

#[test]
fn bust_during_forced_draws_stops_them() {
    let (mut game, mut events) = table(
        &[
            CardKind::FlipThree,
            CardKind::Number(3),
            CardKind::Number(3),
            CardKind::Number(9),
        ],
        &["A", "B"],
    );
    game.hit("a", &mut events).expect("hit");
    game.apply_flip3("a", "b", &mut events).expect("flip three");
    let b = &game.players[1];
    assert!(b.busted && b.finished);
    assert_eq!(b.cards.len(), 2);
    assert!(game.stack.is_empty());
    assert_eq!(game.turn, 0);
    assert!(!game.pending_round_reset);
}

fn give(game: &mut Game, idx: usize, values: &[u8]) {
    let flip7_count = game.rules.flip7_count;
    for &value in values {
        game.players[idx].take(Card::number(value), flip7_count);
    }
}

#[test]
fn flip_seven_during_forced_draws_drops_the_rest() {
    let (mut game, mut events) = table(
        &[
            CardKind::FlipThree,
            CardKind::Number(6),
            CardKind::Number(7),
            CardKind::Number(8),
        ],
        &["A", "B"],
    );
    give(&mut game, 1, &[1, 2, 3, 4, 5]);
    game.hit("a", &mut events).expect("hit");
    game.apply_flip3("a", "b", &mut events).expect("flip three");

    let b = &game.players[1];
    assert!(b.flip7 && b.finished && !b.busted);
    assert_eq!(numbers(&game, 1), vec![1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(b.round_score(&game.rules), 43);
    assert!(game.stack.is_empty());
    assert_eq!(game.turn, 0);

    game.hit("a", &mut events).expect("a draws the undealt card");
    assert_eq!(numbers(&game, 0), vec![8]);
}

#[test]
fn freeze_during_forced_draws_then_draws_resume() {
    let (mut game, mut events) = table(
        &[
            CardKind::FlipThree,
            CardKind::Freeze,
            CardKind::Number(2),
            CardKind::Number(9),
        ],
        &["A", "B", "C"],
    );
    game.hit("a", &mut events).expect("hit");
    game.apply_flip3("a", "b", &mut events).expect("flip three");
    assert_eq!(game.stack.len(), 2);
    assert_eq!(
        game.stack.top(),
        Some(&Pending::Freeze {
            initiator: id("B"),
            card: 0
        })
    );

    let frames = game.apply_freeze("b", "c", &mut events).expect("freeze c");
    assert!(game.players[2].finished);
    assert_eq!(numbers(&game, 1), vec![2, 9]);
    assert_eq!(game.players[1].cards[0].target.as_deref(), Some("C"));
    assert!(game.stack.is_empty());
    assert_eq!(game.turn, 1);
    assert_eq!(frames.last(), Some(&game.snapshot()));
}

#[test]
fn self_freeze_during_forced_draws_cancels_them() {
    let (mut game, mut events) = table(
        &[CardKind::FlipThree, CardKind::Freeze, CardKind::Number(2)],
        &["A", "B"],
    );
    game.hit("a", &mut events).expect("hit");
    game.apply_flip3("a", "b", &mut events).expect("flip three");
    game.apply_freeze("b", "b", &mut events).expect("self freeze");

    let b = &game.players[1];
    assert!(b.finished && !b.busted);
    assert_eq!(b.cards.len(), 1);
    assert!(game.stack.is_empty());
    assert_eq!(game.turn, 0);

    game.hit("a", &mut events).expect("a draws the undealt card");
    assert_eq!(numbers(&game, 0), vec![2]);
}

#[test]
fn discard_during_forced_draws_then_draws_resume() {
    let (mut game, mut events) = table(
        &[
            CardKind::FlipThree,
            CardKind::Discard,
            CardKind::Number(2),
            CardKind::Number(9),
        ],
        &["A", "B"],
    );
    give(&mut game, 1, &[1]);
    game.hit("a", &mut events).expect("hit");
    game.apply_flip3("a", "b", &mut events).expect("flip three");
    assert_eq!(
        game.stack.top(),
        Some(&Pending::DiscardChooseTarget {
            initiator: id("B"),
            card: 1
        })
    );

    game.apply_discard_choose_target("b", "b", 1, &mut events)
        .expect("target self");
    assert_eq!(game.stack.len(), 2);
    game.apply_discard_choose_card("b", 0, &mut events)
        .expect("discard the 1");

    assert_eq!(numbers(&game, 1), vec![2, 9]);
    assert_eq!(game.players[1].cards.len(), 3);
    assert!(game.stack.is_empty());
    assert_eq!(game.turn, 1);
    assert!(events.drain().any(|e| matches!(
        e,
        Event::CardDiscarded { card, .. } if card.kind == CardKind::Number(1)
    )));
}

#[test]
fn freeze_waits_for_a_valid_target() {
    let (mut game, mut events) = table(&[CardKind::Number(5), CardKind::Freeze], &["A", "B"]);
    game.hit("a", &mut events).expect("hit");
    game.stay("b", &mut events).expect("stay");
    assert_eq!(game.turn, 0);

    game.hit("a", &mut events).expect("freeze drawn");
    assert_eq!(
        game.stack.top(),
        Some(&Pending::Freeze {
            initiator: id("A"),
            card: 1
        })
    );
    assert_eq!(
        game.apply_freeze("b", "a", &mut events),
        Err(ActionError::WrongInitiator)
    );
    assert_eq!(
        game.apply_freeze("a", "b", &mut events),
        Err(ActionError::TargetFinished)
    );
    assert_eq!(game.stack.len(), 1);

    let frames = game.apply_freeze("a", "a", &mut events).expect("self freeze");
    assert!(game.players[0].finished);
    assert_eq!(game.players[0].total_score, 5);
    assert!(game.pending_round_reset);
    assert_eq!(frames.last(), Some(&game.snapshot()));
}

#[test]
fn discard_without_numbers_is_a_no_op() {
    let (mut game, mut events) = table(&[CardKind::Discard, CardKind::Number(4)], &["A", "B"]);
    game.hit("a", &mut events).expect("hit");
    assert!(game.stack.is_empty());
    assert_eq!(game.turn, 1);
    assert_eq!(game.players[0].cards.len(), 1);
}

#[test]
fn discard_two_step_resolution() {
    let (mut game, mut events) = table(
        &[CardKind::Number(4), CardKind::Number(6), CardKind::Discard],
        &["A", "B"],
    );
    game.hit("a", &mut events).expect("a draws 4");
    game.hit("b", &mut events).expect("b draws 6");
    game.hit("a", &mut events).expect("a draws discard");
    assert_eq!(
        game.stack.top(),
        Some(&Pending::DiscardChooseTarget {
            initiator: id("A"),
            card: 1
        })
    );
    assert_eq!(
        game.apply_discard_choose_target("a", "b", 0, &mut events),
        Err(ActionError::StaleCardIndex)
    );
    game.apply_discard_choose_target("a", "b", 1, &mut events)
        .expect("target chosen");
    assert_eq!(
        game.stack.top(),
        Some(&Pending::DiscardChooseCard {
            initiator: id("A"),
            target: id("B")
        })
    );
    assert_eq!(
        game.apply_discard_choose_card("a", 0, &mut events),
        Err(ActionError::NotYourChoice)
    );
    assert_eq!(
        game.apply_discard_choose_card("b", 3, &mut events),
        Err(ActionError::CardIndexOutOfRange)
    );

    game.apply_discard_choose_card("b", 0, &mut events)
        .expect("card chosen");
    assert!(game.players[1].cards.is_empty());
    assert!(numbers(&game, 1).is_empty());
    assert!(game.stack.is_empty());
    assert_eq!(game.turn, 1);
    assert_eq!(game.players[0].cards[1].target.as_deref(), Some("B"));
}

#[test]
fn discard_against_empty_hand_fizzles() {
    let (mut game, mut events) = table(&[CardKind::Number(4), CardKind::Discard], &["A", "B", "C"]);
    game.hit("a", &mut events).expect("a draws 4");
    game.hit("b", &mut events).expect("b draws discard");
    assert_eq!(game.stack.len(), 1);
    game.apply_discard_choose_target("b", "c", 0, &mut events)
        .expect("fizzle");
    assert!(game.stack.is_empty());
    assert_eq!(game.turn, 2);
    assert!(events
        .drain()
        .any(|e| matches!(e, Event::DiscardFizzled { .. })));
}

#[test]
fn choosing_a_bonus_card_wastes_the_discard() {
    let (mut game, mut events) = table(
        &[
            CardKind::Bonus(Bonus::Add(4)),
            CardKind::Number(8),
            CardKind::Discard,
        ],
        &["A", "B"],
    );
    game.hit("a", &mut events).expect("a draws bonus");
    game.hit("b", &mut events).expect("b draws 8");
    game.hit("a", &mut events).expect("a draws discard");
    game.apply_discard_choose_target("a", "a", 1, &mut events)
        .expect("target self");
    game.apply_discard_choose_card("a", 0, &mut events)
        .expect("bonus chosen");
    assert_eq!(game.players[0].cards.len(), 2);
    assert!(game.stack.is_empty());
    assert_eq!(game.turn, 1);
}

#[test]
fn seven_numbers_finish_with_bonus() {
    let cards: Vec<CardKind> = (1..=7).map(CardKind::Number).collect();
    let (mut game, mut events) = table(&cards, &["P"]);
    for _ in 0..7 {
        game.hit("p", &mut events).expect("hit");
    }
    let p = &game.players[0];
    assert!(p.finished && p.flip7);
    assert_eq!(p.total_score, 28 + 15);
    assert!(game.pending_round_reset);
    assert_eq!(game.hit("p", &mut events), Err(ActionError::RoundOver));

    game.proceed_round(&mut events).expect("next round");
    assert_eq!(game.round, 2);
    assert!(game.players[0].cards.is_empty());
    assert_eq!(game.players[0].total_score, 43);
}

#[test]
fn new_round_rotates_turn_by_one() {
    let (mut game, mut events) = table(&[CardKind::Number(1)], &["A", "B"]);
    game.hit("a", &mut events).expect("hit");
    game.stay("b", &mut events).expect("b stays");
    game.stay("a", &mut events).expect("a stays");
    assert_eq!(game.turn, 0);
    assert!(game.pending_round_reset);
    assert_eq!(game.players[0].total_score, 1);

    game.proceed_round(&mut events).expect("proceed");
    assert_eq!(game.turn, 1);
    assert!(!game.pending_round_reset);
    assert_eq!(
        game.proceed_round(&mut events),
        Err(ActionError::RoundInProgress)
    );
}

fn race_to_win(a_total: i64, b_total: i64) -> Game {
    let (mut game, mut events) = table(&[CardKind::Number(5)], &["A", "B"]);
    game.players[0].total_score = a_total;
    game.players[1].total_score = b_total;
    game.hit("a", &mut events).expect("a hits");
    game.hit("b", &mut events).expect("b hits");
    game.stay("a", &mut events).expect("a stays");
    game.stay("b", &mut events).expect("b stays");
    game
}

#[test]
fn higher_total_wins_the_match() {
    let mut game = race_to_win(195, 196);
    assert_eq!(game.match_winner.as_deref(), Some("id-B"));
    assert_eq!(game.snapshot().match_winner.as_deref(), Some("B"));
    assert_eq!(game.phase(), Phase::MatchOver);
    let mut events = EventBus::default();
    assert_eq!(game.proceed_round(&mut events), Err(ActionError::MatchOver));
}

#[test]
fn tied_totals_go_to_first_seat() {
    let mut game = race_to_win(195, 195);
    assert_eq!(game.match_winner.as_deref(), Some("id-A"));
    let mut events = EventBus::default();
    assert_eq!(game.hit("a", &mut events), Err(ActionError::MatchOver));
}

#[test]
fn totals_below_threshold_do_not_win() {
    let game = race_to_win(150, 100);
    assert_eq!(game.match_winner, None);
    assert!(game.pending_round_reset);
}

#[test]
fn custom_win_score_is_honoured() {
    let rules = GameRules {
        win_score: 10,
        ..GameRules::default()
    };
    let (mut game, mut events) = table_with(rules, &[CardKind::Number(12)], &["P"]);
    game.hit("p", &mut events).expect("hit");
    game.stay("p", &mut events).expect("stay");
    assert_eq!(game.match_winner.as_deref(), Some("id-P"));
}

#[test]
fn only_the_turn_holder_may_act() {
    let (mut game, mut events) = table(&[CardKind::Number(1)], &["A", "B"]);
    assert_eq!(game.hit("b", &mut events), Err(ActionError::NotYourTurn));
    assert_eq!(game.stay("zz", &mut events), Err(ActionError::UnknownPlayer));
    assert_eq!(
        game.apply_freeze("a", "b", &mut events),
        Err(ActionError::NothingPending)
    );
    assert!(game.players.iter().all(|p| p.cards.is_empty()));
}
