//! Full turns: movement, payment, elimination, rotation.

use marrakech::board::{Cell, Direction};
use marrakech::core::{
    Color, GameConfig, GameId, GameSnapshot, GameState, PlacementSnapshot, ScriptedDice, TurnPhase, UserId,
};
use marrakech::error::{EngineError, StateError};
use marrakech::events::{CellUpdate, EventLog, GameEvent, NullSink};
use marrakech::rules::RuleEngine;

const MOVER: UserId = UserId(1);
const OWNER: UserId = UserId(2);

/// Blue moves first; red owns the carpets Assam lands on.
fn game_with_assam_at(cell: Cell) -> GameState {
    let config = GameConfig::default().with_assam(cell, Direction::Up);
    let mut state = GameState::new(GameId(1), config).unwrap();
    state.seat_player(MOVER, Some(Color::Blue)).unwrap();
    state.seat_player(OWNER, Some(Color::Red)).unwrap();
    state.start(&mut NullSink).unwrap();
    state
}

/// Rebuild `state` after editing its snapshot.
fn edited(state: &GameState, edit: impl FnOnce(&mut GameSnapshot)) -> GameState {
    let mut snapshot = state.snapshot();
    edit(&mut snapshot);
    GameState::restore(&snapshot, state.config().clone(), state.board().clone()).unwrap()
}

fn lay(snapshot: &mut GameSnapshot, owner: UserId, cells: [(i8, i8); 2], turn: u32) {
    let carpet = snapshot
        .carpets
        .iter_mut()
        .find(|c| c.owner_id == owner)
        .unwrap();
    for (i, (x, y)) in cells.into_iter().enumerate() {
        carpet.placements.push(PlacementSnapshot {
            x,
            y,
            placement_turn: turn,
            sequence: u64::from(turn) * 10 + i as u64,
        });
    }
}

fn coins(state: &GameState, user: UserId) -> u32 {
    state.player_by_user(user).unwrap().coins
}

#[test]
fn test_landing_on_lone_carpet_pays_its_size() {
    let state = game_with_assam_at(Cell::new(2, 4));
    let mut state = edited(&state, |s| lay(s, OWNER, [(2, 2), (2, 3)], 1));

    let mut log = EventLog::new();
    let outcome = RuleEngine::new(ScriptedDice::new([2]))
        .complete_move(&mut state, Direction::Up, &mut log)
        .unwrap();

    assert_eq!(outcome.to, Cell::new(2, 2));
    let payment = outcome.payment.unwrap();
    assert_eq!(payment.due, 2);
    assert_eq!(payment.amount, 2);
    assert_eq!(coins(&state, MOVER), 28);
    assert_eq!(coins(&state, OWNER), 32);
    assert_eq!(log.of_kind("payment_made").count(), 1);
}

#[test]
fn test_short_payer_pays_what_they_have_and_is_eliminated() {
    let state = game_with_assam_at(Cell::new(2, 4));
    let mut state = edited(&state, |s| {
        s.players[0].coins = 1;
        lay(s, OWNER, [(2, 2), (2, 3)], 1);
        lay(s, OWNER, [(1, 2), (1, 3)], 2);
        lay(s, OWNER, [(3, 2), (3, 3)], 3);
        lay(s, MOVER, [(3, 3), (4, 3)], 4);
    });

    let mut log = EventLog::new();
    let outcome = RuleEngine::new(ScriptedDice::new([2]))
        .complete_move(&mut state, Direction::Up, &mut log)
        .unwrap();

    let payment = outcome.payment.unwrap();
    assert_eq!(payment.due, 5);
    assert_eq!(payment.amount, 1);
    assert!(outcome.eliminated);

    let mover = state.player_by_user(MOVER).unwrap();
    assert_eq!(mover.coins, 0);
    assert!(!mover.active);
    assert!(state.carpets().all_for_carpet(mover.carpet.id).is_empty());
    assert_eq!(coins(&state, OWNER), 31);
    assert_eq!(state.phase(), TurnPhase::AwaitingSwitch);

    let kinds: Vec<_> = log.events().iter().map(GameEvent::kind).collect();
    assert_eq!(
        kinds,
        vec!["assam_moved", "payment_made", "player_eliminated", "field_changed"]
    );
    assert_eq!(
        log.events()[3],
        GameEvent::FieldChanged {
            cells: vec![
                CellUpdate {
                    cell: Cell::new(3, 3),
                    color: Some(Color::Red)
                },
                CellUpdate {
                    cell: Cell::new(4, 3),
                    color: None
                },
            ]
        }
    );
}

#[test]
fn test_payment_follows_region_not_carpet() {
    let state = game_with_assam_at(Cell::new(2, 4));
    // Two red islands; only the one Assam lands in counts.
    let mut state = edited(&state, |s| {
        lay(s, OWNER, [(2, 2), (2, 1)], 1);
        lay(s, OWNER, [(5, 5), (6, 5)], 2);
    });

    let outcome = RuleEngine::new(ScriptedDice::new([2]))
        .complete_move(&mut state, Direction::Up, &mut NullSink)
        .unwrap();

    assert_eq!(outcome.payment.unwrap().due, 2);
}

#[test]
fn test_empty_cell_costs_nothing() {
    let mut state = game_with_assam_at(Cell::new(3, 3));
    let mut log = EventLog::new();

    let outcome = RuleEngine::new(ScriptedDice::new([3]))
        .complete_move(&mut state, Direction::Right, &mut log)
        .unwrap();

    assert_eq!(outcome.to, Cell::new(6, 3));
    assert!(outcome.payment.is_none());
    assert_eq!(coins(&state, MOVER), 30);
    assert_eq!(log.of_kind("payment_made").count(), 0);
}

#[test]
fn test_rejected_move_changes_nothing() {
    let mut state = game_with_assam_at(Cell::new(3, 3));
    let before = state.snapshot();
    let mut log = EventLog::new();

    let err = RuleEngine::new(ScriptedDice::new([4]))
        .complete_move(&mut state, Direction::Down, &mut log)
        .unwrap_err();

    assert!(matches!(err, EngineError::InvalidDirection { .. }));
    assert_eq!(state.snapshot(), before);
    assert!(log.is_empty());
}

#[test]
fn test_rotation_skips_eliminated_forever() {
    let config = GameConfig::default();
    let mut state = GameState::new(GameId(1), config).unwrap();
    for user in 1..=3 {
        state.seat_player(UserId(user), None).unwrap();
    }
    state.start(&mut NullSink).unwrap();
    let mut state = edited(&state, |s| s.players[1].active = false);

    let mut engine = RuleEngine::new(ScriptedDice::new([1]));
    let mut order = Vec::new();
    for _ in 0..6 {
        let direction = match state.assam().direction {
            Direction::Down => Direction::Left,
            _ => Direction::Up,
        };
        engine.complete_move(&mut state, direction, &mut NullSink).unwrap();
        let change = engine.switch_turn(&mut state, &mut NullSink).unwrap();
        order.push(state.player(change.next).unwrap().user);
    }

    assert_eq!(
        order,
        vec![UserId(3), UserId(1), UserId(3), UserId(1), UserId(3), UserId(1)]
    );
}

#[test]
fn test_move_number_tags_placements() {
    let mut state = game_with_assam_at(Cell::new(3, 3));
    let mut engine = RuleEngine::new(ScriptedDice::new([1]));

    // Turn 1: blue lays a carpet.
    engine.complete_move(&mut state, Direction::Up, &mut NullSink).unwrap();
    let blue = state.current_player().unwrap().carpet.id;
    engine
        .place_carpet_after_move(&mut state, blue, Cell::new(3, 1), Cell::new(2, 1), &mut NullSink)
        .unwrap();
    engine.switch_turn(&mut state, &mut NullSink).unwrap();

    // Turn 2: red skips placement.
    engine.complete_move(&mut state, Direction::Left, &mut NullSink).unwrap();
    engine.switch_turn(&mut state, &mut NullSink).unwrap();

    assert_eq!(state.move_number(), 3);
    let placements = state.carpets().all_for_carpet(blue);
    assert!(placements.iter().all(|p| p.turn == 1));
}

#[test]
fn test_finished_game_rejects_everything() {
    let state = game_with_assam_at(Cell::new(3, 3));
    let mut state = edited(&state, |s| s.players[1].active = false);
    let mut engine = RuleEngine::new(ScriptedDice::new([1]));

    engine.complete_move(&mut state, Direction::Up, &mut NullSink).unwrap();
    let change = engine.switch_turn(&mut state, &mut NullSink).unwrap();
    assert!(change.outcome.is_some());

    let finished = Err(EngineError::IllegalState(StateError::Finished));
    assert_eq!(engine.complete_move(&mut state, Direction::Up, &mut NullSink).map(|_| ()), finished);
    assert_eq!(engine.switch_turn(&mut state, &mut NullSink).map(|_| ()), finished);
    let carpet = state.player_by_user(MOVER).unwrap().carpet.id;
    assert_eq!(
        engine
            .place_carpet(&mut state, carpet, Cell::new(0, 0), Cell::new(0, 1), &mut NullSink)
            .map(|_| ()),
        finished
    );
}
