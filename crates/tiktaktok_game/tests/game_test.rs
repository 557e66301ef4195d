//! Tests for the game state machine.

mod common;

use common::{Seat, started_game, statuses};
use tiktaktok_game::{
    AbortReason, Board, ChatBroadcast, ErrorEvent, ErrorKind, Game, GameAborted, GameFactory,
    GameResult, GameStatus, Mark, MoveRejection, NextMove, PlayerLeft, PlayerMoved, RosterEntry,
    ServerEvent, SetMark, StatusChanged, check_grid,
};

fn incorrect_move(rejection: MoveRejection) -> ServerEvent {
    ErrorEvent::new(ErrorKind::IncorrectMove, rejection.to_string()).into()
}

#[test]
fn test_first_player_waits() {
    let factory = GameFactory::new();
    let mut game = Game::new(7);
    let ann = Seat::new(&factory, "ann");

    assert!(game.add_player(ann.player.clone()));
    assert_eq!(game.status(), GameStatus::WaitingForSecondPlayer);
    assert_eq!(ann.sink.take(), vec![StatusChanged::waiting().into()]);
    assert_eq!(ann.player.mark(), Mark::Nothing);
}

#[test]
fn test_second_player_starts_game() {
    let factory = GameFactory::new();
    let mut game = Game::new(7);
    let ann = Seat::new(&factory, "ann");
    let bob = Seat::new(&factory, "bob");
    game.add_player(ann.player.clone());
    ann.sink.take();
    game.add_player(bob.player.clone());

    assert_eq!(game.status(), GameStatus::Started);
    assert_eq!(game.turn(), Mark::X);
    let (a, b) = (ann.player.mark(), bob.player.mark());
    assert_ne!(a, Mark::Nothing);
    assert_eq!(b, a.opponent());

    let roster = vec![RosterEntry::new("ann", a), RosterEntry::new("bob", b)];
    let started: ServerEvent = StatusChanged::started(roster).into();
    let first_turn: ServerEvent = NextMove::new(Mark::X).into();
    assert_eq!(
        ann.sink.take(),
        vec![SetMark::new(a).into(), started.clone(), first_turn.clone()]
    );
    assert_eq!(bob.sink.take(), vec![SetMark::new(b).into(), started, first_turn]);
}

#[test]
fn test_third_player_is_ignored() {
    let (mut game, x, _o) = started_game();
    let factory = GameFactory::new();
    let carl = Seat::new(&factory, "carl");

    assert!(!game.add_player(carl.player.clone()));
    assert_eq!(game.player_names(), vec!["ann", "bob"]);
    assert_eq!(carl.player.mark(), Mark::Nothing);
    assert!(carl.sink.take().is_empty());
    assert!(x.sink.take().is_empty());
}

#[test]
fn test_marks_are_assigned_both_ways() {
    let factory = GameFactory::new();
    let mut first_seat_marks = std::collections::HashSet::new();
    for id in 0..200 {
        let mut game = Game::new(id);
        let ann = Seat::new(&factory, "ann");
        let bob = Seat::new(&factory, "bob");
        game.add_player(ann.player.clone());
        game.add_player(bob.player.clone());
        first_seat_marks.insert(ann.player.mark());
    }
    assert_eq!(first_seat_marks.len(), 2);
}

#[test]
fn test_move_broadcasts_and_passes_turn() {
    let (mut game, x, o) = started_game();

    let result = game.make_move(x.id(), 4).unwrap();
    assert_eq!(result, GameResult::undecided());
    assert_eq!(game.board().get(4), Some(Mark::X));
    assert_eq!(game.turn(), Mark::O);

    let expected: Vec<ServerEvent> = vec![
        PlayerMoved::new(Mark::X, 4).into(),
        NextMove::new(Mark::O).into(),
    ];
    assert_eq!(x.sink.take(), expected);
    assert_eq!(o.sink.take(), expected);
}

#[test]
fn test_move_before_start_is_rejected() {
    let factory = GameFactory::new();
    let mut game = Game::new(1);
    let ann = Seat::new(&factory, "ann");
    game.add_player(ann.player.clone());
    ann.sink.take();

    assert_eq!(game.make_move(ann.id(), 0), Err(MoveRejection::NotStarted));
    assert_eq!(game.board(), &Board::new());
    assert_eq!(ann.sink.take(), vec![incorrect_move(MoveRejection::NotStarted)]);
}

#[test]
fn test_wrong_turn_is_rejected_privately() {
    let (mut game, x, o) = started_game();

    assert_eq!(game.make_move(o.id(), 0), Err(MoveRejection::NotYourTurn));
    assert_eq!(game.board(), &Board::new());
    assert_eq!(o.sink.take(), vec![incorrect_move(MoveRejection::NotYourTurn)]);
    assert!(x.sink.take().is_empty());
}

#[test]
fn test_cell_outside_grid_is_rejected() {
    let (mut game, x, _o) = started_game();

    for cell in [-1, 9, 100] {
        assert_eq!(game.make_move(x.id(), cell), Err(MoveRejection::OutsideGrid));
    }
    assert_eq!(game.board(), &Board::new());
    assert_eq!(game.turn(), Mark::X);
}

#[test]
fn test_occupied_cell_is_rejected() {
    let (mut game, x, o) = started_game();
    game.make_move(x.id(), 4).unwrap();
    x.sink.take();
    o.sink.take();

    assert_eq!(game.make_move(o.id(), 4), Err(MoveRejection::CellTaken));
    assert_eq!(game.board().get(4), Some(Mark::X));
    assert_eq!(game.turn(), Mark::O);
    assert_eq!(o.sink.take(), vec![incorrect_move(MoveRejection::CellTaken)]);
    assert!(x.sink.take().is_empty());
}

#[test]
fn test_unseated_player_is_rejected() {
    let (mut game, _x, _o) = started_game();
    assert_eq!(game.make_move(999, 0), Err(MoveRejection::NotSeated));
}

#[test]
fn test_top_row_win() {
    let (mut game, x, o) = started_game();

    for (seat, cell) in [(&x, 0), (&o, 3), (&x, 1), (&o, 4)] {
        game.make_move(seat.id(), cell).unwrap();
    }
    let result = game.make_move(x.id(), 2).unwrap();

    let expected = GameResult::win([0, 1, 2], Mark::X);
    assert_eq!(result, expected);
    assert_eq!(check_grid(game.board(), Mark::X), expected);
    assert_eq!(game.status(), GameStatus::Finished);

    let events = o.sink.take();
    assert_eq!(
        &events[events.len() - 2..],
        &[
            PlayerMoved::new(Mark::X, 2).into(),
            StatusChanged::finished(expected).into(),
        ]
    );

    assert_eq!(game.make_move(o.id(), 8), Err(MoveRejection::GameOver));
}

#[test]
fn test_draw_finishes_game() {
    let (mut game, x, o) = started_game();

    // X O X / X O O / O X X
    let moves = [
        (&x, 0),
        (&o, 1),
        (&x, 2),
        (&o, 4),
        (&x, 3),
        (&o, 5),
        (&x, 7),
        (&o, 6),
        (&x, 8),
    ];
    for (seat, cell) in moves {
        game.make_move(seat.id(), cell).unwrap();
    }

    assert_eq!(game.status(), GameStatus::Finished);
    let finished = statuses(&x.sink.take());
    assert_eq!(finished, vec![StatusChanged::finished(GameResult::draw())]);
}

#[test]
fn test_disconnect_during_play_aborts() {
    let (mut game, x, o) = started_game();

    assert!(game.player_disconnected(x.id()));
    assert_eq!(game.status(), GameStatus::Aborted);
    assert_eq!(game.players().len(), 1);

    let name = x.player.name().to_string();
    assert_eq!(
        o.sink.take(),
        vec![
            PlayerLeft::new(name.clone()).into(),
            StatusChanged::aborted(GameAborted::new(AbortReason::PlayerDisconnected, name)).into(),
        ]
    );
    assert!(x.sink.take().is_empty());

    assert_eq!(game.make_move(o.id(), 0), Err(MoveRejection::GameOver));
}

#[test]
fn test_disconnect_while_waiting_does_not_abort() {
    let factory = GameFactory::new();
    let mut game = Game::new(1);
    let ann = Seat::new(&factory, "ann");
    game.add_player(ann.player.clone());

    assert!(game.player_disconnected(ann.id()));
    assert_eq!(game.status(), GameStatus::WaitingForSecondPlayer);
    assert!(game.players().is_empty());
    assert!(!game.player_disconnected(ann.id()));
}

#[test]
fn test_disconnect_after_finish_keeps_result() {
    let (mut game, x, o) = started_game();
    for (seat, cell) in [(&x, 0), (&o, 3), (&x, 1), (&o, 4), (&x, 2)] {
        game.make_move(seat.id(), cell).unwrap();
    }
    o.sink.take();

    game.player_disconnected(x.id());
    assert_eq!(game.status(), GameStatus::Finished);
    assert_eq!(
        o.sink.take(),
        vec![PlayerLeft::new(x.player.name()).into()]
    );
}

#[test]
fn test_chat_reaches_both_players_in_any_status() {
    let (mut game, x, o) = started_game();
    game.player_disconnected(o.id());
    x.sink.take();

    assert!(game.chat_message(x.id(), "anyone?"));
    assert_eq!(
        x.sink.take(),
        vec![ChatBroadcast::new(x.player.name(), "anyone?").into()]
    );
    assert!(!game.chat_message(o.id(), "hello"));
}
