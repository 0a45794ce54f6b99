use serde_json::json;
use shared::domain::{Colour, Disc, GameKind};

use super::*;
use crate::{
    fixtures::{chess_reply, connect_four_reply, opening_pieces, opening_reply},
    game::{Chess, ConnectFour},
    transport::Method,
};

fn started_chess() -> Session<Chess> {
    let mut session = Session::<Chess>::new();
    session.begin_new_game().expect("new game");
    let applied = session.apply_reply(Ok(opening_reply()));
    assert_eq!(applied.outcome, Outcome::Accepted);
    assert!(applied.follow_up.is_none());
    session
}

fn submit(session: &mut Session<Chess>, from: usize, to: usize) -> EngineRequest {
    match session.click(from).expect("click origin") {
        ClickOutcome::Selected { origin } => assert_eq!(origin, from),
        other => panic!("unexpected origin click: {other:?}"),
    }
    match session.click(to).expect("click destination") {
        ClickOutcome::Submit(request) => request,
        other => panic!("unexpected destination click: {other:?}"),
    }
}

fn after_pawn_push() -> Vec<(usize, &'static str, Colour)> {
    vec![
        (4, "k", Colour::White),
        (28, "p", Colour::White),
        (52, "p", Colour::Black),
        (60, "k", Colour::Black),
    ]
}

fn refused() -> TransportError {
    TransportError::Unavailable("connection refused".into())
}

#[test]
fn fresh_session_is_idle_and_ignores_clicks() {
    let mut session = Session::<Chess>::new();
    assert_eq!(session.mode(), Mode::Idle);
    assert_eq!(session.human_side(), Colour::White);
    assert!(session.board().is_empty());
    assert!(matches!(
        session.click(12).expect("click"),
        ClickOutcome::Ignored(IgnoreReason::NoActiveGame)
    ));
}

#[test]
fn new_game_posts_player_flag_and_awaits_selection() {
    let mut session = Session::<Chess>::new();
    let request = session.begin_new_game().expect("new game");
    assert_eq!(request.kind, RequestKind::NewGame);
    assert_eq!(request.method(), Method::Post);
    assert_eq!(request.path(), "chess/newGame");
    assert_eq!(request.body, Some(json!({"player": true})));
    assert!(session.is_pending());

    session.apply_reply(Ok(opening_reply()));
    assert_eq!(session.mode(), Mode::AwaitingSelection);
    assert_eq!(session.turn(), Some(Colour::White));
    assert_eq!(session.position_code(), Some("fen-0"));
    assert!(!session.is_pending());
}

#[test]
fn human_playing_second_sends_false_player_flag() {
    let mut session = Session::<Chess>::new();
    session.set_human_side(Colour::Black).expect("set side");
    let request = session.begin_new_game().expect("new game");
    assert_eq!(request.body, Some(json!({"player": false})));
}

#[test]
fn selecting_same_origin_twice_cancels_without_request() {
    let mut session = started_chess();
    assert!(matches!(
        session.click(12).expect("click"),
        ClickOutcome::Selected { origin: 12 }
    ));
    assert_eq!(session.mode(), Mode::AwaitingDestination);
    assert_eq!(session.selection(), Some(12));

    assert!(matches!(session.click(12).expect("click"), ClickOutcome::Cancelled));
    assert_eq!(session.mode(), Mode::AwaitingSelection);
    assert_eq!(session.selection(), None);
    assert!(!session.is_pending());
}

#[test]
fn only_pieces_of_side_to_move_can_be_picked() {
    let mut session = started_chess();
    assert!(matches!(
        session.click(52).expect("click"),
        ClickOutcome::Ignored(IgnoreReason::NotSelectable)
    ));
    assert!(matches!(
        session.click(20).expect("click"),
        ClickOutcome::Ignored(IgnoreReason::NotSelectable)
    ));
    assert!(matches!(
        session.click(64).expect("click"),
        ClickOutcome::Ignored(IgnoreReason::OutsideBoard)
    ));
    assert!(session.is_clickable(12));
    assert!(!session.is_clickable(52));
    assert_eq!(session.mode(), Mode::AwaitingSelection);
}

#[test]
fn clicking_another_own_piece_moves_the_selection() {
    let mut session = started_chess();
    session.click(12).expect("click");
    assert!(matches!(
        session.click(4).expect("click"),
        ClickOutcome::Reselected { origin: 4 }
    ));
    assert_eq!(session.selection(), Some(4));
    assert!(!session.is_pending());
}

#[test]
fn completing_click_submits_move_and_blocks_further_input() {
    let mut session = started_chess();
    let request = submit(&mut session, 12, 28);
    assert_eq!(request.kind, RequestKind::HumanMove);
    assert_eq!(request.path(), "chess/makeMove");
    assert_eq!(request.body, Some(json!({"start_pos": 12, "end_pos": 28})));
    assert!(session.is_pending());
    assert_eq!(session.highlighted_origin(), Some(12));

    assert!(matches!(
        session.click(28).expect("click"),
        ClickOutcome::Ignored(IgnoreReason::RequestInFlight)
    ));
    assert!(!session.is_clickable(12));
    assert!(matches!(
        session.begin_new_game(),
        Err(SessionError::RequestInFlight)
    ));
    assert!(matches!(
        session.set_two_player(true),
        Err(SessionError::RequestInFlight)
    ));
}

#[test]
fn accepted_human_move_chains_exactly_one_engine_move() {
    let mut session = started_chess();
    submit(&mut session, 12, 28);

    let applied = session.apply_reply(Ok(chess_reply(&after_pawn_push(), Colour::Black, "fen-1")));
    assert_eq!(applied.outcome, Outcome::Accepted);
    let follow_up = applied.follow_up.expect("engine move requested");
    assert_eq!(follow_up.kind, RequestKind::AiMove);
    assert_eq!(follow_up.method(), Method::Get);
    assert_eq!(follow_up.path(), "chess/makeMoveAi");
    // Already pending: no idle frame between the two requests.
    assert!(session.is_pending());
    assert_eq!(session.turn(), Some(Colour::Black));

    let mut after_reply = after_pawn_push();
    after_reply[2] = (44, "p", Colour::Black);
    let applied = session.apply_reply(Ok(chess_reply(&after_reply, Colour::White, "fen-2")));
    assert_eq!(applied.outcome, Outcome::Accepted);
    assert!(applied.follow_up.is_none());
    assert_eq!(session.mode(), Mode::AwaitingSelection);
    assert_eq!(session.selection(), None);
    assert_eq!(session.turn(), Some(Colour::White));
    assert_eq!(session.position_code(), Some("fen-2"));
}

#[test]
fn two_player_mode_never_chains() {
    let mut session = Session::<Chess>::new();
    session.set_two_player(true).expect("two player");
    session.begin_new_game().expect("new game");
    session.apply_reply(Ok(opening_reply()));
    submit(&mut session, 12, 28);

    let applied = session.apply_reply(Ok(chess_reply(&after_pawn_push(), Colour::Black, "fen-1")));
    assert!(applied.follow_up.is_none());
    assert_eq!(session.mode(), Mode::AwaitingSelection);
    assert!(session.is_clickable(52));
}

#[test]
fn accepted_reply_replaces_the_whole_board() {
    let mut session = started_chess();
    submit(&mut session, 12, 28);
    session.apply_reply(Ok(chess_reply(&after_pawn_push(), Colour::Black, "fen-1")));

    let board = session.board();
    assert!(board.square(12).expect("e2").piece.is_none());
    assert_eq!(board.square(28).and_then(|sq| sq.piece.as_deref()), Some("p"));
    assert_eq!(board.squares().count(), 64);
}

#[test]
fn illegal_move_returns_to_selection_and_keeps_board() {
    let mut session = started_chess();
    let before = session.board().clone();
    submit(&mut session, 12, 44);

    let applied = session.apply_reply(Ok(json!({"error": "illegal move"})));
    assert_eq!(
        applied.outcome,
        Outcome::Rejected {
            error: "illegal move".into()
        }
    );
    assert!(applied.follow_up.is_none());
    assert_eq!(session.mode(), Mode::AwaitingSelection);
    assert_eq!(session.selection(), None);
    assert_eq!(session.error_message(), Some("illegal move"));
    assert_eq!(session.board(), &before);
    assert_eq!(session.turn(), Some(Colour::White));
}

#[test]
fn error_clears_after_next_accepted_reply() {
    let mut session = started_chess();
    submit(&mut session, 12, 44);
    session.apply_reply(Ok(json!({"error": "illegal move"})));
    assert!(session.error_message().is_some());

    submit(&mut session, 12, 28);
    session.apply_reply(Ok(chess_reply(&after_pawn_push(), Colour::Black, "fen-1")));
    assert_eq!(session.error_message(), None);
}

#[test]
fn end_reply_freezes_the_game_without_engine_move() {
    let mut session = started_chess();
    submit(&mut session, 12, 28);

    let mut reply = chess_reply(&after_pawn_push(), Colour::Black, "fen-1");
    reply["end"] = json!("Checkmate");
    let applied = session.apply_reply(Ok(reply));
    assert_eq!(
        applied.outcome,
        Outcome::Ended {
            message: "Checkmate".into()
        }
    );
    assert!(applied.follow_up.is_none());
    assert_eq!(session.mode(), Mode::End);
    assert_eq!(session.status_message(), Some("Checkmate"));
    assert_eq!(session.selection(), None);
    assert_eq!(session.error_message(), None);
    assert!(session.board().square(12).expect("e2").piece.is_none());

    assert!(matches!(
        session.click(52).expect("click"),
        ClickOutcome::Ignored(IgnoreReason::GameOver)
    ));
    assert!(matches!(session.begin_ai_move(), Err(SessionError::GameOver)));
    assert!(session.begin_new_game().is_ok());
}

#[test]
fn end_reply_without_board_keeps_last_board() {
    let mut session = started_chess();
    let before = session.board().clone();
    submit(&mut session, 12, 28);
    session.apply_reply(Ok(json!({"end": "Draw by stalemate"})));
    assert_eq!(session.status_message(), Some("Draw by stalemate"));
    assert_eq!(session.board(), &before);
}

#[test]
fn transport_failure_on_move_restores_selection_for_retry() {
    let mut session = started_chess();
    let before = session.board().clone();
    submit(&mut session, 12, 28);

    let applied = session.apply_reply(Err(refused()));
    assert_eq!(applied.outcome, Outcome::TransportFailed);
    assert!(!session.is_pending());
    assert_eq!(session.mode(), Mode::AwaitingDestination);
    assert_eq!(session.selection(), Some(12));
    assert_eq!(session.error_message(), Some(MOVE_FAILED_MESSAGE));
    assert_eq!(session.board(), &before);

    assert!(matches!(
        session.click(28).expect("retry"),
        ClickOutcome::Submit(_)
    ));
}

#[test]
fn unparsable_reply_counts_as_transport_failure() {
    let mut session = started_chess();
    submit(&mut session, 12, 28);
    let applied = session.apply_reply(Ok(json!({"board": "not a board", "turn": "white"})));
    assert_eq!(applied.outcome, Outcome::TransportFailed);
    assert_eq!(session.error_message(), Some(MOVE_FAILED_MESSAGE));

    session.click(28).expect("retry");
    let applied = session.apply_reply(Ok(json!({"turn": "purple"})));
    assert_eq!(applied.outcome, Outcome::TransportFailed);
}

#[test]
fn engine_move_failure_leaves_game_resumable() {
    let mut session = started_chess();
    submit(&mut session, 12, 28);
    let applied = session.apply_reply(Ok(chess_reply(&after_pawn_push(), Colour::Black, "fen-1")));
    assert!(applied.follow_up.is_some());

    let applied = session.apply_reply(Err(TransportError::Timeout(std::time::Duration::from_secs(30))));
    assert_eq!(applied.outcome, Outcome::TransportFailed);
    assert!(!session.is_pending());
    assert_eq!(session.mode(), Mode::AwaitingSelection);
    assert_eq!(session.error_message(), Some(SERVER_UNREACHABLE_MESSAGE));

    let retry = session.begin_ai_move().expect("retry engine move");
    assert_eq!(retry.kind, RequestKind::AiMove);
    assert!(session.is_pending());
}

#[test]
fn engine_move_request_is_refused_when_not_applicable() {
    let mut idle = Session::<Chess>::new();
    assert!(matches!(idle.begin_ai_move(), Err(SessionError::NoActiveGame)));

    let mut session = started_chess();
    assert!(matches!(session.begin_ai_move(), Err(SessionError::NotEngineTurn)));

    session.set_two_player(true).expect("two player");
    assert!(matches!(session.begin_ai_move(), Err(SessionError::TwoPlayer)));
}

#[test]
fn rejected_load_keeps_current_game() {
    let mut session = started_chess();
    let before = session.board().clone();
    let request = session
        .begin_load_game(Some("not-a-fen".into()))
        .expect("load");
    assert_eq!(request.path(), "chess/loadGame");
    assert_eq!(request.body, Some(json!({"state": "not-a-fen"})));

    session.apply_reply(Ok(json!({"error": "Invalid FEN"})));
    assert_eq!(session.mode(), Mode::AwaitingSelection);
    assert_eq!(session.error_message(), Some("Invalid FEN"));
    assert_eq!(session.board(), &before);

    let mut idle = Session::<Chess>::new();
    idle.begin_load_game(None).expect("load");
    idle.apply_reply(Ok(json!({"error": "Invalid FEN"})));
    assert_eq!(idle.mode(), Mode::Idle);
}

#[test]
fn load_without_state_resyncs_current_game() {
    let mut session = Session::<Chess>::new();
    let request = session.begin_load_game(None).expect("load");
    assert_eq!(request.body, Some(json!({})));
    session.apply_reply(Ok(chess_reply(&opening_pieces(), Colour::Black, "fen-9")));
    assert_eq!(session.mode(), Mode::AwaitingSelection);
    assert_eq!(session.turn(), Some(Colour::Black));
}

#[test]
fn load_of_finished_game_enters_end() {
    let mut session = Session::<Chess>::new();
    session.begin_load_game(Some("mate-fen".into())).expect("load");
    let mut reply = opening_reply();
    reply["end"] = json!("Checkmate: Black wins!");
    session.apply_reply(Ok(reply));
    assert_eq!(session.mode(), Mode::End);
    assert_eq!(session.status_message(), Some("Checkmate: Black wins!"));
}

#[test]
fn reply_with_nothing_in_flight_is_stale() {
    let mut session = started_chess();
    let applied = session.apply_reply(Ok(opening_reply()));
    assert_eq!(applied.outcome, Outcome::Stale);
    assert_eq!(session.mode(), Mode::AwaitingSelection);
}

#[test]
fn alternating_two_player_turns_always_settle_in_selection() {
    let mut session = Session::<Chess>::new();
    session.set_two_player(true).expect("two player");
    session.begin_new_game().expect("new game");
    session.apply_reply(Ok(opening_reply()));

    let mut pieces = opening_pieces();
    let moves = [(12, 20, 1), (52, 44, 2), (4, 5, 0), (60, 59, 3)];
    for (turn_no, (from, to, slot)) in moves.into_iter().enumerate() {
        submit(&mut session, from, to);
        pieces[slot].0 = to;
        let next = if turn_no % 2 == 0 {
            Colour::Black
        } else {
            Colour::White
        };
        let applied = session.apply_reply(Ok(chess_reply(&pieces, next, "fen")));
        assert!(applied.follow_up.is_none());
        assert_eq!(session.mode(), Mode::AwaitingSelection);
        assert_eq!(session.selection(), None);
        assert_eq!(session.turn(), Some(next));
    }
}

#[test]
fn connect_four_slot_click_submits_its_column() {
    let mut session = Session::<ConnectFour>::new();
    let request = session.begin_new_game().expect("new game");
    assert_eq!(request.path(), "connect4/newGame");
    session.apply_reply(Ok(connect_four_reply(&[], Disc::Red, "")));
    assert!(session.is_clickable(38));

    match session.click(38).expect("click") {
        ClickOutcome::Submit(request) => {
            assert_eq!(request.path(), "connect4/makeMove");
            assert_eq!(request.body, Some(json!({"move": 3})));
        }
        other => panic!("unexpected click: {other:?}"),
    }
    assert_eq!(session.selection(), None);

    let applied = session.apply_reply(Ok(connect_four_reply(&[(3, Disc::Red)], Disc::Yellow, "d")));
    assert!(applied.follow_up.is_some());
    let applied = session.apply_reply(Ok(connect_four_reply(
        &[(3, Disc::Red), (4, Disc::Yellow)],
        Disc::Red,
        "de",
    )));
    assert!(applied.follow_up.is_none());
    assert_eq!(session.mode(), Mode::AwaitingSelection);
}

#[test]
fn connect_four_transport_failure_returns_to_slot_choice() {
    let mut session = Session::<ConnectFour>::new();
    session.begin_new_game().expect("new game");
    session.apply_reply(Ok(connect_four_reply(&[], Disc::Red, "")));
    session.click(0).expect("click");
    session.apply_reply(Err(refused()));
    assert_eq!(session.mode(), Mode::AwaitingSelection);
    assert_eq!(session.error_message(), Some(MOVE_FAILED_MESSAGE));
}

#[test]
fn connect_four_win_ends_game() {
    let mut session = Session::<ConnectFour>::new();
    session.begin_new_game().expect("new game");
    session.apply_reply(Ok(connect_four_reply(&[], Disc::Red, "")));
    session.click(6).expect("click");
    let mut reply = connect_four_reply(&[(6, Disc::Red)], Disc::Yellow, "g");
    reply["end"] = json!("Game over: Red wins!");
    let applied = session.apply_reply(Ok(reply));
    assert!(applied.follow_up.is_none());
    assert_eq!(session.status_message(), Some("Game over: Red wins!"));
}

#[test]
fn toggles_are_refused_while_a_request_is_in_flight() {
    let mut session = Session::<Chess>::new();
    session.begin_new_game().expect("new game");
    assert!(matches!(
        session.set_human_side(Colour::Black),
        Err(SessionError::RequestInFlight)
    ));
    assert!(matches!(
        session.set_two_player(true),
        Err(SessionError::RequestInFlight)
    ));
    session.apply_reply(Ok(opening_reply()));

    submit(&mut session, 12, 28);
    assert!(matches!(
        session.set_human_side(Colour::Black),
        Err(SessionError::RequestInFlight)
    ));
    let applied = session.apply_reply(Ok(chess_reply(&after_pawn_push(), Colour::Black, "fen-1")));
    assert!(applied.follow_up.is_some());
    assert!(matches!(
        session.set_two_player(true),
        Err(SessionError::RequestInFlight)
    ));
    assert_eq!(session.human_side(), Colour::White);
    assert!(!session.is_two_player());
}

#[test]
fn side_change_mid_game_waits_for_the_next_game() {
    let mut session = started_chess();
    session.set_human_side(Colour::Black).expect("set side");
    assert_eq!(session.human_side(), Colour::Black);
    assert_eq!(session.playing_side(), Colour::White);

    submit(&mut session, 12, 28);
    let applied = session.apply_reply(Ok(chess_reply(&after_pawn_push(), Colour::Black, "fen-1")));
    assert_eq!(applied.outcome, Outcome::Accepted);
    let follow_up = applied.follow_up.expect("engine still answers for black");
    assert_eq!(follow_up.kind, RequestKind::AiMove);

    let mut after_reply = after_pawn_push();
    after_reply[2] = (44, "p", Colour::Black);
    session.apply_reply(Ok(chess_reply(&after_reply, Colour::White, "fen-2")));
    assert_eq!(session.mode(), Mode::AwaitingSelection);
    assert!(session.is_clickable(28));

    let request = session.begin_new_game().expect("new game");
    assert_eq!(request.body, Some(json!({"player": false})));
    session.apply_reply(Ok(opening_reply()));
    assert_eq!(session.playing_side(), Colour::Black);
    let engine_first = session.begin_ai_move().expect("engine opens for white");
    assert_eq!(engine_first.kind, RequestKind::AiMove);
}

#[test]
fn two_player_toggle_applies_to_the_next_human_move() {
    let mut session = started_chess();
    session.set_two_player(true).expect("two player on");
    submit(&mut session, 12, 28);
    let applied = session.apply_reply(Ok(chess_reply(&after_pawn_push(), Colour::Black, "fen-1")));
    assert!(applied.follow_up.is_none());
    assert!(session.is_clickable(52));

    session.set_two_player(false).expect("two player off");
    let retry = session.begin_ai_move().expect("engine takes over black");
    assert_eq!(retry.kind, RequestKind::AiMove);
}

#[test]
fn connect_four_refuses_load_locally() {
    let mut session = Session::<ConnectFour>::new();
    session.begin_new_game().expect("new game");
    session.apply_reply(Ok(connect_four_reply(&[], Disc::Red, "")));
    assert!(matches!(
        session.begin_load_game(Some("d".into())),
        Err(SessionError::LoadUnsupported(GameKind::ConnectFour))
    ));
    assert_eq!(session.mode(), Mode::AwaitingSelection);
    assert!(!session.is_pending());
}
