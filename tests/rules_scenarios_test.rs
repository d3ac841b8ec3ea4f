//! Rule scenarios played through the session entry point.

use cardtoe::{
    Blank, Cell, Color, ColorSlot, Mode, MoveError, MoveOutcome, Outcome, Phase, Placement,
    RankSlot, Session, Snapshot, check_automatic_draw,
};

fn active(first: Color) -> Session {
    let mut session = Session::new(Mode::Local);
    session.start(first);
    session
}

#[test]
fn test_scenario_a_place_on_empty_cell() {
    let mut session = active(Color::Green);
    let outcome = session.submit_move(5, "green-3-1").unwrap();
    assert_eq!(
        outcome,
        MoveOutcome::Continue {
            next: Color::Red,
            placement: Some(Placement::Placed)
        }
    );
    assert_eq!(
        session.board().get(5),
        Some(Cell::Occupied { rank: 3, owner: Color::Green })
    );
    assert_eq!(session.board().locked().count(), 0);
    assert_eq!(session.current_turn(), Color::Red);
}

#[test]
fn test_scenario_b_overwrite_needs_higher_rank() {
    let mut session = active(Color::Green);
    session.submit_move(5, "green-3-1").unwrap();

    let before = session.clone();
    assert_eq!(
        session.submit_move(5, "red-2-1"),
        Err(MoveError::RankTooLow { rank: 2, occupant: 3 })
    );
    assert_eq!(session, before);

    session.submit_move(5, "red-4-1").unwrap();
    assert_eq!(
        session.board().get(5),
        Some(Cell::Occupied { rank: 4, owner: Color::Red })
    );
    assert!(session.board().is_locked(5));
}

#[test]
fn test_scenario_c_locked_cell_refuses_any_rank() {
    let mut session = active(Color::Green);
    session.submit_move(5, "green-3-1").unwrap();
    session.submit_move(5, "red-4-1").unwrap();
    assert_eq!(session.submit_move(5, "green-5-1"), Err(MoveError::CellLocked(5)));
    assert_eq!(session.current_turn(), Color::Green);
}

#[test]
fn test_scenario_d_line_ends_game() {
    let mut session = active(Color::Green);
    for (index, card) in [
        (0, "green-1-1"),
        (4, "red-1-1"),
        (1, "green-1-2"),
        (5, "red-1-2"),
        (2, "green-2-1"),
        (6, "red-2-1"),
    ] {
        assert!(matches!(
            session.submit_move(index, card),
            Ok(MoveOutcome::Continue { .. })
        ));
    }
    let outcome = session.submit_move(3, "green-2-2").unwrap();
    assert_eq!(outcome, MoveOutcome::Ended(Outcome::Win { winner: Color::Green }));
    assert_eq!(session.phase(), Phase::Ended);
    assert_eq!(session.scores().green, 1);

    assert_eq!(session.submit_move(7, "red-2-2"), Err(MoveError::GameNotActive));
    assert_eq!(session.scores().total(), 1);
}

/// G G R R / R R G G / G G R R / R R G _ with every card spent except
/// `green-2-1`.
fn nearly_exhausted() -> Session {
    let mut snapshot = Snapshot::capture(&active(Color::Green));
    for i in 0..15 {
        let (row, col) = (i / 4, i % 4);
        let owner = if (row % 2 == 0) == (col < 2) { Color::Green } else { Color::Red };
        snapshot.board[i] = RankSlot::Rank(1);
        snapshot.stored_cell_colors[i] = ColorSlot::Color(owner);
    }
    snapshot.board[15] = RankSlot::Blank(Blank::Empty);
    if let Some(decks) = snapshot.player_decks.as_mut() {
        for card in decks.green.cards().to_vec() {
            if card.id != "green-2-1" {
                decks.green.mark_used(&card.id);
            }
        }
        for card in decks.red.cards().to_vec() {
            decks.red.mark_used(&card.id);
        }
    }
    snapshot.restore(Mode::Local, None).unwrap()
}

#[test]
fn test_scenario_e_automatic_draw_with_empty_cells() {
    let mut session = nearly_exhausted();
    assert!(!check_automatic_draw(session.board(), session.decks()));

    let outcome = session.submit_move(2, "green-2-1").unwrap();
    assert_eq!(outcome, MoveOutcome::Ended(Outcome::Draw { automatic: true }));
    assert!(session.board().is_empty(15));
    assert!(check_automatic_draw(session.board(), session.decks()));
    assert_eq!(session.scores().draws, 1);
}

#[test]
fn test_filling_last_cell_is_plain_draw() {
    let mut session = nearly_exhausted();
    let outcome = session.submit_move(15, "green-2-1").unwrap();
    assert_eq!(outcome, MoveOutcome::Ended(Outcome::Draw { automatic: false }));
    assert!(session.board().is_full());
}

#[test]
fn test_rejections_name_the_rule() {
    let mut session = active(Color::Red);
    assert_eq!(session.submit_move(16, "red-1-1"), Err(MoveError::OutOfBounds(16)));
    assert_eq!(
        session.submit_move(0, "purple-1-1"),
        Err(MoveError::UnknownCard("purple-1-1".to_string()))
    );
    assert!(matches!(
        session.submit_move(0, "green-1-1"),
        Err(MoveError::WrongColor { card: Color::Green, turn: Color::Red })
    ));
    session.submit_move(0, "red-1-1").unwrap();
    session.submit_move(1, "green-1-1").unwrap();
    assert_eq!(
        session.submit_move(2, "red-1-1"),
        Err(MoveError::CardAlreadyUsed("red-1-1".to_string()))
    );
    assert_eq!(session.submit_move(0, "red-5-1"), Err(MoveError::OwnCell(0)));
}
