/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use rookery::{
    pgn, CastleOutcome, CastleSide, CheckStatus, Color, Game, GameResult, MoveError, Piece,
    PieceKind, ReplayError, SanError, Square, PLACEMENT_STARTPOS,
};

fn sans(game: &Game) -> Vec<&str> {
    game.history().sans().collect()
}

#[test]
fn test_first_pawn_move() {
    let mut game = Game::new();
    let record = game.commit_move(Square::E2, Square::E4, None).unwrap();

    assert_eq!(record.san(), "e4");
    assert_eq!(record.placement(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR");
    assert_eq!((record.from(), record.to()), (Square::E2, Square::E4));

    let white = game.position().king_state(Color::White);
    assert!(white.kingside && white.queenside);
    let black = game.position().king_state(Color::Black);
    assert!(black.kingside && black.queenside);
}

#[test]
fn test_opening_without_disambiguation() {
    let mut game = Game::new();
    game.replay(["e4", "e5", "Nf3", "Nc6", "Bb5"]).unwrap();
    assert_eq!(sans(&game), ["e4", "e5", "Nf3", "Nc6", "Bb5"]);
    assert_eq!(game.side_to_move(), Color::Black);
}

#[test]
fn test_fools_mate() {
    let mut game = Game::new();
    for (from, to) in [
        (Square::F2, Square::F3),
        (Square::E7, Square::E5),
        (Square::G2, Square::G4),
        (Square::D8, Square::H4),
    ] {
        game.commit_move(from, to, None).unwrap();
    }

    assert_eq!(game.history().records().last().unwrap().san(), "Qh4#");
    assert!(game.is_game_over());
    assert_eq!(game.result(), Some(GameResult::BlackWins));
    assert_eq!(game.position().status(Color::White), CheckStatus::Mate);
    assert!(game.legal_moves().is_empty());

    let mut scratch = game.position().clone();
    assert!(scratch.legal_moves().is_empty());
}

#[test]
fn test_kingside_castle() {
    let mut game = Game::new();
    game.replay(["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5"]).unwrap();

    let record = game.commit_move(Square::E1, Square::G1, None).unwrap();
    assert_eq!(record.san(), "O-O");
    assert_eq!(game.board().piece_at(Square::F1), Some(&Piece::Rook(Color::White)));
    assert!(game.board().is_empty(Square::H1));
    assert_eq!(
        game.position().king_state(Color::White).castle,
        CastleOutcome::from(CastleSide::Kingside)
    );
    assert_eq!(game.position().castling_rights(), "kq");
}

#[test]
fn test_stalemate_is_a_draw() {
    let mut game = Game::from_fen("7k/8/4Q1K1/8/8/8/8/8 w - - 0 1").unwrap();
    let record = game.commit_move(Square::E6, Square::F7, None).unwrap();

    assert_eq!(record.san(), "Qf7");
    assert_eq!(game.position().status(Color::Black), CheckStatus::Stalemate);
    assert_eq!(game.result(), Some(GameResult::Draw));
}

#[test]
fn test_en_passant_window() {
    let mut game = Game::new();
    game.replay(["e4", "a6", "e5", "d5"]).unwrap();

    let record = game.play_san("exd6").unwrap();
    assert_eq!(record.san(), "exd6");
    assert!(game.board().is_empty(Square::D5));
    assert_eq!(game.score(Color::White), 1);

    // One ply late
    game.replay(["e4", "a6", "e5", "d5", "Nf3", "h6"]).unwrap();
    assert!(game.play_san("exd6").is_err());
    assert_eq!(game.history().len(), 6);
}

#[test]
fn test_pins_and_blocked_paths_are_rejected() {
    let mut game = Game::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
    let before = game.position().clone();

    assert_eq!(
        game.commit_move(Square::E2, Square::C3, None),
        Err(MoveError::ExposesKing {
            from: Square::E2,
            to: Square::C3
        })
    );
    assert_eq!(game.position(), &before);
    assert!(game.history().is_empty());
}

#[test]
fn test_san_round_trip() {
    let mut game = Game::new();
    game.replay([
        "d4", "Nf6", "c4", "e6", "Nc3", "Bb4", "Qc2", "O-O", "a3", "Bxc3+", "Qxc3", "d5", "Nf3",
        "dxc4", "Qxc4", "b6", "Bg5", "Ba6", "Qa4", "h6", "Bxf6", "Qxf6", "Qxa6", "Nxa6",
    ])
    .unwrap();

    let played = sans(&game).into_iter().map(String::from).collect::<Vec<_>>();
    let fen = game.position().to_fen();

    let mut copy = Game::new();
    copy.replay(&played).unwrap();
    assert_eq!(sans(&copy), played);
    assert_eq!(copy.position().to_fen(), fen);
}

#[test]
fn test_disambiguated_replay() {
    let mut game = Game::new();
    let err = game.replay(["Nf3", "Nf6", "d3", "d6", "Nd2"]).unwrap_err();
    assert!(matches!(
        err,
        ReplayError::Token {
            index: 4,
            source: SanError::Ambiguous { count: 2, .. },
            ..
        }
    ));
    assert_eq!(game.history().len(), 4);

    game.replay(["Nf3", "Nf6", "d3", "d6", "Nbd2"]).unwrap();
    assert_eq!(game.board().piece_at(Square::D2), Some(&Piece::Knight(Color::White)));
    assert_eq!(game.history().records().last().unwrap().san(), "Nbd2");
}

#[test]
fn test_navigation_and_reset() {
    let mut game = Game::new();
    game.replay(["e4", "e5", "Nf3"]).unwrap();

    assert_eq!(game.first().unwrap().san(), "e4");
    assert_eq!(game.previous().unwrap().san(), "e4");
    assert_eq!(game.next().unwrap().san(), "e5");
    assert_eq!(game.last().unwrap().san(), "Nf3");
    assert_eq!(game.next().unwrap().san(), "Nf3");

    // Navigation never touches the live game
    game.first();
    assert_eq!(game.side_to_move(), Color::Black);
    let shown = game.history().board_at_cursor().unwrap();
    assert_eq!(shown.piece_at(Square::E4), Some(&Piece::new(Color::White, PieceKind::Pawn)));
    assert!(shown.is_empty(Square::E5));

    game.reset();
    assert!(game.history().is_empty());
    assert_eq!(game.board().placement(), PLACEMENT_STARTPOS);
    assert_eq!(game.score(Color::White), 0);
}

#[test]
fn test_king_moves_end_castling() {
    let mut game = Game::new();
    game.replay(["e4", "e5", "Ke2", "Ke7", "Ke1"]).unwrap();

    let white = game.position().king_state(Color::White);
    assert!(!white.kingside && !white.queenside);
    assert!(game.play_san("Nf6").is_ok());
    assert!(game.commit_move(Square::E1, Square::G1, None).is_err());
    assert_eq!(game.position().king_state(Color::White).castle, CastleOutcome::Fail);
}

#[test]
fn test_promotion_by_san() {
    let mut game = Game::from_fen("8/1P4k1/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let record = game.play_san("b8=N").unwrap();
    assert_eq!(record.san(), "b8=N");
    assert_eq!(game.board().piece_at(Square::B8), Some(&Piece::Knight(Color::White)));
}

#[test]
fn test_resignation_and_pgn() {
    let mut game = Game::new();
    game.replay(["e4", "c5"]).unwrap();
    assert_eq!(game.resign(), Ok(GameResult::BlackWins));

    let text = pgn::write_pgn(&game, &pgn::Tags::default());
    assert!(text.contains("[Result \"0-1\"]"));
    assert!(text.ends_with("1. e4 c5 0-1\n"));

    let mut copy = Game::new();
    copy.load_pgn(&text).unwrap();
    assert_eq!(copy.result(), Some(GameResult::BlackWins));
    assert_eq!(sans(&copy), ["e4", "c5"]);
}

#[test]
fn test_capture_marker_must_match_the_board() {
    let mut game = Game::new();
    assert_eq!(
        game.play_san("Nxf3"),
        Err(SanError::CaptureMismatch(String::from("Nxf3")))
    );
    assert!(game.history().is_empty());

    let mut game = Game::from_fen("4k3/8/8/8/4p3/3P4/8/4K3 w - - 0 1").unwrap();
    assert!(game.play_san("e4").is_err());
    assert_eq!(game.board().piece_at(Square::D3), Some(&Piece::new(Color::White, PieceKind::Pawn)));
    assert_eq!(game.play_san("dxe4").unwrap().san(), "dxe4");
}

#[test]
fn test_discovered_check() {
    let mut game = Game::from_fen("4k3/8/8/8/4N3/8/8/4R1K1 w - - 0 1").unwrap();
    let record = game.commit_move(Square::E4, Square::C5, None).unwrap();
    assert_eq!(record.san(), "Nc5+");
    assert_eq!(game.position().status(Color::Black), CheckStatus::Check);
    assert!(!game.is_game_over());
}
