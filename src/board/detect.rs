/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use arrayvec::ArrayVec;

use super::{Board, CheckStatus, Color, Position, Square};

/// Works out whether `color`'s king is in check, mated, or stalemated on `position`.
///
/// Mate is only looked for when the king is in check, and stalemate only when it is not.
/// Both are exhaustive searches built on [`Position::can_move`], so `position` is left exactly as it was.
///
/// # Example
/// ```
/// # use rookery::*;
/// let mut position = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
/// assert_eq!(detect::status(&mut position, Color::Black), CheckStatus::Stalemate);
/// ```
pub fn status(position: &mut Position, color: Color) -> CheckStatus {
    if is_check(position.board(), color) {
        if is_checkmate(position, color) {
            CheckStatus::Mate
        } else {
            CheckStatus::Check
        }
    } else if has_legal_move(position, color) {
        CheckStatus::Clear
    } else {
        CheckStatus::Stalemate
    }
}

/// Returns `true` if any enemy piece has an uncollided attack on `color`'s king.
#[inline(always)]
pub fn is_check(board: &Board, color: Color) -> bool {
    board.is_attacked(board.king_square(color), color.opponent())
}

/// Returns `true` if `color`, already in check, has no way out.
///
/// The only ways out are a king step, a capture of a checking piece, or a block on a checking piece's path.
/// A checking pawn that just double-stepped may also be taken en passant, landing behind it.
fn is_checkmate(position: &mut Position, color: Color) -> bool {
    let king = position.board().king_square(color);
    let enemy = color.opponent();

    let escapes = (-1..=1)
        .flat_map(|df| (-1..=1).map(move |dr| (df, dr)))
        .filter_map(|(df, dr)| king.offset(df, dr));
    for escape in escapes {
        if position.can_move(king, escape) {
            return false;
        }
    }

    let mut targets: ArrayVec<Square, { Square::COUNT }> = ArrayVec::new();
    for attacker in position.board().attackers(king, enemy) {
        let Some(piece) = position.board().piece_at(attacker).copied() else {
            continue;
        };

        targets.push(attacker);
        targets.extend(piece.traversed(attacker, king));
        if piece.double_stepped() {
            if let Some(behind) = attacker.backward(enemy) {
                targets.push(behind);
            }
        }
    }

    for defender in position.board().squares_of(color) {
        if defender == king {
            continue;
        }
        if targets.iter().any(|&target| position.can_move(defender, target)) {
            return false;
        }
    }

    true
}

/// Returns `true` if any piece of `color` can legally move anywhere.
pub fn has_legal_move(position: &mut Position, color: Color) -> bool {
    for src in position.board().squares_of(color) {
        if Square::iter().any(|dst| position.can_move(src, dst)) {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(fen: &str, color: Color) -> CheckStatus {
        let mut position = Position::from_fen(fen).unwrap();
        status(&mut position, color)
    }

    #[test]
    fn test_start_is_clear() {
        let mut position = Position::default();
        assert_eq!(status(&mut position, Color::White), CheckStatus::Clear);
        assert_eq!(status(&mut position, Color::Black), CheckStatus::Clear);
    }

    #[test]
    fn test_back_rank_mate() {
        assert_eq!(status_of("3R2k1/5ppp/8/8/8/8/8/6K1 b - - 0 1", Color::Black), CheckStatus::Mate);
        // The rook on e2 can block on e8
        assert_eq!(
            status_of("3R2k1/5ppp/8/8/8/8/4r3/6K1 b - - 0 1", Color::Black),
            CheckStatus::Check
        );
    }

    #[test]
    fn test_knight_checks() {
        // Smothered: nothing can reach the knight on f7
        assert_eq!(status_of("6rk/5Npp/8/8/8/8/8/6K1 b - - 0 1", Color::Black), CheckStatus::Mate);
        // The bishop on e8 can take it
        assert_eq!(status_of("4b1rk/5Npp/8/8/8/8/8/6K1 b - - 0 1", Color::Black), CheckStatus::Check);
    }

    #[test]
    fn test_en_passant_escapes_pawn_check() {
        // The pawn on d4 just double-stepped to give check; taking it en passant is the only reply
        let fen = "3R4/8/R7/4k3/3Pp3/2P5/8/K4R2 b - d3 0 1";
        assert_eq!(status_of(fen, Color::Black), CheckStatus::Check);

        let fen = "3R4/8/R7/4k3/3Pp3/2P5/8/K4R2 b - - 0 1";
        assert_eq!(status_of(fen, Color::Black), CheckStatus::Mate);
    }

    #[test]
    fn test_stalemate() {
        assert_eq!(status_of("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", Color::Black), CheckStatus::Stalemate);
        assert_eq!(status_of("7k/8/4Q3/8/8/8/8/6K1 b - - 0 1", Color::Black), CheckStatus::Clear);
    }

    #[test]
    fn test_detection_leaves_position_untouched() {
        let mut position = Position::from_fen("3R2k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
        let before = position.clone();
        status(&mut position, Color::Black);
        assert_eq!(position, before);
    }
}
