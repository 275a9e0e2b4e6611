/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use arrayvec::ArrayVec;

use super::{Board, CastleSide, Color, File, KingState, Piece, Rank, Square};

/// Squares that must be empty for a move to go through. No path is ever longer than six squares.
pub type Path = ArrayVec<Square, 6>;

/// What kind of move a geometrically legal `src -> dst` is.
///
/// This is returned by [`Piece::is_legal`] so that queries never have to record anything on the piece itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Motion {
    /// Moves to an empty square.
    Step,
    /// Lands on an enemy piece.
    Capture,
    /// A pawn advancing two squares from its starting rank.
    DoubleStep,
    /// A pawn moving diagonally onto an empty square behind an enemy pawn that just double-stepped.
    EnPassant,
    /// A king moving two files along its home rank.
    Castle(CastleSide),
}

impl Motion {
    /// Returns `true` if this motion removes an enemy piece.
    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        matches!(self, Self::Capture | Self::EnPassant)
    }

    /// The square of the piece removed by this motion, if any.
    #[inline(always)]
    pub const fn victim(&self, src: Square, dst: Square) -> Option<Square> {
        match self {
            Self::Capture => Some(dst),
            Self::EnPassant => Some(Square::new(dst.file(), src.rank())),
            _ => None,
        }
    }
}

impl CastleSide {
    /// Squares strictly between `color`'s king and the rook on this side.
    pub fn between(&self, color: Color) -> Path {
        let king = Square::new(File::E, Rank::first(color));
        king.between(self.rook_square(color)).collect()
    }

    /// Squares the king crosses and lands on while castling.
    #[inline(always)]
    pub const fn king_passage(&self, color: Color) -> [Square; 2] {
        let rank = Rank::first(color);
        [
            Square::new(self.rook_destination_file(), rank),
            Square::new(self.king_file(), rank),
        ]
    }
}

impl Piece {
    /// Decides whether moving this piece from `src` to `dst` follows its movement rules on `board`.
    ///
    /// Only geometry and the occupancy of `dst` (and, for en passant, the square beside `src`) are considered.
    /// Paths and king safety are the caller's responsibility, see [`Piece::traversed`].
    ///
    /// # Example
    /// ```
    /// # use rookery::*;
    /// let board = Board::default();
    /// let pawn = *board.piece_at(Square::E2).unwrap();
    /// assert_eq!(pawn.is_legal(&board, Square::E2, Square::E4), Some(Motion::DoubleStep));
    /// assert_eq!(pawn.is_legal(&board, Square::E2, Square::E2), None);
    /// ```
    pub fn is_legal(&self, board: &Board, src: Square, dst: Square) -> Option<Motion> {
        if src == dst {
            return None;
        }

        let color = self.color();
        let landing = match board.piece_at(dst) {
            Some(target) if target.color() == color => return None,
            Some(_) => Motion::Capture,
            None => Motion::Step,
        };

        match self {
            Self::Pawn(..) => pawn_motion(board, color, src, dst),

            Self::King(_, state) => {
                if self.attacks(src, dst) {
                    Some(landing)
                } else {
                    castle_motion(state, color, src, dst)
                }
            }

            _ => self.attacks(src, dst).then_some(landing),
        }
    }

    /// Returns `true` if this piece standing on `src` threatens `dst`, ignoring anything in between.
    ///
    /// Pawns threaten their two forward diagonals whether or not anything stands there, and never threaten by pushing.
    /// Kings threaten adjacent squares only; castling is not an attack.
    pub fn attacks(&self, src: Square, dst: Square) -> bool {
        if src == dst {
            return false;
        }

        let (df, dr) = (src.file_delta(dst), src.rank_delta(dst));
        let (af, ar) = (df.abs(), dr.abs());
        let diagonal = af == ar;
        let straight = (af == 0) != (ar == 0);

        match self {
            Self::Pawn(color, _) => af == 1 && dr == forward(*color),
            Self::Knight(_) => matches!((af, ar), (1, 2) | (2, 1)),
            Self::Bishop(_) => diagonal,
            Self::Rook(_) => straight,
            Self::Queen(_) => diagonal != straight,
            Self::King(..) => af <= 1 && ar <= 1,
        }
    }

    /// Squares strictly between `src` and `dst` that must be empty for this piece to get there.
    ///
    /// Knights and kings jump or step, so their path is always empty. Castling paths are
    /// checked separately, see [`CastleSide::between`].
    pub fn traversed(&self, src: Square, dst: Square) -> Path {
        match self {
            Self::Knight(_) | Self::King(..) => Path::new(),
            Self::Pawn(..) if src.rank_delta(dst).abs() == 2 => src.between(dst).collect(),
            Self::Pawn(..) => Path::new(),
            Self::Bishop(_) | Self::Rook(_) | Self::Queen(_) => src.between(dst).collect(),
        }
    }
}

/// Rank delta of a single pawn push for `color`.
#[inline(always)]
const fn forward(color: Color) -> i8 {
    match color {
        Color::White => 1,
        Color::Black => -1,
    }
}

fn pawn_motion(board: &Board, color: Color, src: Square, dst: Square) -> Option<Motion> {
    let df = src.file_delta(dst);
    let advance = src.rank_delta(dst) * forward(color);
    let target = board.piece_at(dst);

    match (df, advance) {
        (0, 1) if target.is_none() => Some(Motion::Step),

        (0, 2) if target.is_none() && src.rank() == Rank::second(color) => Some(Motion::DoubleStep),

        (-1 | 1, 1) => match target {
            Some(enemy) if enemy.color() != color => Some(Motion::Capture),
            Some(_) => None,
            None => {
                let beside = Square::new(dst.file(), src.rank());
                board
                    .piece_at(beside)
                    .filter(|p| p.color() != color && p.double_stepped())
                    .map(|_| Motion::EnPassant)
            }
        },

        _ => None,
    }
}

fn castle_motion(state: &KingState, color: Color, src: Square, dst: Square) -> Option<Motion> {
    let home = Square::new(File::E, Rank::first(color));
    if src != home || dst.rank() != home.rank() || state.check.is_check() {
        return None;
    }

    let side = match dst.file() {
        File::G => CastleSide::Kingside,
        File::C => CastleSide::Queenside,
        _ => return None,
    };

    state.can_castle(side).then_some(Motion::Castle(side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PieceKind, Position};

    fn board(fen: &str) -> Board {
        Position::from_fen(fen).unwrap().board().clone()
    }

    #[test]
    fn test_same_square_is_never_legal() {
        let board = Board::default();
        for square in Square::iter() {
            if let Some(piece) = board.piece_at(square) {
                assert_eq!(piece.is_legal(&board, square, square), None);
            }
        }
    }

    #[test]
    fn test_slider_geometry() {
        let board = Board::empty();
        let queen = Piece::new(Color::White, PieceKind::Queen);
        let rook = Piece::new(Color::White, PieceKind::Rook);
        let bishop = Piece::new(Color::White, PieceKind::Bishop);

        assert_eq!(queen.is_legal(&board, Square::D1, Square::H5), Some(Motion::Step));
        assert_eq!(queen.is_legal(&board, Square::D1, Square::D8), Some(Motion::Step));
        assert_eq!(queen.is_legal(&board, Square::D1, Square::E3), None);

        assert_eq!(rook.is_legal(&board, Square::A1, Square::H1), Some(Motion::Step));
        assert_eq!(rook.is_legal(&board, Square::A1, Square::B2), None);

        assert_eq!(bishop.is_legal(&board, Square::C6, Square::A4), Some(Motion::Step));
        assert_eq!(bishop.is_legal(&board, Square::C6, Square::C8), None);
    }

    #[test]
    fn test_knight_and_king_geometry() {
        let board = Board::empty();
        let knight = Piece::new(Color::Black, PieceKind::Knight);
        assert!(knight.is_legal(&board, Square::B8, Square::C6).is_some());
        assert!(knight.is_legal(&board, Square::B8, Square::D7).is_some());
        assert!(knight.is_legal(&board, Square::B8, Square::B5).is_none());
        assert!(knight.traversed(Square::B8, Square::C6).is_empty());

        let king = Piece::new(Color::White, PieceKind::King);
        assert_eq!(king.is_legal(&board, Square::E4, Square::D5), Some(Motion::Step));
        assert_eq!(king.is_legal(&board, Square::E4, Square::E6), None);
    }

    #[test]
    fn test_pawn_pushes_need_empty_squares() {
        let board = board("4k3/8/8/8/8/4n3/P3P3/4K3 w - - 0 1");
        let pawn = *board.piece_at(Square::E2).unwrap();
        assert_eq!(pawn.is_legal(&board, Square::E2, Square::E3), None);
        // The blocker sits on the path, not the destination
        assert_eq!(pawn.is_legal(&board, Square::E2, Square::E4), Some(Motion::DoubleStep));
        assert_eq!(pawn.traversed(Square::E2, Square::E4).as_slice(), &[Square::E3]);

        let pawn = *board.piece_at(Square::A2).unwrap();
        assert_eq!(pawn.is_legal(&board, Square::A2, Square::A4), Some(Motion::DoubleStep));
        assert_eq!(pawn.is_legal(&board, Square::A2, Square::B3), None);
    }

    #[test]
    fn test_pawn_captures_and_en_passant() {
        let board = board("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
        let pawn = *board.piece_at(Square::E5).unwrap();
        assert_eq!(pawn.is_legal(&board, Square::E5, Square::D6), Some(Motion::EnPassant));
        assert_eq!(pawn.is_legal(&board, Square::E5, Square::F6), None);
        assert_eq!(Motion::EnPassant.victim(Square::E5, Square::D6), Some(Square::D5));

        let board = self::board("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 1");
        let pawn = *board.piece_at(Square::E5).unwrap();
        assert_eq!(pawn.is_legal(&board, Square::E5, Square::D6), None);
    }

    #[test]
    fn test_pawn_attacks_ignore_occupancy() {
        let pawn = Piece::new(Color::Black, PieceKind::Pawn);
        assert!(pawn.attacks(Square::E5, Square::D4));
        assert!(pawn.attacks(Square::E5, Square::new(File::F, Rank::FOUR)));
        assert!(!pawn.attacks(Square::E5, Square::new(File::E, Rank::FOUR)));
        assert!(!pawn.attacks(Square::E5, Square::F6));
    }

    #[test]
    fn test_castle_geometry() {
        let board = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let king = *board.piece_at(Square::E1).unwrap();
        assert_eq!(
            king.is_legal(&board, Square::E1, Square::G1),
            Some(Motion::Castle(CastleSide::Kingside))
        );
        assert_eq!(
            king.is_legal(&board, Square::E1, Square::C1),
            Some(Motion::Castle(CastleSide::Queenside))
        );
        assert!(!king.attacks(Square::E1, Square::G1));

        let board = self::board("r3k2r/8/8/8/8/8/8/R3K2R w Qkq - 0 1");
        let king = *board.piece_at(Square::E1).unwrap();
        assert_eq!(king.is_legal(&board, Square::E1, Square::G1), None);
    }

    #[test]
    fn test_castle_paths() {
        assert_eq!(
            CastleSide::Kingside.between(Color::White).as_slice(),
            &[Square::F1, Square::G1]
        );
        assert_eq!(
            CastleSide::Queenside.between(Color::Black).as_slice(),
            &[Square::D8, Square::C8, Square::B8]
        );
        assert_eq!(
            CastleSide::Queenside.king_passage(Color::White),
            [Square::D1, Square::C1]
        );
    }
}
