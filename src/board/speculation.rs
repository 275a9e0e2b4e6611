/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ops::Deref;

use arrayvec::ArrayVec;

use super::{Board, Motion, PieceId, Rank, Square};

/// A candidate move applied to a [`Board`] for as long as this guard lives.
///
/// Every tile and every man the move touches is recorded before it is applied, and written
/// back when the guard is dropped, so the board is restored on every exit path, early returns
/// and unwinding included.
///
/// # Example
/// ```
/// # use rookery::*;
/// let mut board = Board::standard();
/// {
///     let trial = Speculation::apply(&mut board, Square::E2, Square::E4, Motion::DoubleStep);
///     assert!(trial.is_empty(Square::E2));
///     assert!(trial.piece_at(Square::E4).is_some());
/// }
/// assert_eq!(board, Board::standard());
/// ```
#[derive(Debug)]
pub struct Speculation<'a> {
    board: &'a mut Board,
    tiles: ArrayVec<(Square, Option<PieceId>), 4>,
    men: ArrayVec<(PieceId, Option<Square>), 4>,
}

impl<'a> Speculation<'a> {
    /// Applies `src -> dst` to `board`, removing an en passant victim and relocating the rook of a castle.
    ///
    /// Does nothing if `src` is empty.
    pub fn apply(board: &'a mut Board, src: Square, dst: Square, motion: Motion) -> Self {
        let mut trial = Self {
            board,
            tiles: ArrayVec::new(),
            men: ArrayVec::new(),
        };

        let Some(mover) = trial.board.id_at(src) else {
            return trial;
        };

        let rook = match motion {
            Motion::Castle(side) => {
                let color = mover.color();
                let corner = side.rook_square(color);
                let landing = Square::new(side.rook_destination_file(), Rank::first(color));
                trial.board.id_at(corner).map(|rook| (rook, corner, landing))
            }
            _ => None,
        };

        let victim = motion.victim(src, dst).filter(|&square| square != dst);

        trial.save(src);
        trial.save(dst);
        if let Some(square) = victim {
            trial.save(square);
        }
        if let Some((_, corner, landing)) = rook {
            trial.save(corner);
            trial.save(landing);
        }

        if let Some(square) = victim {
            trial.board.lift(square);
        }
        trial.board.place(mover, dst);
        if let Some((rook, _, landing)) = rook {
            trial.board.place(rook, landing);
        }

        trial
    }

    /// Records `square` and the man on it, unless already recorded.
    fn save(&mut self, square: Square) {
        if self.tiles.iter().any(|&(saved, _)| saved == square) {
            return;
        }

        let occupant = self.board.id_at(square);
        self.tiles.push((square, occupant));

        if let Some(id) = occupant {
            self.men.push((id, Some(square)));
        }
    }
}

impl Deref for Speculation<'_> {
    type Target = Board;
    fn deref(&self) -> &Self::Target {
        self.board
    }
}

impl Drop for Speculation<'_> {
    fn drop(&mut self) {
        while let Some((square, occupant)) = self.tiles.pop() {
            self.board.restore_tile(square, occupant);
        }
        while let Some((id, square)) = self.men.pop() {
            self.board.restore_man(id, square);
        }
    }
}
